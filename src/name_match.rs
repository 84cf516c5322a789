//! Player name matching across the formats different feeds use: full names,
//! bare initials, "Last, First" ordering, and surname-only lookups.
//!
//! Matching is deliberately precision-over-recall: rules are tried in order
//! and the surname gate is never bypassed. Suffixes (Jr., Sr., III) are
//! literal trailing tokens, so a feed that carries one only matches a feed
//! that carries the same one.

/// Lowercase, strip periods and any other non-letter characters, collapse
/// whitespace. "J.T. Realmuto" becomes "jt realmuto".
pub fn normalize_name(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for ch in input.chars() {
        if ch.is_ascii_alphabetic() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            out.push(ch.to_ascii_lowercase());
            pending_space = false;
        } else if ch.is_whitespace() {
            pending_space = true;
        }
        // Periods, digits, hyphens and accented characters are dropped
        // without introducing a token break, matching feed conventions
        // where "J.T." is one token.
    }
    out
}

pub fn names_match(candidate: &str, reference: &str) -> bool {
    // "Last, First" sources are rewritten before normalization strips the
    // comma. One level only.
    if candidate.contains(',') || reference.contains(',') {
        let a = rewrite_comma_order(candidate);
        let b = rewrite_comma_order(reference);
        return match_normalized(&normalize_name(&a), &normalize_name(&b));
    }
    match_normalized(&normalize_name(candidate), &normalize_name(reference))
}

/// First reference entry satisfying `names_match`, scanning in input order.
/// No scoring or ranking: feeds are expected to supply at most one plausible
/// candidate per team, so the first hit wins.
pub fn best_match<'a, S: AsRef<str>>(candidate: &str, references: &'a [S]) -> Option<&'a str> {
    references
        .iter()
        .map(|s| s.as_ref())
        .find(|reference| names_match(candidate, reference))
}

/// Team codes compare by exact case-insensitive equality. Empty codes never
/// match anything.
pub fn team_matches(a: &str, b: &str) -> bool {
    let a = a.trim();
    let b = b.trim();
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

fn rewrite_comma_order(raw: &str) -> String {
    match raw.split_once(',') {
        Some((last, first)) => format!("{} {}", first.trim(), last.trim()),
        None => raw.to_string(),
    }
}

fn match_normalized(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    let parts_a: Vec<&str> = a.split(' ').collect();
    let parts_b: Vec<&str> = b.split(' ').collect();

    // A single-token lookup only ever matches the other side's surname
    // ("Judge" finds "Aaron Judge"). No multi-part rules run.
    if parts_a.len() < 2 || parts_b.len() < 2 {
        if parts_a.len() == 1 && parts_b.len() >= 2 {
            return parts_a[0] == *parts_b.last().expect("non-empty parts");
        }
        if parts_b.len() == 1 && parts_a.len() >= 2 {
            return parts_b[0] == *parts_a.last().expect("non-empty parts");
        }
        return false;
    }

    let surname_a = *parts_a.last().expect("non-empty parts");
    let surname_b = *parts_b.last().expect("non-empty parts");
    let given_a = parts_a[0];
    let given_b = parts_b[0];

    if surname_a == surname_b {
        return given_names_match(given_a, given_b);
    }

    // Sources that invert name order ("Turner Trea" vs "Trea Turner").
    if parts_a.len() == 2 && parts_b.len() == 2 {
        let swapped_a = format!("{} {}", parts_a[1], parts_a[0]);
        let swapped_b = format!("{} {}", parts_b[1], parts_b[0]);
        if swapped_a == b || swapped_b == a {
            return true;
        }
    }

    // Abbreviated surname ("Trea T." vs "Trea Turner"), accepted only when
    // the given names are exactly identical.
    if given_a == given_b {
        return is_initial_of(surname_a, surname_b) || is_initial_of(surname_b, surname_a);
    }

    false
}

fn given_names_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    // Bare initials must be identical, and a compound initial ("jt") never
    // collides with a single initial ("t").
    if a.len() == 1 {
        return b.len() > 2 && b.starts_with(a);
    }
    if b.len() == 1 {
        return a.len() > 2 && a.starts_with(b);
    }
    false
}

fn is_initial_of(initial: &str, full: &str) -> bool {
    initial.len() == 1 && full.len() > 2 && full.starts_with(initial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_collapses_spaces() {
        assert_eq!(normalize_name("J.T.  Realmuto "), "jt realmuto");
        assert_eq!(normalize_name("  Nick   Castellanos"), "nick castellanos");
        assert_eq!(normalize_name("O'Neil Cruz"), "oneil cruz");
        assert_eq!(normalize_name("..."), "");
    }

    #[test]
    fn identical_names_match() {
        assert!(names_match("Aaron Judge", "Aaron Judge"));
        assert!(names_match("aaron judge", "AARON JUDGE"));
        assert!(names_match("A. Judge", "A Judge"));
    }

    #[test]
    fn empty_names_never_match() {
        assert!(!names_match("", ""));
        assert!(!names_match("", "Aaron Judge"));
        assert!(!names_match("...", "..."));
    }

    #[test]
    fn initial_matches_full_given_name() {
        assert!(names_match("N. Castellanos", "Nick Castellanos"));
        assert!(names_match("Nick Castellanos", "N. Castellanos"));
    }

    #[test]
    fn compound_initial_does_not_collide_with_single_initial() {
        assert!(!names_match("J.T. Realmuto", "T. Ward"));
        assert!(!names_match("J.T. Realmuto", "T. Realmuto"));
        assert!(!names_match("T. Realmuto", "J.T. Realmuto"));
    }

    #[test]
    fn bare_initials_must_be_identical() {
        assert!(names_match("A. Judge", "A. Judge"));
        assert!(!names_match("A. Judge", "B. Judge"));
    }

    #[test]
    fn surname_gate_is_hard() {
        assert!(!names_match("Aaron Judge", "Aaron Boone"));
        assert!(!names_match("Fake Player", "Aaron Judge"));
        // A suffix is a literal trailing token and breaks the gate.
        assert!(!names_match("Ronald Acuna Jr", "Ronald Acuna"));
    }

    #[test]
    fn surname_only_lookup_matches() {
        assert!(names_match("Judge", "Aaron Judge"));
        assert!(names_match("Aaron Judge", "Judge"));
        assert!(!names_match("Aaron", "Aaron Judge"));
    }

    #[test]
    fn abbreviated_surname_matches_with_identical_given() {
        assert!(names_match("Trea T.", "Trea Turner"));
        assert!(names_match("Trea Turner", "Trea T."));
        assert!(!names_match("T. Trea", "Trea Turner"));
    }

    #[test]
    fn comma_order_is_rewritten() {
        assert!(names_match("Judge, Aaron", "Aaron Judge"));
        assert!(names_match("Aaron Judge", "Judge, Aaron"));
        assert!(names_match("Castellanos, N.", "Nick Castellanos"));
    }

    #[test]
    fn swapped_token_order_matches() {
        assert!(names_match("Turner Trea", "Trea Turner"));
        assert!(!names_match("Turner Trea", "Trea Thompson"));
    }

    #[test]
    fn middle_names_compare_by_first_given_token() {
        assert!(names_match("Jackson Holliday", "Jackson Matthew Holliday"));
        assert!(names_match("J. Holliday", "Jackson Matthew Holliday"));
    }

    #[test]
    fn best_match_returns_first_hit_in_input_order() {
        let roster = vec![
            "Jose Ramirez".to_string(),
            "J. Rodriguez".to_string(),
            "Julio Rodriguez".to_string(),
        ];
        assert_eq!(best_match("Julio Rodriguez", &roster), Some("J. Rodriguez"));
        assert_eq!(best_match("Jose Ramirez", &roster), Some("Jose Ramirez"));
        assert_eq!(best_match("Fake Player", &roster), None);
    }

    #[test]
    fn team_codes_compare_case_insensitively() {
        assert!(team_matches("NYY", "nyy"));
        assert!(team_matches(" sea ", "SEA"));
        assert!(!team_matches("NYY", "BOS"));
        assert!(!team_matches("", ""));
    }
}
