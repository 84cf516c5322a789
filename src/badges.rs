//! Typed badges and the per-feed threshold tables that produce them.
//!
//! Every trigger level and delta lives in `BadgeThresholds` so a table can
//! be retuned without touching transform logic, and each table is testable
//! on its own.

use serde::{Deserialize, Serialize};

use crate::feeds::{FeedRecord, MomentumLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    HotStreak,
    ActiveStreak,
    DueForHr,
    HrCandidate,
    MilestoneNear,
    LikelyHit,
    PowerSurge,
    ImprovedForm,
    PositiveFactors,
    Risk,
    TimeSlot,
    MatchupEdge,
    BounceBack,
}

impl BadgeKind {
    pub fn glyph(self) -> &'static str {
        match self {
            BadgeKind::HotStreak | BadgeKind::ActiveStreak => "\u{1f525}",
            BadgeKind::DueForHr | BadgeKind::HrCandidate => "\u{26a1}",
            BadgeKind::MilestoneNear => "\u{1f3c1}",
            BadgeKind::LikelyHit | BadgeKind::ImprovedForm => "\u{1f4c8}",
            BadgeKind::PowerSurge => "\u{1f680}",
            BadgeKind::PositiveFactors => "\u{1f4ca}",
            BadgeKind::Risk => "\u{26a0}\u{fe0f}",
            BadgeKind::TimeSlot => "\u{23f0}",
            BadgeKind::MatchupEdge => "\u{1f19a}",
            BadgeKind::BounceBack => "\u{1f4c9}",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BadgeKind::HotStreak => "Hot Streak",
            BadgeKind::ActiveStreak => "Active Streak",
            BadgeKind::DueForHr => "Due for HR",
            BadgeKind::HrCandidate => "HR Candidate",
            BadgeKind::MilestoneNear => "Milestone Near",
            BadgeKind::LikelyHit => "Likely Hit",
            BadgeKind::PowerSurge => "Power Surge",
            BadgeKind::ImprovedForm => "Improved Form",
            BadgeKind::PositiveFactors => "Positive Factors",
            BadgeKind::Risk => "Risk",
            BadgeKind::TimeSlot => "Time Slot",
            BadgeKind::MatchupEdge => "Matchup Edge",
            BadgeKind::BounceBack => "Bounce Back",
        }
    }
}

/// Provenance for one badge, carrying only the fields its kind needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum BadgeData {
    Streak { length: u32 },
    HrRank { rank: u32 },
    Milestone { stat: String, distance: u32 },
    HitProbability { probability: Option<f64> },
    Momentum { score: f64 },
    RiskFlag { risk_score: f64 },
    TimeSlot { day: String },
    Matchup { pitcher: String },
    Pattern { potential: f64, confidence: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub kind: BadgeKind,
    /// Signed confidence delta; sign always matches the badge's polarity.
    pub delta: i32,
    /// Lower is more important.
    pub priority: u8,
    pub data: BadgeData,
}

impl Badge {
    pub fn new(kind: BadgeKind, delta: i32, priority: u8, data: BadgeData) -> Self {
        Self { kind, delta, priority, data }
    }

    pub fn display(&self) -> String {
        format!("{} {}", self.kind.glyph(), self.kind.label())
    }
}

/// Trigger levels and deltas for every feed transform, plus the stacking
/// bonus. Adjustable without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeThresholds {
    pub elite_streak_len: u32,
    pub elite_streak_delta: i32,
    pub active_streak_len: u32,
    pub active_streak_delta: i32,
    pub hr_rank_top: u32,
    pub hr_rank_top_delta: i32,
    pub hr_rank_near: u32,
    pub hr_rank_near_delta: i32,
    /// Deltas for milestone distances 1, 2, 3.
    pub milestone_deltas: [i32; 3],
    pub likely_hit_delta: i32,
    pub surge_high_score: f64,
    pub surge_high_delta: i32,
    pub surge_medium_score: f64,
    pub surge_medium_delta: i32,
    pub surge_low_delta: i32,
    pub risk_delta: i32,
    pub time_slot_delta: i32,
    pub matchup_delta: i32,
    pub bounce_back_delta: i32,
    pub stack_bonus_count: usize,
    pub stack_bonus: i32,
}

impl Default for BadgeThresholds {
    fn default() -> Self {
        Self {
            elite_streak_len: 8,
            elite_streak_delta: 15,
            active_streak_len: 5,
            active_streak_delta: 10,
            hr_rank_top: 5,
            hr_rank_top_delta: 12,
            hr_rank_near: 15,
            hr_rank_near_delta: 8,
            milestone_deltas: [15, 10, 5],
            likely_hit_delta: 8,
            surge_high_score: 50.0,
            surge_high_delta: 12,
            surge_medium_score: 35.0,
            surge_medium_delta: 8,
            surge_low_delta: 5,
            risk_delta: -15,
            time_slot_delta: 5,
            matchup_delta: 8,
            bounce_back_delta: 7,
            stack_bonus_count: 3,
            stack_bonus: 20,
        }
    }
}

/// What one feed's matched record contributes to a player context.
#[derive(Debug, Clone, Default)]
pub struct FeedFinding {
    pub badges: Vec<Badge>,
    pub standout_reasons: Vec<String>,
    pub risk_factors: Vec<String>,
}

impl FeedFinding {
    fn badge(mut self, badge: Badge) -> Self {
        self.badges.push(badge);
        self
    }

    fn reason(mut self, reason: String) -> Self {
        self.standout_reasons.push(reason);
        self
    }

    fn risk(mut self, risk: String) -> Self {
        self.risk_factors.push(risk);
        self
    }
}

/// Apply the feed-specific threshold table to one matched record. Risk
/// feeds contribute only to the risk list and always carry a negative
/// delta; every other table yields non-negative deltas.
pub fn transform(record: &FeedRecord, t: &BadgeThresholds) -> FeedFinding {
    let finding = FeedFinding::default();
    match record {
        FeedRecord::HitStreak { length } => {
            if *length >= t.elite_streak_len {
                finding
                    .badge(Badge::new(
                        BadgeKind::HotStreak,
                        t.elite_streak_delta,
                        1,
                        BadgeData::Streak { length: *length },
                    ))
                    .reason(format!("{length}-game hit streak (elite level)"))
            } else if *length >= t.active_streak_len {
                finding
                    .badge(Badge::new(
                        BadgeKind::ActiveStreak,
                        t.active_streak_delta,
                        2,
                        BadgeData::Streak { length: *length },
                    ))
                    .reason(format!("{length}-game hit streak"))
            } else {
                finding
            }
        }
        FeedRecord::HrPrediction { rank, .. } => {
            if *rank <= t.hr_rank_top {
                finding
                    .badge(Badge::new(
                        BadgeKind::DueForHr,
                        t.hr_rank_top_delta,
                        1,
                        BadgeData::HrRank { rank: *rank },
                    ))
                    .reason(format!("Ranked #{rank} in HR predictions today"))
            } else if *rank <= t.hr_rank_near {
                finding
                    .badge(Badge::new(
                        BadgeKind::HrCandidate,
                        t.hr_rank_near_delta,
                        3,
                        BadgeData::HrRank { rank: *rank },
                    ))
                    .reason(format!("Top {} HR prediction (rank #{rank})", t.hr_rank_near))
            } else {
                finding
            }
        }
        FeedRecord::Milestone { stat, current, target } => {
            let distance = target.saturating_sub(*current);
            if !(1..=3).contains(&distance) {
                return finding;
            }
            let delta = t.milestone_deltas[(distance - 1) as usize];
            finding
                .badge(Badge::new(
                    BadgeKind::MilestoneNear,
                    delta,
                    distance as u8,
                    BadgeData::Milestone { stat: stat.clone(), distance },
                ))
                .reason(format!("{stat}: {current} of {target} ({distance} away)"))
        }
        FeedRecord::LikelyHit { probability } => {
            let reason = match probability {
                Some(p) => format!("{:.1}% hit probability", p * 100.0),
                None => "Identified as likely to get a hit".to_string(),
            };
            finding
                .badge(Badge::new(
                    BadgeKind::LikelyHit,
                    t.likely_hit_delta,
                    2,
                    BadgeData::HitProbability { probability: *probability },
                ))
                .reason(reason)
        }
        FeedRecord::PowerSurge { score, level } => {
            if *level == MomentumLevel::High || *score >= t.surge_high_score {
                finding
                    .badge(Badge::new(
                        BadgeKind::PowerSurge,
                        t.surge_high_delta,
                        2,
                        BadgeData::Momentum { score: *score },
                    ))
                    .reason(format!("High positive momentum (score: {score:.0})"))
            } else if *level == MomentumLevel::Medium || *score >= t.surge_medium_score {
                finding
                    .badge(Badge::new(
                        BadgeKind::ImprovedForm,
                        t.surge_medium_delta,
                        4,
                        BadgeData::Momentum { score: *score },
                    ))
                    .reason(format!("Positive performance indicators (score: {score:.0})"))
            } else {
                finding
                    .badge(Badge::new(
                        BadgeKind::PositiveFactors,
                        t.surge_low_delta,
                        4,
                        BadgeData::Momentum { score: *score },
                    ))
                    .reason(format!("Some positive factors identified (score: {score:.0})"))
            }
        }
        FeedRecord::PerformanceRisk { risk_score, note } => finding
            .badge(Badge::new(
                BadgeKind::Risk,
                t.risk_delta,
                1,
                BadgeData::RiskFlag { risk_score: *risk_score },
            ))
            .risk(
                note.clone()
                    .unwrap_or_else(|| "Identified as poor performance risk".to_string()),
            ),
        FeedRecord::TimeSlot { day, .. } => finding
            .badge(Badge::new(
                BadgeKind::TimeSlot,
                t.time_slot_delta,
                4,
                BadgeData::TimeSlot { day: day.clone() },
            ))
            .reason("Favorable time slot performance".to_string()),
        FeedRecord::Matchup { pitcher, .. } => finding
            .badge(Badge::new(
                BadgeKind::MatchupEdge,
                t.matchup_delta,
                3,
                BadgeData::Matchup { pitcher: pitcher.clone() },
            ))
            .reason("Strong historical vs this opponent".to_string()),
    }
}

/// Display order: priority first, then |delta| descending. Stable, so feed
/// configuration order breaks remaining ties.
pub fn sort_badges(badges: &mut [Badge]) {
    badges.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(b.delta.abs().cmp(&a.delta.abs()))
    });
}

/// Net confidence adjustment: the plain sum of badge deltas, plus the
/// stacking bonus exactly once when enough badges co-occur.
pub fn confidence_adjustment(badges: &[Badge], t: &BadgeThresholds) -> i32 {
    let sum: i32 = badges.iter().map(|b| b.delta).sum();
    if badges.len() >= t.stack_bonus_count {
        sum + t.stack_bonus
    } else {
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> BadgeThresholds {
        BadgeThresholds::default()
    }

    #[test]
    fn streak_table_tiers() {
        let t = defaults();
        let elite = transform(&FeedRecord::HitStreak { length: 9 }, &t);
        assert_eq!(elite.badges[0].kind, BadgeKind::HotStreak);
        assert_eq!(elite.badges[0].delta, 15);
        assert_eq!(elite.standout_reasons, vec!["9-game hit streak (elite level)"]);

        let active = transform(&FeedRecord::HitStreak { length: 5 }, &t);
        assert_eq!(active.badges[0].kind, BadgeKind::ActiveStreak);
        assert_eq!(active.badges[0].delta, 10);

        let quiet = transform(&FeedRecord::HitStreak { length: 4 }, &t);
        assert!(quiet.badges.is_empty());
        assert!(quiet.standout_reasons.is_empty());
    }

    #[test]
    fn hr_rank_table_tiers() {
        let t = defaults();
        let top = transform(&FeedRecord::HrPrediction { rank: 3, probability: None }, &t);
        assert_eq!(top.badges[0].kind, BadgeKind::DueForHr);
        assert_eq!(top.badges[0].delta, 12);

        let near = transform(&FeedRecord::HrPrediction { rank: 12, probability: None }, &t);
        assert_eq!(near.badges[0].kind, BadgeKind::HrCandidate);
        assert_eq!(near.badges[0].delta, 8);

        let out = transform(&FeedRecord::HrPrediction { rank: 16, probability: None }, &t);
        assert!(out.badges.is_empty());
    }

    #[test]
    fn milestone_table_by_distance() {
        let t = defaults();
        for (current, delta, priority) in [(99, 15, 1), (98, 10, 2), (97, 5, 3)] {
            let finding = transform(
                &FeedRecord::Milestone { stat: "H".to_string(), current, target: 100 },
                &t,
            );
            assert_eq!(finding.badges[0].kind, BadgeKind::MilestoneNear);
            assert_eq!(finding.badges[0].delta, delta);
            assert_eq!(finding.badges[0].priority, priority);
        }

        let far = transform(
            &FeedRecord::Milestone { stat: "H".to_string(), current: 90, target: 100 },
            &t,
        );
        assert!(far.badges.is_empty());

        let reached = transform(
            &FeedRecord::Milestone { stat: "H".to_string(), current: 100, target: 100 },
            &t,
        );
        assert!(reached.badges.is_empty());
    }

    #[test]
    fn surge_table_tiers() {
        let t = defaults();
        let high = transform(
            &FeedRecord::PowerSurge { score: 62.0, level: MomentumLevel::Medium },
            &t,
        );
        assert_eq!(high.badges[0].kind, BadgeKind::PowerSurge);

        let medium = transform(
            &FeedRecord::PowerSurge { score: 40.0, level: MomentumLevel::Low },
            &t,
        );
        assert_eq!(medium.badges[0].kind, BadgeKind::ImprovedForm);

        let low = transform(
            &FeedRecord::PowerSurge { score: 12.0, level: MomentumLevel::Low },
            &t,
        );
        assert_eq!(low.badges[0].kind, BadgeKind::PositiveFactors);
        assert_eq!(low.badges[0].delta, 5);
    }

    #[test]
    fn risk_contributes_only_to_risk_factors() {
        let t = defaults();
        let finding = transform(
            &FeedRecord::PerformanceRisk { risk_score: 71.0, note: None },
            &t,
        );
        assert_eq!(finding.badges[0].kind, BadgeKind::Risk);
        assert!(finding.badges[0].delta < 0);
        assert!(finding.standout_reasons.is_empty());
        assert_eq!(finding.risk_factors, vec!["Identified as poor performance risk"]);
    }

    #[test]
    fn opportunity_deltas_are_non_negative() {
        let t = defaults();
        let records = [
            FeedRecord::HitStreak { length: 9 },
            FeedRecord::HrPrediction { rank: 1, probability: Some(0.12) },
            FeedRecord::Milestone { stat: "HR".to_string(), current: 29, target: 30 },
            FeedRecord::LikelyHit { probability: Some(0.81) },
            FeedRecord::PowerSurge { score: 55.0, level: MomentumLevel::High },
            FeedRecord::TimeSlot { day: "Sunday".to_string(), hits: 21 },
            FeedRecord::Matchup { pitcher: "L. Castillo".to_string(), advantage: 0.3 },
        ];
        for record in &records {
            for badge in transform(record, &t).badges {
                assert!(badge.delta >= 0, "{:?} produced a negative delta", badge.kind);
            }
        }
    }

    #[test]
    fn badges_sort_by_priority_then_magnitude() {
        let mut badges = vec![
            Badge::new(BadgeKind::TimeSlot, 5, 4, BadgeData::TimeSlot { day: "Sunday".into() }),
            Badge::new(BadgeKind::DueForHr, 12, 1, BadgeData::HrRank { rank: 2 }),
            Badge::new(BadgeKind::Risk, -15, 1, BadgeData::RiskFlag { risk_score: 50.0 }),
            Badge::new(BadgeKind::MatchupEdge, 8, 3, BadgeData::Matchup { pitcher: "X".into() }),
        ];
        sort_badges(&mut badges);
        let kinds: Vec<BadgeKind> = badges.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BadgeKind::Risk, BadgeKind::DueForHr, BadgeKind::MatchupEdge, BadgeKind::TimeSlot]
        );
    }

    #[test]
    fn adjustment_sums_deltas_with_single_stack_bonus() {
        let t = defaults();
        let two = vec![
            Badge::new(BadgeKind::HotStreak, 15, 1, BadgeData::Streak { length: 9 }),
            Badge::new(BadgeKind::DueForHr, 12, 1, BadgeData::HrRank { rank: 3 }),
        ];
        assert_eq!(confidence_adjustment(&two, &t), 27);

        let mut four = two.clone();
        four.push(Badge::new(
            BadgeKind::MilestoneNear,
            15,
            1,
            BadgeData::Milestone { stat: "H".into(), distance: 1 },
        ));
        four.push(Badge::new(
            BadgeKind::TimeSlot,
            5,
            4,
            BadgeData::TimeSlot { day: "Sunday".into() },
        ));
        // Bonus applies once, not per badge past the threshold.
        assert_eq!(confidence_adjustment(&four, &t), 15 + 12 + 15 + 5 + 20);

        assert_eq!(confidence_adjustment(&[], &t), 0);
    }

    #[test]
    fn display_combines_glyph_and_label() {
        let badge = Badge::new(BadgeKind::HotStreak, 15, 1, BadgeData::Streak { length: 8 });
        assert_eq!(badge.display(), "\u{1f525} Hot Streak");
    }
}
