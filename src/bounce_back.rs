//! Bounce-back pattern analysis over a player's rolling game log.
//!
//! The naive windowed-average approach keeps awarding "due to recover"
//! credit no matter how many recoveries already failed to materialize. This
//! engine tracks failed bounce-back attempts explicitly and penalizes each
//! one, so a player with more recent failures can never outscore an
//! otherwise-identical player with fewer.

use serde::{Deserialize, Serialize};

use crate::game_log::{GameRecord, season_average};

/// A per-game average at or under this counts as poor regardless of how low
/// the season average runs.
const MIN_POOR_GAME_AVG: f64 = 0.150;
/// How many trailing games describe the current situation.
const RECENT_WINDOW: usize = 10;
/// Trailing games reserved as "current" and excluded from analogue search.
const CURRENT_RESERVE: usize = 5;
/// Games examined after a historical cold streak to classify its resolution.
const RESOLUTION_WINDOW: usize = 5;
const TOP_ANALOGUES: usize = 5;
const MIN_ANALOGUES: usize = 3;
const INITIAL_SEARCH_WINDOW: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    pub min_analysis_window: usize,
    pub max_analysis_window: usize,
    pub bounce_back_look_ahead: usize,
    pub poor_game_multiplier: f64,
    pub bounce_back_multiplier: f64,
    pub strong_bounce_back_threshold: f64,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            min_analysis_window: 5,
            max_analysis_window: 25,
            bounce_back_look_ahead: 3,
            poor_game_multiplier: 0.7,
            bounce_back_multiplier: 1.2,
            strong_bounce_back_threshold: 0.400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    StrongCandidate,
    ModerateCandidate,
    WeakCandidate,
    Avoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BounceStrength {
    Strong,
    Moderate,
    Weak,
}

/// How a historical cold streak of the same length resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StreakResolution {
    BouncedBack {
        games_until: usize,
        peak_avg: f64,
        strength: BounceStrength,
        immediate: bool,
    },
    ContinuedStruggle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalAnalogue {
    pub start_index: usize,
    pub resolution: StreakResolution,
    pub similarity: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentSituation {
    pub consecutive_poor_games: usize,
    pub failed_attempts: usize,
    pub opportunities: usize,
    pub failure_rate: f64,
    pub days_since_good_game: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternResult {
    pub potential: f64,
    pub confidence: f64,
    pub classification: Classification,
    pub situation: CurrentSituation,
    pub analogues: Vec<HistoricalAnalogue>,
    pub reasons: Vec<String>,
    pub warnings: Vec<String>,
    pub is_reliable_pattern: bool,
    /// `potential * confidence * 100`, on a 0-100 scale.
    pub score: f64,
    pub recommend_action: bool,
    pub season_avg: f64,
    pub poor_threshold: f64,
    pub bounce_threshold: f64,
}

impl PatternResult {
    fn unreliable(warning: &str) -> Self {
        Self {
            potential: 0.0,
            confidence: 0.0,
            classification: Classification::Avoid,
            situation: CurrentSituation::default(),
            analogues: Vec::new(),
            reasons: Vec::new(),
            warnings: vec![warning.to_string()],
            is_reliable_pattern: false,
            score: 0.0,
            recommend_action: false,
            season_avg: 0.0,
            poor_threshold: 0.0,
            bounce_threshold: 0.0,
        }
    }
}

/// Analyze a chronological game log. Total over its input domain: short
/// histories produce a not-reliable result, never an error.
pub fn analyze(history: &[GameRecord], options: &AnalyzerOptions) -> PatternResult {
    if history.len() < options.min_analysis_window {
        return PatternResult::unreliable("Insufficient game history for bounce back analysis");
    }

    let season_avg = season_average(history);
    let poor_threshold = MIN_POOR_GAME_AVG.max(season_avg * options.poor_game_multiplier);
    let bounce_threshold = season_avg * options.bounce_back_multiplier;

    let situation = current_situation(
        history,
        poor_threshold,
        bounce_threshold,
        options.bounce_back_look_ahead,
    );
    let analogues = find_analogues(
        history,
        &situation,
        poor_threshold,
        bounce_threshold,
        options,
    );

    score_pattern(
        situation,
        analogues,
        season_avg,
        poor_threshold,
        bounce_threshold,
    )
}

fn is_poor(game: &GameRecord, poor_threshold: f64) -> bool {
    game.at_bats >= 2 && game.avg() <= poor_threshold
}

fn current_situation(
    history: &[GameRecord],
    poor_threshold: f64,
    bounce_threshold: f64,
    look_ahead: usize,
) -> CurrentSituation {
    let recent = &history[history.len().saturating_sub(RECENT_WINDOW)..];

    // Current run of consecutive poor games, counted from the end. Games
    // with fewer than 2 at-bats are skipped rather than breaking the run.
    let mut consecutive_poor_games = 0usize;
    for game in recent.iter().rev() {
        if game.at_bats < 2 {
            continue;
        }
        if game.avg() <= poor_threshold {
            consecutive_poor_games += 1;
        } else {
            break;
        }
    }

    // Every poor game followed by at least one more game is a bounce-back
    // opportunity; it failed when none of the next `look_ahead` games
    // reached the bounce threshold.
    let mut opportunities = 0usize;
    let mut failed_attempts = 0usize;
    for i in 0..recent.len().saturating_sub(1) {
        if !is_poor(&recent[i], poor_threshold) {
            continue;
        }
        opportunities += 1;
        let next = &recent[i + 1..recent.len().min(i + 1 + look_ahead)];
        if !next.is_empty() && !next.iter().any(|g| g.avg() >= bounce_threshold) {
            failed_attempts += 1;
        }
    }
    let failure_rate = if opportunities > 0 {
        failed_attempts as f64 / opportunities as f64
    } else {
        0.0
    };

    let days_since_good_game = recent
        .iter()
        .rposition(|g| g.at_bats >= 2 && g.avg() >= bounce_threshold)
        .map(|i| recent.len() - 1 - i)
        .unwrap_or(recent.len());

    CurrentSituation {
        consecutive_poor_games,
        failed_attempts,
        opportunities,
        failure_rate,
        days_since_good_game,
    }
}

/// Slide a window of the current run length over history outside the recent
/// reserve, keeping all-poor windows ranked by similarity to the current
/// streak. Widens the scanned span when fewer than 3 analogues surface.
fn find_analogues(
    history: &[GameRecord],
    situation: &CurrentSituation,
    poor_threshold: f64,
    bounce_threshold: f64,
    options: &AnalyzerOptions,
) -> Vec<HistoricalAnalogue> {
    let run = situation.consecutive_poor_games;
    if run == 0 || history.len() <= CURRENT_RESERVE {
        return Vec::new();
    }

    let past = &history[..history.len() - CURRENT_RESERVE];
    let current_streak = &history[history.len() - run.min(history.len())..];
    let max_span = past.len().min(options.max_analysis_window);
    let mut span = INITIAL_SEARCH_WINDOW.min(max_span);

    let mut analogues: Vec<HistoricalAnalogue> = Vec::new();
    loop {
        analogues.clear();
        let offset = past.len() - span;
        let scan = &past[offset..];
        if scan.len() >= run {
            for start in 0..=scan.len() - run {
                let window = &scan[start..start + run];
                if !window.iter().all(|g| is_poor(g, poor_threshold)) {
                    continue;
                }
                let abs_end = offset + start + run;
                let after = &past[abs_end..past.len().min(abs_end + RESOLUTION_WINDOW)];
                analogues.push(HistoricalAnalogue {
                    start_index: offset + start,
                    resolution: classify_resolution(
                        after,
                        bounce_threshold,
                        options.strong_bounce_back_threshold,
                    ),
                    similarity: streak_similarity(window, current_streak),
                });
            }
        }
        if analogues.len() >= MIN_ANALOGUES || span >= max_span {
            break;
        }
        span = (span + 5).min(max_span);
    }

    analogues.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    analogues.truncate(TOP_ANALOGUES);
    analogues
}

fn classify_resolution(
    after: &[GameRecord],
    bounce_threshold: f64,
    strong_threshold: f64,
) -> StreakResolution {
    let mut games_until = None;
    let mut peak_avg: f64 = 0.0;
    for (i, game) in after.iter().enumerate() {
        if game.at_bats >= 2 && game.avg() >= bounce_threshold {
            if games_until.is_none() {
                games_until = Some(i + 1);
            }
            peak_avg = peak_avg.max(game.avg());
        }
    }
    match games_until {
        Some(games_until) => StreakResolution::BouncedBack {
            games_until,
            peak_avg,
            strength: bounce_strength(peak_avg, bounce_threshold, strong_threshold),
            immediate: games_until == 1,
        },
        None => StreakResolution::ContinuedStruggle,
    }
}

fn bounce_strength(peak_avg: f64, bounce_threshold: f64, strong_threshold: f64) -> BounceStrength {
    if peak_avg >= strong_threshold {
        BounceStrength::Strong
    } else if peak_avg >= bounce_threshold {
        BounceStrength::Moderate
    } else {
        BounceStrength::Weak
    }
}

/// Per-game similarity: `1 - 2*|avg diff| - 0.1*|at-bat diff|`, floored at
/// zero and averaged across the window.
fn streak_similarity(historical: &[GameRecord], current: &[GameRecord]) -> f64 {
    if historical.len() != current.len() || historical.is_empty() {
        return 0.0;
    }
    let total: f64 = historical
        .iter()
        .zip(current)
        .map(|(h, c)| {
            let avg_diff = (h.avg() - c.avg()).abs();
            let ab_diff = (f64::from(h.at_bats) - f64::from(c.at_bats)).abs();
            (1.0 - 2.0 * avg_diff - 0.1 * ab_diff).max(0.0)
        })
        .sum();
    total / historical.len() as f64
}

fn score_pattern(
    situation: CurrentSituation,
    analogues: Vec<HistoricalAnalogue>,
    season_avg: f64,
    poor_threshold: f64,
    bounce_threshold: f64,
) -> PatternResult {
    let mut potential = 0.5;
    let mut confidence: f64 = 0.3;
    let mut reasons = Vec::new();
    let mut warnings = Vec::new();

    if !analogues.is_empty() {
        let bounced: Vec<&HistoricalAnalogue> = analogues
            .iter()
            .filter(|a| matches!(a.resolution, StreakResolution::BouncedBack { .. }))
            .collect();
        let success_rate = bounced.len() as f64 / analogues.len() as f64;
        potential = success_rate;
        confidence += 0.3;
        reasons.push(format!(
            "Historical pattern: {:.1}% bounce back rate in similar {}-game cold streaks",
            success_rate * 100.0,
            situation.consecutive_poor_games
        ));
        if !bounced.is_empty() {
            let avg_recovery = bounced
                .iter()
                .map(|a| match a.resolution {
                    StreakResolution::BouncedBack { games_until, .. } => games_until as f64,
                    StreakResolution::ContinuedStruggle => 0.0,
                })
                .sum::<f64>()
                / bounced.len() as f64;
            reasons.push(format!(
                "Typically bounces back within {avg_recovery:.1} games"
            ));
        }
    }

    // Penalties are strictly additive and each is floored independently, so
    // a later floor never hides an earlier penalty. A player with more
    // recent failures must never outscore one with fewer.
    let failure_penalty = 0.15 * situation.failed_attempts as f64;
    potential = (potential - failure_penalty).max(0.1);
    if situation.failed_attempts > 0 {
        warnings.push(format!(
            "{} recent failed bounce back attempts - reduced potential",
            situation.failed_attempts
        ));
    }

    if situation.consecutive_poor_games >= 5 {
        let streak_penalty = 0.08 * (situation.consecutive_poor_games - 4) as f64;
        potential = (potential - streak_penalty).max(0.05);
        warnings.push(format!(
            "Extended {}-game cold streak - significantly reduced potential",
            situation.consecutive_poor_games
        ));
    }

    if situation.days_since_good_game >= 7 {
        let stale_penalty = (0.03 * (situation.days_since_good_game - 6) as f64).min(0.2);
        potential = (potential - stale_penalty).max(0.05);
        warnings.push(format!(
            "{} days since good game - stale situation",
            situation.days_since_good_game
        ));
    }

    if situation.failure_rate > 0.6 {
        confidence = (confidence - 0.3).max(0.1);
        warnings.push(format!(
            "High recent failure rate ({:.1}%) - low confidence",
            situation.failure_rate * 100.0
        ));
    }

    let classification = if potential >= 0.6 && confidence >= 0.7 {
        Classification::StrongCandidate
    } else if potential >= 0.4 && confidence >= 0.5 {
        Classification::ModerateCandidate
    } else if potential >= 0.25 {
        Classification::WeakCandidate
    } else {
        Classification::Avoid
    };

    let is_reliable_pattern = confidence >= 0.5 && analogues.len() >= 2;
    let score = potential * confidence * 100.0;
    let recommend_action = classification != Classification::Avoid;

    PatternResult {
        potential,
        confidence,
        classification,
        situation,
        analogues,
        reasons,
        warnings,
        is_reliable_pattern,
        score,
        recommend_action,
        season_avg,
        poor_threshold,
        bounce_threshold,
    }
}
