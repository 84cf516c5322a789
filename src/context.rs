//! Signal aggregation: fans out every configured feed lookup, merges the
//! findings into one scored `PlayerContext`, and caches the result per
//! `(player, team, date)` slate key.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::badges::{self, Badge, BadgeData, BadgeKind, BadgeThresholds};
use crate::bounce_back::{self, AnalyzerOptions, Classification, PatternResult};
use crate::feeds::{FeedRecord, SignalFeed};
use crate::game_log::GameLogProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub cache_ttl_secs: u64,
    pub feed_timeout_ms: u64,
    pub thresholds: BadgeThresholds,
    pub analyzer: AnalyzerOptions,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 5 * 60,
            feed_timeout_ms: 2_000,
            thresholds: BadgeThresholds::default(),
            analyzer: AnalyzerOptions::default(),
        }
    }
}

/// One feed's matched payload, kept verbatim for downstream explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPayload {
    pub feed: String,
    pub record: FeedRecord,
}

/// The aggregate decision record for one player on one slate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerContext {
    pub player: String,
    pub team: String,
    pub date: NaiveDate,
    pub badges: Vec<Badge>,
    pub confidence_adjustment: i32,
    pub standout_reasons: Vec<String>,
    pub risk_factors: Vec<String>,
    pub summary: String,
    pub feed_payloads: Vec<FeedPayload>,
    #[serde(default)]
    pub pattern: Option<PatternResult>,
}

struct CacheSlot {
    stored_at: Instant,
    context: Arc<PlayerContext>,
}

/// Time-bounded `key -> context` map shared across aggregation calls.
/// Entries are replaced atomically as a whole and evicted lazily on the
/// next lookup past their TTL.
pub struct ContextCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheSlot>>,
}

impl ContextCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub fn get(&self, key: &str) -> Option<Arc<PlayerContext>> {
        let mut entries = self.entries.lock().expect("context cache lock poisoned");
        match entries.get(key) {
            Some(slot) if slot.stored_at.elapsed() < self.ttl => Some(slot.context.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, context: Arc<PlayerContext>) {
        let mut entries = self.entries.lock().expect("context cache lock poisoned");
        entries.insert(key, CacheSlot { stored_at: Instant::now(), context });
    }

    pub fn clear(&self) {
        self.entries.lock().expect("context cache lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("context cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct SignalAggregator {
    feeds: Vec<Arc<dyn SignalFeed>>,
    game_log: Option<Arc<dyn GameLogProvider>>,
    cache: Arc<ContextCache>,
    config: AggregatorConfig,
}

impl SignalAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        let cache = Arc::new(ContextCache::new(Duration::from_secs(config.cache_ttl_secs)));
        Self::with_cache(config, cache)
    }

    /// Construct against an externally owned cache, e.g. one shared by
    /// several aggregators over the same slate.
    pub fn with_cache(config: AggregatorConfig, cache: Arc<ContextCache>) -> Self {
        Self { feeds: Vec::new(), game_log: None, cache, config }
    }

    pub fn add_feed(&mut self, feed: Arc<dyn SignalFeed>) {
        self.feeds.push(feed);
    }

    pub fn set_game_log(&mut self, provider: Arc<dyn GameLogProvider>) {
        self.game_log = Some(provider);
    }

    pub fn cache(&self) -> &Arc<ContextCache> {
        &self.cache
    }

    /// Build (or serve from cache) the fused context for one player.
    /// Total: feed outages, timeouts, and missing game logs all degrade to
    /// reduced signal coverage, never an error.
    pub fn get_context(&self, player: &str, team: &str, date: NaiveDate) -> Arc<PlayerContext> {
        let key = format!("{player}|{team}|{date}");
        if let Some(context) = self.cache.get(&key) {
            debug!(player, team, %date, "player context served from cache");
            return context;
        }

        let deadline = Instant::now() + Duration::from_millis(self.config.feed_timeout_ms);
        let rx = self.spawn_lookups(player, team, date);
        // The pattern analysis runs on the caller thread while feed workers
        // are in flight.
        let pattern = self.run_pattern_analysis(player, team);
        let matched = self.collect_lookups(rx, deadline);

        let mut badge_list: Vec<Badge> = Vec::new();
        let mut standout_reasons: Vec<String> = Vec::new();
        let mut risk_factors: Vec<String> = Vec::new();
        let mut feed_payloads: Vec<FeedPayload> = Vec::new();

        for (feed, record) in matched {
            let finding = badges::transform(&record, &self.config.thresholds);
            badge_list.extend(finding.badges);
            standout_reasons.extend(finding.standout_reasons);
            risk_factors.extend(finding.risk_factors);
            feed_payloads.push(FeedPayload { feed, record });
        }

        if let Some(pattern) = &pattern {
            self.merge_pattern_signal(
                pattern,
                &mut badge_list,
                &mut standout_reasons,
                &mut risk_factors,
            );
        }

        badges::sort_badges(&mut badge_list);
        let confidence_adjustment =
            badges::confidence_adjustment(&badge_list, &self.config.thresholds);
        let summary = summarize(confidence_adjustment, badge_list.len());

        let context = Arc::new(PlayerContext {
            player: player.to_string(),
            team: team.to_string(),
            date,
            badges: badge_list,
            confidence_adjustment,
            standout_reasons,
            risk_factors,
            summary,
            feed_payloads,
            pattern,
        });
        self.cache.put(key, context.clone());
        context
    }

    fn spawn_lookups(
        &self,
        player: &str,
        team: &str,
        date: NaiveDate,
    ) -> mpsc::Receiver<(usize, String, Result<Option<FeedRecord>>)> {
        let (tx, rx) = mpsc::channel();
        for (index, feed) in self.feeds.iter().enumerate() {
            let feed = feed.clone();
            let tx = tx.clone();
            let player = player.to_string();
            let team = team.to_string();
            thread::spawn(move || {
                let outcome = feed.lookup(&player, &team, date);
                // A receiver gone past its deadline is not an error here.
                let _ = tx.send((index, feed.name().to_string(), outcome));
            });
        }
        rx
    }

    /// Fan-in: waits for every worker up to the deadline. Stragglers and
    /// panicked workers degrade to "no signal" for their feed. Results are
    /// keyed by dispatch index, so completion order never affects output.
    fn collect_lookups(
        &self,
        rx: mpsc::Receiver<(usize, String, Result<Option<FeedRecord>>)>,
        deadline: Instant,
    ) -> Vec<(String, FeedRecord)> {
        let mut slots: Vec<Option<(String, FeedRecord)>> = vec![None; self.feeds.len()];
        let mut outstanding = self.feeds.len();
        while outstanding > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((index, feed, Ok(Some(record)))) => {
                    slots[index] = Some((feed, record));
                    outstanding -= 1;
                }
                Ok((_, feed, Ok(None))) => {
                    debug!(feed = %feed, "no signal for player");
                    outstanding -= 1;
                }
                Ok((_, feed, Err(err))) => {
                    warn!(feed = %feed, error = %err, "feed lookup failed; treating as no signal");
                    outstanding -= 1;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    warn!(
                        outstanding,
                        "feed lookups missed the deadline; treating as no signal"
                    );
                    break;
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    warn!(outstanding, "feed workers exited without reporting");
                    break;
                }
            }
        }
        slots.into_iter().flatten().collect()
    }

    fn run_pattern_analysis(&self, player: &str, team: &str) -> Option<PatternResult> {
        let provider = self.game_log.as_ref()?;
        match provider.game_log(player, team) {
            Ok(history) if history.is_empty() => None,
            Ok(history) => Some(bounce_back::analyze(&history, &self.config.analyzer)),
            Err(err) => {
                warn!(player, error = %err, "game log unavailable; skipping pattern analysis");
                None
            }
        }
    }

    /// A reliable, action-recommending pattern joins the badge set exactly
    /// like a feed signal; an unreliable avoid-with-failures result only
    /// feeds the risk list.
    fn merge_pattern_signal(
        &self,
        pattern: &PatternResult,
        badge_list: &mut Vec<Badge>,
        standout_reasons: &mut Vec<String>,
        risk_factors: &mut Vec<String>,
    ) {
        if pattern.recommend_action && pattern.is_reliable_pattern {
            badge_list.push(Badge::new(
                BadgeKind::BounceBack,
                self.config.thresholds.bounce_back_delta,
                3,
                BadgeData::Pattern {
                    potential: pattern.potential,
                    confidence: pattern.confidence,
                },
            ));
            standout_reasons.extend(pattern.reasons.iter().cloned());
        } else if pattern.classification == Classification::Avoid
            && pattern.situation.failed_attempts > 0
        {
            risk_factors.extend(pattern.warnings.iter().cloned());
        }
    }
}

fn summarize(adjustment: i32, badge_count: usize) -> String {
    if adjustment < -10 {
        "Caution advised - risk factors present"
    } else if adjustment > 20 {
        "High-confidence play with multiple positive indicators"
    } else if adjustment > 10 {
        "Solid play with favorable context"
    } else if badge_count > 0 && adjustment >= 0 {
        "Additional context indicators present"
    } else if adjustment > 0 {
        "Some positive indicators present"
    } else {
        "Base analysis only"
    }
    .to_string()
}
