use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::name_match;

/// The payload a feed reports for one matched player. One variant per feed
/// family; transforms pattern-match on the variant rather than probing
/// free-form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "feed", rename_all = "snake_case")]
pub enum FeedRecord {
    HitStreak {
        length: u32,
    },
    HrPrediction {
        rank: u32,
        #[serde(default)]
        probability: Option<f64>,
    },
    Milestone {
        stat: String,
        current: u32,
        target: u32,
    },
    LikelyHit {
        #[serde(default)]
        probability: Option<f64>,
    },
    PowerSurge {
        score: f64,
        level: MomentumLevel,
    },
    PerformanceRisk {
        #[serde(default)]
        risk_score: f64,
        #[serde(default)]
        note: Option<String>,
    },
    TimeSlot {
        day: String,
        #[serde(default)]
        hits: u32,
    },
    Matchup {
        pitcher: String,
        #[serde(default)]
        advantage: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumLevel {
    High,
    Medium,
    Low,
}

/// An external per-player signal source. Implementations are called from
/// aggregator worker threads; a `None` means the player simply is not on
/// this feed today, while an `Err` is a feed outage the aggregator degrades
/// to "no signal".
pub trait SignalFeed: Send + Sync {
    fn name(&self) -> &str;

    fn lookup(&self, player: &str, team: &str, date: NaiveDate) -> Result<Option<FeedRecord>>;
}

/// One roster entry in a table-backed feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedRow {
    pub name: String,
    pub team: String,
    pub record: FeedRecord,
}

/// In-memory feed backed by a per-slate table, the shape most prediction
/// card exports take. Lookup resolves the requested player against the
/// table's own naming convention and the team code exactly.
pub struct TableFeed {
    name: String,
    rows: Vec<FeedRow>,
}

impl TableFeed {
    pub fn new(name: impl Into<String>, rows: Vec<FeedRow>) -> Self {
        Self { name: name.into(), rows }
    }
}

impl SignalFeed for TableFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, player: &str, team: &str, _date: NaiveDate) -> Result<Option<FeedRecord>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| name_match::team_matches(&row.team, team))
            .find(|row| name_match::names_match(player, &row.name))
            .map(|row| row.record.clone()))
    }
}
