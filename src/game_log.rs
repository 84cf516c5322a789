use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One player-game observation. Sequences are chronological and immutable
/// once produced by the data collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_stat")]
    pub hits: u32,
    #[serde(default, deserialize_with = "lenient_stat")]
    pub at_bats: u32,
}

impl GameRecord {
    pub fn new(date: NaiveDate, hits: u32, at_bats: u32) -> Self {
        Self { date, hits, at_bats }
    }

    pub fn avg(&self) -> f64 {
        if self.at_bats == 0 {
            0.0
        } else {
            f64::from(self.hits) / f64::from(self.at_bats)
        }
    }
}

pub fn season_average(history: &[GameRecord]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    history.iter().map(GameRecord::avg).sum::<f64>() / history.len() as f64
}

/// Supplies a player's chronological game log. Feeds and boxscore archives
/// disagree on stat field types, so decoding is lenient: a malformed stat
/// cell becomes 0 rather than rejecting the record.
pub trait GameLogProvider: Send + Sync {
    fn game_log(&self, player: &str, team: &str) -> Result<Vec<GameRecord>>;
}

fn lenient_stat<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                u32::try_from(v).unwrap_or(0)
            } else {
                // Negative or fractional stat cells clamp through zero.
                n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u32).unwrap_or(0)
            }
        }
        serde_json::Value::String(s) => s.trim().parse::<u32>().unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, n).expect("valid date")
    }

    #[test]
    fn avg_is_zero_when_no_at_bats() {
        assert_eq!(GameRecord::new(day(1), 0, 0).avg(), 0.0);
        assert_eq!(GameRecord::new(day(1), 2, 4).avg(), 0.5);
    }

    #[test]
    fn season_average_over_empty_history_is_zero() {
        assert_eq!(season_average(&[]), 0.0);
        let games = vec![GameRecord::new(day(1), 2, 4), GameRecord::new(day(2), 0, 4)];
        assert!((season_average(&games) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn malformed_stat_fields_decode_to_zero() {
        let record: GameRecord = serde_json::from_str(
            r#"{"date":"2025-06-01","hits":"junk","at_bats":null}"#,
        )
        .expect("record should decode");
        assert_eq!(record.hits, 0);
        assert_eq!(record.at_bats, 0);

        let record: GameRecord =
            serde_json::from_str(r#"{"date":"2025-06-01","hits":"2","at_bats":-3}"#)
                .expect("record should decode");
        assert_eq!(record.hits, 2);
        assert_eq!(record.at_bats, 0);
    }

    #[test]
    fn missing_stat_fields_default_to_zero() {
        let record: GameRecord =
            serde_json::from_str(r#"{"date":"2025-06-01"}"#).expect("record should decode");
        assert_eq!(record.hits, 0);
        assert_eq!(record.at_bats, 0);
    }
}
