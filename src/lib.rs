//! Fuses independently produced per-player signal feeds (streaks, milestone
//! proximity, HR prediction ranks, risk flags, time-slot and matchup history,
//! power surges) into one scored, cached, explainable `PlayerContext`.

pub mod badges;
pub mod bounce_back;
pub mod context;
pub mod feeds;
pub mod game_log;
pub mod name_match;
