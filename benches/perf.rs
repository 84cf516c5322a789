use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use chrono::NaiveDate;
use dugout_signals::bounce_back::{AnalyzerOptions, analyze};
use dugout_signals::game_log::GameRecord;
use dugout_signals::name_match::{best_match, names_match};

fn roster() -> Vec<String> {
    let firsts = [
        "Aaron", "Juan", "Jose", "Mike", "Trea", "Nick", "Freddie", "Mookie", "Bobby", "Corbin",
    ];
    let lasts = [
        "Judge", "Soto", "Ramirez", "Trout", "Turner", "Castellanos", "Freeman", "Betts", "Witt",
        "Carroll",
    ];
    let mut out = Vec::with_capacity(firsts.len() * lasts.len());
    for last in lasts {
        for first in firsts {
            out.push(format!("{first} {last}"));
        }
    }
    out
}

// Deterministic 40-game log mixing cold stretches and recoveries.
fn history() -> Vec<GameRecord> {
    let start = NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date");
    (0u32..40)
        .map(|i| {
            let hits = match i % 7 {
                0 | 3 => 2,
                1 | 4 | 5 => 1,
                _ => 0,
            };
            GameRecord::new(
                start
                    .checked_add_days(chrono::Days::new(u64::from(i)))
                    .expect("valid date"),
                hits,
                4,
            )
        })
        .collect()
}

fn bench_name_matching(c: &mut Criterion) {
    let roster = roster();
    c.bench_function("names_match_initial_vs_full", |b| {
        b.iter(|| names_match(black_box("N. Castellanos"), black_box("Nick Castellanos")))
    });
    c.bench_function("best_match_roster_miss", |b| {
        b.iter(|| best_match(black_box("Fake Player"), black_box(&roster)))
    });
    c.bench_function("best_match_roster_hit", |b| {
        b.iter(|| best_match(black_box("Carroll, Corbin"), black_box(&roster)))
    });
}

fn bench_pattern_analysis(c: &mut Criterion) {
    let games = history();
    let options = AnalyzerOptions::default();
    c.bench_function("analyze_40_game_history", |b| {
        b.iter(|| analyze(black_box(&games), black_box(&options)))
    });
}

criterion_group!(benches, bench_name_matching, bench_pattern_analysis);
criterion_main!(benches);
