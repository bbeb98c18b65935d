//! Batch autoplay for balance testing.
//!
//! Runs many seeds in parallel using rayon and aggregates the outcomes.

use std::path::Path;

use exodus_core::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::runner::{play, GameRecord};
use crate::strategy::Strategy;

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of games to run
    pub game_count: u32,
    /// First seed; game `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Day cap per game
    pub max_days: u32,
    /// Rules for every game
    pub rules: RuleSet,
    /// Planner for every game
    pub strategy: Strategy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            seed_start: 0,
            max_days: 365,
            rules: RuleSet::default(),
            strategy: Strategy::default(),
        }
    }
}

impl BatchConfig {
    /// Create config for a number of games
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the day cap
    pub fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = max_days;
        self
    }

    /// Set the rules
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }
}

/// Aggregate outcome counts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Games won.
    pub won: u32,
    /// Games lost.
    pub lost: u32,
    /// Games still running at the day cap.
    pub ongoing: u32,
    /// Mean days played across all games.
    pub mean_days: f64,
}

impl BatchSummary {
    /// Summarize a set of records.
    #[must_use]
    pub fn from_records(records: &[GameRecord]) -> Self {
        let mut summary = Self::default();
        let mut total_days = 0u64;
        for record in records {
            match record.outcome {
                GameOutcome::Won => summary.won += 1,
                GameOutcome::Lost => summary.lost += 1,
                GameOutcome::Ongoing => summary.ongoing += 1,
            }
            total_days += u64::from(record.days_played);
        }
        if !records.is_empty() {
            summary.mean_days = total_days as f64 / records.len() as f64;
        }
        summary
    }

    /// Fraction of games won.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        let total = self.won + self.lost + self.ongoing;
        if total == 0 {
            0.0
        } else {
            f64::from(self.won) / f64::from(total)
        }
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Individual game records in seed order
    pub games: Vec<GameRecord>,
    /// Aggregate summary
    pub summary: BatchSummary,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Run a batch of games.
///
/// # Errors
///
/// Returns [`GameError::InvalidArgument`] if the rules fail validation.
pub fn run_batch(config: &BatchConfig) -> Result<BatchResults> {
    config.rules.validate()?;
    info!(
        games = config.game_count,
        seed_start = config.seed_start,
        max_days = config.max_days,
        "Starting batch"
    );

    let games: Vec<GameRecord> = (0..u64::from(config.game_count))
        .into_par_iter()
        .map(|i| -> Result<GameRecord> {
            let seed = config.seed_start.wrapping_add(i);
            let world = WorldConfig::default().with_seed(seed);
            let mut session = Session::new(config.rules.clone(), world, seed)?;
            let record = play(&mut session, &config.strategy, config.max_days, |_, _| {});
            debug!(seed, outcome = ?record.outcome, "Batch game done");
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;

    let summary = BatchSummary::from_records(&games);
    info!(
        won = summary.won,
        lost = summary.lost,
        ongoing = summary.ongoing,
        "Batch complete"
    );
    Ok(BatchResults { games, summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let record = |outcome, days_played| GameRecord {
            seed: 0,
            outcome,
            days_played,
            survivors: 0,
            buildings_completed: 0,
        };
        let summary = BatchSummary::from_records(&[
            record(GameOutcome::Won, 40),
            record(GameOutcome::Lost, 20),
            record(GameOutcome::Lost, 30),
            record(GameOutcome::Ongoing, 10),
        ]);
        assert_eq!((summary.won, summary.lost, summary.ongoing), (1, 2, 1));
        assert!((summary.mean_days - 25.0).abs() < f64::EPSILON);
        assert!((summary.win_rate() - 0.25).abs() < f64::EPSILON);
        assert_eq!(BatchSummary::from_records(&[]).win_rate(), 0.0);
    }

    #[test]
    fn test_batch_matches_sequential_runs() {
        let config = BatchConfig::new(6).with_seed(100).with_max_days(40);
        let results = run_batch(&config).unwrap();
        assert_eq!(results.games.len(), 6);

        for (i, record) in results.games.iter().enumerate() {
            assert_eq!(record.seed, 100 + i as u64);
            let mut session = Session::new(
                RuleSet::default(),
                WorldConfig::default().with_seed(record.seed),
                record.seed,
            )
            .unwrap();
            let again = play(&mut session, &Strategy::default(), 40, |_, _| {});
            assert_eq!(&again, record);
        }
        let s = results.summary;
        assert_eq!(s.won + s.lost + s.ongoing, 6);
    }

    #[test]
    fn test_batch_rejects_invalid_rules() {
        let rules = RuleSet {
            event_chance: -1.0,
            ..RuleSet::default()
        };
        let config = BatchConfig::new(2).with_rules(rules);
        assert!(matches!(run_batch(&config), Err(GameError::InvalidArgument(_))));
    }

    #[test]
    fn test_results_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("batch.json");
        let results = run_batch(&BatchConfig::new(2).with_max_days(5)).unwrap();
        results.save(&path).unwrap();
        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games, results.games);
    }
}
