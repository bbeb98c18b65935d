//! Autoplay loop: plan, execute, advance, repeat.

use exodus_core::prelude::*;
use serde::{Deserialize, Serialize};

use crate::strategy::Strategy;

/// How one autoplayed game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Seed the session was created with.
    pub seed: u64,
    /// Final state. `Ongoing` means the day cap was reached.
    pub outcome: GameOutcome,
    /// Days actually played.
    pub days_played: u32,
    /// Survivors alive at the end.
    pub survivors: usize,
    /// Buildings completed at the end.
    pub buildings_completed: usize,
}

/// Play up to `max_days` days with a strategy.
///
/// `on_day` sees every summary together with the session state after that
/// day. Rejected commands are logged and skipped.
pub fn play<F>(session: &mut Session, strategy: &Strategy, max_days: u32, mut on_day: F) -> GameRecord
where
    F: FnMut(&DaySummary, &Session),
{
    let mut days_played = 0;
    while days_played < max_days && !session.is_over() {
        for command in strategy.plan(session) {
            if let Err(err) = session.execute(command) {
                tracing::warn!(?command, %err, "Planner command rejected");
            }
        }
        match session.advance_day() {
            Ok(summary) => {
                days_played += 1;
                on_day(&summary, session);
            }
            Err(err) => {
                tracing::warn!(%err, "Day could not be played");
                break;
            }
        }
    }

    let record = GameRecord {
        seed: session.seed(),
        outcome: session.outcome(),
        days_played,
        survivors: session.colony().population(),
        buildings_completed: session.colony().completed_buildings().count(),
    };
    tracing::info!(
        seed = record.seed,
        outcome = ?record.outcome,
        days = record.days_played,
        "Game finished"
    );
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use exodus_test_utils::fixtures::default_session;

    #[test]
    fn test_play_respects_day_cap() {
        let mut session = default_session(3);
        let mut seen = Vec::new();
        let record = play(&mut session, &Strategy::default(), 5, |summary, _| {
            seen.push(summary.day);
        });
        if record.outcome == GameOutcome::Ongoing {
            assert_eq!(record.days_played, 5);
            assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        } else {
            assert_eq!(seen.len() as u32, record.days_played);
        }
    }

    #[test]
    fn test_play_is_deterministic() {
        let run = |seed| {
            let mut session = default_session(seed);
            let record = play(&mut session, &Strategy::default(), 60, |_, _| {});
            (record, session.state_hash())
        };
        assert_eq!(run(21), run(21));
    }

    #[test]
    fn test_zero_days() {
        let mut session = default_session(3);
        let record = play(&mut session, &Strategy::default(), 0, |_, _| {
            panic!("no day should be played");
        });
        assert_eq!(record.days_played, 0);
        assert_eq!(record.outcome, GameOutcome::Ongoing);
        assert_eq!(record.survivors, 5);
    }
}
