//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a playthrough produces identical
//! results given the same seed and the same commands.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism include:
//!
//! - **HashMap iteration order**: the ledger and catalogs are `BTreeMap`s,
//!   and survivors are processed in roster order.
//!
//! - **System randomness**: every draw goes through the session's seeded
//!   `ChaCha8Rng`, including starting morale and world generation.
//!
//! - **Wall-clock time**: the day loop never reads it.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: each phase of the day in isolation
//! 2. **Property tests**: random command streams still replay exactly
//! 3. **Parallel tests**: N sessions run on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use exodus_core::session::{Command, Session};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of days simulated.
    pub days: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Days: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.days,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `days` - Number of steps per run
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one day
/// * `hash` - Computes the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    days: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..days {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        days,
    }
}

/// Advance a session by one day, ignoring the game-over rejection.
pub fn step_session(session: &mut Session) {
    if session.advance_day().is_err() {
        tracing::trace!(day = session.day(), "Session already over");
    }
}

/// Run the same session setup twice and compare final hashes.
pub fn verify_session_determinism<F>(setup_fn: F, days: u32) -> bool
where
    F: Fn() -> Session,
{
    verify_determinism(2, days, setup_fn, step_session, Session::state_hash).is_deterministic
}

/// Replay a command stream: all commands are issued before the first day,
/// then the given number of days is played. Rejected commands are skipped.
///
/// Returns the final state hash.
pub fn replay(mut session: Session, commands: &[Command], days: u32) -> u64 {
    for &command in commands {
        if let Err(err) = session.execute(command) {
            tracing::trace!(?command, %err, "Command rejected during replay");
        }
    }
    for _ in 0..days {
        step_session(&mut session);
    }
    session.state_hash()
}

/// Result of parallel session runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each session.
    pub hashes: Vec<u64>,
    /// Number of days each session ran.
    pub days: u32,
}

impl ParallelRunResult {
    /// Check if all sessions produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all sessions matched.
    ///
    /// # Panics
    ///
    /// Panics if sessions produced different hashes.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic(),
            "Parallel sessions diverged after {} days: {:?}",
            self.days,
            self.hashes
        );
    }
}

/// Run `count` copies of a session on separate threads.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_sessions<F>(setup_fn: F, count: usize, days: u32) -> ParallelRunResult
where
    F: Fn() -> Session + Sync,
{
    let hashes = thread::scope(|scope| {
        let handles: Vec<_> = (0..count)
            .map(|_| {
                scope.spawn(|| {
                    let mut session = setup_fn();
                    for _ in 0..days {
                        step_session(&mut session);
                    }
                    session.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelRunResult { hashes, days }
}

/// Compare two runs day by day, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match throughout, `Some(day)` if they diverge after
/// that many days (0 means the initial states differ).
pub fn find_first_divergence<F>(setup_fn: F, days: u32) -> Option<u32>
where
    F: Fn() -> Session,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for day in 1..=days {
        step_session(&mut a);
        step_session(&mut b);
        if a.state_hash() != b.state_hash() {
            return Some(day);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for colony testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based tests.
pub mod strategies {
    use exodus_core::buildings::BuildingType;
    use exodus_core::resources::{ResourceBundle, ResourceKind};
    use exodus_core::session::Command;
    use exodus_core::survivor::{Skill, SurvivorId, Task};
    use exodus_core::world::Location;
    use proptest::prelude::*;

    /// Any task.
    pub fn arb_task() -> impl Strategy<Value = Task> {
        proptest::sample::select(Task::ALL.to_vec())
    }

    /// Any skill.
    pub fn arb_skill() -> impl Strategy<Value = Skill> {
        prop_oneof![
            Just(Skill::None),
            Just(Skill::Medicine),
            Just(Skill::Engineering),
            Just(Skill::Farming),
            Just(Skill::Scavenging),
        ]
    }

    /// Any building type.
    pub fn arb_building_type() -> impl Strategy<Value = BuildingType> {
        proptest::sample::select(BuildingType::ALL.to_vec())
    }

    /// Any resource kind.
    pub fn arb_resource_kind() -> impl Strategy<Value = ResourceKind> {
        proptest::sample::select(ResourceKind::ALL.to_vec())
    }

    /// A bundle of up to five entries, each 0..200.
    pub fn arb_bundle() -> impl Strategy<Value = ResourceBundle> {
        proptest::collection::btree_map(arb_resource_kind(), 0u32..200, 0..5)
    }

    /// Locations slightly beyond a 10x10 world so out-of-bounds sites are
    /// exercised too.
    pub fn arb_location() -> impl Strategy<Value = Location> {
        (0u32..12, 0u32..12).prop_map(|(x, y)| Location::new(x, y))
    }

    /// Survivor ids covering the canonical roster plus a few unknown ones.
    pub fn arb_survivor_id() -> impl Strategy<Value = SurvivorId> {
        (1u32..8).prop_map(SurvivorId::new)
    }

    /// Any command.
    pub fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            3 => (arb_survivor_id(), arb_task())
                .prop_map(|(survivor, task)| Command::AssignTask { survivor, task }),
            1 => arb_building_type().prop_map(|building| Command::StartBuilding { building }),
            1 => arb_location().prop_map(|location| Command::SetScavengeSite { location }),
            1 => arb_location().prop_map(|location| Command::Explore { location }),
        ]
    }

    /// A sequence of commands.
    pub fn arb_command_sequence(max_len: usize) -> impl Strategy<Value = Vec<Command>> {
        proptest::collection::vec(arb_command(), 0..max_len)
    }

    /// A day's worth of commands for each of `days` days.
    pub fn arb_daily_commands(
        days: usize,
        max_per_day: usize,
    ) -> impl Strategy<Value = Vec<Vec<Command>>> {
        proptest::collection::vec(arb_command_sequence(max_per_day), days)
    }
}
