//! Survivors: the colonists whose daily tasks drive the simulation.
//!
//! A survivor is plain data with a skill tag. Behaviour differs by data
//! only, so there is one type and no trait hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound for health and morale.
pub const STATUS_MAX: i32 = 100;

/// Stable survivor identifier. Never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SurvivorId(pub u32);

impl SurvivorId {
    /// Create a new survivor ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for SurvivorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Specialization that grants a yield bonus on the matching task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Skill {
    /// No specialization.
    #[default]
    None,
    /// Medic.
    Medicine,
    /// Builder; bonus on [`Task::Build`].
    Engineering,
    /// Grower; bonus on [`Task::Farm`].
    Farming,
    /// Forager; bonus on [`Task::Scavenge`].
    Scavenging,
}

/// Daily work assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Task {
    /// Does nothing.
    #[default]
    Idle,
    /// Gathers from the colony's scavenge site.
    Scavenge,
    /// Works on the building under construction.
    Build,
    /// Works a completed farm.
    Farm,
    /// Recovers health and morale.
    Rest,
}

impl Task {
    /// All tasks in menu order.
    pub const ALL: [Self; 5] = [
        Self::Idle,
        Self::Scavenge,
        Self::Build,
        Self::Farm,
        Self::Rest,
    ];

    /// The skill that earns a bonus on this task, if any.
    #[must_use]
    pub const fn bonus_skill(self) -> Option<Skill> {
        match self {
            Self::Scavenge => Some(Skill::Scavenging),
            Self::Build => Some(Skill::Engineering),
            Self::Farm => Some(Skill::Farming),
            Self::Idle | Self::Rest => None,
        }
    }
}

/// Name and skill for a roster slot, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivorTemplate {
    /// Display name.
    pub name: String,
    /// Specialization.
    #[serde(default)]
    pub skill: Skill,
}

impl SurvivorTemplate {
    /// Create a roster template.
    #[must_use]
    pub fn new(name: impl Into<String>, skill: Skill) -> Self {
        Self {
            name: name.into(),
            skill,
        }
    }
}

/// A colonist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Survivor {
    id: SurvivorId,
    name: String,
    health: i32,
    morale: i32,
    /// Specialization.
    pub skill: Skill,
    /// Current assignment. Persists across days until reassigned.
    pub task: Task,
}

impl Survivor {
    /// Create a survivor at full health with the given morale.
    #[must_use]
    pub fn new(id: SurvivorId, name: impl Into<String>, skill: Skill, morale: i32) -> Self {
        Self {
            id,
            name: name.into(),
            health: STATUS_MAX,
            morale: morale.clamp(0, STATUS_MAX),
            skill,
            task: Task::Idle,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> SurvivorId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Current morale.
    #[must_use]
    pub const fn morale(&self) -> i32 {
        self.morale
    }

    /// Set health, clamped to `[0, 100]`.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, STATUS_MAX);
    }

    /// Set morale, clamped to `[0, 100]`.
    pub fn set_morale(&mut self, morale: i32) {
        self.morale = morale.clamp(0, STATUS_MAX);
    }

    /// Shift health by `delta`. Not clamped until [`Survivor::settle`].
    pub fn change_health(&mut self, delta: i32) {
        self.health = self.health.saturating_add(delta);
    }

    /// Shift morale by `delta`. Not clamped until [`Survivor::settle`].
    pub fn change_morale(&mut self, delta: i32) {
        self.morale = self.morale.saturating_add(delta);
    }

    /// Recover health and morale, each capped at 100.
    pub fn recover(&mut self, health: i32, morale: i32) {
        self.health = self.health.saturating_add(health).min(STATUS_MAX);
        self.morale = self.morale.saturating_add(morale).min(STATUS_MAX);
    }

    /// Clamp health and morale back into `[0, 100]`.
    pub fn settle(&mut self) {
        self.health = self.health.clamp(0, STATUS_MAX);
        self.morale = self.morale.clamp(0, STATUS_MAX);
    }

    /// Dead survivors are removed at the end of the day.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Whether this survivor's skill matches their current task.
    #[must_use]
    pub fn has_bonus_on(&self, task: Task) -> bool {
        task.bonus_skill() == Some(self.skill)
    }
}
