//! Random daily events.
//!
//! Events are data, not callbacks: each entry carries an [`EventEffect`]
//! that is applied to the colony exactly once when selected and produces a
//! single log line. Selection has no memory of previous days.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::colony::Colony;
use crate::resources::{ResourceBundle, ResourceKind};

/// What an event does to the colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventEffect {
    /// Add resources to the ledger.
    GainResources(ResourceBundle),
    /// Remove up to the given amounts, never below zero.
    LoseResources(ResourceBundle),
    /// Shift every survivor's morale.
    MoraleAll(i32),
    /// Shift every survivor's health.
    HealthAll(i32),
    /// Shift the health of one survivor chosen at random.
    HealthRandomSurvivor(i32),
}

impl EventEffect {
    /// Apply the effect and describe the outcome.
    pub fn apply<R: Rng + ?Sized>(&self, colony: &mut Colony, rng: &mut R) -> String {
        match self {
            Self::GainResources(bundle) => {
                for (&kind, &amount) in bundle {
                    colony.resources_mut().credit(kind, amount);
                }
                format!("Gained {}.", describe_bundle(bundle.iter().map(|(&k, &a)| (k, a))))
            }
            Self::LoseResources(bundle) => {
                let lost: Vec<(ResourceKind, u32)> = bundle
                    .iter()
                    .map(|(&kind, &amount)| (kind, colony.resources_mut().take_up_to(kind, amount)))
                    .collect();
                format!("Lost {}.", describe_bundle(lost.into_iter()))
            }
            Self::MoraleAll(delta) => {
                for survivor in colony.survivors_mut() {
                    survivor.change_morale(*delta);
                }
                format!("All survivors {} {} morale.", gained_or_lost(*delta), delta.abs())
            }
            Self::HealthAll(delta) => {
                for survivor in colony.survivors_mut() {
                    survivor.change_health(*delta);
                }
                format!("All survivors {} {} health.", gained_or_lost(*delta), delta.abs())
            }
            Self::HealthRandomSurvivor(delta) => {
                let survivors = colony.survivors_mut();
                if survivors.is_empty() {
                    return "Nobody was there to be affected.".to_string();
                }
                let index = rng.gen_range(0..survivors.len());
                let survivor = &mut survivors[index];
                survivor.change_health(*delta);
                format!(
                    "{} {} {} health.",
                    survivor.name(),
                    gained_or_lost(*delta),
                    delta.abs()
                )
            }
        }
    }
}

fn gained_or_lost(delta: i32) -> &'static str {
    if delta < 0 {
        "lost"
    } else {
        "gained"
    }
}

fn describe_bundle(entries: impl Iterator<Item = (ResourceKind, u32)>) -> String {
    let parts: Vec<String> = entries
        .map(|(kind, amount)| format!("{amount} {kind}"))
        .collect();
    if parts.is_empty() {
        "nothing".to_string()
    } else {
        parts.join(" and ")
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    /// Headline shown in the day log.
    pub description: String,
    /// Relative selection weight. Zero-weight entries never fire.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Effect applied on selection.
    pub effect: EventEffect,
}

const fn default_weight() -> u32 {
    1
}

impl EventEntry {
    /// Create an entry with weight 1.
    #[must_use]
    pub fn new(description: impl Into<String>, effect: EventEffect) -> Self {
        Self {
            description: description.into(),
            weight: default_weight(),
            effect,
        }
    }

    /// Set the selection weight.
    #[must_use]
    pub const fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }
}

/// Catalog of one-shot daily events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTable {
    entries: Vec<EventEntry>,
}

impl EventTable {
    /// Create a table from entries.
    #[must_use]
    pub fn new(entries: Vec<EventEntry>) -> Self {
        Self { entries }
    }

    /// A table that never fires.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// All entries.
    #[must_use]
    pub fn entries(&self) -> &[EventEntry] {
        &self.entries
    }

    /// Whether no entry can ever be selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_weight() == 0
    }

    fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }

    /// Pick one entry proportionally to weight.
    ///
    /// Returns `None` when the table is empty.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&EventEntry> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }
        let mut roll = rng.gen_range(0..total);
        for entry in &self.entries {
            let weight = u64::from(entry.weight);
            if roll < weight {
                return Some(entry);
            }
            roll -= weight;
        }
        None
    }

    /// Run the daily trial: with probability `chance`, pick an entry and
    /// apply it.
    ///
    /// Returns the log lines for the event (headline, then outcome), or
    /// `None` for an uneventful day.
    pub fn roll<R: Rng + ?Sized>(
        &self,
        colony: &mut Colony,
        chance: f64,
        rng: &mut R,
    ) -> Option<(String, String)> {
        let chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
        if self.is_empty() || !rng.gen_bool(chance) {
            return None;
        }
        let entry = self.pick(rng)?;
        let outcome = entry.effect.apply(colony, rng);
        Some((entry.description.clone(), outcome))
    }
}

impl Default for EventTable {
    fn default() -> Self {
        use ResourceKind::{BuildingMaterials, Food, Medicine, Water};

        let bundle = |entries: &[(ResourceKind, u32)]| -> ResourceBundle {
            entries.iter().copied().collect()
        };

        Self::new(vec![
            EventEntry::new(
                "You discovered a hidden supply cache from the ship!",
                EventEffect::GainResources(bundle(&[(Food, 20), (Medicine, 5)])),
            ),
            EventEntry::new(
                "Clear skies and favorable weather boost morale.",
                EventEffect::MoraleAll(10),
            ),
            EventEntry::new(
                "A sudden alien sandstorm damages your stockpiles.",
                EventEffect::LoseResources(bundle(&[(Food, 15), (Water, 15)])),
            ),
            EventEntry::new(
                "A strange local illness is spreading.",
                EventEffect::HealthRandomSurvivor(-20),
            ),
            EventEntry::new(
                "Tools have gone missing. It will be harder to build.",
                EventEffect::LoseResources(bundle(&[(BuildingMaterials, 10)])),
            ),
            EventEntry::new(
                "A scavenging party found a hidden cache of materials!",
                EventEffect::GainResources(bundle(&[(BuildingMaterials, 15)])),
            ),
            EventEntry::new(
                "A minor accident occurred at the work site.",
                EventEffect::HealthRandomSurvivor(-15),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceLedger;
    use crate::survivor::Skill;
    use crate::world::Location;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn colony() -> Colony {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Food, 10);
        ledger.credit(ResourceKind::Water, 40);
        let mut colony = Colony::new(ledger, Location::new(0, 0));
        colony.add_survivor("Eva", Skill::None, 50);
        colony.add_survivor("Jax", Skill::Engineering, 95);
        colony
    }

    #[test]
    fn test_default_table_is_uniform() {
        let table = EventTable::default();
        assert_eq!(table.entries().len(), 7);
        assert!(table.entries().iter().all(|e| e.weight == 1));
    }

    #[test]
    fn test_lose_resources_floors_at_zero() {
        let mut colony = colony();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let effect = EventEffect::LoseResources(
            [(ResourceKind::Food, 15), (ResourceKind::Water, 15)]
                .into_iter()
                .collect(),
        );
        let line = effect.apply(&mut colony, &mut rng);
        assert_eq!(colony.resources().get(ResourceKind::Food), 0);
        assert_eq!(colony.resources().get(ResourceKind::Water), 25);
        assert_eq!(line, "Lost 10 Food and 15 Water.");
    }

    #[test]
    fn test_morale_all_is_unclamped_until_settled() {
        let mut colony = colony();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let line = EventEffect::MoraleAll(10).apply(&mut colony, &mut rng);
        assert_eq!(line, "All survivors gained 10 morale.");
        assert_eq!(colony.survivors()[0].morale(), 60);
        assert_eq!(colony.survivors()[1].morale(), 105);
    }

    #[test]
    fn test_random_survivor_on_empty_roster() {
        let mut colony = Colony::new(ResourceLedger::new(), Location::new(0, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let line = EventEffect::HealthRandomSurvivor(-20).apply(&mut colony, &mut rng);
        assert_eq!(line, "Nobody was there to be affected.");
    }

    #[test]
    fn test_pick_respects_weights() {
        let table = EventTable::new(vec![
            EventEntry::new("never", EventEffect::MoraleAll(1)).with_weight(0),
            EventEntry::new("always", EventEffect::MoraleAll(2)),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(table.pick(&mut rng).unwrap().description, "always");
        }
    }

    #[test]
    fn test_roll_chance_bounds() {
        let table = EventTable::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut colony = colony();
        for _ in 0..20 {
            assert!(table.roll(&mut colony, 0.0, &mut rng).is_none());
        }
        for _ in 0..20 {
            assert!(table.roll(&mut colony, 1.0, &mut rng).is_some());
        }
        assert!(EventTable::empty()
            .roll(&mut colony, 1.0, &mut rng)
            .is_none());
    }

    #[test]
    fn test_roll_frequency_near_chance() {
        let table = EventTable::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut colony = colony();
        let trials = 2000;
        let fired = (0..trials)
            .filter(|_| table.roll(&mut colony, 0.3, &mut rng).is_some())
            .count();
        // 0.30 +/- generous margin
        assert!((450..=750).contains(&fired), "fired {fired} of {trials}");
    }
}
