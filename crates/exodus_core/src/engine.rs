//! The day loop.
//!
//! [`TurnEngine::advance_day`] runs one full day synchronously and returns a
//! [`DaySummary`]. Nothing suspends mid-day and there is no wall-clock
//! dependency, so a day can be replayed exactly from the same colony,
//! world and random seed.
//!
//! # Phase Order
//!
//! Later phases see the effects of earlier ones:
//! 1. **Tasks** - each survivor's assignment resolves in roster order
//! 2. **Production** - completed buildings yield their daily output
//! 3. **Consumption** - Food and Water per survivor; shortages hurt everyone
//! 4. **Event** - at most one random event
//! 5. **Settle** - health and morale are clamped to `[0, 100]`
//! 6. **Deaths and end check** - the dead are removed, then the outcome is
//!    evaluated
//!
//! # Example
//!
//! ```
//! use exodus_core::engine::{GameOutcome, TurnEngine};
//! use exodus_core::rules::RuleSet;
//! use exodus_core::world::{World, WorldConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let mut world = World::generate(WorldConfig::default());
//! let mut engine = TurnEngine::new(RuleSet::default());
//! let mut colony = engine.found_colony(world.crash_site(), &mut rng);
//!
//! let summary = engine.advance_day(&mut colony, &mut world, &mut rng).unwrap();
//! assert_eq!(summary.day, 1);
//! assert_eq!(summary.outcome, GameOutcome::Ongoing);
//! assert_eq!(engine.day(), 2);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::buildings::BuildingType;
use crate::colony::Colony;
use crate::error::{GameError, Result};
use crate::resources::{ResourceKind, ResourceLedger};
use crate::rules::{RuleSet, VictoryRule};
use crate::survivor::{SurvivorId, Task};
use crate::world::{Biome, Location, TileStock};

/// Terminal state machine. `Lost` and `Won` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Play continues.
    #[default]
    Ongoing,
    /// Every survivor has died.
    Lost,
    /// The victory rule holds.
    Won,
}

impl GameOutcome {
    /// Whether no further days or commands are accepted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// Everything that happened in one day, for the presenter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// The day that was played.
    pub day: u32,
    /// Human-readable log lines in the order they happened.
    pub log: Vec<String>,
    /// Buildings completed today.
    pub completed: Vec<BuildingType>,
    /// Resources that ran short during consumption.
    pub shortages: Vec<ResourceKind>,
    /// Headline of today's event, if one fired.
    pub event: Option<String>,
    /// Survivors who died today.
    pub deaths: Vec<SurvivorId>,
    /// Ledger at the end of the day.
    pub resources: ResourceLedger,
    /// Survivors alive at the end of the day.
    pub population: usize,
    /// State after the day.
    pub outcome: GameOutcome,
}

impl DaySummary {
    fn new(day: u32) -> Self {
        Self {
            day,
            ..Self::default()
        }
    }

    fn push(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }
}

/// Snapshot of a survivor's assignment taken before task resolution.
struct Assignment {
    index: usize,
    name: String,
    task: Task,
    skilled: bool,
}

/// Orchestrates days and gates commands on the terminal state.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    rules: RuleSet,
    day: u32,
    outcome: GameOutcome,
}

impl TurnEngine {
    /// Create an engine at day one.
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            day: 1,
            outcome: GameOutcome::Ongoing,
        }
    }

    /// The rules in force.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The next day to be played.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Current state of the game.
    #[must_use]
    pub const fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    /// Create the starting colony from the rules.
    ///
    /// Starting morale for each survivor is rolled from the configured
    /// range.
    pub fn found_colony<R: Rng + ?Sized>(&self, scavenge_site: Location, rng: &mut R) -> Colony {
        let mut colony = Colony::new(
            ResourceLedger::from_bundle(&self.rules.starting_resources),
            scavenge_site,
        );
        let range = self.rules.starting_morale;
        for template in &self.rules.starting_roster {
            let morale = rng.gen_range(range.min..=range.max.max(range.min));
            colony.add_survivor(template.name.clone(), template.skill, morale);
        }
        colony
    }

    fn ensure_ongoing(&self) -> Result<()> {
        if self.outcome.is_terminal() {
            Err(GameError::GameOver(self.outcome))
        } else {
            Ok(())
        }
    }

    /// Assign a task to a living survivor.
    ///
    /// # Errors
    ///
    /// [`GameError::GameOver`] after a terminal outcome, otherwise as
    /// [`Colony::assign_task`].
    pub fn assign_task(&self, colony: &mut Colony, id: SurvivorId, task: Task) -> Result<()> {
        self.ensure_ongoing()?;
        colony.assign_task(id, task)
    }

    /// Pay for and start a building.
    ///
    /// # Errors
    ///
    /// [`GameError::GameOver`] after a terminal outcome, otherwise as
    /// [`Colony::start_building`].
    pub fn start_building(&self, colony: &mut Colony, building_type: BuildingType) -> Result<()> {
        self.ensure_ongoing()?;
        colony.start_building(building_type, &self.rules.buildings)
    }

    /// Point scavengers at a different tile.
    ///
    /// # Errors
    ///
    /// [`GameError::GameOver`] after a terminal outcome,
    /// [`GameError::NotFound`] if the location is outside the world, or
    /// [`GameError::InvalidArgument`] if the tile is unexplored.
    pub fn set_scavenge_site<W: TileStock + ?Sized>(
        &self,
        colony: &mut Colony,
        world: &W,
        location: Location,
    ) -> Result<()> {
        self.ensure_ongoing()?;
        if world.biome_at(location).is_none() {
            return Err(GameError::NotFound(format!("tile {location}")));
        }
        if !world.is_explored(location) {
            return Err(GameError::InvalidArgument(format!(
                "tile {location} has not been explored"
            )));
        }
        colony.set_scavenge_site(location);
        Ok(())
    }

    /// Survey a tile so scavengers can be sent there.
    ///
    /// # Errors
    ///
    /// [`GameError::GameOver`] after a terminal outcome, otherwise as
    /// [`TileStock::explore`].
    pub fn explore<W: TileStock + ?Sized>(&self, world: &mut W, location: Location) -> Result<Biome> {
        self.ensure_ongoing()?;
        let biome = world.explore(location)?;
        tracing::info!(day = self.day, %location, ?biome, "Tile explored");
        Ok(biome)
    }

    /// Play one day.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] if the game already ended; the colony
    /// is untouched in that case.
    pub fn advance_day<W, R>(
        &mut self,
        colony: &mut Colony,
        world: &mut W,
        rng: &mut R,
    ) -> Result<DaySummary>
    where
        W: TileStock + ?Sized,
        R: Rng + ?Sized,
    {
        self.ensure_ongoing()?;
        let mut summary = DaySummary::new(self.day);

        // 1. Tasks
        self.resolve_tasks(colony, world, &mut summary);

        // 2. Production
        self.run_production(colony, &mut summary);

        // 3. Consumption
        self.run_consumption(colony, &mut summary);

        // 4. Event
        match self
            .rules
            .events
            .roll(colony, self.rules.event_chance, rng)
        {
            Some((headline, outcome)) => {
                tracing::debug!(day = self.day, event = %headline, "Event fired");
                summary.push(format!("Event: {headline}"));
                summary.push(outcome);
                summary.event = Some(headline);
            }
            None => summary.push("The day passes uneventfully."),
        }

        // 5. Settle
        for survivor in colony.survivors_mut() {
            survivor.settle();
        }

        // 6. Deaths and end check
        self.run_deaths(colony, &mut summary);
        self.outcome = self.evaluate(colony);
        summary.outcome = self.outcome;
        summary.resources = colony.resources().clone();
        summary.population = colony.population();

        #[cfg(feature = "debug-validation")]
        if let Err(violation) = colony.check_invariants() {
            panic!("colony invariant violated on day {}: {violation}", self.day);
        }

        match self.outcome {
            GameOutcome::Ongoing => self.day += 1,
            outcome => tracing::info!(day = self.day, ?outcome, "Game over"),
        }

        Ok(summary)
    }

    fn resolve_tasks<W: TileStock + ?Sized>(
        &self,
        colony: &mut Colony,
        world: &mut W,
        summary: &mut DaySummary,
    ) {
        let assignments: Vec<Assignment> = colony
            .survivors()
            .iter()
            .enumerate()
            .map(|(index, s)| Assignment {
                index,
                name: s.name().to_string(),
                task: s.task,
                skilled: s.has_bonus_on(s.task),
            })
            .collect();

        for assignment in assignments {
            match assignment.task {
                Task::Idle => {}
                Task::Rest => {
                    let recovery = self.rules.rest_recovery;
                    let survivor = &mut colony.survivors_mut()[assignment.index];
                    survivor.recover(recovery, recovery);
                    summary.push(format!(
                        "{} rested (health {}, morale {}).",
                        assignment.name,
                        survivor.health(),
                        survivor.morale()
                    ));
                }
                Task::Scavenge => self.scavenge(colony, world, &assignment, summary),
                Task::Build => self.build(colony, &assignment, summary),
                Task::Farm => self.farm(colony, &assignment, summary),
            }
        }
        tracing::debug!(day = self.day, "Tasks resolved");
    }

    fn scavenge<W: TileStock + ?Sized>(
        &self,
        colony: &mut Colony,
        world: &mut W,
        assignment: &Assignment,
        summary: &mut DaySummary,
    ) {
        let site = colony.scavenge_site();
        let Some(biome) = world.biome_at(site).filter(|_| world.is_explored(site)) else {
            summary.push(format!(
                "{} could not reach the scavenge site at {site}.",
                assignment.name
            ));
            return;
        };

        let mut remaining = self.rules.task_yield(assignment.skilled);
        let mut found = Vec::new();
        for &kind in biome.scavenge_kinds() {
            if remaining == 0 {
                break;
            }
            let granted = world.extract(site, kind, remaining);
            if granted > 0 {
                colony.resources_mut().credit(kind, granted);
                remaining -= granted;
                found.push(format!("{granted} {kind}"));
            }
        }

        if found.is_empty() {
            summary.push(format!(
                "{} found nothing; the site at {site} is exhausted.",
                assignment.name
            ));
        } else {
            summary.push(format!(
                "{} scavenged {} at {site}.",
                assignment.name,
                found.join(" and ")
            ));
        }
    }

    fn build(&self, colony: &mut Colony, assignment: &Assignment, summary: &mut DaySummary) {
        let amount = self.rules.task_yield(assignment.skilled);
        let Some(project) = colony.in_progress_building_mut() else {
            summary.push(format!(
                "{} had no construction project to work on.",
                assignment.name
            ));
            return;
        };

        let completed = project.add_progress(amount);
        let building_type = project.building_type();
        summary.push(format!(
            "{} worked on the {building_type} ({}/{}).",
            assignment.name,
            project.progress(),
            project.required_progress()
        ));
        if completed {
            tracing::info!(day = self.day, building = ?building_type, "Construction complete");
            summary.push(format!("Construction of the {building_type} is complete!"));
            summary.completed.push(building_type);
        }
    }

    fn farm(&self, colony: &mut Colony, assignment: &Assignment, summary: &mut DaySummary) {
        if !colony.has_completed_building(BuildingType::Farm) {
            summary.push(format!(
                "{} had no completed Farm to work on.",
                assignment.name
            ));
            return;
        }
        let amount = self.rules.task_yield(assignment.skilled);
        colony.resources_mut().credit(ResourceKind::Food, amount);
        summary.push(format!(
            "{} harvested {amount} {} from the Farm.",
            assignment.name,
            ResourceKind::Food
        ));
    }

    fn run_production(&self, colony: &mut Colony, summary: &mut DaySummary) {
        let completed: Vec<BuildingType> = colony
            .completed_buildings()
            .map(|b| b.building_type())
            .collect();

        for building_type in completed {
            if let Some(output) = self.rules.production.get(&building_type) {
                colony.resources_mut().credit(output.resource, output.amount);
                summary.push(format!(
                    "The {building_type} produced {} {}.",
                    output.amount, output.resource
                ));
            }
            if building_type == BuildingType::Infirmary {
                let bonus = self.rules.infirmary_rest_bonus;
                let mut cared_for = 0;
                for survivor in colony.survivors_mut() {
                    if survivor.task == Task::Rest {
                        survivor.recover(bonus, 0);
                        cared_for += 1;
                    }
                }
                if cared_for > 0 {
                    summary.push(format!(
                        "The Infirmary provided better care for {cared_for} resting survivor(s)."
                    ));
                }
            }
        }
        tracing::debug!(day = self.day, "Production applied");
    }

    fn run_consumption(&self, colony: &mut Colony, summary: &mut DaySummary) {
        let population = u32::try_from(colony.population()).unwrap_or(u32::MAX);
        let demand = population.saturating_mul(self.rules.consumption_per_survivor);
        summary.push(format!(
            "Colony consumed {demand} {} and {demand} {}.",
            ResourceKind::Food,
            ResourceKind::Water
        ));

        for (kind, warning) in [
            (ResourceKind::Food, "WARNING: Food shortage! Survivors are starving."),
            (ResourceKind::Water, "WARNING: Water shortage! Survivors are dehydrated."),
        ] {
            if colony.resources_mut().consume(kind, demand) {
                continue;
            }
            tracing::warn!(day = self.day, ?kind, demand, "Shortage");
            for survivor in colony.survivors_mut() {
                survivor.change_health(-self.rules.shortage_health_penalty);
                survivor.change_morale(-self.rules.shortage_morale_penalty);
            }
            summary.push(warning);
            summary.shortages.push(kind);
        }
    }

    fn run_deaths(&self, colony: &mut Colony, summary: &mut DaySummary) {
        let dead = colony.remove_dead();
        if dead.is_empty() {
            return;
        }
        for survivor in &dead {
            summary.push(format!("{} has perished.", survivor.name()));
            summary.deaths.push(survivor.id());
        }
        tracing::info!(day = self.day, deaths = dead.len(), "Survivors died");

        let grief = self.rules.grief_morale_penalty;
        if grief > 0 && colony.population() > 0 {
            for survivor in colony.survivors_mut() {
                survivor.set_morale(survivor.morale() - grief);
            }
            summary.push(format!(
                "{} survivor(s) perished today. The colony mourns.",
                dead.len()
            ));
        }
    }

    fn evaluate(&self, colony: &Colony) -> GameOutcome {
        if colony.population() == 0 {
            return GameOutcome::Lost;
        }
        let won = match self.rules.victory {
            VictoryRule::SelfSufficient { food, water } => {
                let all_built = BuildingType::ALL
                    .iter()
                    .all(|&ty| colony.has_completed_building(ty));
                all_built
                    && colony.resources().get(ResourceKind::Food) > food
                    && colony.resources().get(ResourceKind::Water) > water
            }
            VictoryRule::SurviveDays(target) => self.day >= target,
        };
        if won {
            GameOutcome::Won
        } else {
            GameOutcome::Ongoing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::{Building, BuildingCatalog};
    use crate::events::EventTable;
    use crate::resources::ResourceLedger;
    use crate::survivor::Skill;
    use crate::world::{Biome, Tile, World};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn quiet_rules() -> RuleSet {
        RuleSet {
            event_chance: 0.0,
            ..RuleSet::default()
        }
    }

    fn single_tile_world(biome: Biome, stock: &[(ResourceKind, u32)]) -> World {
        let mut ledger = ResourceLedger::new();
        for &(kind, amount) in stock {
            ledger.credit(kind, amount);
        }
        World::from_tiles(1, 1, vec![Tile::new(biome, ledger)], Location::new(0, 0)).unwrap()
    }

    fn stocked_colony() -> Colony {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Food, 100);
        ledger.credit(ResourceKind::Water, 100);
        Colony::new(ledger, Location::new(0, 0))
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0)
    }

    #[test]
    fn test_found_colony_from_rules() {
        let engine = TurnEngine::new(RuleSet::default());
        let colony = engine.found_colony(Location::new(5, 5), &mut rng());
        assert_eq!(colony.population(), 5);
        assert_eq!(colony.resources().get(ResourceKind::Food), 50);
        assert_eq!(colony.resources().get(ResourceKind::BuildingMaterials), 20);
        for s in colony.survivors() {
            assert_eq!(s.health(), 100);
            assert!((60..=100).contains(&s.morale()));
            assert_eq!(s.task, Task::Idle);
        }
    }

    #[test]
    fn test_scavenge_skill_bonus_and_finite_stock() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::CrashSite, &[(ResourceKind::BuildingMaterials, 10)]);
        let mut colony = stocked_colony();
        let kara = colony.add_survivor("Kara", Skill::Scavenging, 80);
        colony.assign_task(kara, Task::Scavenge).unwrap();

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(colony.resources().get(ResourceKind::BuildingMaterials), 8);
        assert!(summary.log.iter().any(|l| l.contains("scavenged 8 Building Materials")));

        // Only 2 left on the tile
        engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(colony.resources().get(ResourceKind::BuildingMaterials), 10);

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(colony.resources().get(ResourceKind::BuildingMaterials), 10);
        assert!(summary.log.iter().any(|l| l.contains("exhausted")));
    }

    #[test]
    fn test_scavenge_spills_into_secondary_kind() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(
            Biome::Forest,
            &[(ResourceKind::BuildingMaterials, 2), (ResourceKind::Food, 30)],
        );
        let mut colony = stocked_colony();
        let id = colony.add_survivor("Eva", Skill::None, 80);
        colony.assign_task(id, Task::Scavenge).unwrap();

        engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(colony.resources().get(ResourceKind::BuildingMaterials), 2);
        // 100 + 3 scavenged - 1 eaten
        assert_eq!(colony.resources().get(ResourceKind::Food), 102);
        assert_eq!(world.stock(Location::new(0, 0), ResourceKind::Food), 27);
    }

    #[test]
    fn test_plains_yield_water_once_forage_runs_out() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(
            Biome::Plains,
            &[(ResourceKind::Food, 2), (ResourceKind::Water, 10)],
        );
        let mut colony = stocked_colony();
        let id = colony.add_survivor("Eva", Skill::None, 80);
        colony.assign_task(id, Task::Scavenge).unwrap();

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert!(summary
            .log
            .iter()
            .any(|l| l == "Eva scavenged 2 Food and 3 Water at (0, 0)."));
        assert_eq!(colony.resources().get(ResourceKind::Food), 101);
        assert_eq!(colony.resources().get(ResourceKind::Water), 102);
        assert_eq!(world.stock(Location::new(0, 0), ResourceKind::Water), 7);
    }

    #[test]
    fn test_build_without_project_is_logged() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        let id = colony.add_survivor("Jax", Skill::Engineering, 80);
        colony.assign_task(id, Task::Build).unwrap();

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert!(summary
            .log
            .iter()
            .any(|l| l == "Jax had no construction project to work on."));
    }

    #[test]
    fn test_engineer_builds_faster() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        colony
            .insert_building(Building::new(BuildingType::Workshop, 50))
            .unwrap();
        let jax = colony.add_survivor("Jax", Skill::Engineering, 80);
        let eva = colony.add_survivor("Eva", Skill::None, 80);
        colony.assign_task(jax, Task::Build).unwrap();
        colony.assign_task(eva, Task::Build).unwrap();

        engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(colony.building(BuildingType::Workshop).unwrap().progress(), 13);
    }

    #[test]
    fn test_farm_task_requires_completed_farm() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        let leo = colony.add_survivor("Leo", Skill::Farming, 80);
        colony.assign_task(leo, Task::Farm).unwrap();

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert!(summary.log.iter().any(|l| l.contains("no completed Farm")));
        assert_eq!(colony.resources().get(ResourceKind::Food), 99);

        colony
            .insert_building(Building::completed(BuildingType::Farm, 30))
            .unwrap();
        engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        // 99 + 8 (farming) + 5 (passive) - 1
        assert_eq!(colony.resources().get(ResourceKind::Food), 111);
    }

    #[test]
    fn test_passive_production_without_workers() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        colony.add_survivor("Eva", Skill::None, 80);
        colony
            .insert_building(Building::completed(BuildingType::WaterPurifier, 25))
            .unwrap();

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(colony.resources().get(ResourceKind::Water), 104);
        assert!(summary
            .log
            .iter()
            .any(|l| l == "The Water Purifier produced 5 Water."));
    }

    #[test]
    fn test_infirmary_boosts_rest() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        colony
            .insert_building(Building::completed(BuildingType::Infirmary, 40))
            .unwrap();
        let id = colony.add_survivor("Aris", Skill::Medicine, 50);
        colony.survivor_mut(id).unwrap().set_health(40);
        colony.assign_task(id, Task::Rest).unwrap();

        engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(colony.survivor(id).unwrap().health(), 55);
        assert_eq!(colony.survivor(id).unwrap().morale(), 60);
    }

    #[test]
    fn test_shortage_penalties_are_independent() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Water, 10);
        let mut colony = Colony::new(ledger, Location::new(0, 0));
        let id = colony.add_survivor("Eva", Skill::None, 80);

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(summary.shortages, vec![ResourceKind::Food]);
        assert_eq!(colony.survivor(id).unwrap().health(), 90);
        assert_eq!(colony.survivor(id).unwrap().morale(), 75);
        assert_eq!(colony.resources().get(ResourceKind::Water), 9);
    }

    #[test]
    fn test_deaths_and_grief() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Food, 1);
        ledger.credit(ResourceKind::Water, 1);
        let mut colony = Colony::new(ledger, Location::new(0, 0));
        let frail = colony.add_survivor("Frail", Skill::None, 80);
        let hardy = colony.add_survivor("Hardy", Skill::None, 80);
        colony.survivor_mut(frail).unwrap().set_health(15);

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(summary.deaths, vec![frail]);
        assert_eq!(summary.outcome, GameOutcome::Ongoing);
        let survivor = colony.survivor(hardy).unwrap();
        assert_eq!(survivor.health(), 80);
        // 80 - 5 - 5 (shortages) - 20 (grief)
        assert_eq!(survivor.morale(), 50);
        assert!(summary.log.iter().any(|l| l == "Frail has perished."));
    }

    #[test]
    fn test_lost_is_absorbing() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = Colony::new(ResourceLedger::new(), Location::new(0, 0));
        let id = colony.add_survivor("Eva", Skill::None, 80);
        colony.survivor_mut(id).unwrap().set_health(20);

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(summary.outcome, GameOutcome::Lost);
        assert_eq!(engine.outcome(), GameOutcome::Lost);
        assert_eq!(engine.day(), 1);

        let before = colony.clone();
        assert!(matches!(
            engine.advance_day(&mut colony, &mut world, &mut rng()),
            Err(GameError::GameOver(GameOutcome::Lost))
        ));
        assert!(matches!(
            engine.start_building(&mut colony, BuildingType::Shelter),
            Err(GameError::GameOver(GameOutcome::Lost))
        ));
        assert_eq!(colony, before);
    }

    #[test]
    fn test_self_sufficient_victory() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Food, 110);
        ledger.credit(ResourceKind::Water, 100);
        let mut colony = Colony::new(ledger, Location::new(0, 0));
        colony.add_survivor("Eva", Skill::None, 80);
        for ty in BuildingType::ALL {
            colony.insert_building(Building::completed(ty, 10)).unwrap();
        }

        // Water: 100 + 5 - 1 = 104 > 100, Food: 110 + 5 - 1 = 114 > 100
        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(summary.outcome, GameOutcome::Won);
        assert!(matches!(
            engine.assign_task(&mut colony, SurvivorId(1), Task::Rest),
            Err(GameError::GameOver(GameOutcome::Won))
        ));
    }

    #[test]
    fn test_missing_building_blocks_victory() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        colony.resources_mut().credit(ResourceKind::Food, 500);
        colony.resources_mut().credit(ResourceKind::Water, 500);
        colony.add_survivor("Eva", Skill::None, 80);
        for ty in &BuildingType::ALL[..4] {
            colony.insert_building(Building::completed(*ty, 10)).unwrap();
        }

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(summary.outcome, GameOutcome::Ongoing);
    }

    #[test]
    fn test_survive_days_victory() {
        let rules = RuleSet {
            victory: VictoryRule::SurviveDays(3),
            ..quiet_rules()
        };
        let mut engine = TurnEngine::new(rules);
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        colony.add_survivor("Eva", Skill::None, 80);

        let outcomes: Vec<GameOutcome> = (0..3)
            .map(|_| {
                engine
                    .advance_day(&mut colony, &mut world, &mut rng())
                    .unwrap()
                    .outcome
            })
            .collect();
        assert_eq!(
            outcomes,
            vec![GameOutcome::Ongoing, GameOutcome::Ongoing, GameOutcome::Won]
        );
        assert_eq!(engine.day(), 3);
    }

    #[test]
    fn test_uneventful_day_logged() {
        let rules = RuleSet {
            events: EventTable::empty(),
            event_chance: 1.0,
            ..RuleSet::default()
        };
        let mut engine = TurnEngine::new(rules);
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        colony.add_survivor("Eva", Skill::None, 80);

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(summary.event, None);
        assert_eq!(
            summary.log.last().map(String::as_str),
            Some("The day passes uneventfully.")
        );
    }

    #[test]
    fn test_set_scavenge_site_bounds() {
        let engine = TurnEngine::new(quiet_rules());
        let mut world = World::generate(crate::world::WorldConfig::default());
        let mut colony = stocked_colony();

        let err = engine
            .set_scavenge_site(&mut colony, &world, Location::new(1, 1))
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidArgument(_)));
        assert_eq!(colony.scavenge_site(), Location::new(0, 0));

        engine.explore(&mut world, Location::new(1, 1)).unwrap();
        engine
            .set_scavenge_site(&mut colony, &world, Location::new(1, 1))
            .unwrap();
        assert_eq!(colony.scavenge_site(), Location::new(1, 1));

        let err = engine
            .set_scavenge_site(&mut colony, &world, Location::new(50, 0))
            .unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
        assert_eq!(colony.scavenge_site(), Location::new(1, 1));
    }

    #[test]
    fn test_unexplored_site_cannot_be_reached() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut forest = ResourceLedger::new();
        forest.credit(ResourceKind::BuildingMaterials, 20);
        let tiles = vec![
            Tile::new(Biome::CrashSite, ResourceLedger::new()),
            Tile::new(Biome::Forest, forest),
        ];
        let mut world = World::from_tiles(2, 1, tiles, Location::new(0, 0)).unwrap();
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Food, 100);
        ledger.credit(ResourceKind::Water, 100);
        let mut colony = Colony::new(ledger, Location::new(1, 0));
        let id = colony.add_survivor("Kara", Skill::Scavenging, 80);
        colony.assign_task(id, Task::Scavenge).unwrap();

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert!(summary
            .log
            .iter()
            .any(|l| l == "Kara could not reach the scavenge site at (1, 0)."));
        assert_eq!(world.stock(Location::new(1, 0), ResourceKind::BuildingMaterials), 20);

        assert_eq!(engine.explore(&mut world, Location::new(1, 0)).unwrap(), Biome::Forest);
        engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(colony.resources().get(ResourceKind::BuildingMaterials), 8);
    }

    #[test]
    fn test_explore_rejected_after_game_over() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = World::generate(crate::world::WorldConfig::default());
        let mut colony = Colony::new(ResourceLedger::new(), world.crash_site());
        let id = colony.add_survivor("Eva", Skill::None, 80);
        colony.survivor_mut(id).unwrap().set_health(5);

        assert_eq!(
            engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap().outcome,
            GameOutcome::Lost
        );
        assert!(matches!(
            engine.explore(&mut world, Location::new(0, 0)),
            Err(GameError::GameOver(GameOutcome::Lost))
        ));
        assert!(!world.is_explored(Location::new(0, 0)));
    }

    #[test]
    fn test_victory_needs_every_building_type_even_with_empty_catalog() {
        let rules = RuleSet {
            buildings: BuildingCatalog::empty(),
            ..quiet_rules()
        };
        let mut engine = TurnEngine::new(rules);
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        colony.resources_mut().credit(ResourceKind::Food, 100);
        colony.resources_mut().credit(ResourceKind::Water, 100);
        colony.add_survivor("Eva", Skill::None, 80);

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(summary.outcome, GameOutcome::Ongoing);
        assert!(colony.buildings().is_empty());
    }

    #[test]
    fn test_huge_yield_does_not_overflow() {
        let rules = RuleSet {
            task_base_yield: u32::MAX,
            ..quiet_rules()
        };
        let mut engine = TurnEngine::new(rules);
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        colony
            .insert_building(Building::new(BuildingType::Shelter, 20))
            .unwrap();
        let jax = colony.add_survivor("Jax", Skill::Engineering, 80);
        colony.assign_task(jax, Task::Build).unwrap();

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(summary.completed, vec![BuildingType::Shelter]);
        assert_eq!(colony.building(BuildingType::Shelter).unwrap().progress(), 20);
    }

    #[test]
    fn test_summary_carries_post_day_snapshot() {
        let mut engine = TurnEngine::new(quiet_rules());
        let mut world = single_tile_world(Biome::Plains, &[]);
        let mut colony = stocked_colony();
        colony.add_survivor("Eva", Skill::None, 80);
        colony.add_survivor("Jax", Skill::Engineering, 80);

        let summary = engine.advance_day(&mut colony, &mut world, &mut rng()).unwrap();
        assert_eq!(summary.population, 2);
        assert_eq!(&summary.resources, colony.resources());
        assert_eq!(summary.resources.get(ResourceKind::Food), 98);
    }
}
