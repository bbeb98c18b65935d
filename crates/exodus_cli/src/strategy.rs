//! Scripted planners for autoplay.
//!
//! A strategy looks at the session between days and returns the commands a
//! careful player would issue. It never touches the colony directly.

use std::path::Path;

use exodus_core::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for strategy operations.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// File not found.
    #[error("Strategy file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read strategy file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse strategy: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// A scripted build order with simple task rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Buildings to raise, in order.
    pub build_order: Vec<BuildingType>,
    /// Survivors below this health rest instead of working.
    pub rest_below_health: i32,
    /// Survivors sent to the construction site while a project is open.
    pub builders: usize,
    /// Survivors working the farm once it stands.
    pub farmers: usize,
    /// Food reserve below which scavengers look for food first.
    pub food_reserve: u32,
    /// Water reserve below which scavengers look for water first.
    pub water_reserve: u32,
    /// Tiles surveyed per day, nearest to the crash site first.
    pub explore_per_day: usize,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            name: "Settler".to_string(),
            build_order: vec![
                BuildingType::Farm,
                BuildingType::WaterPurifier,
                BuildingType::Shelter,
                BuildingType::Infirmary,
                BuildingType::Workshop,
            ],
            rest_below_health: 50,
            builders: 2,
            farmers: 1,
            food_reserve: 15,
            water_reserve: 15,
            explore_per_day: 1,
        }
    }
}

impl Strategy {
    /// Load a strategy from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, StrategyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrategyError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> std::result::Result<Self, StrategyError> {
        let strategy: Self = ron::from_str(ron)?;
        Ok(strategy)
    }

    /// Commands to issue before the next day.
    #[must_use]
    pub fn plan(&self, session: &Session) -> Vec<Command> {
        let colony = session.colony();
        let rules = session.rules();
        let mut commands = Vec::new();

        let next = self.next_building(colony);
        let mut building_open = colony.in_progress_building().is_some();
        if !building_open {
            if let Some(building) = next {
                let affordable = rules
                    .buildings
                    .get(building)
                    .is_some_and(|bp| colony.resources().can_afford(&bp.cost));
                if affordable {
                    commands.push(Command::StartBuilding { building });
                    building_open = true;
                }
            }
        }

        for location in frontier(session.world()).take(self.explore_per_day) {
            commands.push(Command::Explore { location });
        }

        let wanted = self.wanted_resource(colony, rules, next, building_open);
        if let Some(location) = pick_scavenge_site(session.world(), wanted) {
            if location != colony.scavenge_site() {
                commands.push(Command::SetScavengeSite { location });
            }
        }

        for (survivor, task) in self.assign_tasks(colony, building_open) {
            let current = colony.survivor(survivor).map(|s| s.task);
            if current != Some(task) {
                commands.push(Command::AssignTask { survivor, task });
            }
        }

        commands
    }

    fn next_building(&self, colony: &Colony) -> Option<BuildingType> {
        self.build_order
            .iter()
            .copied()
            .find(|&ty| colony.building(ty).is_none())
    }

    /// What scavengers should look for: food or water when reserves run
    /// low, then whatever the next building lacks, then materials.
    fn wanted_resource(
        &self,
        colony: &Colony,
        rules: &RuleSet,
        next: Option<BuildingType>,
        building_open: bool,
    ) -> ResourceKind {
        if colony.resources().get(ResourceKind::Food) < self.food_reserve
            && !colony.has_completed_building(BuildingType::Farm)
        {
            return ResourceKind::Food;
        }
        if colony.resources().get(ResourceKind::Water) < self.water_reserve
            && !colony.has_completed_building(BuildingType::WaterPurifier)
        {
            return ResourceKind::Water;
        }
        if !building_open {
            let shortfall = next
                .and_then(|ty| rules.buildings.get(ty))
                .and_then(|bp| {
                    bp.cost
                        .iter()
                        .find(|&(&kind, &amount)| colony.resources().get(kind) < amount)
                        .map(|(&kind, _)| kind)
                });
            if let Some(kind) = shortfall {
                return kind;
            }
        }
        ResourceKind::BuildingMaterials
    }

    fn assign_tasks(&self, colony: &Colony, building_open: bool) -> Vec<(SurvivorId, Task)> {
        let mut plan: Vec<(SurvivorId, Task)> = Vec::with_capacity(colony.population());
        let mut healthy: Vec<&Survivor> = Vec::new();
        for survivor in colony.survivors() {
            if survivor.health() < self.rest_below_health {
                plan.push((survivor.id(), Task::Rest));
            } else {
                healthy.push(survivor);
            }
        }

        if building_open {
            for id in take_skilled(&mut healthy, Skill::Engineering, self.builders) {
                plan.push((id, Task::Build));
            }
        }
        if colony.has_completed_building(BuildingType::Farm) {
            for id in take_skilled(&mut healthy, Skill::Farming, self.farmers) {
                plan.push((id, Task::Farm));
            }
        }
        for survivor in healthy {
            plan.push((survivor.id(), Task::Scavenge));
        }
        plan
    }
}

/// Remove up to `count` survivors from the pool, matching skill first.
fn take_skilled(pool: &mut Vec<&Survivor>, skill: Skill, count: usize) -> Vec<SurvivorId> {
    // Stable sort keeps roster order within each group.
    pool.sort_by_key(|s| s.skill != skill);
    let n = count.min(pool.len());
    pool.drain(..n).map(Survivor::id).collect()
}

/// Every tile ordered by distance from the crash site, ties by row then
/// column.
fn by_distance(world: &World) -> Vec<Location> {
    let origin = world.crash_site();
    let mut tiles: Vec<Location> = (0..world.height())
        .flat_map(|y| (0..world.width()).map(move |x| Location::new(x, y)))
        .collect();
    tiles.sort_by_key(|&loc| (loc.distance_squared(origin), loc.y, loc.x));
    tiles
}

/// Unexplored tiles, nearest first.
fn frontier(world: &World) -> impl Iterator<Item = Location> + '_ {
    by_distance(world)
        .into_iter()
        .filter(move |&loc| !world.is_explored(loc))
}

/// Nearest explored tile where a scavenger would draw `wanted` first.
/// Falls back to any explored tile holding `wanted`, then to any explored
/// tile that is not exhausted.
#[must_use]
pub fn pick_scavenge_site(world: &World, wanted: ResourceKind) -> Option<Location> {
    let tiles: Vec<Location> = by_distance(world)
        .into_iter()
        .filter(|&loc| world.is_explored(loc))
        .collect();

    let first_kind = |loc: Location| -> Option<ResourceKind> {
        let biome = world.biome_at(loc)?;
        biome
            .scavenge_kinds()
            .iter()
            .copied()
            .find(|&kind| world.stock(loc, kind) > 0)
    };

    tiles
        .iter()
        .copied()
        .find(|&loc| first_kind(loc) == Some(wanted))
        .or_else(|| {
            tiles.iter().copied().find(|&loc| {
                world
                    .biome_at(loc)
                    .is_some_and(|b| b.scavenge_kinds().contains(&wanted))
                    && world.stock(loc, wanted) > 0
            })
        })
        .or_else(|| tiles.iter().copied().find(|&loc| first_kind(loc).is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exodus_test_utils::fixtures::{default_session, single_tile_world};

    #[test]
    fn test_default_build_order() {
        let strategy = Strategy::default();
        assert_eq!(strategy.build_order[0], BuildingType::Farm);
        assert_eq!(strategy.build_order[1], BuildingType::WaterPurifier);
    }

    #[test]
    fn test_strategy_from_ron() {
        let strategy =
            Strategy::from_ron_str("(name: \"Cautious\", rest_below_health: 70)").unwrap();
        assert_eq!(strategy.name, "Cautious");
        assert_eq!(strategy.rest_below_health, 70);
        assert_eq!(strategy.builders, 2);
    }

    #[test]
    fn test_strategy_load_missing() {
        let err = Strategy::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, StrategyError::FileNotFound(_)));
    }

    #[test]
    fn test_first_plan_assigns_everyone() {
        let session = default_session(5);
        let commands = Strategy::default().plan(&session);
        let assigned = commands
            .iter()
            .filter(|c| matches!(c, Command::AssignTask { .. }))
            .count();
        assert_eq!(assigned, 5);
        // 20 materials cannot pay for a farm yet
        assert!(!commands
            .iter()
            .any(|c| matches!(c, Command::StartBuilding { .. })));
    }

    #[test]
    fn test_plan_commands_are_accepted() {
        let mut session = default_session(8);
        let strategy = Strategy::default();
        for _ in 0..10 {
            if session.is_over() {
                break;
            }
            for command in strategy.plan(&session) {
                session.execute(command).unwrap();
            }
            session.advance_day().unwrap();
        }
    }

    #[test]
    fn test_pick_site_prefers_wanted_kind() {
        let world = single_tile_world(Biome::Ruins, &[(ResourceKind::Medicine, 5)]);
        assert_eq!(
            pick_scavenge_site(&world, ResourceKind::Medicine),
            Some(Location::new(0, 0))
        );
        let pond = single_tile_world(Biome::Plains, &[(ResourceKind::Water, 5)]);
        assert_eq!(
            pick_scavenge_site(&pond, ResourceKind::Water),
            Some(Location::new(0, 0))
        );
        let empty = single_tile_world(Biome::Wasteland, &[]);
        assert_eq!(pick_scavenge_site(&empty, ResourceKind::Food), None);
    }

    #[test]
    fn test_plan_explores_nearest_tile_first() {
        let session = default_session(5);
        let crash = session.world().crash_site();
        let explores: Vec<Location> = Strategy::default()
            .plan(&session)
            .into_iter()
            .filter_map(|c| match c {
                Command::Explore { location } => Some(location),
                _ => None,
            })
            .collect();
        assert_eq!(explores, vec![Location::new(crash.x, crash.y - 1)]);
    }

    #[test]
    fn test_pick_site_ignores_unexplored_tiles() {
        let mut session = default_session(6);
        let crash = session.world().crash_site();
        // Only the crash site is known, and it yields no Food.
        assert_eq!(
            pick_scavenge_site(session.world(), ResourceKind::Food),
            Some(crash)
        );

        let north = Location::new(crash.x, crash.y - 1);
        session.explore(north).unwrap();
        // Plains draw Food first.
        assert_eq!(
            pick_scavenge_site(session.world(), ResourceKind::Food),
            Some(north)
        );
    }
}
