//! The explorable world around the crash site.
//!
//! Tiles hold a finite stock of resources. The turn engine only reads and
//! depletes stock through the [`TileStock`] trait, so scavenging can never
//! create resources a tile does not have.
//!
//! Only the crash site is explored at landfall. Scavengers can only be sent
//! to explored tiles.
//!
//! Generation is deterministic for a given seed.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::resources::{ResourceKind, ResourceLedger};

/// Grid coordinates of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Location {
    /// Create a location.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance, to avoid sqrt.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> u64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        (dx * dx + dy * dy).unsigned_abs()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Terrain type of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    /// Where the ship came down.
    CrashSite,
    /// Timber and forage.
    Forest,
    /// Ore and raw energy.
    Mountains,
    /// Old structures; salvage and medicine.
    Ruins,
    /// Open ground with forage and standing water.
    Plains,
    /// Nothing of value.
    Wasteland,
}

impl Biome {
    /// Resource kinds a scavenger draws from, in priority order.
    #[must_use]
    pub const fn scavenge_kinds(self) -> &'static [ResourceKind] {
        use ResourceKind::{BuildingMaterials, Energy, Food, Medicine, Water};
        match self {
            Self::CrashSite => &[BuildingMaterials, Water],
            Self::Forest => &[BuildingMaterials, Food],
            Self::Mountains => &[BuildingMaterials, Energy],
            Self::Ruins => &[BuildingMaterials, Medicine],
            Self::Plains => &[Food, Water],
            Self::Wasteland => &[],
        }
    }

    /// Inclusive stock ranges rolled at generation time.
    const fn stock_ranges(self) -> &'static [(ResourceKind, u32, u32)] {
        use ResourceKind::{BuildingMaterials, Energy, Food, Medicine, Water};
        match self {
            // Ruptured ship tanks.
            Self::CrashSite => &[(BuildingMaterials, 5, 14), (Water, 10, 30)],
            Self::Forest => &[(Food, 10, 30), (BuildingMaterials, 20, 50)],
            Self::Mountains => &[(BuildingMaterials, 30, 60), (Energy, 5, 20)],
            Self::Ruins => &[(BuildingMaterials, 10, 40), (Medicine, 0, 10)],
            Self::Plains => &[(Food, 5, 20), (Water, 5, 20)],
            Self::Wasteland => &[],
        }
    }
}

/// One cell of the world grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Terrain type.
    pub biome: Biome,
    /// Remaining resources on the tile.
    pub stock: ResourceLedger,
    /// Whether the colony has surveyed this tile.
    #[serde(default)]
    pub explored: bool,
}

impl Tile {
    /// Create an unexplored tile with an explicit stock.
    #[must_use]
    pub fn new(biome: Biome, stock: ResourceLedger) -> Self {
        Self {
            biome,
            stock,
            explored: false,
        }
    }

    /// Whether every resource the biome yields is used up.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.biome
            .scavenge_kinds()
            .iter()
            .all(|&kind| self.stock.get(kind) == 0)
    }
}

/// Read and deplete finite tile resources.
///
/// This is the engine's only view of the world.
pub trait TileStock {
    /// Biome at `location`, or `None` when out of bounds.
    fn biome_at(&self, location: Location) -> Option<Biome>;

    /// Remaining stock of `kind` at `location`. Zero when out of bounds.
    fn stock(&self, location: Location, kind: ResourceKind) -> u32;

    /// Remove up to `requested` of `kind` from `location`.
    ///
    /// Returns the amount actually granted, which may be less than
    /// requested (or zero) when the tile runs dry.
    fn extract(&mut self, location: Location, kind: ResourceKind, requested: u32) -> u32;

    /// Whether `location` has been explored. `false` when out of bounds.
    fn is_explored(&self, location: Location) -> bool;

    /// Survey an unexplored tile and reveal its biome.
    ///
    /// # Errors
    ///
    /// [`GameError::NotFound`] when out of bounds,
    /// [`GameError::InvalidArgument`] when the tile is already explored.
    fn explore(&mut self, location: Location) -> Result<Biome>;
}

/// World generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Grid width in tiles.
    pub width: u32,
    /// Grid height in tiles.
    pub height: u32,
    /// Random seed for deterministic generation.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            seed: 12345,
        }
    }
}

impl WorldConfig {
    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Rectangular grid of tiles with the crash site at its centre.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct World {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    crash_site: Location,
}

impl World {
    /// Generate a world from a configuration.
    ///
    /// Biomes depend on distance from the crash site: plains close in,
    /// forest/mountains/plains further out, ruins and wasteland at the edge.
    /// Zero dimensions are raised to one.
    #[must_use]
    pub fn generate(config: WorldConfig) -> Self {
        let width = config.width.max(1);
        let height = config.height.max(1);
        let crash_site = Location::new(width / 2, height / 2);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let mut tiles = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                let location = Location::new(x, y);
                let dist_sq = location.distance_squared(crash_site);
                let biome = if location == crash_site {
                    Biome::CrashSite
                } else if dist_sq < 4 {
                    Biome::Plains
                } else if dist_sq < 16 {
                    match rng.gen_range(0..3) {
                        0 => Biome::Forest,
                        1 => Biome::Mountains,
                        _ => Biome::Plains,
                    }
                } else if rng.gen_bool(0.5) {
                    Biome::Ruins
                } else {
                    Biome::Wasteland
                };
                let mut tile = Tile::new(biome, roll_stock(biome, &mut rng));
                tile.explored = location == crash_site;
                tiles.push(tile);
            }
        }

        tracing::debug!(width, height, seed = config.seed, "World generated");

        Self {
            width,
            height,
            tiles,
            crash_site,
        }
    }

    /// Build a world from explicit tiles in row-major order.
    ///
    /// The crash site is marked explored. Returns `None` if the tile count
    /// does not match the dimensions or the crash site is out of bounds.
    #[must_use]
    pub fn from_tiles(
        width: u32,
        height: u32,
        tiles: Vec<Tile>,
        crash_site: Location,
    ) -> Option<Self> {
        let expected = (width as usize) * (height as usize);
        let mut world = Self {
            width,
            height,
            tiles,
            crash_site,
        };
        if expected == 0 || world.tiles.len() != expected {
            return None;
        }
        world.tile_mut(crash_site)?.explored = true;
        Some(world)
    }

    /// Locations of every explored tile in row-major order.
    pub fn explored(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| Location::new(x, y)))
            .filter(move |&loc| self.is_explored(loc))
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Where the colony landed.
    #[must_use]
    pub const fn crash_site(&self) -> Location {
        self.crash_site
    }

    /// Check if a location is within the grid.
    #[must_use]
    pub const fn in_bounds(&self, location: Location) -> bool {
        location.x < self.width && location.y < self.height
    }

    /// Tile at `location`, or `None` when out of bounds.
    #[must_use]
    pub fn tile(&self, location: Location) -> Option<&Tile> {
        self.index(location).map(|i| &self.tiles[i])
    }

    fn tile_mut(&mut self, location: Location) -> Option<&mut Tile> {
        self.index(location).map(|i| &mut self.tiles[i])
    }

    fn index(&self, location: Location) -> Option<usize> {
        self.in_bounds(location)
            .then(|| (location.y as usize) * (self.width as usize) + (location.x as usize))
    }
}

impl TileStock for World {
    fn biome_at(&self, location: Location) -> Option<Biome> {
        self.tile(location).map(|tile| tile.biome)
    }

    fn stock(&self, location: Location, kind: ResourceKind) -> u32 {
        self.tile(location).map_or(0, |tile| tile.stock.get(kind))
    }

    fn extract(&mut self, location: Location, kind: ResourceKind, requested: u32) -> u32 {
        self.tile_mut(location)
            .map_or(0, |tile| tile.stock.take_up_to(kind, requested))
    }

    fn is_explored(&self, location: Location) -> bool {
        self.tile(location).is_some_and(|tile| tile.explored)
    }

    fn explore(&mut self, location: Location) -> Result<Biome> {
        let tile = self
            .tile_mut(location)
            .ok_or_else(|| GameError::NotFound(format!("tile {location}")))?;
        if tile.explored {
            return Err(GameError::InvalidArgument(format!(
                "tile {location} is already explored"
            )));
        }
        tile.explored = true;
        Ok(tile.biome)
    }
}

fn roll_stock(biome: Biome, rng: &mut impl Rng) -> ResourceLedger {
    let mut stock = ResourceLedger::new();
    for &(kind, min, max) in biome.stock_ranges() {
        stock.credit(kind, rng.gen_range(min..=max));
    }
    stock
}
