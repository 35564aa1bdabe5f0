//! Construction, one-time `initialize` and the repeatable `update` turn
//! pipeline (`SPEC_FULL.md` §4.8).

use crate::biomes;
use crate::cell::{Cell, TerrainType};
use crate::climate::ClimateState;
use crate::error::WorldError;
use crate::events::EventsState;
use crate::geography::GeographyState;
use crate::politics::{Faction, PoliticsState};
use crate::rng::Rng;
use crate::snapshot::WorldSnapshot;
use crate::{grid_len, index, DEFAULT_SEED, WORLD_HEIGHT, WORLD_WIDTH};

/// The sole aggregate owning every subsystem's state. Construct once with
/// [`World::create`], call [`World::initialize`] once, then
/// [`World::update`] once per simulated turn.
pub struct World {
    cells: Vec<Cell>,
    biome_terrain: Vec<TerrainType>,
    geo: GeographyState,
    clim: ClimateState,
    ev: EventsState,
    pol: PoliticsState,
    rng: Rng,
}

impl World {
    /// Allocate a new world. `seed` defaults to [`DEFAULT_SEED`] when `None`.
    ///
    /// Only the top-level cell buffer is checked with a fallible
    /// reservation; that is the single largest allocation the engine makes,
    /// so it is the one worth surfacing as [`WorldError::Allocation`] rather
    /// than letting the global allocator abort the process.
    pub fn create(seed: Option<u32>) -> Result<Self, WorldError> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(grid_len())
            .map_err(|e| WorldError::Allocation(e.to_string()))?;
        cells.resize(grid_len(), Cell::default_cell());

        let world = Self {
            cells,
            biome_terrain: vec![TerrainType::Ocean; grid_len()],
            geo: GeographyState::new(),
            clim: ClimateState::new(),
            ev: EventsState::new(),
            pol: PoliticsState::new(),
            rng: Rng::new(seed.unwrap_or(DEFAULT_SEED)),
        };

        log::debug!("world created with seed {}", world.rng.seed());
        Ok(world)
    }

    /// One-time setup: generate geography, run the first climate/river/biome
    /// pass, and carve initial faction ownership with governments.
    pub fn initialize(&mut self) {
        self.geo.initialize(&self.rng);
        self.geo.erode();
        self.geo.update_deserts();
        self.clim.update(&self.geo);
        self.geo.update_rivers(&self.clim.rainfall, &mut self.rng);
        self.run_biomes();
        self.pol.initialize();
        self.pol.update(&self.geo, &self.clim);
        self.sync_cells();
        log::debug!("world initialized");
    }

    /// Advance one turn through the full pipeline: erosion, deserts,
    /// climate, rivers, biomes, events, politics, then sync the derived
    /// view back into `Cell`. The phase order is part of the contract; see
    /// `SPEC_FULL.md` §5.
    pub fn update(&mut self) {
        self.geo.erode();
        self.geo.update_deserts();
        self.clim.update(&self.geo);
        self.geo.update_rivers(&self.clim.rainfall, &mut self.rng);
        self.run_biomes();
        self.ev.update(&mut self.geo, &mut self.rng);
        self.pol.update(&self.geo, &self.clim);
        self.pol.tick(1);
        self.pol.update_diplomacy(&mut self.rng);
        self.sync_cells();
    }

    fn run_biomes(&mut self) {
        for i in 0..grid_len() {
            self.biome_terrain[i] = biomes::classify(
                self.geo.water[i] == 1,
                self.geo.elevation[i],
                self.clim.temperature[i],
                self.clim.moisture[i],
            );
        }
    }

    /// Copy every subsystem's authoritative values into `Cell`, applying the
    /// coarse physical terrain override last (`SPEC_FULL.md` §4.8, "Two
    /// terrain writers").
    fn sync_cells(&mut self) {
        for i in 0..grid_len() {
            let elevation = self.geo.elevation[i];
            let terrain = if self.geo.water[i] == 1 {
                TerrainType::Ocean
            } else if self.geo.desert[i] == 1 {
                TerrainType::Desert
            } else if elevation > 2000.0 {
                TerrainType::Mountains
            } else if elevation > 1000.0 {
                TerrainType::Hills
            } else {
                TerrainType::Plains
            };

            self.cells[i] = Cell {
                terrain,
                elevation_m: elevation,
                temperature_c: self.clim.temperature[i],
                moisture: self.clim.moisture[i],
                pressure_hpa: self.clim.pressure[i],
                wind: (self.clim.wind_x[i], self.clim.wind_y[i]),
                tectonic_stress: self.geo.tectonic_stress[i],
                river_volume: self.geo.river_volume[i],
                political_owner: self.pol.ownership[i],
            };
        }
    }

    // -- read-only external view (`SPEC_FULL.md` §4.9) --

    pub fn width(&self) -> usize {
        WORLD_WIDTH
    }

    pub fn height(&self) -> usize {
        WORLD_HEIGHT
    }

    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[index(x, y)]
    }

    /// The rich biome classification for `(x, y)`, re-derived each call from
    /// the current geography/climate state rather than read off `Cell`
    /// (`SPEC_FULL.md` §9, "Two terrain writers").
    pub fn biome(&self, x: usize, y: usize) -> TerrainType {
        self.biome_terrain[index(x, y)]
    }

    pub fn faction(&self, id: usize) -> Option<&Faction> {
        self.pol.factions.get(id)
    }

    pub fn ownership(&self, x: usize, y: usize) -> i32 {
        self.pol.ownership[index(x, y)]
    }

    /// `(min, max)` temperature across the whole grid.
    pub fn temperature_range(&self) -> (f32, f32) {
        range(&self.clim.temperature)
    }

    /// `(min, max)` elevation across the whole grid.
    pub fn elevation_range(&self) -> (f32, f32) {
        range(&self.geo.elevation)
    }

    pub fn event_count(&self) -> usize {
        self.ev.count()
    }

    pub fn dropped_event_count(&self) -> u64 {
        self.ev.dropped_event_count
    }

    /// Snapshot every grid, the faction table, the event pool and the RNG
    /// seed, byte-identically restorable via [`WorldSnapshot`]
    /// (`SPEC_FULL.md` §6, "Persisted state").
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            geo: self.geo.clone(),
            clim: self.clim.clone(),
            ev: self.ev.clone(),
            pol: self.pol.clone(),
            rng: self.rng,
        }
    }

    /// Rebuild cells and the cached biome view from a restored snapshot.
    pub fn restore(&mut self, snapshot: WorldSnapshot) {
        self.geo = snapshot.geo;
        self.clim = snapshot.clim;
        self.ev = snapshot.ev;
        self.pol = snapshot.pol;
        self.rng = snapshot.rng;
        self.run_biomes();
        self.sync_cells();
    }
}

fn range(values: &[f32]) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &v in values {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    (min, max)
}
