//! Persisted-state contract: everything needed to byte-identically resume a
//! world, independent of any file format (`SPEC_FULL.md` §6, "Persisted
//! state").

use crate::climate::ClimateState;
use crate::events::EventsState;
use crate::geography::GeographyState;
use crate::politics::PoliticsState;
use crate::rng::Rng;

/// A serializable copy of every grid, the faction table, the event pool and
/// the RNG stream. Deliberately separate from [`crate::world::World`], which
/// also owns a derived `Cell` grid and cached biome view that can always be
/// rebuilt from this data via [`crate::world::World::restore`] rather than
/// carried across the wire.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WorldSnapshot {
    pub geo: GeographyState,
    pub clim: ClimateState,
    pub ev: EventsState,
    pub pol: PoliticsState,
    pub rng: Rng,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    #[test]
    fn snapshot_round_trip_reproduces_cells() {
        let mut world = World::create(Some(3)).unwrap();
        world.initialize();
        world.update();

        let snapshot = world.snapshot();
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: WorldSnapshot = serde_json::from_str(&encoded).unwrap();

        let mut restored = World::create(Some(3)).unwrap();
        restored.restore(decoded);

        for y in 0..world.height() {
            for x in 0..world.width() {
                assert_eq!(world.cell(x, y), restored.cell(x, y));
            }
        }

        // the restored world must still erode cleanly (scratch buffer
        // correctly rebuilt at the right length after deserialization)
        restored.update();
    }
}
