//! Fixed-capacity pool of transient hazards (`SPEC_FULL.md` §4.6).

use crate::geography::GeographyState;
use crate::rng::Rng;
use crate::{index, MAX_EVENTS, WORLD_HEIGHT, WORLD_WIDTH};

/// A transient hazard kind. `Plague` and `Boom` are reserved for the
/// higher-level "civ" layer and are never spawned by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EventKind {
    Earthquake,
    Volcano,
    Storm,
    Drought,
    Plague,
    Boom,
}

/// One live hazard in the pool.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub x: usize,
    pub y: usize,
    pub duration_turns: u32,
}

/// The packed, ordered event pool plus the tectonic stress grid events
/// consult and reset.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventsState {
    pool: Vec<Event>,
    /// Spawn attempts silently dropped because the pool was full. Added for
    /// observability only; spawn logic is unchanged by it
    /// (`SPEC_FULL.md` §9, Open Question 4).
    pub dropped_event_count: u64,
}

impl EventsState {
    pub fn new() -> Self {
        Self {
            pool: Vec::with_capacity(MAX_EVENTS),
            dropped_event_count: 0,
        }
    }

    /// Number of live events.
    pub fn count(&self) -> usize {
        self.pool.len()
    }

    /// The live events, in pool order.
    pub fn events(&self) -> &[Event] {
        &self.pool
    }

    /// Decrement every active event's duration and stably compact survivors,
    /// then roll spawn attempts for earthquakes (tectonic stress) and storms
    /// (ocean cells), in row-major order.
    pub fn update(&mut self, geo: &mut GeographyState, rng: &mut Rng) {
        for event in &mut self.pool {
            event.duration_turns = event.duration_turns.saturating_sub(1);
        }
        self.pool.retain(|e| e.duration_turns > 0);

        for y in 0..WORLD_HEIGHT {
            for x in 0..WORLD_WIDTH {
                let i = index(x, y);
                let stress = geo.tectonic_stress[i];
                let roll = rng.next_f32();
                if roll < stress * 0.001 {
                    self.try_spawn(EventKind::Earthquake, x, y, 2);
                    geo.tectonic_stress[i] = 0.0;
                }
            }
        }

        for y in 1..WORLD_HEIGHT - 1 {
            for x in 1..WORLD_WIDTH - 1 {
                if geo.water[index(x, y)] != 1 {
                    continue;
                }
                let roll = rng.next_f32();
                if roll < 0.0005 {
                    self.try_spawn(EventKind::Storm, x, y, 3);
                }
            }
        }
    }

    fn try_spawn(&mut self, kind: EventKind, x: usize, y: usize, duration_turns: u32) {
        if self.pool.len() >= MAX_EVENTS {
            self.dropped_event_count += 1;
            log::warn!("event pool full ({MAX_EVENTS}); dropped spawn of {kind:?} at ({x},{y})");
            return;
        }
        self.pool.push(Event {
            kind,
            x,
            y,
            duration_turns,
        });
    }
}

impl Default for EventsState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stress_world_spawns_no_earthquakes() {
        let mut geo = GeographyState::new();
        geo.tectonic_stress.fill(0.0);
        geo.water.fill(0); // land everywhere, so storms can't mask the assertion either
        let mut events = EventsState::new();
        let mut rng = Rng::new(123);

        for _ in 0..10 {
            events.update(&mut geo, &mut rng);
        }

        assert!(events
            .events()
            .iter()
            .all(|e| e.kind != EventKind::Earthquake));
    }

    #[test]
    fn pool_never_exceeds_capacity() {
        let mut geo = GeographyState::new();
        geo.tectonic_stress.fill(1000.0); // guarantee every roll spawns
        let mut events = EventsState::new();
        let mut rng = Rng::new(1);

        for _ in 0..5 {
            events.update(&mut geo, &mut rng);
            assert!(events.count() <= MAX_EVENTS);
        }
        assert!(events.dropped_event_count > 0);
    }

    #[test]
    fn every_live_event_has_positive_duration() {
        let mut geo = GeographyState::new();
        geo.tectonic_stress.fill(500.0);
        let mut events = EventsState::new();
        let mut rng = Rng::new(42);

        for _ in 0..20 {
            events.update(&mut geo, &mut rng);
            assert!(events.events().iter().all(|e| e.duration_turns >= 1));
        }
    }
}
