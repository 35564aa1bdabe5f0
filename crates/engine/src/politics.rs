//! Per-cell faction ownership, diplomacy and government evolution
//! (`SPEC_FULL.md` §4.7).

use crate::cell::RelationshipType;
use crate::climate::ClimateState;
use crate::geography::GeographyState;
use crate::rng::Rng;
use crate::{grid_len, index, MAX_FACTIONS, WORLD_HEIGHT, WORLD_WIDTH};

/// A faction's evolving form of government. Traits are biased once by the
/// harshness/fertility of the land it controls, then drift with age.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Government {
    pub centralization: f32,
    pub democracy: f32,
    pub efficiency: f32,
    pub age_turns: u32,
    pub title: String,
}

impl Government {
    fn new(centralization: f32, democracy: f32, efficiency: f32) -> Self {
        let mut gov = Self {
            centralization: centralization.clamp(0.0, 1.0),
            democracy: democracy.clamp(0.0, 1.0),
            efficiency: efficiency.clamp(0.0, 1.0),
            age_turns: 0,
            title: String::new(),
        };
        gov.title = title_for(&gov);
        gov
    }

    fn tick(&mut self, dt: u32) {
        self.age_turns += dt;
        self.title = title_for(self);
    }
}

/// Deterministic governance naming: centralization/democracy pick the
/// quadrant, age picks how matured the polity's name sounds.
fn title_for(gov: &Government) -> String {
    let mature = gov.age_turns >= 20;
    match (gov.centralization >= 0.55, gov.democracy >= 0.55) {
        (true, false) => if mature { "Empire" } else { "Chiefdom" },
        (true, true) => if mature { "Commonwealth" } else { "Union" },
        (false, true) => if mature { "Republic" } else { "Assembly" },
        (false, false) => if mature { "Kingdom" } else { "Dominion" },
    }
    .to_string()
}

/// One political faction.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Faction {
    pub id: i32,
    pub name: String,
    pub color_rgb: (u8, u8, u8),
    pub gold: i32,
    pub military_strength: i32,
    pub government: Option<Government>,
}

impl Faction {
    fn new(id: usize) -> Self {
        let mixed = (id as u32).wrapping_mul(2_654_435_761);
        let bytes = mixed.to_le_bytes();
        let mut color = (bytes[0], bytes[1], bytes[2]);
        if color.0 < 64 && color.1 < 64 && color.2 < 64 {
            color.0 = color.0.saturating_add(128);
        }

        Self {
            id: id as i32,
            name: format!("Faction_{id}"),
            color_rgb: color,
            gold: 100,
            military_strength: 50,
            government: None,
        }
    }

    fn display_name(&self) -> String {
        match &self.government {
            Some(gov) => format!("The {}", gov.title),
            None => self.name.clone(),
        }
    }
}

/// Per-cell ownership, the faction table and the symmetric diplomacy matrix.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PoliticsState {
    pub factions: Vec<Faction>,
    pub ownership: Vec<i32>,
    diplomacy: Vec<RelationshipType>,
}

impl PoliticsState {
    pub fn new() -> Self {
        Self {
            factions: Vec::with_capacity(MAX_FACTIONS),
            ownership: vec![-1; grid_len()],
            diplomacy: vec![RelationshipType::Neutral; MAX_FACTIONS * MAX_FACTIONS],
        }
    }

    /// Spawn `MAX_FACTIONS` factions with deterministic colors and a
    /// `Neutral`-everywhere, `Ally`-on-diagonal diplomacy matrix.
    pub fn initialize(&mut self) {
        self.factions = (0..MAX_FACTIONS).map(Faction::new).collect();
        self.ownership.fill(-1);
        for i in 0..MAX_FACTIONS {
            for j in 0..MAX_FACTIONS {
                self.diplomacy[i * MAX_FACTIONS + j] = if i == j {
                    RelationshipType::Ally
                } else {
                    RelationshipType::Neutral
                };
            }
        }
    }

    /// On the first call (`ownership[0][0] == -1`), carve every land cell to
    /// a faction by coordinate hash. Then (re)compute environmental stats
    /// and instantiate a government for every faction that owns land and
    /// doesn't have one yet.
    pub fn update(&mut self, geo: &GeographyState, clim: &ClimateState) {
        if self.ownership[index(0, 0)] == -1 {
            self.carve_ownership(geo);
        }

        let stats = self.environment_stats(geo, clim);
        for (id, stat) in stats.iter().enumerate() {
            if stat.land_cells == 0 {
                continue;
            }
            if self.factions[id].government.is_some() {
                continue;
            }
            self.form_government(id, stat);
        }
    }

    fn carve_ownership(&mut self, geo: &GeographyState) {
        for y in 0..WORLD_HEIGHT {
            for x in 0..WORLD_WIDTH {
                let i = index(x, y);
                if geo.water[i] == 1 {
                    self.ownership[i] = -1;
                    continue;
                }
                let hash = (x as u32).wrapping_mul(73_856_093) ^ (y as u32).wrapping_mul(19_349_663);
                self.ownership[i] = (hash as usize % MAX_FACTIONS) as i32;
            }
        }
    }

    fn environment_stats(&self, geo: &GeographyState, clim: &ClimateState) -> Vec<FactionStats> {
        let mut stats = vec![FactionStats::default(); MAX_FACTIONS];
        for i in 0..grid_len() {
            let owner = self.ownership[i];
            if owner < 0 {
                continue;
            }
            let s = &mut stats[owner as usize];
            s.land_cells += 1;
            s.temperature_sum += clim.temperature[i];
            s.rainfall_sum += clim.rainfall[i];
            s.elevation_sum += geo.elevation[i];
        }
        stats
    }

    fn form_government(&mut self, id: usize, stat: &FactionStats) {
        let mean_temp = stat.temperature_sum / stat.land_cells as f32;
        let mean_rain = stat.rainfall_sum / stat.land_cells as f32;
        let mean_elev = stat.elevation_sum / stat.land_cells as f32;

        let harshness = 0.5 * (mean_temp > 25.0) as i32 as f32
            + 0.6 * (mean_temp < -5.0) as i32 as f32
            + 0.3 * (mean_elev > 1500.0) as i32 as f32;
        let fertility = 0.4 * (mean_rain > 5.0 && mean_rain < 15.0) as i32 as f32
            + 0.4 * (mean_temp > 10.0 && mean_temp < 25.0) as i32 as f32;

        let (centralization, democracy) = if harshness > 0.4 {
            self.factions[id].military_strength += 20;
            (0.8 + 0.1 * harshness, 0.2 - 0.1 * harshness)
        } else if fertility > 0.5 {
            (0.3, 0.7 + 0.1 * fertility)
        } else {
            (0.5, 0.5)
        };
        let efficiency = if fertility > 0.5 && harshness <= 0.4 {
            0.6
        } else {
            0.5
        };

        let gov = Government::new(centralization, democracy, efficiency);
        let faction = &mut self.factions[id];
        faction.government = Some(gov);
        faction.name = faction.display_name();
    }

    /// Advance every faction's government by `dt` turns and regenerate its
    /// display name.
    pub fn tick(&mut self, dt: u32) {
        for faction in &mut self.factions {
            if let Some(gov) = &mut faction.government {
                gov.tick(dt);
                faction.name = format!("The {}", gov.title);
            }
        }
    }

    /// Bounds-checked, symmetric relationship lookup; out-of-range ids yield
    /// `Neutral` rather than failing.
    pub fn get_relationship(&self, a: usize, b: usize) -> RelationshipType {
        if a >= MAX_FACTIONS || b >= MAX_FACTIONS {
            return RelationshipType::Neutral;
        }
        self.diplomacy[a * MAX_FACTIONS + b]
    }

    /// Bounds-checked, symmetric relationship update; out-of-range ids are a
    /// no-op.
    pub fn set_relationship(&mut self, a: usize, b: usize, rel: RelationshipType) {
        if a >= MAX_FACTIONS || b >= MAX_FACTIONS {
            return;
        }
        self.diplomacy[a * MAX_FACTIONS + b] = rel;
        self.diplomacy[b * MAX_FACTIONS + a] = rel;
    }

    /// For every unordered faction pair, a 5% chance to worsen by one level
    /// (capped at `War`) and a 5% chance to improve by one level (capped at
    /// `Ally`), drawn from the shared RNG stream.
    pub fn update_diplomacy(&mut self, rng: &mut Rng) {
        for i in 0..MAX_FACTIONS {
            for j in (i + 1)..MAX_FACTIONS {
                let current = self.get_relationship(i, j);

                if rng.next_f32() < 0.05 && current != RelationshipType::War {
                    self.set_relationship(i, j, current.worsen());
                }

                let current = self.get_relationship(i, j);
                if rng.next_f32() < 0.05 && current != RelationshipType::Ally {
                    self.set_relationship(i, j, current.improve());
                }
            }
        }
    }
}

impl Default for PoliticsState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct FactionStats {
    land_cells: u64,
    temperature_sum: f32,
    rainfall_sum: f32,
    elevation_sum: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    #[test]
    fn water_cells_are_never_owned() {
        let mut geo = GeographyState::new();
        geo.initialize(&Rng::new(5));
        let mut pol = PoliticsState::new();
        pol.initialize();
        pol.carve_ownership(&geo);

        for i in 0..grid_len() {
            if geo.water[i] == 1 {
                assert_eq!(pol.ownership[i], -1);
            } else {
                assert!(pol.ownership[i] >= 0 && (pol.ownership[i] as usize) < MAX_FACTIONS);
            }
        }
    }

    #[test]
    fn diplomacy_matrix_stays_symmetric_and_valid() {
        let mut pol = PoliticsState::new();
        pol.initialize();
        let mut rng = Rng::new(77);

        for _ in 0..1000 {
            pol.update_diplomacy(&mut rng);
            for i in 0..MAX_FACTIONS {
                assert_eq!(pol.get_relationship(i, i), RelationshipType::Ally);
                for j in 0..MAX_FACTIONS {
                    assert_eq!(pol.get_relationship(i, j), pol.get_relationship(j, i));
                }
            }
        }
    }

    #[test]
    fn out_of_range_faction_ids_yield_neutral() {
        let pol = PoliticsState::new();
        assert_eq!(pol.get_relationship(50, 1), RelationshipType::Neutral);
    }

    #[test]
    fn diagonal_is_always_ally_after_init() {
        let mut pol = PoliticsState::new();
        pol.initialize();
        for i in 0..MAX_FACTIONS {
            assert_eq!(pol.get_relationship(i, i), RelationshipType::Ally);
        }
    }
}
