//! Elevation, erosion, water/desert masks and river volume
//! (`SPEC_FULL.md` §4.3).
//!
//! Geography operations never fail: a missing/invalid input is a no-op, per
//! the failure semantics in §4.3.

use crate::rng::{noise2d, Rng};
use crate::{grid_len, index, neighbors, MAX_ELEVATION, SEA_LEVEL, WORLD_HEIGHT, WORLD_WIDTH};

/// Geography substate: elevation plus the masks/grids derived from it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GeographyState {
    pub elevation: Vec<f32>,
    pub water: Vec<u8>,
    pub desert: Vec<u8>,
    pub river_volume: Vec<f32>,
    /// Tectonic stress driving earthquake spawns. Not listed among the
    /// spec's `GeographyState` grids, but `Cell.tectonic_stress` needs a
    /// turn-to-turn backing store and geography is its natural owner; set
    /// once at `initialize` from local elevation roughness and otherwise
    /// only reset to 0 by an earthquake (`SPEC_FULL.md` §4.6).
    pub tectonic_stress: Vec<f32>,
    /// Erosion's read-only scratch buffer, owned here so no per-turn
    /// allocation is needed (`SPEC_FULL.md` §9, "Double buffering"). Skipped
    /// by serde and rebuilt at the right length on deserialize, since a
    /// restored world's very next `erode()` call would otherwise panic on a
    /// length mismatch.
    #[serde(skip, default = "scratch_default")]
    scratch: Vec<f32>,
}

fn scratch_default() -> Vec<f32> {
    vec![0.0; grid_len()]
}

impl GeographyState {
    /// Allocate zero-initialized grids (elevation = 0, all water, per the
    /// `elevation <= SEA_LEVEL` invariant).
    pub fn new() -> Self {
        Self {
            elevation: vec![0.0; grid_len()],
            water: vec![1; grid_len()],
            desert: vec![0; grid_len()],
            river_volume: vec![0.0; grid_len()],
            tectonic_stress: vec![0.0; grid_len()],
            scratch: vec![0.0; grid_len()],
        }
    }

    /// Generate elevation as 4-octave value noise, recompute the water mask,
    /// derive tectonic stress from local elevation roughness, and clear
    /// desert/river state.
    pub fn initialize(&mut self, rng: &Rng) {
        const BASE_FREQUENCY: f64 = 0.05;
        const OCTAVES: u32 = 4;

        for y in 0..WORLD_HEIGHT {
            for x in 0..WORLD_WIDTH {
                let mut amplitude = 1.0_f32;
                let mut frequency = BASE_FREQUENCY;
                let mut total = 0.0_f32;
                let mut max_amplitude = 0.0_f32;

                for _ in 0..OCTAVES {
                    total += value_noise(rng, x as f64 * frequency, y as f64 * frequency)
                        * amplitude;
                    max_amplitude += amplitude;
                    amplitude *= 0.5;
                    frequency *= 2.0;
                }

                let normalized = total / max_amplitude; // ~[0,1)
                self.elevation[index(x, y)] = normalized * MAX_ELEVATION;
            }
        }

        self.recompute_water();
        self.recompute_tectonic_stress();
        self.desert.fill(0);
        self.river_volume.fill(0.0);
    }

    fn recompute_tectonic_stress(&mut self) {
        for y in 0..WORLD_HEIGHT {
            for x in 0..WORLD_WIDTH {
                let here = self.elevation[index(x, y)];
                let mut sum = 0.0_f32;
                let mut count = 0u32;
                for (nx, ny) in neighbors(x, y) {
                    sum += self.elevation[index(nx, ny)];
                    count += 1;
                }
                let roughness = if count > 0 {
                    (here - sum / count as f32).abs()
                } else {
                    0.0
                };
                self.tectonic_stress[index(x, y)] = roughness / 50.0;
            }
        }
    }

    /// Move every interior cell's elevation toward the mean of its 8
    /// neighbors by a factor of `0.1`, reading from a snapshot so the pass
    /// never aliases writes with reads. Border cells are untouched.
    pub fn erode(&mut self) {
        self.scratch.copy_from_slice(&self.elevation);

        for y in 1..WORLD_HEIGHT - 1 {
            for x in 1..WORLD_WIDTH - 1 {
                let mut sum = 0.0_f32;
                let mut count = 0u32;
                for (nx, ny) in neighbors(x, y) {
                    sum += self.scratch[index(nx, ny)];
                    count += 1;
                }
                let mean = sum / count as f32;
                let e = self.scratch[index(x, y)];
                self.elevation[index(x, y)] = e + 0.1 * (mean - e);
            }
        }

        self.recompute_water();
    }

    /// Reclassify land below 500 m as desert, by elevation alone. Moisture
    /// is deliberately not consulted here (`SPEC_FULL.md` §9, Open
    /// Question 3).
    pub fn update_deserts(&mut self) {
        for i in 0..grid_len() {
            self.desert[i] = if self.water[i] == 0 && self.elevation[i] < 500.0 {
                1
            } else {
                0
            };
        }
    }

    /// Zero river volume, then trace `2*W*H` deterministic droplets,
    /// descending toward strictly-lower neighbors until a pit or the sea.
    pub fn update_rivers(&mut self, rainfall: &[f32], rng: &mut Rng) {
        self.river_volume.fill(0.0);

        let droplet_count = 2 * grid_len();
        for _ in 0..droplet_count {
            let sx = rng.next_below(WORLD_WIDTH as u32) as usize;
            let sy = rng.next_below(WORLD_HEIGHT as u32) as usize;

            if rainfall[index(sx, sy)] < 0.1 {
                continue;
            }

            let (mut x, mut y) = (sx, sy);
            loop {
                self.river_volume[index(x, y)] += 1.0;
                if self.water[index(x, y)] == 1 {
                    break;
                }

                let current_elevation = self.elevation[index(x, y)];
                let mut lowest: Option<(usize, usize, f32)> = None;
                for (nx, ny) in neighbors(x, y) {
                    let e = self.elevation[index(nx, ny)];
                    if e < current_elevation {
                        match lowest {
                            Some((_, _, best)) if e >= best => {}
                            _ => lowest = Some((nx, ny, e)),
                        }
                    }
                }

                match lowest {
                    Some((nx, ny, _)) => {
                        x = nx;
                        y = ny;
                    }
                    None => break,
                }
            }
        }
    }

    fn recompute_water(&mut self) {
        for i in 0..grid_len() {
            self.water[i] = if self.elevation[i] <= SEA_LEVEL { 1 } else { 0 };
        }
    }
}

impl Default for GeographyState {
    fn default() -> Self {
        Self::new()
    }
}

/// Bilinearly-interpolated value noise built from [`noise2d`] lattice
/// samples, in `[0, 1)`.
fn value_noise(rng: &Rng, x: f64, y: f64) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let xi = x0 as i32;
    let yi = y0 as i32;
    let tx = (x - x0) as f32;
    let ty = (y - y0) as f32;

    let c00 = noise2d(rng, xi, yi);
    let c10 = noise2d(rng, xi + 1, yi);
    let c01 = noise2d(rng, xi, yi + 1);
    let c11 = noise2d(rng, xi + 1, yi + 1);

    let sx = fade(tx);
    let sy = fade(ty);

    let top = c00 + sx * (c10 - c00);
    let bottom = c01 + sx * (c11 - c01);
    top + sy * (bottom - top)
}

fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_mask_matches_elevation_after_init() {
        let mut geo = GeographyState::new();
        geo.initialize(&Rng::new(7));
        for i in 0..grid_len() {
            let expected = if geo.elevation[i] <= SEA_LEVEL { 1 } else { 0 };
            assert_eq!(geo.water[i], expected);
        }
    }

    #[test]
    fn erosion_leaves_border_untouched() {
        let mut geo = GeographyState::new();
        geo.initialize(&Rng::new(3));
        let before = geo.elevation.clone();
        geo.erode();

        for x in 0..WORLD_WIDTH {
            assert_eq!(geo.elevation[index(x, 0)], before[index(x, 0)]);
            assert_eq!(
                geo.elevation[index(x, WORLD_HEIGHT - 1)],
                before[index(x, WORLD_HEIGHT - 1)]
            );
        }
        for y in 0..WORLD_HEIGHT {
            assert_eq!(geo.elevation[index(0, y)], before[index(0, y)]);
            assert_eq!(
                geo.elevation[index(WORLD_WIDTH - 1, y)],
                before[index(WORLD_WIDTH - 1, y)]
            );
        }
    }

    #[test]
    fn erosion_does_not_increase_max_elevation() {
        let mut geo = GeographyState::new();
        geo.initialize(&Rng::new(11));
        let max_before = geo.elevation.iter().cloned().fold(f32::MIN, f32::max);
        geo.erode();
        let max_after = geo.elevation.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max_after <= max_before + f32::EPSILON);
    }

    #[test]
    fn rainfall_above_threshold_leaves_a_positive_descent_trail() {
        let mut geo = GeographyState::new();
        // A uniform downhill slope toward a water border at x=0.
        for y in 0..WORLD_HEIGHT {
            for x in 0..WORLD_WIDTH {
                geo.elevation[index(x, y)] = x as f32;
            }
        }
        geo.water.fill(0);
        for y in 0..WORLD_HEIGHT {
            geo.water[index(0, y)] = 1;
        }

        let rainfall = vec![1.0; grid_len()]; // every droplet clears the 0.1mm threshold
        let mut rng = Rng::new(1);
        geo.update_rivers(&rainfall, &mut rng);

        let total: f32 = geo.river_volume.iter().sum();
        assert!(total > 0.0);
        // every column east of the water border lies on some droplet's path
        let mid_row_has_flow = (1..WORLD_WIDTH)
            .any(|x| geo.river_volume[index(x, WORLD_HEIGHT / 2)] > 0.0);
        assert!(mid_row_has_flow);
    }

    #[test]
    fn rainfall_below_threshold_rejects_every_droplet() {
        let mut geo = GeographyState::new();
        geo.initialize(&Rng::new(5));
        let rainfall = vec![0.0; grid_len()]; // below the 0.1mm threshold everywhere
        let mut rng = Rng::new(5);
        geo.update_rivers(&rainfall, &mut rng);
        assert!(geo.river_volume.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn desert_reclassification_ignores_moisture() {
        let mut geo = GeographyState::new();
        geo.elevation[index(5, 5)] = 100.0;
        geo.water[index(5, 5)] = 0;
        geo.update_deserts();
        assert_eq!(geo.desert[index(5, 5)], 1);
    }

    #[test]
    fn river_volume_and_tectonic_stress_never_go_negative() {
        let mut geo = GeographyState::new();
        geo.initialize(&Rng::new(13));
        geo.erode();
        let rainfall = vec![1.0; grid_len()];
        let mut rng = Rng::new(13);
        geo.update_rivers(&rainfall, &mut rng);

        assert!(geo.river_volume.iter().all(|&v| v >= 0.0));
        assert!(geo.tectonic_stress.iter().all(|&s| s >= 0.0));
    }
}
