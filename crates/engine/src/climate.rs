//! Temperature, pressure, wind and rainfall (`SPEC_FULL.md` §4.4).
//!
//! `update` runs three passes over the grid in a fixed order: temperature
//! and pressure are fused into one pass for cache locality, wind reads
//! this-turn pressure, and rainfall reads this-turn temperature and wind.
//! Reordering these passes would change the result and is forbidden.

use crate::geography::GeographyState;
use crate::{grid_len, index, MAX_TEMPERATURE, WORLD_HEIGHT, WORLD_WIDTH};

/// Climate substate for every cell.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClimateState {
    pub temperature: Vec<f32>,
    pub pressure: Vec<f32>,
    pub wind_x: Vec<f32>,
    pub wind_y: Vec<f32>,
    pub rainfall: Vec<f32>,
    /// Normalized rainfall, the moisture channel biome classification reads
    /// (`SPEC_FULL.md` §9, Open Question 2).
    pub moisture: Vec<f32>,
}

/// `rainfall / MOISTURE_REFERENCE`, clamped to `[0, 1]`, is this port's
/// chosen rainfall-to-moisture normalization.
const MOISTURE_REFERENCE: f32 = 10.0;

impl ClimateState {
    pub fn new() -> Self {
        Self {
            temperature: vec![0.0; grid_len()],
            pressure: vec![1013.0; grid_len()],
            wind_x: vec![0.0; grid_len()],
            wind_y: vec![0.0; grid_len()],
            rainfall: vec![0.0; grid_len()],
            moisture: vec![0.0; grid_len()],
        }
    }

    /// Run the temperature/pressure, wind and rainfall passes, in order.
    /// The formulas here never consult the RNG; the engine still threads one
    /// through every other subsystem to keep the orchestrator's call shape
    /// uniform.
    pub fn update(&mut self, geo: &GeographyState) {
        self.update_temperature_and_pressure(geo);
        self.update_wind();
        self.update_rainfall(geo);
    }

    fn update_temperature_and_pressure(&mut self, geo: &GeographyState) {
        for y in 0..WORLD_HEIGHT {
            let lat = 2.0 * (y as f32 / (WORLD_HEIGHT - 1) as f32 - 0.5).abs();
            let base = (1.0 - lat) * MAX_TEMPERATURE;

            for x in 0..WORLD_WIDTH {
                let i = index(x, y);
                let temperature = base - (geo.elevation[i] / 1000.0) * 6.5;
                self.temperature[i] = temperature;
                self.pressure[i] = 1013.0 - temperature * 0.12;
            }
        }
    }

    fn update_wind(&mut self) {
        self.wind_x.iter_mut().for_each(|v| *v = 0.0);
        self.wind_y.iter_mut().for_each(|v| *v = 0.0);

        for y in 1..WORLD_HEIGHT - 1 {
            for x in 1..WORLD_WIDTH - 1 {
                let east = self.pressure[index(x + 1, y)];
                let west = self.pressure[index(x - 1, y)];
                let south = self.pressure[index(x, y + 1)];
                let north = self.pressure[index(x, y - 1)];

                self.wind_x[index(x, y)] = -((east - west) / 2.0) * 0.01;
                self.wind_y[index(x, y)] = -((south - north) / 2.0) * 0.01;
            }
        }
    }

    fn update_rainfall(&mut self, geo: &GeographyState) {
        for i in 0..grid_len() {
            let evap = if geo.water[i] == 1 { 0.2 } else { 0.05 } * self.temperature[i]
                / MAX_TEMPERATURE;
            let wind_mag = (self.wind_x[i].powi(2) + self.wind_y[i].powi(2)).sqrt();
            let cond = wind_mag * 0.05;
            let rainfall = (evap - cond).max(0.0);
            self.rainfall[i] = rainfall;
            self.moisture[i] = (rainfall / MOISTURE_REFERENCE).min(1.0);
        }
    }
}

impl Default for ClimateState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    #[test]
    fn wind_is_zero_on_the_border() {
        let mut geo = GeographyState::new();
        geo.initialize(&Rng::new(4));
        let mut clim = ClimateState::new();
        clim.update(&geo);

        for x in 0..WORLD_WIDTH {
            assert_eq!(clim.wind_x[index(x, 0)], 0.0);
            assert_eq!(clim.wind_y[index(x, 0)], 0.0);
            assert_eq!(clim.wind_x[index(x, WORLD_HEIGHT - 1)], 0.0);
        }
        for y in 0..WORLD_HEIGHT {
            assert_eq!(clim.wind_x[index(0, y)], 0.0);
            assert_eq!(clim.wind_x[index(WORLD_WIDTH - 1, y)], 0.0);
        }
    }

    #[test]
    fn rainfall_and_moisture_are_non_negative_and_bounded() {
        let mut geo = GeographyState::new();
        geo.initialize(&Rng::new(9));
        let mut clim = ClimateState::new();
        clim.update(&geo);

        for i in 0..grid_len() {
            assert!(clim.rainfall[i] >= 0.0);
            assert!((0.0..=1.0).contains(&clim.moisture[i]));
        }
    }
}
