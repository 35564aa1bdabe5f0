//! The four `P3` ASCII export views (`SPEC_FULL.md` §6, "PPM output
//! format"). Bit-exact: header, row order and every color constant below
//! are part of the contract, not a rendering choice.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use worldsim_engine::{TerrainType, WorldError, World, MAX_ELEVATION, MAX_TEMPERATURE, MIN_TEMPERATURE};

const WATER_COLOR: (u8, u8, u8) = (0, 0, 128);
const RIVER_COLOR: (u8, u8, u8) = (0, 100, 255);
const UNOWNED_COLOR: (u8, u8, u8) = (200, 200, 200);
const RIVER_THRESHOLD: f32 = 5.0;

/// Write `geo.ppm`: grayscale elevation, with water and river overrides.
pub fn write_geography(world: &World, path: &Path) -> Result<(), WorldError> {
    write_view(world, path, |world, x, y| {
        let cell = world.cell(x, y);
        if cell.terrain == TerrainType::Ocean {
            return WATER_COLOR;
        }
        if cell.river_volume > RIVER_THRESHOLD {
            return RIVER_COLOR;
        }
        let v = (cell.elevation_m / MAX_ELEVATION * 255.0).clamp(0.0, 255.0) as u8;
        (v, v, v)
    })
}

/// Write `politics.ppm`: faction color per owned land cell.
pub fn write_politics(world: &World, path: &Path) -> Result<(), WorldError> {
    write_view(world, path, |world, x, y| {
        let cell = world.cell(x, y);
        if cell.terrain == TerrainType::Ocean {
            return WATER_COLOR;
        }
        if cell.political_owner < 0 {
            return UNOWNED_COLOR;
        }
        world
            .faction(cell.political_owner as usize)
            .map(|f| f.color_rgb)
            .unwrap_or(UNOWNED_COLOR)
    })
}

/// Write `climate.ppm`: temperature mapped linearly to a red/blue gradient.
pub fn write_climate(world: &World, path: &Path) -> Result<(), WorldError> {
    write_view(world, path, |world, x, y| {
        let cell = world.cell(x, y);
        let span = MAX_TEMPERATURE - MIN_TEMPERATURE;
        let t = ((cell.temperature_c - MIN_TEMPERATURE) / span).clamp(0.0, 1.0);
        ((t * 255.0) as u8, 0, ((1.0 - t) * 255.0) as u8)
    })
}

/// Write `biomes.ppm`: the rich per-terrain biome palette.
pub fn write_biomes(world: &World, path: &Path) -> Result<(), WorldError> {
    write_view(world, path, |world, x, y| {
        let cell = world.cell(x, y);
        if cell.terrain == TerrainType::Ocean {
            return WATER_COLOR;
        }
        if cell.river_volume > RIVER_THRESHOLD {
            return RIVER_COLOR;
        }
        match world.biome(x, y) {
            TerrainType::Ocean => WATER_COLOR,
            TerrainType::Desert => (240, 230, 140),
            TerrainType::Forest => (34, 139, 34),
            TerrainType::Tundra => (200, 200, 200),
            TerrainType::Snow => (255, 255, 255),
            TerrainType::Mountains => (100, 100, 100),
            TerrainType::Hills => (160, 160, 100),
            TerrainType::Plains => (107, 142, 35),
        }
    })
}

fn write_view(
    world: &World,
    path: &Path,
    pixel: impl Fn(&World, usize, usize) -> (u8, u8, u8),
) -> Result<(), WorldError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write!(out, "P3\n{} {}\n255\n", world.width(), world.height())?;

    for y in 0..world.height() {
        for x in 0..world.width() {
            let (r, g, b) = pixel(world, x, y);
            if x > 0 {
                write!(out, " ")?;
            }
            write!(out, "{r} {g} {b}")?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_world() -> World {
        let mut world = World::create(Some(42)).unwrap();
        world.initialize();
        world
    }

    #[test]
    fn geography_ppm_has_bit_exact_header() {
        let world = sample_world();
        let dir = std::env::temp_dir().join("worldsim_render_test_geo");
        let path = dir.join("geo.ppm");
        write_geography(&world, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("P3\n256 256\n255\n"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn all_four_views_write_one_row_per_height() {
        let world = sample_world();
        let dir = std::env::temp_dir().join("worldsim_render_test_all");
        for (name, writer) in [
            ("geo.ppm", write_geography as fn(&World, &Path) -> Result<(), WorldError>),
            ("politics.ppm", write_politics),
            ("climate.ppm", write_climate),
            ("biomes.ppm", write_biomes),
        ] {
            let path = dir.join(name);
            writer(&world, &path).unwrap();
            let contents = fs::read_to_string(&path).unwrap();
            assert_eq!(contents.lines().count(), 3 + world.height());
        }
        let _ = fs::remove_dir_all(&dir);
    }
}
