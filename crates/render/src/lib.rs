//! PPM export views over a [`worldsim_engine::World`]. Every view is a pure
//! read of the engine's public accessors; nothing here mutates the world.

pub mod ppm;

pub use ppm::{write_biomes, write_climate, write_geography, write_politics};
