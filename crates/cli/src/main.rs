use std::{env, path::PathBuf, process};

use worldsim_engine::World;

const DEFAULT_TURNS: u32 = 8;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("WORLDSIM_LOG", "warn")).init();

    if let Err(message) = run() {
        eprintln!("{message}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut seed: Option<u32> = None;
    let mut turns = DEFAULT_TURNS;
    let mut out_dir = PathBuf::from("out/");

    let mut i = 0;
    while i < args.len() {
        let (flag, inline_value) = split_flag(&args[i]);
        let mut take_value = || -> Result<String, String> {
            if let Some(v) = inline_value {
                return Ok(v.to_string());
            }
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{flag} requires a value"))
        };

        match flag {
            "--seed" => {
                let value = take_value()?;
                seed = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| format!("invalid seed '{value}'. Use an unsigned integer"))?,
                );
            }
            "--turns" => {
                let value = take_value()?;
                turns = value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid turns '{value}'. Use an unsigned integer"))?;
            }
            "--out" => {
                let value = take_value()?;
                out_dir = PathBuf::from(value);
            }
            other => return Err(format!("unrecognized argument '{other}'")),
        }
        i += 1;
    }

    let mut world = World::create(seed).map_err(|e| e.to_string())?;
    log::info!("world created with seed {:?}, running {turns} turns", seed);
    world.initialize();
    for turn in 0..turns {
        world.update();
        log::debug!("turn {turn} complete");
    }

    worldsim_render::write_geography(&world, &out_dir.join("geo.ppm")).map_err(|e| e.to_string())?;
    worldsim_render::write_politics(&world, &out_dir.join("politics.ppm"))
        .map_err(|e| e.to_string())?;
    worldsim_render::write_climate(&world, &out_dir.join("climate.ppm"))
        .map_err(|e| e.to_string())?;
    worldsim_render::write_biomes(&world, &out_dir.join("biomes.ppm")).map_err(|e| e.to_string())?;

    println!("Wrote geo.ppm, politics.ppm, climate.ppm, biomes.ppm to {}", out_dir.display());
    Ok(())
}

fn split_flag(arg: &str) -> (&str, Option<&str>) {
    match arg.split_once('=') {
        Some((flag, value)) => (flag, Some(value)),
        None => (arg, None),
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  worldsim [--seed N] [--turns K] [--out DIR]");
    println!("Defaults:");
    println!(
        "  seed={} turns={DEFAULT_TURNS} out=out/",
        worldsim_engine::DEFAULT_SEED
    );
}
