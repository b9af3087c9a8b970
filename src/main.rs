use std::{
    fs,
    path::{Path, PathBuf},
    process::exit,
    time::Duration,
};

use clap::Parser;
use lifers::{Engine, Grid, GridConfig, PatternError, Sim};

pub use utils::Pos;
mod utils;

pub use view::View;
mod view;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Side of the square board.
    #[arg(long, default_value_t = GridConfig::default().size)]
    size: usize,

    /// Share of cells seeded alive, between 0 and 1.
    #[arg(long, default_value_t = GridConfig::default().density)]
    density: f64,

    /// Milliseconds between generations while running.
    #[arg(long, default_value_t = GridConfig::default().delay.as_millis() as u64)]
    delay_ms: u64,

    /// Seed for the board generator, random when absent.
    #[arg(long)]
    seed: Option<u64>,

    /// Text file stamped on an empty board instead of a random seed.
    #[arg(long)]
    pattern: Option<PathBuf>,
}

fn deserialize(str: &str) -> Vec<Pos> {
    let mut result = vec![];
    let mut pos = pos!(0, 0);
    for c in str.chars() {
        match c {
            '#' => {
                result.push(pos);
                pos.x += 1
            }
            '\n' => pos = pos!(0, pos.y + 1),
            _ => pos.x += 1,
        }
    }
    result
}

fn stamp(cells: &[Pos], grid: &mut Grid) -> Result<(), PatternError> {
    let required = cells
        .iter()
        .map(|pos| pos.x.max(pos.y) as usize + 1)
        .max()
        .unwrap_or(0);
    let size = grid.size();
    if required > size {
        return Err(PatternError::TooLarge { required, size });
    }

    for pos in cells {
        grid.set(pos.x as usize, pos.y as usize, true);
    }
    Ok(())
}

fn load_pattern(path: &Path, grid: &mut Grid) -> Result<(), PatternError> {
    let text = fs::read_to_string(path)?;
    stamp(&deserialize(&text), grid)
}

pub fn main() {
    env_logger::init();
    let args = Args::parse();

    // A pattern replaces the random seeding, so the board starts blank.
    let density = if args.pattern.is_some() { 0.0 } else { args.density };
    let config = GridConfig {
        size: args.size,
        density,
        delay: Duration::from_millis(args.delay_ms),
        seed: args.seed,
    };

    let mut grid = Grid::new(config).unwrap_or_else(|error| {
        eprintln!("[error] {error}");
        exit(1);
    });
    if let Some(path) = &args.pattern {
        load_pattern(path, &mut grid).unwrap_or_else(|error| {
            eprintln!("[error] {}: {error}", path.display());
            exit(1);
        });
    }

    let simulation = Sim::spawn(Engine::new(grid));
    let view = View::spawn(simulation.handle());
    view.join();
    simulation.join();
}
