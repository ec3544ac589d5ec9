use zoidal::solver::*;
use zoidal::util::*;
use zoidal::Grid;

use clap::{Parser, ValueEnum};
use nalgebra::vector;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Strategy {
    SequentialIterative,
    CoarseGrained,
    FineGrained,
    SequentialRecursive,
    ParallelRecursive,
}

#[derive(Parser, Debug)]
#[command(version, about = "1D periodic heat diffusion")]
struct Args {
    #[arg(long, default_value_t = 1000)]
    size: i32,

    #[arg(long, default_value_t = 128)]
    steps: usize,

    #[arg(long, value_enum, default_value = "fine-grained")]
    strategy: Strategy,
}

fn main() {
    let args = Args::parse();

    // Step size t
    let dt: f64 = 1.0;

    // Step size x
    let dx: f64 = 1.0;

    // Heat transfer coefficient
    let k: f64 = 0.5;

    // Fill in with IC values (use normal dist for spike in the middle)
    let mut grid: Grid<f64, 1> = Grid::zeros(vector![args.size]);
    let n_f = args.size as f64;
    let sigma_sq: f64 = (n_f / 25.0) * (n_f / 25.0);
    grid.par_set_values(
        |c| {
            let x = c[0] as f64 - n_f / 2.0;
            (-x * x / (2.0 * sigma_sq)).exp()
        },
        100,
    );
    let initial_total: f64 = grid.buffer().iter().sum();

    let update = move |_t: usize, pos: &Coord<1>, read: &Grid<f64, 1>| {
        let size = read.size()[0];
        let left = read.view(&vector![(pos[0] + size - 1) % size]);
        let middle = read.view(pos);
        let right = read.view(&vector![(pos[0] + 1) % size]);
        middle + (k * dt / (dx * dx)) * (left - 2.0 * middle + right)
    };

    let steps = args.steps;
    let handle = match args.strategy {
        Strategy::SequentialIterative => {
            stencil::<SequentialIterative, _, _, 1>(grid, steps, update)
        }
        Strategy::CoarseGrained => {
            stencil::<CoarseGrainedIterative, _, _, 1>(grid, steps, update)
        }
        Strategy::FineGrained => {
            stencil::<FineGrainedIterative, _, _, 1>(grid, steps, update)
        }
        Strategy::SequentialRecursive => {
            stencil::<SequentialRecursive, _, _, 1>(grid, steps, update)
        }
        Strategy::ParallelRecursive => {
            stencil::<ParallelRecursive, _, _, 1>(grid, steps, update)
        }
    };
    let grid = handle.wait();

    let total: f64 = grid.buffer().iter().sum();
    let peak = grid
        .buffer()
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    println!("strategy:   {:?}", args.strategy);
    println!("cells:      {}", grid.len());
    println!("steps:      {}", steps);
    println!("total heat: {:.9} (initial {:.9})", total, initial_total);
    println!("peak:       {:.9}", peak);
}
