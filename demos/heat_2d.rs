use zoidal::solver::*;
use zoidal::util::*;
use zoidal::Grid;

use clap::Parser;
use nalgebra::vector;

#[derive(Parser, Debug)]
#[command(version, about = "2D periodic heat diffusion, recursive vs iterative")]
struct Args {
    #[arg(long, default_value_t = 256)]
    size: i32,

    #[arg(long, default_value_t = 64)]
    steps: usize,
}

fn main() {
    let args = Args::parse();

    let dt: f64 = 1.0;
    let dx: f64 = 1.0;
    let k: f64 = 0.2;

    let mut grid: Grid<f64, 2> = Grid::zeros(vector![args.size, args.size]);
    let n_f = args.size as f64;
    let sigma_sq: f64 = (n_f / 25.0) * (n_f / 25.0);
    grid.par_set_values(
        |c| {
            let x = c[0] as f64 - n_f / 2.0;
            let y = c[1] as f64 - n_f / 2.0;
            (-(x * x + y * y) / (2.0 * sigma_sq)).exp()
        },
        1000,
    );
    let reference_seed = grid.shadow();

    let update = move |_t: usize, pos: &Coord<2>, read: &Grid<f64, 2>| {
        let size = *read.size();
        let middle = read.view(pos);
        let mut neighbors = 0.0;
        for offset in [[-1, 0], [1, 0], [0, -1], [0, 1]] {
            let neighbor = vector![
                (pos[0] + offset[0]).rem_euclid(size[0]),
                (pos[1] + offset[1]).rem_euclid(size[1])
            ];
            neighbors += read.view(&neighbor);
        }
        middle + (k * dt / (dx * dx)) * (neighbors - 4.0 * middle)
    };

    let recursive =
        stencil::<ParallelRecursive, _, _, 2>(grid, args.steps, update)
            .wait();
    let iterative =
        stencil::<CoarseGrainedIterative, _, _, 2>(reference_seed, args.steps, update)
            .wait();

    let max_diff = recursive
        .buffer()
        .iter()
        .zip(iterative.buffer().iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    let total: f64 = recursive.buffer().iter().sum();

    println!("cells:      {}", recursive.len());
    println!("steps:      {}", args.steps);
    println!("total heat: {:.9}", total);
    println!("max diff vs iterative: {:.3e}", max_diff);
}
