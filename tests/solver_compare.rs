use zoidal::solver::*;
use zoidal::util::*;
use zoidal::Grid;

use float_cmp::assert_approx_eq;
use nalgebra::vector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn run_impl<I, T, F, const GRID_DIMENSION: usize>(
    initial: &Grid<T, GRID_DIMENSION>,
    steps: usize,
    update: F,
) -> Grid<T, GRID_DIMENSION>
where
    I: Implementation + 'static,
    T: CellValue,
    F: UpdateFn<T, GRID_DIMENSION> + Copy + 'static,
{
    stencil::<I, T, F, GRID_DIMENSION>(initial.shadow(), steps, update).wait()
}

/// Run all five implementations on the same problem, check they agree
/// cell for cell, and return the reference result.
fn assert_all_agree<T, const GRID_DIMENSION: usize>(
    initial: &Grid<T, GRID_DIMENSION>,
    steps: usize,
    update: impl UpdateFn<T, GRID_DIMENSION> + Copy + 'static,
) -> Grid<T, GRID_DIMENSION>
where
    T: CellValue + PartialEq + std::fmt::Debug,
{
    let reference =
        run_impl::<SequentialIterative, T, _, GRID_DIMENSION>(initial, steps, update);

    let coarse =
        run_impl::<CoarseGrainedIterative, T, _, GRID_DIMENSION>(initial, steps, update);
    assert_eq!(reference.buffer(), coarse.buffer(), "coarse grained");

    let fine =
        run_impl::<FineGrainedIterative, T, _, GRID_DIMENSION>(initial, steps, update);
    assert_eq!(reference.buffer(), fine.buffer(), "fine grained");

    let recursive =
        run_impl::<SequentialRecursive, T, _, GRID_DIMENSION>(initial, steps, update);
    assert_eq!(reference.buffer(), recursive.buffer(), "sequential recursive");

    let parallel =
        run_impl::<ParallelRecursive, T, _, GRID_DIMENSION>(initial, steps, update);
    assert_eq!(reference.buffer(), parallel.buffer(), "parallel recursive");

    reference
}

#[test]
fn shift_1d_compare() {
    // Three steps of a periodic left shift.
    let initial: Grid<i32, 1> =
        Grid::new(vector![8], (0..8).collect::<Vec<i32>>());
    let update = |_t: usize, pos: &Coord<1>, read: &Grid<i32, 1>| {
        read.view(&vector![(pos[0] + 1) % 8])
    };

    let result = assert_all_agree(&initial, 3, update);
    assert_eq!(result.buffer(), &[3, 4, 5, 6, 7, 0, 1, 2]);
}

#[test]
fn averaging_1d_compare() {
    // One step of integer three-point averaging over length 16.
    let initial: Grid<i32, 1> =
        Grid::new(vector![16], (0..16).collect::<Vec<i32>>());
    let update = |_t: usize, pos: &Coord<1>, read: &Grid<i32, 1>| {
        (read.view(&vector![(pos[0] + 15) % 16])
            + read.view(pos)
            + read.view(&vector![(pos[0] + 1) % 16]))
            / 3
    };

    let result = assert_all_agree(&initial, 1, update);
    // Interior cells average to themselves; the seam cells do not.
    assert_eq!(result.view(&vector![0]), 5);
    for i in 1..15 {
        assert_eq!(result.view(&vector![i]), i);
    }
    assert_eq!(result.view(&vector![15]), 9);
}

#[test]
fn parity_1d_compare() {
    // Odd step count: the final state must land in the caller's grid.
    let initial: Grid<i32, 1> = Grid::new(vector![4], vec![1, 0, 0, 0]);
    let update = |_t: usize, pos: &Coord<1>, read: &Grid<i32, 1>| {
        read.view(pos) + 1
    };

    let result = assert_all_agree(&initial, 5, update);
    assert_eq!(result.buffer(), &[6, 5, 5, 5]);
}

#[test]
fn diffusion_2d_compare() {
    let mut initial: Grid<i32, 2> = Grid::zeros(vector![8, 8]);
    initial.par_set_values(|c| c[0] + c[1], 8);
    let update = |_t: usize, pos: &Coord<2>, read: &Grid<i32, 2>| {
        let size = *read.size();
        let mut sum = 0;
        for offset in [[-1, 0], [1, 0], [0, -1], [0, 1]] {
            let neighbor = vector![
                (pos[0] + offset[0]).rem_euclid(size[0]),
                (pos[1] + offset[1]).rem_euclid(size[1])
            ];
            sum += read.view(&neighbor);
        }
        sum / 4
    };

    assert_all_agree(&initial, 2, update);
}

#[test]
fn zero_steps_compare() {
    let mut initial: Grid<i32, 2> = Grid::zeros(vector![5, 9]);
    initial.par_set_values(|c| c[0] * 13 - c[1], 8);
    let update = |_t: usize, pos: &Coord<2>, read: &Grid<i32, 2>| {
        read.view(pos) + 100
    };

    let result = assert_all_agree(&initial, 0, update);
    assert_eq!(result.buffer(), initial.buffer());
}

#[test]
fn terminal_width_domain_compare() {
    // Width 2 sits below the zoid terminal threshold; the recursive
    // drivers must still match the iterative reference.
    let initial: Grid<i32, 1> = Grid::new(vector![2], vec![3, 11]);
    let update = |_t: usize, pos: &Coord<1>, read: &Grid<i32, 1>| {
        read.view(&vector![(pos[0] + 1) % 2]) + 1
    };

    assert_all_agree(&initial, 10, update);
}

#[test]
fn thin_domain_compare() {
    // Width 1 cannot host a zoid plan at all.
    let initial: Grid<i32, 1> = Grid::new(vector![1], vec![42]);
    let update = |t: usize, _pos: &Coord<1>, read: &Grid<i32, 1>| {
        read.view(&vector![0]) + t as i32
    };

    assert_all_agree(&initial, 7, update);
}

#[test]
fn time_dependent_update_compare() {
    // The update may depend on t; phases must see the right times.
    let initial: Grid<i32, 1> =
        Grid::new(vector![12], (0..12).collect::<Vec<i32>>());
    let update = |t: usize, pos: &Coord<1>, read: &Grid<i32, 1>| {
        let size = read.size()[0];
        if t % 2 == 0 {
            read.view(&vector![(pos[0] + 1) % size])
        } else {
            read.view(&vector![(pos[0] + size - 1) % size]) * 2
        }
    };

    assert_all_agree(&initial, 6, update);
}

#[test]
fn random_1d_compare() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut buffer = vec![0i32; 64];
    for value in buffer.iter_mut() {
        *value = rng.gen_range(-1000..1000);
    }
    let initial: Grid<i32, 1> = Grid::new(vector![64], buffer);
    let update = |_t: usize, pos: &Coord<1>, read: &Grid<i32, 1>| {
        let size = read.size()[0];
        read.view(&vector![(pos[0] + size - 1) % size])
            .wrapping_mul(3)
            .wrapping_add(read.view(pos))
            .wrapping_sub(read.view(&vector![(pos[0] + 1) % size]))
    };

    for steps in [1, 2, 7, 16, 33] {
        assert_all_agree(&initial, steps, update);
    }
}

#[test]
fn random_3d_compare() {
    let mut rng = StdRng::seed_from_u64(0xfeed);
    let size = vector![6, 7, 5];
    let mut buffer = vec![0i32; (6 * 7 * 5) as usize];
    for value in buffer.iter_mut() {
        *value = rng.gen_range(0..100);
    }
    let initial: Grid<i32, 3> = Grid::new(size, buffer);
    let update = |_t: usize, pos: &Coord<3>, read: &Grid<i32, 3>| {
        let size = *read.size();
        let mut sum = read.view(pos);
        for d in 0..3 {
            let mut up = *pos;
            up[d] = (up[d] + 1) % size[d];
            let mut down = *pos;
            down[d] = (down[d] + size[d] - 1) % size[d];
            sum = sum.wrapping_add(read.view(&up)).wrapping_sub(read.view(&down));
        }
        sum
    };

    for steps in [1, 3, 8] {
        assert_all_agree(&initial, steps, update);
    }
}

#[test]
fn heat_1d_compare() {
    // Bitwise agreement holds for floats too: every cell value is a
    // pure function of the previous plane whatever the visit order.
    let mut initial: Grid<f64, 1> = Grid::zeros(vector![100]);
    let n_f = 100.0;
    let sigma_sq: f64 = (n_f / 25.0) * (n_f / 25.0);
    initial.par_set_values(
        |c| {
            let x = c[0] as f64 - n_f / 2.0;
            (-x * x / (2.0 * sigma_sq)).exp()
        },
        10,
    );
    let k = 0.4;
    let update = move |_t: usize, pos: &Coord<1>, read: &Grid<f64, 1>| {
        let size = read.size()[0];
        let left = read.view(&vector![(pos[0] + size - 1) % size]);
        let middle = read.view(pos);
        let right = read.view(&vector![(pos[0] + 1) % size]);
        middle + k * (left - 2.0 * middle + right)
    };

    let result = assert_all_agree(&initial, 16, update);

    // Periodic diffusion conserves total heat.
    let before: f64 = initial.buffer().iter().sum();
    let after: f64 = result.buffer().iter().sum();
    assert_approx_eq!(f64, before, after, epsilon = 1e-9);
}
