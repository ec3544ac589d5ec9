//! Per-step double-buffer drivers: one sequential, one barrier-parallel.

use crate::grid::Grid;
use crate::solver::UpdateFn;
use crate::util::indexing::*;
use crate::util::*;
use rayon::prelude::*;

/// Cells handed to one worker task by the chunked parallel drivers.
pub(crate) fn chunk_size_for(len: usize) -> usize {
    (len / (4 * rayon::current_num_threads())).max(1)
}

fn step_sequential<T, U, const GRID_DIMENSION: usize>(
    t: usize,
    update: &U,
    input: &Grid<T, GRID_DIMENSION>,
    output: &mut Grid<T, GRID_DIMENSION>,
) where
    T: CellValue,
    U: UpdateFn<T, GRID_DIMENSION>,
{
    let size = *input.size();
    for (i, value) in output.buffer_mut().iter_mut().enumerate() {
        let pos = linear_to_coord(i, &size);
        *value = update(t, &pos, input);
    }
}

fn step_parallel<T, U, const GRID_DIMENSION: usize>(
    t: usize,
    update: &U,
    input: &Grid<T, GRID_DIMENSION>,
    output: &mut Grid<T, GRID_DIMENSION>,
    chunk_size: usize,
) where
    T: CellValue,
    U: UpdateFn<T, GRID_DIMENSION>,
{
    let size = *input.size();
    output
        .buffer_mut()
        .par_chunks_mut(chunk_size)
        .enumerate()
        .for_each(|(chunk_index, chunk): (usize, &mut [T])| {
            let offset = chunk_index * chunk_size;
            for (i, value) in chunk.iter_mut().enumerate() {
                let pos = linear_to_coord(offset + i, &size);
                *value = update(t, &pos, input);
            }
        });
}

/// Single-threaded reference driver: one full pass per time step,
/// alternating read and write grids by step parity.
pub fn solve_sequential<T, U, const GRID_DIMENSION: usize>(
    a: &mut Grid<T, GRID_DIMENSION>,
    steps: usize,
    update: &U,
) where
    T: CellValue,
    U: UpdateFn<T, GRID_DIMENSION>,
{
    if steps == 0 {
        return;
    }
    let mut b = a.shadow();

    for t in 0..steps {
        if t & 0x1 == 0 {
            step_sequential(t, update, a, &mut b);
        } else {
            step_sequential(t, update, &b, a);
        }
    }

    if steps % 2 == 1 {
        a.swap_contents(&mut b);
    }
}

/// Parallel-for over cells with a full barrier between steps; the
/// barrier is the join of the chunked parallel pass.
pub fn solve_coarse_grained<T, U, const GRID_DIMENSION: usize>(
    a: &mut Grid<T, GRID_DIMENSION>,
    steps: usize,
    update: &U,
) where
    T: CellValue,
    U: UpdateFn<T, GRID_DIMENSION>,
{
    if steps == 0 {
        return;
    }
    let chunk_size = chunk_size_for(a.len());
    let mut b = a.shadow();

    for t in 0..steps {
        if t & 0x1 == 0 {
            step_parallel(t, update, a, &mut b, chunk_size);
        } else {
            step_parallel(t, update, &b, a, chunk_size);
        }
    }

    if steps % 2 == 1 {
        a.swap_contents(&mut b);
    }
}
