//! Fine-grained iterative driver.
//!
//! Instead of a barrier between steps, the whole (steps x domain)
//! iteration cube becomes one task graph over (slab, t) pairs, where a
//! slab is a contiguous band of axis-0 hyperplanes. A slab at step
//! `t + 1` only waits for itself and its two neighbors at step `t`
//! (the stencil footprint is one cell per axis, so a slab's inputs lie
//! in the adjacent slabs), letting later steps start in regions where
//! earlier steps already passed through. Neighbors wrap around: the
//! domain is periodic, so the first and last slabs are adjacent.

use crate::grid::Grid;
use crate::solver::phase::PhasePair;
use crate::solver::UpdateFn;
use crate::util::indexing::*;
use crate::util::*;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn solve<T, U, const GRID_DIMENSION: usize>(
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
    debug_assert!(!a.is_empty());

    let size = *a.size();
    let rows = size[0] as usize;
    let row_stride = a.len() / rows;

    let num_slabs = rows.min(2 * rayon::current_num_threads()).max(1);
    let slab_rows: Vec<(usize, usize)> = (0..num_slabs)
        .map(|s| (s * rows / num_slabs, (s + 1) * rows / num_slabs))
        .collect();

    // Distinct step-t predecessors of a slab at step t+1, after the
    // wrap-around neighbors collapse for tiny slab counts.
    let dependencies = num_slabs.min(3);
    let pending: Vec<AtomicUsize> = (0..steps * num_slabs)
        .map(|i| {
            AtomicUsize::new(if i < num_slabs { 0 } else { dependencies })
        })
        .collect();

    let mut b = a.shadow();
    {
        let wave = Wavefront {
            phase: PhasePair::new(a, &mut b, update),
            size,
            row_stride,
            slab_rows,
            steps,
            pending,
        };
        rayon::scope(|s| {
            for slab in 0..num_slabs {
                let wave = &wave;
                s.spawn(move |s| wave.execute(s, slab, 0));
            }
        });
    }

    if steps % 2 == 1 {
        a.swap_contents(&mut b);
    }
}

struct Wavefront<'a, T, U, const GRID_DIMENSION: usize> {
    phase: PhasePair<'a, T, U, GRID_DIMENSION>,
    size: Coord<GRID_DIMENSION>,
    row_stride: usize,
    slab_rows: Vec<(usize, usize)>,
    steps: usize,
    /// `pending[t * num_slabs + s]` counts unfinished predecessors.
    pending: Vec<AtomicUsize>,
}

impl<'a, T, U, const GRID_DIMENSION: usize> Wavefront<'a, T, U, GRID_DIMENSION>
where
    T: CellValue,
    U: UpdateFn<T, GRID_DIMENSION>,
{
    fn execute<'s>(
        &'s self,
        s: &rayon::Scope<'s>,
        slab: usize,
        t: usize,
    ) {
        self.apply(slab, t);

        let next_t = t + 1;
        if next_t == self.steps {
            return;
        }

        // Release the next step's dependents: this slab and its two
        // wrap-around neighbors, each at most once. The decrement that
        // reaches zero owns the spawn.
        let n = self.slab_rows.len();
        let mut released = [usize::MAX; 3];
        for (k, offset) in [n - 1, 0, 1].into_iter().enumerate() {
            let neighbor = (slab + offset) % n;
            if released[..k].contains(&neighbor) {
                continue;
            }
            released[k] = neighbor;
            let pending = &self.pending[next_t * n + neighbor];
            if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                s.spawn(move |s| self.execute(s, neighbor, next_t));
            }
        }
    }

    fn apply(&self, slab: usize, t: usize) {
        let (row_begin, row_end) = self.slab_rows[slab];
        let begin = row_begin * self.row_stride;
        let end = row_end * self.row_stride;
        for i in begin..end {
            let pos = linear_to_coord(i, &self.size);
            self.phase.step(&pos, t);
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::solver::iterative;
    use nalgebra::vector;

    #[test]
    fn matches_sequential_1d_test() {
        let update = |_t: usize, pos: &Coord<1>, read: &Grid<i32, 1>| {
            let size = read.size()[0];
            read.view(&vector![(pos[0] + size - 1) % size])
                + read.view(pos)
                + read.view(&vector![(pos[0] + 1) % size])
        };

        let mut expected: Grid<i32, 1> = Grid::zeros(vector![64]);
        expected.par_set_values(|c| c[0], 8);
        let mut actual = expected.shadow();

        iterative::solve_sequential(&mut expected, 7, &update);
        solve(&mut actual, 7, &update);
        assert_eq!(expected.buffer(), actual.buffer());
    }

    #[test]
    fn matches_sequential_2d_test() {
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

        let mut expected: Grid<i32, 2> = Grid::zeros(vector![16, 12]);
        expected.par_set_values(|c| c[0] * 100 + c[1], 16);
        let mut actual = expected.shadow();

        iterative::solve_sequential(&mut expected, 5, &update);
        solve(&mut actual, 5, &update);
        assert_eq!(expected.buffer(), actual.buffer());
    }

    #[test]
    fn neighborhood_ordering_test() {
        // Every update at (q, t+1) must run after the update at (p, t)
        // for each p within one cell of q, wrap included.
        let length = 48usize;
        let steps = 6usize;
        let log = std::sync::Mutex::new(Vec::new());
        {
            let update = |t: usize, pos: &Coord<1>, read: &Grid<i32, 1>| {
                log.lock().unwrap().push((t, pos[0]));
                read.view(pos) + 1
            };
            let mut a: Grid<i32, 1> = Grid::zeros(vector![length as i32]);
            solve(&mut a, steps, &update);
        }

        let log = log.into_inner().unwrap();
        assert_eq!(log.len(), length * steps);
        let position = |t: usize, x: i32| {
            log.iter().position(|&e| e == (t, x)).unwrap()
        };
        for t in 0..steps - 1 {
            for q in 0..length as i32 {
                for dx in [-1, 0, 1] {
                    let p = (q + dx).rem_euclid(length as i32);
                    assert!(
                        position(t, p) < position(t + 1, q),
                        "({}, {}) ran before ({}, {})",
                        q,
                        t + 1,
                        p,
                        t
                    );
                }
            }
        }
    }

    #[test]
    fn tiny_domain_test() {
        // Fewer rows than workers collapses the neighbor dependencies.
        let update = |_t: usize, pos: &Coord<1>, read: &Grid<i32, 1>| {
            read.view(pos) + 1
        };
        let mut a: Grid<i32, 1> = Grid::new(vector![2], vec![5, 9]);
        solve(&mut a, 9, &update);
        assert_eq!(a.buffer(), &[14, 18]);
    }
}
