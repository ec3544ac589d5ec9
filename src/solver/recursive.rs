//! Cache-oblivious recursive drivers over the zoid execution plan.

use crate::grid::Grid;
use crate::solver::iterative;
use crate::solver::phase::PhasePair;
use crate::solver::UpdateFn;
use crate::util::*;
use crate::zoid::base::Base;
use crate::zoid::plan::ExecutionPlan;

/// Run the zoid plan on the calling thread.
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
    let base = Base::full(a.size());
    let limits = *a.size();

    let Some(plan) = ExecutionPlan::create(&base, steps) else {
        // Domain too thin to stack zoids.
        iterative::solve_sequential(a, steps, update);
        return;
    };

    let mut b = a.shadow();
    {
        let phase = PhasePair::new(a, &mut b, update);
        plan.run_sequential(
            &|pos: &Coord<GRID_DIMENSION>, t: usize| phase.even(pos, t),
            &|pos: &Coord<GRID_DIMENSION>, t: usize| phase.odd(pos, t),
            &limits,
        );
    }

    if steps % 2 == 1 {
        a.swap_contents(&mut b);
    }
}

/// Run the zoid plan over the hypercube task graph on the thread pool.
pub fn solve_parallel<T, U, const GRID_DIMENSION: usize>(
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
    let base = Base::full(a.size());
    let limits = *a.size();

    let Some(plan) = ExecutionPlan::create(&base, steps) else {
        iterative::solve_coarse_grained(a, steps, update);
        return;
    };

    let mut b = a.shadow();
    {
        let phase = PhasePair::new(a, &mut b, update);
        plan.run_parallel(
            &|pos: &Coord<GRID_DIMENSION>, t: usize| phase.even(pos, t),
            &|pos: &Coord<GRID_DIMENSION>, t: usize| phase.odd(pos, t),
            &limits,
        );
    }

    if steps % 2 == 1 {
        a.swap_contents(&mut b);
    }
}
