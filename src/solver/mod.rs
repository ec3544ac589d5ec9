//! Execution strategies and the stencil dispatcher.
//!
//! Five interchangeable drivers share the double-buffer model: the
//! caller's grid and a same-shape shadow alternate read and write roles
//! step by step, and the final state always lands back in the caller's
//! grid whatever the step parity.

mod iterative;
mod phase;
mod recursive;
mod wavefront;

use crate::grid::Grid;
use crate::util::*;
use std::thread;

/// Opaque per-cell update: the value of `(t + 1, pos)` from the time-`t`
/// grid. It may read any cell of the read grid, must not mutate it, and
/// must be deterministic for the drivers to be interchangeable.
pub trait UpdateFn<T, const GRID_DIMENSION: usize>:
    Fn(usize, &Coord<GRID_DIMENSION>, &Grid<T, GRID_DIMENSION>) -> T
    + Send
    + Sync
{
}

impl<T, F, const GRID_DIMENSION: usize> UpdateFn<T, GRID_DIMENSION> for F where
    F: Fn(usize, &Coord<GRID_DIMENSION>, &Grid<T, GRID_DIMENSION>) -> T
        + Send
        + Sync
{
}

/// An execution strategy for the stencil engine.
pub trait Implementation {
    fn process<T, U, const GRID_DIMENSION: usize>(
        a: &mut Grid<T, GRID_DIMENSION>,
        steps: usize,
        update: &U,
    ) where
        T: CellValue,
        U: UpdateFn<T, GRID_DIMENSION>;
}

/// Single-threaded per-step double buffering; the reference semantics.
pub struct SequentialIterative;

/// Parallel-for over cells with a full barrier between steps.
pub struct CoarseGrainedIterative;

/// Parallel-for over cells where a region of step `t + 1` only waits
/// for its own neighborhood of step `t`.
pub struct FineGrainedIterative;

/// Cache-oblivious zoid decomposition, run on one thread.
pub struct SequentialRecursive;

/// Zoid decomposition scheduled over the hypercube task graph.
pub struct ParallelRecursive;

/// The strategy picked when callers do not care.
pub type DefaultImplementation = FineGrainedIterative;

impl Implementation for SequentialIterative {
    fn process<T, U, const GRID_DIMENSION: usize>(
        a: &mut Grid<T, GRID_DIMENSION>,
        steps: usize,
        update: &U,
    ) where
        T: CellValue,
        U: UpdateFn<T, GRID_DIMENSION>,
    {
        iterative::solve_sequential(a, steps, update);
    }
}

impl Implementation for CoarseGrainedIterative {
    fn process<T, U, const GRID_DIMENSION: usize>(
        a: &mut Grid<T, GRID_DIMENSION>,
        steps: usize,
        update: &U,
    ) where
        T: CellValue,
        U: UpdateFn<T, GRID_DIMENSION>,
    {
        iterative::solve_coarse_grained(a, steps, update);
    }
}

impl Implementation for FineGrainedIterative {
    fn process<T, U, const GRID_DIMENSION: usize>(
        a: &mut Grid<T, GRID_DIMENSION>,
        steps: usize,
        update: &U,
    ) where
        T: CellValue,
        U: UpdateFn<T, GRID_DIMENSION>,
    {
        wavefront::solve(a, steps, update);
    }
}

impl Implementation for SequentialRecursive {
    fn process<T, U, const GRID_DIMENSION: usize>(
        a: &mut Grid<T, GRID_DIMENSION>,
        steps: usize,
        update: &U,
    ) where
        T: CellValue,
        U: UpdateFn<T, GRID_DIMENSION>,
    {
        recursive::solve_sequential(a, steps, update);
    }
}

impl Implementation for ParallelRecursive {
    fn process<T, U, const GRID_DIMENSION: usize>(
        a: &mut Grid<T, GRID_DIMENSION>,
        steps: usize,
        update: &U,
    ) where
        T: CellValue,
        U: UpdateFn<T, GRID_DIMENSION>,
    {
        recursive::solve_parallel(a, steps, update);
    }
}

/// Handle to a running stencil computation.
pub struct StencilHandle<T, const GRID_DIMENSION: usize> {
    worker: thread::JoinHandle<Grid<T, GRID_DIMENSION>>,
}

impl<T: CellValue, const GRID_DIMENSION: usize>
    StencilHandle<T, GRID_DIMENSION>
{
    /// Block until the driver finished and take back the grid holding
    /// the final state. A panic raised by the update function inside
    /// the driver resurfaces here.
    pub fn wait(self) -> Grid<T, GRID_DIMENSION> {
        match self.worker.join() {
            Ok(grid) => grid,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

/// Run `update` over `grid` for `steps` time steps with strategy `I`.
///
/// Returns immediately; the grid comes back through
/// [`StencilHandle::wait`] with the result of `steps` sequential
/// applications of `update`, independent of step parity.
pub fn stencil<I, T, U, const GRID_DIMENSION: usize>(
    mut grid: Grid<T, GRID_DIMENSION>,
    steps: usize,
    update: U,
) -> StencilHandle<T, GRID_DIMENSION>
where
    I: Implementation + 'static,
    T: CellValue,
    U: UpdateFn<T, GRID_DIMENSION> + 'static,
{
    assert!(
        steps == 0 || !grid.is_empty(),
        "cannot step an empty domain"
    );
    StencilHandle {
        worker: thread::spawn(move || {
            I::process(&mut grid, steps, &update);
            grid
        }),
    }
}

/// [`stencil`] with the default strategy.
pub fn stencil_default<T, U, const GRID_DIMENSION: usize>(
    grid: Grid<T, GRID_DIMENSION>,
    steps: usize,
    update: U,
) -> StencilHandle<T, GRID_DIMENSION>
where
    T: CellValue,
    U: UpdateFn<T, GRID_DIMENSION> + 'static,
{
    stencil::<DefaultImplementation, T, U, GRID_DIMENSION>(
        grid, steps, update,
    )
}
