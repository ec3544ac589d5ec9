use crate::grid::Grid;
use crate::solver::UpdateFn;
use crate::util::*;
use std::marker::PhantomData;
use sync_ptr::SyncMutPtr;

/// Even/odd plane adapters over the double buffer. The even phase reads
/// grid `a` and writes grid `b`; the odd phase reads `b` and writes
/// `a`. Which phase a time plane uses is decided by the parity of `t`,
/// so the roles alternate step by step and the buffers never move.
///
/// Both grids are reachable from every worker task through raw
/// pointers. This is sound because the decomposition guarantees that
/// tasks running concurrently write disjoint cells of a time plane, and
/// a plane only ever writes the grid it does not read.
pub struct PhasePair<'a, T, U, const GRID_DIMENSION: usize> {
    a: SyncMutPtr<Grid<T, GRID_DIMENSION>>,
    b: SyncMutPtr<Grid<T, GRID_DIMENSION>>,
    update: &'a U,
    _grids: PhantomData<&'a mut Grid<T, GRID_DIMENSION>>,
}

impl<'a, T, U, const GRID_DIMENSION: usize> PhasePair<'a, T, U, GRID_DIMENSION>
where
    T: CellValue,
    U: UpdateFn<T, GRID_DIMENSION>,
{
    pub fn new(
        a: &'a mut Grid<T, GRID_DIMENSION>,
        b: &'a mut Grid<T, GRID_DIMENSION>,
        update: &'a U,
    ) -> Self {
        debug_assert_eq!(a.size(), b.size());
        unsafe {
            PhasePair {
                a: SyncMutPtr::new(a),
                b: SyncMutPtr::new(b),
                update,
                _grids: PhantomData,
            }
        }
    }

    /// `b[pos] = update(t, pos, a)`
    pub fn even(&self, pos: &Coord<GRID_DIMENSION>, t: usize) {
        unsafe {
            let read = &*self.a.inner();
            let write = &mut *self.b.inner();
            write.modify(pos, (self.update)(t, pos, read));
        }
    }

    /// `a[pos] = update(t, pos, b)`
    pub fn odd(&self, pos: &Coord<GRID_DIMENSION>, t: usize) {
        unsafe {
            let read = &*self.b.inner();
            let write = &mut *self.a.inner();
            write.modify(pos, (self.update)(t, pos, read));
        }
    }

    /// Dispatch on the parity of `t`.
    pub fn step(&self, pos: &Coord<GRID_DIMENSION>, t: usize) {
        if t & 0x1 == 1 {
            self.odd(pos, t);
        } else {
            self.even(pos, t);
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn phase_direction_test() {
        let mut a: Grid<i32, 1> = Grid::new(vector![4], vec![1, 2, 3, 4]);
        let mut b = a.shadow();
        let update =
            |_t: usize, pos: &Coord<1>, read: &Grid<i32, 1>| read.view(pos) + 10;

        {
            let phase = PhasePair::new(&mut a, &mut b, &update);
            phase.even(&vector![0], 0);
            phase.odd(&vector![1], 1);
        }

        // Even wrote a+10 into b, odd wrote b+10 into a.
        assert_eq!(b.view(&vector![0]), 11);
        assert_eq!(a.view(&vector![1]), 12);
    }
}
