//! The grid container used on both sides of the double buffer.
//! Cells live in one linear buffer in row-major order, the last axis
//! varying fastest, which matches the plane scanner's traversal order.

use crate::util::indexing::*;
use crate::util::*;
use rayon::prelude::*;

pub struct Grid<T, const GRID_DIMENSION: usize> {
    size: Coord<GRID_DIMENSION>,
    buffer: Vec<T>,
}

impl<T: CellValue, const GRID_DIMENSION: usize> Grid<T, GRID_DIMENSION> {
    pub fn new(size: Coord<GRID_DIMENSION>, buffer: Vec<T>) -> Self {
        debug_assert_eq!(buffer.len(), buffer_size(&size));
        Grid { size, buffer }
    }

    /// Zero-filled grid of the given extent.
    pub fn zeros(size: Coord<GRID_DIMENSION>) -> Self
    where
        T: Zero,
    {
        let buffer = vec![T::zero(); buffer_size(&size)];
        Grid { size, buffer }
    }

    /// Same-shape scratch grid for the write side of the double buffer.
    /// Seeded with this grid's contents so every cell starts initialized.
    pub fn shadow(&self) -> Self {
        Grid {
            size: self.size,
            buffer: self.buffer.clone(),
        }
    }

    pub fn size(&self) -> &Coord<GRID_DIMENSION> {
        &self.size
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &[T] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [T] {
        &mut self.buffer
    }

    pub fn view(&self, coord: &Coord<GRID_DIMENSION>) -> T {
        self.buffer[coord_to_linear(coord, &self.size)]
    }

    pub fn modify(&mut self, coord: &Coord<GRID_DIMENSION>, value: T) {
        let index = coord_to_linear(coord, &self.size);
        self.buffer[index] = value;
    }

    /// Exchange cell contents with a grid of the same shape.
    pub fn swap_contents(&mut self, other: &mut Self) {
        assert_eq!(self.size, other.size);
        std::mem::swap(&mut self.buffer, &mut other.buffer);
    }

    pub fn par_modify_access(
        &mut self,
        chunk_size: usize,
    ) -> impl ParallelIterator<Item = GridChunk<'_, T, GRID_DIMENSION>> {
        par_modify_access_impl(&mut self.buffer, &self.size, chunk_size)
    }

    /// Set every cell from its coordinate, in parallel chunks.
    pub fn par_set_values<F>(&mut self, f: F, chunk_size: usize)
    where
        F: Fn(Coord<GRID_DIMENSION>) -> T + Send + Sync,
    {
        self.par_modify_access(chunk_size).for_each(
            |mut chunk: GridChunk<'_, T, GRID_DIMENSION>| {
                chunk.coord_iter_mut().for_each(
                    |(coord, value_mut): (Coord<GRID_DIMENSION>, &mut T)| {
                        *value_mut = f(coord);
                    },
                )
            },
        );
    }
}

/// Split borrow helper. Rust can't borrow `buffer` mutably and `size`
/// immutably through `&mut self` in one expression; routing both through
/// one call first works around it.
fn par_modify_access_impl<'a, T: CellValue, const GRID_DIMENSION: usize>(
    buffer: &'a mut [T],
    size: &'a Coord<GRID_DIMENSION>,
    chunk_size: usize,
) -> impl ParallelIterator<Item = GridChunk<'a, T, GRID_DIMENSION>> + 'a {
    buffer
        .par_chunks_mut(chunk_size)
        .enumerate()
        .map(move |(i, buffer_chunk): (usize, &mut [T])| {
            let offset = i * chunk_size;
            GridChunk::new(offset, size, buffer_chunk)
        })
}

/// A contiguous run of cells handed to one worker task.
pub struct GridChunk<'a, T, const GRID_DIMENSION: usize> {
    offset: usize,
    size: &'a Coord<GRID_DIMENSION>,
    buffer: &'a mut [T],
}

impl<'a, T: CellValue, const GRID_DIMENSION: usize>
    GridChunk<'a, T, GRID_DIMENSION>
{
    pub fn new(
        offset: usize,
        size: &'a Coord<GRID_DIMENSION>,
        buffer: &'a mut [T],
    ) -> Self {
        GridChunk {
            offset,
            size,
            buffer,
        }
    }

    pub fn coord_iter_mut(
        &mut self,
    ) -> impl Iterator<Item = (Coord<GRID_DIMENSION>, &mut T)> {
        self.buffer
            .iter_mut()
            .enumerate()
            .map(|(i, v): (usize, &mut T)| {
                let coord = linear_to_coord(self.offset + i, self.size);
                (coord, v)
            })
    }
}
