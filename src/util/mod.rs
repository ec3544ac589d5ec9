pub use num_traits::{One, Zero};

pub mod indexing;

/// Cell values are opaque to the engine; they only ever get copied
/// between buffers and across worker threads.
pub trait CellValue: Copy + Send + Sync + 'static {}
impl<T: Copy + Send + Sync + 'static> CellValue for T {}

/// A point in, or the extent of, the grid domain.
pub type Coord<const GRID_DIMENSION: usize> =
    nalgebra::SVector<i32, { GRID_DIMENSION }>;

/// Per-axis face slopes of a space-time volume, entries in `{-1, +1}`.
/// A negative slope opens the face outward over time, a positive slope
/// closes it inward.
pub type Slopes<const GRID_DIMENSION: usize> =
    nalgebra::SVector<i32, { GRID_DIMENSION }>;

/// Half-open `[begin, end)` ranges per axis.
/// Column 0 holds the begins, column 1 the ends.
pub type Bounds<const GRID_DIMENSION: usize> =
    nalgebra::SMatrix<i32, { GRID_DIMENSION }, 2>;
