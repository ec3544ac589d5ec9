use crate::util::*;
use crate::zoid::base::Base;
use crate::zoid::scanner;

/// A trapezoidal space-time volume. At `t_begin` it covers `base`; each
/// time step every face on axis `d` moves by `slopes[d]`, a negative
/// slope opening the face outward, a positive slope closing it inward.
/// A zoid covers exactly those cells whose updates stay inside its
/// boundary for its whole time band, which is what makes the sub-volumes
/// of a split schedulable as tasks.
#[derive(Debug, Copy, Clone)]
pub struct Zoid<const GRID_DIMENSION: usize> {
    pub base: Base<GRID_DIMENSION>,
    pub slopes: Slopes<GRID_DIMENSION>,
    pub t_begin: usize,
    pub t_end: usize,
}

/// Result of bisecting in time. `bottom` covers the earlier band.
pub struct TimeDecomposition<const GRID_DIMENSION: usize> {
    pub bottom: Zoid<GRID_DIMENSION>,
    pub top: Zoid<GRID_DIMENSION>,
}

/// Result of splitting along one space axis. `opening` records whether
/// the split axis had a negative slope, which decides the schedule:
/// an opening center feeds the wings, a closing center consumes them.
pub struct SpaceDecomposition<const GRID_DIMENSION: usize> {
    pub l: Zoid<GRID_DIMENSION>,
    pub c: Zoid<GRID_DIMENSION>,
    pub r: Zoid<GRID_DIMENSION>,
    pub opening: bool,
}

impl<const GRID_DIMENSION: usize> std::fmt::Display for Zoid<GRID_DIMENSION> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "Zoid({},{:?},{}-{})",
            self.base,
            self.slopes.as_slice(),
            self.t_begin,
            self.t_end
        )
    }
}

impl<const GRID_DIMENSION: usize> Zoid<GRID_DIMENSION> {
    pub fn new(
        base: Base<GRID_DIMENSION>,
        slopes: Slopes<GRID_DIMENSION>,
        t_begin: usize,
        t_end: usize,
    ) -> Self {
        debug_assert!(t_begin <= t_end);
        Zoid {
            base,
            slopes,
            t_begin,
            t_end,
        }
    }

    /// Height in temporal direction.
    pub fn height(&self) -> usize {
        self.t_end - self.t_begin
    }

    /// Cell count of the projection onto the space domain.
    pub fn footprint(&self) -> usize {
        let dt = self.height() as i32;
        let mut size = 1;
        for d in 0..GRID_DIMENSION {
            size *= self.shadow_width_with_height(d, dt) as usize;
        }
        size
    }

    /// Width of the zoid's shadow on axis `d`: the base width, plus the
    /// outward growth on both sides when the axis is opening.
    pub fn shadow_width(&self, d: usize) -> i32 {
        self.shadow_width_with_height(d, self.height() as i32)
    }

    fn shadow_width_with_height(&self, d: usize, dt: i32) -> i32 {
        let mut result = self.base.width(d);
        if self.slopes[d] < 0 {
            result += 2 * dt;
        }
        result
    }

    /// A zoid too small to be worth dividing further.
    pub fn is_terminal(&self) -> bool {
        self.height() <= 1 && self.base.max_width() < 3
    }

    pub fn is_splitable(&self, d: usize) -> bool {
        self.shadow_width(d) > 4 * self.height() as i32
    }

    pub fn is_space_splitable(&self) -> bool {
        (0..GRID_DIMENSION).any(|d| self.is_splitable(d))
    }

    /// Bisect the time band. The top base is the bottom base advanced
    /// by `split` steps worth of slope on every axis.
    pub fn split_time(&self) -> TimeDecomposition<GRID_DIMENSION> {
        let split = self.height() / 2;

        let mut mid = self.base;
        for d in 0..GRID_DIMENSION {
            let diff = self.slopes[d] * split as i32;
            mid.bounds[(d, 0)] += diff;
            mid.bounds[(d, 1)] -= diff;
        }

        TimeDecomposition {
            bottom: Zoid::new(
                self.base,
                self.slopes,
                self.t_begin,
                self.t_begin + split,
            ),
            top: Zoid::new(mid, self.slopes, self.t_begin + split, self.t_end),
        }
    }

    /// Split into left, center, right along the axis with the widest
    /// shadow (ties to the lowest axis). The center piece takes the
    /// inverted slope, turning it into the counterpart shape that fills
    /// the gap the wings leave open.
    pub fn split_space(&self) -> SpaceDecomposition<GRID_DIMENSION> {
        debug_assert!(self.is_space_splitable());

        let mut split_dim = 0;
        let mut max_width = 0;
        for d in 0..GRID_DIMENSION {
            let width = self.shadow_width(d);
            if width > max_width {
                max_width = width;
                split_dim = d;
            }
        }
        debug_assert!(self.is_splitable(split_dim));

        let opening = self.slopes[split_dim] < 0;
        let center =
            (self.base.begin(split_dim) + self.base.end(split_dim)) / 2;
        let mut left = center;
        let mut right = center;
        if opening {
            let height = self.height() as i32;
            left -= height;
            right += height;
        }

        let mut l = *self;
        let mut c = *self;
        let mut r = *self;
        l.base.bounds[(split_dim, 1)] = left;
        c.base.bounds[(split_dim, 0)] = left;
        c.base.bounds[(split_dim, 1)] = right;
        r.base.bounds[(split_dim, 0)] = right;
        c.slopes[split_dim] *= -1;

        SpaceDecomposition { l, c, r, opening }
    }

    /// Sequentially visit every cell of the volume, plane by plane.
    /// Planes at even times go to `even`, odd times to `odd`, which is
    /// how the double buffer alternates read and write grids.
    pub fn for_each<EvenOp, OddOp>(
        &self,
        even: &EvenOp,
        odd: &OddOp,
        limits: &Coord<GRID_DIMENSION>,
    ) where
        EvenOp: Fn(&Coord<GRID_DIMENSION>, usize),
        OddOp: Fn(&Coord<GRID_DIMENSION>, usize),
    {
        let mut plane = self.base;
        for t in self.t_begin..self.t_end {
            if t & 0x1 == 1 {
                scanner::scan(&plane, t, limits, &mut |pos, t| odd(pos, t));
            } else {
                scanner::scan(&plane, t, limits, &mut |pos, t| even(pos, t));
            }

            // Advance the plane to the next time.
            for d in 0..GRID_DIMENSION {
                plane.bounds[(d, 0)] += self.slopes[d];
                plane.bounds[(d, 1)] -= self.slopes[d];
            }
        }
    }

    /// Recursively decompose the volume and run it on the thread pool.
    ///
    /// Time splits run bottom before top. Space splits schedule by
    /// orientation: an opening center runs before its wings (it produces
    /// the cells their growing edges read), a closing center runs after
    /// them (it consumes the boundary cells they produce). The caller is
    /// responsible for ordering against other zoids; see the execution
    /// plan's task graph.
    pub fn pfor_each<EvenOp, OddOp>(
        &self,
        even: &EvenOp,
        odd: &OddOp,
        limits: &Coord<GRID_DIMENSION>,
    ) where
        EvenOp: Fn(&Coord<GRID_DIMENSION>, usize) + Sync,
        OddOp: Fn(&Coord<GRID_DIMENSION>, usize) + Sync,
    {
        if self.is_terminal() {
            self.for_each(even, odd, limits);
            return;
        }

        if !self.is_space_splitable() {
            // A band of height 1 that is too wide to be terminal but too
            // narrow to split can only run sequentially.
            if self.height() <= 1 {
                self.for_each(even, odd, limits);
                return;
            }
            let parts = self.split_time();
            parts.bottom.pfor_each(even, odd, limits);
            parts.top.pfor_each(even, odd, limits);
            return;
        }

        let parts = self.split_space();
        if parts.opening {
            parts.c.pfor_each(even, odd, limits);
            rayon::join(
                || parts.l.pfor_each(even, odd, limits),
                || parts.r.pfor_each(even, odd, limits),
            );
        } else {
            rayon::join(
                || parts.l.pfor_each(even, odd, limits),
                || parts.r.pfor_each(even, odd, limits),
            );
            parts.c.pfor_each(even, odd, limits);
        }
    }
}
