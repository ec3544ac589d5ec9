//! Lexicographic traversal of one time plane with periodic wrap.

use crate::util::*;
use crate::zoid::base::Base;

/// Visit every cell of `base` at time `t`, wrapping each axis into the
/// periodic domain `[0, limits[d])`. The first axis is outermost; per
/// axis, in-domain cells come before the wrapped tail. Delivered
/// positions are always inside the domain.
pub fn scan<const GRID_DIMENSION: usize, F>(
    base: &Base<GRID_DIMENSION>,
    t: usize,
    limits: &Coord<GRID_DIMENSION>,
    f: &mut F,
) where
    F: FnMut(&Coord<GRID_DIMENSION>, usize),
{
    let mut pos = Coord::zero();
    scan_axis(base, 0, t, limits, &mut pos, f);
}

fn scan_axis<const GRID_DIMENSION: usize, F>(
    base: &Base<GRID_DIMENSION>,
    d: usize,
    t: usize,
    limits: &Coord<GRID_DIMENSION>,
    pos: &mut Coord<GRID_DIMENSION>,
    f: &mut F,
) where
    F: FnMut(&Coord<GRID_DIMENSION>, usize),
{
    let mut from = base.begin(d);
    let mut to = base.end(d);
    let length = limits[d];

    // Recursive splits can shift a range past the domain entirely;
    // pull it back into the size window first.
    if from > length {
        from -= length;
        to -= length;
    }

    let limit = to.min(length);
    for x in from..limit {
        pos[d] = x;
        if d + 1 == GRID_DIMENSION {
            f(pos, t);
        } else {
            scan_axis(base, d + 1, t, limits, pos, f);
        }
    }

    // The tail beyond the domain end, after wrap-around.
    if to <= length {
        return;
    }
    for x in 0..(to - length) {
        pos[d] = x;
        if d + 1 == GRID_DIMENSION {
            f(pos, t);
        } else {
            scan_axis(base, d + 1, t, limits, pos, f);
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use nalgebra::{matrix, vector};

    fn collect<const GRID_DIMENSION: usize>(
        base: &Base<GRID_DIMENSION>,
        limits: &Coord<GRID_DIMENSION>,
    ) -> Vec<Coord<GRID_DIMENSION>> {
        let mut visited = Vec::new();
        scan(base, 0, limits, &mut |pos: &Coord<GRID_DIMENSION>,
                                    _t: usize| {
            visited.push(*pos);
        });
        visited
    }

    #[test]
    fn plain_range_test() {
        let base = Base::<1>::new(matrix![2, 5]);
        let visited = collect(&base, &vector![8]);
        assert_eq!(visited, vec![vector![2], vector![3], vector![4]]);
    }

    #[test]
    fn wrap_around_test() {
        // [L-1, L+2) over a domain of length L visits L-1, 0, 1.
        let length = 8;
        let base = Base::<1>::new(matrix![length - 1, length + 2]);
        let visited = collect(&base, &vector![length]);
        assert_eq!(visited, vec![vector![7], vector![0], vector![1]]);
    }

    #[test]
    fn shifted_range_test() {
        // A range starting past the domain is pre-wrapped wholesale.
        let base = Base::<1>::new(matrix![9, 11]);
        let visited = collect(&base, &vector![8]);
        assert_eq!(visited, vec![vector![1], vector![2]]);
    }

    #[test]
    fn lexicographic_order_test() {
        let base = Base::<2>::new(matrix![0, 2; 0, 2]);
        let visited = collect(&base, &vector![4, 4]);
        assert_eq!(
            visited,
            vec![
                vector![0, 0],
                vector![0, 1],
                vector![1, 0],
                vector![1, 1]
            ]
        );
    }

    #[test]
    fn wrap_in_inner_axis_test() {
        let base = Base::<2>::new(matrix![1, 2; 3, 5]);
        let visited = collect(&base, &vector![4, 4]);
        assert_eq!(visited, vec![vector![1, 3], vector![1, 0]]);
    }

    #[test]
    fn empty_range_test() {
        let base = Base::<1>::new(matrix![3, 3]);
        assert!(collect(&base, &vector![8]).is_empty());
    }

    #[test]
    fn full_wrap_coverage_test() {
        // An opening plane over the whole domain touches every cell once.
        let base = Base::<1>::new(matrix![2, 8]);
        let visited = collect(&base, &vector![6]);
        assert_eq!(visited.len(), 6);
        let mut sorted: Vec<i32> = visited.iter().map(|c| c[0]).collect();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
    }
}
