//! The top-level task graph of one layer: 2^D zoids sitting at the
//! vertices of the D-hypercube. Bit `j` of a vertex mask set means the
//! zoid occupies the right, opening half of axis `j`, so a vertex
//! consumes the tails of every vertex one set bit below it. That makes
//! the dependency order the subset order on masks.

/// One hypercube vertex with its direct predecessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub index: usize,
    /// Masks differing from `index` by clearing exactly one set bit.
    pub parents: Vec<usize>,
}

/// Enumerate all vertices in ascending popcount order (numeric order
/// within one popcount class). Scheduling vertices in this order
/// respects every parent edge.
pub fn enumerate(dimension: usize) -> Vec<TaskNode> {
    let num_tasks = 1usize << dimension;
    let mut order: Vec<usize> = (0..num_tasks).collect();
    order.sort_by_key(|index| index.count_ones());

    order
        .into_iter()
        .map(|index| TaskNode {
            index,
            parents: (0..dimension)
                .filter(|j| index & (1 << j) != 0)
                .map(|j| index & !(1 << j))
                .collect(),
        })
        .collect()
}
