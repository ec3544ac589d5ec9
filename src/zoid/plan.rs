use crate::util::*;
use crate::zoid::base::Base;
use crate::zoid::task_graph;
use crate::zoid::zoid::Zoid;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One temporal band: 2^D zoids indexed by the hypercube vertex mask.
pub type LayerPlan<const GRID_DIMENSION: usize> = Vec<Zoid<GRID_DIMENSION>>;

/// The outer decomposition of the whole (steps x domain) iteration cube
/// into layers of hypercube-arranged zoids.
pub struct ExecutionPlan<const GRID_DIMENSION: usize> {
    layers: Vec<LayerPlan<GRID_DIMENSION>>,
}

impl<const GRID_DIMENSION: usize> ExecutionPlan<GRID_DIMENSION> {
    /// Build the layered plan over `base` for `steps` time steps.
    ///
    /// The layer height is half the smallest axis width; every axis gets
    /// a split point half a layer height from its right edge, so the
    /// opening right pieces have room to grow without meeting themselves
    /// across the periodic boundary. Returns `None` when the domain is
    /// too thin to stack zoids (smallest width < 2); callers fall back
    /// to an iterative driver.
    pub fn create(base: &Base<GRID_DIMENSION>, steps: usize) -> Option<Self> {
        let size = base.extent();
        let width = base.min_width();
        let height = width / 2;
        if height < 1 {
            return None;
        }

        let mut mids = [0; GRID_DIMENSION];
        for (j, mid) in mids.iter_mut().enumerate() {
            *mid = size[j] - (size[j] - width) / 2;
        }

        let num_tasks = 1usize << GRID_DIMENSION;
        let mut layers = Vec::new();
        let mut t0 = 0;
        while t0 < steps {
            let t1 = steps.min(t0 + height as usize);

            let mut zoids = Vec::with_capacity(num_tasks);
            for i in 0..num_tasks {
                let mut cur = *base;
                let mut slopes = Slopes::zero();
                for j in 0..GRID_DIMENSION {
                    if i & (1 << j) != 0 {
                        slopes[j] = -1;
                        cur.bounds[(j, 0)] = mids[j];
                        cur.bounds[(j, 1)] = size[j];
                    } else {
                        slopes[j] = 1;
                        cur.bounds[(j, 0)] = 0;
                        cur.bounds[(j, 1)] = mids[j];
                    }
                }
                zoids.push(Zoid::new(cur, slopes, t0, t1));
            }
            layers.push(zoids);

            t0 += height as usize;
        }

        Some(ExecutionPlan { layers })
    }

    pub fn layers(&self) -> &[LayerPlan<GRID_DIMENSION>] {
        &self.layers
    }

    /// Run every layer's zoids on the calling thread, in ascending
    /// popcount order of the vertex mask.
    pub fn run_sequential<EvenOp, OddOp>(
        &self,
        even: &EvenOp,
        odd: &OddOp,
        limits: &Coord<GRID_DIMENSION>,
    ) where
        EvenOp: Fn(&Coord<GRID_DIMENSION>, usize),
        OddOp: Fn(&Coord<GRID_DIMENSION>, usize),
    {
        let graph = task_graph::enumerate(GRID_DIMENSION);
        for layer in &self.layers {
            for node in &graph {
                layer[node.index].for_each(even, odd, limits);
            }
        }
    }

    /// Run the plan on the thread pool, one task per hypercube vertex,
    /// wired with the subset-order dependencies of the task graph. Each
    /// layer's scope closes before the next layer starts, which carries
    /// the conservative layer-to-layer serialization.
    pub fn run_parallel<EvenOp, OddOp>(
        &self,
        even: &EvenOp,
        odd: &OddOp,
        limits: &Coord<GRID_DIMENSION>,
    ) where
        EvenOp: Fn(&Coord<GRID_DIMENSION>, usize) + Sync,
        OddOp: Fn(&Coord<GRID_DIMENSION>, usize) + Sync,
    {
        let graph = task_graph::enumerate(GRID_DIMENSION);
        for layer in &self.layers {
            run_layer(layer, &graph, even, odd, limits);
        }
    }
}

/// Cascade scheduler for one layer. Every vertex holds a pending count
/// of unfinished parents; a finishing vertex decrements its children
/// and spawns any child that reaches zero. Vertex 0 is the unique
/// source, so the cascade starts there.
struct LayerRun<'a, EvenOp, OddOp, const GRID_DIMENSION: usize> {
    layer: &'a [Zoid<GRID_DIMENSION>],
    children: Vec<Vec<usize>>,
    pending: Vec<AtomicUsize>,
    even: &'a EvenOp,
    odd: &'a OddOp,
    limits: &'a Coord<GRID_DIMENSION>,
}

impl<'a, EvenOp, OddOp, const GRID_DIMENSION: usize>
    LayerRun<'a, EvenOp, OddOp, GRID_DIMENSION>
where
    EvenOp: Fn(&Coord<GRID_DIMENSION>, usize) + Sync,
    OddOp: Fn(&Coord<GRID_DIMENSION>, usize) + Sync,
{
    fn execute<'s>(&'s self, s: &rayon::Scope<'s>, index: usize) {
        self.layer[index].pfor_each(self.even, self.odd, self.limits);

        for &child in &self.children[index] {
            if self.pending[child].fetch_sub(1, Ordering::AcqRel) == 1 {
                s.spawn(move |s| self.execute(s, child));
            }
        }
    }
}

fn run_layer<EvenOp, OddOp, const GRID_DIMENSION: usize>(
    layer: &[Zoid<GRID_DIMENSION>],
    graph: &[task_graph::TaskNode],
    even: &EvenOp,
    odd: &OddOp,
    limits: &Coord<GRID_DIMENSION>,
) where
    EvenOp: Fn(&Coord<GRID_DIMENSION>, usize) + Sync,
    OddOp: Fn(&Coord<GRID_DIMENSION>, usize) + Sync,
{
    let mut children = vec![Vec::new(); layer.len()];
    let mut pending: Vec<AtomicUsize> =
        (0..layer.len()).map(|_| AtomicUsize::new(0)).collect();
    for node in graph {
        pending[node.index] = AtomicUsize::new(node.parents.len());
        for &parent in &node.parents {
            children[parent].push(node.index);
        }
    }

    let run = LayerRun {
        layer,
        children,
        pending,
        even,
        odd,
        limits,
    };
    rayon::scope(|s| run.execute(s, 0));
}
