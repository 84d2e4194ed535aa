//! Greedy triangle-strip and quad-strip generation.
//!
//! Each primitive gets a short list of neighbors it could be continued into:
//! primitives of the same type and material sharing an edge that is walked
//! the other way around (so the strip keeps a consistent winding). Then,
//! repeatedly, the unprocessed primitive with the fewest live neighbors is
//! picked, a strip is walked from it in each edge direction, and the longest
//! one is kept.

use smallvec::SmallVec;
use super::{Primitive, PrimType, Vertex};

/// Strips the quads, then the triangles. Primitives that don't join a strip
/// are kept as they are.
pub fn strip(prims: Vec<Primitive>) -> Vec<Primitive> {
    let prims = strip_topology::<Quads>(prims);
    strip_topology::<Tris>(prims)
}

/// What's different between triangle and quad strips.
trait Topology {
    const CORNERS: usize;
    /// How many neighbors to remember per primitive.
    const MAX_CANDIDATES: usize;
    /// Longest strip, in primitives.
    const MAX_STRIP_LEN: usize;
    const LIST: PrimType;
    const STRIP: PrimType;
    /// Vertices each primitive after the first adds to the strip.
    const STEP_VERTICES: usize;

    /// Given the edge a primitive was entered through, the edge to leave it
    /// through. The leaving edge's corners are the ones appended to the strip.
    fn advance(a: usize, b: usize) -> (usize, usize);
}

struct Tris;
struct Quads;

impl Topology for Tris {
    const CORNERS: usize = 3;
    const MAX_CANDIDATES: usize = 3;
    const MAX_STRIP_LEN: usize = ::std::usize::MAX;
    const LIST: PrimType = PrimType::Triangles;
    const STRIP: PrimType = PrimType::TriangleStrip;
    const STEP_VERTICES: usize = 1;

    fn advance(a: usize, b: usize) -> (usize, usize) {
        // Leave through b and the corner that is neither a nor b.
        (b, 3 - a - b)
    }
}

impl Topology for Quads {
    const CORNERS: usize = 4;
    const MAX_CANDIDATES: usize = 4;
    const MAX_STRIP_LEN: usize = 1706;
    const LIST: PrimType = PrimType::Quads;
    const STRIP: PrimType = PrimType::QuadStrip;
    const STEP_VERTICES: usize = 2;

    fn advance(a: usize, b: usize) -> (usize, usize) {
        // The opposite edge, with a and b on the same sides as before.
        match (a, b) {
            (3, 0) => (2, 1),
            (0, 3) => (1, 2),
            _ if a >= b => ((a + 1) % 4, (b + 3) % 4),
            _ => ((a + 3) % 4, (b + 1) % 4),
        }
    }
}

type Candidates = SmallVec<[usize; 4]>;

fn strip_topology<T: Topology>(prims: Vec<Primitive>) -> Vec<Primitive> {
    let (list, others): (Vec<Primitive>, Vec<Primitive>) =
        prims.into_iter().partition(|p| p.prim_type == T::LIST);

    let candidates: Vec<Candidates> = (0..list.len())
        .map(|i| {
            (0..list.len())
                .filter(|&j| is_candidate::<T>(&list[i], &list[j]))
                .take(T::MAX_CANDIDATES)
                .collect()
        })
        .collect();

    let stripper = Stripper::<T> {
        prims: &list,
        candidates: &candidates,
        _topology: ::std::marker::PhantomData,
    };

    let mut result = stripper.run();
    result.extend(others);
    result
}

struct Stripper<'a, T: Topology> {
    prims: &'a [Primitive],
    candidates: &'a [Candidates],
    _topology: ::std::marker::PhantomData<T>,
}

impl<'a, T: Topology> Stripper<'a, T> {
    fn run(&self) -> Vec<Primitive> {
        let n = self.prims.len();
        let mut result = vec![];
        let mut processed = vec![false; n];
        let mut live_count: Vec<usize> = self.candidates.iter().map(|c| c.len()).collect();

        loop {
            let mut remaining = 0;
            for i in 0..n {
                if processed[i] { continue; }
                remaining += 1;
                if live_count[i] > 0 {
                    live_count[i] = self.candidates[i].iter()
                        .filter(|&&c| !processed[c])
                        .count();
                }
            }
            if remaining == 0 {
                break;
            }

            // First unprocessed primitive with the fewest live neighbors.
            let mut start = 0;
            let mut min_count = ::std::usize::MAX;
            for i in 0..n {
                if processed[i] { continue; }
                if live_count[i] < min_count {
                    min_count = live_count[i];
                    start = i;
                    if min_count <= 1 {
                        break;
                    }
                }
            }

            let mut best_len = 0;
            let mut best_edge = (0, 1);
            for a in 0..T::CORNERS {
                let edge = (a, (a + 1) % T::CORNERS);
                let mut scratch = processed.clone();
                let len = self.walk(start, edge, &mut scratch, None);
                if len > best_len {
                    best_len = len;
                    best_edge = edge;
                }
            }

            if best_len <= 1 {
                processed[start] = true;
                result.push(self.prims[start].clone());
            } else {
                let mut vertices = SmallVec::new();
                self.walk(start, best_edge, &mut processed, Some(&mut vertices));
                result.push(Primitive {
                    prim_type: T::STRIP,
                    material: self.prims[start].material,
                    vertices,
                });
            }
        }

        result
    }

    /// Walks a strip starting from `start` with `edge` as its first edge,
    /// marking primitives as processed as they join. Returns the number of
    /// primitives in the strip. The strip's vertices are appended to `out`
    /// if given.
    fn walk(
        &self,
        start: usize,
        edge: (usize, usize),
        processed: &mut [bool],
        mut out: Option<&mut SmallVec<[Vertex; 4]>>,
    ) -> usize {
        let mut cur = start;
        processed[cur] = true;

        let (mut a, mut b) = edge;
        if let Some(ref mut out) = out {
            let vs = &self.prims[cur].vertices;
            out.push(vs[a]);
            out.push(vs[b]);
        }
        let next = T::advance(a, b);
        a = next.0;
        b = next.1;
        self.emit_step(cur, (a, b), &mut out);

        let mut count = 1;
        while count < T::MAX_STRIP_LEN {
            let found = {
                let here = &self.prims[cur].vertices;
                let (va, vb) = (here[a], here[b]);
                self.candidates[cur].iter()
                    .filter(|&&c| !processed[c])
                    .filter_map(|&c| {
                        let there = &self.prims[c].vertices;
                        let shared = there.iter().filter(|&&v| v == va).count() +
                            there.iter().filter(|&&v| v == vb).count();
                        if shared != 2 {
                            return None;
                        }
                        let pa = there.iter().position(|&v| v == va)?;
                        let pb = there.iter().position(|&v| v == vb)?;
                        Some((c, pa, pb))
                    })
                    .next()
            };

            let (next_prim, pa, pb) = match found {
                Some(x) => x,
                None => break,
            };
            let next = T::advance(pa, pb);
            a = next.0;
            b = next.1;
            self.emit_step(next_prim, (a, b), &mut out);
            processed[next_prim] = true;
            count += 1;
            cur = next_prim;
        }

        count
    }

    fn emit_step(
        &self,
        prim: usize,
        (a, b): (usize, usize),
        out: &mut Option<&mut SmallVec<[Vertex; 4]>>,
    ) {
        if let Some(ref mut out) = *out {
            let vs = &self.prims[prim].vertices;
            if T::STEP_VERTICES == 2 {
                out.push(vs[a]);
            }
            out.push(vs[b]);
        }
    }
}

/// Whether `q` can follow `p` in a strip: same type and material, and the
/// first two corners they have in common form an edge of both, walked in
/// opposite directions.
fn is_candidate<T: Topology>(p: &Primitive, q: &Primitive) -> bool {
    if p.prim_type != q.prim_type || p.material != q.material {
        return false;
    }
    let n = T::CORNERS;
    let adjacent = |x: usize, y: usize| (x + 1) % n == y || (y + 1) % n == x;

    let mut first = None;
    for i in 0..n {
        for j in 0..n {
            if p.vertices[i] != q.vertices[j] {
                continue;
            }
            let (fi, fj) = match first {
                None => {
                    first = Some((i, j));
                    continue;
                }
                Some(f) => f,
            };
            if !adjacent(fi, i) || !adjacent(fj, j) {
                return false;
            }
            if fi == 0 && i == n - 1 {
                // p walks i -> fi, so q has to walk fj -> j.
                return fj < j || (fj == n - 1 && j == 0);
            }
            // p walks fi -> i, so q has to walk j -> fj.
            return fj > j || (fj == 0 && j == n - 1);
        }
    }
    false
}
