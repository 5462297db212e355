// incremental Delaunay triangulation
// points are inserted one at a time in a spatially coherent order, each insert
// splits its containing triangle and edge flips restore the empty-circumcircle property

use bevy::math::DVec2;
use bevy::prelude::*;

use super::error::DungeonError;
use super::utils::{dedup_points, orientation, Edge};

// half-size of the bounding triangle, in normalized (unit square) coordinates
const SUPER_TRIANGLE_EXTENT: f64 = 1.0e4;

// binning squeezes coordinates slightly so x == 1.0 stays in the last bin
const BIN_SQUEEZE: f64 = 0.999;

// relative distance from the line below which input counts as collinear
const COLLINEAR_TOLERANCE: f64 = 1.0e-9;

/// Counter-clockwise triangle. `neighbors[k]` is the triangle across the edge
/// `vertices[k] -> vertices[(k + 1) % 3]`, `None` on the hull.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [usize; 3],
    pub neighbors: [Option<usize>; 3],
}

/// Result of `triangulate`. Vertex indices refer to `points()`, which is the
/// input with exact duplicates removed.
#[derive(Clone, Debug, Default)]
pub struct Triangulation {
    points: Vec<Vec2>,
    triangles: Vec<Triangle>,
    edges: Vec<(usize, usize)>,
}

impl Triangulation {
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Every undirected edge once, weighted by its length.
    pub fn edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .map(|&(a, b)| Edge::new(self.points[a], self.points[b]))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Builds the Delaunay triangulation of `points`.
///
/// Exactly collinear input has no triangles; its edges are then the chain of
/// consecutive points along the line.
/// # Errors `TooFewPoints` if fewer than 3 distinct points are given
pub fn triangulate(points: &[Vec2]) -> Result<Triangulation, DungeonError> {
    let points = dedup_points(points);
    if points.len() < 3 {
        return Err(DungeonError::TooFewPoints { found: points.len() });
    }

    let coords: Vec<DVec2> = points.iter().map(|p| p.as_dvec2()).collect();

    // remap to (0,0)-(1,1), preserving aspect ratio
    let min = coords.iter().fold(DVec2::splat(f64::INFINITY), |acc, p| acc.min(*p));
    let max = coords.iter().fold(DVec2::splat(f64::NEG_INFINITY), |acc, p| acc.max(*p));
    let span = (max - min).max_element();

    if let Some(chain) = collinear_chain(&coords, span) {
        debug!("triangulation input of {} points is collinear", points.len());
        return Ok(Triangulation {
            points,
            triangles: Vec::new(),
            edges: chain,
        });
    }

    let normalized: Vec<DVec2> = coords.iter().map(|p| (*p - min) / span).collect();
    let order = scan_order(&normalized);

    let mut builder = Builder::new(order.iter().map(|&i| normalized[i]).collect());
    for i in 0..order.len() {
        builder.insert(i);
    }

    // vertices go back to input indices, which undoes the normalization exactly
    let triangles = builder.finish(&order);
    let edges = unique_edges(&triangles);
    debug!(
        "triangulated {} points into {} triangles, {} edges",
        points.len(),
        triangles.len(),
        edges.len()
    );

    Ok(Triangulation {
        points,
        triangles,
        edges,
    })
}

/// Insertion order from serpentine binning: rows of bins are scanned
/// alternately left-to-right and right-to-left so consecutive points are close.
fn scan_order(normalized: &[DVec2]) -> Vec<usize> {
    let bins = (normalized.len() as f64).powf(0.25).ceil() as usize;
    let scale = bins as f64 * BIN_SQUEEZE;

    let keys: Vec<usize> = normalized
        .iter()
        .map(|p| {
            let row = (p.y * scale) as usize;
            let col = (p.x * scale) as usize;
            if row % 2 == 1 {
                (row + 1) * bins - col
            } else {
                row * bins + col + 1
            }
        })
        .collect();

    let mut order: Vec<usize> = (0..normalized.len()).collect();
    order.sort_by_key(|&i| keys[i]); // stable
    order
}

fn collinear_chain(coords: &[DVec2], span: f64) -> Option<Vec<(usize, usize)>> {
    let origin = coords[0];
    let far = coords
        .iter()
        .copied()
        .max_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))?;
    let axis = far - origin;
    let length = axis.length();

    let collinear = coords
        .iter()
        .all(|&p| orientation(origin, far, p).abs() / length <= COLLINEAR_TOLERANCE * span);
    if !collinear {
        return None;
    }

    let mut along: Vec<usize> = (0..coords.len()).collect();
    along.sort_by(|&a, &b| (coords[a] - origin).dot(axis).total_cmp(&(coords[b] - origin).dot(axis)));
    Some(along.windows(2).map(|w| (w[0], w[1])).collect())
}

// each interior edge is shared by two triangles, emit it from the lower index only
fn unique_edges(triangles: &[Triangle]) -> Vec<(usize, usize)> {
    let mut edges = Vec::with_capacity(triangles.len() * 2);
    for (t, tri) in triangles.iter().enumerate() {
        for k in 0..3 {
            let keep = match tri.neighbors[k] {
                Some(n) => n > t,
                None => true,
            };
            if keep {
                edges.push((tri.vertices[k], tri.vertices[(k + 1) % 3]));
            }
        }
    }
    edges
}

// arena of triangles over the scan-ordered points plus the three super vertices
// triangles are never removed while inserting, so indices stay stable
struct Builder {
    points: Vec<DVec2>,
    real: usize,
    triangles: Vec<Triangle>,
    stack: Vec<usize>,
}

impl Builder {
    fn new(mut points: Vec<DVec2>) -> Self {
        let real = points.len();
        let e = SUPER_TRIANGLE_EXTENT;
        points.push(DVec2::new(-e, -e));
        points.push(DVec2::new(e, -e));
        points.push(DVec2::new(0.0, e));

        Self {
            points,
            real,
            triangles: vec![Triangle {
                vertices: [real, real + 1, real + 2],
                neighbors: [None; 3],
            }],
            stack: Vec::new(),
        }
    }

    fn insert(&mut self, ii: usize) {
        let t = self.locate(self.points[ii]);

        let [a, b, c] = self.triangles[t].vertices;
        let [ab, bc, ca] = self.triangles[t].neighbors;
        let n1 = self.triangles.len();
        let n2 = n1 + 1;

        // fan the containing triangle into three, each with the new point first
        // so the edge opposite it is always edge 1
        self.triangles[t] = Triangle {
            vertices: [ii, a, b],
            neighbors: [Some(n2), ab, Some(n1)],
        };
        self.triangles.push(Triangle {
            vertices: [ii, b, c],
            neighbors: [Some(t), bc, Some(n2)],
        });
        self.triangles.push(Triangle {
            vertices: [ii, c, a],
            neighbors: [Some(n1), ca, Some(t)],
        });
        self.relink(bc, t, n1);
        self.relink(ca, t, n2);

        for tri in [t, n1, n2] {
            if self.triangles[tri].neighbors[1].is_some() {
                self.stack.push(tri);
            }
        }

        while let Some(l) = self.stack.pop() {
            if let Some(r) = self.legalize(l, ii) {
                if self.triangles[l].neighbors[1].is_some() {
                    self.stack.push(l);
                }
                if self.triangles[r].neighbors[1].is_some() {
                    self.stack.push(r);
                }
            }
        }
    }

    /// Walks from the newest triangle toward `p`.
    /// # Returns the index of a triangle containing `p` (boundary inclusive)
    fn locate(&self, p: DVec2) -> usize {
        let mut t = self.triangles.len() - 1;
        for _ in 0..=self.triangles.len() {
            let (edge, distance) = self.farthest_outside_edge(t, p);
            if distance <= 0.0 {
                return t;
            }
            match self.triangles[t].neighbors[edge] {
                Some(next) => t = next,
                None => break,
            }
        }

        // walk did not settle, fall back to the least-outside triangle
        warn!("point location walk did not converge, scanning all triangles");
        (0..self.triangles.len())
            .min_by(|&x, &y| {
                let dx = self.farthest_outside_edge(x, p).1;
                let dy = self.farthest_outside_edge(y, p).1;
                dx.total_cmp(&dy)
            })
            .unwrap_or(t)
    }

    // signed distance of p to the right of each edge, positive means outside
    fn farthest_outside_edge(&self, t: usize, p: DVec2) -> (usize, f64) {
        let v = self.triangles[t].vertices;
        let mut best = (0, f64::NEG_INFINITY);
        for k in 0..3 {
            let a = self.points[v[k]];
            let b = self.points[v[(k + 1) % 3]];
            let s = -orientation(a, b, p);
            if s > best.1 {
                best = (k, s);
            }
        }
        best
    }

    /// Flips the edge opposite the inserted point of `l` if that point lies in
    /// the circumcircle of the triangle across it.
    /// # Returns the other flipped triangle on a flip
    fn legalize(&mut self, l: usize, ii: usize) -> Option<usize> {
        let Triangle {
            vertices: [_, a, b],
            neighbors: [x, Some(r), y],
        } = self.triangles[l]
        else {
            return None;
        };

        // r winds b -> a -> d
        let across = self.triangles[r];
        let k = (0..3).find(|&k| across.vertices[k] != a && across.vertices[k] != b)?;
        let d = across.vertices[k];
        let rb = across.neighbors[k];
        let ra = across.neighbors[(k + 2) % 3];

        if !self.in_circumcircle(a, b, d, ii) {
            return None;
        }

        // swap diagonal a-b for p-d
        self.triangles[l] = Triangle {
            vertices: [ii, a, d],
            neighbors: [x, ra, Some(r)],
        };
        self.triangles[r] = Triangle {
            vertices: [ii, d, b],
            neighbors: [Some(l), rb, y],
        };
        self.relink(ra, r, l);
        self.relink(y, l, r);
        Some(r)
    }

    // opposite-angle test: p lies inside the circle through a, b, d when the
    // angles at d and at p sum to more than pi
    fn in_circumcircle(&self, a: usize, b: usize, d: usize, ii: usize) -> bool {
        let v1 = self.points[b];
        let v2 = self.points[a];
        let v3 = self.points[d];
        let p = self.points[ii];

        let cos_a = (v1 - v3).dot(v2 - v3);
        let cos_b = (v2 - p).dot(v1 - p);
        let sin_a = (v1 - v3).perp_dot(v2 - v3);
        let sin_b = (v2 - p).perp_dot(v1 - p);

        (cos_a < 0.0 && cos_b < 0.0) || (-cos_a * sin_b > cos_b * sin_a)
    }

    fn relink(&mut self, t: Option<usize>, old: usize, new: usize) {
        if let Some(t) = t {
            if let Some(slot) = self.triangles[t]
                .neighbors
                .iter_mut()
                .find(|n| **n == Some(old))
            {
                *slot = Some(new);
            }
        }
    }

    /// Drops triangles touching a super vertex and renumbers the rest.
    fn finish(self, order: &[usize]) -> Vec<Triangle> {
        let real = self.real;
        let alive: Vec<bool> = self
            .triangles
            .iter()
            .map(|t| t.vertices.iter().all(|&v| v < real))
            .collect();

        let mut renumber = vec![None; self.triangles.len()];
        let mut next = 0;
        for (i, &live) in alive.iter().enumerate() {
            if live {
                renumber[i] = Some(next);
                next += 1;
            }
        }

        self.triangles
            .iter()
            .zip(&alive)
            .filter(|(_, live)| **live)
            .map(|(t, _)| Triangle {
                vertices: t.vertices.map(|v| order[v]),
                neighbors: t.neighbors.map(|n| n.and_then(|n| renumber[n])),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use spade::{DelaunayTriangulation, Point2, Triangulation as _};
    use std::collections::HashSet;

    fn pts(raw: &[(f32, f32)]) -> Vec<Vec2> {
        raw.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    // > 0 when d is strictly inside the circle through counter-clockwise a, b, c
    fn in_circle(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> f64 {
        let (ad, bd, cd) = (a - d, b - d, c - d);
        let (a2, b2, c2) = (ad.length_squared(), bd.length_squared(), cd.length_squared());
        ad.x * (bd.y * c2 - b2 * cd.y) - ad.y * (bd.x * c2 - b2 * cd.x) + a2 * (bd.x * cd.y - bd.y * cd.x)
    }

    fn vertex_positions(t: &Triangulation, tri: &Triangle) -> [DVec2; 3] {
        tri.vertices.map(|v| t.points()[v].as_dvec2())
    }

    fn connected(t: &Triangulation) -> bool {
        let n = t.points().len();
        let mut adjacency = vec![Vec::new(); n];
        for &(a, b) in &t.edges {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        let mut seen = vec![false; n];
        let mut stack = vec![0];
        seen[0] = true;
        while let Some(v) = stack.pop() {
            for &w in &adjacency[v] {
                if !seen[w] {
                    seen[w] = true;
                    stack.push(w);
                }
            }
        }
        seen.into_iter().all(|s| s)
    }

    fn assert_well_formed(t: &Triangulation) {
        for (i, tri) in t.triangles().iter().enumerate() {
            let [a, b, c] = vertex_positions(t, tri);
            assert!(orientation(a, b, c) > 0.0, "triangle {i} is not counter-clockwise");

            for k in 0..3 {
                let Some(n) = tri.neighbors[k] else { continue };
                let other = &t.triangles()[n];
                let (from, to) = (tri.vertices[k], tri.vertices[(k + 1) % 3]);
                let back = (0..3)
                    .find(|&m| other.vertices[m] == to && other.vertices[(m + 1) % 3] == from)
                    .expect("neighbor does not share the edge reversed");
                assert_eq!(other.neighbors[back], Some(i), "adjacency is not symmetric");

                let opposite = other.vertices[(back + 2) % 3];
                let d = t.points()[opposite].as_dvec2();
                assert!(in_circle(a, b, c, d) < 0.5, "edge {from}-{to} is not locally Delaunay");
            }
        }
    }

    #[test]
    fn fewer_than_three_points_is_rejected() {
        assert_eq!(
            triangulate(&pts(&[(0.0, 0.0), (1.0, 1.0)])).unwrap_err(),
            DungeonError::TooFewPoints { found: 2 }
        );
        // duplicates do not count
        assert_eq!(
            triangulate(&pts(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)])).unwrap_err(),
            DungeonError::TooFewPoints { found: 2 }
        );
    }

    #[test]
    fn single_triangle() {
        let t = triangulate(&pts(&[(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)])).unwrap();
        assert_eq!(t.triangles().len(), 1);
        assert_eq!(t.triangles()[0].neighbors, [None; 3]);

        let edges = t.edges();
        assert_eq!(edges.len(), 3);
        let hypotenuse = Edge::new(Vec2::new(4.0, 0.0), Vec2::new(0.0, 3.0));
        let found = edges.iter().find(|e| **e == hypotenuse).unwrap();
        assert_eq!(found.weight, 5.0);
        assert_well_formed(&t);
    }

    #[test]
    fn square_with_center() {
        let t = triangulate(&pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (5.0, 5.0)])).unwrap();
        // n = 5, 4 hull points: 2n - 2 - h triangles, 3n - 3 - h edges
        assert_eq!(t.triangles().len(), 4);
        assert_eq!(t.edge_count(), 8);
        let center = Vec2::new(5.0, 5.0);
        assert_eq!(t.edges().iter().filter(|e| e.start == center || e.end == center).count(), 4);
        assert_well_formed(&t);
    }

    #[test]
    fn grid_counts_match_euler() {
        let mut raw = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                raw.push((x as f32 * 7.0, y as f32 * 7.0));
            }
        }
        let t = triangulate(&pts(&raw)).unwrap();
        assert_eq!(t.triangles().len(), 8);
        assert_eq!(t.edge_count(), 16);
        assert_well_formed(&t);
    }

    #[test]
    fn collinear_input_becomes_a_chain() {
        let t = triangulate(&pts(&[(6.0, 3.0), (0.0, 0.0), (2.0, 1.0), (4.0, 2.0)])).unwrap();
        assert!(t.triangles().is_empty());
        let edges = t.edges();
        assert_eq!(edges.len(), 3);
        assert!(edges.contains(&Edge::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 1.0))));
        assert!(edges.contains(&Edge::new(Vec2::new(2.0, 1.0), Vec2::new(4.0, 2.0))));
        assert!(edges.contains(&Edge::new(Vec2::new(4.0, 2.0), Vec2::new(6.0, 3.0))));
    }

    #[test]
    fn edges_use_input_coordinates() {
        let input = pts(&[(-31.0, 12.0), (17.0, -40.0), (5.0, 22.0), (-3.0, -9.0), (28.0, 30.0)]);
        let t = triangulate(&input).unwrap();
        for e in t.edges() {
            assert!(input.contains(&e.start));
            assert!(input.contains(&e.end));
            assert_eq!(e.weight, e.start.distance(e.end));
        }
    }

    #[test]
    fn matches_reference_triangulation() {
        for seed in [1_u64, 7, 42, 1512086461918454205] {
            let mut rng = StdRng::seed_from_u64(seed);
            let input: Vec<Vec2> = (0..40)
                .map(|_| Vec2::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
                .collect();

            let ours = triangulate(&input).unwrap();
            let reference = DelaunayTriangulation::<Point2<f64>>::bulk_load(
                input.iter().map(|p| Point2::new(p.x as f64, p.y as f64)).collect(),
            )
            .unwrap();

            assert_eq!(ours.triangles().len(), reference.num_inner_faces(), "seed {seed}");
            assert_eq!(ours.edge_count(), reference.num_undirected_edges(), "seed {seed}");
            assert_eq!(
                ours.triangles().len(),
                2 * input.len() - 2 - reference.convex_hull_size(),
                "seed {seed}"
            );

            let edges = ours.edges();
            for edge in reference.undirected_edges() {
                let [a, b] = edge.vertices().map(|v| v.position());
                let a = Vec2::new(a.x as f32, a.y as f32);
                let b = Vec2::new(b.x as f32, b.y as f32);
                assert!(edges.iter().any(|e| e.connects(a, b)), "seed {seed}: missing edge {a} {b}");
            }
            assert_well_formed(&ours);
        }
    }

    #[test]
    fn scan_order_is_serpentine() {
        // 16 points -> 2 bins per axis
        let mut normalized = Vec::new();
        for y in 0..4 {
            for x in 0..4 {
                normalized.push(DVec2::new(x as f64 / 3.0, y as f64 / 3.0));
            }
        }
        let order = scan_order(&normalized);
        let first_row_last = normalized[order[7]];
        let second_row_first = normalized[order[8]];
        // bottom half ends on the right, top half starts on the right
        assert!(first_row_last.x > 0.5 && first_row_last.y < 0.5);
        assert!(second_row_first.x > 0.5 && second_row_first.y > 0.5);
    }

    proptest! {
        #[test]
        fn lattice_points_triangulate_cleanly(
            raw in proptest::collection::vec((0i32..40, 0i32..40), 3..30)
        ) {
            let unique: HashSet<(i32, i32)> = raw.iter().copied().collect();
            let input: Vec<Vec2> = unique.iter().map(|&(x, y)| Vec2::new(x as f32, y as f32)).collect();
            prop_assume!(input.len() >= 3);

            let t = triangulate(&input).unwrap();
            prop_assert_eq!(t.points().len(), input.len());
            prop_assert!(connected(&t));
            assert_well_formed(&t);

            if !t.triangles().is_empty() {
                // every edge borders one (hull) or two (interior) triangles
                let mut uses = std::collections::HashMap::new();
                for tri in t.triangles() {
                    for k in 0..3 {
                        let (a, b) = (tri.vertices[k], tri.vertices[(k + 1) % 3]);
                        *uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
                    }
                }
                prop_assert_eq!(uses.len(), t.edge_count());
                prop_assert!(uses.values().all(|&n| n == 1 || n == 2));
            }
        }
    }
}
