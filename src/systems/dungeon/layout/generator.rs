// the full pipeline: rooms -> separation -> graph -> tiles

use std::time::Instant;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::DungeonError;
use super::mst::{minimum_spanning_tree, vertex_count};
use super::params::DungeonParams;
use super::raster::{rasterize, TileLayers};
use super::rooms::{
    create_rooms, find_start_and_end, select_main_rooms, separate_rooms, Room, SeparationOutcome,
};
use super::triangulation::triangulate;
use super::utils::{dedup_points, Edge};

/// Result of one generation run, everything the host needs to draw it.
#[derive(Clone, Debug)]
pub struct GeneratedDungeon {
    pub seed: Option<u64>,
    pub rooms: Vec<Room>,          // every room, largest first
    pub main_rooms: Vec<Room>,
    pub triangulation: Vec<Edge>,  // candidate corridors
    pub spanning_tree: Vec<Edge>,
    pub edges: Vec<Edge>,          // spanning tree plus the extra edges kept
    pub tiles: TileLayers,
    pub start: Room,
    pub end: Room,
    pub separation: SeparationOutcome,
}

impl GeneratedDungeon {
    pub fn spawn_point(&self) -> IVec2 {
        self.start.center
    }

    pub fn treasure_point(&self) -> IVec2 {
        self.end.center
    }

    /// Kept corridors that are not part of the spanning tree
    pub fn extra_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| !self.spanning_tree.contains(e))
    }
}

/// Validates `params` and runs the pipeline, seeding from `params.seed`
/// or from the OS when it is `None`.
pub fn generate(params: &DungeonParams) -> Result<GeneratedDungeon, DungeonError> {
    // generate_with_rng validates before drawing anything
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    generate_with_rng(params, &mut rng)
}

/// Same as [`generate`] with a caller-owned random source. `params.seed`
/// is only recorded, not used.
pub fn generate_with_rng(
    params: &DungeonParams,
    rng: &mut impl Rng,
) -> Result<GeneratedDungeon, DungeonError> {
    params.validate()?;
    let total = Instant::now();

    // 1. room cloud
    let mut rooms = create_rooms(params, rng);

    let timer = Instant::now();
    let separation = separate_rooms(&mut rooms, params.overlap_margin, params.max_separation_passes());
    if separation.converged {
        info!("separated {} rooms in {} passes ({:?})", rooms.len(), separation.passes, timer.elapsed());
    } else {
        warn!(
            "separation hit its cap of {} passes, some rooms still overlap",
            separation.passes
        );
    }
    for room in &mut rooms {
        room.finalize_center();
    }

    // 2. main rooms and their graph
    let main_rooms = select_main_rooms(&mut rooms, params.main_room_count);
    let centers: Vec<Vec2> = main_rooms.iter().map(|r| r.center.as_vec2()).collect();

    let timer = Instant::now();
    let triangulation = connect_points(&centers)?;
    info!("triangulated {} rooms into {} edges ({:?})", centers.len(), triangulation.len(), timer.elapsed());

    let spanning_tree = connected_tree(&triangulation, &centers)?;

    // 3. a few loops back in
    let mut edges = spanning_tree.clone();
    for edge in &triangulation {
        if !spanning_tree.contains(edge) && rng.random_bool(params.extra_edge_percentage as f64) {
            edges.push(*edge);
        }
    }
    debug!("kept {} extra edges", edges.len() - spanning_tree.len());

    let (start, end) = find_start_and_end(&main_rooms).ok_or_else(|| {
        DungeonError::InvalidConfig(format!("need at least 2 main rooms, got {}", main_rooms.len()))
    })?;

    // 4. tiles
    let timer = Instant::now();
    let tiles = rasterize(&main_rooms, &edges, params.edge_thickness);
    info!("rasterized {} floor tiles ({:?})", tiles.floor.len(), timer.elapsed());

    info!("dungeon generated in {:?}", total.elapsed());
    Ok(GeneratedDungeon {
        seed: params.seed,
        rooms,
        main_rooms,
        triangulation,
        spanning_tree,
        edges,
        tiles,
        start,
        end,
        separation,
    })
}

/// Candidate corridor graph over `points`. Two distinct points make a single
/// edge, fewer make none.
pub fn connect_points(points: &[Vec2]) -> Result<Vec<Edge>, DungeonError> {
    let unique = dedup_points(points);
    match unique.len() {
        0 | 1 => Ok(Vec::new()),
        2 => Ok(vec![Edge::new(unique[0], unique[1])]),
        _ => Ok(triangulate(&unique)?.edges()),
    }
}

// minimum spanning tree, falling back to the complete graph if the
// triangulation left some point unreachable
fn connected_tree(candidates: &[Edge], points: &[Vec2]) -> Result<Vec<Edge>, DungeonError> {
    let tree = minimum_spanning_tree(candidates)?;
    let unique = dedup_points(points);
    if unique.len() < 2 || (tree.len() + 1 == unique.len() && vertex_count(&tree) == unique.len()) {
        return Ok(tree);
    }

    warn!(
        "spanning tree covers {} of {} rooms, retrying over the complete graph",
        vertex_count(&tree),
        unique.len()
    );
    let mut all = candidates.to_vec();
    all.extend(complete_graph(&unique));
    minimum_spanning_tree(&all)
}

fn complete_graph(points: &[Vec2]) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(points.len() * points.len().saturating_sub(1) / 2);
    for (i, &a) in points.iter().enumerate() {
        for &b in &points[i + 1..] {
            edges.push(Edge::new(a, b));
        }
    }
    edges
}
