// procedural dungeon layouts: scattered rooms, separated, linked by a
// spanning tree over their Delaunay graph, then rasterized onto a tile grid

pub mod config;
pub mod systems;

pub use systems::dungeon::layout::{
    generate, generate_with_rng, DungeonError, DungeonParams, Edge, GeneratedDungeon, Room,
    SeparationOutcome, TileLayers,
};
