// Configuration file, all measurements in tiles (1 unit = 1 tile)
// This controls the initial generation parameter settings

pub const INITIAL_SEED: u64 = 1512086461918454205;

// Room cloud
pub const CELL_COUNT: usize = 150;        // rooms spawned before separation
pub const MAIN_ROOM_COUNT: usize = 15;    // rooms kept as the walkable dungeon
pub const SPAWN_RADIUS: f32 = 30.0;       // disc radius rooms are spawned in
pub const OVERLAP_MARGIN: i32 = 1;        // extra gap rooms need to not count as overlapping

// Room sizes, odd so every room has a center tile
pub const ROOM_SIZE_PALETTE: [i32; 5] = [9, 11, 13, 15, 17];

// Corridors
pub const EXTRA_EDGE_PERCENTAGE: f32 = 0.1; // chance of keeping a non-MST edge
pub const EDGE_THICKNESS: i32 = 1;          // corridor half-width in tiles

// Upper bounds accepted by validation, doubled rooms and their areas stay well inside i32
pub const MAX_SPAWN_RADIUS: f32 = 10_000.0;
pub const MAX_ROOM_SIZE: i32 = 1_001;
pub const MAX_OVERLAP_MARGIN: i32 = 64;
pub const MAX_EDGE_THICKNESS: i32 = 16;

// Separation is capped at this many passes per room
pub const SEPARATION_PASSES_PER_ROOM: usize = 3;

// Rendering, these are custom
pub const TILE_SIZE: f32 = 1.0;
pub const FLOOR_THICKNESS: f32 = 0.1;
pub const WALL_HEIGHT: f32 = 2.5;
pub const MARKER_RADIUS: f32 = 0.8;
