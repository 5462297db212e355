// engine-independent layout pipeline, nothing in here touches the ECS

pub mod error;
pub mod generator;
pub mod mst;
pub mod params;
pub mod raster;
pub mod rooms;
pub mod triangulation;
pub mod union_find;
pub mod utils;

pub use error::DungeonError;
pub use generator::{connect_points, generate, generate_with_rng, GeneratedDungeon};
pub use params::DungeonParams;
pub use raster::TileLayers;
pub use rooms::{Room, SeparationOutcome};
pub use utils::Edge;
