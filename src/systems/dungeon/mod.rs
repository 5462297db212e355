// this is the entry point for the dungeon generation plugin
use bevy::prelude::*;

use crate::config::*;

pub mod layout;
pub mod tiles;

use layout::{GeneratedDungeon, Room};

// resources
#[derive(Resource)]
pub struct Seed(pub u64);

// generation parameters, edited by the side panel
#[derive(Resource, Default, Deref, DerefMut)]
pub struct Params(pub layout::DungeonParams);

// last generation run
#[derive(Resource, Default)]
pub struct DungeonData {
    pub dungeon: Option<GeneratedDungeon>,
    pub last_error: Option<String>,
}

// Event for regeneration
#[derive(Event)]
pub struct RegenerateEvent {
    pub seed: u64,
}

// Event for clearing all data
#[derive(Event)]
pub struct ClearEvent;

// main plugin for generation
pub struct DungeonGenerationPlugin;

impl Plugin for DungeonGenerationPlugin {
    fn build(&self, app: &mut App) {
        app
            .insert_resource(Seed(INITIAL_SEED))
            .insert_resource(Params::default())
            .insert_resource(DungeonData::default())

            .add_event::<RegenerateEvent>()
            .add_event::<ClearEvent>()

            // first dungeon goes through the same path as every other one
            .add_systems(Startup, |mut regen_events: EventWriter<RegenerateEvent>, seed: Res<Seed>| {
                regen_events.write(RegenerateEvent { seed: seed.0 });
            })
            .add_systems(Update, (debug_gizmos, tiles::handle_regeneration, tiles::handle_clear));
    }
}

// tile (x, y) sits on the ground plane at (x, _, y)
fn ground(point: Vec2, height: f32) -> Vec3 {
    Vec3::new(point.x * TILE_SIZE, height, point.y * TILE_SIZE)
}

fn room_outline(gizmos: &mut Gizmos, room: &Room, height: f32, color: Color) {
    let (min, max) = room.bounds();
    // tile rectangle edges, not tile centers
    let min = min.as_vec2() - Vec2::splat(0.5);
    let max = max.as_vec2() + Vec2::splat(0.5);
    let corners = [
        Vec2::new(min.x, min.y),
        Vec2::new(max.x, min.y),
        Vec2::new(max.x, max.y),
        Vec2::new(min.x, max.y),
    ];
    for i in 0..4 {
        gizmos.line(ground(corners[i], height), ground(corners[(i + 1) % 4], height), color);
    }
}

fn debug_gizmos(
    mut gizmos: Gizmos,
    data: Res<DungeonData>,
    gizmos_visible: Res<crate::systems::ui::GizmosVisible>,
) {
    if !gizmos_visible.0 {
        return;
    }
    let Some(dungeon) = &data.dungeon else {
        return;
    };

    // every room, main rooms brighter
    for room in &dungeon.rooms {
        let is_main = dungeon.main_rooms.iter().any(|m| m.id == room.id);
        let color = if is_main {
            Color::srgba(1.0, 1.0, 1.0, 0.8)
        } else {
            Color::srgba(0.6, 0.6, 0.6, 0.25)
        };
        room_outline(&mut gizmos, room, 0.05, color);
    }

    // yellow triangulation, red spanning tree, blue extras
    let lift = FLOOR_THICKNESS + 0.05;
    for edge in &dungeon.triangulation {
        gizmos.line(ground(edge.start, lift), ground(edge.end, lift), Color::srgba(1.0, 1.0, 0.0, 0.4));
    }
    for edge in &dungeon.spanning_tree {
        gizmos.line(ground(edge.start, lift + 0.01), ground(edge.end, lift + 0.01), Color::srgb(1.0, 0.0, 0.0));
    }
    for edge in dungeon.extra_edges() {
        gizmos.line(ground(edge.start, lift + 0.01), ground(edge.end, lift + 0.01), Color::srgb(0.0, 0.4, 1.0));
    }
}
