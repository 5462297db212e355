use bevy::prelude::*;

use crate::config::*;

use super::layout::{generate, DungeonParams, GeneratedDungeon};
use super::*;

// entity hierarchy components
#[derive(Component)]
pub struct Dungeon {
    pub seed: u64,
    pub main_rooms: usize,
}

#[derive(Component)]
pub struct FloorTile(pub IVec2);

#[derive(Component)]
pub struct WallTile(pub IVec2);

#[derive(Component)]
pub struct StartMarker;

#[derive(Component)]
pub struct EndMarker;

fn tile_to_world(tile: IVec2, height: f32) -> Vec3 {
    Vec3::new(tile.x as f32 * TILE_SIZE, height, tile.y as f32 * TILE_SIZE)
}

/// Runs the generator for `seed` with the panel parameters and records the
/// outcome. Failures are kept for the panel, not raised.
pub fn run_generation(seed: u64, params: &Params, data: &mut DungeonData) {
    let params = DungeonParams {
        seed: Some(seed),
        ..params.0.clone()
    };

    match generate(&params) {
        Ok(dungeon) => {
            data.dungeon = Some(dungeon);
            data.last_error = None;
        }
        Err(err) => {
            warn!("dungeon generation failed for seed {seed}: {err}");
            data.dungeon = None;
            data.last_error = Some(err.to_string());
        }
    }
}

pub fn spawn_dungeon(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    seed: u64,
    dungeon: &GeneratedDungeon,
    is_3d: bool,
) -> Entity {
    let dungeon_entity = commands
        .spawn((
            Dungeon {
                seed,
                main_rooms: dungeon.main_rooms.len(),
            },
            Transform::default(),
            Visibility::Visible,
        ))
        .id();

    // shared meshes, walls lie flat in 2D
    let wall_height = if is_3d { WALL_HEIGHT } else { FLOOR_THICKNESS };
    let floor_mesh = meshes.add(Cuboid::new(TILE_SIZE, FLOOR_THICKNESS, TILE_SIZE));
    let wall_mesh = meshes.add(Cuboid::new(TILE_SIZE, wall_height, TILE_SIZE));
    let marker_mesh = meshes.add(Sphere::new(MARKER_RADIUS));

    let floor_material = materials.add(StandardMaterial {
        base_color: Color::srgb(21.0 / 256.0, 104.0 / 256.0, 189.0 / 256.0),
        alpha_mode: AlphaMode::Opaque,
        ..default()
    });
    let start_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.7, 0.3),
        alpha_mode: AlphaMode::Opaque,
        ..default()
    });
    let end_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.1, 0.45, 0.15),
        alpha_mode: AlphaMode::Opaque,
        ..default()
    });
    let wall_material = materials.add(StandardMaterial {
        base_color: Color::srgb(99.0 / 256.0, 73.0 / 256.0, 47.0 / 256.0),
        alpha_mode: AlphaMode::Opaque,
        ..default()
    });
    let marker_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.85, 0.1),
        emissive: LinearRgba::rgb(1.0, 0.8, 0.1),
        ..default()
    });

    let mut children = Vec::with_capacity(dungeon.tiles.floor.len() + dungeon.tiles.walls.len() + 2);

    for &tile in &dungeon.tiles.floor {
        // start and end rooms get their own tint
        let material = if dungeon.start.contains_tile(tile) {
            start_material.clone()
        } else if dungeon.end.contains_tile(tile) {
            end_material.clone()
        } else {
            floor_material.clone()
        };

        children.push(commands.spawn((
            FloorTile(tile),
            Mesh3d(floor_mesh.clone()),
            MeshMaterial3d(material),
            Transform::from_translation(tile_to_world(tile, FLOOR_THICKNESS * 0.5)),
        )).id());
    }

    for &tile in &dungeon.tiles.walls {
        children.push(commands.spawn((
            WallTile(tile),
            Mesh3d(wall_mesh.clone()),
            MeshMaterial3d(wall_material.clone()),
            Transform::from_translation(tile_to_world(tile, wall_height * 0.5)),
        )).id());
    }

    // markers float above the floor
    let marker_height = FLOOR_THICKNESS + MARKER_RADIUS;
    children.push(commands.spawn((
        StartMarker,
        Mesh3d(marker_mesh.clone()),
        MeshMaterial3d(marker_material.clone()),
        Transform::from_translation(tile_to_world(dungeon.spawn_point(), marker_height)),
    )).id());
    children.push(commands.spawn((
        EndMarker,
        Mesh3d(marker_mesh),
        MeshMaterial3d(marker_material),
        Transform::from_translation(tile_to_world(dungeon.treasure_point(), marker_height))
            .with_scale(Vec3::splat(0.6)),
    )).id());

    commands.entity(dungeon_entity).add_children(&children);

    debug!(
        "spawned {} floor and {} wall tiles",
        dungeon.tiles.floor.len(),
        dungeon.tiles.walls.len()
    );
    dungeon_entity
}

pub fn handle_regeneration(
    mut commands: Commands,
    mut events: EventReader<RegenerateEvent>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut seed: ResMut<Seed>,
    params: Res<Params>,
    mut data: ResMut<DungeonData>,
    query: Query<Entity, With<Dungeon>>,
    is_3d: Res<crate::systems::ui::Is3D>,
) {
    // several requests in one frame collapse into the last one
    let Some(event) = events.read().last() else {
        return;
    };

    // cleanup existing dungeon, children go with it
    for entity in query.iter() {
        commands.entity(entity).try_despawn();
    }

    seed.0 = event.seed;
    run_generation(event.seed, &params, &mut data);

    if let Some(dungeon) = &data.dungeon {
        spawn_dungeon(&mut commands, &mut meshes, &mut materials, event.seed, dungeon, is_3d.0);
    }
}

pub fn handle_clear(
    mut commands: Commands,
    mut events: EventReader<ClearEvent>,
    query: Query<Entity, With<Dungeon>>,
    mut data: ResMut<DungeonData>,
) {
    if events.read().last().is_none() {
        return;
    }

    for entity in query.iter() {
        commands.entity(entity).try_despawn();
    }
    data.dungeon = None;
    data.last_error = None;
}
