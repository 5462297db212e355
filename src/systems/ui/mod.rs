use bevy::prelude::*;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin}; // fps
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPrimaryContextPass};
use crate::systems::dungeon::{ClearEvent, DungeonData, Params, RegenerateEvent, Seed};

pub mod indicator;

// re-export the main items that other modules need
pub use indicator::{Indicator, IndicatorEvent, IndicatorMessage, update_indicator, render_indicator};

#[derive(Resource)]
pub struct GizmosVisible(pub bool);

#[derive(Resource)]
pub struct Is3D(pub bool);

pub struct UIPlugin;

impl Plugin for UIPlugin {
    fn build(&self, app: &mut App) {
        assert!(app.is_plugin_added::<EguiPlugin>());
        app
            .insert_resource(GizmosVisible(false))
            .insert_resource(Is3D(true))
            .insert_resource(Indicator::default())
            .add_event::<IndicatorEvent>()
            .add_systems(Update, (key_input, update_indicator))
            .add_systems(EguiPrimaryContextPass, (ui_main, fps, render_indicator)); // UI rendering here
    }
}

fn key_input(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut gizmos_visible: ResMut<GizmosVisible>,
    mut regen_events: EventWriter<RegenerateEvent>,
    mut indicator_events: EventWriter<IndicatorEvent>,
) {
    if keyboard_input.just_pressed(KeyCode::KeyE) {
        let new_seed = rand::random();
        regen_events.write(RegenerateEvent { seed: new_seed });
        indicator_events.write(IndicatorEvent(IndicatorMessage::Regenerated(new_seed)));
    }

    if keyboard_input.just_pressed(KeyCode::KeyG) {
        gizmos_visible.0 = !gizmos_visible.0;
        indicator_events.write(IndicatorEvent(IndicatorMessage::Overlay(gizmos_visible.0)));
    }
}

fn ui_main(
    mut contexts: EguiContexts,
    current_seed: Res<Seed>,
    mut params: ResMut<Params>,
    mut regen_events: EventWriter<RegenerateEvent>,
    mut clear_events: EventWriter<ClearEvent>,
    mut is_3d: ResMut<Is3D>,
    mut gizmos_visible: ResMut<GizmosVisible>,
    data: Res<DungeonData>,
) {
    if let Ok(ctx) = contexts.ctx_mut() {
        egui::SidePanel::left("config_panel")
            .default_width(200.0)
            .min_width(250.0)
            .max_width(400.0)
            .resizable(true)
            .show(ctx, |ui| {
                let mut regenerate = false;

                // camera
                ui.label("Camera: ");
                ui.label("WASD - Move");
                ui.label("Scroll - Zoom");
                ui.label("MMB - Rotate");

                ui.separator();

                // visibility changes respawn the tiles with the same seed
                ui.label("Layer Visibility:");
                if ui.checkbox(&mut is_3d.0, "3D Walls")
                    .on_hover_text("Extrude walls, or lay them flat next to the floor")
                    .changed() {
                    regenerate = true;
                }
                ui.checkbox(&mut gizmos_visible.0, "Debug Overlay (G)")
                    .on_hover_text("Room outlines, triangulation (yellow), spanning tree (red), extra corridors (blue)");

                ui.separator();

                ui.label("Generation Parameters:");

                // seed
                egui::CollapsingHeader::new("Seed")
                    .default_open(true)
                    .show(ui, |ui| {
                    ui.label(format!("Current: {}", current_seed.0));

                    ui.horizontal(|ui| {
                        if ui.button("Regenerate (E)").clicked() {
                            let new_seed = rand::random();
                            regen_events.write(RegenerateEvent { seed: new_seed });
                        }
                        let clear_button = egui::Button::new("Clear").fill(egui::Color32::from_rgb(130, 22, 22));
                        if ui.add(clear_button).clicked() {
                            clear_events.write(ClearEvent);
                        }
                    });
                });

                // room cloud
                egui::CollapsingHeader::new("Rooms")
                    .default_open(true)
                    .show(ui, |ui| {
                    regenerate |= ui.add(egui::Slider::new(&mut params.cell_count, 3..=400)
                        .text("Room Count"))
                        .on_hover_text("Rooms scattered before separation. Most of them are discarded.")
                        .changed();

                    // keep the main rooms a strict subset
                    let max_main = params.cell_count.saturating_sub(1).max(2);
                    regenerate |= ui.add(egui::Slider::new(&mut params.main_room_count, 2..=max_main)
                        .text("Main Rooms"))
                        .on_hover_text("Largest rooms kept as the dungeon.")
                        .changed();
                    regenerate |= ui.add(egui::Slider::new(&mut params.spawn_radius, 5.0..=120.0)
                        .text("Spawn Radius")
                        .suffix(" tiles"))
                        .on_hover_text("Radius of the disc rooms are scattered in.")
                        .changed();
                    regenerate |= ui.add(egui::Slider::new(&mut params.overlap_margin, 0..=6)
                        .text("Room Margin")
                        .suffix(" tiles"))
                        .on_hover_text("Gap separation keeps between neighbouring rooms.")
                        .changed();

                    let sizes: Vec<String> = params.room_size_palette.iter().map(|s| s.to_string()).collect();
                    ui.label(format!("Room sizes: {}", sizes.join(", ")));
                });

                // corridors
                egui::CollapsingHeader::new("Corridors")
                    .default_open(true)
                    .show(ui, |ui| {
                    regenerate |= ui.add(egui::Slider::new(&mut params.extra_edge_percentage, 0.0..=1.0)
                        .text("Loop Chance"))
                        .on_hover_text("Chance of keeping a corridor outside the spanning tree.")
                        .changed();
                    regenerate |= ui.add(egui::Slider::new(&mut params.edge_thickness, 0..=3)
                        .text("Corridor Half-Width")
                        .suffix(" tiles"))
                        .changed();
                });

                ui.separator();

                // run statistics
                if let Some(dungeon) = &data.dungeon {
                    egui::CollapsingHeader::new("Last Run")
                        .default_open(true)
                        .show(ui, |ui| {
                        ui.label(format!("Main rooms: {}", dungeon.main_rooms.len()));
                        ui.label(format!(
                            "Corridors: {} ({} tree, {} extra)",
                            dungeon.edges.len(),
                            dungeon.spanning_tree.len(),
                            dungeon.extra_edges().count()
                        ));
                        ui.label(format!("Triangulation edges: {}", dungeon.triangulation.len()));
                        ui.label(format!("Floor tiles: {}", dungeon.tiles.floor.len()));
                        ui.label(format!("Wall tiles: {}", dungeon.tiles.walls.len()));

                        let separation = if dungeon.separation.converged {
                            format!("{} passes", dungeon.separation.passes)
                        } else {
                            format!("capped at {} passes", dungeon.separation.passes)
                        };
                        ui.label(format!("Separation: {separation}"));
                        ui.label(format!("Spawn: {}", dungeon.spawn_point()));
                        ui.label(format!("Treasure: {}", dungeon.treasure_point()));
                    });
                }

                if let Some(error) = &data.last_error {
                    ui.label(egui::RichText::new(error).color(egui::Color32::from_rgb(178, 34, 34)));
                }

                ui.separator();
                ui.label("ESC - Exit");

                // trigger regeneration on any parameter change
                if regenerate {
                    regen_events.write(RegenerateEvent { seed: current_seed.0 });
                }
            });
    }
}

fn fps(
    mut contexts: EguiContexts,
    diagnostics: Res<DiagnosticsStore>,
) {
    if let Ok(ctx) = contexts.ctx_mut() {
        egui::Area::new(egui::Id::new("fps_counter"))
            .anchor(egui::Align2::RIGHT_TOP, egui::Vec2::new(-10.0, 10.0))
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::top_down(egui::Align::RIGHT), |ui| {
                    if let Some(fps) = diagnostics
                        .get(&FrameTimeDiagnosticsPlugin::FPS)
                        .and_then(|d| d.smoothed())
                    {
                        ui.label(egui::RichText::new(format!("{:.0}", fps))
                            .size(26.0)
                            .color(egui::Color32::WHITE));
                    }
                });
            });
    }
}
