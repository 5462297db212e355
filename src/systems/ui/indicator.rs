use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

// short-lived toast naming what a hotkey just did
#[derive(Resource)]
pub struct Indicator {
    pub message: IndicatorMessage,
    pub timer: f32,
    pub duration: f32,
}

impl Default for Indicator {
    fn default() -> Self {
        Self {
            message: IndicatorMessage::Regenerated(0),
            timer: 0.0,
            duration: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IndicatorMessage {
    Overlay(bool),
    Regenerated(u64),
}

impl IndicatorMessage {
    fn key(&self) -> &'static str {
        match self {
            IndicatorMessage::Overlay(_) => "G",
            IndicatorMessage::Regenerated(_) => "E",
        }
    }

    fn text(&self) -> String {
        match self {
            IndicatorMessage::Overlay(true) => "OVERLAY ON".to_string(),
            IndicatorMessage::Overlay(false) => "OVERLAY OFF".to_string(),
            IndicatorMessage::Regenerated(seed) => format!("SEED {seed}"),
        }
    }

    fn color(&self) -> egui::Color32 {
        match self {
            IndicatorMessage::Overlay(true) => egui::Color32::from_rgb(180, 60, 60),
            IndicatorMessage::Overlay(false) => egui::Color32::from_rgb(70, 70, 78),
            IndicatorMessage::Regenerated(_) => egui::Color32::from_rgb(45, 72, 116),
        }
    }
}

#[derive(Event)]
pub struct IndicatorEvent(pub IndicatorMessage);

pub fn update_indicator(
    mut indicator: ResMut<Indicator>,
    mut events: EventReader<IndicatorEvent>,
    time: Res<Time>,
) {
    for event in events.read() {
        indicator.message = event.0;
        indicator.timer = indicator.duration;
    }

    if indicator.timer > 0.0 {
        indicator.timer = (indicator.timer - time.delta_secs()).max(0.0);
    }
}

pub fn render_indicator(
    indicator: Res<Indicator>,
    mut contexts: EguiContexts,
) {
    if indicator.timer <= 0.0 {
        return;
    }

    if let Ok(ctx) = contexts.ctx_mut() {
        const KEY_DURATION: f32 = 0.7;

        // key fades out first, then the label
        let main_alpha = (indicator.timer / indicator.duration).clamp(0.0, 1.0);
        let key_alpha = ((indicator.timer - (indicator.duration - KEY_DURATION)) / KEY_DURATION).clamp(0.0, 1.0);

        let bg_color = indicator.message.color();
        let grey_color = egui::Color32::from_rgb(40, 44, 52);

        egui::Area::new(egui::Id::new("hotkey_indicator"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 60.0))
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    let key_frame = egui::Frame::new()
                        .fill(egui::Color32::from_rgba_unmultiplied(
                            grey_color.r(), grey_color.g(), grey_color.b(),
                            (200.0 * key_alpha) as u8,
                        ))
                        .stroke(egui::Stroke::new(
                            1.0,
                            egui::Color32::from_rgba_unmultiplied(255, 255, 255, (120.0 * key_alpha) as u8),
                        ))
                        .inner_margin(egui::Margin::symmetric(8, 4))
                        .corner_radius(egui::CornerRadius::same(4));

                    key_frame.show(ui, |ui| {
                        ui.label(egui::RichText::new(indicator.message.key())
                            .size(16.0)
                            .color(egui::Color32::from_rgba_unmultiplied(255, 255, 255, (255.0 * key_alpha) as u8))
                            .strong());
                    });

                    let frame = egui::Frame::new()
                        .fill(egui::Color32::from_rgba_unmultiplied(
                            bg_color.r(), bg_color.g(), bg_color.b(),
                            (220.0 * main_alpha) as u8,
                        ))
                        .inner_margin(egui::Margin::symmetric(12, 6))
                        .corner_radius(egui::CornerRadius::same(4));

                    frame.show(ui, |ui| {
                        ui.label(egui::RichText::new(indicator.message.text())
                            .size(16.0)
                            .color(egui::Color32::from_rgba_unmultiplied(255, 255, 255, (255.0 * main_alpha) as u8))
                            .strong());
                    });
                });
            });
    }
}
