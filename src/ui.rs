/*
 * UI Module
 *
 * This module builds the control panel with nannou_egui. Every tunable of
 * FlockConfig gets a slider or checkbox, and the panel reports whether the
 * flock should be scattered again, whether the grid has to be rebuilt and
 * whether anything changed at all.
 */

use nannou_egui::{egui, Egui};

use crate::config::{ChangeTracker, FlockConfig};
use crate::debug::DebugInfo;

// Update the UI and return (reset requested, grid rebuild needed, any change)
pub fn update_ui(
    egui: &mut Egui,
    params: &mut FlockConfig,
    tracker: &mut ChangeTracker,
    debug_info: &DebugInfo,
    creatures: usize,
) -> (bool, bool, bool) {
    let mut should_reset = false;

    tracker.take_snapshot(params);

    let ctx = egui.begin_frame();

    egui::Window::new("Flock Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Population", |ui| {
                ui.add(
                    egui::Slider::new(&mut params.population_size, FlockConfig::population_range())
                        .text("Creatures"),
                );
                ui.add(egui::Slider::new(&mut params.radius, FlockConfig::radius_range()).text("Radius"));
                ui.add(
                    egui::Slider::new(&mut params.sight_radius, FlockConfig::sight_radius_range())
                        .text("Sight Radius"),
                );
                ui.add(
                    egui::Slider::new(&mut params.view_proportion, FlockConfig::view_proportion_range())
                        .text("Field of View"),
                );

                if ui.button("Reset Flock").clicked() {
                    should_reset = true;
                }
            });

            ui.collapsing("Motion", |ui| {
                ui.add(egui::Slider::new(&mut params.min_speed, FlockConfig::speed_range()).text("Min Speed"));
                ui.add(egui::Slider::new(&mut params.max_speed, FlockConfig::speed_range()).text("Max Speed"));
                ui.add(
                    egui::Slider::new(&mut params.speed_varying_rate, FlockConfig::rate_range())
                        .text("Speed Change Rate"),
                );
                ui.add(
                    egui::Slider::new(&mut params.rotation_rate, FlockConfig::rate_range())
                        .text("Rotation Rate"),
                );
                ui.add(
                    egui::Slider::new(&mut params.repulsion_rate, FlockConfig::repulsion_range())
                        .text("Repulsion Rate"),
                );
            });

            ui.collapsing("Performance Tuning", |ui| {
                ui.checkbox(&mut params.enable_parallel, "Enable Parallel Processing");
                ui.add(
                    egui::Slider::new(&mut params.side_length, FlockConfig::side_length_range())
                        .text("Grid Cell Side"),
                );
                ui.add(
                    egui::Slider::new(&mut params.tick_interval_ms, FlockConfig::tick_interval_range())
                        .text("Tick Interval (ms)"),
                );

                ui.separator();

                for line in debug_info.lines(creatures) {
                    ui.label(line);
                }
            });

            ui.checkbox(&mut params.visual_debugging, "Show Debug Overlay");
            ui.checkbox(&mut params.pause_simulation, "Pause Simulation");
        });

    // Keep the speed sliders from crossing; validation would reject it
    if params.min_speed > params.max_speed {
        params.max_speed = params.min_speed;
    }

    let (rebuild_needed, ui_changed) = tracker.detect_changes(params);
    (should_reset, rebuild_needed, ui_changed)
}
