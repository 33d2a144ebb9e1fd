/*
 * Application Module
 *
 * This module defines the main application model for the flock viewer and
 * plays the clock for the simulation: a fixed-timestep accumulator runs as
 * many ticks per frame as the configured tick interval calls for.
 *
 * - Settings are read from a JSON file given as the first argument or in
 *   FLOCK_CONFIG, falling back to the defaults
 * - UI edits are applied to the running simulation when they validate
 * - Window resizes are debounced before the grid is rebuilt
 */

use std::time::{Duration, Instant};

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{info, warn};

use crate::config::{ChangeTracker, FlockConfig};
use crate::debug::DebugInfo;
use crate::input::{key_pressed, mouse_moved, raw_window_event, resized};
use crate::renderer::view;
use crate::simulation::Simulation;
use crate::ui;
use crate::viewport::Viewport;

/// Cap on catch-up ticks in one frame, so a stall cannot snowball.
pub const MAX_TICKS_PER_FRAME: usize = 8;

// Main model for the application
pub struct Model {
    pub simulation: Simulation,
    pub params: FlockConfig,
    pub tracker: ChangeTracker,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub viewport: Viewport,
    // Fixed timestep variables
    pub tick_accumulator: Duration,
    pub last_update_time: Instant,
}

// Initialize the model
pub fn model(app: &App) -> Model {
    // 80% of the primary monitor, or a plain default without one
    let (window_width, window_height) = app
        .primary_monitor()
        .map(|monitor| {
            let size = monitor.size();
            (size.width as f32 * 0.8, size.height as f32 * 0.8)
        })
        .unwrap_or((1280.0, 800.0));

    let window_id = app
        .new_window()
        .title("Flock")
        .size(window_width as u32, window_height as u32)
        .view(view)
        .mouse_moved(mouse_moved)
        .key_pressed(key_pressed)
        .resized(resized)
        .raw_event(raw_window_event)
        .build()
        .expect("failed to open the flock window");

    let window = app.window(window_id).expect("window was just created");
    let egui = Egui::from_window(&window);

    let viewport = Viewport::from_rect(window.rect());
    let params = load_config();
    let simulation = Simulation::new(params.clone(), viewport.width as f64, viewport.height as f64)
        .expect("configuration was validated on load");

    Model {
        simulation,
        params,
        tracker: ChangeTracker::default(),
        egui,
        debug_info: DebugInfo::default(),
        viewport,
        tick_accumulator: Duration::ZERO,
        last_update_time: Instant::now(),
    }
}

fn load_config() -> FlockConfig {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FLOCK_CONFIG").ok());

    let Some(path) = path else {
        return FlockConfig::default();
    };
    match FlockConfig::load(&path) {
        Ok(config) => {
            info!(%path, "Loaded flock settings");
            config
        }
        Err(err) => {
            warn!(%path, error = %err, "Falling back to default flock settings");
            FlockConfig::default()
        }
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    let (should_reset, rebuild_needed, ui_changed) = ui::update_ui(
        &mut model.egui,
        &mut model.params,
        &mut model.tracker,
        &model.debug_info,
        model.simulation.creatures().len(),
    );

    if ui_changed {
        if rebuild_needed {
            info!(
                creatures = model.params.population_size,
                side_length = model.params.side_length,
                sight_radius = model.params.sight_radius,
                "Reshaping flock",
            );
        }
        if let Err(err) = model.simulation.apply_config(model.params.clone()) {
            warn!(error = %err, "Rejected flock settings");
            model.params = model.simulation.config().clone();
        }
    }

    if should_reset {
        model.simulation.reset();
    }

    let now = Instant::now();
    if let Some((width, height)) = model.viewport.take_settled_resize(now) {
        model.simulation.on_viewport_resize(width, height);
    }

    let frame_time = now.duration_since(model.last_update_time);
    model.last_update_time = now;

    let ticks = if model.params.pause_simulation {
        model.tick_accumulator = Duration::ZERO;
        0
    } else {
        run_due_ticks(model, frame_time)
    };

    model.debug_info.record_frame(app.fps(), update.since_last, ticks);
    model
        .debug_info
        .record_tick(model.simulation.tick_count(), model.simulation.last_tick_stats());
}

// Run every tick that fell due during the last frame.
fn run_due_ticks(model: &mut Model, frame_time: Duration) -> usize {
    let interval = model.simulation.config().tick_interval();
    model.tick_accumulator += frame_time;

    let mut ticks = 0;
    while model.tick_accumulator >= interval {
        if ticks == MAX_TICKS_PER_FRAME {
            model.tick_accumulator = Duration::ZERO;
            break;
        }
        model.simulation.tick();
        model.tick_accumulator -= interval;
        ticks += 1;
    }
    ticks
}
