/*
 * Input Module
 *
 * This module handles window events for the flock viewer: the mouse is the
 * pointer the creatures flee from, window resizes are queued on the
 * viewport, and a few keys toggle simulation settings.
 *
 * Keys:
 * - Space: pause / resume
 * - D: toggle the debug overlay
 * - R: scatter the flock again
 */

use std::time::Instant;

use nannou::prelude::*;
use tracing::warn;

use crate::app::Model;

// Mouse moved event handler
pub fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    let world = model.viewport.screen_to_world(pos, app.window_rect());
    model.simulation.set_pointer(world.x, world.y);
}

// Window resized event handler; the grid is rebuilt once the size settles
pub fn resized(_app: &App, model: &mut Model, size: Vec2) {
    model.viewport.request_resize(size, Instant::now());
}

pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    match key {
        Key::Space => model.params.pause_simulation = !model.params.pause_simulation,
        Key::D => model.params.visual_debugging = !model.params.visual_debugging,
        Key::R => model.simulation.reset(),
        _ => return,
    }
    if let Err(err) = model.simulation.apply_config(model.params.clone()) {
        warn!(error = %err, "Rejected flock settings");
        model.params = model.simulation.config().clone();
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
