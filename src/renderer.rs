/*
 * Renderer Module
 *
 * This module draws the flock. The frame is never cleared after the first
 * one: a translucent white rectangle is painted over the window instead, so
 * moving creatures leave fading trails.
 *
 * With visual debugging on, the first creature is drawn in red together with
 * its sight circle, the grid cells its neighbor query covers and the
 * neighbors that query returns.
 */

use nannou::prelude::*;

use crate::app::Model;
use crate::creature::Kinematics;
use crate::geometry::Position;

/// Angle between the nose and each wing of the arrow-head outline.
const WING_ANGLE: f64 = 2.5;

const TRAIL_FADE: f32 = 0.2;

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();

    if frame.nth() == 0 {
        draw.background().color(WHITE);
    }

    draw.rect()
        .xy(window_rect.xy())
        .wh(window_rect.wh())
        .color(rgba(1.0, 1.0, 1.0, TRAIL_FADE));

    let config = model.simulation.config();
    let debugging = config.visual_debugging;

    if debugging && !model.simulation.creatures().is_empty() {
        draw_debug_overlay(&draw, model, window_rect);
    }

    for (index, creature) in model.simulation.snapshots().enumerate() {
        let color = if debugging && index == 0 {
            rgb8(255, 0, 0)
        } else {
            let (r, g, b) = speed_color(creature.speed);
            rgb8(r, g, b)
        };

        let points = creature_outline(&creature, config.radius)
            .map(|point| model.viewport.world_to_screen(point, window_rect));
        draw.polygon().color(color).points(points);
    }

    draw.to_frame(app, &frame).unwrap();

    // Draw the egui UI
    model.egui.draw_to_frame(&frame).unwrap();
}

// Sight circle, scanned cells and found neighbors of the first creature
fn draw_debug_overlay(draw: &Draw, model: &Model, window_rect: Rect) {
    let simulation = &model.simulation;
    let config = simulation.config();
    let side = config.side_length;
    let probe = simulation.probe(0);

    for cell in &probe.scanned_cells {
        let top_left = Position::new(cell.x as f64 * side, cell.y as f64 * side);
        let center = Position::new(top_left.x + side / 2.0, top_left.y + side / 2.0);
        draw.rect()
            .xy(model.viewport.world_to_screen(center, window_rect))
            .w_h(side as f32, side as f32)
            .color(rgba(64.0 / 255.0, 0.0, 64.0 / 255.0, 0.1));
    }

    for &other in &probe.neighbors {
        if let Some(neighbor) = simulation.creature(other) {
            draw.ellipse()
                .xy(model.viewport.world_to_screen(neighbor.position, window_rect))
                .radius(config.radius as f32)
                .color(rgb8(0, 255, 0));
        }
    }

    if let Some(first) = simulation.creature(0) {
        draw.ellipse()
            .xy(model.viewport.world_to_screen(first.position, window_rect))
            .radius(config.sight_radius as f32)
            .no_fill()
            .stroke(BLUE)
            .stroke_weight(1.0);
    }
}

/// Fill color for a creature moving at `speed`; slow creatures are dark
/// purple, fast ones wash out towards pink.
pub fn speed_color(speed: f64) -> (u8, u8, u8) {
    let channel = |value: f64, max: f64| value.min(max).max(0.0).floor() as u8;
    (
        channel(speed * 80.0 + 50.0, 200.0),
        channel(speed * 40.0 - 80.0, 255.0),
        channel(speed * 60.0 + 60.0, 255.0),
    )
}

/// World-space outline of a creature: nose, left wing, body center, right
/// wing. Every point but the center lies `radius` away from the position.
pub fn creature_outline(creature: &Kinematics, radius: f64) -> [Position; 4] {
    let Kinematics {
        position, heading, ..
    } = *creature;
    let around = |angle: f64| {
        Position::new(
            position.x + angle.cos() * radius,
            position.y + angle.sin() * radius,
        )
    };
    [
        around(heading),
        around(heading + WING_ANGLE),
        position,
        around(heading - WING_ANGLE),
    ]
}
