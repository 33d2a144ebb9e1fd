/*
 * Viewport Module
 *
 * The window is the world: one world unit per point, origin at the window's
 * top-left corner, y growing downwards. This module converts between that
 * space and nannou's centered, y-up screen space, and debounces window
 * resizes so the grid is only rebuilt once the user stops dragging.
 */

use std::time::{Duration, Instant};

use nannou::prelude::*;

use crate::geometry::Position;

/// How long the window size must stay put before the grid is rebuilt.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pending_resize: Option<(Vec2, Instant)>,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pending_resize: None,
        }
    }

    pub fn from_rect(window_rect: Rect) -> Self {
        Self::new(window_rect.w(), window_rect.h())
    }

    // Convert a world position to window coordinates
    #[inline]
    pub fn world_to_screen(&self, position: Position, window_rect: Rect) -> Vec2 {
        vec2(
            window_rect.left() + position.x as f32,
            window_rect.top() - position.y as f32,
        )
    }

    // Convert window coordinates (e.g. the mouse) to a world position
    #[inline]
    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Position {
        Position::new(
            (point.x - window_rect.left()) as f64,
            (window_rect.top() - point.y) as f64,
        )
    }

    /// Remember a new window size; it takes effect once it has settled.
    pub fn request_resize(&mut self, size: Vec2, now: Instant) {
        self.pending_resize = Some((size, now));
    }

    /// The new world size, once a requested resize has been quiet for
    /// `RESIZE_DEBOUNCE`.
    pub fn take_settled_resize(&mut self, now: Instant) -> Option<(f64, f64)> {
        let (size, requested_at) = self.pending_resize?;
        if now.duration_since(requested_at) < RESIZE_DEBOUNCE {
            return None;
        }
        self.pending_resize = None;
        self.width = size.x;
        self.height = size.y;
        Some((size.x as f64, size.y as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Rect {
        Rect::from_w_h(800.0, 600.0)
    }

    #[test]
    fn world_and_screen_round_trip_corners() {
        let viewport = Viewport::from_rect(window());
        assert_eq!(viewport.world_to_screen(Position::new(0.0, 0.0), window()), vec2(-400.0, 300.0));
        assert_eq!(viewport.world_to_screen(Position::new(800.0, 600.0), window()), vec2(400.0, -300.0));
        assert_eq!(viewport.screen_to_world(vec2(0.0, 0.0), window()), Position::new(400.0, 300.0));
    }

    #[test]
    fn resize_waits_for_the_window_to_settle() {
        let mut viewport = Viewport::new(800.0, 600.0);
        let start = Instant::now();
        viewport.request_resize(vec2(700.0, 500.0), start);
        viewport.request_resize(vec2(640.0, 480.0), start + Duration::from_millis(300));

        assert_eq!(viewport.take_settled_resize(start + Duration::from_millis(900)), None);
        assert_eq!(
            viewport.take_settled_resize(start + Duration::from_millis(1300)),
            Some((640.0, 480.0))
        );
        assert_eq!((viewport.width, viewport.height), (640.0, 480.0));
        assert_eq!(viewport.take_settled_resize(start + Duration::from_secs(5)), None);
    }
}
