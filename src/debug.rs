/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct shown in the control panel.
 *
 * Includes metrics for:
 * - FPS (frames per second) and frame time
 * - Simulation ticks run per rendered frame
 * - Grid work done by the last tick (cells scanned, cell migrations)
 * - How many creatures were avoiding or flocking
 */

use std::time::Duration;

use crate::simulation::TickStats;

#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub ticks_per_frame: usize,
    pub tick_count: u64,
    pub last_tick: TickStats,
}

impl DebugInfo {
    pub fn record_frame(&mut self, fps: f32, frame_time: Duration, ticks_per_frame: usize) {
        self.fps = fps;
        self.frame_time = frame_time;
        self.ticks_per_frame = ticks_per_frame;
    }

    pub fn record_tick(&mut self, tick_count: u64, stats: TickStats) {
        self.tick_count = tick_count;
        self.last_tick = stats;
    }

    // Text lines for the control panel
    pub fn lines(&self, creatures: usize) -> Vec<String> {
        vec![
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!("Ticks this frame: {}", self.ticks_per_frame),
            format!("Tick: {}", self.tick_count),
            format!("Creatures: {}", creatures),
            format!("Cells scanned: {}", self.last_tick.cells_scanned),
            format!("Cell migrations: {}", self.last_tick.migrations),
            format!("Avoiding: {}  Flocking: {}", self.last_tick.avoiding, self.last_tick.flocking),
        ]
    }
}
