use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::grid::SwapGrid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub app_name: String,
    pub window_width: u32,
    pub window_height: u32,
    pub resizable: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "Swap Grid".to_string(),
            window_width: 960,
            window_height: 640,
            resizable: true,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameTiming {
    pub elapsed: Duration,
    pub delta_seconds: f32,
    pub frame_index: u64,
}

/// Wall-clock time since the loop started.
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

/// Asks the host for one more frame callback.
pub trait FrameScheduler {
    fn request_frame(&self);
}

impl FrameScheduler for winit::window::Window {
    fn request_frame(&self) {
        self.request_redraw();
    }
}

/// Per-frame driver. Animation follows the clock, not the frame count.
#[derive(Debug)]
pub struct FrameLoop<C> {
    clock: C,
    last: Option<Duration>,
    frame_index: u64,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last: None,
            frame_index: 0,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn tick(&mut self, grid: &mut SwapGrid) -> FrameTiming {
        let elapsed = self.clock.elapsed();
        let delta = self
            .last
            .map(|last| elapsed.saturating_sub(last))
            .unwrap_or_default();
        self.last = Some(elapsed);

        grid.animate(elapsed);

        let timing = FrameTiming {
            elapsed,
            delta_seconds: delta.as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);

        tracing::trace!(
            target: "engine",
            frame = timing.frame_index,
            frame_delta_ms = %delta.as_millis(),
            "frame tick"
        );
        timing
    }

    pub fn schedule_next(&self, scheduler: &impl FrameScheduler) {
        scheduler.request_frame();
    }
}
