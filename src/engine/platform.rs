use std::time::{Duration, Instant};

use winit::dpi::PhysicalSize;

use super::core::Clock;
use crate::grid::input::Viewport;

#[derive(Debug)]
pub struct PlatformLayer {
    boot_timestamp: Instant,
}

impl PlatformLayer {
    pub fn new() -> Self {
        Self {
            boot_timestamp: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.boot_timestamp.elapsed()
    }

    pub fn viewport(size: PhysicalSize<u32>) -> Viewport {
        Viewport::from_size(size.width, size.height)
    }
}

impl Default for PlatformLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for PlatformLayer {
    fn elapsed(&self) -> Duration {
        self.uptime()
    }
}
