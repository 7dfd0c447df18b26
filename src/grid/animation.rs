use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::item::Item;

/// Hover and selection pulse parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub base_scale: f32,
    pub hover_bonus: f32,
    pub pulse_amplitude: f32,
    /// Divisor applied to elapsed milliseconds before taking the sine.
    pub pulse_rate_ms: f64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            base_scale: 1.0,
            hover_bonus: 0.03,
            pulse_amplitude: 0.05,
            pulse_rate_ms: 200.0,
        }
    }
}

impl PulseConfig {
    /// Scale for one item at wall-clock `elapsed`. Selection overrides hover.
    pub fn scale_for(&self, item: &Item, elapsed: Duration) -> f32 {
        if item.selected {
            let phase = elapsed.as_secs_f64() * 1000.0 / self.pulse_rate_ms;
            return self.base_scale + self.pulse_amplitude * phase.sin() as f32;
        }

        let mut scale = self.base_scale;
        if item.hovered {
            scale += self.hover_bonus;
        }
        scale
    }
}
