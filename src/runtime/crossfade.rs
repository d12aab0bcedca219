//! Zoom history and cross-fade parameters for pattern/dash properties.

use std::time::Duration;

pub const DEFAULT_FADE_DURATION: Duration = Duration::from_millis(300);

/// Tracks the last integer zoom level crossed and when it was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoomHistory {
    pub last_zoom: f64,
    pub last_floor_zoom: f64,
    pub last_integer_zoom: f64,
    pub last_integer_zoom_time: Duration,
    first: bool,
}

impl ZoomHistory {
    pub fn new() -> Self {
        Self {
            first: true,
            ..Self::default()
        }
    }

    /// Record zoom `z` at time `now`. Returns whether the zoom changed.
    pub fn update(&mut self, z: f64, now: Duration) -> bool {
        let floor_z = z.floor();

        if self.first {
            self.first = false;
            self.last_integer_zoom = floor_z;
            self.last_integer_zoom_time = Duration::ZERO;
            self.last_zoom = z;
            self.last_floor_zoom = floor_z;
            return true;
        }

        if self.last_floor_zoom < floor_z {
            self.last_integer_zoom = floor_z;
            self.last_integer_zoom_time = now;
        } else if self.last_floor_zoom > floor_z {
            self.last_integer_zoom = floor_z + 1.0;
            self.last_integer_zoom_time = now;
        }

        if (z - self.last_zoom).abs() > 0.0001 {
            self.last_zoom = z;
            self.last_floor_zoom = floor_z;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeParameters {
    pub from_scale: f32,
    pub to_scale: f32,
    pub t: f32,
}

impl CrossfadeParameters {
    /// Fade state at zoom `z`, `now`, given the zoom history.
    pub fn new(z: f64, now: Duration, history: &ZoomHistory, fade_duration: Duration) -> Self {
        let fraction = z - z.floor();
        let elapsed = now.saturating_sub(history.last_integer_zoom_time);
        let t = if fade_duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / fade_duration.as_secs_f64()).min(1.0)
        };

        if z > history.last_integer_zoom {
            Self {
                from_scale: 2.0,
                to_scale: 1.0,
                t: (fraction + (1.0 - fraction) * t) as f32,
            }
        } else {
            Self {
                from_scale: 0.5,
                to_scale: 1.0,
                t: (1.0 - (1.0 - t) * fraction) as f32,
            }
        }
    }
}
