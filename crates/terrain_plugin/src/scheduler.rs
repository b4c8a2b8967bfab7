//! Frame update cycle for the two tile caches.
//!
//! Both caches stay paused between frames so that the host's own update pass
//! cannot change the visible set behind the layer's back. Once per frame the
//! layer resumes them, updates them against a camera whose height is raised
//! by the pitch compensation, and pauses them again.
//!
//! ```text
//!            camera
//!              ●
//!             /│
//!   distance / │ distance·sin(pitch)
//!           /  │
//!  center  ●───┘
//! ```
//!
//! Tilted views see further toward the horizon than the host's own height
//! estimate suggests; raising the height makes the caches request tiles for
//! that farther extent.

use std::f64::consts::FRAC_PI_2;

use tracing::{debug, warn};

use crate::constants::DEFAULT_MAX_PITCH;
use crate::source::{TileCache, ViewTransform};

#[derive(Clone, Copy, Debug)]
pub struct UpdateScheduler {
  max_pitch: f64,
}

impl Default for UpdateScheduler {
  fn default() -> Self {
    Self::new(DEFAULT_MAX_PITCH)
  }
}

impl UpdateScheduler {
  /// `max_pitch` (radians) is clamped to `[0, π/2]`; non-finite values fall
  /// back to the default.
  pub fn new(max_pitch: f64) -> Self {
    let max_pitch = if max_pitch.is_finite() {
      max_pitch.clamp(0.0, FRAC_PI_2)
    } else {
      DEFAULT_MAX_PITCH
    };
    Self { max_pitch }
  }

  pub fn max_pitch(&self) -> f64 {
    self.max_pitch
  }

  /// Height added to the camera for cache updates:
  /// `camera_to_center_distance · sin(pitch)`.
  pub fn pitch_offset<T: ViewTransform>(&self, camera: &T) -> f64 {
    let pitch = camera.pitch();
    let distance = camera.camera_to_center_distance();
    if !pitch.is_finite() || !distance.is_finite() {
      warn!(pitch, distance, "non-finite camera transform, no pitch compensation");
      return 0.0;
    }
    let clamped = pitch.clamp(0.0, self.max_pitch);
    if clamped != pitch {
      debug!(pitch, clamped, "camera pitch clamped");
    }
    distance * clamped.sin()
  }

  /// Run one update of both caches and return the adjusted camera clone.
  ///
  /// `camera` is never modified. Both caches are paused on return whatever
  /// their state on entry.
  #[tracing::instrument(skip_all, name = "terrain::advance")]
  pub fn advance<T, R, D>(&self, camera: &T, raster: &mut R, dem: &mut D) -> T
  where
    T: ViewTransform,
    R: TileCache,
    D: TileCache,
  {
    let mut adjusted = camera.clone();
    adjusted.set_height(camera.height() + self.pitch_offset(camera));

    raster.resume();
    dem.resume();

    raster.set_used(true);
    dem.set_used(true);

    raster.update(&adjusted);
    dem.update(&adjusted);

    raster.pause();
    dem.pause();

    adjusted
  }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
