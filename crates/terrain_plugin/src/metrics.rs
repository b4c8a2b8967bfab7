//! Frame statistics for the terrain layer.
//!
//! Collection is compiled in with the `metrics` feature and can be switched
//! off at runtime through [`COLLECT_METRICS`]. Without the feature every
//! `record_*` call returns immediately.
//!
//! ```ignore
//! use std::sync::atomic::Ordering;
//! use terrain_plugin::metrics::COLLECT_METRICS;
//!
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//! let avg = layer.metrics().avg_frame_us();
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::renderer::FrameStats;

/// Runtime switch, only consulted when the `metrics` feature is enabled.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Fixed-capacity history, oldest value evicted first.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  pub fn push(&mut self, value: T) {
    if self.capacity == 0 {
      return;
    }
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  /// Oldest to newest.
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

impl RollingWindow<u64> {
  pub fn sum(&self) -> u64 {
    self.buffer.iter().sum()
  }

  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      return 0.0;
    }
    self.sum() as f64 / self.buffer.len() as f64
  }

  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = self.buffer.iter().min()?;
    let max = self.buffer.iter().max()?;
    Some((*min, *max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    // ~2 s at 60 fps
    Self::new(128)
  }
}

/// Per-layer counters and timing history.
#[derive(Debug, Clone, Default)]
pub struct TerrainMetrics {
  /// Whole `render_frame` duration, microseconds.
  pub frame_timings: RollingWindow<u64>,
  /// Cache update duration, microseconds.
  pub update_timings: RollingWindow<u64>,

  /// Last frame snapshot.
  pub last_frame: FrameStats,
  pub last_frame_us: u64,

  // Cumulative
  pub total_frames: u64,
  pub total_draw_calls: u64,
  pub total_dem_uploads: u64,
  pub total_skipped: u64,
  pub total_released: u64,
  /// Frames whose pass was aborted by a GPU error.
  pub failed_frames: u64,
}

impl TerrainMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear history and snapshot; cumulative totals are kept.
  pub fn reset(&mut self) {
    self.frame_timings.clear();
    self.update_timings.clear();
    self.last_frame = FrameStats::default();
    self.last_frame_us = 0;
  }

  pub fn record_update_timing(&mut self, timing_us: u64) {
    if is_enabled() {
      self.update_timings.push(timing_us);
    }
  }

  pub fn record_frame(&mut self, stats: &FrameStats, timing_us: u64) {
    if !is_enabled() {
      return;
    }
    self.frame_timings.push(timing_us);
    self.last_frame = *stats;
    self.last_frame_us = timing_us;
    self.total_frames += 1;
    self.total_draw_calls += stats.draw_calls as u64;
    self.total_dem_uploads += stats.dem_uploads as u64;
    self.total_skipped += stats.skipped as u64;
    self.total_released += stats.released as u64;
  }

  pub fn record_failed_frame(&mut self) {
    if is_enabled() {
      self.failed_frames += 1;
    }
  }

  pub fn avg_frame_us(&self) -> f64 {
    self.frame_timings.average()
  }

  pub fn avg_update_us(&self) -> f64 {
    self.update_timings.average()
  }
}

#[cfg(all(test, feature = "metrics"))]
#[path = "metrics_test.rs"]
mod metrics_test;
