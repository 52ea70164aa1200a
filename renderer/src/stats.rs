use std::time::Duration;

use tracing::info;

const SKIP_FRAMES: usize = 10;

/// Collects durations of a repeated operation and logs a summary when dropped.
///
/// The first frames are skipped, they are usually dominated by warm-up costs.
#[derive(Debug)]
pub struct MeasureSeries {
    name: &'static str,
    stats: Stats,
    frame: usize,
}

impl MeasureSeries {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            stats: Stats::default(),
            frame: 0,
        }
    }

    pub fn add_sample(&mut self, duration: Duration) {
        self.frame += 1;
        if self.frame <= SKIP_FRAMES {
            return;
        }

        self.stats.min = if self.stats.count == 0 {
            duration
        } else {
            self.stats.min.min(duration)
        };
        self.stats.max = self.stats.max.max(duration);
        self.stats.sum += duration;
        self.stats.count += 1;
    }
}

impl Drop for MeasureSeries {
    fn drop(&mut self) {
        let Some(mean) = self.stats.mean() else {
            return;
        };

        info!(
            "{}: mean: {mean:?} ({:?}-{:?}, {} samples, {} skipped)",
            self.name, self.stats.min, self.stats.max, self.stats.count, SKIP_FRAMES
        )
    }
}

#[derive(Debug, Default)]
struct Stats {
    min: Duration,
    sum: Duration,
    max: Duration,
    count: usize,
}

impl Stats {
    fn mean(&self) -> Option<Duration> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as u32)
    }
}
