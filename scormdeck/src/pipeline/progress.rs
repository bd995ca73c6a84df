//! Monotonic progress reporting for download-then-extract runs.
//!
//! Download contributes the first half of the percentage range and
//! extraction the second half. The tracker clamps every report so the
//! observed sequence is non-decreasing and ends at exactly 100 on
//! success; a failed run simply stops increasing.

/// Progress callback receiving an integer percentage in `[0, 100]`.
///
/// Invoked synchronously per downloaded chunk and per extracted entry;
/// implementations must not block.
pub type ProgressCallback = Box<dyn Fn(u8) + Send + Sync>;

/// Aggregates both pipeline halves into one monotonic percentage.
pub struct ProgressTracker {
    callback: Option<ProgressCallback>,
    last: u8,
}

impl ProgressTracker {
    /// Create a tracker, optionally forwarding to a callback.
    pub fn new(callback: Option<ProgressCallback>) -> Self {
        Self { callback, last: 0 }
    }

    /// Report download progress.
    ///
    /// With an unknown or zero declared length the download half is
    /// skipped entirely and reporting degrades to the extraction half.
    pub fn download_progress(&mut self, received: u64, declared: Option<u64>) {
        let Some(declared) = declared.filter(|d| *d > 0) else {
            return;
        };
        let percent = ((received as f64 / declared as f64) * 50.0).round() as u8;
        self.report(percent.min(50));
    }

    /// Report extraction progress (`extracted` of `total` entries done).
    pub fn extraction_progress(&mut self, extracted: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = 50 + ((extracted as f64 / total as f64) * 50.0).round() as u32;
        self.report(percent.min(100) as u8);
    }

    /// Report completion of the whole run.
    pub fn complete(&mut self) {
        self.report(100);
    }

    /// Last percentage reported.
    pub fn last(&self) -> u8 {
        self.last
    }

    fn report(&mut self, percent: u8) {
        if percent < self.last {
            // Monotonic: never report a regression.
            return;
        }
        self.last = percent;
        if let Some(callback) = &self.callback {
            callback(percent);
        }
    }
}
