use std::time::Duration;

use crate::request::ProgressCallback;

/// Point-in-time measurement of a transfer in flight
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Completed fraction in `0.0..=1.0`; `0.0` while the total is unknown
    pub percent: f64,
    /// Average throughput in bytes per second since the start
    pub speed: f64,
    pub bytes_transferred: u64,
    /// `None` when the server did not announce a length
    pub bytes_total: Option<u64>,
    pub elapsed: Duration,
    /// Estimate, only available once total and speed are known
    pub remaining: Option<Duration>,
}

impl ProgressSnapshot {
    /// Derive a snapshot from raw counters.
    #[must_use]
    pub fn measure(bytes_transferred: u64, bytes_total: Option<u64>, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        #[allow(clippy::cast_precision_loss)]
        let transferred = bytes_transferred as f64;
        let speed = if secs > 0.0 { transferred / secs } else { 0.0 };

        #[allow(clippy::cast_precision_loss)]
        let (percent, remaining) = match bytes_total {
            Some(0) => (1.0, Some(Duration::ZERO)),
            Some(total) => {
                let percent = (transferred / total as f64).min(1.0);
                let left = total.saturating_sub(bytes_transferred) as f64;
                let remaining = if speed > 0.0 {
                    Duration::try_from_secs_f64(left / speed).ok()
                } else {
                    None
                };
                (percent, remaining)
            }
            None => (0.0, None),
        };

        Self {
            percent,
            speed,
            bytes_transferred,
            bytes_total,
            elapsed,
            remaining,
        }
    }

    fn is_well_formed(&self) -> bool {
        let percent_ok = self.percent.is_finite() && (0.0..=1.0).contains(&self.percent);
        let total_ok = self
            .bytes_total
            .is_none_or(|total| self.bytes_transferred <= total);
        percent_ok && total_ok && self.speed.is_finite()
    }
}

/// Forwards transport progress to the caller's callback, if any.
///
/// Delivery is synchronous and in emission order. Malformed snapshots are
/// dropped; progress has no retry semantics.
#[derive(Clone, Default)]
pub struct ProgressRelay {
    callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for ProgressRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressRelay")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl ProgressRelay {
    #[must_use]
    pub fn new(callback: Option<ProgressCallback>) -> Self {
        Self { callback }
    }

    #[must_use]
    pub fn none() -> Self {
        Self { callback: None }
    }

    /// Whether anyone is listening; transports may skip measuring otherwise
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.callback.is_some()
    }

    pub fn emit(&self, snapshot: &ProgressSnapshot) {
        let Some(callback) = &self.callback else {
            return;
        };
        if !snapshot.is_well_formed() {
            tracing::trace!(percent = snapshot.percent, "dropping malformed progress snapshot");
            return;
        }
        callback(snapshot);
    }
}
