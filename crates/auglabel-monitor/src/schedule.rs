//! Which epochs run the kNN monitor.

use auglabel_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Runs on epochs 1, 1 + interval, 1 + 2·interval, …
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSchedule {
    interval: usize,
}

impl MonitorSchedule {
    pub fn new(interval: usize) -> Result<Self> {
        if interval == 0 {
            return Err(AugError::invalid_config(
                "interval",
                "0",
                "must be at least 1",
            ));
        }
        Ok(Self { interval })
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Whether 1-based `epoch` is a monitoring epoch.
    pub fn should_run(&self, epoch: usize) -> bool {
        epoch >= 1 && (epoch - 1) % self.interval == 0
    }

    /// Monitoring epochs within `1..=epochs`.
    pub fn epochs(&self, epochs: usize) -> impl Iterator<Item = usize> {
        (1..=epochs).step_by(self.interval)
    }
}

impl Default for MonitorSchedule {
    fn default() -> Self {
        Self { interval: 1 }
    }
}
