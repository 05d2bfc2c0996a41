//! Record-count throttle: pause after every N processed records.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Throttle {
    every: usize,
    pause: Duration,
    count: usize,
    pauses: u64,
}

impl Throttle {
    /// Pauses for `pause` after every `every` records. `every == 0` disables it.
    #[must_use]
    pub fn new(every: usize, pause: Duration) -> Self {
        Self {
            every,
            pause,
            count: 0,
            pauses: 0,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Counts one record and sleeps if the threshold has been reached.
    pub async fn record(&mut self) {
        if self.every == 0 {
            return;
        }
        self.count += 1;
        if self.count >= self.every {
            self.count = 0;
            self.pauses += 1;
            tracing::info!(pause_secs = self.pause.as_secs_f64(), "throttle pause");
            tokio::time::sleep(self.pause).await;
        }
    }

    /// Number of pauses taken so far.
    #[must_use]
    pub fn pauses(&self) -> u64 {
        self.pauses
    }
}
