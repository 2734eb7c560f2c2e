//! Overdue invoice sweep background job.
//!
//! Persists `sent -> overdue` for invoices whose due date has passed. Read
//! paths compute the same condition on the fly, so the sweep only keeps the
//! stored status converged; disabling it does not change what clients see.

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{error, info};

use persistence::repositories::InvoiceRepository;

/// Periodic job that marks past-due sent invoices as overdue.
pub struct OverdueSweepJob {
    pool: PgPool,
    interval: Duration,
}

impl OverdueSweepJob {
    /// Create a new sweep job running every `minutes` minutes.
    pub fn new(pool: PgPool, minutes: u64) -> Self {
        Self {
            pool,
            interval: Duration::from_secs(minutes * 60),
        }
    }

    /// Spawn the sweep loop on the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let repo = InvoiceRepository::new(self.pool);
            let mut interval = tokio::time::interval(self.interval);

            // Skip the first immediate tick.
            interval.tick().await;

            info!(interval_secs = self.interval.as_secs(), "Overdue sweep scheduled");

            loop {
                interval.tick().await;

                match repo.sweep_overdue().await {
                    Ok(0) => {}
                    Ok(swept) => {
                        info!(swept = swept, "Marked past-due invoices overdue");
                    }
                    Err(e) => {
                        error!(error = %e, "Overdue sweep failed");
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_minutes() {
        // The job itself needs a database; only the schedule conversion is
        // unit-testable.
        let minutes = 60u64;
        assert_eq!(Duration::from_secs(minutes * 60), Duration::from_secs(3600));
    }
}
