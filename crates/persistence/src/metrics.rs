//! Query timing metrics for the persistence layer.

use metrics::histogram;
use std::time::Instant;

/// Times a database query and records its duration under
/// `database_query_duration_seconds` with a `query` label.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("find_invoice_by_id");
/// let result = sqlx::query_as::<_, InvoiceEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    /// Create a new timer for the given query name.
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query_name
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_creation() {
        let timer = QueryTimer::new("test_query");
        assert_eq!(timer.query_name, "test_query");
    }
}
