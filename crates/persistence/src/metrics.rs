//! Database query timing.

use metrics::histogram;
use std::time::Instant;

/// Records how long a named query took.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("database_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Times one query and records it on [`QueryTimer::record`].
///
/// ```ignore
/// let timer = QueryTimer::new("find_submission_by_email");
/// let result = sqlx::query_as::<_, EmailSubmissionEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("list_allowed_emails");
        assert_eq!(timer.query_name, "list_allowed_emails");
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        QueryTimer::new("upsert_submission").record();
    }
}
