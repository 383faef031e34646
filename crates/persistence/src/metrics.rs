//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration, labelled by query and outcome.
pub fn record_query_duration(query_name: &'static str, outcome: &'static str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name,
        "outcome" => outcome
    )
    .record(duration_secs);
}

/// Record connection pool gauges. Called from the health probes.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository call.
///
/// ```ignore
/// let timer = QueryTimer::new("find_bathroom_by_osm_id");
/// let result = sqlx::query_as::<_, BathroomEntity>(...).fetch_optional(&pool).await;
/// timer.finish(&result);
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

    /// Records a successful call.
    pub fn record(self) {
        self.observe("ok");
    }

    /// Records the call with an outcome taken from its result.
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        self.observe(outcome(result));
    }

    fn observe(self, outcome: &'static str) {
        record_query_duration(self.query_name, outcome, self.start.elapsed().as_secs_f64());
    }
}

fn outcome<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}
