//! Observability hooks.
//!
//! With the `metrics` feature, [`METRICS`] records statement counts, errors
//! and durations through an OpenTelemetry meter exported in Prometheus format.
//! With the `tracing` feature, [`tracing_helpers`] provides the spans opened
//! around statements, connections and transactions.

#[cfg(feature = "metrics")]
pub use self::prometheus_metrics::{RosterMetrics, METRICS};

#[cfg(feature = "metrics")]
mod prometheus_metrics {
    use once_cell::sync::Lazy;
    use opentelemetry::{
        global,
        metrics::{Counter, Histogram},
    };
    use opentelemetry_prometheus::PrometheusExporter;

    pub static METRICS: Lazy<RosterMetrics> = Lazy::new(RosterMetrics::init);

    pub struct RosterMetrics {
        pub exporter: Option<PrometheusExporter>,
        pub queries_total: Counter<u64>,
        pub query_errors_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
    }

    impl RosterMetrics {
        pub fn init() -> Self {
            let exporter = match opentelemetry_prometheus::exporter().build() {
                Ok(exporter) => Some(exporter),
                Err(e) => {
                    log::warn!("prometheus exporter unavailable: {e}");
                    None
                }
            };
            let meter = global::meter("roster");

            let queries_total = meter
                .u64_counter("roster_queries_total")
                .with_description("Total statements executed")
                .build();

            let query_errors_total = meter
                .u64_counter("roster_query_errors_total")
                .with_description("Statements that returned an error")
                .build();

            let query_duration = meter
                .f64_histogram("roster_query_duration_seconds")
                .with_description("Duration of statements")
                .build();

            Self {
                exporter,
                queries_total,
                query_errors_total,
                query_duration,
            }
        }

        pub fn record_query_duration(&self, elapsed: std::time::Duration) {
            self.queries_total.add(1, &[]);
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_query_error(&self) {
            self.query_errors_total.add(1, &[]);
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    pub fn execute_query_span(sql: &str) -> Span {
        tracing::debug_span!("roster.execute", db.system = "sqlite", db.statement = %sql)
    }

    pub fn acquire_connection_span() -> Span {
        tracing::debug_span!("roster.connect", db.system = "sqlite")
    }

    pub fn begin_transaction_span() -> Span {
        tracing::debug_span!("roster.transaction.begin")
    }

    pub fn commit_transaction_span() -> Span {
        tracing::debug_span!("roster.transaction.commit")
    }

    pub fn rollback_transaction_span() -> Span {
        tracing::debug_span!("roster.transaction.rollback")
    }
}
