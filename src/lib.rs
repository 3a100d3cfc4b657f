//! Migrate Grafana dashboards from a Graphite datasource to Prometheus.
//!
//! [`translate`] rewrites individual Graphite target queries into
//! approximate Prometheus expressions, and [`dashboard`] applies that to
//! every panel target of a dashboard document while repointing panel
//! datasources.
//!
//! ```
//! use graphite2prom::translate::translate_query;
//!
//! assert_eq!(
//!     translate_query("sumSeries(stats.gauges.myapp)"),
//!     "sum(stats_gauges_myapp{job=\"gauges\", instance=\"myapp\"})"
//! );
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod translate;

pub use config::Config;
pub use dashboard::{Conversion, ConversionReport, DashboardConverter};
pub use error::{Error, Result};
pub use translate::{FunctionMapping, FunctionRule, QueryTranslator};
