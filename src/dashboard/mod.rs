//! Conversion of whole Grafana dashboards from Graphite targets to
//! Prometheus expressions.

use ringlog::*;
use serde_json::Value;

use crate::error::{json_kind, Error};
use crate::translate::QueryTranslator;

mod common;

pub use self::common::{
    panel_label, Conversion, ConversionReport, DATASOURCE_FIELD, DEFAULT_DATASOURCE, EXPR_FIELD,
    LEGACY_QUERY_FIELD, PANELS_FIELD, TARGETS_FIELD,
};

/// Rewrites panel targets and datasources of a dashboard document.
#[derive(Debug, Clone)]
pub struct DashboardConverter {
    translator: QueryTranslator,
    datasource: String,
}

impl Default for DashboardConverter {
    fn default() -> Self {
        Self::new(QueryTranslator::default(), DEFAULT_DATASOURCE)
    }
}

impl DashboardConverter {
    pub fn new(translator: QueryTranslator, datasource: impl Into<String>) -> Self {
        Self {
            translator,
            datasource: datasource.into(),
        }
    }

    pub fn datasource(&self) -> &str {
        &self.datasource
    }

    /// Convert a dashboard, returning only the new document.
    pub fn convert(&self, dashboard: &Value) -> Value {
        self.convert_with_report(dashboard).dashboard
    }

    /// Convert a dashboard into a new document. The input is left untouched.
    ///
    /// Targets whose query cannot be translated are logged and kept as they
    /// were; this never fails as a whole.
    pub fn convert_with_report(&self, dashboard: &Value) -> Conversion {
        let mut dashboard = dashboard.clone();
        let mut report = ConversionReport::default();

        let Some(panels) = dashboard.get_mut(PANELS_FIELD).and_then(Value::as_array_mut) else {
            debug!("dashboard has no panels");
            return Conversion { dashboard, report };
        };

        report.panels = panels.len();

        for (index, panel) in panels.iter_mut().enumerate() {
            self.convert_targets(index, panel, &mut report);
        }

        // datasources are only repointed once every target has been handled
        for panel in panels.iter_mut() {
            if let Some(datasource) = panel.get_mut(DATASOURCE_FIELD) {
                *datasource = Value::String(self.datasource.clone());
                report.datasources += 1;
            }
        }

        Conversion { dashboard, report }
    }

    fn convert_targets(&self, index: usize, panel: &mut Value, report: &mut ConversionReport) {
        let label = panel_label(index, panel);

        let Some(targets) = panel.get_mut(TARGETS_FIELD).and_then(Value::as_array_mut) else {
            return;
        };

        for target in targets.iter_mut().filter_map(Value::as_object_mut) {
            let Some(query) = target.get(LEGACY_QUERY_FIELD) else {
                continue;
            };

            match self.translate_target(query) {
                Ok(expr) => {
                    debug!("{label}: {query} -> {expr}");
                    target.shift_remove(LEGACY_QUERY_FIELD);
                    target.insert(EXPR_FIELD.to_string(), Value::String(expr));
                    report.translated += 1;
                }
                Err(e) => {
                    error!("{label}: error converting query {query}: {e}");
                    report.skipped += 1;
                }
            }
        }
    }

    fn translate_target(&self, query: &Value) -> Result<String, Error> {
        match query {
            Value::String(query) => Ok(self.translator.translate_query(query)),
            other => Err(Error::QueryNotString {
                kind: json_kind(other),
            }),
        }
    }
}

/// [`DashboardConverter::convert`] with the built-in mapping and datasource.
pub fn convert(dashboard: &Value) -> Value {
    DashboardConverter::default().convert(dashboard)
}
