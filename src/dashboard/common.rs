use serde_json::Value;

/// Graphite query field on a panel target.
pub const LEGACY_QUERY_FIELD: &str = "target";
/// Prometheus expression field on a panel target.
pub const EXPR_FIELD: &str = "expr";
pub const PANELS_FIELD: &str = "panels";
pub const TARGETS_FIELD: &str = "targets";
pub const DATASOURCE_FIELD: &str = "datasource";

pub const DEFAULT_DATASOURCE: &str = "Prometheus";

/// Counts for a single dashboard conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub panels: usize,
    pub translated: usize,
    pub skipped: usize,
    pub datasources: usize,
}

/// A converted dashboard together with what happened to it.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub dashboard: Value,
    pub report: ConversionReport,
}

/// Identify a panel for log messages, preferring its `id`, then its `title`.
pub fn panel_label(index: usize, panel: &Value) -> String {
    if let Some(id) = panel.get("id").filter(|id| !id.is_null()) {
        format!("panel {index} (id {id})")
    } else if let Some(title) = panel.get("title").and_then(Value::as_str) {
        format!("panel {index} ({title:?})")
    } else {
        format!("panel {index}")
    }
}
