use crate::error::{Error, Result};
use serde::Deserialize;

/// A single Graphite function rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionRule {
    pub graphite: String,
    /// May be empty, in which case only the parenthesized arguments remain.
    #[serde(default)]
    pub prometheus: String,
}

impl FunctionRule {
    pub fn new(graphite: impl Into<String>, prometheus: impl Into<String>) -> Self {
        Self {
            graphite: graphite.into(),
            prometheus: prometheus.into(),
        }
    }
}

/// Ordered Graphite to Prometheus function table.
///
/// Rules are applied in insertion order and each rule rescans the output of
/// the previous one, so order matters when a replacement contains another
/// rule's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMapping(Vec<FunctionRule>);

impl Default for FunctionMapping {
    fn default() -> Self {
        Self(
            DEFAULT_RULES
                .iter()
                .map(|(graphite, prometheus)| FunctionRule::new(*graphite, *prometheus))
                .collect(),
        )
    }
}

const DEFAULT_RULES: &[(&str, &str)] = &[
    ("sumSeries", "sum"),
    ("averageSeries", "avg"),
    ("maxSeries", "max"),
    ("minSeries", "min"),
    ("divideSeries", "/"),
    ("movingAverage", "rate"),
    ("timeShift", "offset"),
    // no direct equivalent, the arguments are kept bare
    ("alias", ""),
    ("groupByNode", "sum by"),
    ("derivative", "rate"),
    ("integral", "increase"),
    ("nonNegativeDerivative", "rate"),
];

impl FunctionMapping {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a mapping from rules, rejecting repeated Graphite names.
    pub fn from_rules(rules: Vec<FunctionRule>) -> Result<Self> {
        let mut mapping = Self::empty();
        for rule in rules {
            if mapping.get(&rule.graphite).is_some() {
                return Err(Error::DuplicateFunction(rule.graphite));
            }
            mapping.0.push(rule);
        }
        Ok(mapping)
    }

    /// Replace the target of an existing rule in place, or append a new one.
    pub fn set(&mut self, rule: FunctionRule) {
        match self.0.iter_mut().find(|r| r.graphite == rule.graphite) {
            Some(existing) => existing.prometheus = rule.prometheus,
            None => self.0.push(rule),
        }
    }

    pub fn get(&self, graphite: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|r| r.graphite == graphite)
            .map(|r| r.prometheus.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let mapping = FunctionMapping::default();
        let names: Vec<&str> = mapping.iter().map(|r| r.graphite.as_str()).collect();
        assert_eq!(names.first(), Some(&"sumSeries"));
        assert_eq!(names.last(), Some(&"nonNegativeDerivative"));
        assert_eq!(mapping.len(), 12);
        assert_eq!(mapping.get("alias"), Some(""));
        assert_eq!(mapping.get("groupByNode"), Some("sum by"));
    }

    #[test]
    fn test_set_keeps_position() {
        let mut mapping = FunctionMapping::default();
        mapping.set(FunctionRule::new("sumSeries", "sum without"));
        mapping.set(FunctionRule::new("scale", ""));

        let first = mapping.iter().next().unwrap();
        assert_eq!(first, &FunctionRule::new("sumSeries", "sum without"));
        let last = mapping.iter().last().unwrap();
        assert_eq!(last, &FunctionRule::new("scale", ""));
        assert_eq!(mapping.len(), 13);
    }

    #[test]
    fn test_from_rules_rejects_duplicates() {
        let rules = vec![
            FunctionRule::new("sumSeries", "sum"),
            FunctionRule::new("sumSeries", "avg"),
        ];
        match FunctionMapping::from_rules(rules) {
            Err(Error::DuplicateFunction(name)) => assert_eq!(name, "sumSeries"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
