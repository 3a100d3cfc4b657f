//! Best-effort rewriting of Graphite target queries into Prometheus
//! expressions.
//!
//! Translation happens in two passes over the query text:
//!
//! 1. function calls named in the [`FunctionMapping`] are renamed, one rule
//!    at a time, with a non-greedy single level match of the argument list
//! 2. every run of `[A-Za-z0-9_.]` characters is treated as a metric path and
//!    turned into a selector with `job` and `instance` labels
//!
//! Nested function calls are not balanced and any path-shaped fragment is
//! rewritten, including numbers and leftover function names. The output is a
//! starting point for manual review, not a validated PromQL expression.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use ringlog::*;

use crate::error::Result;

mod mapping;
mod path;

pub use mapping::{FunctionMapping, FunctionRule};
pub use path::{metric_name, translate_path, LabelSet};

lazy_static! {
    static ref METRIC_PATH: Regex =
        Regex::new(r"[A-Za-z0-9_.]+").expect("metric path pattern is valid");
    static ref DEFAULT_TRANSLATOR: QueryTranslator =
        QueryTranslator::new(FunctionMapping::default())
            .expect("built-in function patterns are valid");
}

/// A compiled function rewrite rule.
#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Regex,
    replacement: String,
}

/// Translates Graphite queries using a fixed [`FunctionMapping`].
#[derive(Debug, Clone)]
pub struct QueryTranslator {
    mapping: FunctionMapping,
    rules: Vec<CompiledRule>,
}

impl QueryTranslator {
    pub fn new(mapping: FunctionMapping) -> Result<Self> {
        let rules = mapping
            .iter()
            .map(|rule| -> Result<CompiledRule> {
                let name = regex::escape(&rule.graphite);
                let pattern = Regex::new(&format!(r"{name}\((.*?)\)"))?;
                Ok(CompiledRule {
                    pattern,
                    replacement: rule.prometheus.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { mapping, rules })
    }

    pub fn mapping(&self) -> &FunctionMapping {
        &self.mapping
    }

    /// Rename mapped function calls, keeping the argument text as-is.
    pub fn translate_functions(&self, query: &str) -> String {
        let mut query = query.to_string();

        for rule in &self.rules {
            let rewritten = rule
                .pattern
                .replace_all(&query, |caps: &Captures| {
                    format!("{}({})", rule.replacement, &caps[1])
                })
                .into_owned();
            query = rewritten;
        }

        query
    }

    /// Full translation: function renaming followed by path conversion.
    pub fn translate_query(&self, query: &str) -> String {
        let functions = self.translate_functions(query);
        let translated = METRIC_PATH
            .replace_all(&functions, |caps: &Captures| translate_path(&caps[0]))
            .into_owned();

        trace!("translated query: {query} -> {translated}");
        translated
    }
}

impl Default for QueryTranslator {
    fn default() -> Self {
        DEFAULT_TRANSLATOR.clone()
    }
}

/// [`QueryTranslator::translate_functions`] with the built-in mapping.
pub fn translate_functions(query: &str) -> String {
    DEFAULT_TRANSLATOR.translate_functions(query)
}

/// [`QueryTranslator::translate_query`] with the built-in mapping.
pub fn translate_query(query: &str) -> String {
    DEFAULT_TRANSLATOR.translate_query(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_functions() {
        let cases = vec![
            ("sumSeries(foo.bar)", "sum(foo.bar)"),
            ("alias(foo.bar)", "(foo.bar)"),
            ("averageSeries(a.b.c)", "avg(a.b.c)"),
            ("divideSeries(a.b,c.d)", "/(a.b,c.d)"),
            ("groupByNode(a.b.c, 1, \"sum\")", "sum by(a.b.c, 1, \"sum\")"),
            ("nonNegativeDerivative(a.b)", "rate(a.b)"),
            ("foo.bar", "foo.bar"),
            ("", ""),
        ];

        for (query, expected) in cases {
            assert_eq!(translate_functions(query), expected, "Failed for query: {}", query);
        }
    }

    #[test]
    fn test_nested_calls_are_not_balanced() {
        // the inner call is rewritten first, then `alias(` swallows up to the
        // first closing parenthesis
        assert_eq!(
            translate_functions("alias(sumSeries(a.b), 'x')"),
            "(sum(a.b), 'x')"
        );
        assert_eq!(
            translate_functions("sumSeries(alias(a.b, 'x'))"),
            "sum((a.b, 'x'))"
        );
    }

    #[test]
    fn test_multiple_calls() {
        assert_eq!(
            translate_functions("sumSeries(a.b) sumSeries(c.d)"),
            "sum(a.b) sum(c.d)"
        );
    }

    #[test]
    fn test_translate_query() {
        assert_eq!(
            translate_query("averageSeries(a.b.c)"),
            "avg(a_b_c{job=\"b\", instance=\"c\"})"
        );
        assert_eq!(
            translate_query("stats.gauges.myapp.requests.count"),
            "stats_gauges_myapp_requests_count{job=\"gauges\", instance=\"myapp\"}"
        );
        assert_eq!(
            translate_query("divideSeries(a.b,c.d)"),
            "/(a_b{job=\"b\"},c_d{job=\"d\"})"
        );
        assert_eq!(translate_query(""), "");
    }

    #[test]
    fn test_non_path_fragments_are_rewritten() {
        assert_eq!(
            translate_query("movingAverage(a.b, 1.5)"),
            "rate(a_b{job=\"b\"}, 1_5{job=\"5\"})"
        );
    }

    #[test]
    fn test_deterministic() {
        let query = "timeShift(stats.timers.api.latency, \"1h\")";
        assert_eq!(translate_query(query), translate_query(query));
        assert_eq!(
            translate_query(query),
            "offset(stats_timers_api_latency{job=\"timers\", instance=\"api\"}, \"1h\")"
        );
    }

    #[test]
    fn test_total_over_odd_input() {
        for query in ["((((", "))", "sumSeries(", "{job=\"x\"}", "\n", "日本.語"] {
            let _ = translate_query(query);
        }
        assert_eq!(translate_query("sumSeries(a.b"), "sumSeries(a_b{job=\"b\"}");
    }

    #[test]
    fn test_custom_mapping() {
        let mut mapping = FunctionMapping::empty();
        mapping.set(FunctionRule::new("scale", "scalar"));
        let translator = QueryTranslator::new(mapping).unwrap();

        assert_eq!(translator.translate_functions("scale(a.b)"), "scalar(a.b)");
        assert_eq!(translator.translate_functions("sumSeries(a.b)"), "sumSeries(a.b)");
    }

    #[test]
    fn test_rules_rescan_previous_output() {
        let mut mapping = FunctionMapping::empty();
        mapping.set(FunctionRule::new("first", "second"));
        mapping.set(FunctionRule::new("second", "third"));
        let translator = QueryTranslator::new(mapping).unwrap();

        assert_eq!(translator.translate_functions("first(x)"), "third(x)");
    }

    #[test]
    fn test_function_names_are_escaped() {
        let mut mapping = FunctionMapping::empty();
        mapping.set(FunctionRule::new("a.b", "c"));
        let translator = QueryTranslator::new(mapping).unwrap();

        assert_eq!(translator.translate_functions("axb(x)"), "axb(x)");
        assert_eq!(translator.translate_functions("a.b(x)"), "c(x)");
    }
}
