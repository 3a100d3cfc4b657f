use serde::Deserialize;
use std::path::Path;

use crate::dashboard::{DashboardConverter, DEFAULT_DATASOURCE};
use crate::error::{Error, Result};
use crate::translate::{FunctionMapping, FunctionRule, QueryTranslator};

/// Optional TOML configuration for a conversion run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    dashboard: DashboardConfig,
    #[serde(default)]
    translate: TranslateConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default = "default_datasource")]
    datasource: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            datasource: default_datasource(),
        }
    }
}

fn default_datasource() -> String {
    DEFAULT_DATASOURCE.to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslateConfig {
    /// Start from an empty function table instead of the built-in one.
    #[serde(default)]
    replace_defaults: bool,
    #[serde(default, rename = "function")]
    functions: Vec<FunctionRule>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&content).map_err(|source| Error::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        // reject duplicates early so a typo doesn't silently win
        FunctionMapping::from_rules(config.translate.functions.clone())?;

        Ok(config)
    }

    pub fn datasource(&self) -> &str {
        &self.dashboard.datasource
    }

    pub fn set_datasource(&mut self, datasource: impl Into<String>) {
        self.dashboard.datasource = datasource.into();
    }

    /// The effective function table: built-in rules overridden and extended
    /// by the configured ones, or only the configured ones.
    pub fn function_mapping(&self) -> FunctionMapping {
        let mut mapping = if self.translate.replace_defaults {
            FunctionMapping::empty()
        } else {
            FunctionMapping::default()
        };

        for rule in &self.translate.functions {
            mapping.set(rule.clone());
        }

        mapping
    }

    pub fn translator(&self) -> Result<QueryTranslator> {
        QueryTranslator::new(self.function_mapping())
    }

    pub fn converter(&self) -> Result<DashboardConverter> {
        Ok(DashboardConverter::new(self.translator()?, self.datasource()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.datasource(), "Prometheus");
        assert_eq!(config.function_mapping(), FunctionMapping::default());
    }

    #[test]
    fn test_empty_file() {
        let file = write_config("");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.datasource(), "Prometheus");
        assert_eq!(config.function_mapping().len(), 12);
    }

    #[test]
    fn test_override_and_extend() {
        let file = write_config(
            r#"
[dashboard]
datasource = "prom-main"

[[translate.function]]
graphite = "sumSeries"
prometheus = "sum without"

[[translate.function]]
graphite = "scale"
"#,
        );

        let config = Config::load(file.path()).unwrap();
        let mapping = config.function_mapping();

        assert_eq!(config.datasource(), "prom-main");
        assert_eq!(mapping.len(), 13);
        assert_eq!(mapping.get("sumSeries"), Some("sum without"));
        assert_eq!(mapping.get("scale"), Some(""));
        assert_eq!(
            mapping.iter().next().map(|r| r.graphite.as_str()),
            Some("sumSeries")
        );
    }

    #[test]
    fn test_replace_defaults() {
        let file = write_config(
            r#"
[translate]
replace_defaults = true

[[translate.function]]
graphite = "asPercent"
prometheus = "100 *"
"#,
        );

        let config = Config::load(file.path()).unwrap();
        let translator = config.translator().unwrap();

        assert_eq!(translator.mapping().len(), 1);
        assert_eq!(translator.translate_functions("sumSeries(a.b)"), "sumSeries(a.b)");
        assert_eq!(translator.translate_functions("asPercent(a.b)"), "100 *(a.b)");
    }

    #[test]
    fn test_duplicate_function() {
        let file = write_config(
            r#"
[[translate.function]]
graphite = "scale"

[[translate.function]]
graphite = "scale"
prometheus = "x"
"#,
        );

        assert!(matches!(
            Config::load(file.path()),
            Err(Error::DuplicateFunction(name)) if name == "scale"
        ));
    }

    #[test]
    fn test_unknown_field() {
        let file = write_config("[dashboard]\ndatasrc = \"typo\"\n");
        assert!(matches!(Config::load(file.path()), Err(Error::Toml { .. })));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&path), Err(Error::Io { .. })));
    }

    #[test]
    fn test_set_datasource() {
        let mut config = Config::default();
        config.set_datasource("thanos");
        let converter = config.converter().unwrap();
        assert_eq!(converter.datasource(), "thanos");
    }
}
