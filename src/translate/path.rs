use std::fmt;

/// Labels derived from the position of segments in a metric path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet(Vec<(&'static str, String)>);

impl LabelSet {
    /// `job` comes from segment 1 and `instance` from segment 2. Segment 0 is
    /// the namespace and is not represented.
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<&str> = path.split('.').collect();
        let mut labels = Vec::with_capacity(2);

        if let Some(job) = segments.get(1) {
            labels.push(("job", job.to_string()));
        }
        if let Some(instance) = segments.get(2) {
            labels.push(("instance", instance.to_string()));
        }

        Self(labels)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(label, _)| *label == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}=\"{value}\"")?;
        }
        write!(f, "}}")
    }
}

/// Flatten a path into a metric identifier by replacing anything outside
/// `[A-Za-z0-9_]` with `_`.
pub fn metric_name(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Convert a dotted Graphite metric path into a Prometheus selector.
pub fn translate_path(path: &str) -> String {
    let name = metric_name(path);
    let labels = LabelSet::from_path(path);

    if labels.is_empty() {
        name
    } else {
        format!("{name}{labels}")
    }
}
