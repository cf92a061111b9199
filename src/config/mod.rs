//! Named filter definitions loaded from configuration files.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::filter::{FilterExpression, parse};

/// A set of named filter strings, as written in a YAML file:
///
/// ```yaml
/// filters:
///   unnamed_roads: "ways with highway = residential and !name"
///   old_benches: "nodes with amenity = bench and older today -8 years"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FiltersConfig {
    pub filters: HashMap<String, String>,
}

impl FiltersConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Parse every named filter, reporting which one failed.
    pub fn compile(&self) -> Result<HashMap<String, FilterExpression>> {
        let mut compiled = HashMap::with_capacity(self.filters.len());
        for (name, input) in &self.filters {
            let expression = parse(input)
                .map_err(|e| anyhow::anyhow!("Error parsing filter '{}': {}", name, e))?;
            compiled.insert(name.clone(), expression);
        }
        Ok(compiled)
    }

    /// Parse a single named filter.
    pub fn compile_one(&self, name: &str) -> Result<FilterExpression> {
        let input = self
            .filters
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("No filter named '{}'", name))?;
        parse(input).map_err(|e| anyhow::anyhow!("Error parsing filter '{}': {}", name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_and_compile_from_yaml() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "filters:\n  unnamed_roads: \"ways with highway and !name\"\n  signals: \"nodes with highway = traffic_signals\""
        )
        .unwrap();

        let config = FiltersConfig::load(file.path()).unwrap();
        let compiled = config.compile().unwrap();
        assert_eq!(compiled.len(), 2);
        assert!(compiled.contains_key("unnamed_roads"));
    }

    #[test]
    fn compile_reports_failing_filter_by_name() {
        let config = FiltersConfig {
            filters: HashMap::from([("bad".to_string(), "houses with x".to_string())]),
        };
        let err = config.compile().unwrap_err();
        assert!(err.to_string().contains("'bad'"));
    }
}
