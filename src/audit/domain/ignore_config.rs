use super::dependency::{Dependency, RiskKind};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_yaml_ng::{Mapping, Value};
use std::collections::BTreeMap;

/// Top-level key holding all technology sections in the ignore file.
pub const TECHNOLOGY_KEY: &str = "technology";

/// A persisted baseline entry: "this version of this package is known".
///
/// Overrides set to `false` hide the matching risk for exactly this version.
#[derive(Debug, Clone, PartialEq)]
pub struct IgnoreEntry {
    pub version: String,
    pub overrides: BTreeMap<String, Value>,
}

impl IgnoreEntry {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, key: impl Into<String>, value: Value) -> Self {
        self.overrides.insert(key.into(), value);
        self
    }

    /// True when this entry hides `kind` for its version.
    pub fn suppresses(&self, kind: RiskKind) -> bool {
        matches!(self.overrides.get(kind.as_str()), Some(Value::Bool(false)))
    }

    fn from_value(value: &Value) -> Option<Self> {
        let mapping = value.as_mapping()?;
        let version = scalar_to_string(mapping.get("version")?)?;
        let overrides = mapping
            .iter()
            .filter_map(|(key, value)| {
                let key = key.as_str()?;
                (key != "version").then(|| (key.to_string(), value.clone()))
            })
            .collect();
        Some(Self { version, overrides })
    }
}

impl Serialize for IgnoreEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.overrides.len() + 1))?;
        map.serialize_entry("version", &self.version)?;
        for (key, value) in &self.overrides {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parsed ignore file: technology key -> package name -> entry.
///
/// Both levels are kept sorted so the file renders deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgnoreConfig {
    technologies: BTreeMap<String, BTreeMap<String, IgnoreEntry>>,
}

/// Result of reading a raw YAML document into an [`IgnoreConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedIgnoreConfig {
    pub config: IgnoreConfig,
    /// Entries or sections discarded because they had an unexpected shape.
    pub malformed: usize,
    /// The document as read, `Null` when there was no file.
    pub document: Value,
}

impl IgnoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a raw document, dropping anything malformed instead of failing.
    pub fn from_yaml(document: &Value) -> ParsedIgnoreConfig {
        let mut parsed = ParsedIgnoreConfig {
            document: document.clone(),
            ..Default::default()
        };

        let Some(root) = document.as_mapping() else {
            if !document.is_null() {
                parsed.malformed += 1;
            }
            return parsed;
        };

        for (key, value) in root {
            if key.as_str() != Some(TECHNOLOGY_KEY) {
                parsed.malformed += 1;
                continue;
            }
            let Some(sections) = value.as_mapping() else {
                parsed.malformed += usize::from(!value.is_null());
                continue;
            };
            for (technology, packages) in sections {
                let (Some(technology), Some(packages)) = (technology.as_str(), packages.as_mapping())
                else {
                    parsed.malformed += 1;
                    continue;
                };
                for (name, raw_entry) in packages {
                    match (name.as_str(), IgnoreEntry::from_value(raw_entry)) {
                        (Some(name), Some(entry)) => parsed.config.insert(technology, name, entry),
                        _ => parsed.malformed += 1,
                    }
                }
            }
        }

        parsed
    }

    pub fn insert(&mut self, technology: &str, name: &str, entry: IgnoreEntry) {
        self.technologies
            .entry(technology.to_string())
            .or_default()
            .insert(name.to_string(), entry);
    }

    pub fn get(&self, technology: &str, name: &str) -> Option<&IgnoreEntry> {
        self.technologies.get(technology)?.get(name)
    }

    /// Entry matching the dependency's technology, name and exact version.
    pub fn entry_for(&self, dependency: &Dependency) -> Option<&IgnoreEntry> {
        self.get(dependency.technology.as_str(), &dependency.name)
            .filter(|entry| entry.version == dependency.resolved_version)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &IgnoreEntry)> {
        self.technologies.iter().flat_map(|(technology, packages)| {
            packages
                .iter()
                .map(move |(name, entry)| (technology.as_str(), name.as_str(), entry))
        })
    }

    pub fn len(&self) -> usize {
        self.technologies.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the document shape written back to disk.
    pub fn to_yaml(&self) -> Value {
        let mut sections = Mapping::new();
        for (technology, packages) in &self.technologies {
            if packages.is_empty() {
                continue;
            }
            let mut section = Mapping::new();
            for (name, entry) in packages {
                let rendered = serde_yaml_ng::to_value(entry).unwrap_or(Value::Null);
                section.insert(Value::String(name.clone()), rendered);
            }
            sections.insert(Value::String(technology.clone()), Value::Mapping(section));
        }

        let mut root = Mapping::new();
        root.insert(
            Value::String(TECHNOLOGY_KEY.to_string()),
            Value::Mapping(sections),
        );
        Value::Mapping(root)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ParsedIgnoreConfig {
        let value: Value = serde_yaml_ng::from_str(yaml).unwrap();
        IgnoreConfig::from_yaml(&value)
    }

    #[test]
    fn test_parse_well_formed_document() {
        let parsed = parse(
            r#"
technology:
  node:
    lodash:
      version: 4.17.0
      deprecated: false
  ruby:
    rails:
      version: 7.0.4
"#,
        );

        assert_eq!(parsed.malformed, 0);
        assert_eq!(parsed.config.len(), 2);
        let lodash = parsed.config.get("node", "lodash").unwrap();
        assert_eq!(lodash.version, "4.17.0");
        assert!(lodash.suppresses(RiskKind::Deprecated));
        assert!(!lodash.suppresses(RiskKind::Outdated));
    }

    #[test]
    fn test_parse_drops_malformed_entries() {
        let parsed = parse(
            r#"
technology:
  node:
    lodash: "not a mapping"
    react:
      outdated: false
    express:
      version: 4.17.3
"#,
        );

        assert_eq!(parsed.malformed, 2);
        assert_eq!(parsed.config.len(), 1);
        assert!(parsed.config.get("node", "express").is_some());
    }

    #[test]
    fn test_numeric_version_is_accepted() {
        let parsed = parse("technology:\n  ruby:\n    rake:\n      version: 13\n");
        assert_eq!(parsed.config.get("ruby", "rake").unwrap().version, "13");
    }

    #[test]
    fn test_to_yaml_orders_version_first() {
        let mut config = IgnoreConfig::new();
        config.insert(
            "node",
            "react",
            IgnoreEntry::new("17.0.2")
                .with_override("vulnerable", Value::Bool(false))
                .with_override("deprecated", Value::Bool(false)),
        );

        let rendered = serde_yaml_ng::to_string(&config.to_yaml()).unwrap();
        let version_at = rendered.find("version").unwrap();
        let deprecated_at = rendered.find("deprecated").unwrap();
        let vulnerable_at = rendered.find("vulnerable").unwrap();
        assert!(version_at < deprecated_at && deprecated_at < vulnerable_at);
    }

    #[test]
    fn test_parse_keeps_the_document_as_read() {
        let parsed = parse("technology:\n  node: {}\n");
        assert_eq!(parsed.malformed, 0);
        assert!(parsed.config.is_empty());
        assert!(parsed.document.is_mapping());
    }

    #[test]
    fn test_empty_document_is_not_malformed() {
        let parsed = IgnoreConfig::from_yaml(&Value::Null);
        assert_eq!(parsed.malformed, 0);
        assert!(parsed.config.is_empty());
    }
}
