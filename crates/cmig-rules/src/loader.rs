//! Rule table loading and serialization
//!
//! The format is chosen by file extension: `.yaml`/`.yml`, `.json`, `.toml`.

use crate::error::{Result, RuleTableError};
use crate::table::{RuleTable, RuleTableDocument};
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuleFormat {
    #[default]
    Yaml,
    Json,
    Toml,
}

impl RuleFormat {
    pub const ALL: [RuleFormat; 3] = [Self::Yaml, Self::Json, Self::Toml];

    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    /// Format implied by a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for RuleFormat {
    type Err = RuleTableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(RuleTableError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl Display for RuleFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse and validate a table from text
pub fn parse(text: &str, format: RuleFormat) -> Result<RuleTable> {
    let doc: RuleTableDocument = match format {
        RuleFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|e| RuleTableError::syntax("yaml", e))?
        }
        RuleFormat::Json => {
            serde_json::from_str(text).map_err(|e| RuleTableError::syntax("json", e))?
        }
        RuleFormat::Toml => toml::from_str(text).map_err(|e| RuleTableError::syntax("toml", e))?,
    };
    RuleTable::try_from(doc)
}

/// Read, parse and validate a table file
pub fn load(path: impl AsRef<Path>) -> Result<RuleTable> {
    let path = path.as_ref();
    let format = RuleFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| RuleTableError::io(path, e))?;
    let table = parse(&text, format)?;
    tracing::info!(
        path = %path.display(),
        version = table.version(),
        rules = table.rules().len(),
        "rule table loaded"
    );
    Ok(table)
}

/// Serialize a table in the given format
pub fn render(table: &RuleTable, format: RuleFormat) -> Result<String> {
    let doc = table.to_document();
    let serialize = |message: String| RuleTableError::Serialize {
        format: format.as_str(),
        message,
    };
    match format {
        RuleFormat::Yaml => serde_yaml::to_string(&doc).map_err(|e| serialize(e.to_string())),
        RuleFormat::Json => {
            serde_json::to_string_pretty(&doc).map_err(|e| serialize(e.to_string()))
        }
        RuleFormat::Toml => toml::to_string(&doc).map_err(|e| serialize(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_table;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_from_extension() {
        assert_eq!(RuleFormat::from_path(Path::new("r.yml")).unwrap(), RuleFormat::Yaml);
        assert_eq!(RuleFormat::from_path(Path::new("r.JSON")).unwrap(), RuleFormat::Json);
        assert_eq!(RuleFormat::from_path(Path::new("r.toml")).unwrap(), RuleFormat::Toml);
        assert!(matches!(
            RuleFormat::from_path(Path::new("rules.ini")),
            Err(RuleTableError::UnsupportedFormat(ext)) if ext == "ini"
        ));
        assert!(RuleFormat::from_path(Path::new("rules")).is_err());
    }

    #[test]
    fn default_table_survives_every_format() {
        let table = default_table();
        for format in RuleFormat::ALL {
            let text = render(&table, format).unwrap();
            let parsed = parse(&text, format).unwrap();
            assert_eq!(&parsed, table.as_ref(), "format {format}");
        }
    }

    #[test]
    fn minimal_yaml() {
        let text = r"
version: '1'
rules:
  - match: Generic
    target_shape: [Service]
";
        let table = parse(text, RuleFormat::Yaml).unwrap();
        assert_eq!(table.version(), "1");
        assert!(table.field_rules().is_empty());
    }

    #[test]
    fn syntax_errors_name_the_format() {
        let err = parse("{ not json", RuleFormat::Json).unwrap_err();
        assert!(err.to_string().starts_with("json syntax error"));
    }

    #[test]
    fn validation_runs_after_parse() {
        let text = r#"{"version": "1", "rules": [{"match": "RequestHandler", "target_shape": ["Service"]}]}"#;
        assert!(matches!(
            parse(text, RuleFormat::Json),
            Err(RuleTableError::MissingGeneric)
        ));
    }
}
