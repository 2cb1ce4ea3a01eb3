use std::collections::BTreeMap;
use std::path::Path;

use idshield_core::{ExemptionCodeList, ExemptionCodeLookup};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ExemptionError, Result};

/// One code within a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionCode {
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
}

/// A category definition file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionCategory {
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub codes: Vec<ExemptionCode>,
}

impl ExemptionCategory {
    pub fn code(&self, name: &str) -> Option<&ExemptionCode> {
        self.codes.iter().find(|c| c.name == name)
    }
}

/// Master list of exemption categories keyed by name
#[derive(Debug, Clone, Default)]
pub struct ExemptionRegistry {
    categories: BTreeMap<String, ExemptionCategory>,
}

impl ExemptionRegistry {
    pub fn new(categories: Vec<ExemptionCategory>) -> Result<Self> {
        let mut registry = Self::default();
        for category in categories {
            registry.insert(category)?;
        }
        Ok(registry)
    }

    /// Load every `*.toml` category definition in `dir`, in file name order
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(ExemptionError::DirectoryNotFound(dir.to_path_buf()));
        }

        let pattern = format!("{}/*.toml", glob::Pattern::escape(&dir.to_string_lossy()));
        let mut paths = glob::glob(&pattern)?
            .map(|entry| {
                entry.map_err(|e| ExemptionError::Io {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        paths.sort();

        let mut registry = Self::default();
        for path in paths {
            let content = std::fs::read_to_string(&path).map_err(|source| ExemptionError::Io {
                path: path.clone(),
                source,
            })?;
            let category: ExemptionCategory =
                toml::from_str(&content).map_err(|source| ExemptionError::Parse {
                    path: path.clone(),
                    source,
                })?;
            debug!(
                category = %category.name,
                codes = category.codes.len(),
                path = %path.display(),
                "loaded exemption category"
            );
            registry.insert(category)?;
        }

        info!(
            categories = registry.categories.len(),
            dir = %dir.display(),
            "loaded exemption codes"
        );
        Ok(registry)
    }

    fn insert(&mut self, category: ExemptionCategory) -> Result<()> {
        if self.categories.contains_key(&category.name) {
            return Err(ExemptionError::DuplicateCategory(category.name));
        }
        self.categories.insert(category.name.clone(), category);
        Ok(())
    }

    pub fn categories(&self) -> impl Iterator<Item = &ExemptionCategory> {
        self.categories.values()
    }

    /// Category by name. Stored attribute types spell spaces as `_`, so an
    /// inexact match compares names with the two treated as equal.
    pub fn category(&self, name: &str) -> Option<&ExemptionCategory> {
        self.categories.get(name).or_else(|| {
            let wanted = name.replace('_', " ");
            self.categories
                .values()
                .find(|c| c.name.replace('_', " ") == wanted)
        })
    }

    pub fn code(&self, category: &str, code: &str) -> Option<&ExemptionCode> {
        self.category(category).and_then(|c| c.code(code))
    }

    /// Parse a comma separated code string; unknown codes become free text
    pub fn parse(&self, category: &str, text: &str) -> Result<ExemptionCodeList> {
        if self.category(category).is_none() {
            return Err(ExemptionError::UnknownCategory(category.to_string()));
        }
        Ok(ExemptionCodeList::parse_stored(category, text, Some(self)))
    }

    /// Summaries for each code of a list, in code order
    pub fn describe(&self, list: &ExemptionCodeList) -> Vec<(String, String)> {
        list.codes()
            .map(|code| {
                let summary = self
                    .code(list.category(), code)
                    .map(|c| c.summary.clone())
                    .unwrap_or_default();
                (code.to_string(), summary)
            })
            .collect()
    }
}

impl ExemptionCodeLookup for ExemptionRegistry {
    fn has_code(&self, category: &str, code: &str) -> bool {
        self.code(category, code).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOIA: &str = r#"
name = "FOIA Exemptions"
abbreviation = "FOIA"

[[codes]]
name = "b6"
summary = "Personal privacy"
description = "Personnel and medical files and similar files"

[[codes]]
name = "b7(C)"
summary = "Law enforcement privacy"
"#;

    const STATE: &str = r#"
name = "State Exemptions"
abbreviation = "ST"

[[codes]]
name = "1.1"
summary = "Social security numbers"
"#;

    fn write_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("foia.toml"), FOIA).unwrap();
        std::fs::write(dir.path().join("state.toml"), STATE).unwrap();
        std::fs::write(dir.path().join("README.txt"), "ignored").unwrap();
        dir
    }

    #[test]
    fn test_load_dir() {
        let dir = write_dir();
        let registry = ExemptionRegistry::load_dir(dir.path()).unwrap();

        let names: Vec<_> = registry.categories().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["FOIA Exemptions", "State Exemptions"]);
        assert_eq!(
            registry.code("FOIA Exemptions", "b6").unwrap().summary,
            "Personal privacy"
        );
        assert_eq!(registry.category("State Exemptions").unwrap().abbreviation, "ST");
    }

    #[test]
    fn test_load_dir_with_glob_characters_in_path() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("codes[v2]");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("foia.toml"), FOIA).unwrap();

        let registry = ExemptionRegistry::load_dir(&dir).unwrap();
        assert!(registry.category("FOIA Exemptions").is_some());
    }

    #[test]
    fn test_underscore_category_survives_attribute_round_trip() {
        let registry = ExemptionRegistry::new(vec![ExemptionCategory {
            name: "State_Codes".to_string(),
            abbreviation: String::new(),
            codes: vec![ExemptionCode {
                name: "1.1".to_string(),
                summary: "Social security numbers".to_string(),
                description: String::new(),
            }],
        }])
        .unwrap();

        let list = registry.parse("State_Codes", "1.1").unwrap();
        let decoded = ExemptionCodeList::from_attribute(&list.to_attribute(), Some(&registry));

        assert_eq!(decoded.codes().collect::<Vec<_>>(), vec!["1.1"]);
        assert_eq!(decoded.other_text(), "");
        assert!(registry.parse("State Codes", "1.1").is_ok());
        assert_eq!(
            registry.describe(&decoded),
            vec![("1.1".to_string(), "Social security numbers".to_string())]
        );
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExemptionRegistry::load_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ExemptionError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_duplicate_category() {
        let dir = write_dir();
        std::fs::write(dir.path().join("zz_copy.toml"), FOIA).unwrap();

        let err = ExemptionRegistry::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ExemptionError::DuplicateCategory(name) if name == "FOIA Exemptions"));
    }

    #[test]
    fn test_parse_routes_unknown_codes_to_text() {
        let dir = write_dir();
        let registry = ExemptionRegistry::load_dir(dir.path()).unwrap();

        let list = registry.parse("FOIA Exemptions", "b6, b7(C), b99").unwrap();
        assert_eq!(list.codes().collect::<Vec<_>>(), vec!["b6", "b7(C)"]);
        assert_eq!(list.other_text(), "b99");
        assert!(list.validate(&registry).is_ok());

        assert!(matches!(
            registry.parse("Nope", "b6"),
            Err(ExemptionError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_describe() {
        let dir = write_dir();
        let registry = ExemptionRegistry::load_dir(dir.path()).unwrap();
        let list = ExemptionCodeList::new("FOIA Exemptions").with_codes(["b6"]);

        assert_eq!(
            registry.describe(&list),
            vec![("b6".to_string(), "Personal privacy".to_string())]
        );
    }

    #[test]
    fn test_malformed_definition() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.toml"), "codes = 3").unwrap();

        let err = ExemptionRegistry::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ExemptionError::Parse { .. }));
    }
}
