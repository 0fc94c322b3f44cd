//! Generator configuration
//!
//! A [`Configuration`] describes one generation run: where the spec lives,
//! where output goes and how it is laid out, the template sources for each
//! node kind and the primitive type mapping of the target language.
//! It can be loaded from YAML or built from one of the bundled presets.

pub mod presets;

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Placeholder substituted with the resolved item type in the array mapping.
pub const ARRAY_ITEM_PLACEHOLDER: &str = "~ItemType~";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Path to the input spec file
    pub input: PathBuf,
    pub output: OutputConfig,
    pub template: TemplateConfig,
    pub language: LanguageConfig,
}

impl Configuration {
    /// Parse a configuration from YAML (or JSON) text.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Load a configuration file from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// Remove the output directory before writing
    #[serde(default = "default_clean_write")]
    pub clean_write: bool,
    /// Extension of generated files, including the leading dot
    pub file_extension: String,
    pub directory: PathBuf,
    #[serde(default)]
    pub writer_mode: WriterMode,
}

fn default_clean_write() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriterMode {
    #[serde(default)]
    pub types: TypesWriterMode,
    #[serde(default)]
    pub grouped_types: GroupedTypesWriterMode,
}

/// Layout of top-level types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypesWriterMode {
    /// All types in one `types` file
    #[default]
    SingleFile,
    /// One file per type
    Files,
}

/// Layout of grouped types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupedTypesWriterMode {
    /// One file per group
    #[default]
    SingleFile,
    /// One folder per group, one file per type
    FolderWithFiles,
}

impl FromStr for TypesWriterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SingleFile" => Ok(Self::SingleFile),
            "Files" => Ok(Self::Files),
            other => Err(Error::invalid_param("Types writer mode", other)),
        }
    }
}

impl FromStr for GroupedTypesWriterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SingleFile" => Ok(Self::SingleFile),
            "FolderWithFiles" => Ok(Self::FolderWithFiles),
            other => Err(Error::invalid_param("Grouped types writer mode", other)),
        }
    }
}

impl fmt::Display for TypesWriterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleFile => f.write_str("SingleFile"),
            Self::Files => f.write_str("Files"),
        }
    }
}

impl fmt::Display for GroupedTypesWriterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleFile => f.write_str("SingleFile"),
            Self::FolderWithFiles => f.write_str("FolderWithFiles"),
        }
    }
}

/// Template sources. Enum and union templates are optional; a spec that
/// uses those kinds without a template fails at render time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    pub object_syntax: String,
    pub exporter_module_syntax: String,
    pub types_file_syntax: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_syntax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of_syntax: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfig {
    /// File stem of the per-folder exporter module (e.g. `index`)
    pub exporter_module_name: String,
    pub type_mapper: TypeMapperConfig,
}

/// Primitive type name → target language mapping.
pub type TypeMapperConfig = IndexMap<String, TypeMapping>;

/// A single type mapper entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeMapping {
    /// Format independent mapping
    Direct(String),
    /// Per-format table; must contain a `default` entry
    Formats(IndexMap<String, String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_modes_from_str() {
        assert_eq!(
            "Files".parse::<TypesWriterMode>().unwrap(),
            TypesWriterMode::Files
        );
        assert_eq!(
            "FolderWithFiles".parse::<GroupedTypesWriterMode>().unwrap(),
            GroupedTypesWriterMode::FolderWithFiles
        );

        let err = "Folders".parse::<TypesWriterMode>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid param Folders for Types writer mode");
    }

    #[test]
    fn test_configuration_from_yaml() {
        let config = Configuration::from_yaml_str(
            r#"
input: spec.yaml
output:
  fileExtension: .ts
  directory: out
  writerMode:
    types: Files
template:
  objectSyntax: "{{ typeName }}"
  exporterModuleSyntax: ""
  typesFileSyntax: "{{ typesContent }}"
language:
  exporterModuleName: index
  typeMapper:
    string:
      default: string
      date: Date
    boolean: boolean
    array: "~ItemType~[]"
"#,
        )
        .unwrap();

        assert!(config.output.clean_write);
        assert_eq!(config.output.writer_mode.types, TypesWriterMode::Files);
        assert_eq!(
            config.output.writer_mode.grouped_types,
            GroupedTypesWriterMode::SingleFile
        );
        assert!(config.template.enum_syntax.is_none());
        assert_eq!(
            config.language.type_mapper.get("boolean"),
            Some(&TypeMapping::Direct("boolean".into()))
        );
        match config.language.type_mapper.get("string") {
            Some(TypeMapping::Formats(formats)) => {
                assert_eq!(formats.get("date").map(String::as_str), Some("Date"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
