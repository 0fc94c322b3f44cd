//! Primitive type mapping
//!
//! Looks up schema primitives in the configured table. Entries are either a
//! plain string or a format table with a mandatory `default`. There is no
//! fallback: an unmapped type is a [`Error::TypeMapping`] and a format table
//! without `default` is rejected whatever format is asked for.

use crate::config::{TypeMapperConfig, TypeMapping, ARRAY_ITEM_PLACEHOLDER};
use crate::error::{Error, Result};
use crate::spec::DataType;

/// Mandatory key of a format table.
const DEFAULT_FORMAT: &str = "default";

pub struct TypeMapper<'a> {
    table: &'a TypeMapperConfig,
}

impl<'a> TypeMapper<'a> {
    pub fn new(table: &'a TypeMapperConfig) -> Self {
        Self { table }
    }

    /// Target language type for `data_type`, honouring a format override.
    pub fn map_primitive(&self, data_type: DataType, format: Option<&str>) -> Result<String> {
        let missing = || Error::TypeMapping {
            data_type: data_type.to_string(),
            format: format.map(String::from),
        };

        match self.table.get(data_type.as_str()).ok_or_else(missing)? {
            TypeMapping::Direct(mapped) => Ok(mapped.clone()),
            TypeMapping::Formats(formats) => {
                let default = formats.get(DEFAULT_FORMAT).ok_or_else(|| {
                    Error::invalid_spec(format!(
                        "Type mapping for '{data_type}' has no '{DEFAULT_FORMAT}' entry"
                    ))
                })?;
                Ok(format
                    .and_then(|f| formats.get(f))
                    .unwrap_or(default)
                    .clone())
            }
        }
    }

    /// The array mapping, still containing the item placeholder.
    pub fn array_template(&self) -> Result<&'a str> {
        match self.table.get(DataType::Array.as_str()) {
            Some(TypeMapping::Direct(template)) if template.contains(ARRAY_ITEM_PLACEHOLDER) => {
                Ok(template.as_str())
            }
            Some(_) => Err(Error::invalid_spec(format!(
                "Array type mapping must be a string containing {ARRAY_ITEM_PLACEHOLDER}"
            ))),
            None => Err(Error::TypeMapping {
                data_type: DataType::Array.to_string(),
                format: None,
            }),
        }
    }

    /// Substitute the resolved item type into the array mapping.
    pub fn fill_array(&self, item_type: &str) -> Result<String> {
        Ok(self
            .array_template()?
            .replace(ARRAY_ITEM_PLACEHOLDER, item_type))
    }
}
