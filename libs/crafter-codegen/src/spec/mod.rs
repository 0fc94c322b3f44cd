//! Spec file model
//!
//! The input document is plain YAML with an `info` block, a `types` map and a
//! `groupedTypes` map. Each type entry is a schema node which is decoded once
//! into the closed [`Schema`] variant; the resolution engine dispatches on that
//! tag instead of re-inspecting optional fields.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::str::FromStr;

pub const REFERENCE_KEY: &str = "$ref";

/// `info` block of a spec file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecInfo {
    pub version: String,
    pub title: String,
}

/// A decoded spec file. Type bodies stay raw until the engine asks for them.
#[derive(Debug, Clone)]
pub struct SpecFileData {
    pub info: SpecInfo,
    pub types: Option<IndexMap<String, Value>>,
    pub grouped_types: Option<IndexMap<String, GroupEntry>>,
}

/// One `groupedTypes` entry.
#[derive(Debug, Clone)]
pub enum GroupEntry {
    /// Inline group: type name → raw schema node
    Types(IndexMap<String, Value>),
    /// `{ $ref: "other.yaml#/groupedTypes/Name" }`
    Reference(String),
}

impl SpecFileData {
    /// Decode the root document of a run.
    pub fn decode(document: &Value) -> Result<Self> {
        let root = document
            .as_mapping()
            .ok_or_else(|| Error::invalid_spec("Spec file must be a mapping"))?;

        let info = decode_info(root.get("info"))?;

        let types = match root.get("types") {
            None | Some(Value::Null) => None,
            Some(value) => Some(decode_type_map(value, "types")?),
        };

        let grouped_types = match root.get("groupedTypes") {
            None | Some(Value::Null) => None,
            Some(value) => {
                let groups = value
                    .as_mapping()
                    .ok_or_else(|| Error::invalid_spec("groupedTypes must be a mapping"))?;
                let mut result = IndexMap::new();
                for (key, entry) in groups {
                    let name = mapping_key(key, "groupedTypes")?;
                    let entry = match group_reference(entry) {
                        Some(reference) => GroupEntry::Reference(reference),
                        None => GroupEntry::Types(decode_type_map(entry, &name)?),
                    };
                    result.insert(name, entry);
                }
                Some(result)
            }
        };

        if types.is_none() && grouped_types.is_none() {
            return Err(Error::invalid_spec("Neither types nor groupedTypes found!"));
        }

        Ok(Self {
            info,
            types,
            grouped_types,
        })
    }
}

fn decode_info(value: Option<&Value>) -> Result<SpecInfo> {
    let info = value
        .and_then(Value::as_mapping)
        .ok_or_else(|| Error::invalid_spec("Missing info block"))?;

    let scalar = |key: &str| -> Result<String> {
        match info.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(Error::invalid_spec(format!("Missing info.{key}"))),
        }
    };

    Ok(SpecInfo {
        version: scalar("version")?,
        title: scalar("title")?,
    })
}

/// Decode an ordered `name → schema` map, keeping values raw.
pub fn decode_type_map(value: &Value, context: &str) -> Result<IndexMap<String, Value>> {
    let mapping = value
        .as_mapping()
        .ok_or_else(|| Error::invalid_spec(format!("{context} must be a mapping of types")))?;

    let mut result = IndexMap::with_capacity(mapping.len());
    for (key, schema) in mapping {
        result.insert(mapping_key(key, context)?, schema.clone());
    }
    Ok(result)
}

/// A group entry is a reference when `$ref` is its only key.
pub fn group_reference(value: &Value) -> Option<String> {
    let mapping = value.as_mapping()?;
    if mapping.len() != 1 {
        return None;
    }
    mapping.get(REFERENCE_KEY)?.as_str().map(String::from)
}

fn mapping_key(key: &Value, context: &str) -> Result<String> {
    key.as_str()
        .map(String::from)
        .ok_or_else(|| Error::invalid_spec(format!("Non-string key in {context}: {key:?}")))
}

/// Primitive kinds a schema node may declare with `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Unknown,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Integer => "integer",
            DataType::Boolean => "boolean",
            DataType::Array => "array",
            DataType::Object => "object",
            DataType::Unknown => "unknown",
        }
    }

    /// Kinds whose values can form an enum.
    pub fn is_enumerable(&self) -> bool {
        matches!(self, DataType::String | DataType::Number | DataType::Integer)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" => Ok(DataType::String),
            "number" => Ok(DataType::Number),
            "integer" => Ok(DataType::Integer),
            "boolean" => Ok(DataType::Boolean),
            "array" => Ok(DataType::Array),
            "object" => Ok(DataType::Object),
            "unknown" => Ok(DataType::Unknown),
            other => Err(Error::invalid_spec(format!("Unknown data type '{other}'"))),
        }
    }
}

/// Scalar literal used for enum values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

impl Literal {
    fn matches(&self, data_type: DataType) -> bool {
        match (self, data_type) {
            (Literal::String(_), DataType::String) => true,
            (Literal::Integer(_), DataType::Integer) => true,
            (Literal::Integer(_) | Literal::Number(_), DataType::Number) => true,
            _ => false,
        }
    }
}

/// Descriptive fields carried through to templates unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub description: Option<String>,
    pub summary: Option<String>,
    /// Any YAML value, carried through as written
    pub example: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Object(ObjectSchema),
    Enum(EnumSchema),
    Union(UnionSchema),
    Array(ArraySchema),
    Reference(ReferenceSchema),
    Primitive(PrimitiveSchema),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    pub meta: Metadata,
}

impl ObjectSchema {
    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|name| name == property)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub data_type: DataType,
    pub values: Vec<Literal>,
    pub meta: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    pub variants: Vec<Schema>,
    pub meta: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<Schema>,
    pub meta: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSchema {
    pub reference: String,
    pub meta: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSchema {
    pub data_type: DataType,
    pub format: Option<String>,
    pub meta: Metadata,
}

/// Field-level view of a schema node, before classification.
#[derive(Debug, Deserialize)]
struct RawTypeInfo {
    #[serde(rename = "type")]
    data_type: Option<String>,
    format: Option<String>,
    properties: Option<IndexMap<String, Value>>,
    required: Option<Vec<String>>,
    items: Option<Value>,
    #[serde(rename = "$ref")]
    reference: Option<String>,
    #[serde(rename = "oneOf")]
    one_of: Option<Vec<Value>>,
    #[serde(rename = "enum")]
    enum_values: Option<Vec<Literal>>,
    description: Option<String>,
    summary: Option<String>,
    example: Option<Value>,
}

impl Schema {
    /// Decode a raw node. `path` is the dotted location used in error messages
    /// (`TypeName.propertyName`).
    pub fn decode(value: &Value, path: &str) -> Result<Schema> {
        let raw: RawTypeInfo = serde_yaml::from_value(value.clone())
            .map_err(|e| Error::invalid_spec(format!("Invalid type for: {path} ({e})")))?;

        let data_type = raw
            .data_type
            .as_deref()
            .map(|t| {
                t.parse::<DataType>()
                    .map_err(|_| Error::invalid_spec(format!("Invalid type '{t}' for: {path}")))
            })
            .transpose()?;

        if raw.reference.is_some() && (data_type.is_some() || raw.one_of.is_some()) {
            return Err(Error::invalid_spec(format!(
                "$ref cannot be combined with type or oneOf for: {path}"
            )));
        }

        let meta = Metadata {
            description: raw.description,
            summary: raw.summary,
            example: raw.example,
        };

        if data_type == Some(DataType::Object) {
            let mut properties = IndexMap::new();
            for (name, property) in raw.properties.unwrap_or_default() {
                let schema = Schema::decode(&property, &format!("{path}.{name}"))?;
                properties.insert(name, schema);
            }
            return Ok(Schema::Object(ObjectSchema {
                properties,
                required: raw.required.unwrap_or_default(),
                meta,
            }));
        }

        if let Some(values) = raw.enum_values {
            let data_type = data_type
                .filter(DataType::is_enumerable)
                .ok_or_else(|| Error::invalid_spec(format!("Invalid enum type for: {path}")))?;
            if values.is_empty() {
                return Err(Error::invalid_spec(format!("Empty enum for: {path}")));
            }
            if let Some(value) = values.iter().find(|v| !v.matches(data_type)) {
                return Err(Error::invalid_spec(format!(
                    "Enum value {value:?} is not a {data_type} for: {path}"
                )));
            }
            return Ok(Schema::Enum(EnumSchema {
                data_type,
                values,
                meta,
            }));
        }

        if let Some(variants) = raw.one_of {
            if variants.is_empty() {
                return Err(Error::invalid_spec(format!("Invalid oneOf type for: {path}")));
            }
            let variants = variants
                .iter()
                .enumerate()
                .map(|(index, variant)| Schema::decode(variant, &format!("{path}[{}]", index + 1)))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Schema::Union(UnionSchema { variants, meta }));
        }

        if data_type == Some(DataType::Array) {
            let items = raw
                .items
                .ok_or_else(|| Error::invalid_spec(format!("Invalid array type for: {path}")))?;
            let items = Schema::decode(&items, &format!("{path}.items"))?;
            return Ok(Schema::Array(ArraySchema {
                items: Box::new(items),
                meta,
            }));
        }

        if let Some(reference) = raw.reference {
            return Ok(Schema::Reference(ReferenceSchema { reference, meta }));
        }

        match data_type {
            Some(data_type) => Ok(Schema::Primitive(PrimitiveSchema {
                data_type,
                format: raw.format,
                meta,
            })),
            None => Err(Error::invalid_spec(format!(
                "Invalid property type for: {path}"
            ))),
        }
    }

    pub fn meta(&self) -> &Metadata {
        match self {
            Schema::Object(s) => &s.meta,
            Schema::Enum(s) => &s.meta,
            Schema::Union(s) => &s.meta,
            Schema::Array(s) => &s.meta,
            Schema::Reference(s) => &s.meta,
            Schema::Primitive(s) => &s.meta,
        }
    }

    /// The `type` the node declares, if any.
    pub fn declared_type(&self) -> Option<DataType> {
        match self {
            Schema::Object(_) => Some(DataType::Object),
            Schema::Enum(s) => Some(s.data_type),
            Schema::Array(_) => Some(DataType::Array),
            Schema::Primitive(s) => Some(s.data_type),
            Schema::Union(_) | Schema::Reference(_) => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Schema::Reference(_))
    }
}
