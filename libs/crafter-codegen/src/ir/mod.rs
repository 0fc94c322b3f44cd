//! Intermediate Representation (IR)
//!
//! Language-agnostic output of the type resolution engine. Every named type
//! becomes a [`GeneratedType`]: the rendered content plus the dependency sets
//! the output writer needs for imports and exports, and the structured
//! template input the content was rendered from.

use crate::spec::{Literal, Metadata};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;

/// Resolved output for one named type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedType {
    /// Rendered text, including auxiliary fragments for inline sub-types
    pub content: String,
    /// Custom type names the signature depends on
    pub references: BTreeSet<String>,
    /// Target language primitive tokens used
    pub primitives: BTreeSet<String>,
    pub template_input: TemplateInput,
}

impl GeneratedType {
    pub fn new(template_input: TemplateInput) -> Self {
        Self {
            content: String::new(),
            references: BTreeSet::new(),
            primitives: BTreeSet::new(),
            template_input,
        }
    }
}

/// Structured payload handed to a template, by node kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TemplateInput {
    Object(ObjectTemplateInput),
    Enum(EnumTemplateInput),
    OneOf(OneOfTemplateInput),
    Variable(VariableTemplateInput),
}

impl TemplateInput {
    pub fn type_name(&self) -> &str {
        match self {
            TemplateInput::Object(input) => &input.type_name,
            TemplateInput::Enum(input) => &input.type_name,
            TemplateInput::OneOf(input) => &input.type_name,
            TemplateInput::Variable(input) => &input.type_name,
        }
    }

    /// The target language type other declarations use to refer to this one.
    pub fn data_type(&self) -> &str {
        match self {
            TemplateInput::Object(input) => &input.data_type,
            TemplateInput::Enum(input) => &input.data_type,
            TemplateInput::OneOf(input) => &input.data_type,
            TemplateInput::Variable(input) => &input.data_type,
        }
    }

    pub fn composer_type(&self) -> Option<&str> {
        match self {
            TemplateInput::Variable(input) => input.composer_type.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTemplateInput {
    pub type_name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub properties: IndexMap<String, ObjectProperty>,
    #[serde(flatten)]
    pub meta: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProperty {
    /// Rendered target language type
    #[serde(rename = "type")]
    pub data_type: String,
    pub required: bool,
    /// Whether the type came from a `$ref`
    pub referenced: bool,
    /// Declared schema type, `object` when none was declared
    pub primitive_type: String,
    /// Item type for arrays
    pub composer_type: Option<String>,
    #[serde(flatten)]
    pub meta: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumTemplateInput {
    pub type_name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    /// Underlying schema type of the values (`string`, `number`, `integer`)
    pub enum_type: String,
    pub values: Vec<Literal>,
    #[serde(flatten)]
    pub meta: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OneOfTemplateInput {
    pub type_name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub compositions: Vec<Composition>,
    #[serde(flatten)]
    pub meta: Metadata,
}

/// One `oneOf` branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum Composition {
    #[serde(rename_all = "camelCase")]
    Referenced { referenced_type: String },
    #[serde(rename_all = "camelCase")]
    Inline {
        /// Declared schema type of the branch
        data_type: Option<String>,
        template_input: Box<TemplateInput>,
        content: String,
    },
}

/// Aliases, primitives and arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableTemplateInput {
    pub type_name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub composer_type: Option<String>,
    #[serde(flatten)]
    pub meta: Metadata,
}

/// Named types of one output unit.
pub type GeneratedTypes = IndexMap<String, GeneratedType>;

/// Everything one run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub types: GeneratedTypes,
    pub grouped_types: IndexMap<String, GeneratedTypes>,
}

impl GenerationResult {
    pub fn type_count(&self) -> usize {
        self.types.len() + self.grouped_types.values().map(IndexMap::len).sum::<usize>()
    }
}
