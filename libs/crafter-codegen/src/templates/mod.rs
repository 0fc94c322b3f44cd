//! Template rendering
//!
//! The resolution engine only sees [`TemplateRenderer`]. [`TeraRenderer`] is
//! the implementation used by the CLI: it compiles the configured template
//! sources once and additionally renders the file-level templates (exporter
//! modules and types files) the output writer needs.

use crate::config::TemplateConfig;
use crate::error::{Error, Result};
use crate::ir::{EnumTemplateInput, ObjectTemplateInput, OneOfTemplateInput};
use crate::spec::SpecInfo;
use heck::{ToLowerCamelCase, ToUpperCamelCase};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

const OBJECT_TEMPLATE: &str = "object";
const ENUM_TEMPLATE: &str = "enum";
const ONE_OF_TEMPLATE: &str = "one-of";
const EXPORTER_MODULE_TEMPLATE: &str = "exporter-module";
const TYPES_FILE_TEMPLATE: &str = "types-file";

/// Renders one declaration per node kind.
pub trait TemplateRenderer {
    fn render_object(&self, input: &ObjectTemplateInput) -> Result<String>;
    fn render_enum(&self, input: &EnumTemplateInput) -> Result<String>;
    fn render_one_of(&self, input: &OneOfTemplateInput) -> Result<String>;
}

/// An import line of a generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedType {
    pub name: String,
    /// Module specifier relative to the importing file
    pub path: String,
}

/// Context of the types-file template.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypesFileInput<'a> {
    pub info: &'a SpecInfo,
    pub types_content: &'a str,
    pub referenced_types: &'a [ImportedType],
    pub primitives: Vec<&'a str>,
}

#[derive(Serialize)]
struct ExporterModuleInput<'a> {
    modules: &'a [String],
}

pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    pub fn new(config: &TemplateConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("pascal_case", pascal_case);
        tera.register_filter("camel_case", camel_case);

        let mut templates = vec![
            (OBJECT_TEMPLATE, config.object_syntax.as_str()),
            (EXPORTER_MODULE_TEMPLATE, config.exporter_module_syntax.as_str()),
            (TYPES_FILE_TEMPLATE, config.types_file_syntax.as_str()),
        ];
        if let Some(syntax) = &config.enum_syntax {
            templates.push((ENUM_TEMPLATE, syntax.as_str()));
        }
        if let Some(syntax) = &config.one_of_syntax {
            templates.push((ONE_OF_TEMPLATE, syntax.as_str()));
        }
        tera.add_raw_templates(templates)?;

        Ok(Self { tera })
    }

    pub fn render_exporter_module(&self, modules: &[String]) -> Result<String> {
        self.render(EXPORTER_MODULE_TEMPLATE, &ExporterModuleInput { modules })
    }

    pub fn render_types_file(&self, input: &TypesFileInput<'_>) -> Result<String> {
        self.render(TYPES_FILE_TEMPLATE, input)
    }

    fn render<T: Serialize>(&self, template: &str, input: &T) -> Result<String> {
        if !self.tera.get_template_names().any(|name| name == template) {
            return Err(Error::runtime(format!(
                "No {template} template configured"
            )));
        }
        let context = Context::from_serialize(input)?;
        Ok(self.tera.render(template, &context)?)
    }
}

impl TemplateRenderer for TeraRenderer {
    fn render_object(&self, input: &ObjectTemplateInput) -> Result<String> {
        self.render(OBJECT_TEMPLATE, input)
    }

    fn render_enum(&self, input: &EnumTemplateInput) -> Result<String> {
        self.render(ENUM_TEMPLATE, input)
    }

    fn render_one_of(&self, input: &OneOfTemplateInput) -> Result<String> {
        self.render(ONE_OF_TEMPLATE, input)
    }
}

fn pascal_case(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("pascal_case", "value", String, value);
    Ok(Value::String(s.to_upper_camel_case()))
}

fn camel_case(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("camel_case", "value", String, value);
    Ok(Value::String(s.to_lower_camel_case()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;
    use crate::config::WriterMode;
    use crate::ir::ObjectProperty;
    use crate::spec::{DataType, Literal, Metadata};
    use indexmap::IndexMap;
    use std::path::Path;

    fn typescript_renderer() -> TeraRenderer {
        let config = presets::typescript(Path::new("spec.yaml"), Path::new("out"), WriterMode::default());
        TeraRenderer::new(&config.template).unwrap()
    }

    fn property(data_type: &str, required: bool) -> ObjectProperty {
        ObjectProperty {
            data_type: data_type.into(),
            required,
            referenced: false,
            primitive_type: data_type.into(),
            composer_type: None,
            meta: Metadata::default(),
        }
    }

    #[test]
    fn test_render_object() {
        let mut properties = IndexMap::new();
        properties.insert("name".to_string(), property("string", true));
        properties.insert("age".to_string(), property("number", false));
        let input = ObjectTemplateInput {
            type_name: "Pet".into(),
            data_type: "Pet".into(),
            properties,
            meta: Metadata {
                description: Some("A pet".into()),
                ..Metadata::default()
            },
        };

        let rendered = typescript_renderer().render_object(&input).unwrap();
        assert!(rendered.starts_with("/**\n * A pet\n */\nexport type Pet = {"));
        assert!(rendered.contains("\n  name: string;\n  age?: number;\n};"));
    }

    #[test]
    fn test_render_enum_quotes_strings() {
        let input = EnumTemplateInput {
            type_name: "StatusEnum".into(),
            data_type: "StatusEnum".into(),
            enum_type: DataType::String.to_string(),
            values: vec![Literal::String("available".into()), Literal::String("sold".into())],
            meta: Metadata::default(),
        };

        let rendered = typescript_renderer().render_enum(&input).unwrap();
        assert!(rendered.starts_with(r#"export type StatusEnum = "available" | "sold";"#));
    }

    #[test]
    fn test_missing_optional_template_is_runtime_error() {
        let mut config =
            presets::typescript(Path::new("spec.yaml"), Path::new("out"), WriterMode::default());
        config.template.one_of_syntax = None;
        let renderer = TeraRenderer::new(&config.template).unwrap();

        let input = OneOfTemplateInput {
            type_name: "Shape".into(),
            data_type: "Shape".into(),
            compositions: Vec::new(),
            meta: Metadata::default(),
        };
        let err = renderer.render_one_of(&input).unwrap_err();
        assert!(matches!(err, Error::Runtime(_)));
    }

    #[test]
    fn test_render_exporter_module() {
        let modules = vec!["types".to_string(), "Animals".to_string()];
        let rendered = typescript_renderer().render_exporter_module(&modules).unwrap();
        assert_eq!(
            rendered,
            "export * from './types';\nexport * from './Animals';\n"
        );
    }

    #[test]
    fn test_case_filters() {
        let mut config =
            presets::typescript(Path::new("spec.yaml"), Path::new("out"), WriterMode::default());
        config.template.exporter_module_syntax =
            "{% for m in modules %}{{ m | pascal_case }}/{{ m | camel_case }};{% endfor %}".into();
        let renderer = TeraRenderer::new(&config.template).unwrap();

        let rendered = renderer
            .render_exporter_module(&["pet_status".to_string()])
            .unwrap();
        assert_eq!(rendered, "PetStatus/petStatus;");
    }
}
