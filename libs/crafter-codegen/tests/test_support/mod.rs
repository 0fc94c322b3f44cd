#![allow(dead_code)]

use crafter_codegen::config::{
    presets, Configuration, TypeMapperConfig, TypeMapping, WriterMode,
};
use crafter_codegen::ir::{EnumTemplateInput, ObjectTemplateInput, OneOfTemplateInput};
use crafter_codegen::resolver::DocumentLoader;
use crafter_codegen::templates::TemplateRenderer;
use crafter_codegen::{Error, GenerationResult, Result};
use serde_yaml::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

pub const SPEC_DIR: &str = "/specs";
pub const MAIN_SPEC: &str = "/specs/main.yaml";

/// In-memory documents keyed by absolute path. Records every load.
#[derive(Default)]
pub struct MemoryLoader {
    documents: HashMap<PathBuf, String>,
    loads: RefCell<Vec<PathBuf>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, source: &str) -> Self {
        self.documents.insert(PathBuf::from(path), source.to_string());
        self
    }

    pub fn load_count(&self, path: &str) -> usize {
        self.loads
            .borrow()
            .iter()
            .filter(|loaded| loaded.as_path() == Path::new(path))
            .count()
    }
}

impl DocumentLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<Value> {
        self.loads.borrow_mut().push(path.to_path_buf());
        let source = self.documents.get(path).ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no document at {}", path.display()),
            ))
        })?;
        Ok(serde_yaml::from_str(source)?)
    }
}

/// Renders `<kind> <TypeName>;` and remembers every rendered name.
#[derive(Default)]
pub struct RecordingRenderer {
    pub rendered: RefCell<Vec<String>>,
}

impl RecordingRenderer {
    fn record(&self, kind: &str, name: &str) -> String {
        self.rendered.borrow_mut().push(name.to_string());
        format!("{kind} {name};\n")
    }

    pub fn rendered(&self) -> Vec<String> {
        self.rendered.borrow().clone()
    }
}

impl TemplateRenderer for RecordingRenderer {
    fn render_object(&self, input: &ObjectTemplateInput) -> Result<String> {
        Ok(self.record("object", &input.type_name))
    }

    fn render_enum(&self, input: &EnumTemplateInput) -> Result<String> {
        Ok(self.record("enum", &input.type_name))
    }

    fn render_one_of(&self, input: &OneOfTemplateInput) -> Result<String> {
        Ok(self.record("union", &input.type_name))
    }
}

pub fn direct(value: &str) -> TypeMapping {
    TypeMapping::Direct(value.to_string())
}

pub fn formats(pairs: &[(&str, &str)]) -> TypeMapping {
    TypeMapping::Formats(
        pairs
            .iter()
            .map(|(format, mapped)| (format.to_string(), mapped.to_string()))
            .collect(),
    )
}

/// `string`, `integer → number` and the `~ItemType~[]` array mapping.
pub fn basic_mapper() -> TypeMapperConfig {
    let mut mapper = TypeMapperConfig::new();
    mapper.insert("string".into(), direct("string"));
    mapper.insert("integer".into(), direct("number"));
    mapper.insert("array".into(), direct("~ItemType~[]"));
    mapper
}

/// TypeScript preset reading `MAIN_SPEC`, with the given mapper.
pub fn config_with_mapper(type_mapper: TypeMapperConfig) -> Configuration {
    let mut config = presets::typescript(
        Path::new(MAIN_SPEC),
        Path::new("/out"),
        WriterMode::default(),
    );
    config.language.type_mapper = type_mapper;
    config
}

/// Resolve `MAIN_SPEC` from `loader` with the recording renderer.
pub fn generate_with(loader: &MemoryLoader, type_mapper: TypeMapperConfig) -> Result<GenerationResult> {
    let renderer = RecordingRenderer::default();
    crafter_codegen::generate(&config_with_mapper(type_mapper), loader, &renderer)
}
