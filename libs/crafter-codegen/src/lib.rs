//! Type Crafter code generator
//!
//! Generates source files for a target language from a YAML type
//! specification (objects, enums, unions, arrays and cross-file `$ref`s).
//!
//! ## Architecture
//!
//! The generator runs as a pipeline:
//! 1. **Spec**: decodes the input document into tagged [`spec::Schema`] nodes
//! 2. **Engine**: resolves references, breaks cycles and renders every named
//!    type into an [`ir::GeneratedType`] with its dependency sets
//! 3. **Writer**: lays the results out into files and exporter modules
//!
//! Templates and the primitive type mapping come from a
//! [`config::Configuration`], either loaded from YAML or built from one of the
//! bundled [`config::presets`].

pub mod config;
pub mod engine;
pub mod error;
pub mod ir;
pub mod mapper;
pub mod resolver;
pub mod spec;
pub mod templates;
pub mod utils;
pub mod writer;

pub use config::Configuration;
pub use error::{Error, ErrorKind, Result};
pub use ir::GenerationResult;

use engine::TypeResolver;
use resolver::{Document, DocumentLoader, FsDocumentLoader};
use spec::SpecFileData;
use std::env;
use std::path::PathBuf;
use templates::{TemplateRenderer, TeraRenderer};
use writer::OutputPlanner;

/// Run one full resolution of `config.input` with a fresh reference cache.
pub fn generate(
    config: &Configuration,
    loader: &dyn DocumentLoader,
    renderer: &dyn TemplateRenderer,
) -> Result<GenerationResult> {
    let (spec, document) = load_spec(config, loader)?;
    let mut resolver = TypeResolver::new(&config.language.type_mapper, renderer, loader, document);
    resolver.resolve_all(&spec)
}

/// What [`generate_to_disk`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub types: usize,
    pub groups: usize,
    pub files: Vec<PathBuf>,
}

/// Load the spec from disk, generate and write the output directory.
pub fn generate_to_disk(config: &Configuration) -> Result<GenerationSummary> {
    let loader = FsDocumentLoader;
    let renderer = TeraRenderer::new(&config.template)?;

    let (spec, document) = load_spec(config, &loader)?;
    let mut resolver = TypeResolver::new(&config.language.type_mapper, &renderer, &loader, document);
    let result = resolver.resolve_all(&spec)?;

    tracing::info!(
        title = %spec.info.title,
        version = %spec.info.version,
        types = result.type_count(),
        groups = result.grouped_types.len(),
        references = resolver.reference_cache().len(),
        "Resolved spec"
    );

    let plan = OutputPlanner::new(&config.output, &config.language.exporter_module_name).plan(&result);
    let files = writer::write_output(&plan, &renderer, &spec.info, config.output.clean_write)?;

    Ok(GenerationSummary {
        types: result.type_count(),
        groups: result.grouped_types.len(),
        files,
    })
}

fn load_spec(config: &Configuration, loader: &dyn DocumentLoader) -> Result<(SpecFileData, Document)> {
    let input = if config.input.is_absolute() {
        config.input.clone()
    } else {
        env::current_dir()?.join(&config.input)
    };
    let path = utils::normalize_path(&input);

    tracing::debug!(path = %path.display(), "Loading spec file");
    let value = loader.load(&path)?;
    let spec = SpecFileData::decode(&value)?;
    Ok((spec, Document::new(path, value)))
}
