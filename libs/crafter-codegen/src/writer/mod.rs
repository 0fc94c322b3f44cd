//! Output layout and writing
//!
//! [`OutputPlanner`] decides which file declares which type and what each
//! file imports; [`write_output`] renders and writes that plan.

mod planner;

pub use planner::{ExporterModule, OutputPlan, OutputPlanner, PlannedFile};

use crate::error::Result;
use crate::spec::SpecInfo;
use crate::templates::{TeraRenderer, TypesFileInput};
use crate::utils::{remove_directory, write_file};
use std::path::PathBuf;

/// Render and write every planned file and exporter module.
///
/// With `clean_write` the output root is removed first. Returns the written
/// paths in write order.
pub fn write_output(
    plan: &OutputPlan,
    renderer: &TeraRenderer,
    info: &SpecInfo,
    clean_write: bool,
) -> Result<Vec<PathBuf>> {
    if clean_write {
        tracing::debug!(directory = %plan.root.display(), "Cleaning output directory");
        remove_directory(&plan.root)?;
    }

    let mut written = Vec::with_capacity(plan.files.len() + plan.exporters.len());

    for file in &plan.files {
        let body = renderer.render_types_file(&TypesFileInput {
            info,
            types_content: &file.content,
            referenced_types: &file.imports,
            primitives: file.primitives.iter().map(String::as_str).collect(),
        })?;
        write_file(&file.path, &body)?;
        tracing::info!(path = %file.path.display(), types = file.types.len(), "Wrote file");
        written.push(file.path.clone());
    }

    for exporter in &plan.exporters {
        let body = renderer.render_exporter_module(&exporter.modules)?;
        write_file(&exporter.path, &body)?;
        tracing::info!(path = %exporter.path.display(), "Wrote exporter module");
        written.push(exporter.path.clone());
    }

    Ok(written)
}
