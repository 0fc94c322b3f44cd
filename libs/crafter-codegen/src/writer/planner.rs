use crate::config::{GroupedTypesWriterMode, OutputConfig, TypesWriterMode};
use crate::ir::{GeneratedType, GeneratedTypes, GenerationResult};
use crate::templates::ImportedType;
use crate::utils::relative_module_path;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

const TYPES_FILE_STEM: &str = "types";

/// Files and exporter modules one run will write.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPlan {
    pub root: PathBuf,
    pub files: Vec<PlannedFile>,
    pub exporters: Vec<ExporterModule>,
}

impl OutputPlan {
    pub fn file(&self, path: &Path) -> Option<&PlannedFile> {
        self.files.iter().find(|file| file.path == path)
    }
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedFile {
    pub path: PathBuf,
    /// Type names declared in this file, in declaration order
    pub types: Vec<String>,
    pub content: String,
    pub imports: Vec<ImportedType>,
    pub primitives: BTreeSet<String>,
}

/// A per-directory module re-exporting its siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterModule {
    pub path: PathBuf,
    pub modules: Vec<String>,
}

struct Unit<'r> {
    /// File path without extension; also the import target
    module: PathBuf,
    path: PathBuf,
    types: Vec<(&'r String, &'r GeneratedType)>,
}

pub struct OutputPlanner<'a> {
    output: &'a OutputConfig,
    exporter_module_name: &'a str,
}

impl<'a> OutputPlanner<'a> {
    pub fn new(output: &'a OutputConfig, exporter_module_name: &'a str) -> Self {
        Self {
            output,
            exporter_module_name,
        }
    }

    pub fn plan(&self, result: &GenerationResult) -> OutputPlan {
        let root = self.output.directory.clone();
        let mut units = Vec::new();
        let mut root_modules = Vec::new();
        let mut exporters = Vec::new();

        let top_level = declarations(&result.types);
        match self.output.writer_mode.types {
            TypesWriterMode::SingleFile => {
                if !top_level.is_empty() {
                    units.push(self.unit(&root, TYPES_FILE_STEM, top_level));
                    root_modules.push(TYPES_FILE_STEM.to_string());
                }
            }
            TypesWriterMode::Files => {
                for declaration in top_level {
                    root_modules.push(declaration.0.clone());
                    units.push(self.unit(&root, declaration.0, vec![declaration]));
                }
            }
        }

        for (group_name, types) in &result.grouped_types {
            let members = declarations(types);
            if members.is_empty() {
                continue;
            }
            match self.output.writer_mode.grouped_types {
                GroupedTypesWriterMode::SingleFile => {
                    units.push(self.unit(&root, group_name, members));
                }
                GroupedTypesWriterMode::FolderWithFiles => {
                    let folder = root.join(group_name);
                    let mut modules = Vec::with_capacity(members.len());
                    for declaration in members {
                        modules.push(declaration.0.clone());
                        units.push(self.unit(&folder, declaration.0, vec![declaration]));
                    }
                    exporters.push(ExporterModule {
                        path: self.exporter_path(&folder),
                        modules,
                    });
                }
            }
            root_modules.push(group_name.clone());
        }

        if !root_modules.is_empty() {
            exporters.insert(
                0,
                ExporterModule {
                    path: self.exporter_path(&root),
                    modules: root_modules,
                },
            );
        }

        let mut modules_by_type: HashMap<&str, &Path> = HashMap::new();
        for unit in &units {
            for (name, _) in &unit.types {
                modules_by_type.entry(name.as_str()).or_insert(&unit.module);
            }
        }

        let files = units
            .iter()
            .map(|unit| plan_file(unit, &modules_by_type))
            .collect();

        OutputPlan {
            root,
            files,
            exporters,
        }
    }

    fn unit<'r>(
        &self,
        directory: &Path,
        stem: &str,
        types: Vec<(&'r String, &'r GeneratedType)>,
    ) -> Unit<'r> {
        Unit {
            module: directory.join(stem),
            path: directory.join(format!("{stem}{}", self.output.file_extension)),
            types,
        }
    }

    fn exporter_path(&self, directory: &Path) -> PathBuf {
        directory.join(format!(
            "{}{}",
            self.exporter_module_name, self.output.file_extension
        ))
    }
}

/// Types that produce a declaration. Aliases have no content and get no
/// file; a `$ref` to one still names the alias, and that import is skipped.
fn declarations(types: &GeneratedTypes) -> Vec<(&String, &GeneratedType)> {
    types
        .iter()
        .filter(|(_, record)| !record.content.is_empty())
        .collect()
}

fn plan_file(unit: &Unit<'_>, modules_by_type: &HashMap<&str, &Path>) -> PlannedFile {
    let declared: BTreeSet<&str> = unit.types.iter().map(|(name, _)| name.as_str()).collect();
    let directory = unit.module.parent().unwrap_or_else(|| Path::new(""));

    let referenced: BTreeSet<&str> = unit
        .types
        .iter()
        .flat_map(|(_, record)| record.references.iter().map(String::as_str))
        .filter(|name| !declared.contains(name))
        .collect();

    let mut imports = Vec::with_capacity(referenced.len());
    for name in referenced {
        match modules_by_type.get(name) {
            Some(module) => imports.push(ImportedType {
                name: name.to_string(),
                path: relative_module_path(directory, module),
            }),
            None => tracing::warn!(
                type_name = name,
                file = %unit.path.display(),
                "No generated file declares referenced type, skipping import"
            ),
        }
    }

    PlannedFile {
        path: unit.path.clone(),
        types: unit.types.iter().map(|(name, _)| (*name).clone()).collect(),
        content: unit
            .types
            .iter()
            .map(|(_, record)| record.content.as_str())
            .collect(),
        imports,
        primitives: unit
            .types
            .iter()
            .flat_map(|(_, record)| record.primitives.iter().cloned())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriterMode;
    use crate::ir::{TemplateInput, VariableTemplateInput};
    use crate::spec::Metadata;

    fn record(name: &str, references: &[&str]) -> GeneratedType {
        let mut record = GeneratedType::new(TemplateInput::Variable(VariableTemplateInput {
            type_name: name.into(),
            data_type: name.into(),
            composer_type: None,
            meta: Metadata::default(),
        }));
        record.content = format!("type {name};\n");
        record.references = references.iter().map(|r| r.to_string()).collect();
        record
    }

    fn result() -> GenerationResult {
        let mut result = GenerationResult::default();
        result.types.insert("Pet".into(), record("Pet", &["Owner", "Id"]));
        result.types.insert("Owner".into(), record("Owner", &["Pet", "Missing"]));
        let mut shared = GeneratedTypes::new();
        shared.insert("Id".into(), record("Id", &[]));
        result.grouped_types.insert("Shared".into(), shared);
        result
    }

    fn output(writer_mode: WriterMode) -> OutputConfig {
        OutputConfig {
            clean_write: true,
            file_extension: ".ts".into(),
            directory: PathBuf::from("/out"),
            writer_mode,
        }
    }

    #[test]
    fn test_single_file_layout() {
        let output = output(WriterMode::default());
        let plan = OutputPlanner::new(&output, "index").plan(&result());

        let paths: Vec<_> = plan.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/out/types.ts"), PathBuf::from("/out/Shared.ts")]
        );

        let types = plan.file(Path::new("/out/types.ts")).unwrap();
        assert_eq!(types.types, vec!["Pet", "Owner"]);
        assert_eq!(types.content, "type Pet;\ntype Owner;\n");
        assert_eq!(
            types.imports,
            vec![ImportedType {
                name: "Id".into(),
                path: "./Shared".into()
            }]
        );

        assert_eq!(plan.exporters.len(), 1);
        assert_eq!(plan.exporters[0].path, PathBuf::from("/out/index.ts"));
        assert_eq!(plan.exporters[0].modules, vec!["types", "Shared"]);
    }

    #[test]
    fn test_files_and_folders_layout() {
        let output = output(WriterMode {
            types: TypesWriterMode::Files,
            grouped_types: GroupedTypesWriterMode::FolderWithFiles,
        });
        let plan = OutputPlanner::new(&output, "index").plan(&result());

        let pet = plan.file(Path::new("/out/Pet.ts")).unwrap();
        let imports: Vec<_> = pet.imports.iter().map(|i| (i.name.as_str(), i.path.as_str())).collect();
        assert_eq!(imports, vec![("Id", "./Shared/Id"), ("Owner", "./Owner")]);

        assert!(plan.file(Path::new("/out/Shared/Id.ts")).is_some());
        assert_eq!(plan.exporters[0].modules, vec!["Pet", "Owner", "Shared"]);
        assert_eq!(plan.exporters[1].path, PathBuf::from("/out/Shared/index.ts"));
        assert_eq!(plan.exporters[1].modules, vec!["Id"]);
    }

    #[test]
    fn test_unknown_reference_is_skipped() {
        let output = output(WriterMode {
            types: TypesWriterMode::Files,
            grouped_types: GroupedTypesWriterMode::SingleFile,
        });
        let plan = OutputPlanner::new(&output, "index").plan(&result());

        let owner = plan.file(Path::new("/out/Owner.ts")).unwrap();
        let names: Vec<_> = owner.imports.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Pet"]);
    }

    #[test]
    fn test_types_without_content_are_not_declared() {
        let mut result = GenerationResult::default();
        let mut alias = record("Id", &[]);
        alias.content.clear();
        result.types.insert("Id".into(), alias);

        let output = output(WriterMode::default());
        let plan = OutputPlanner::new(&output, "index").plan(&result);
        assert!(plan.files.is_empty());
        assert!(plan.exporters.is_empty());
    }
}
