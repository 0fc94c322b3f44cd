//! Bundled language presets

use super::{
    Configuration, LanguageConfig, OutputConfig, TemplateConfig, TypeMapperConfig, TypeMapping,
    WriterMode,
};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::path::Path;

const TS_OBJECT: &str = include_str!("../../templates/typescript/object.tera");
const TS_ENUM: &str = include_str!("../../templates/typescript/enum.tera");
const TS_ONE_OF: &str = include_str!("../../templates/typescript/one-of.tera");
const TS_EXPORTER_MODULE: &str = include_str!("../../templates/typescript/exporter-module.tera");
const TS_TYPES_FILE: &str = include_str!("../../templates/typescript/types-file.tera");

const TSD_OBJECT: &str = include_str!("../../templates/typescript-with-decoders/object.tera");
const TSD_ENUM: &str = include_str!("../../templates/typescript-with-decoders/enum.tera");
const TSD_ONE_OF: &str = include_str!("../../templates/typescript-with-decoders/one-of.tera");
const TSD_TYPES_FILE: &str =
    include_str!("../../templates/typescript-with-decoders/types-file.tera");

/// Names accepted by [`for_language`].
pub const SUPPORTED_LANGUAGES: &[&str] = &["typescript", "typescript-with-decoders"];

/// Build the bundled configuration for `language` (case-insensitive).
pub fn for_language(
    language: &str,
    input: &Path,
    output_directory: &Path,
    writer_mode: WriterMode,
) -> Result<Configuration> {
    match language.to_lowercase().as_str() {
        "typescript" => Ok(typescript(input, output_directory, writer_mode)),
        "typescript-with-decoders" => Ok(typescript_with_decoders(
            input,
            output_directory,
            writer_mode,
        )),
        _ => Err(Error::LanguageNotSupported(language.to_string())),
    }
}

/// Plain TypeScript type declarations.
pub fn typescript(input: &Path, output_directory: &Path, writer_mode: WriterMode) -> Configuration {
    typescript_configuration(
        input,
        output_directory,
        writer_mode,
        TemplateConfig {
            object_syntax: TS_OBJECT.to_string(),
            exporter_module_syntax: TS_EXPORTER_MODULE.to_string(),
            types_file_syntax: TS_TYPES_FILE.to_string(),
            enum_syntax: Some(TS_ENUM.to_string()),
            one_of_syntax: Some(TS_ONE_OF.to_string()),
        },
    )
}

/// TypeScript declarations plus `decodeX` runtime decoders built on `type-decoder`.
pub fn typescript_with_decoders(
    input: &Path,
    output_directory: &Path,
    writer_mode: WriterMode,
) -> Configuration {
    typescript_configuration(
        input,
        output_directory,
        writer_mode,
        TemplateConfig {
            object_syntax: TSD_OBJECT.to_string(),
            exporter_module_syntax: TS_EXPORTER_MODULE.to_string(),
            types_file_syntax: TSD_TYPES_FILE.to_string(),
            enum_syntax: Some(TSD_ENUM.to_string()),
            one_of_syntax: Some(TSD_ONE_OF.to_string()),
        },
    )
}

fn typescript_configuration(
    input: &Path,
    output_directory: &Path,
    writer_mode: WriterMode,
    template: TemplateConfig,
) -> Configuration {
    Configuration {
        input: input.to_path_buf(),
        output: OutputConfig {
            clean_write: true,
            file_extension: ".ts".to_string(),
            directory: output_directory.to_path_buf(),
            writer_mode,
        },
        template,
        language: LanguageConfig {
            exporter_module_name: "index".to_string(),
            type_mapper: typescript_type_mapper(),
        },
    }
}

/// The TypeScript primitive mapping shared by both presets.
pub fn typescript_type_mapper() -> TypeMapperConfig {
    fn formats(pairs: &[(&str, &str)]) -> TypeMapping {
        TypeMapping::Formats(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<IndexMap<_, _>>(),
        )
    }
    fn direct(value: &str) -> TypeMapping {
        TypeMapping::Direct(value.to_string())
    }

    let mut mapper = TypeMapperConfig::new();
    mapper.insert(
        "string".into(),
        formats(&[("default", "string"), ("date", "Date")]),
    );
    mapper.insert("number".into(), formats(&[("default", "number")]));
    mapper.insert("integer".into(), formats(&[("default", "number")]));
    mapper.insert("boolean".into(), direct("boolean"));
    mapper.insert("array".into(), direct("~ItemType~[]"));
    mapper.insert("object".into(), direct("type"));
    mapper.insert("unknown".into(), direct("unknown"));
    mapper
}
