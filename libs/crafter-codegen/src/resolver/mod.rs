//! Reference resolution
//!
//! Turns a `$ref` string into the schema node (or named group of nodes) it
//! points at. Three syntaxes exist:
//! - `#/types/Pet` – a pointer into the document that contains the reference
//! - `common.yaml#/types/Id` – a pointer into another file, relative to the
//!   directory of the referencing document
//! - `https://...` – rejected as unsupported
//!
//! External documents are loaded through a [`DocumentLoader`] and kept for the
//! rest of the run.

mod loader;

pub use loader::{Document, DocumentLoader, FsDocumentLoader};

use crate::error::{Error, Result};
use crate::spec::{decode_type_map, Schema};
use crate::utils::normalize_path;
use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

/// Where a reference target lives relative to the run's input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Local,
    Remote,
    Url,
}

impl ReferenceKind {
    /// Classify a reference string by syntax alone.
    pub fn classify(reference: &str) -> Self {
        if reference.starts_with('#') {
            ReferenceKind::Local
        } else if has_url_scheme(reference) {
            ReferenceKind::Url
        } else {
            ReferenceKind::Remote
        }
    }
}

fn has_url_scheme(reference: &str) -> bool {
    match reference.find("://") {
        Some(end) if end > 0 => {
            let scheme = &reference[..end];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Facts derived from a resolved reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceMeta {
    /// Absolute path of the document holding the target
    pub complete_source: PathBuf,
    /// File name of `complete_source`
    pub source_file: String,
    /// Key path inside the document
    pub path: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    /// Last path segment; the generated type (or group) name
    pub name: String,
}

/// A reference that points at a single schema node.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    pub schema: Schema,
    pub meta: ReferenceMeta,
    /// Document the target came from; nested references resolve against it
    pub document: Rc<Document>,
}

/// A reference that points at a whole group of types.
#[derive(Debug, Clone)]
pub struct ResolvedGroup {
    pub types: IndexMap<String, Value>,
    pub meta: ReferenceMeta,
    pub document: Rc<Document>,
}

pub struct ReferenceResolver<'a> {
    loader: &'a dyn DocumentLoader,
    root: Rc<Document>,
    documents: HashMap<PathBuf, Rc<Document>>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(loader: &'a dyn DocumentLoader, root: Document) -> Self {
        Self {
            loader,
            root: Rc::new(root),
            documents: HashMap::new(),
        }
    }

    /// The run's input document.
    pub fn root(&self) -> &Rc<Document> {
        &self.root
    }

    pub fn is_root(&self, document: &Document) -> bool {
        document.path == self.root.path
    }

    /// Resolve a reference to a single schema node.
    pub fn resolve_type_reference(
        &mut self,
        reference: &str,
        scope: &Rc<Document>,
    ) -> Result<ResolvedType> {
        let (document, meta) = self.locate(reference, scope)?;
        let value = read_nested_value(&document.value, &meta.path, reference)?;
        let schema = Schema::decode(value, &meta.name)?;
        Ok(ResolvedType {
            schema,
            meta,
            document,
        })
    }

    /// Resolve a reference to a named group of schema nodes.
    pub fn resolve_group_reference(
        &mut self,
        reference: &str,
        scope: &Rc<Document>,
    ) -> Result<ResolvedGroup> {
        let (document, meta) = self.locate(reference, scope)?;
        let value = read_nested_value(&document.value, &meta.path, reference)?;
        let types = decode_type_map(value, &meta.name)?;
        Ok(ResolvedGroup {
            types,
            meta,
            document,
        })
    }

    fn locate(
        &mut self,
        reference: &str,
        scope: &Rc<Document>,
    ) -> Result<(Rc<Document>, ReferenceMeta)> {
        let (document, pointer) = match ReferenceKind::classify(reference) {
            ReferenceKind::Url => {
                return Err(Error::unsupported(format!(
                    "URL references are not supported yet: {reference}"
                )))
            }
            ReferenceKind::Local => (Rc::clone(scope), &reference[1..]),
            ReferenceKind::Remote => {
                let (file, pointer) = reference.split_once('#').ok_or_else(|| {
                    Error::invalid_spec(format!("Invalid reference at: {reference}"))
                })?;
                let path = normalize_path(&scope.directory().join(file));
                (self.document(path)?, pointer)
            }
        };

        let path = parse_pointer(pointer);
        let name = path
            .last()
            .cloned()
            .ok_or_else(|| Error::invalid_spec(format!("Invalid reference at: {reference}")))?;

        let kind = if self.is_root(&document) {
            ReferenceKind::Local
        } else {
            ReferenceKind::Remote
        };

        let meta = ReferenceMeta {
            source_file: document
                .path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default(),
            complete_source: document.path.clone(),
            path,
            kind,
            name,
        };
        Ok((document, meta))
    }

    /// Fetch a document, loading it on first use.
    fn document(&mut self, path: PathBuf) -> Result<Rc<Document>> {
        if path == self.root.path {
            return Ok(Rc::clone(&self.root));
        }
        if let Some(document) = self.documents.get(&path) {
            return Ok(Rc::clone(document));
        }

        tracing::debug!(path = %path.display(), "Loading referenced document");
        let value = self.loader.load(&path)?;
        let document = Rc::new(Document::new(path.clone(), value));
        self.documents.insert(path, Rc::clone(&document));
        Ok(document)
    }
}

/// Split a `/a/b~1c` pointer into unescaped segments.
fn parse_pointer(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Walk `keys` through nested mappings.
pub fn read_nested_value<'v>(value: &'v Value, keys: &[String], reference: &str) -> Result<&'v Value> {
    keys.iter().try_fold(value, |current, key| {
        current
            .as_mapping()
            .and_then(|mapping| mapping.get(key.as_str()))
            .ok_or_else(|| {
                Error::invalid_spec(format!(
                    "Invalid reference path for: {reference} (no '{key}')"
                ))
            })
    })
}
