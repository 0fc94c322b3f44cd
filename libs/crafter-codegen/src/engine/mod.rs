//! Type resolution engine
//!
//! Walks the schema graph depth-first and turns every named type into a
//! [`GeneratedType`]. One [`TypeResolver`] is built per generation run; it
//! owns the reference cache, so nothing leaks between runs.
//!
//! Cycles are broken in two places:
//! - the ancestry chain of names on the current path, for inline nesting
//! - the set of reference keys currently being expanded, for `$ref` loops
//!
//! Both produce a degenerate back-reference record that names the type
//! without expanding it again.

use crate::config::TypeMapperConfig;
use crate::error::Result;
use crate::ir::{
    Composition, EnumTemplateInput, GeneratedType, GeneratedTypes, GenerationResult,
    ObjectProperty, ObjectTemplateInput, OneOfTemplateInput, TemplateInput,
    VariableTemplateInput,
};
use crate::mapper::TypeMapper;
use crate::resolver::{Document, DocumentLoader, ReferenceKind, ReferenceMeta, ReferenceResolver};
use crate::spec::{
    ArraySchema, DataType, EnumSchema, GroupEntry, Metadata, ObjectSchema, PrimitiveSchema,
    Schema, SpecFileData, UnionSchema,
};
use crate::templates::TemplateRenderer;
use crate::utils::to_pascal_case;
use indexmap::IndexMap;
use serde_yaml::Value;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

/// Primitive marker added by every array.
pub const ARRAY_PRIMITIVE: &str = "Array";

/// A memoised `$ref` expansion.
#[derive(Debug, Clone)]
pub struct CachedReference {
    pub meta: ReferenceMeta,
    pub record: GeneratedType,
}

/// Names being expanded on the current path, innermost first.
struct Ancestry<'p> {
    name: &'p str,
    parent: Option<&'p Ancestry<'p>>,
}

fn in_ancestry<'p>(mut current: Option<&'p Ancestry<'p>>, name: &str) -> bool {
    while let Some(frame) = current {
        if frame.name == name {
            return true;
        }
        current = frame.parent;
    }
    false
}

pub struct TypeResolver<'a> {
    mapper: TypeMapper<'a>,
    renderer: &'a dyn TemplateRenderer,
    references: ReferenceResolver<'a>,
    cache: IndexMap<String, CachedReference>,
    /// Reference key → target name, for expansions still on the stack
    in_progress: HashMap<String, String>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(
        type_mapper: &'a TypeMapperConfig,
        renderer: &'a dyn TemplateRenderer,
        loader: &'a dyn DocumentLoader,
        root: Document,
    ) -> Self {
        Self {
            mapper: TypeMapper::new(type_mapper),
            renderer,
            references: ReferenceResolver::new(loader, root),
            cache: IndexMap::new(),
            in_progress: HashMap::new(),
        }
    }

    /// Every reference expanded so far, in first-use order.
    pub fn reference_cache(&self) -> &IndexMap<String, CachedReference> {
        &self.cache
    }

    /// Resolve the top-level types and every group of a decoded spec file.
    pub fn resolve_all(&mut self, spec: &SpecFileData) -> Result<GenerationResult> {
        let root = Rc::clone(self.references.root());
        let mut result = GenerationResult::default();

        if let Some(types) = &spec.types {
            result.types = self.resolve_type_map(types, &root)?;
        }

        if let Some(groups) = &spec.grouped_types {
            for (group_name, entry) in groups {
                let generated = match entry {
                    GroupEntry::Types(types) => self.resolve_type_map(types, &root)?,
                    GroupEntry::Reference(reference) => {
                        let group = self.references.resolve_group_reference(reference, &root)?;
                        tracing::debug!(
                            group = %group_name,
                            source = %group.meta.source_file,
                            "Resolved group reference"
                        );
                        self.resolve_type_map(&group.types, &group.document)?
                    }
                };
                result.grouped_types.insert(group_name.clone(), generated);
            }
        }

        self.surface_external_references(&mut result.grouped_types);
        Ok(result)
    }

    /// Resolve an ordered `name → schema` map. Entries that are a bare `$ref`
    /// are expanded (and cached) but left out of the result.
    pub fn resolve_type_map(
        &mut self,
        types: &IndexMap<String, Value>,
        scope: &Rc<Document>,
    ) -> Result<GeneratedTypes> {
        let mut generated = GeneratedTypes::new();
        for (name, raw) in types {
            let schema = Schema::decode(raw, name)?;
            let mut record = self.resolve_type(name, &schema, None, scope)?;
            if schema.is_reference() {
                continue;
            }
            record.references.remove(name);
            generated.insert(name.clone(), record);
        }
        Ok(generated)
    }

    fn resolve_type(
        &mut self,
        name: &str,
        schema: &Schema,
        ancestry: Option<&Ancestry<'_>>,
        scope: &Rc<Document>,
    ) -> Result<GeneratedType> {
        if in_ancestry(ancestry, name) {
            tracing::debug!(type_name = name, "Cyclic type on current path");
            return Ok(back_reference(name, false));
        }
        let frame = Ancestry {
            name,
            parent: ancestry,
        };

        match schema {
            Schema::Object(object) => self.resolve_object(name, object, &frame, scope),
            Schema::Enum(enumeration) => self.resolve_enum(name, enumeration),
            Schema::Union(union) => self.resolve_union(name, union, &frame, scope),
            Schema::Array(array) => self.resolve_array(name, array, &frame, scope),
            Schema::Reference(reference) => self.resolve_reference(&reference.reference, scope),
            Schema::Primitive(primitive) => self.resolve_primitive(name, primitive),
        }
    }

    fn resolve_object(
        &mut self,
        name: &str,
        object: &ObjectSchema,
        ancestry: &Ancestry<'_>,
        scope: &Rc<Document>,
    ) -> Result<GeneratedType> {
        let mut references = BTreeSet::new();
        let mut primitives = BTreeSet::new();
        let mut nested = String::new();
        let mut enums = String::new();
        let mut properties = IndexMap::with_capacity(object.properties.len());

        for (property_name, schema) in &object.properties {
            let referenced = schema.is_reference();
            let record = match schema {
                Schema::Reference(reference) => self.resolve_reference(&reference.reference, scope)?,
                Schema::Enum(_) => {
                    let enum_name = format!("{}Enum", to_pascal_case(property_name));
                    let record = self.resolve_type(&enum_name, schema, Some(ancestry), scope)?;
                    enums.push_str(&record.content);
                    record
                }
                Schema::Object(_) => {
                    let nested_name = to_pascal_case(property_name);
                    let record = self.resolve_type(&nested_name, schema, Some(ancestry), scope)?;
                    nested.push_str(&record.content);
                    record
                }
                Schema::Union(union) => {
                    let union_name = to_pascal_case(property_name);
                    let frame = Ancestry {
                        name: &union_name,
                        parent: Some(ancestry),
                    };
                    let record = self.resolve_union(&union_name, union, &frame, scope)?;
                    nested.push_str(&record.content);
                    record
                }
                // arrays and primitives declare no type of their own, so a
                // same-named ancestor is not a cycle
                Schema::Array(array) => {
                    let record = self.resolve_array(property_name, array, ancestry, scope)?;
                    nested.push_str(&record.content);
                    record
                }
                Schema::Primitive(primitive) => self.resolve_primitive(property_name, primitive)?,
            };

            references.extend(record.references.iter().cloned());
            primitives.extend(record.primitives.iter().cloned());

            let data_type = if referenced {
                record.template_input.type_name()
            } else {
                record.template_input.data_type()
            };

            properties.insert(
                property_name.clone(),
                ObjectProperty {
                    data_type: data_type.to_string(),
                    required: object.is_required(property_name),
                    referenced,
                    primitive_type: schema
                        .declared_type()
                        .unwrap_or(DataType::Object)
                        .to_string(),
                    composer_type: record.template_input.composer_type().map(String::from),
                    meta: schema.meta().clone(),
                },
            );
        }

        let input = ObjectTemplateInput {
            type_name: name.to_string(),
            data_type: name.to_string(),
            properties,
            meta: object.meta.clone(),
        };

        let mut content = self.renderer.render_object(&input)?;
        content.push_str(&nested);
        content.push_str(&enums);

        Ok(GeneratedType {
            content,
            references,
            primitives,
            template_input: TemplateInput::Object(input),
        })
    }

    fn resolve_enum(&mut self, name: &str, enumeration: &EnumSchema) -> Result<GeneratedType> {
        let input = EnumTemplateInput {
            type_name: name.to_string(),
            data_type: name.to_string(),
            enum_type: enumeration.data_type.to_string(),
            values: enumeration.values.clone(),
            meta: enumeration.meta.clone(),
        };
        let content = self.renderer.render_enum(&input)?;

        let mut record = GeneratedType::new(TemplateInput::Enum(input));
        record.content = content;
        Ok(record)
    }

    fn resolve_union(
        &mut self,
        name: &str,
        union: &UnionSchema,
        ancestry: &Ancestry<'_>,
        scope: &Rc<Document>,
    ) -> Result<GeneratedType> {
        let mut references = BTreeSet::new();
        let mut primitives = BTreeSet::new();
        let mut side_content = String::new();
        let mut compositions = Vec::with_capacity(union.variants.len());

        for (index, variant) in union.variants.iter().enumerate() {
            if let Schema::Reference(reference) = variant {
                let record = self.resolve_reference(&reference.reference, scope)?;
                let referenced_type = record.template_input.type_name().to_string();
                references.insert(referenced_type.clone());
                compositions.push(Composition::Referenced { referenced_type });
                continue;
            }

            let branch_name = format!("{name}{}", index + 1);
            let record = self.resolve_type(&branch_name, variant, Some(ancestry), scope)?;
            references.extend(record.references.iter().cloned());
            primitives.extend(record.primitives.iter().cloned());
            side_content.push_str(&record.content);
            compositions.push(Composition::Inline {
                data_type: variant.declared_type().map(|t| t.to_string()),
                template_input: Box::new(record.template_input),
                content: record.content,
            });
        }

        let input = OneOfTemplateInput {
            type_name: name.to_string(),
            data_type: name.to_string(),
            compositions,
            meta: union.meta.clone(),
        };

        let mut content = self.renderer.render_one_of(&input)?;
        content.push_str(&side_content);

        Ok(GeneratedType {
            content,
            references,
            primitives,
            template_input: TemplateInput::OneOf(input),
        })
    }

    fn resolve_array(
        &mut self,
        name: &str,
        array: &ArraySchema,
        ancestry: &Ancestry<'_>,
        scope: &Rc<Document>,
    ) -> Result<GeneratedType> {
        let item_name = format!("{}Item", to_pascal_case(name));
        let item = self.resolve_type(&item_name, &array.items, Some(ancestry), scope)?;

        // referenced items are declared elsewhere
        let (item_type, content) = if array.items.is_reference() {
            (item.template_input.type_name().to_string(), String::new())
        } else {
            (item.template_input.data_type().to_string(), item.content)
        };

        let input = VariableTemplateInput {
            type_name: name.to_string(),
            data_type: self.mapper.fill_array(&item_type)?,
            composer_type: Some(item_type),
            meta: array.meta.clone(),
        };

        let mut primitives = item.primitives;
        primitives.insert(ARRAY_PRIMITIVE.to_string());

        Ok(GeneratedType {
            content,
            references: item.references,
            primitives,
            template_input: TemplateInput::Variable(input),
        })
    }

    /// Expand a `$ref` at most once per run.
    fn resolve_reference(&mut self, reference: &str, scope: &Rc<Document>) -> Result<GeneratedType> {
        let key = if self.references.is_root(scope) {
            reference.to_string()
        } else {
            format!("{}::{reference}", scope.path.display())
        };

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(reference, "Reference cache hit");
            return Ok(cached.record.clone());
        }
        if let Some(name) = self.in_progress.get(&key) {
            tracing::debug!(reference, type_name = %name, "Cyclic reference");
            return Ok(back_reference(name, true));
        }

        tracing::debug!(reference, "Reference cache miss");
        let resolved = self.references.resolve_type_reference(reference, scope)?;
        let name = resolved.meta.name.clone();

        self.in_progress.insert(key.clone(), name.clone());
        let expanded = self.resolve_type(&name, &resolved.schema, None, &resolved.document);
        self.in_progress.remove(&key);

        let mut record = expanded?;
        if !resolved.schema.is_reference() {
            record.references.insert(name);
        }

        self.cache.insert(
            key,
            CachedReference {
                meta: resolved.meta,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    fn resolve_primitive(&mut self, name: &str, primitive: &PrimitiveSchema) -> Result<GeneratedType> {
        let mapped = self
            .mapper
            .map_primitive(primitive.data_type, primitive.format.as_deref())?;

        let mut record = GeneratedType::new(TemplateInput::Variable(VariableTemplateInput {
            type_name: name.to_string(),
            data_type: mapped.clone(),
            composer_type: None,
            meta: primitive.meta.clone(),
        }));
        record.primitives.insert(mapped);
        Ok(record)
    }

    /// Declare every type pulled in from another file under a group named
    /// after that file.
    fn surface_external_references(&self, groups: &mut IndexMap<String, GeneratedTypes>) {
        for cached in self.cache.values() {
            if cached.meta.kind != ReferenceKind::Remote
                || cached.record.template_input.type_name() != cached.meta.name
            {
                continue;
            }

            let stem = cached
                .meta
                .complete_source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| cached.meta.source_file.clone());
            let group_name = to_pascal_case(&stem);

            let mut record = cached.record.clone();
            record.references.remove(&cached.meta.name);

            tracing::debug!(
                group = %group_name,
                type_name = %cached.meta.name,
                "Surfacing external type"
            );
            groups
                .entry(group_name)
                .or_default()
                .insert(cached.meta.name.clone(), record);
        }
    }
}

/// Record standing in for a type whose expansion is already on the stack.
fn back_reference(name: &str, referenced: bool) -> GeneratedType {
    let mut record = GeneratedType::new(TemplateInput::Variable(VariableTemplateInput {
        type_name: name.to_string(),
        data_type: name.to_string(),
        composer_type: None,
        meta: Metadata::default(),
    }));
    if referenced {
        record.references.insert(name.to_string());
    }
    record
}
