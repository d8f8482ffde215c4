//! The resolved project model shared by every rule.

use crate::entity::{Entity, EntityKey, EntityKind, Field};
use lkml_core::{Document, EntityName, SourceLocation};
use std::collections::{BTreeMap, HashMap};

/// Position of an entity in the model's arena.
pub type EntityId = usize;

/// One consistent view of all documents of a project.
///
/// Built once per run and read-only afterwards; rules receive it behind an
/// `Arc`.
#[derive(Debug, Default)]
pub struct ProjectModel {
    entities: Vec<Entity>,
    index: BTreeMap<EntityKey, EntityId>,
    documents: Vec<Document>,
    document_index: HashMap<String, usize>,
    provenance: BTreeMap<String, Vec<SourceLocation>>,
}

impl ProjectModel {
    pub(crate) fn new(
        entities: Vec<Entity>,
        documents: Vec<Document>,
        provenance: BTreeMap<String, Vec<SourceLocation>>,
    ) -> Self {
        let index = entities
            .iter()
            .enumerate()
            .map(|(id, e)| (e.key.clone(), id))
            .collect();
        let document_index = documents
            .iter()
            .enumerate()
            .map(|(i, d)| (d.path.clone(), i))
            .collect();
        Self {
            entities,
            index,
            documents,
            document_index,
            provenance,
        }
    }

    /// All entities in definition order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, kind: EntityKind, name: &str) -> Option<&Entity> {
        let key = EntityKey::new(kind, EntityName::try_new(name)?);
        self.index.get(&key).map(|&id| &self.entities[id])
    }

    pub fn view(&self, name: &str) -> Option<&Entity> {
        self.entity(EntityKind::View, name)
    }

    pub fn explore(&self, name: &str) -> Option<&Entity> {
        self.entity(EntityKind::Explore, name)
    }

    pub fn views(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.kind() == EntityKind::View)
    }

    pub fn explores(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(|e| e.kind() == EntityKind::Explore)
    }

    /// Every field of every view that is not `extension: required`.
    ///
    /// These are the instances field rules run against.
    pub fn view_fields(&self) -> impl Iterator<Item = (&Entity, &Field)> {
        self.views()
            .filter(|v| !v.extension_required)
            .flat_map(|v| v.fields.iter().map(move |f| (v, f)))
    }

    /// Documents in input order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, path: &str) -> Option<&Document> {
        self.document_index.get(path).map(|&i| &self.documents[i])
    }

    /// Document paths in input order.
    pub fn document_paths(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.path.clone()).collect()
    }

    /// Every location that defined, refined or overrode `qualified`
    /// (`view:orders`, `explore:orders`, `orders.id`).
    pub fn provenance(&self, qualified: &str) -> &[SourceLocation] {
        self.provenance
            .get(qualified)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}
