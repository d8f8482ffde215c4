//! Resolved views, explores and their members.

use lkml_core::{Block, BlockKind, EntityName, Property, SourceLocation, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a top-level entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    View,
    Explore,
}

impl EntityKind {
    /// Entity kind of a top-level block, if it declares one.
    pub fn from_block_kind(kind: &BlockKind) -> Option<Self> {
        match kind {
            BlockKind::View => Some(EntityKind::View),
            BlockKind::Explore => Some(EntityKind::Explore),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::View => "view",
            EntityKind::Explore => "explore",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique key of an entity in the project model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub name: EntityName,
}

impl EntityKey {
    pub fn new(kind: EntityKind, name: EntityName) -> Self {
        Self { kind, name }
    }
}

/// Renders as the qualified name used in violations and provenance
/// (`view:orders`).
impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// Whether an entity could be resolved completely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Resolution {
    Complete,
    /// Part of the extends chain was missing or cyclic
    Degraded(String),
}

/// A dimension, dimension group, measure, filter or parameter of a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub kind: BlockKind,
    pub name: String,
    /// View the field belongs to after resolution
    pub view: EntityName,
    /// View whose block defines the winning definition
    pub declared_in: EntityName,
    /// The winning definition
    pub block: Block,
    pub location: SourceLocation,
    /// Earlier definitions this one replaced, least-derived first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overridden: Vec<SourceLocation>,
}

impl Field {
    /// Field for a named field block declared directly in `view`.
    pub fn from_block(block: &Block, view: &EntityName) -> Option<Self> {
        if !block.kind.is_field() {
            return None;
        }
        let name = block.name.clone()?;
        Some(Self {
            kind: block.kind.clone(),
            name,
            view: view.clone(),
            declared_in: view.clone(),
            block: block.clone(),
            location: block.location.clone(),
            overridden: Vec::new(),
        })
    }

    /// `view.field`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.view, self.name)
    }

    pub fn field_type(&self) -> Option<&str> {
        self.block.field_type()
    }

    pub fn is_hidden(&self) -> bool {
        self.block.is_hidden()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.block.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.block.get_str(name)
    }

    /// Returns true if the field came from a base view.
    pub fn is_inherited(&self) -> bool {
        self.declared_in != self.view
    }

    pub fn is_primary_key(&self) -> bool {
        self.get("primary_key").is_some_and(Value::is_truthy)
    }

    /// Returns true if `${reference}` inside the owning view resolves to
    /// this field.
    ///
    /// Dimension groups answer to their generated names: `created_date`
    /// for a time group `created`, `days_open` for a duration group
    /// `open`. Without an explicit `timeframes`/`intervals` list any
    /// generated suffix is accepted.
    pub fn answers_to(&self, reference: &str) -> bool {
        if reference == self.name {
            return true;
        }
        if self.kind != BlockKind::DimensionGroup {
            return false;
        }
        if self.field_type() == Some("duration") {
            let suffix = format!("s_{}", self.name);
            return match self.get("intervals") {
                Some(intervals) => intervals
                    .strings()
                    .iter()
                    .any(|i| reference == format!("{i}{suffix}")),
                None => reference.len() > suffix.len() && reference.ends_with(&suffix),
            };
        }
        let prefix = format!("{}_", self.name);
        match self.get("timeframes") {
            Some(timeframes) => timeframes
                .strings()
                .iter()
                .any(|t| reference == format!("{prefix}{t}")),
            None => reference.len() > prefix.len() && reference.starts_with(&prefix),
        }
    }
}

/// A join of an explore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    /// Alias the join is referenced by
    pub name: String,
    pub explore: EntityName,
    pub declared_in: EntityName,
    pub block: Block,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overridden: Vec<SourceLocation>,
}

impl Join {
    pub fn from_block(block: &Block, explore: &EntityName) -> Option<Self> {
        if block.kind != BlockKind::Join {
            return None;
        }
        let name = block.name.clone()?;
        Some(Self {
            name,
            explore: explore.clone(),
            declared_in: explore.clone(),
            block: block.clone(),
            location: block.location.clone(),
            overridden: Vec::new(),
        })
    }

    /// View the join reads from: `from:` or the alias itself.
    pub fn target_view(&self) -> &str {
        self.block.get_str("from").unwrap_or(&self.name)
    }
}

/// A view or explore after refinements and extends are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub key: EntityKey,
    /// Primary (first non-refinement) definition
    pub location: SourceLocation,
    /// Declared bases, in declaration order
    pub extends: Vec<EntityName>,
    /// Merged properties; lookup is last-wins like on a block
    pub properties: Vec<Property>,
    /// Merged fields (views only)
    pub fields: Vec<Field>,
    /// Merged joins (explores only)
    pub joins: Vec<Join>,
    /// Other named children (sets, aggregate tables, ...)
    pub other_children: Vec<Block>,
    /// Locations of refinements applied to this entity, in input order
    pub refinements: Vec<SourceLocation>,
    /// `extension: required` was set on the entity itself
    pub extension_required: bool,
    pub resolution: Resolution,
}

impl Entity {
    pub fn name(&self) -> &str {
        self.key.name.as_str()
    }

    pub fn kind(&self) -> EntityKind {
        self.key.kind
    }

    /// `view:orders`
    pub fn qualified_name(&self) -> String {
        self.key.to_string()
    }

    /// File of the primary definition.
    pub fn path(&self) -> &str {
        &self.location.path
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().rev().find(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.property(name).map(|p| &p.value)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Field by exact name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field a `${reference}` resolves to, dimension group names included.
    pub fn resolve_field(&self, reference: &str) -> Option<&Field> {
        self.field(reference)
            .or_else(|| self.fields.iter().find(|f| f.answers_to(reference)))
    }

    pub fn join(&self, alias: &str) -> Option<&Join> {
        self.joins.iter().find(|j| j.name == alias)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.resolution, Resolution::Degraded(_))
    }

    /// Views backed by a `derived_table`.
    pub fn is_derived_table(&self) -> bool {
        self.get("derived_table").is_some()
    }

    /// View name the explore starts from: `from:`, `view_name:` or its own name.
    pub fn base_view_name(&self) -> &str {
        self.get_str("from")
            .or_else(|| self.get_str("view_name"))
            .unwrap_or(self.name())
    }

    /// Alias the explore's base view is referenced by in `${alias.field}`.
    pub fn base_alias(&self) -> &str {
        if self.get_str("from").is_some() {
            self.name()
        } else {
            self.get_str("view_name").unwrap_or(self.name())
        }
    }
}

#[cfg(test)]
#[path = "entity_test.rs"]
mod tests;
