//! Typed document tree produced by the parser.
//!
//! A [`Document`] is one file; it holds top-level properties (`include`,
//! `connection`, ...) and top-level [`Block`]s (`view`, `explore`, ...).
//! Property lists keep every occurrence in source order. Lookups resolve
//! to the last occurrence, so earlier duplicates stay visible to rules
//! that want to flag them.

use crate::location::SourceLocation;
use serde::{Deserialize, Serialize};

/// Kind of a block, taken from the keyword before the colon.
///
/// Unknown keywords parse into [`BlockKind::Other`] so the grammar stays
/// shape-driven; rules decide whether an unknown kind is a problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockKind {
    View,
    Explore,
    Dimension,
    DimensionGroup,
    Measure,
    Filter,
    Parameter,
    Join,
    Set,
    DerivedTable,
    Datagroup,
    AccessGrant,
    AggregateTable,
    Test,
    Query,
    Materialization,
    Link,
    Action,
    Map,
    Other(String),
}

impl BlockKind {
    /// Map a keyword to its kind.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "view" => BlockKind::View,
            "explore" => BlockKind::Explore,
            "dimension" => BlockKind::Dimension,
            "dimension_group" => BlockKind::DimensionGroup,
            "measure" => BlockKind::Measure,
            "filter" => BlockKind::Filter,
            "parameter" => BlockKind::Parameter,
            "join" => BlockKind::Join,
            "set" => BlockKind::Set,
            "derived_table" => BlockKind::DerivedTable,
            "datagroup" => BlockKind::Datagroup,
            "access_grant" => BlockKind::AccessGrant,
            "aggregate_table" => BlockKind::AggregateTable,
            "test" => BlockKind::Test,
            "query" => BlockKind::Query,
            "materialization" => BlockKind::Materialization,
            "link" => BlockKind::Link,
            "action" => BlockKind::Action,
            "map_layer" => BlockKind::Map,
            other => BlockKind::Other(other.to_string()),
        }
    }

    /// The keyword this kind is written with.
    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::View => "view",
            BlockKind::Explore => "explore",
            BlockKind::Dimension => "dimension",
            BlockKind::DimensionGroup => "dimension_group",
            BlockKind::Measure => "measure",
            BlockKind::Filter => "filter",
            BlockKind::Parameter => "parameter",
            BlockKind::Join => "join",
            BlockKind::Set => "set",
            BlockKind::DerivedTable => "derived_table",
            BlockKind::Datagroup => "datagroup",
            BlockKind::AccessGrant => "access_grant",
            BlockKind::AggregateTable => "aggregate_table",
            BlockKind::Test => "test",
            BlockKind::Query => "query",
            BlockKind::Materialization => "materialization",
            BlockKind::Link => "link",
            BlockKind::Action => "action",
            BlockKind::Map => "map_layer",
            BlockKind::Other(s) => s,
        }
    }

    /// Dimensions, dimension groups, measures, filters and parameters.
    pub fn is_field(&self) -> bool {
        matches!(
            self,
            BlockKind::Dimension
                | BlockKind::DimensionGroup
                | BlockKind::Measure
                | BlockKind::Filter
                | BlockKind::Parameter
        )
    }

    /// Returns true if the keyword is part of the known vocabulary.
    pub fn is_known(&self) -> bool {
        !matches!(self, BlockKind::Other(_))
    }
}

impl From<String> for BlockKind {
    fn from(s: String) -> Self {
        BlockKind::from_keyword(&s)
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An untyped property value.
///
/// No coercion happens beyond recognising `yes`/`no` and bare numbers;
/// quoted strings are always [`Value::String`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Bare word, quoted string or `;;`-terminated expression
    String(String),
    /// `yes` / `no`
    Bool(bool),
    /// Bare numeric literal
    Number(f64),
    /// Bracketed list
    List(Vec<Value>),
    /// `key: value` item inside a list (e.g. `filters: [status: "done"]`)
    Pair { key: String, value: Box<Value> },
    /// Anonymous nested block (e.g. `derived_table: { ... }`)
    Block(Box<Block>),
}

impl Value {
    /// String content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content, if this is a `yes`/`no` literal.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Value::Block(b) => Some(b),
            _ => None,
        }
    }

    /// Strings of a scalar or of every scalar item in a list.
    ///
    /// `extends: [a, b]` and `extends: a` both yield `["a", "b"]`-style results.
    pub fn strings(&self) -> Vec<&str> {
        match self {
            Value::String(s) => vec![s.as_str()],
            Value::List(items) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Returns true for `yes`, and for the strings `yes`/`true`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::String(s) => s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// One `name: value` entry of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: Value,
    pub location: SourceLocation,
}

/// A named (or anonymous) node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    /// `None` for anonymous blocks such as `derived_table: { ... }`
    pub name: Option<String>,
    /// Properties in source order, duplicates retained
    pub properties: Vec<Property>,
    /// Named nested blocks in source order
    pub children: Vec<Block>,
    pub location: SourceLocation,
}

impl Block {
    /// The block name, or an empty string for anonymous blocks.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Last occurrence of a property.
    pub fn property(&self, name: &str) -> Option<&Property> {
        last_property(&self.properties, name)
    }

    /// Value of the last occurrence of a property.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.property(name).map(|p| &p.value)
    }

    /// String value of a property.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Every occurrence of a property, in source order.
    pub fn occurrences<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> + 'a {
        self.properties.iter().filter(move |p| p.name == name)
    }

    /// Property names declared more than once, with all their occurrences.
    ///
    /// Repeatable keys (`link`, `action`, `include`, ...) are not reported.
    pub fn duplicate_properties(&self) -> Vec<(&str, Vec<&Property>)> {
        let mut seen: Vec<&str> = Vec::new();
        let mut duplicates = Vec::new();
        for prop in &self.properties {
            let name = prop.name.as_str();
            if REPEATABLE_PROPERTIES.contains(&name) || seen.contains(&name) {
                continue;
            }
            seen.push(name);
            let all: Vec<&Property> = self.occurrences(name).collect();
            if all.len() > 1 {
                duplicates.push((name, all));
            }
        }
        duplicates
    }

    /// Field type from the `type:` property (e.g. `string`, `yesno`, `count`).
    pub fn field_type(&self) -> Option<&str> {
        self.get_str("type")
    }

    /// Returns true if `hidden: yes` is set.
    pub fn is_hidden(&self) -> bool {
        self.get("hidden").is_some_and(Value::is_truthy)
    }

    /// Direct children of the given kind.
    pub fn children_of<'a>(&'a self, kind: &'a BlockKind) -> impl Iterator<Item = &'a Block> + 'a {
        self.children.iter().filter(move |b| &b.kind == kind)
    }

    /// Direct child by kind and name.
    pub fn child(&self, kind: &BlockKind, name: &str) -> Option<&Block> {
        self.children
            .iter()
            .find(|b| &b.kind == kind && b.name.as_deref() == Some(name))
    }

    /// Direct children that are fields.
    pub fn fields(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().filter(|b| b.kind.is_field())
    }

    /// This block and every nested block in pre-order, including anonymous
    /// blocks stored as property values.
    pub fn descendants(&self) -> Vec<&Block> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }
}

fn collect_descendants<'a>(block: &'a Block, out: &mut Vec<&'a Block>) {
    out.push(block);
    for prop in &block.properties {
        collect_value_blocks(&prop.value, out);
    }
    for child in &block.children {
        collect_descendants(child, out);
    }
}

fn collect_value_blocks<'a>(value: &'a Value, out: &mut Vec<&'a Block>) {
    match value {
        Value::Block(b) => collect_descendants(b, out),
        Value::List(items) => items.iter().for_each(|v| collect_value_blocks(v, out)),
        Value::Pair { value, .. } => collect_value_blocks(value, out),
        _ => {}
    }
}

/// Keys LookML allows to repeat within one block.
const REPEATABLE_PROPERTIES: &[&str] = &[
    "include",
    "link",
    "action",
    "always_join",
    "access_filter",
    "required_access_grants",
    "aggregate_table",
    "datagroup_trigger",
];

fn last_property<'a>(properties: &'a [Property], name: &str) -> Option<&'a Property> {
    properties.iter().rev().find(|p| p.name == name)
}

/// One parsed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Path as supplied by the loader
    pub path: String,
    /// Top-level scalar properties (`include`, `connection`, ...)
    pub properties: Vec<Property>,
    /// Top-level blocks in source order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Value of the last top-level occurrence of a property.
    pub fn get(&self, name: &str) -> Option<&Value> {
        last_property(&self.properties, name).map(|p| &p.value)
    }

    /// Top-level views, including refinements.
    pub fn views(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.kind == BlockKind::View)
    }

    /// Top-level explores, including refinements.
    pub fn explores(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.kind == BlockKind::Explore)
    }

    /// All `include:` patterns in source order.
    pub fn includes(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|p| p.name == "include")
            .flat_map(|p| p.value.strings())
            .collect()
    }

    /// Returns true for `*.model.lkml` files.
    pub fn is_model_file(&self) -> bool {
        self.file_name().ends_with(".model.lkml")
    }

    /// Returns true for `*.view.lkml` files.
    pub fn is_view_file(&self) -> bool {
        self.file_name().ends_with(".view.lkml")
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str())
    }

    /// File name without its LookML suffix (`orders.view.lkml` -> `orders`).
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        [".view.lkml", ".model.lkml", ".explore.lkml", ".lkml", ".lookml"]
            .iter()
            .find_map(|suffix| name.strip_suffix(suffix))
            .unwrap_or(name)
    }

    /// Every block of the document in pre-order.
    pub fn all_blocks(&self) -> Vec<&Block> {
        self.blocks.iter().flat_map(Block::descendants).collect()
    }
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;
