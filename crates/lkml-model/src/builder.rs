//! Merge parsed documents into a [`ProjectModel`].
//!
//! The build runs in four steps:
//!
//! 1. index top-level views and explores in input order, flagging
//!    conflicting definitions and duplicate fields;
//! 2. apply `+name` refinements onto their targets;
//! 3. find extends cycles on a petgraph of the extends edges and report
//!    each strongly-connected component once;
//! 4. walk every extends chain (bounded by [`MAX_EXTENDS_DEPTH`]) and
//!    merge bases from least- to most-derived.
//!
//! Reference checks run last on the finished model. None of the steps
//! abort: problems become violations and the model is degraded instead.

use crate::entity::{Entity, EntityKey, EntityKind, Field, Join, Resolution};
use crate::error::ResolutionError;
use crate::project::ProjectModel;
use crate::references::check_references;
use lkml_core::{Block, Document, EntityName, Property, SourceLocation, Violation};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashSet};

/// Longest extends chain the walk follows before truncating.
pub const MAX_EXTENDS_DEPTH: usize = 32;

/// Properties that describe the entity itself and are never inherited.
const NON_INHERITED_PROPERTIES: &[&str] = &["extends", "extension"];

/// Result of [`build_project`]: the model plus everything found on the way.
#[derive(Debug)]
pub struct BuildOutcome {
    pub model: ProjectModel,
    /// Resolution violations, in discovery order
    pub violations: Vec<Violation>,
}

/// Build the project model from documents given in input order.
pub fn build_project(documents: Vec<Document>) -> BuildOutcome {
    let mut builder = Builder::default();
    builder.collect(&documents);
    builder.link_extends();
    builder.find_cycles();
    let (entities, provenance) = builder.resolve();

    let model = ProjectModel::new(entities, documents, provenance);
    let mut errors = builder.errors;
    errors.extend(check_references(&model));

    log::debug!(
        "Built project model: {} documents, {} entities, {} resolution problems",
        model.documents().len(),
        model.entity_count(),
        errors.len()
    );

    BuildOutcome {
        violations: errors.iter().map(ResolutionError::to_violation).collect(),
        model,
    }
}

/// Members merged by name: fields of views and joins of explores.
trait Member {
    fn member_name(&self) -> &str;
    fn location(&self) -> &SourceLocation;
    fn overridden_mut(&mut self) -> &mut Vec<SourceLocation>;
    fn set_owner(&mut self, owner: &EntityName);
}

impl Member for Field {
    fn member_name(&self) -> &str {
        &self.name
    }
    fn location(&self) -> &SourceLocation {
        &self.location
    }
    fn overridden_mut(&mut self) -> &mut Vec<SourceLocation> {
        &mut self.overridden
    }
    fn set_owner(&mut self, owner: &EntityName) {
        self.view = owner.clone();
    }
}

impl Member for Join {
    fn member_name(&self) -> &str {
        &self.name
    }
    fn location(&self) -> &SourceLocation {
        &self.location
    }
    fn overridden_mut(&mut self) -> &mut Vec<SourceLocation> {
        &mut self.overridden
    }
    fn set_owner(&mut self, owner: &EntityName) {
        self.explore = owner.clone();
    }
}

/// Replace same-named members wholesale, append new ones.
fn overlay_members<T: Member>(acc: &mut Vec<T>, incoming: Vec<T>) {
    for mut member in incoming {
        match acc.iter().position(|m| m.member_name() == member.member_name()) {
            Some(pos) => {
                let old = &mut acc[pos];
                let mut history = std::mem::take(old.overridden_mut());
                history.push(old.location().clone());
                history.append(member.overridden_mut());
                *member.overridden_mut() = history;
                acc[pos] = member;
            }
            None => acc.push(member),
        }
    }
}

/// Override properties by name. Every occurrence of an overridden name is
/// replaced by the incoming occurrences, at the position of the first one.
fn overlay_properties(acc: &mut Vec<Property>, incoming: &[Property]) {
    let mut names: Vec<&str> = Vec::new();
    for prop in incoming {
        if !names.contains(&prop.name.as_str()) {
            names.push(&prop.name);
        }
    }
    for name in names {
        let replacement = incoming.iter().filter(|p| p.name == name).cloned();
        match acc.iter().position(|p| p.name == name) {
            Some(pos) => {
                let mut rest = acc.split_off(pos);
                rest.retain(|p| p.name != name);
                acc.extend(replacement);
                acc.extend(rest);
            }
            None => acc.extend(replacement),
        }
    }
}

/// Add a member declared in one block, reporting a repeated name. The
/// later declaration wins.
fn add_unique<T: Member>(
    list: &mut Vec<T>,
    member: T,
    key: &EntityKey,
    errors: &mut Vec<ResolutionError>,
) {
    match list.iter().position(|m| m.member_name() == member.member_name()) {
        Some(pos) => {
            errors.push(ResolutionError::DuplicateField {
                entity: key.name.to_string(),
                field: member.member_name().to_string(),
                location: member.location().clone(),
                first: list[pos].location().clone(),
            });
            list[pos] = member;
        }
        None => list.push(member),
    }
}

/// Content contributed by one block (or one resolved chain).
#[derive(Debug, Clone, Default)]
struct Layer {
    properties: Vec<Property>,
    fields: Vec<Field>,
    joins: Vec<Join>,
    others: Vec<Block>,
}

impl Layer {
    /// Layer of a single definition or refinement block.
    fn from_block(block: &Block, key: &EntityKey, errors: &mut Vec<ResolutionError>) -> Self {
        let mut layer = Layer {
            properties: block.properties.clone(),
            ..Layer::default()
        };
        for child in &block.children {
            if let Some(field) = Field::from_block(child, &key.name) {
                add_unique(&mut layer.fields, field, key, errors);
            } else if let Some(join) = Join::from_block(child, &key.name) {
                add_unique(&mut layer.joins, join, key, errors);
            } else {
                match layer
                    .others
                    .iter()
                    .position(|b| b.kind == child.kind && b.name == child.name)
                {
                    Some(pos) => layer.others[pos] = child.clone(),
                    None => layer.others.push(child.clone()),
                }
            }
        }
        layer
    }

    /// Apply a more-derived layer (own definition or refinement) on top.
    fn overlay(&mut self, top: Layer) {
        overlay_properties(&mut self.properties, &top.properties);
        overlay_members(&mut self.fields, top.fields);
        overlay_members(&mut self.joins, top.joins);
        for block in top.others {
            match self
                .others
                .iter()
                .position(|b| b.kind == block.kind && b.name == block.name)
            {
                Some(pos) => self.others[pos] = block,
                None => self.others.push(block),
            }
        }
    }

    /// Apply a resolved base under construction for `owner`.
    fn inherit(&mut self, mut base: Layer, owner: &EntityName) {
        base.properties
            .retain(|p| !NON_INHERITED_PROPERTIES.contains(&p.name.as_str()));
        for field in &mut base.fields {
            field.set_owner(owner);
        }
        for join in &mut base.joins {
            join.set_owner(owner);
        }
        self.overlay(base);
    }

    fn extends(&self) -> Vec<EntityName> {
        self.properties
            .iter()
            .rev()
            .find(|p| p.name == "extends")
            .map(|p| {
                p.value
                    .strings()
                    .into_iter()
                    .filter_map(EntityName::try_new)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn extends_location(&self) -> Option<&SourceLocation> {
        self.properties
            .iter()
            .rev()
            .find(|p| p.name == "extends")
            .map(|p| &p.location)
    }

    fn extension_required(&self) -> bool {
        self.properties
            .iter()
            .rev()
            .find(|p| p.name == "extension")
            .and_then(|p| p.value.as_str())
            == Some("required")
    }
}

/// One entity before extends are resolved.
#[derive(Debug)]
struct Definition {
    key: EntityKey,
    location: SourceLocation,
    /// Own content with refinements applied
    layer: Layer,
    refinements: Vec<SourceLocation>,
    /// Other definitions that collided with this one
    conflicts: Vec<SourceLocation>,
    /// Resolved bases, in declaration order
    bases: Vec<usize>,
    in_cycle: bool,
    degraded: Vec<String>,
}

#[derive(Debug, Default)]
struct Builder {
    definitions: Vec<Definition>,
    index: BTreeMap<EntityKey, usize>,
    errors: Vec<ResolutionError>,
}

impl Builder {
    /// Steps 1 and 2: definitions in input order, then refinements.
    fn collect(&mut self, documents: &[Document]) {
        let mut refinements: Vec<(EntityKind, &str, &Block)> = Vec::new();

        for block in documents.iter().flat_map(|d| d.blocks.iter()) {
            let Some(kind) = EntityKind::from_block_kind(&block.kind) else {
                continue;
            };
            let Some(raw) = block.name.as_deref() else {
                continue;
            };
            if let Some(target) = raw.strip_prefix('+') {
                refinements.push((kind, target, block));
                continue;
            }
            let Some(name) = EntityName::try_new(raw) else {
                continue;
            };
            let key = EntityKey::new(kind, name);
            if let Some(&id) = self.index.get(&key) {
                let first = &mut self.definitions[id];
                self.errors.push(ResolutionError::DuplicateEntity {
                    entity: key.to_string(),
                    location: block.location.clone(),
                    first: first.location.clone(),
                });
                first.conflicts.push(block.location.clone());
                continue;
            }
            let layer = Layer::from_block(block, &key, &mut self.errors);
            self.index.insert(key.clone(), self.definitions.len());
            self.definitions.push(Definition {
                key,
                location: block.location.clone(),
                layer,
                refinements: Vec::new(),
                conflicts: Vec::new(),
                bases: Vec::new(),
                in_cycle: false,
                degraded: Vec::new(),
            });
        }

        for (kind, target, block) in refinements {
            let id = EntityName::try_new(target)
                .and_then(|name| self.index.get(&EntityKey::new(kind, name)).copied());
            let Some(id) = id else {
                self.errors.push(ResolutionError::UnresolvedReference {
                    entity: format!("{kind}:+{target}"),
                    reference: format!("{kind} '{target}'"),
                    reason: "is refined but never defined".to_string(),
                    location: block.location.clone(),
                });
                continue;
            };
            let key = self.definitions[id].key.clone();
            let layer = Layer::from_block(block, &key, &mut self.errors);
            let definition = &mut self.definitions[id];
            definition.layer.overlay(layer);
            definition.refinements.push(block.location.clone());
        }
    }

    /// Resolve every declared base to a definition; report missing ones.
    fn link_extends(&mut self) {
        for id in 0..self.definitions.len() {
            let key = self.definitions[id].key.clone();
            let declared = self.definitions[id].layer.extends();
            for base in declared {
                match self.index.get(&EntityKey::new(key.kind, base.clone())) {
                    Some(&base_id) => self.definitions[id].bases.push(base_id),
                    None => {
                        let definition = &mut self.definitions[id];
                        let location = definition
                            .layer
                            .extends_location()
                            .unwrap_or(&definition.location)
                            .clone();
                        self.errors.push(ResolutionError::ExtendsNotFound {
                            entity: key.to_string(),
                            kind: key.kind.to_string(),
                            base: base.to_string(),
                            location,
                        });
                        definition.degraded.push(format!("base '{base}' not found"));
                    }
                }
            }
        }
    }

    /// Report each extends cycle once, at its first member in input order.
    fn find_cycles(&mut self) {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.definitions.len())
            .map(|id| graph.add_node(id))
            .collect();
        for (id, definition) in self.definitions.iter().enumerate() {
            for &base in &definition.bases {
                graph.add_edge(nodes[id], nodes[base], ());
            }
        }

        for component in tarjan_scc(&graph) {
            let members: HashSet<usize> = component.iter().map(|n| graph[*n]).collect();
            let cyclic = members.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| graph.contains_edge(n, n));
            if !cyclic {
                continue;
            }
            let Some(&start) = members.iter().min() else {
                continue;
            };
            let path = self.cycle_path(start, &members);
            let cycle = path
                .iter()
                .map(|&id| self.definitions[id].key.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            self.errors.push(ResolutionError::ExtendsCycle {
                entity: self.definitions[start].key.to_string(),
                cycle,
                location: self.definitions[start].location.clone(),
            });
            for &id in &members {
                let definition = &mut self.definitions[id];
                definition.in_cycle = true;
                definition.degraded.push("extends cycle".to_string());
            }
        }
    }

    /// A path from `start` back to itself through `members`, following
    /// bases in declaration order.
    fn cycle_path(&self, start: usize, members: &HashSet<usize>) -> Vec<usize> {
        fn walk(
            definitions: &[Definition],
            node: usize,
            start: usize,
            members: &HashSet<usize>,
            path: &mut Vec<usize>,
            visited: &mut HashSet<usize>,
        ) -> bool {
            for &next in &definitions[node].bases {
                if !members.contains(&next) {
                    continue;
                }
                if next == start {
                    path.push(start);
                    return true;
                }
                if visited.insert(next) {
                    path.push(next);
                    if walk(definitions, next, start, members, path, visited) {
                        return true;
                    }
                    path.pop();
                }
            }
            false
        }

        let mut path = vec![start];
        let mut visited = HashSet::from([start]);
        if !walk(&self.definitions, start, start, members, &mut path, &mut visited) {
            path.push(start);
        }
        path
    }

    /// Step 4: resolve every definition into an entity and record
    /// provenance.
    fn resolve(&mut self) -> (Vec<Entity>, BTreeMap<String, Vec<SourceLocation>>) {
        let mut walk = Walk {
            definitions: &self.definitions,
            memo: vec![None; self.definitions.len()],
        };
        let mut entities = Vec::with_capacity(self.definitions.len());
        let mut provenance: BTreeMap<String, Vec<SourceLocation>> = BTreeMap::new();
        let mut too_deep = Vec::new();

        for (id, definition) in self.definitions.iter().enumerate() {
            let resolved = walk.resolve(id, &mut Vec::new());
            let mut degraded = resolved.degraded;
            if resolved.truncated {
                too_deep.push(ResolutionError::ExtendsTooDeep {
                    entity: definition.key.to_string(),
                    max_depth: MAX_EXTENDS_DEPTH,
                    location: definition.location.clone(),
                });
                degraded.push("extends chain truncated".to_string());
            }

            let qualified = definition.key.to_string();
            let history = provenance.entry(qualified).or_default();
            history.push(definition.location.clone());
            history.extend(definition.refinements.iter().cloned());
            history.extend(definition.conflicts.iter().cloned());
            if definition.key.kind == EntityKind::View {
                for field in &resolved.layer.fields {
                    let history = provenance.entry(field.qualified_name()).or_default();
                    history.extend(field.overridden.iter().cloned());
                    history.push(field.location.clone());
                }
            }

            let layer = resolved.layer;
            entities.push(Entity {
                key: definition.key.clone(),
                location: definition.location.clone(),
                extends: definition.layer.extends(),
                extension_required: definition.layer.extension_required(),
                properties: layer.properties,
                fields: layer.fields,
                joins: layer.joins,
                other_children: layer.others,
                refinements: definition.refinements.clone(),
                resolution: if degraded.is_empty() {
                    Resolution::Complete
                } else {
                    Resolution::Degraded(degraded.join("; "))
                },
            });
        }

        self.errors.extend(too_deep);
        (entities, provenance)
    }
}

#[derive(Debug, Clone)]
struct Resolved {
    layer: Layer,
    degraded: Vec<String>,
    truncated: bool,
    /// Longest extends chain merged below this entity
    height: usize,
}

/// Memoized, bounded walk over extends chains.
///
/// Every entity's chain is cut [`MAX_EXTENDS_DEPTH`] links below the entity
/// itself, whatever order the definitions were resolved in.
struct Walk<'a> {
    definitions: &'a [Definition],
    /// Complete (untruncated) resolutions of entities outside any cycle
    memo: Vec<Option<Resolved>>,
}

impl Walk<'_> {
    fn resolve(&mut self, id: usize, stack: &mut Vec<usize>) -> Resolved {
        // A memoized chain is reusable only if it fits under the caller's cap.
        if let Some(done) = &self.memo[id] {
            if stack.len() + done.height <= MAX_EXTENDS_DEPTH {
                return done.clone();
            }
        }
        let definitions = self.definitions;
        let definition = &definitions[id];
        let mut layer = Layer::default();
        let mut degraded = definition.degraded.clone();
        let mut truncated = false;
        let mut height = 0;

        // Bases already on the stack close a cycle: the non-cyclic prefix is
        // all we merge.
        let bases: Vec<usize> = definition
            .bases
            .iter()
            .copied()
            .filter(|base| !stack.contains(base))
            .collect();

        if !bases.is_empty() && stack.len() >= MAX_EXTENDS_DEPTH {
            truncated = true;
        } else {
            stack.push(id);
            for base in bases {
                let resolved = self.resolve(base, stack);
                truncated |= resolved.truncated;
                height = height.max(resolved.height + 1);
                if !resolved.degraded.is_empty() {
                    let reason = format!("base '{}' is degraded", definitions[base].key.name);
                    if !degraded.contains(&reason) {
                        degraded.push(reason);
                    }
                }
                layer.inherit(resolved.layer, &definition.key.name);
            }
            stack.pop();
        }
        layer.overlay(definition.layer.clone());

        let resolved = Resolved {
            layer,
            degraded,
            truncated,
            height,
        };
        if !truncated && !definition.in_cycle {
            self.memo[id] = Some(resolved.clone());
        }
        resolved
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
