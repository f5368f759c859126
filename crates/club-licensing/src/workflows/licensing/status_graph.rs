//! Directed workflow graph of status categories and statuses.
//!
//! Nodes live in an arena keyed by integer id and reference their neighbours by id only,
//! so a broken or cyclic chain is detected during traversal instead of recursing forever.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::domain::{Language, LicensingError, LocalizedTitle};

/// Fields shared by status categories and statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNode {
    pub id: u64,
    pub title: LocalizedTitle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedTitle>,
    pub value: String,
    #[serde(default)]
    pub previous_id: Option<u64>,
    #[serde(default)]
    pub next_id: Option<u64>,
    /// Role keys allowed to see the node. Empty means public.
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl StatusNode {
    pub fn new(id: u64, value: impl Into<String>, title: LocalizedTitle) -> Self {
        Self {
            id,
            title,
            description: None,
            value: value.into(),
            previous_id: None,
            next_id: None,
            roles: BTreeSet::new(),
            is_active: true,
        }
    }

    pub fn title(&self, language: Language) -> &str {
        self.title.get(language)
    }

    pub fn description(&self, language: Language) -> Option<&str> {
        self.description.as_ref().map(|text| text.get(language))
    }

    pub fn position(&self) -> WorkflowPosition {
        match (self.previous_id, self.next_id) {
            (None, None) => WorkflowPosition::Standalone,
            (None, Some(_)) => WorkflowPosition::First,
            (Some(_), None) => WorkflowPosition::Last,
            (Some(_), Some(_)) => WorkflowPosition::Middle,
        }
    }

    pub fn is_accessible(&self, role: &str) -> bool {
        self.roles.is_empty() || self.roles.contains(role)
    }

    pub fn add_role(&mut self, role: impl Into<String>) {
        self.roles.insert(role.into());
    }

    pub fn remove_role(&mut self, role: &str) {
        self.roles.remove(role);
    }

    pub fn set_roles<I, S>(&mut self, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
    }

    pub fn clear_roles(&mut self) {
        self.roles.clear();
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn validate(&self) -> Result<(), LicensingError> {
        if self.title.ru.trim().is_empty() || self.title.kk.trim().is_empty() {
            return Err(LicensingError::validation(format!(
                "status node {} requires ru and kk titles",
                self.id
            )));
        }
        if self.value.trim().is_empty() {
            return Err(LicensingError::validation(format!(
                "status node {} requires a value key",
                self.id
            )));
        }
        if self.previous_id == Some(self.id) || self.next_id == Some(self.id) {
            return Err(LicensingError::validation(format!(
                "status node {} cannot reference itself",
                self.id
            )));
        }
        Ok(())
    }
}

/// Where a node sits in its chain, derived from prev/next nullity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPosition {
    First,
    Middle,
    Last,
    Standalone,
}

impl WorkflowPosition {
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Middle => "middle",
            Self::Last => "last",
            Self::Standalone => "standalone",
        }
    }
}

/// Anything stored in a [`WorkflowGraph`].
pub trait WorkflowNode {
    fn node(&self) -> &StatusNode;
    fn node_mut(&mut self) -> &mut StatusNode;

    fn id(&self) -> u64 {
        self.node().id
    }

    /// Chain a node belongs to. Nodes in different scopes never link.
    fn scope(&self) -> Option<u64> {
        None
    }
}

/// Top-level workflow step an application moves through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCategory {
    #[serde(flatten)]
    pub node: StatusNode,
}

impl WorkflowNode for StatusCategory {
    fn node(&self) -> &StatusNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut StatusNode {
        &mut self.node
    }
}

/// Status scoped within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub category_id: u64,
    #[serde(flatten)]
    pub node: StatusNode,
}

impl WorkflowNode for Status {
    fn node(&self) -> &StatusNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut StatusNode {
        &mut self.node
    }

    fn scope(&self) -> Option<u64> {
        Some(self.category_id)
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowGraph<N> {
    nodes: BTreeMap<u64, N>,
}

impl<N> Default for WorkflowGraph<N> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }
}

impl<N: WorkflowNode> WorkflowGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk load persisted nodes. Self references and duplicate ids are rejected; chain
    /// integrity is checked separately by [`WorkflowGraph::validate_acyclic`].
    pub fn from_nodes<I>(nodes: I) -> Result<Self, LicensingError>
    where
        I: IntoIterator<Item = N>,
    {
        let mut graph = Self::new();
        for node in nodes {
            graph.insert(node)?;
        }
        Ok(graph)
    }

    pub fn insert(&mut self, node: N) -> Result<(), LicensingError> {
        let inner = node.node();
        if inner.previous_id == Some(inner.id) || inner.next_id == Some(inner.id) {
            return Err(LicensingError::validation(format!(
                "status node {} cannot reference itself",
                inner.id
            )));
        }
        if self.nodes.contains_key(&inner.id) {
            return Err(LicensingError::validation(format!(
                "status node {} already exists",
                inner.id
            )));
        }
        self.nodes.insert(inner.id, node);
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<&N> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut N> {
        self.nodes.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.values()
    }

    fn require(&self, id: u64) -> Result<&N, LicensingError> {
        self.nodes
            .get(&id)
            .ok_or_else(|| LicensingError::not_found("status node", id))
    }

    fn require_mut(&mut self, id: u64) -> Result<&mut N, LicensingError> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| LicensingError::not_found("status node", id))
    }

    /// Make `to` follow `from`. Former neighbours on either side are detached so the
    /// chain stays doubly linked.
    pub fn link(&mut self, from: u64, to: u64) -> Result<(), LicensingError> {
        if from == to {
            return Err(LicensingError::validation(format!(
                "status node {from} cannot link to itself"
            )));
        }
        let from_scope = self.require(from)?.scope();
        let to_scope = self.require(to)?.scope();
        if from_scope != to_scope {
            return Err(LicensingError::validation(format!(
                "status node {from} and status node {to} belong to different categories"
            )));
        }

        let mut visited = BTreeSet::new();
        let mut cursor = Some(to);
        while let Some(id) = cursor {
            if id == from || !visited.insert(id) {
                return Err(LicensingError::Cycle { node: from });
            }
            cursor = self.nodes.get(&id).and_then(|node| node.node().next_id);
        }

        let old_next = self.require(from)?.node().next_id;
        let old_previous = self.require(to)?.node().previous_id;

        if let Some(next) = old_next.filter(|next| *next != to) {
            if let Some(node) = self.nodes.get_mut(&next) {
                if node.node().previous_id == Some(from) {
                    node.node_mut().previous_id = None;
                }
            }
        }
        if let Some(previous) = old_previous.filter(|previous| *previous != from) {
            if let Some(node) = self.nodes.get_mut(&previous) {
                if node.node().next_id == Some(to) {
                    node.node_mut().next_id = None;
                }
            }
        }

        self.require_mut(from)?.node_mut().next_id = Some(to);
        self.require_mut(to)?.node_mut().previous_id = Some(from);
        Ok(())
    }

    pub fn unlink(&mut self, id: u64) -> Result<(), LicensingError> {
        let node = self.require_mut(id)?.node_mut();
        let previous = node.previous_id.take();
        let next = node.next_id.take();

        if let Some(previous) = previous {
            if let Some(neighbour) = self.nodes.get_mut(&previous) {
                if neighbour.node().next_id == Some(id) {
                    neighbour.node_mut().next_id = None;
                }
            }
        }
        if let Some(next) = next {
            if let Some(neighbour) = self.nodes.get_mut(&next) {
                if neighbour.node().previous_id == Some(id) {
                    neighbour.node_mut().previous_id = None;
                }
            }
        }
        Ok(())
    }

    pub fn position(&self, id: u64) -> Result<WorkflowPosition, LicensingError> {
        Ok(self.require(id)?.node().position())
    }

    pub fn is_accessible(&self, id: u64, role: &str) -> Result<bool, LicensingError> {
        Ok(self.require(id)?.node().is_accessible(role))
    }

    /// True iff `to` directly follows `from`.
    pub fn can_transition(&self, from: u64, to: u64) -> Result<bool, LicensingError> {
        self.require(to)?;
        Ok(self.require(from)?.node().next_id == Some(to))
    }

    /// Ids of nodes without a predecessor, ascending.
    pub fn heads(&self) -> Vec<u64> {
        self.nodes
            .values()
            .filter(|node| node.node().previous_id.is_none())
            .map(WorkflowNode::id)
            .collect()
    }

    pub fn chain_from(&self, start: u64) -> Chain<'_, N> {
        Chain {
            graph: self,
            cursor: Some(start),
            visited: BTreeSet::new(),
        }
    }

    /// Nodes of the chain starting at `start` that `role` may see and that are active.
    pub fn visible_chain(&self, start: u64, role: &str) -> Result<Vec<&N>, LicensingError> {
        let mut visible = Vec::new();
        for node in self.chain_from(start) {
            let node = node?;
            if node.node().is_active && node.node().is_accessible(role) {
                visible.push(node);
            }
        }
        Ok(visible)
    }

    pub fn validate_acyclic(&self) -> Result<(), LicensingError> {
        for id in self.nodes.keys() {
            for step in self.chain_from(*id) {
                match step {
                    Ok(_) | Err(LicensingError::NotFound { .. }) => {}
                    Err(error) => return Err(error),
                }
            }
        }
        Ok(())
    }
}

/// Lazy walk along `next` pointers. Yields an error and stops on a revisit or a dangling id.
pub struct Chain<'a, N> {
    graph: &'a WorkflowGraph<N>,
    cursor: Option<u64>,
    visited: BTreeSet<u64>,
}

impl<'a, N: WorkflowNode> Iterator for Chain<'a, N> {
    type Item = Result<&'a N, LicensingError>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor.take()?;
        if !self.visited.insert(id) {
            return Some(Err(LicensingError::Cycle { node: id }));
        }
        match self.graph.nodes.get(&id) {
            Some(node) => {
                self.cursor = node.node().next_id;
                Some(Ok(node))
            }
            None => Some(Err(LicensingError::not_found("status node", id))),
        }
    }
}
