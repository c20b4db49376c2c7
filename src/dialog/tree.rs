//! Dialog tree stored in a graph arena.
//!
//! Nodes live in a petgraph `DiGraph` and are addressed by `NodeIndex`, edges
//! point from parent to child. The graph never removes anything, so edge
//! indices grow with insertion and give the presentation order of children.

use std::ops::Index;

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::{Bfs, EdgeRef},
};

use crate::{GuideflowError, Result, dialog::node::DialogNode};

/// Ordered multi-child tree of dialog nodes.
///
/// Built once per workflow, then shared read-only by every conversation of
/// that workflow.
#[derive(Debug, Default)]
pub struct DialogTree {
    graph: DiGraph<DialogNode, ()>,
    root: Option<NodeIndex>,
}

impl DialogTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from nodes listed parents-first. Fails as a whole on the
    /// first node that cannot be inserted.
    pub fn build(nodes: impl IntoIterator<Item = DialogNode>) -> Result<Self> {
        let mut tree = Self::new();
        for node in nodes {
            tree.insert(node)?;
        }
        Ok(tree)
    }

    /// Attach `node` as the last child of its parent.
    ///
    /// A node with an empty parent becomes the root and is only accepted while
    /// the tree is empty. On error the tree is left untouched.
    pub fn insert(
        &mut self,
        node: DialogNode,
    ) -> Result<NodeIndex> {
        if self.search(node.id()).is_some() {
            return Err(GuideflowError::DuplicateNode(node.id().to_string()));
        }

        if node.is_root() {
            if let Some(root) = self.root {
                return Err(GuideflowError::RootExists {
                    id: node.id().to_string(),
                    root: self.graph[root].id().to_string(),
                });
            }
            let idx = self.graph.add_node(node);
            self.root = Some(idx);
            return Ok(idx);
        }

        let Some(parent) = self.search(node.parent()) else {
            return Err(GuideflowError::OrphanNode {
                id: node.id().to_string(),
                parent: node.parent().to_string(),
            });
        };

        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        Ok(idx)
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn node(
        &self,
        idx: NodeIndex,
    ) -> Option<&DialogNode> {
        self.graph.node_weight(idx)
    }

    /// Find a node at any depth, breadth-first from the root.
    pub fn search(
        &self,
        id: &str,
    ) -> Option<NodeIndex> {
        let root = self.root?;
        let mut bfs = Bfs::new(&self.graph, root);
        while let Some(idx) = bfs.next(&self.graph) {
            if self.graph[idx].id() == id {
                return Some(idx);
            }
        }
        None
    }

    pub fn find(
        &self,
        id: &str,
    ) -> Option<&DialogNode> {
        self.search(id).and_then(|idx| self.node(idx))
    }

    /// `cursor` itself when its id matches, else its direct child with that id.
    pub fn search_one_level(
        &self,
        cursor: NodeIndex,
        id: &str,
    ) -> Option<NodeIndex> {
        let node = self.graph.node_weight(cursor)?;
        if node.id() == id {
            return Some(cursor);
        }
        self.children(cursor).into_iter().find(|child| self.graph[*child].id() == id)
    }

    /// Direct children in insertion order.
    pub fn children(
        &self,
        idx: NodeIndex,
    ) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self.graph.edges_directed(idx, Direction::Outgoing).map(|e| (e.id(), e.target())).collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Human-readable indented outline of the tree.
    pub fn outline(&self) -> String {
        let mut lines = Vec::new();
        if let Some(root) = self.root {
            self.outline_node(root, 0, &mut lines);
        }
        lines.join("\n")
    }

    fn outline_node(
        &self,
        idx: NodeIndex,
        depth: usize,
        lines: &mut Vec<String>,
    ) {
        let node = &self.graph[idx];
        let marker = if node.has_action() { " *" } else { "" };
        lines.push(format!("{}{} ({}){}", "  ".repeat(depth), node.id(), node.label(), marker));
        for child in self.children(idx) {
            self.outline_node(child, depth + 1, lines);
        }
    }
}

impl Index<NodeIndex> for DialogTree {
    type Output = DialogNode;

    /// Panics when `idx` does not belong to this tree.
    fn index(
        &self,
        idx: NodeIndex,
    ) -> &DialogNode {
        &self.graph[idx]
    }
}
