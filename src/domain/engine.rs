//! Corpus tree engine: selection, expansion and search ranking over one loaded tree.

use tracing::{debug, instrument};

use crate::domain::arena::{CorpusArena, CorpusNode, NodeId, TreeIterator};
use crate::domain::corpus::Corpus;
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::query::Query;

/// Separator of display names in a corpus path (`Root/Child/Leaf`).
pub const PATH_SEPARATOR: char = '/';

/// Node counts of the current tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub total: usize,
    pub selected: usize,
    pub matching: usize,
}

/// One line of the expanded-tree view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: NodeId,
    pub depth: usize,
}

/// Owns the corpus tree and every per-node flag.
///
/// Single-writer by contract: intermediate states of `search` (reset but not yet
/// scored) are only consistent once the call returns.
#[derive(Debug, Default)]
pub struct CorpusTreeEngine {
    tree: CorpusArena,
}

impl CorpusTreeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_corpora(corpora: Vec<Corpus>) -> Self {
        let mut engine = Self::new();
        engine.load(corpora);
        engine
    }

    /// Replace the tree. Every node starts selected, collapsed, with priority 1.
    #[instrument(level = "debug", skip_all)]
    pub fn load(&mut self, corpora: Vec<Corpus>) {
        self.tree.replace(corpora);
        debug!("load: {} nodes, depth {}", self.tree.len(), self.tree.depth());
    }

    pub fn tree(&self) -> &CorpusArena {
        &self.tree
    }

    pub fn get(&self, id: NodeId) -> Option<&CorpusNode> {
        self.tree.get_node(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        self.tree.roots()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        self.tree.iter()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Flip selection of `id` and give the whole subtree the new value.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle_selection(&mut self, id: NodeId) -> TreeResult<bool> {
        let value = !self.node(id)?.selected;
        self.tree.visit_subtree(id, |node| node.selected = value);
        Ok(value)
    }

    /// Flip expansion of `id` only.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle_expansion(&mut self, id: NodeId) -> TreeResult<bool> {
        let node = self
            .tree
            .get_node_mut(id)
            .ok_or(DomainError::NodeNotFound(id))?;
        node.expanded = !node.expanded;
        Ok(node.expanded)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn select_all(&mut self, value: bool) {
        self.tree.visit_all(|node| node.selected = value);
    }

    pub fn expand_all(&mut self, value: bool) {
        self.tree.visit_all(|node| node.expanded = value);
    }

    /// Re-score every node against `query` and re-order siblings by relevance.
    ///
    /// Never touches `selected` or `expanded`.
    #[instrument(level = "debug", skip(self))]
    pub fn search(&mut self, query: &str) {
        let query = Query::parse(query);
        if query.is_empty() {
            self.tree.visit_all(|node| node.priority = 1);
            return;
        }

        self.tree.visit_all(|node| node.priority = 0);
        self.tree
            .visit_all(|node| node.priority += query.score(&node.keys));
        self.propagate_priorities();
        self.sort_by_priority();

        debug!("search: {:?} -> {:?}", query.tokens(), self.stats());
    }

    /// A node left at 0 gets exactly 1 when any direct child scored.
    ///
    /// Decided from the children's own scores only: a lifted node does not in
    /// turn lift its parent, so a match surfaces exactly one level up.
    fn propagate_priorities(&mut self) {
        let lifted: Vec<NodeId> = self
            .tree
            .iter()
            .filter(|(_, node)| node.priority == 0)
            .filter(|(_, node)| {
                node.children
                    .iter()
                    .any(|&child| self.tree.get_node(child).is_some_and(|c| c.priority > 0))
            })
            .map(|(id, _)| id)
            .collect();
        for id in lifted {
            if let Some(node) = self.tree.get_node_mut(id) {
                node.priority = 1;
            }
        }
    }

    fn sort_by_priority(&mut self) {
        let parents: Vec<NodeId> = self
            .tree
            .iter()
            .filter(|(_, node)| !node.is_leaf())
            .map(|(id, _)| id)
            .collect();
        for parent in parents {
            self.tree
                .sort_children_by(Some(parent), |a, b| b.priority.cmp(&a.priority));
        }
        self.tree
            .sort_children_by(None, |a, b| b.priority.cmp(&a.priority));
    }

    /// All selected nodes, pre-order.
    pub fn selected(&self) -> impl Iterator<Item = (NodeId, &CorpusNode)> + '_ {
        self.tree.iter().filter(|(_, node)| node.selected)
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.iter().fold(TreeStats::default(), |mut stats, (_, node)| {
            stats.total += 1;
            stats.selected += usize::from(node.selected);
            stats.matching += usize::from(node.priority > 0);
            stats
        })
    }

    /// Rows a tree view shows: roots plus the children of expanded nodes.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<(NodeId, usize)> =
            self.tree.roots().iter().rev().map(|&id| (id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.tree.get_node(id) else {
                continue;
            };
            rows.push(VisibleRow { id, depth });
            if node.expanded {
                stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        rows
    }

    /// First node in pre-order whose display name equals `name`.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.tree
            .iter()
            .find(|(_, node)| node.name() == name)
            .map(|(id, _)| id)
    }

    /// Follow display names from a root; the first matching sibling wins at every level.
    pub fn find_by_path<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        let mut current = self.find_sibling(self.tree.roots(), first.as_ref())?;
        for name in rest {
            current = self.find_sibling(self.children(current), name.as_ref())?;
        }
        Some(current)
    }

    /// Resolve `Root/Child/Leaf`; a bare name falls back to a whole-tree name lookup.
    pub fn resolve(&self, path: &str) -> TreeResult<NodeId> {
        let parts: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        self.find_by_path(&parts)
            .or_else(|| {
                if parts.len() == 1 {
                    self.find_by_name(path)
                } else {
                    None
                }
            })
            .ok_or_else(|| DomainError::PathNotFound(path.to_string()))
    }

    /// Display-name path of `id`, root first.
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.get(cur)?;
            names.push(node.name());
            current = node.parent;
        }
        names.reverse();
        Some(names.join(&PATH_SEPARATOR.to_string()))
    }

    /// Number of ancestors of `id` (0 for roots).
    pub fn depth_of(&self, id: NodeId) -> usize {
        std::iter::successors(self.parent(id), |&p| self.parent(p)).count()
    }

    pub fn to_corpora(&self) -> Vec<Corpus> {
        self.tree.to_corpora()
    }

    fn find_sibling(&self, siblings: &[NodeId], name: &str) -> Option<NodeId> {
        siblings
            .iter()
            .copied()
            .find(|&id| self.get(id).is_some_and(|n| n.name() == name))
    }

    fn node(&self, id: NodeId) -> TreeResult<&CorpusNode> {
        self.tree.get_node(id).ok_or(DomainError::NodeNotFound(id))
    }
}
