use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::corpus::{Corpus, CorpusInfo, SearchKeys};

/// Stable handle of a node within one loaded tree.
///
/// Survives re-sorting; invalidated by the next load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (idx, generation) = self.0.into_raw_parts();
        write!(f, "{}v{}", idx, generation)
    }
}

/// Tree node in the arena-based corpus hierarchy.
#[derive(Debug)]
pub struct CorpusNode {
    /// Corpus attributes as loaded
    pub info: CorpusInfo,
    /// Lower-cased search fields derived from `info`
    pub keys: SearchKeys,
    /// Included in the downstream search submission
    pub selected: bool,
    /// Children shown by the render layer
    pub expanded: bool,
    /// Relevance score of the most recent search pass
    pub priority: u32,
    /// Parent node, None for roots
    pub parent: Option<NodeId>,
    /// Child nodes in current display order
    pub children: Vec<NodeId>,
}

impl CorpusNode {
    fn new(info: CorpusInfo, parent: Option<NodeId>) -> Self {
        let keys = SearchKeys::from_info(&info);
        Self {
            info,
            keys,
            selected: true,
            expanded: false,
            priority: 1,
            parent,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.display_name
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_dimmed(&self) -> bool {
        self.priority == 0
    }
}

/// Arena-based forest of corpora.
///
/// The aggregator delivers a list of root corpora, so there is no single root:
/// `roots` holds the top-level nodes in display order.
#[derive(Debug, Default)]
pub struct CorpusArena {
    arena: Arena<CorpusNode>,
    roots: Vec<NodeId>,
}

impl CorpusArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an arena from nested corpora, preserving source order.
    pub fn from_corpora(corpora: Vec<Corpus>) -> Self {
        let mut tree = Self::new();
        tree.insert_corpora(corpora);
        tree
    }

    /// Drop every node and load `corpora` in their place.
    ///
    /// Removal bumps the arena generation, so ids handed out for the old tree
    /// never resolve against the new one.
    #[instrument(level = "debug", skip_all, fields(roots = corpora.len()))]
    pub fn replace(&mut self, corpora: Vec<Corpus>) {
        let old: Vec<Index> = self.arena.iter().map(|(idx, _)| idx).collect();
        for idx in old {
            self.arena.remove(idx);
        }
        self.roots.clear();
        self.insert_corpora(corpora);
    }

    fn insert_corpora(&mut self, corpora: Vec<Corpus>) {
        // (corpus, parent); pushed in reverse so siblings are inserted left to right
        let mut stack: Vec<(Corpus, Option<NodeId>)> =
            corpora.into_iter().rev().map(|c| (c, None)).collect();

        while let Some((corpus, parent)) = stack.pop() {
            let (info, children) = CorpusInfo::split(corpus);
            let id = self.insert_node(info, parent);
            stack.extend(children.into_iter().rev().map(|c| (c, Some(id))));
        }
    }

    #[instrument(level = "trace", skip(self, info))]
    pub fn insert_node(&mut self, info: CorpusInfo, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.arena.insert(CorpusNode::new(info, parent)));
        match parent.and_then(|p| self.arena.get_mut(p.0)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn get_node(&self, id: NodeId) -> Option<&CorpusNode> {
        self.arena.get(id.0)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut CorpusNode> {
        self.arena.get_mut(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal of the whole forest.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.roots.iter().copied())
    }

    /// Pre-order traversal of the subtree rooted at `id` (node included).
    pub fn iter_subtree(&self, id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, std::iter::once(id))
    }

    /// Children-before-parents traversal of the whole forest.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Apply `visit` to every node, pre-order.
    pub fn visit_all<F>(&mut self, visit: F)
    where
        F: FnMut(&mut CorpusNode),
    {
        let ids: Vec<NodeId> = self.iter().map(|(id, _)| id).collect();
        self.visit_ids(&ids, visit);
    }

    /// Apply `visit` to `id` and every descendant, pre-order.
    pub fn visit_subtree<F>(&mut self, id: NodeId, visit: F)
    where
        F: FnMut(&mut CorpusNode),
    {
        let ids: Vec<NodeId> = self.iter_subtree(id).map(|(id, _)| id).collect();
        self.visit_ids(&ids, visit);
    }

    fn visit_ids<F>(&mut self, ids: &[NodeId], mut visit: F)
    where
        F: FnMut(&mut CorpusNode),
    {
        for id in ids {
            if let Some(node) = self.arena.get_mut(id.0) {
                visit(node);
            }
        }
    }

    /// Reorder the children of `parent` (or the roots, for `None`) with `compare`.
    ///
    /// `sort_by` is stable: equal elements keep their current relative order.
    pub fn sort_children_by<F>(&mut self, parent: Option<NodeId>, mut compare: F)
    where
        F: FnMut(&CorpusNode, &CorpusNode) -> std::cmp::Ordering,
    {
        let mut ids = match parent {
            Some(p) => match self.arena.get_mut(p.0) {
                Some(node) => std::mem::take(&mut node.children),
                None => return,
            },
            None => std::mem::take(&mut self.roots),
        };
        let arena = &self.arena;
        ids.sort_by(|a, b| match (arena.get(a.0), arena.get(b.0)) {
            (Some(a), Some(b)) => compare(a, b),
            _ => std::cmp::Ordering::Equal,
        });
        match parent.and_then(|p| self.arena.get_mut(p.0)) {
            Some(node) => node.children = ids,
            None => self.roots = ids,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        if let Some(node) = self.get_node(id) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Rebuild the nested corpora in current display order.
    pub fn to_corpora(&self) -> Vec<Corpus> {
        self.roots.iter().filter_map(|&id| self.to_corpus(id)).collect()
    }

    fn to_corpus(&self, id: NodeId) -> Option<Corpus> {
        let node = self.get_node(id)?;
        let children = node
            .children
            .iter()
            .filter_map(|&child| self.to_corpus(child))
            .collect();
        Some(node.info.to_corpus(children))
    }
}

pub struct TreeIterator<'a> {
    arena: &'a CorpusArena,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new<I>(arena: &'a CorpusArena, starts: I) -> Self
    where
        I: DoubleEndedIterator<Item = NodeId>,
    {
        Self {
            arena,
            stack: starts.rev().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a CorpusNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev().copied());
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a CorpusArena,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a CorpusArena) -> Self {
        let stack = arena.roots.iter().rev().map(|&id| (id, false)).collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a CorpusNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                if visited {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
