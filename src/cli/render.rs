//! Tree rendering of a corpus engine via termtree

use colored::Colorize;
use itertools::Itertools;
use termtree::Tree;

use crate::config::DisplayConfig;
use crate::domain::{CorpusNode, CorpusTreeEngine, NodeId};

/// Rendering switches, usually taken from `DisplayConfig`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_priority: bool,
    pub dim_unmatched: bool,
    /// Descend into collapsed nodes too
    pub expand_all: bool,
}

impl From<&DisplayConfig> for RenderOptions {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            show_priority: display.show_priority,
            dim_unmatched: display.dim_unmatched,
            expand_all: display.expand_all,
        }
    }
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self, options: RenderOptions) -> Tree<String>;
}

impl TreeNodeConvert for CorpusTreeEngine {
    fn to_tree_string(&self, options: RenderOptions) -> Tree<String> {
        fn build(
            engine: &CorpusTreeEngine,
            id: NodeId,
            options: RenderOptions,
        ) -> Option<Tree<String>> {
            let node = engine.get(id)?;
            let mut tree = Tree::new(label(node, options));
            if node.expanded || options.expand_all {
                for &child in &node.children {
                    if let Some(child_tree) = build(engine, child, options) {
                        tree.push(child_tree);
                    }
                }
            }
            Some(tree)
        }

        let stats = self.stats();
        let title = format!("corpora ({} selected of {})", stats.selected, stats.total);
        let leaves: Vec<_> = self
            .roots()
            .iter()
            .filter_map(|&root| build(self, root, options))
            .collect();
        Tree::new(title).with_leaves(leaves)
    }
}

/// One line per corpus: checkbox, name, institution and languages.
pub fn label(node: &CorpusNode, options: RenderOptions) -> String {
    let mark = if node.selected { "[x]" } else { "[ ]" };
    let mut text = format!("{} {}", mark, node.name());

    let mut details = Vec::new();
    if let Some(institution) = node.info.institution.as_ref().filter(|i| !i.name.is_empty()) {
        details.push(institution.name.clone());
    }
    if !node.info.languages.is_empty() {
        details.push(node.info.languages.iter().join(" "));
    }
    if !details.is_empty() {
        text.push_str(&format!(" ({})", details.join("; ")));
    }
    if !node.is_leaf() && !(node.expanded || options.expand_all) {
        text.push_str(&format!(" +{}", node.children.len()));
    }
    if options.show_priority {
        text.push_str(&format!(" :{}", node.priority));
    }

    if options.dim_unmatched && node.is_dimmed() {
        text.dimmed().to_string()
    } else {
        text
    }
}
