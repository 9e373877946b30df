//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;
}

/// Item for FZF-style selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Display text shown in selector
    pub display: String,
    /// Actual value (corpus path)
    pub value: String,
}

/// Interactive FZF-style selector abstraction.
pub trait Selector: Send + Sync {
    /// Present items to user and return the position of the selected one.
    /// Returns None if user cancels (Esc/Ctrl-C).
    ///
    /// Items with identical display text stay distinguishable by position.
    fn select_one(&self, items: &[SelectionItem], prompt: &str) -> Result<Option<usize>, String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Skim line remembering its position in the caller's item list.
struct IndexedItem {
    index: usize,
    text: String,
}

impl skim::SkimItem for IndexedItem {
    fn text(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed(&self.text)
    }
}

/// Real selector implementation using skim (FZF-like).
#[derive(Debug, Default)]
pub struct SkimSelector;

impl Selector for SkimSelector {
    fn select_one(&self, items: &[SelectionItem], prompt: &str) -> Result<Option<usize>, String> {
        use skim::prelude::*;

        if items.is_empty() {
            return Ok(None);
        }

        // Ranked order matters: keep it instead of letting skim re-sort by score
        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt))
            .height(Some("50%"))
            .multi(false)
            .nosort(true)
            .build()
            .map_err(|e| format!("failed to build skim options: {e}"))?;

        let (tx, rx): (SkimItemSender, SkimItemReceiver) = unbounded();
        for (index, item) in items.iter().enumerate() {
            let line = IndexedItem {
                index,
                text: item.display.clone(),
            };
            tx.send(Arc::new(line))
                .map_err(|e| format!("failed to feed skim: {e}"))?;
        }
        drop(tx);

        match Skim::run_with(&options, Some(rx)) {
            Some(out) if out.is_abort => Ok(None),
            Some(out) => Ok(out.selected_items.first().and_then(|selected| {
                (**selected)
                    .as_any()
                    .downcast_ref::<IndexedItem>()
                    .map(|line| line.index)
            })),
            None => Ok(None),
        }
    }
}
