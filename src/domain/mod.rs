//! Domain layer: corpus tree, walk primitives and the search-ranking engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod query;

pub use arena::{CorpusArena, CorpusNode, NodeId, PostOrderIterator, TreeIterator};
pub use corpus::{Corpus, CorpusInfo, Institution, SearchKeys};
pub use engine::{CorpusTreeEngine, TreeStats, VisibleRow, PATH_SEPARATOR};
pub use error::{DomainError, TreeResult};
pub use query::Query;
