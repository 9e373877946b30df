//! corpview: browse, rank and select a tree of federated-search corpora.
//!
//! The core is [`domain::CorpusTreeEngine`]; everything else loads a tree into it,
//! renders it or turns its selection into a search request.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
