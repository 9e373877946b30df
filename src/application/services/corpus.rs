//! Corpus loading and search-request service
//!
//! Bridges the engine to its collaborators: the cached corpora file it is loaded
//! from, and the search submission built from the final selection.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::SearchConfig;
use crate::domain::{Corpus, CorpusTreeEngine};
use crate::infrastructure::traits::FileSystem;

/// Accepted layouts of a corpora document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CorporaDocument {
    List(Vec<Corpus>),
    Wrapped { corpora: Vec<Corpus> },
}

/// One corpus to query, as sent to the search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedCorpus {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

/// Search submission built from the selected corpora.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub start_record: u32,
    pub max_records: u32,
    pub corpora: Vec<RequestedCorpus>,
}

/// Service for loading corpus trees and turning a selection into a request.
pub struct CorpusService {
    fs: Arc<dyn FileSystem>,
}

impl CorpusService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse a corpora document: a bare array or `{"corpora": [...]}`.
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<Vec<Corpus>> {
        let document: CorporaDocument =
            serde_json::from_str(content).map_err(|e| ApplicationError::InvalidCorpora {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(match document {
            CorporaDocument::List(corpora) => corpora,
            CorporaDocument::Wrapped { corpora } => corpora,
        })
    }

    /// Read a cached corpora file.
    #[instrument(level = "debug", skip(self))]
    pub fn read_corpora(&self, path: &Path) -> ApplicationResult<Vec<Corpus>> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::FileNotFound(path.to_path_buf()));
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::InvalidCorpora {
                path: path.to_path_buf(),
                message: "not a file".to_string(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read corpora", path)?;
        let corpora = Self::parse(&content, path)?;
        debug!("read_corpora: {} root corpora", corpora.len());
        Ok(corpora)
    }

    /// Read a cached corpora file into a freshly loaded engine.
    pub fn load_file(&self, path: &Path) -> ApplicationResult<CorpusTreeEngine> {
        Ok(CorpusTreeEngine::with_corpora(self.read_corpora(path)?))
    }

    /// Collect every selected corpus (pre-order) into a search request.
    #[instrument(level = "debug", skip(self, engine, search))]
    pub fn build_request(
        &self,
        engine: &CorpusTreeEngine,
        query: &str,
        search: &SearchConfig,
    ) -> ApplicationResult<SearchRequest> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApplicationError::EmptyQuery);
        }
        let corpora: Vec<RequestedCorpus> = engine
            .selected()
            .map(|(_, node)| RequestedCorpus {
                display_name: node.info.display_name.clone(),
                endpoint_url: node.info.endpoint_url.clone(),
                handle: node.info.handle.clone(),
            })
            .collect();
        if corpora.is_empty() {
            return Err(ApplicationError::NothingSelected);
        }
        debug!("build_request: {} corpora", corpora.len());

        Ok(SearchRequest {
            query: query.to_string(),
            language: search.language.clone(),
            start_record: search.start_record,
            max_records: search.max_records,
            corpora,
        })
    }
}
