//! Corpus data model: the serialized tree shape and the in-arena node.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Institution owning a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Institution {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Institution {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: None,
        }
    }
}

/// One corpus as delivered by the aggregator's corpora listing.
///
/// Every field except `displayName` may be missing in the source data;
/// missing fields simply never match a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Corpus {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<Institution>,
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_records: Option<u64>,
    pub sub_corpora: Vec<Corpus>,
}

impl Corpus {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_institution(mut self, name: impl Into<String>) -> Self {
        self.institution = Some(Institution::new(name));
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn with_sub_corpora(mut self, sub_corpora: Vec<Corpus>) -> Self {
        self.sub_corpora = sub_corpora;
        self
    }
}

/// Corpus attributes kept on a node once the tree is loaded (children live in the arena).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusInfo {
    pub display_name: String,
    pub description: Option<String>,
    pub institution: Option<Institution>,
    pub languages: Vec<String>,
    pub endpoint_url: Option<String>,
    pub handle: Option<String>,
    pub landing_page: Option<String>,
    pub number_of_records: Option<u64>,
}

impl CorpusInfo {
    /// Split a corpus into its own attributes and its children.
    pub fn split(corpus: Corpus) -> (Self, Vec<Corpus>) {
        let Corpus {
            display_name,
            description,
            institution,
            languages,
            endpoint_url,
            handle,
            landing_page,
            number_of_records,
            sub_corpora,
        } = corpus;
        let info = Self {
            display_name,
            description,
            institution,
            languages,
            endpoint_url,
            handle,
            landing_page,
            number_of_records,
        };
        (info, sub_corpora)
    }

    /// Rebuild a serializable corpus around the given children.
    pub fn to_corpus(&self, sub_corpora: Vec<Corpus>) -> Corpus {
        Corpus {
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            institution: self.institution.clone(),
            languages: self.languages.clone(),
            endpoint_url: self.endpoint_url.clone(),
            handle: self.handle.clone(),
            landing_page: self.landing_page.clone(),
            number_of_records: self.number_of_records,
            sub_corpora,
        }
    }
}

impl fmt::Display for CorpusInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Lower-cased searchable fields, computed once per load.
///
/// Empty name/description/institution strings are stored as `None`: they never
/// match, not even an empty query token. Language entries are kept as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchKeys {
    pub name: Option<String>,
    pub description: Option<String>,
    pub institution: Option<String>,
    pub languages: Vec<String>,
}

impl SearchKeys {
    pub fn from_info(info: &CorpusInfo) -> Self {
        fn key(s: Option<&str>) -> Option<String> {
            s.filter(|s| !s.is_empty()).map(str::to_lowercase)
        }
        Self {
            name: key(Some(&info.display_name)),
            description: key(info.description.as_deref()),
            institution: key(info.institution.as_ref().map(|i| i.name.as_str())),
            languages: info.languages.iter().map(|l| l.to_lowercase()).collect(),
        }
    }

    /// Number of fields containing `token`; each language entry counts on its own.
    pub fn hits(&self, token: &str) -> u32 {
        let fields = [&self.name, &self.description, &self.institution]
            .into_iter()
            .flatten()
            .filter(|field| field.contains(token))
            .count();
        let languages = self
            .languages
            .iter()
            .filter(|lang| lang.contains(token))
            .count();
        (fields + languages) as u32
    }
}
