use serde::{Deserialize, Serialize};
use std::fmt;

/// How query text is matched against entry names
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Names starting with the query (binary search over the sorted store)
    #[default]
    Prefix,
    /// Names containing the query anywhere (linear scan)
    Substring,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Prefix => f.write_str("prefix"),
            MatchMode::Substring => f.write_str("substring"),
        }
    }
}

/// Options accepted by [`QueryEngine::search`](crate::query::QueryEngine::search)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    /// Upper bound on returned matches; `None` is unbounded
    pub max_results: Option<usize>,
    pub match_mode: MatchMode,
    /// Restrict matching to shards of one domain (e.g. `classes`)
    pub domain: Option<String>,
}

impl SearchOptions {
    pub fn prefix() -> Self {
        Self::default()
    }

    pub fn substring() -> Self {
        Self {
            match_mode: MatchMode::Substring,
            ..Self::default()
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}
