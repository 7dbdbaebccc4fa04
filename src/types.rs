use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One of the 16 Bundesländer the portal's search form accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Jurisdiction {
    pub name: &'static str,
    pub code: &'static str,
}

/// One (jurisdiction, keyword) combination to be searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTask {
    pub jurisdiction: Jurisdiction,
    pub keyword: String,
}

impl fmt::Display for QueryTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.jurisdiction.code, self.keyword)
    }
}

/// Canonical announcement identifier, the deduplication key against the
/// ledger. No validation is performed on its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl ProfileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileId {
    fn from(s: &str) -> Self {
        ProfileId(s.to_string())
    }
}

/// A normalized discovery awaiting extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub keyword: String,
    pub profile_id: ProfileId,
    pub detail_url: String,
    pub jurisdiction_name: String,
}

/// Fully extracted announcement, ready for ingestion. Created exactly once
/// per new ProfileId. Field order is the ledger's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub keyword: String,
    pub profile_id: ProfileId,
    pub detail_url: String,
    pub jurisdiction: String,
    pub court_info: String,
    pub publication_info: String,
    pub registration_date: String,
    pub registration_details: String,
}

impl ProfileRecord {
    pub const FIELD_NAMES: [&'static str; 8] = [
        "keyword",
        "profile_id",
        "detail_url",
        "jurisdiction",
        "court_info",
        "publication_info",
        "registration_date",
        "registration_details",
    ];

    /// Ordered row for the ledger / export, matching `FIELD_NAMES`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.keyword.clone(),
            self.profile_id.0.clone(),
            self.detail_url.clone(),
            self.jurisdiction.clone(),
            self.court_info.clone(),
            self.publication_info.clone(),
            self.registration_date.clone(),
            self.registration_details.clone(),
        ]
    }
}

/// Snapshot of previously ingested identifiers, read once per run from the
/// ledger before crawling begins.
pub type IngestedIdSet = HashSet<ProfileId>;
