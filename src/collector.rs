/// Accumulates subdomain names extracted from certificate search results
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::error::FetchError;

/// One element of the search response. Only `name_value` is read.
#[derive(Debug, Deserialize)]
struct CertRecord {
    name_value: String,
}

/// Which set a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Plain,
    Wildcard,
}

impl NameKind {
    pub fn of(name: &str) -> Self {
        if name.contains('*') {
            NameKind::Wildcard
        } else {
            NameKind::Plain
        }
    }
}

/// Counters for a single ingested response.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestStats {
    pub records: usize,
    pub skipped: usize,
    pub new_subdomains: usize,
    pub new_wildcards: usize,
}

/// Plain and wildcard name sets for one run.
///
/// Both sets only grow. A name lands in exactly one of them, decided by the
/// presence of `*` when it is inserted.
#[derive(Debug, Default, Clone)]
pub struct SubdomainCollector {
    subdomains: HashSet<String>,
    wildcards: HashSet<String>,
}

impl SubdomainCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a single name. Returns its kind when it was not already known.
    pub fn insert(&mut self, name: &str) -> Option<NameKind> {
        let kind = NameKind::of(name);
        let set = match kind {
            NameKind::Plain => &mut self.subdomains,
            NameKind::Wildcard => &mut self.wildcards,
        };
        if set.contains(name) {
            return None;
        }
        set.insert(name.to_string());
        Some(kind)
    }

    /// Splits a `name_value` field on newlines and inserts every candidate.
    /// Surrounding whitespace is trimmed and empty candidates are dropped.
    pub fn ingest_name_value(&mut self, name_value: &str, stats: &mut IngestStats) {
        for candidate in name_value.split('\n') {
            let candidate = candidate.trim();
            if candidate.is_empty() {
                continue;
            }
            match self.insert(candidate) {
                Some(NameKind::Plain) => stats.new_subdomains += 1,
                Some(NameKind::Wildcard) => stats.new_wildcards += 1,
                None => {}
            }
        }
    }

    /// Parses a search response body and merges its names.
    ///
    /// The body must be a JSON array. Elements without a string `name_value`
    /// are skipped and counted. Nothing is inserted when the body is empty or
    /// cannot be decoded.
    pub fn ingest_json(&mut self, query: &str, body: &str) -> Result<IngestStats, FetchError> {
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                query: query.to_string(),
            });
        }

        let entries: Vec<Value> = serde_json::from_str(body).map_err(|source| FetchError::Decode {
            source,
            body: body.to_string(),
        })?;

        let mut stats = IngestStats::default();
        for entry in entries {
            stats.records += 1;
            match serde_json::from_value::<CertRecord>(entry) {
                Ok(record) => self.ingest_name_value(&record.name_value, &mut stats),
                Err(_) => stats.skipped += 1,
            }
        }

        Ok(stats)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.subdomains.contains(name) || self.wildcards.contains(name)
    }

    pub fn subdomain_count(&self) -> usize {
        self.subdomains.len()
    }

    pub fn wildcard_count(&self) -> usize {
        self.wildcards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subdomains.is_empty() && self.wildcards.is_empty()
    }

    /// Plain names, sorted.
    pub fn subdomains(&self) -> Vec<&str> {
        sorted(&self.subdomains)
    }

    /// Wildcard names, sorted.
    pub fn wildcards(&self) -> Vec<&str> {
        sorted(&self.wildcards)
    }
}

fn sorted(set: &HashSet<String>) -> Vec<&str> {
    let mut names: Vec<&str> = set.iter().map(String::as_str).collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_kind() {
        assert_eq!(NameKind::of("www.example.com"), NameKind::Plain);
        assert_eq!(NameKind::of("*.example.com"), NameKind::Wildcard);
        assert_eq!(NameKind::of("a.*.example.com"), NameKind::Wildcard);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut collector = SubdomainCollector::new();
        assert_eq!(collector.insert("a.example.com"), Some(NameKind::Plain));
        assert_eq!(collector.insert("a.example.com"), None);
        assert_eq!(collector.insert("*.example.com"), Some(NameKind::Wildcard));
        assert_eq!(collector.insert("*.example.com"), None);
        assert_eq!(collector.subdomain_count(), 1);
        assert_eq!(collector.wildcard_count(), 1);
    }

    #[test]
    fn test_wildcards_never_reach_plain_set() {
        let mut collector = SubdomainCollector::new();
        let mut stats = IngestStats::default();
        collector.ingest_name_value("*.a.example.com\nb.example.com\nx*y.example.com", &mut stats);

        assert_eq!(collector.subdomains(), vec!["b.example.com"]);
        assert_eq!(collector.wildcards(), vec!["*.a.example.com", "x*y.example.com"]);
        assert_eq!(stats.new_subdomains, 1);
        assert_eq!(stats.new_wildcards, 2);
    }

    #[test]
    fn test_multi_line_name_value() {
        let mut collector = SubdomainCollector::new();
        collector.insert("b.example.com");

        let body = r#"[{"name_value":"a.example.com\nb.example.com\nc.example.com"}]"#;
        let stats = collector.ingest_json("example.com", body).unwrap();

        assert_eq!(stats.records, 1);
        assert_eq!(stats.new_subdomains, 2);
        assert_eq!(
            collector.subdomains(),
            vec!["a.example.com", "b.example.com", "c.example.com"]
        );
    }

    #[test]
    fn test_duplicates_across_records() {
        let mut collector = SubdomainCollector::new();
        let body = r#"[
            {"name_value":"a.example.com"},
            {"name_value":"a.example.com\n*.example.com"},
            {"name_value":"*.example.com"}
        ]"#;
        let stats = collector.ingest_json("example.com", body).unwrap();

        assert_eq!(stats.records, 3);
        assert_eq!(stats.new_subdomains, 1);
        assert_eq!(stats.new_wildcards, 1);
        assert_eq!(collector.subdomain_count(), 1);
        assert_eq!(collector.wildcard_count(), 1);
    }

    #[test]
    fn test_empty_candidates_and_crlf() {
        let mut collector = SubdomainCollector::new();
        let body = r#"[{"name_value":"a.example.com\r\n\n  \nb.example.com\n"}]"#;
        collector.ingest_json("example.com", body).unwrap();
        assert_eq!(collector.subdomains(), vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let mut collector = SubdomainCollector::new();
        let body = r#"[
            {"id": 1},
            {"name_value": 42},
            {"name_value": null},
            "not an object",
            {"name_value": "ok.example.com", "issuer_name": "C=US"}
        ]"#;
        let stats = collector.ingest_json("example.com", body).unwrap();

        assert_eq!(stats.records, 5);
        assert_eq!(stats.skipped, 4);
        assert_eq!(collector.subdomains(), vec!["ok.example.com"]);
    }

    #[test]
    fn test_empty_array_leaves_sets_empty() {
        let mut collector = SubdomainCollector::new();
        let stats = collector.ingest_json("example.com", "[]").unwrap();
        assert_eq!(stats, IngestStats::default());
        assert!(collector.is_empty());
    }

    #[test]
    fn test_empty_body_is_no_data() {
        let mut collector = SubdomainCollector::new();
        let err = collector.ingest_json("example.com", "  \n").unwrap_err();
        assert!(matches!(err, FetchError::EmptyBody { ref query } if query == "example.com"));
        assert!(collector.is_empty());
    }

    #[test]
    fn test_invalid_json_does_not_mutate() {
        let mut collector = SubdomainCollector::new();
        collector.insert("keep.example.com");

        let body = r#"[{"name_value":"new.example.com"}"#;
        let err = collector.ingest_json("example.com", body).unwrap_err();

        match err {
            FetchError::Decode { body: raw, .. } => assert_eq!(raw, body),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(collector.subdomains(), vec!["keep.example.com"]);
        assert!(!collector.contains("new.example.com"));
    }

    #[test]
    fn test_non_array_json_is_decode_error() {
        let mut collector = SubdomainCollector::new();
        let err = collector
            .ingest_json("example.com", r#"{"name_value":"a.example.com"}"#)
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert!(collector.is_empty());
    }
}
