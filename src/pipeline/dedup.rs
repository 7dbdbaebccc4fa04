use crate::types::{Candidate, IngestedIdSet};
use std::collections::HashSet;

/// Filters the discovered candidates down to the ones worth extracting:
/// drops every id already present in the ledger snapshot, and keeps only
/// the first occurrence of an id discovered more than once in this batch
/// (the same announcement can match several keywords in one run). Relative
/// order of the survivors is preserved.
pub fn filter_new(candidates: Vec<Candidate>, ingested: &IngestedIdSet) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| !ingested.contains(&candidate.profile_id))
        .filter(|candidate| seen.insert(candidate.profile_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProfileId;

    fn candidate(id: &str, keyword: &str) -> Candidate {
        Candidate {
            keyword: keyword.to_string(),
            profile_id: ProfileId::from(id),
            detail_url: format!("https://example.test/hrb.php?{id}"),
            jurisdiction_name: "Bayern".to_string(),
        }
    }

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.profile_id.as_str()).collect()
    }

    #[test]
    fn empty_batch_stays_empty() {
        let ingested: IngestedIdSet = [ProfileId::from("A")].into_iter().collect();
        assert!(filter_new(Vec::new(), &ingested).is_empty());
    }

    #[test]
    fn known_ids_are_dropped_and_order_is_preserved() {
        let batch = vec![
            candidate("A", "gastro"),
            candidate("C", "gastro"),
            candidate("B", "bar"),
            candidate("D", "bar"),
        ];
        let ingested: IngestedIdSet =
            [ProfileId::from("A"), ProfileId::from("B")].into_iter().collect();
        assert_eq!(ids(&filter_new(batch, &ingested)), vec!["C", "D"]);
    }

    #[test]
    fn same_id_under_two_keywords_survives_once() {
        let batch = vec![
            candidate("X", "gastro"),
            candidate("Y", "gastro"),
            candidate("X", "restaurant"),
        ];
        let survivors = filter_new(batch, &IngestedIdSet::new());
        assert_eq!(ids(&survivors), vec!["X", "Y"]);
        // First occurrence wins, keeping the keyword it was found under.
        assert_eq!(survivors[0].keyword, "gastro");
    }

    #[test]
    fn empty_snapshot_keeps_everything() {
        let batch = vec![candidate("A", "gastro"), candidate("B", "bar")];
        assert_eq!(ids(&filter_new(batch, &IngestedIdSet::new())), vec!["A", "B"]);
    }
}
