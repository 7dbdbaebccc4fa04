use crate::types::{Jurisdiction, QueryTask};

/// Builds the run's query plan: the full (jurisdiction × keyword) cross
/// product in deterministic order — keyword varies in the outer iteration,
/// jurisdiction in the inner. Pure function of its inputs.
pub fn generate(jurisdictions: &[Jurisdiction], keywords: &[String]) -> Vec<QueryTask> {
    let mut tasks = Vec::with_capacity(jurisdictions.len() * keywords.len());
    for keyword in keywords {
        for jurisdiction in jurisdictions {
            tasks.push(QueryTask {
                jurisdiction: *jurisdiction,
                keyword: keyword.clone(),
            });
        }
    }
    tasks
}
