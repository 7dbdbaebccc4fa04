use crate::constants::{DETAIL_BASE_URL, LINK_PREFIX, LINK_SUFFIX};
use crate::types::ProfileId;

/// Turns a raw listing href into the canonical announcement id and its
/// detail URL. Pure and total: when the script-call wrapper is absent the
/// strip is a no-op rather than a failure — carried as-is from the source
/// site's link format, where every listing href is a NeuFenster(...) call.
/// No escaping, trimming or validation is applied.
pub fn normalize(raw_token: &str) -> (ProfileId, String) {
    let id = raw_token.strip_prefix(LINK_PREFIX).unwrap_or(raw_token);
    let id = id.strip_suffix(LINK_SUFFIX).unwrap_or(id);
    let detail_url = format!("{DETAIL_BASE_URL}?{id}");
    (ProfileId(id.to_string()), detail_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_the_script_call_wrapper() {
        let (id, url) = normalize("javascript:NeuFenster('HRB123')");
        assert_eq!(id, ProfileId::from("HRB123"));
        assert_eq!(
            url,
            "https://www.handelsregisterbekanntmachungen.de/skripte/hrb.php?HRB123"
        );
    }

    #[test]
    fn unwrapped_tokens_pass_through_unchanged() {
        let (id, url) = normalize("rb_id=4711&land=by");
        assert_eq!(id, ProfileId::from("rb_id=4711&land=by"));
        assert_eq!(
            url,
            "https://www.handelsregisterbekanntmachungen.de/skripte/hrb.php?rb_id=4711&land=by"
        );
    }

    #[test]
    fn partial_wrappers_strip_only_what_is_present() {
        let (id, _) = normalize("javascript:NeuFenster('HRB123");
        assert_eq!(id, ProfileId::from("HRB123"));
        let (id, _) = normalize("HRB123')");
        assert_eq!(id, ProfileId::from("HRB123"));
    }

    #[test]
    fn no_trimming_is_applied() {
        let (id, _) = normalize("javascript:NeuFenster(' HRB123 ')");
        assert_eq!(id, ProfileId::from(" HRB123 "));
    }
}
