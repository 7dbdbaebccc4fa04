use crate::browser::BrowserAutomation;
use crate::config::DetailSelectors;
use crate::error::Result;
use crate::types::{Candidate, ProfileRecord};
use tracing::{debug, instrument};

/// Fetches an announcement's detail page and copies the four fixed table
/// cells into a record, verbatim and with no whitespace normalization.
pub struct DetailExtractor<'a> {
    browser: &'a mut dyn BrowserAutomation,
    selectors: &'a DetailSelectors,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(browser: &'a mut dyn BrowserAutomation, selectors: &'a DetailSelectors) -> Self {
        Self { browser, selectors }
    }

    #[instrument(skip(self, candidate), fields(profile_id = %candidate.profile_id))]
    pub async fn extract(&mut self, candidate: &Candidate) -> Result<ProfileRecord> {
        self.browser.navigate(&candidate.detail_url).await?;

        let court_info = self.browser.eval_text(&self.selectors.court_info).await?;
        let publication_info = self.browser.eval_text(&self.selectors.publication_info).await?;
        let registration_date = self.browser.eval_text(&self.selectors.registration_date).await?;
        let registration_details =
            self.browser.eval_text(&self.selectors.registration_details).await?;

        debug!("extracted announcement {}", candidate.profile_id);

        Ok(ProfileRecord {
            keyword: candidate.keyword.clone(),
            profile_id: candidate.profile_id.clone(),
            detail_url: candidate.detail_url.clone(),
            jurisdiction: candidate.jurisdiction_name.clone(),
            court_info,
            publication_info,
            registration_date,
            registration_details,
        })
    }
}
