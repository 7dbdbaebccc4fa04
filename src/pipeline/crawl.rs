use crate::browser::BrowserAutomation;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::types::QueryTask;
use tracing::{info, instrument};

/// Executes one query task against the portal's search form and returns the
/// raw listing link tokens, possibly empty.
pub struct SearchCrawler<'a> {
    browser: &'a mut dyn BrowserAutomation,
    search: &'a SearchConfig,
}

impl<'a> SearchCrawler<'a> {
    pub fn new(browser: &'a mut dyn BrowserAutomation, search: &'a SearchConfig) -> Self {
        Self { browser, search }
    }

    #[instrument(skip(self), fields(task = %task))]
    pub async fn execute_query(&mut self, task: &QueryTask) -> Result<Vec<String>> {
        self.browser.navigate(&self.search.url).await?;
        self.browser
            .select_option(&self.search.jurisdiction_dropdown, task.jurisdiction.code)
            .await?;
        self.browser
            .select_option(&self.search.subject_dropdown, &self.search.subject_filter_value)
            .await?;
        self.browser
            .type_text(&self.search.keyword_input, &task.keyword)
            .await?;
        self.browser.click(&self.search.submit_button).await?;

        let tokens = self.browser.eval_all_links(&self.search.listing_links).await?;
        info!("found {} listing links for {task}", tokens.len());
        Ok(tokens)
    }
}
