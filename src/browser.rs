use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

/// Capability surface the pipeline uses to drive the registry portal.
/// Production runs use [`HttpBrowser`]; tests substitute a scripted stub.
#[async_trait]
pub trait BrowserAutomation: Send + Sync {
    async fn navigate(&mut self, url: &str) -> Result<()>;
    async fn select_option(&mut self, selector: &str, value: &str) -> Result<()>;
    async fn type_text(&mut self, selector: &str, text: &str) -> Result<()>;
    async fn click(&mut self, selector: &str) -> Result<()>;
    async fn eval_all_links(&self, selector: &str) -> Result<Vec<String>>;
    async fn eval_text(&self, selector: &str) -> Result<String>;
}

static NAME_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"name="([^"]+)""#).unwrap());

/// HTTP-backed implementation of the automation surface.
///
/// The portal is a plain server-rendered form site, so no rendering engine
/// is needed: `select_option` and `type_text` accumulate named form fields
/// (the field name is taken from the CSS selector), `click` submits the
/// current form and replaces the loaded document, and the `eval_*` methods
/// query the document with `scraper`.
pub struct HttpBrowser {
    client: reqwest::Client,
    current_url: Option<reqwest::Url>,
    page: Option<String>,
    form_fields: Vec<(String, String)>,
}

impl Default for HttpBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpBrowser {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            current_url: None,
            page: None,
            form_fields: Vec::new(),
        }
    }

    fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|_| ScrapeError::Config(format!("invalid selector '{selector}'")))
    }

    fn page(&self) -> Result<&str> {
        self.page.as_deref().ok_or_else(|| ScrapeError::Navigation {
            url: String::new(),
            message: "no page loaded".to_string(),
        })
    }

    /// Errors with `SelectorNotFound` unless the selector matches something
    /// in the current document.
    fn require_element(&self, selector: &str) -> Result<()> {
        let sel = Self::parse_selector(selector)?;
        let document = Html::parse_document(self.page()?);
        if document.select(&sel).next().is_some() {
            Ok(())
        } else {
            Err(ScrapeError::SelectorNotFound(selector.to_string()))
        }
    }

    /// Extracts the form field name from a selector like `input[name="fname"]`.
    fn field_name(selector: &str) -> Result<String> {
        NAME_ATTR
            .captures(selector)
            .map(|c| c[1].to_string())
            .ok_or_else(|| {
                ScrapeError::Config(format!("selector '{selector}' carries no name attribute"))
            })
    }

    /// Resolves the submission target of the first form in the document:
    /// (absolute URL, lowercased method, defaulting to "get").
    fn form_target(&self) -> Result<(reqwest::Url, String)> {
        let base = self.current_url.clone().ok_or_else(|| ScrapeError::Navigation {
            url: String::new(),
            message: "no page loaded".to_string(),
        })?;
        let form_sel = Self::parse_selector("form")?;
        let document = Html::parse_document(self.page()?);
        let form = document
            .select(&form_sel)
            .next()
            .ok_or_else(|| ScrapeError::SelectorNotFound("form".to_string()))?;

        let action = form.value().attr("action").unwrap_or("");
        let url = if action.is_empty() {
            base
        } else {
            base.join(action).map_err(|e| ScrapeError::Navigation {
                url: action.to_string(),
                message: format!("cannot resolve form action: {e}"),
            })?
        };
        let method = form
            .value()
            .attr("method")
            .unwrap_or("get")
            .to_ascii_lowercase();
        Ok((url, method))
    }

    fn request_error(url: &str, e: reqwest::Error) -> ScrapeError {
        if e.is_timeout() {
            ScrapeError::Navigation { url: url.to_string(), message: format!("timed out: {e}") }
        } else if e.is_connect() {
            ScrapeError::TransientNetwork(format!("{url}: {e}"))
        } else {
            ScrapeError::Http(e)
        }
    }

    async fn load(&mut self, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        let url = response.url().clone();
        if !status.is_success() {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: format!("status {}", status.as_u16()),
            });
        }
        let body = response
            .text()
            .await
            .map_err(|e| Self::request_error(url.as_str(), e))?;
        debug!("loaded {} ({} bytes)", url, body.len());
        self.current_url = Some(url);
        self.page = Some(body);
        self.form_fields.clear();
        Ok(())
    }
}

#[async_trait]
impl BrowserAutomation for HttpBrowser {
    #[instrument(skip(self))]
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::request_error(url, e))?;
        self.load(response).await
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        self.require_element(selector)?;
        let name = Self::field_name(selector)?;
        self.form_fields.push((name, value.to_string()));
        Ok(())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        self.require_element(selector)?;
        let name = Self::field_name(selector)?;
        self.form_fields.push((name, text.to_string()));
        Ok(())
    }

    #[instrument(skip(self))]
    async fn click(&mut self, selector: &str) -> Result<()> {
        self.require_element(selector)?;
        let (url, method) = self.form_target()?;
        let fields = std::mem::take(&mut self.form_fields);
        let request = if method == "post" {
            self.client.post(url.clone()).form(&fields)
        } else {
            self.client.get(url.clone()).query(&fields)
        };
        let response = request
            .send()
            .await
            .map_err(|e| Self::request_error(url.as_str(), e))?;
        self.load(response).await
    }

    async fn eval_all_links(&self, selector: &str) -> Result<Vec<String>> {
        let sel = Self::parse_selector(selector)?;
        let document = Html::parse_document(self.page()?);
        let hrefs = document
            .select(&sel)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| href.to_string())
            .collect();
        Ok(hrefs)
    }

    async fn eval_text(&self, selector: &str) -> Result<String> {
        let sel = Self::parse_selector(selector)?;
        let document = Html::parse_document(self.page()?);
        let element = document
            .select(&sel)
            .next()
            .ok_or_else(|| ScrapeError::SelectorNotFound(selector.to_string()))?;
        // Verbatim cell text, no whitespace normalization.
        Ok(element.text().collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser_with_page(url: &str, html: &str) -> HttpBrowser {
        let mut browser = HttpBrowser::new();
        browser.current_url = Some(reqwest::Url::parse(url).unwrap());
        browser.page = Some(html.to_string());
        browser
    }

    #[test]
    fn field_name_comes_from_the_selector() {
        assert_eq!(HttpBrowser::field_name(r#"select[name="land"]"#).unwrap(), "land");
        assert_eq!(HttpBrowser::field_name(r#"input[name="fname"]"#).unwrap(), "fname");
        assert!(HttpBrowser::field_name(r#"input[type="submit"]"#).is_err());
    }

    #[test]
    fn form_target_resolves_relative_action() {
        let browser = browser_with_page(
            "https://example.test/?aktion=suche",
            r#"<html><body><form action="?aktion=suche" method="post"><input name="fname"></form></body></html>"#,
        );
        let (url, method) = browser.form_target().unwrap();
        assert_eq!(url.as_str(), "https://example.test/?aktion=suche");
        assert_eq!(method, "post");
    }

    #[test]
    fn form_target_defaults_to_get_on_current_url() {
        let browser = browser_with_page(
            "https://example.test/suche",
            "<html><body><form><input name=\"fname\"></form></body></html>",
        );
        let (url, method) = browser.form_target().unwrap();
        assert_eq!(url.as_str(), "https://example.test/suche");
        assert_eq!(method, "get");
    }

    #[tokio::test]
    async fn missing_element_is_a_selector_error() {
        let mut browser = browser_with_page(
            "https://example.test/",
            "<html><body><p>nothing here</p></body></html>",
        );
        let err = browser
            .select_option(r#"select[name="land"]"#, "by")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::SelectorNotFound(_)));
    }

    #[tokio::test]
    async fn eval_text_is_verbatim() {
        let browser = browser_with_page(
            "https://example.test/",
            "<html><body><span id=\"cell\">  Amtsgericht München \n</span></body></html>",
        );
        let text = browser.eval_text("#cell").await.unwrap();
        assert_eq!(text, "  Amtsgericht München \n");
    }

    #[tokio::test]
    async fn eval_all_links_returns_raw_hrefs() {
        let browser = browser_with_page(
            "https://example.test/",
            r##"<html><body><div id="inhalt">
                <a href="javascript:NeuFenster('rb_id=100')">one</a>
                <a href="javascript:NeuFenster('rb_id=200')">two</a>
            </div></body></html>"##,
        );
        let links = browser.eval_all_links("#inhalt a").await.unwrap();
        assert_eq!(
            links,
            vec![
                "javascript:NeuFenster('rb_id=100')",
                "javascript:NeuFenster('rb_id=200')"
            ]
        );
    }
}
