use crate::domain::model::{AccountKey, ResolutionResult};
use crate::domain::ports::Resolver;
use crate::utils::error::{ResolverError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::{Duration, Instant};

// W3C WebDriver element identifier key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
// WebDriver key code for Enter.
const ENTER_KEY: char = '\u{E007}';

// Scraping contract with the billing site's current markup.
const SEARCH_BOX_SELECTOR: &str = "#searchTextBox";
const RESULT_CELL_XPATH: &str =
    "//tr[contains(@class,'fontsize') and contains(@class,'content')]/td[1]";

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// WebDriver server endpoint (chromedriver).
    pub webdriver_url: String,
    /// Billing site search page.
    pub page_url: String,
    /// Bounded wait for the search input to appear.
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    /// Pause after submitting a key, before reading the result.
    pub settle_delay: Duration,
    /// Pause after resetting back to the search page.
    pub reset_delay: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            page_url: "https://bill.pitc.com.pk/pescobill".to_string(),
            wait_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
            settle_delay: Duration::from_secs(3),
            reset_delay: Duration::from_secs(1),
        }
    }
}

/// One long-lived automated-browser session for the whole batch, driven over
/// the W3C WebDriver wire protocol. The session is opened once, reset to the
/// search page after every row, and released unconditionally at the end.
pub struct BrowserSession {
    client: Client,
    config: BrowserConfig,
    session_id: Option<String>,
}

impl BrowserSession {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            session_id: None,
        }
    }

    fn session_id(&self) -> Result<&str> {
        self.session_id
            .as_deref()
            .ok_or_else(|| ResolverError::webdriver("browser session is not open"))
    }

    /// Issues one WebDriver command and unwraps the `value` envelope.
    /// Non-2xx responses carry a JSON error body; its message is surfaced.
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.config.webdriver_url.trim_end_matches('/'), path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let envelope: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = envelope
                .pointer("/value/message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown WebDriver error");
            return Err(ResolverError::webdriver(format!(
                "{} {}: {}",
                status, path, message
            )));
        }

        Ok(envelope.get("value").cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let path = format!("/session/{}/url", self.session_id()?);
        self.command(Method::POST, &path, Some(serde_json::json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn find_element(&self, using: &str, selector: &str) -> Result<String> {
        let path = format!("/session/{}/element", self.session_id()?);
        let value = self
            .command(
                Method::POST,
                &path,
                Some(serde_json::json!({ "using": using, "value": selector })),
            )
            .await?;

        value
            .get(ELEMENT_KEY)
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ResolverError::webdriver(format!("no element reference for {}", selector))
            })
    }

    async fn wait_for_element(&self, using: &str, selector: &str) -> Result<String> {
        let deadline = Instant::now() + self.config.wait_timeout;
        loop {
            match self.find_element(using, selector).await {
                Ok(element) => return Ok(element),
                Err(e) => {
                    if Instant::now() >= deadline {
                        return Err(ResolverError::webdriver(format!(
                            "timed out waiting for {}: {}",
                            selector, e
                        )));
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }

    async fn clear_element(&self, element: &str) -> Result<()> {
        let path = format!("/session/{}/element/{}/clear", self.session_id()?, element);
        self.command(Method::POST, &path, Some(serde_json::json!({})))
            .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &str, text: &str) -> Result<()> {
        let path = format!("/session/{}/element/{}/value", self.session_id()?, element);
        self.command(Method::POST, &path, Some(serde_json::json!({ "text": text })))
            .await?;
        Ok(())
    }

    async fn element_text(&self, element: &str) -> Result<String> {
        let path = format!("/session/{}/element/{}/text", self.session_id()?, element);
        let value = self.command(Method::GET, &path, None).await?;
        Ok(value.as_str().unwrap_or("").to_string())
    }

    /// Back to the search page, then the fixed pause the site needs.
    async fn reset(&self) -> Result<()> {
        self.navigate(&self.config.page_url).await?;
        tokio::time::sleep(self.config.reset_delay).await;
        Ok(())
    }

    /// Submit the key and read the result cell. Failure to locate the result
    /// cell means "no match" (`Empty`); any error in the navigation or
    /// submission path propagates to the caller as a transport failure.
    async fn submit_and_read(&self, key: &AccountKey) -> Result<ResolutionResult> {
        let input = self
            .wait_for_element("css selector", SEARCH_BOX_SELECTOR)
            .await?;
        self.clear_element(&input).await?;
        self.send_keys(&input, &format!("{}{}", key.as_str(), ENTER_KEY))
            .await?;
        tokio::time::sleep(self.config.settle_delay).await;

        let text = match self.find_element("xpath", RESULT_CELL_XPATH).await {
            Ok(cell) => self.element_text(&cell).await.ok(),
            Err(_) => None,
        };

        Ok(match text.map(|t| t.trim().to_string()) {
            Some(id) if !id.is_empty() => ResolutionResult::CustomerId(id),
            _ => ResolutionResult::Empty,
        })
    }
}

#[async_trait]
impl Resolver for BrowserSession {
    async fn open(&mut self) -> Result<()> {
        let capabilities = serde_json::json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": ["--disable-gpu", "--no-sandbox", "--disable-dev-shm-usage"]
                    }
                }
            }
        });

        let value = self
            .command(Method::POST, "/session", Some(capabilities))
            .await?;

        let session_id = value
            .get("sessionId")
            .and_then(|id| id.as_str())
            .ok_or_else(|| ResolverError::webdriver("session response without sessionId"))?
            .to_string();

        tracing::debug!("Browser session {} opened", session_id);
        self.session_id = Some(session_id);

        self.navigate(&self.config.page_url).await?;
        tokio::time::sleep(self.config.reset_delay).await;
        Ok(())
    }

    async fn resolve(&mut self, key: &AccountKey) -> ResolutionResult {
        let outcome = self.submit_and_read(key).await;
        // Reset to the search page before the next key, regardless of outcome.
        let reset = self.reset().await;

        match (outcome, reset) {
            (Ok(result), Ok(())) => result,
            (Err(e), _) => {
                tracing::warn!("Browser lookup failed for {}: {}", key, e);
                ResolutionResult::Error
            }
            (_, Err(e)) => {
                tracing::warn!("Search page reset failed after {}: {}", key, e);
                ResolutionResult::Error
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(session_id) = self.session_id.take() {
            let path = format!("/session/{}", session_id);
            self.command(Method::DELETE, &path, None).await?;
            tracing::debug!("Browser session {} closed", session_id);
        }
        Ok(())
    }
}
