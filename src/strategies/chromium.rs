//! Chromium launcher speaking the DevTools protocol through `chromiumoxide`.
//!
//! The browser talks CDP over a websocket, so no separate driver process is
//! needed: a [`BrowserTarget`] is just an executable path plus extra flags.

use super::browser::{BrowserLauncher, BrowserSession, RenderedLink};
use crate::config::{BrowserTarget, DEFAULT_USER_AGENT, HttpSettings};
use crate::error::ExtractError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, trace};
use url::Url;

const FIRST_POLL: Duration = Duration::from_millis(100);
const MAX_POLL: Duration = Duration::from_secs(1);

/// Flags every launch gets, before the target's own.
const BASE_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
];

#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    user_agent: String,
    request_timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(user_agent: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            request_timeout,
        }
    }

    /// Same user agent and timeout as the HTTP fetcher.
    pub fn from_http(http: &HttpSettings) -> Self {
        Self::new(http.user_agent.clone(), http.timeout())
    }

    fn config_for(&self, target: &BrowserTarget) -> Result<BrowserConfig, ExtractError> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&target.executable)
            .request_timeout(self.request_timeout)
            .window_size(1920, 1080)
            .arg(format!("--user-agent={}", self.user_agent));
        for arg in BASE_ARGS {
            builder = builder.arg(*arg);
        }
        for arg in &target.args {
            builder = builder.arg(arg.as_str());
        }
        builder
            .build()
            .map_err(|e| ExtractError::browser(format!("invalid browser config: {e}")))
    }
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT, Duration::from_secs(30))
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, target: &BrowserTarget) -> Result<Box<dyn BrowserSession>, ExtractError> {
        let config = self.config_for(target)?;
        info!(executable = %target.executable.display(), "Launching headless browser");

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(ExtractError::browser)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    let msg = e.to_string();
                    // chromiumoxide cannot decode every CDP event; those are harmless.
                    if msg.contains("did not match any variant") || msg.contains("Failed to deserialize") {
                        trace!(error = %msg, "Ignored CDP decode error");
                    } else {
                        error!(error = %msg, "Browser handler error");
                    }
                }
            }
            debug!("Browser handler finished");
        });

        Ok(Box::new(ChromiumSession {
            browser,
            handler,
            page: None,
            closed: false,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
    closed: bool,
}

impl ChromiumSession {
    fn page(&self) -> Result<Page, ExtractError> {
        self.page
            .clone()
            .ok_or_else(|| ExtractError::browser("no page open"))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &Url) -> Result<(), ExtractError> {
        let page = self
            .browser
            .new_page(url.as_str())
            .await
            .map_err(ExtractError::browser)?;
        self.page = Some(page);
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), ExtractError> {
        let page = self.page()?;
        let deadline = Instant::now() + timeout;
        let mut delay = FIRST_POLL;
        loop {
            if page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ExtractError::Timeout {
                    what: format!("selector {selector:?}"),
                    millis: timeout.as_millis(),
                });
            }
            sleep(delay.min(deadline - now)).await;
            delay = (delay * 2).min(MAX_POLL);
        }
    }

    async fn element_text(&mut self, selector: &str) -> Result<Option<String>, ExtractError> {
        let page = self.page()?;
        let Ok(element) = page.find_element(selector).await else {
            return Ok(None);
        };
        element.inner_text().await.map_err(ExtractError::browser)
    }

    async fn body_text(&mut self) -> Result<String, ExtractError> {
        let value = self
            .page()?
            .evaluate("document.body.innerText")
            .await
            .map_err(ExtractError::browser)?
            .into_value::<serde_json::Value>()
            .map_err(ExtractError::browser)?;
        match value {
            serde_json::Value::String(text) => Ok(text),
            _ => Ok(String::new()),
        }
    }

    async fn links(&mut self, selector: &str) -> Result<Vec<RenderedLink>, ExtractError> {
        let selector = serde_json::to_string(selector).map_err(ExtractError::browser)?;
        let script = format!(
            "Array.from(document.querySelectorAll({selector}))\
             .map(a => ({{ href: a.href || '', text: a.innerText || '' }}))"
        );
        self.page()?
            .evaluate(script)
            .await
            .map_err(ExtractError::browser)?
            .into_value::<Vec<RenderedLink>>()
            .map_err(ExtractError::browser)
    }

    async fn close(&mut self) -> Result<(), ExtractError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let closed = self.browser.close().await.map_err(ExtractError::browser);
        if closed.is_ok() {
            if let Err(e) = self.browser.wait().await {
                debug!(error = %e, "Browser process did not exit cleanly");
            }
        }
        self.handler.abort();
        closed.map(|_| ())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
