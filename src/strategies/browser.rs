//! Headless-browser extraction, the last resort for script-rendered pages.
//!
//! The strategy only runs for hosts on the configured allow-list. It launches
//! the primary browser target, falls back to the secondary one when the
//! primary fails to start, and gives up with `BrowserUnavailable` when both
//! fail. Once a session exists it is closed exactly once before returning,
//! whatever happened in between.
//!
//! Launching goes through [`BrowserLauncher`] so the chromium implementation
//! can be swapped for a fake in tests. [`start_session`] is shared with the
//! feed runner, which renders listing pages to discover article links.

use super::structural::CONTENT_SELECTORS;
use super::{Candidate, PageContext, Strategy};
use crate::config::{BrowserSettings, BrowserTarget};
use crate::error::ExtractError;
use crate::models::{StrategyKind, host_matches};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// An anchor read from a rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RenderedLink {
    /// Absolute URL, as resolved by the browser.
    pub href: String,
    /// Visible text of the anchor.
    pub text: String,
}

/// Starts browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, target: &BrowserTarget) -> Result<Box<dyn BrowserSession>, ExtractError>;
}

/// One running browser with a single page.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &Url) -> Result<(), ExtractError>;

    /// Wait until `selector` matches, or fail with `Timeout`.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), ExtractError>;

    /// Rendered text of the first element matching `selector`, `None` if
    /// nothing matches.
    async fn element_text(&mut self, selector: &str) -> Result<Option<String>, ExtractError>;

    async fn body_text(&mut self) -> Result<String, ExtractError>;

    /// Every anchor matching `selector`, in document order.
    async fn links(&mut self, selector: &str) -> Result<Vec<RenderedLink>, ExtractError>;

    /// Terminate the browser process.
    async fn close(&mut self) -> Result<(), ExtractError>;
}

/// Launch the primary target, then the fallback.
///
/// Fails with `BrowserUnavailable` only when neither starts.
pub async fn start_session(
    launcher: &dyn BrowserLauncher,
    settings: &BrowserSettings,
) -> Result<Box<dyn BrowserSession>, ExtractError> {
    let primary = &settings.primary;
    let primary_err = match launcher.launch(primary).await {
        Ok(session) => return Ok(session),
        Err(e) => e,
    };
    warn!(
        executable = %primary.executable.display(),
        error = %primary_err,
        "Primary browser failed to start; trying fallback"
    );

    let fallback = &settings.fallback;
    launcher.launch(fallback).await.map_err(|fallback_err| {
        ExtractError::BrowserUnavailable(format!(
            "{}: {primary_err}; {}: {fallback_err}",
            primary.executable.display(),
            fallback.executable.display()
        ))
    })
}

pub struct BrowserStrategy {
    launcher: Arc<dyn BrowserLauncher>,
    settings: BrowserSettings,
    min_chars: usize,
}

impl BrowserStrategy {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, settings: BrowserSettings, min_chars: usize) -> Self {
        Self {
            launcher,
            settings,
            min_chars,
        }
    }

    async fn render(&self, session: &mut dyn BrowserSession, url: &Url) -> Result<Option<Candidate>, ExtractError> {
        session.navigate(url).await?;
        session
            .wait_for(&self.settings.wait_selector, self.settings.wait_timeout())
            .await?;

        for selector in CONTENT_SELECTORS {
            match session.element_text(selector).await {
                Ok(Some(text)) => {
                    if let Some(candidate) = Candidate::accept(text.trim(), self.min_chars) {
                        return Ok(Some(candidate));
                    }
                }
                Ok(None) => {}
                Err(e) => debug!(selector, error = %e, "Selector lookup failed"),
            }
        }

        debug!("No rendered selector matched; using page body");
        let body = session.body_text().await?;
        Ok(Candidate::accept(body.trim(), self.min_chars))
    }
}

#[async_trait]
impl Strategy for BrowserStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BrowserAutomation
    }

    fn applies_to(&self, url: &Url) -> bool {
        self.settings
            .allowed_domains
            .iter()
            .any(|domain| host_matches(url, domain))
    }

    #[instrument(level = "info", skip_all, fields(url = %page.url()))]
    async fn attempt(&self, page: &mut PageContext<'_>) -> Result<Option<Candidate>, ExtractError> {
        let mut session = start_session(self.launcher.as_ref(), &self.settings)
            .await
            .inspect_err(|e| warn!(error = %e, "Browser automation unavailable"))?;

        let outcome = self.render(session.as_mut(), page.url()).await;

        match session.close().await {
            Ok(()) => info!("Browser closed"),
            Err(e) => warn!(error = %e, "Browser did not close cleanly"),
        }
        outcome
    }
}

/// Scripted launcher and session for tests.
#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    pub struct Script {
        pub fail_launch: Vec<PathBuf>,
        pub wait_times_out: bool,
        pub navigate_fails: bool,
        pub elements: Vec<(&'static str, String)>,
        pub body: String,
        pub links: Vec<RenderedLink>,
    }

    #[derive(Default)]
    pub struct FakeLauncher {
        pub script: Script,
        pub closes: Arc<AtomicUsize>,
        pub launched: Arc<Mutex<Vec<PathBuf>>>,
        pub navigated: Arc<Mutex<Vec<String>>>,
    }

    impl FakeLauncher {
        pub fn new(script: Script) -> Self {
            Self {
                script,
                ..Default::default()
            }
        }

        pub fn closes(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }

        pub fn launched(&self) -> Vec<PathBuf> {
            self.launched.lock().unwrap().clone()
        }

        pub fn navigated(&self) -> Vec<String> {
            self.navigated.lock().unwrap().clone()
        }
    }

    struct FakeSession {
        script: Script,
        closes: Arc<AtomicUsize>,
        navigated: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        async fn launch(&self, target: &BrowserTarget) -> Result<Box<dyn BrowserSession>, ExtractError> {
            self.launched.lock().unwrap().push(target.executable.clone());
            if self.script.fail_launch.contains(&target.executable) {
                return Err(ExtractError::browser("no such executable"));
            }
            Ok(Box::new(FakeSession {
                script: self.script.clone(),
                closes: self.closes.clone(),
                navigated: self.navigated.clone(),
            }))
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn navigate(&mut self, url: &Url) -> Result<(), ExtractError> {
            self.navigated.lock().unwrap().push(url.to_string());
            if self.script.navigate_fails {
                return Err(ExtractError::browser("navigation crashed"));
            }
            Ok(())
        }

        async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), ExtractError> {
            if self.script.wait_times_out {
                return Err(ExtractError::Timeout {
                    what: selector.to_string(),
                    millis: timeout.as_millis(),
                });
            }
            Ok(())
        }

        async fn element_text(&mut self, selector: &str) -> Result<Option<String>, ExtractError> {
            Ok(self
                .script
                .elements
                .iter()
                .find(|(sel, _)| *sel == selector)
                .map(|(_, text)| text.clone()))
        }

        async fn body_text(&mut self) -> Result<String, ExtractError> {
            Ok(self.script.body.clone())
        }

        async fn links(&mut self, _selector: &str) -> Result<Vec<RenderedLink>, ExtractError> {
            Ok(self.script.links.clone())
        }

        async fn close(&mut self) -> Result<(), ExtractError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
