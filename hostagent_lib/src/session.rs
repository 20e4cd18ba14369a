//! The configuration workflow: submit a change, wait for the backend to
//! restart, then refetch its state.

use std::path::PathBuf;
use std::time::Duration;

use hostagent_api::{Client, Outcome, Request, RequestContext, ResponseBody};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ClientConfig;
use crate::error::HostAgentError;
use crate::notify::{Notification, Notifier};
use crate::preferences::Preferences;
use crate::reload::{PingProbe, ReloadPoller, ReloadReport, ReloadSchedule};
use crate::validation::validate_base_path;

/// Route returning the logged-in user's profile and current settings.
pub const PROFILE_PATH: &str = "ui/profile";

/// Logged-in user and the backend settings the UI cares about.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub config: ProfileConfig,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Prefix the backend serves under.
    #[serde(rename = "urlbase", default, skip_serializing_if = "Option::is_none")]
    pub url_base: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A configuration write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    pub path: String,
    pub body: Option<String>,
    /// Base path the backend will serve under after it restarts, when the
    /// change moves it.
    pub base_path: Option<String>,
}

impl ApplyRequest {
    pub fn new(path: impl Into<String>, body: Option<String>) -> Self {
        Self {
            path: path.into(),
            body,
            base_path: None,
        }
    }

    pub fn moving_to(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }
}

/// What a completed configuration write produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    pub response: ResponseBody,
    pub reload: ReloadReport,
    pub profile: Profile,
    pub base_path_changed: bool,
}

/// A client bound to one backend, carrying the preferences every request reads.
pub struct Session {
    client: Client,
    origin: Url,
    api_key: Option<String>,
    timeout: Duration,
    prefs: Preferences,
    prefs_path: Option<PathBuf>,
    schedule: ReloadSchedule,
}

impl Session {
    pub fn new(client: Client, config: &ClientConfig, prefs: Preferences) -> Self {
        Self {
            client,
            origin: config.url.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
            prefs,
            prefs_path: None,
            schedule: ReloadSchedule::default(),
        }
    }

    /// Persist preference changes to `path`.
    pub fn with_prefs_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.prefs_path = Some(path.into());
        self
    }

    pub fn with_schedule(mut self, schedule: ReloadSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Request context built from the current preferences.
    pub fn context(&self) -> RequestContext {
        self.prefs
            .context(self.origin.clone(), self.api_key.clone(), self.timeout)
    }

    pub async fn request(&self, request: &Request) -> Outcome {
        self.client.request(&self.context(), request).await
    }

    pub async fn ping(&self) -> Outcome {
        self.client.ping(&self.context()).await
    }

    /// Fetches the profile. A 403 surfaces as [`HostAgentError::LoggedOut`].
    pub async fn profile(&self) -> Result<Profile, HostAgentError> {
        fetch_profile(&self.client, &self.context()).await
    }

    /// Polls the liveness endpoint until the backend is back.
    pub async fn wait_for_reload<N: Notifier>(
        &self,
        notifier: &N,
    ) -> Result<ReloadReport, HostAgentError> {
        let ctx = self.context();
        ReloadPoller::new(PingProbe::new(&self.client, &ctx))
            .with_schedule(self.schedule)
            .wait(notifier)
            .await
    }

    /// Submits a configuration change, waits for the backend to restart and
    /// refetches the profile.
    ///
    /// Preferences only change once the backend is back: a moved base path
    /// from `apply.base_path` and any `urlbase` the refreshed profile reports
    /// are adopted then, and persisted if a preferences file is attached. On
    /// failure the preferences are left as they were and one error
    /// notification is sent.
    pub async fn apply<N: Notifier>(
        &mut self,
        apply: &ApplyRequest,
        notifier: &N,
    ) -> Result<ApplyReport, HostAgentError> {
        let mut prefs = self.prefs.clone();
        if let Some(moved) = &apply.base_path {
            prefs.base_path = validate_base_path(moved)?;
        }
        let ctx = self.context();

        let request = Request::post(apply.path.as_str(), apply.body.clone());
        let response = match self.client.request(&ctx, &request).await.into_result() {
            Ok(body) => body,
            Err(e) => {
                notifier.notify(Notification::error(e.to_string()));
                return Err(e.into());
            }
        };
        tracing::info!("{} accepted, waiting for reload", apply.path);

        let ctx = prefs.context(self.origin.clone(), self.api_key.clone(), self.timeout);

        // The poller sends its own success or failure notification.
        let reload = ReloadPoller::new(PingProbe::new(&self.client, &ctx))
            .with_schedule(self.schedule)
            .wait(notifier)
            .await?;

        let profile = match fetch_profile(&self.client, &ctx).await {
            Ok(p) => p,
            Err(e) => {
                notifier.notify(Notification::error(e.to_string()));
                return Err(e);
            }
        };

        if let Some(url_base) = &profile.config.url_base {
            match validate_base_path(url_base) {
                Ok(valid) => prefs.base_path = valid,
                Err(e) => tracing::warn!("Ignoring urlbase from profile: {}", e),
            }
        }

        let base_path_changed = !same_base_path(&prefs.base_path, &self.prefs.base_path);
        if base_path_changed {
            tracing::info!(
                "Base path changed from {} to {}",
                self.prefs.base_path,
                prefs.base_path
            );
            if let Some(path) = &self.prefs_path {
                prefs.save(path)?;
            }
            self.prefs = prefs;
        }

        Ok(ApplyReport {
            response,
            reload,
            profile,
            base_path_changed,
        })
    }

    /// Updates the base path preference, persisting it if a file is attached.
    pub fn set_base_path(&mut self, base_path: &str) -> Result<(), HostAgentError> {
        self.prefs.base_path = validate_base_path(base_path)?;
        self.persist()
    }

    pub fn set_locale(&mut self, locale: &str) -> Result<(), HostAgentError> {
        self.prefs.locale = crate::validation::validate_locale(locale)?;
        self.persist()
    }

    fn persist(&self) -> Result<(), HostAgentError> {
        if let Some(path) = &self.prefs_path {
            self.prefs.save(path)?;
        }
        Ok(())
    }
}

/// Base paths that differ only by one trailing `/` join to the same URLs.
fn same_base_path(a: &str, b: &str) -> bool {
    a.strip_suffix('/').unwrap_or(a) == b.strip_suffix('/').unwrap_or(b)
}

async fn fetch_profile(client: &Client, ctx: &RequestContext) -> Result<Profile, HostAgentError> {
    let outcome = client.get(ctx, PROFILE_PATH, true).await;
    Ok(outcome.json::<Profile>()?)
}
