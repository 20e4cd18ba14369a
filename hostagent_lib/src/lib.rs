//! Library layer for the host agent client: reload polling, persisted
//! preferences, configuration, validation, and the apply/reload/refetch
//! workflow built on `hostagent_api`.

pub mod config;
pub mod error;
pub mod notify;
pub mod preferences;
pub mod reload;
pub mod session;
pub mod validation;

pub use hostagent_api;
pub use hostagent_api::{
    Client, Error as RequestError, Method, Outcome, Request, RequestContext, ResponseBody,
};

pub use config::ClientConfig;
pub use error::HostAgentError;
pub use notify::{MemoryNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use preferences::{Preferences, PreferencesError};
pub use reload::{
    backoff_delay, PingProbe, Probe, ReloadPoller, ReloadReport, ReloadSchedule, ReloadState,
    Sleeper, TokioSleeper,
};
pub use session::{ApplyReport, ApplyRequest, Profile, Session};
