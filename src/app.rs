//! Application bootstrap.
//!
//! `App` bundles what every command needs: the API client, the context store
//! and the user settings.

use std::time::Duration;

use tracing::debug;

use crate::api::BacklogClient;
use crate::config::{Environment, Settings};
use crate::context::{ContextStore, ProjectContext};
use crate::error::{AppError, Result};

/// Shared state for one command invocation.
#[derive(Debug)]
pub struct App {
    /// The Backlog API client.
    client: BacklogClient,
    /// Local project context and workflow config.
    store: ContextStore,
    /// User settings.
    settings: Settings,
}

impl App {
    /// Create an application from user settings, the process environment
    /// and the working directory's `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file is invalid or a required
    /// credential is missing.
    pub fn from_environment() -> Result<Self> {
        let settings = Settings::load()?;
        let cwd = std::env::current_dir()?;
        let env = Environment::load(&cwd);
        Self::new(settings, &env)
    }

    /// Create an application from explicit settings and environment.
    pub fn new(settings: Settings, env: &Environment) -> Result<Self> {
        let credentials = env.credentials(&settings)?;
        let delay = Duration::from_millis(settings.rate_limit_delay_ms);
        let client = BacklogClient::with_rate_limit(credentials, delay)?;
        let store = ContextStore::new(settings.context_dir());

        debug!(context_dir = %store.dir().display(), "Application initialized");
        Ok(Self::with_parts(client, store, settings))
    }

    /// Assemble an application from ready-made parts.
    pub fn with_parts(client: BacklogClient, store: ContextStore, settings: Settings) -> Self {
        Self {
            client,
            store,
            settings,
        }
    }

    /// The API client.
    pub fn client(&self) -> &BacklogClient {
        &self.client
    }

    /// The context store.
    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    /// The user settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The current project, or `AppError::NoProject` if none is selected.
    pub fn require_project(&self) -> Result<ProjectContext> {
        self.store.load().ok_or(AppError::NoProject)
    }
}
