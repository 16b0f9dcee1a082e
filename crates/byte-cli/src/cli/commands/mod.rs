//! CLI command handlers.

pub mod config;
pub mod fetch;
pub mod prefs;
pub mod send;

use std::time::Duration;

use anyhow::Result;
use byte_core::backend::BackendClient;
use byte_core::config::Config;
use byte_core::dashboard::Dashboard;
use byte_core::dispatch::DispatchComposer;
use byte_core::fetch::{FetchOrchestrator, Resource};
use byte_core::notify::NotificationController;

/// Backend-facing pieces shared by `fetch` and `send`.
pub struct Session {
    pub orchestrator: FetchOrchestrator,
    pub composer: DispatchComposer,
    pub dashboard: Dashboard,
}

impl Session {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = BackendClient::from_config(config)?;
        let deadline: Duration = config.fetch_timeout();
        Ok(Self {
            orchestrator: FetchOrchestrator::new(client.clone(), Resource::all(), deadline),
            composer: DispatchComposer::new(client, deadline),
            dashboard: Dashboard::new(NotificationController::new(config.notification_ttl())),
        })
    }

    /// Loads every bucket, echoing any notification to stderr.
    pub async fn load(&mut self) {
        self.dashboard.refresh(&self.orchestrator).await;
        if let Some(notification) = self.dashboard.notifications().current() {
            eprintln!("{}", notification.text);
        }
    }
}
