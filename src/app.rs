//! Application state shared by every console surface.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::config_store::ConfigStore;
use crate::error::{AppResult, AuthError};
use crate::navigation::{NavigationGuard, RouteTable};
use crate::notify::Notifier;
use crate::review::ReviewWorkspace;
use crate::session::{HydrateOutcome, SessionContext};
use crate::storage::{SessionStore, SqliteSessionStore};
use crate::tasks::TaskStore;

/// How the session looked after start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupSession {
    /// Hydration finished with the given outcome.
    Hydrated(HydrateOutcome),
    /// The backend could not confirm the session; the cached profile is used.
    Degraded,
}

/// Application state
pub struct Console {
    /// Console configuration.
    pub config: Config,
    /// Session, navigator and gateway sharing one identity.
    pub context: SessionContext,
    /// Access control for route changes.
    pub guard: NavigationGuard,
    /// Cached task list.
    pub tasks: TaskStore,
    /// Working generation configuration.
    pub task_config: ConfigStore,
    /// Working copy of review items.
    pub reviews: ReviewWorkspace,
}

impl Console {
    /// Wire every component to `store` and `notifier`
    pub fn new(
        config: Config,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> AppResult<Self> {
        let context = SessionContext::new(&config.api, config.request.clone(), store, notifier)?;

        let guard = NavigationGuard::new(context.manager.clone(), RouteTable::console());
        let tasks = TaskStore::new(context.gateway.clone(), context.notifier.clone());
        let task_config = ConfigStore::new(context.gateway.clone(), context.notifier.clone());
        let reviews = ReviewWorkspace::new(
            context.gateway.clone(),
            context.session.clone(),
            context.notifier.clone(),
        );

        Ok(Self {
            config,
            context,
            guard,
            tasks,
            task_config,
            reviews,
        })
    }

    /// Open the SQLite state store from `config` and wire the console to it
    pub async fn open(config: Config, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        let store = SqliteSessionStore::new(&config.state).await?;
        info!(path = %config.state.path.display(), "Client state opened");
        Self::new(config, Arc::new(store), notifier)
    }

    /// Restore the persisted session and confirm it with the backend.
    ///
    /// An unconfirmable session with a cached profile is not an error.
    pub async fn start(&self) -> AppResult<StartupSession> {
        let manager = &self.context.manager;
        manager.restore().await?;

        match manager.hydrate().await {
            Ok(outcome) => Ok(StartupSession::Hydrated(outcome)),
            Err(AuthError::Gateway(e)) if manager.snapshot().await.user.is_some() => {
                warn!(error = %e, "Backend unavailable, using cached profile");
                Ok(StartupSession::Degraded)
            }
            Err(e) => Err(e.into()),
        }
    }
}
