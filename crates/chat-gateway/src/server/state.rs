//! Gateway state
//!
//! Application state for the gateway server.

use crate::broadcast::EventDispatcher;
use crate::connection::ConnectionManager;
use crate::presence::PresenceRegistry;
use chat_common::AppConfig;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server. Created once at
/// startup and cloned into every connection task.
#[derive(Clone)]
pub struct GatewayState {
    /// Connection manager for WebSocket connections and rooms
    connection_manager: Arc<ConnectionManager>,
    /// Online users
    presence: Arc<PresenceRegistry>,
    /// Fan-out of server events
    event_dispatcher: EventDispatcher,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state with empty registries
    pub fn new(config: AppConfig) -> Self {
        let connection_manager = ConnectionManager::new_shared();
        let event_dispatcher = EventDispatcher::new(connection_manager.clone());

        Self {
            connection_manager,
            presence: Arc::new(PresenceRegistry::new()),
            event_dispatcher,
            config: Arc::new(config),
        }
    }

    /// Get the connection manager
    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    /// Get the presence registry
    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    /// Get the event dispatcher
    pub fn event_dispatcher(&self) -> &EventDispatcher {
        &self.event_dispatcher
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("online_users", &self.presence.len())
            .field("config", &"AppConfig")
            .finish()
    }
}
