//! Root Dioxus application component
//!
//! This module contains the main App component that serves as the root of the UI tree.

use crate::api::{ApiError, Gateway, HttpGateway};
use crate::conversation::ConversationController;
use crate::storage::local::{FileStore, KeyValueStore, MemoryStore};
use crate::storage::session::SessionStore;
use crate::storage::settings::AppSettings;
use crate::types::message::MessageId;
use crate::ui::ChatScreen;
use dioxus::prelude::*;
use std::sync::Arc;

/// Process-wide collaborators built before the window opens
#[derive(Clone)]
pub struct Services {
    pub gateway: Arc<dyn Gateway>,
    pub settings: AppSettings,
}

impl Services {
    pub fn new(settings: AppSettings) -> Result<Self, ApiError> {
        let gateway = HttpGateway::new(&settings.gateway_config())?;
        tracing::info!("Backend at {}", settings.api_base_url);
        Ok(Self {
            gateway: Arc::new(gateway),
            settings,
        })
    }
}

/// Backend reachability as last observed
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum BackendStatus {
    Unknown,
    Online,
    Offline,
}

/// A source link currently flashed after a marker click
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Highlight {
    pub message_id: MessageId,
    pub number: u32,
    /// Bumped on every click so a newer highlight outlives older timers
    pub generation: u64,
}

/// Application state shared across components
#[derive(Clone, Copy)]
pub struct AppState {
    pub controller: Signal<ConversationController>,
    pub backend_status: Signal<BackendStatus>,
    pub highlight: Signal<Option<Highlight>>,
}

impl AppState {
    pub fn new(services: &Services) -> Self {
        let storage: Box<dyn KeyValueStore> = match FileStore::open_default() {
            Ok(store) => Box::new(store),
            Err(e) => {
                tracing::warn!("Local storage unavailable, session will not persist: {}", e);
                Box::new(MemoryStore::new())
            }
        };

        let controller = ConversationController::new(
            services.gateway.clone(),
            SessionStore::new(storage),
            services.settings.reply_delay(),
        );

        tracing::info!("AppState initialized");
        Self {
            controller: Signal::new(controller),
            backend_status: Signal::new(BackendStatus::Unknown),
            highlight: Signal::new(None),
        }
    }
}

#[component]
pub fn App() -> Element {
    let services = use_context::<Services>();
    let app_state = use_context_provider(|| AppState::new(&services));

    {
        let mut controller = app_state.controller;
        let mut backend_status = app_state.backend_status;
        let gateway = services.gateway.clone();
        use_hook(move || {
            let ticket = controller.write().start();
            if let Some(ticket) = ticket {
                let gateway = gateway.clone();
                spawn(async move {
                    tracing::info!("Loading history for {}", ticket.session_id());
                    let completion = ticket.run(gateway.as_ref()).await;
                    controller.write().finish_history(completion);
                });
            }

            spawn(async move {
                let online = gateway.check_health().await;
                if !online {
                    tracing::warn!("Backend health check failed");
                }
                backend_status.set(if online {
                    BackendStatus::Online
                } else {
                    BackendStatus::Offline
                });
            });
        });
    }

    rsx! {
        ChatScreen {}
    }
}
