//! Shared application state for HTTP/WebSocket handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use pagelens_core::capability::BoxCapabilityFactory;
use pagelens_core::chat::ChatSessionManager;
use pagelens_core::event::EventBus;
use pagelens_core::host::InMemoryHostPage;
use pagelens_infra::clipboard::SystemClipboard;
use pagelens_infra::page::{FetchProxy, LivePageSource};
use pagelens_infra::runtime::LocalRuntimeFactory;
use pagelens_types::config::AssistantConfig;

/// The manager pinned to its production collaborators.
pub type ConcreteChatManager =
    ChatSessionManager<LivePageSource, SystemClipboard, InMemoryHostPage>;

/// Application state shared across handlers.
///
/// The manager mutates sequentially behind an async mutex; the event bus
/// is cloned out so subscribers never contend on that lock.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<Mutex<ConcreteChatManager>>,
    pub bus: EventBus,
}

impl AppState {
    pub fn init(config: AssistantConfig) -> Self {
        let factory = BoxCapabilityFactory::new(LocalRuntimeFactory::new(&config.runtime));
        let manager = ChatSessionManager::new(
            factory,
            LivePageSource::new(FetchProxy::new()),
            SystemClipboard::new(),
            InMemoryHostPage::new(),
            config,
        );
        let bus = manager.bus().clone();

        Self {
            manager: Arc::new(Mutex::new(manager)),
            bus,
        }
    }
}
