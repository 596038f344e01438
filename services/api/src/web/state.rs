//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the registry of open chats.

use crate::config::Config;
use site_core::chat::ChatSession;
use site_core::ports::ContentStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub config: Arc<Config>,
    pub chats: Arc<ChatRegistry>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, config: Arc<Config>) -> Self {
        Self {
            store,
            config,
            chats: Arc::new(ChatRegistry::default()),
        }
    }
}

//=========================================================================================
// Chat Registry (One Entry per Open Chat Window)
//=========================================================================================

/// One open chat and the token that aborts its pending replies.
#[derive(Clone)]
pub struct ChatHandle {
    pub session: Arc<Mutex<ChatSession>>,
    pub cancellation_token: CancellationToken,
}

struct ChatEntry {
    handle: ChatHandle,
    last_active: Instant,
}

#[derive(Default)]
pub struct ChatRegistry {
    chats: Mutex<HashMap<Uuid, ChatEntry>>,
}

impl ChatRegistry {
    pub async fn open(&self) -> (Uuid, ChatHandle) {
        let id = Uuid::new_v4();
        let handle = ChatHandle {
            session: Arc::new(Mutex::new(ChatSession::new())),
            cancellation_token: CancellationToken::new(),
        };
        let entry = ChatEntry {
            handle: handle.clone(),
            last_active: Instant::now(),
        };
        self.chats.lock().await.insert(id, entry);
        (id, handle)
    }

    /// Looks a chat up and marks it as active.
    pub async fn get(&self, id: Uuid) -> Option<ChatHandle> {
        let mut chats = self.chats.lock().await;
        let entry = chats.get_mut(&id)?;
        entry.last_active = Instant::now();
        Some(entry.handle.clone())
    }

    /// Removes the chat and cancels any reply still waiting on its typing delay.
    pub async fn close(&self, id: Uuid) -> bool {
        match self.chats.lock().await.remove(&id) {
            Some(entry) => {
                entry.handle.cancellation_token.cancel();
                true
            }
            None => false,
        }
    }

    /// Closes every chat untouched for at least `max_idle` as of `now`.
    pub async fn evict_idle(&self, now: Instant, max_idle: Duration) -> usize {
        let mut chats = self.chats.lock().await;
        let before = chats.len();
        chats.retain(|_, entry| {
            let keep = now.saturating_duration_since(entry.last_active) < max_idle;
            if !keep {
                entry.handle.cancellation_token.cancel();
            }
            keep
        });
        before - chats.len()
    }

    pub async fn len(&self) -> usize {
        self.chats.lock().await.len()
    }
}

/// Periodically closes chats whose window was abandoned without a `DELETE`.
pub fn spawn_idle_sweeper(registry: Arc<ChatRegistry>, max_idle: Duration) -> JoinHandle<()> {
    let period = (max_idle / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = registry.evict_idle(Instant::now(), max_idle).await;
            if evicted > 0 {
                info!("Closed {} idle chats", evicted);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closing_a_chat_cancels_its_token() {
        let registry = ChatRegistry::default();
        let (id, handle) = registry.open().await;
        assert_eq!(registry.len().await, 1);

        assert!(registry.close(id).await);
        assert!(handle.cancellation_token.is_cancelled());
        assert_eq!(registry.len().await, 0);
        assert!(registry.get(id).await.is_none());
        assert!(!registry.close(id).await);
    }

    #[tokio::test]
    async fn idle_chats_are_reclaimed() {
        let registry = ChatRegistry::default();
        let (stale, stale_handle) = registry.open().await;
        registry.open().await;
        let max_idle = Duration::from_secs(30 * 60);

        assert_eq!(registry.evict_idle(Instant::now(), max_idle).await, 0);

        let later = Instant::now() + max_idle + Duration::from_secs(1);
        assert_eq!(registry.evict_idle(later, max_idle).await, 2);
        assert!(stale_handle.cancellation_token.is_cancelled());
        assert!(registry.get(stale).await.is_none());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn recent_activity_keeps_a_chat_open() {
        let registry = ChatRegistry::default();
        let (id, _) = registry.open().await;
        let max_idle = Duration::from_millis(200);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(registry.get(id).await.is_some());
        let soon = Instant::now() + Duration::from_millis(100);
        assert_eq!(registry.evict_idle(soon, max_idle).await, 0);
        assert_eq!(registry.len().await, 1);
    }
}
