//! Process-wide shared channel
//!
//! Created lazily by the first caller, reused by everyone after, and only
//! torn down by [`disconnect_shared`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::EventChannel;
use crate::ClientConfig;

static SHARED: Mutex<Option<Arc<EventChannel>>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<Arc<EventChannel>>> {
    SHARED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The shared channel, connecting to `config` on first use
///
/// Later calls return the existing connection whatever config they pass.
pub fn shared_channel(config: &ClientConfig) -> Arc<EventChannel> {
    shared_channel_with(|| EventChannel::connect(config))
}

/// Like [`shared_channel`] with a custom constructor for the first use
pub fn shared_channel_with<F>(create: F) -> Arc<EventChannel>
where
    F: FnOnce() -> EventChannel,
{
    let mut slot = slot();
    if let Some(channel) = slot.as_ref() {
        return Arc::clone(channel);
    }

    let channel = Arc::new(create());
    *slot = Some(Arc::clone(&channel));
    tracing::info!("Shared event channel created");
    channel
}

/// Tear down the shared channel; `false` if none was open
///
/// Handles obtained earlier stay usable but stop receiving events.
pub fn disconnect_shared() -> bool {
    let Some(channel) = slot().take() else {
        return false;
    };
    channel.disconnect();
    tracing::info!("Shared event channel disconnected");
    true
}

/// Diagnostics flag
pub fn is_shared_connected() -> bool {
    slot().as_ref().is_some_and(|channel| channel.is_connected())
}
