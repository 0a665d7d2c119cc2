//! 事件监听器 - 把推送事件转成本地回调
//!
//! A watcher subscribes when attached and detaches when its [`WatchHandle`]
//! is dropped; the channel itself stays up. Callbacks run on the watcher's
//! task, in arrival order, and must tolerate duplicates.

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::EventChannel;
use shared::message::{ChangeEvent, ChannelEvent, EventName};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle of an attached watcher; dropping it detaches
#[must_use = "the watcher detaches as soon as the handle is dropped"]
#[derive(Debug)]
pub struct WatchHandle {
    id: Uuid,
    task: JoinHandle<()>,
}

impl WatchHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// `false` once the channel went away
    pub fn is_attached(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn detach(self) {}
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn spawn_listener<F>(
    mut rx: broadcast::Receiver<ChannelEvent>,
    kind: &'static str,
    mut handle_event: F,
) -> WatchHandle
where
    F: FnMut(&ChannelEvent) + Send + 'static,
{
    let id = Uuid::new_v4();
    let task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => handle_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(watch = kind, %id, skipped, "Watcher lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!(watch = kind, %id, "Watcher stopped");
    });
    tracing::debug!(watch = kind, %id, "Watcher attached");
    WatchHandle { id, task }
}

fn parse_change(event: &ChannelEvent) -> Option<ChangeEvent> {
    match event.change() {
        Ok(change) => Some(change),
        Err(e) => {
            tracing::warn!(event = %event.name, error = %e, "Unreadable change payload");
            None
        }
    }
}

/// Line item watcher (`lineItemUpdated`, `lineItemDelta`)
///
/// ```no_run
/// # async fn demo(channel: &cobbler_client::realtime::EventChannel) {
/// use cobbler_client::realtime::LineItemWatch;
///
/// let _handle = LineItemWatch::new()
///     .on_picked_up(|change| println!("picked up: {:?}", change.document_id()))
///     .attach(channel);
/// # }
/// ```
#[derive(Clone, Default)]
pub struct LineItemWatch {
    on_picked_up: Option<Handler<ChangeEvent>>,
    on_update: Option<Handler<ChangeEvent>>,
    on_any_change: Option<Handler<ChannelEvent>>,
}

impl LineItemWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A line item's status became "Picked Up"
    pub fn on_picked_up(mut self, f: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Self {
        self.on_picked_up = Some(Arc::new(f));
        self
    }

    /// Every readable line item change
    pub fn on_update(mut self, f: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Arc::new(f));
        self
    }

    /// Every line item event, raw, even when the payload is unreadable
    pub fn on_any_change(mut self, f: impl Fn(&ChannelEvent) + Send + Sync + 'static) -> Self {
        self.on_any_change = Some(Arc::new(f));
        self
    }

    /// Subscribe to `channel`
    pub fn attach(self, channel: &EventChannel) -> WatchHandle {
        let rx = channel.subscribe();
        spawn_listener(rx, "line_item", move |event| self.handle(event))
    }

    fn handle(&self, event: &ChannelEvent) {
        if !event.known_name().is_some_and(|name| name.is_line_item()) {
            return;
        }

        if let Some(f) = &self.on_any_change {
            f(event);
        }

        if self.on_update.is_none() && self.on_picked_up.is_none() {
            return;
        }
        let Some(change) = parse_change(event) else {
            return;
        };

        if let Some(f) = &self.on_update {
            f(&change);
        }
        if change.is_picked_up()
            && let Some(f) = &self.on_picked_up
        {
            tracing::debug!(line_item = ?change.document_id(), "Line item picked up");
            f(&change);
        }
    }
}

/// Appointment watcher (`appointmentUpdated`)
#[derive(Clone, Default)]
pub struct AppointmentWatch {
    on_update: Option<Handler<ChangeEvent>>,
    on_any_change: Option<Handler<ChannelEvent>>,
}

impl AppointmentWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_update(mut self, f: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Arc::new(f));
        self
    }

    pub fn on_any_change(mut self, f: impl Fn(&ChannelEvent) + Send + Sync + 'static) -> Self {
        self.on_any_change = Some(Arc::new(f));
        self
    }

    pub fn attach(self, channel: &EventChannel) -> WatchHandle {
        let rx = channel.subscribe();
        spawn_listener(rx, "appointment", move |event| self.handle(event))
    }

    fn handle(&self, event: &ChannelEvent) {
        if event.known_name() != Some(EventName::AppointmentUpdated) {
            return;
        }

        if let Some(f) = &self.on_any_change {
            f(event);
        }
        if let Some(f) = &self.on_update
            && let Some(change) = parse_change(event)
        {
            f(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn status_event(name: &str, status: &str) -> ChannelEvent {
        ChannelEvent::new(
            name,
            json!({
                "operationType": "update",
                "documentKey": {"_id": "li-1"},
                "updateDescription": {"updatedFields": {"current_status": status}}
            }),
        )
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Clone) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |entry: &str| sink.lock().unwrap().push(entry.to_string()))
    }

    #[test]
    fn test_line_item_callbacks() {
        let (log, record) = recorder();
        let (r1, r2, r3) = (record.clone(), record.clone(), record);
        let watch = LineItemWatch::new()
            .on_picked_up(move |c| r1(&format!("picked:{}", c.document_id().unwrap_or("?"))))
            .on_update(move |_| r2("update"))
            .on_any_change(move |e| r3(&format!("any:{}", e.name)));

        watch.handle(&status_event("lineItemUpdated", "In Process"));
        watch.handle(&status_event("lineItemDelta", "Picked Up"));
        watch.handle(&status_event("appointmentUpdated", "Picked Up"));

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "any:lineItemUpdated",
                "update",
                "any:lineItemDelta",
                "update",
                "picked:li-1",
            ]
        );
    }

    #[test]
    fn test_unreadable_payload_only_reaches_any_change() {
        let (log, record) = recorder();
        let (r1, r2) = (record.clone(), record);
        let watch = LineItemWatch::new()
            .on_update(move |_| r1("update"))
            .on_any_change(move |_| r2("any"));

        watch.handle(&ChannelEvent::new("lineItemUpdated", json!("not a change")));
        assert_eq!(*log.lock().unwrap(), vec!["any"]);
    }

    #[test]
    fn test_appointment_watch_filters() {
        let (log, record) = recorder();
        let watch = AppointmentWatch::new().on_update(move |c| record(&c.operation_type.to_string()));

        watch.handle(&status_event("lineItemUpdated", "Queued"));
        watch.handle(&ChannelEvent::new(
            "appointmentUpdated",
            json!({"operationType": "insert", "fullDocument": {"_id": "ap-1"}}),
        ));
        assert_eq!(*log.lock().unwrap(), vec!["insert"]);
    }

    #[test]
    fn test_fee_update_on_picked_up_item_is_not_a_pickup() {
        let (log, record) = recorder();
        let (r1, r2) = (record.clone(), record);
        let watch = LineItemWatch::new()
            .on_picked_up(move |_| r1("picked"))
            .on_update(move |_| r2("update"));

        watch.handle(&ChannelEvent::new(
            "lineItemUpdated",
            json!({
                "operationType": "update",
                "documentKey": {"_id": "li-1"},
                "updateDescription": {"updatedFields": {"storage_fee": 300}},
                "fullDocument": {"_id": "li-1", "current_status": "Picked Up", "storage_fee": 300}
            }),
        ));
        assert_eq!(*log.lock().unwrap(), vec!["update"]);
    }

    async fn wait_for_subscribers(channel: &EventChannel, expected: usize) -> bool {
        tokio::time::timeout(std::time::Duration::from_secs(1), async {
            while channel.subscriber_count() != expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .is_ok()
    }

    #[tokio::test]
    async fn test_handle_drop_detaches() {
        let (channel, mut listener) = EventChannel::memory(Default::default());
        let mut peer = listener.accept().await.unwrap();
        peer.accept_handshake("s1").await.unwrap();
        assert!(channel.wait_connected(std::time::Duration::from_secs(1)).await);

        let before = channel.subscriber_count();
        let handle = LineItemWatch::new().attach(&channel);
        let second = AppointmentWatch::new().attach(&channel);
        assert_ne!(handle.id(), second.id());
        assert!(handle.is_attached());
        assert_eq!(channel.subscriber_count(), before + 2);

        drop(handle);
        assert!(wait_for_subscribers(&channel, before + 1).await);
        second.detach();
        assert!(wait_for_subscribers(&channel, before).await);

        assert!(channel.is_connected());
        channel.shutdown().await;
    }
}
