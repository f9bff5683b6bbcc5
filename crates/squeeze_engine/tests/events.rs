use std::sync::{Arc, Mutex};

use squeeze_engine::{CompressionProgress, EngineEvent, EventHub, EventKind};

fn recorder() -> (Arc<Mutex<Vec<EngineEvent>>>, impl Fn(&EngineEvent) + Send + Sync) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |event: &EngineEvent| {
        sink.lock().unwrap().push(event.clone())
    })
}

#[test]
fn events_reach_only_listeners_of_their_kind() {
    let hub = EventHub::new();
    let (paused, on_paused) = recorder();
    let (progress, on_progress) = recorder();
    let _a = hub.subscribe(EventKind::CompressionPaused, on_paused);
    let _b = hub.subscribe(EventKind::CompressionProgress, on_progress);

    let event = EngineEvent::CompressionProgress(CompressionProgress { count: 4 });
    assert_eq!(hub.publish(&event), 1);

    assert!(paused.lock().unwrap().is_empty());
    assert_eq!(*progress.lock().unwrap(), vec![event]);
}

#[test]
fn dropping_a_subscription_unregisters_it() {
    let hub = EventHub::new();
    let (seen, listener) = recorder();
    let subscription = hub.subscribe(EventKind::ImportStarted, listener);
    assert_eq!(hub.listener_count(EventKind::ImportStarted), 1);
    assert_eq!(subscription.kind(), EventKind::ImportStarted);

    drop(subscription);
    assert_eq!(hub.listener_count(EventKind::ImportStarted), 0);
    assert_eq!(hub.publish(&EngineEvent::ImportStarted), 0);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn cloned_hubs_share_listeners() {
    let hub = EventHub::new();
    let other = hub.clone();
    let (seen, listener) = recorder();
    let _subscription = hub.subscribe(EventKind::CompressionPaused, listener);

    other.publish(&EngineEvent::CompressionPaused);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn subscription_outliving_hub_drops_quietly() {
    let hub = EventHub::new();
    let (_, listener) = recorder();
    let subscription = hub.subscribe(EventKind::ListChanged, listener);
    drop(hub);
    drop(subscription);
}

#[test]
fn listener_may_subscribe_while_being_called() {
    let hub = EventHub::new();
    let inner_hub = hub.clone();
    let nested = Arc::new(Mutex::new(Vec::new()));
    let keep = nested.clone();
    let _outer = hub.subscribe(EventKind::ImportStarted, move |_| {
        let subscription = inner_hub.subscribe(EventKind::ImportStarted, |_| {});
        keep.lock().unwrap().push(subscription);
    });

    hub.publish(&EngineEvent::ImportStarted);
    assert_eq!(hub.listener_count(EventKind::ImportStarted), 2);
}
