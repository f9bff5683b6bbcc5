use std::sync::mpsc;

use shell_logging::{shell_debug, shell_trace};
use squeeze_core::Msg;
use squeeze_engine::{EventHub, EventKind, Subscription};

use super::convert::event_to_msg;

/// Forwards engine events into the message loop, one subscription per kind.
pub(crate) struct EventBridge {
    hub: EventHub,
    sender: mpsc::Sender<Msg>,
    subscriptions: Vec<Subscription>,
}

impl EventBridge {
    pub(crate) fn new(hub: EventHub, sender: mpsc::Sender<Msg>) -> Self {
        Self {
            hub,
            sender,
            subscriptions: Vec::new(),
        }
    }

    /// Subscribes to every event kind. Attaching again is a no-op.
    pub(crate) fn attach(&mut self) {
        if self.is_attached() {
            shell_debug!("Event bridge already attached");
            return;
        }
        for kind in EventKind::ALL {
            let sender = self.sender.clone();
            let subscription = self.hub.subscribe(kind, move |event| {
                shell_trace!("Engine event {}", event.kind());
                // A closed channel means the loop has exited.
                let _ = sender.send(event_to_msg(event));
            });
            self.subscriptions.push(subscription);
        }
        shell_debug!("Event bridge attached to {} kinds", self.subscriptions.len());
    }

    pub(crate) fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Drops every subscription.
    pub(crate) fn dispose(&mut self) {
        if self.is_attached() {
            shell_debug!("Event bridge disposed");
        }
        self.subscriptions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use squeeze_engine::{CompressionProgress, EngineEvent, FileList};

    fn bridge() -> (EventHub, EventBridge, mpsc::Receiver<Msg>) {
        let hub = EventHub::new();
        let (tx, rx) = mpsc::channel();
        let bridge = EventBridge::new(hub.clone(), tx);
        (hub, bridge, rx)
    }

    #[test]
    fn attach_twice_subscribes_once_per_kind() {
        let (hub, mut bridge, _rx) = bridge();
        bridge.attach();
        bridge.attach();
        for kind in EventKind::ALL {
            assert_eq!(hub.listener_count(kind), 1, "{kind}");
        }
    }

    #[test]
    fn events_arrive_as_messages() {
        let (hub, mut bridge, rx) = bridge();
        bridge.attach();

        hub.publish(&EngineEvent::CompressionProgress(CompressionProgress { count: 3 }));
        hub.publish(&EngineEvent::ListChanged(FileList {
            total_files: 0,
            ..FileList::default()
        }));

        assert_eq!(rx.try_recv().unwrap(), Msg::CompressionProgress(3));
        assert!(matches!(rx.try_recv().unwrap(), Msg::ListChanged(_)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dispose_releases_every_subscription() {
        let (hub, mut bridge, rx) = bridge();
        bridge.attach();
        bridge.dispose();

        assert!(!bridge.is_attached());
        for kind in EventKind::ALL {
            assert_eq!(hub.listener_count(kind), 0);
        }
        assert_eq!(hub.publish(&EngineEvent::CompressionPaused), 0);
        assert!(rx.try_recv().is_err());

        bridge.attach();
        assert_eq!(hub.listener_count(EventKind::CompressionPaused), 1);
    }

    #[test]
    fn dropping_the_bridge_disposes() {
        let (hub, mut bridge, _rx) = bridge();
        bridge.attach();
        drop(bridge);
        assert_eq!(hub.listener_count(EventKind::ListChanged), 0);
    }
}
