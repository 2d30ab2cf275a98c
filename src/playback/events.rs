use std::collections::VecDeque;
use std::fmt;

/// Notifications from the engine to its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    /// A track finished decoding; carries its duration in seconds.
    DurationReady(f64),
    /// The displayed playback position changed.
    TimeUpdate(f64),
    PlayStart,
    /// Playback reached the end of the track on its own.
    PlayEnd,
}

type Listener = Box<dyn FnMut(&PlayerEvent)>;

/// Delivers events to registered listeners and keeps a queue for hosts that poll.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    queue: VecDeque<PlayerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&PlayerEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: PlayerEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        self.queue.push_back(event);
    }

    /// Takes every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<PlayerEvent> {
        self.queue.drain(..).collect()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("queue", &self.queue)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_and_queue_both_see_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = seen.clone();
        bus.subscribe(move |event| sink.borrow_mut().push(*event));

        bus.emit(PlayerEvent::DurationReady(3.0));
        bus.emit(PlayerEvent::PlayStart);

        assert_eq!(
            *seen.borrow(),
            vec![PlayerEvent::DurationReady(3.0), PlayerEvent::PlayStart]
        );
        assert_eq!(bus.drain().len(), 2);
        assert!(bus.drain().is_empty());
    }
}
