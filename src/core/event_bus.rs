use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

/// Processor lifecycle events, delivered over the event bus.
#[derive(Clone, Debug, Serialize)]
pub enum ProcessorEvent {
    /// A marker entered the pipeline.
    CommandStarted {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    /// The pre-command hook canceled the marker.
    CommandAborted {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    /// DOM mutation for the marker's swap job is applied.
    SwapApplied {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    /// A trigger payload fired one event.
    TriggerFired {
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// A `target` selector matched no element.
    TargetResolutionError {
        selector: String,
        timestamp: DateTime<Utc>,
    },

    /// The marker failed; the run continues with the next marker.
    CommandFailed {
        index: usize,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// The marker's pipeline completed.
    CommandCompleted {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    /// Every marker of the response has been processed.
    BatchFinished {
        completed: usize,
        aborted: usize,
        failed: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Event sender half.
pub type EventSender = mpsc::UnboundedSender<ProcessorEvent>;

/// Event receiver half.
pub type EventReceiver = mpsc::UnboundedReceiver<ProcessorEvent>;

/// Create an event channel.
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Sender wrapper with an atomic active flag so that event emission can be
/// cheaply skipped when no listener is attached.
#[derive(Clone)]
pub struct EventEmitter {
    tx: EventSender,
    active: Arc<AtomicBool>,
}

impl EventEmitter {
    pub fn new(tx: EventSender, active: Arc<AtomicBool>) -> Self {
        Self { tx, active }
    }

    /// Emitter that drops everything.
    pub fn disabled() -> Self {
        let (tx, _rx) = create_event_channel();
        Self {
            tx,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn emit(&self, event: ProcessorEvent) {
        if self.is_active() {
            let _ = self.tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_channel() {
        let (sender, mut receiver) = create_event_channel();

        sender
            .send(ProcessorEvent::CommandStarted {
                index: 0,
                timestamp: Utc::now(),
            })
            .unwrap();

        let event = receiver.recv().await.unwrap();
        match event {
            ProcessorEvent::CommandStarted { index, .. } => {
                assert_eq!(index, 0);
            }
            _ => panic!("Unexpected event type"),
        }
    }

    #[tokio::test]
    async fn test_emitter_respects_active_flag() {
        let (tx, mut rx) = create_event_channel();
        let active = Arc::new(AtomicBool::new(false));
        let emitter = EventEmitter::new(tx, active.clone());

        emitter.emit(ProcessorEvent::CommandCompleted {
            index: 0,
            timestamp: Utc::now(),
        });
        assert!(rx.try_recv().is_err());

        active.store(true, Ordering::Relaxed);
        emitter.emit(ProcessorEvent::CommandCompleted {
            index: 1,
            timestamp: Utc::now(),
        });
        assert!(matches!(
            rx.try_recv(),
            Ok(ProcessorEvent::CommandCompleted { index: 1, .. })
        ));
    }

    #[test]
    fn test_disabled_emitter_is_inert() {
        let emitter = EventEmitter::disabled();
        assert!(!emitter.is_active());
        emitter.emit(ProcessorEvent::BatchFinished {
            completed: 0,
            aborted: 0,
            failed: 0,
            timestamp: Utc::now(),
        });
    }
}
