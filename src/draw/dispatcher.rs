use crate::draw::annotations::Rect;
use crate::draw::messages::{RecognitionEvent, RequestId};
use crate::draw::recognizer::{RecognizeRequest, Recognizer};
use anyhow::{Context, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// Runs recognition requests off the drawing thread. Requests are never
/// cancelled or deduplicated; events come back in completion order, which
/// may differ from dispatch order.
pub struct RecognitionDispatcher {
    recognizer: Arc<dyn Recognizer>,
    events_tx: Sender<RecognitionEvent>,
    events_rx: Receiver<RecognitionEvent>,
    next_id: u64,
    in_flight: usize,
}

impl RecognitionDispatcher {
    pub fn new(recognizer: Arc<dyn Recognizer>) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            recognizer,
            events_tx,
            events_rx,
            next_id: 1,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn dispatch(&mut self, request: RecognizeRequest, bounds: Option<Rect>) -> Result<RequestId> {
        let id = RequestId(self.next_id);
        let recognizer = Arc::clone(&self.recognizer);
        let events_tx = self.events_tx.clone();

        std::thread::Builder::new()
            .name(format!("recognizer-{}", id.0))
            .spawn(move || {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| recognizer.recognize(&request)));
                let event = match outcome {
                    Ok(Ok(results)) => RecognitionEvent::Completed {
                        id,
                        bounds,
                        results,
                    },
                    Ok(Err(err)) => RecognitionEvent::Failed {
                        id,
                        message: format!("{err:#}"),
                    },
                    Err(_) => RecognitionEvent::Failed {
                        id,
                        message: "recognizer panicked".to_string(),
                    },
                };
                if events_tx.send(event).is_err() {
                    tracing::debug!(request_id = id.0, "recognition finished after dispatcher was dropped");
                }
            })
            .with_context(|| format!("spawn recognizer thread for request {}", id.0))?;

        self.next_id += 1;
        self.in_flight += 1;
        tracing::debug!(request_id = id.0, in_flight = self.in_flight, "recognition dispatched");
        Ok(id)
    }

    /// Drains every event that has already arrived.
    pub fn try_events(&mut self) -> Vec<RecognitionEvent> {
        let mut events = Vec::new();
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    events.push(event);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Blocks up to `timeout` for the next event.
    pub fn wait_event(&mut self, timeout: Duration) -> Option<RecognitionEvent> {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(event)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
