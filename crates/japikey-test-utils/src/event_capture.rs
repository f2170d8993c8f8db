//! Capture of `tracing` events for tests
//!
//! The library logs every rejection at debug level with a dotted target.
//! Capturing those events shows which stages ran, e.g. that an oversized
//! token never reached the decoder.

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// One recorded event: its target and `message` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub target: String,
    pub message: String,
}

#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.events
            .lock()
            .expect("capture lock poisoned")
            .push(CapturedEvent {
                target: event.metadata().target().to_string(),
                message: visitor.message,
            });
    }
}

/// Run `f` with every `tracing` event on this thread recorded.
///
/// Returns `f`'s result and the captured events, in emission order.
///
/// # Example
/// ```rust,ignore
/// let (result, events) = capture_events(|| verify(&token, &config, &resolver));
/// assert!(events.iter().all(|e| e.target != "japikey.jwks"));
/// ```
pub fn capture_events<T>(f: impl FnOnce() -> T) -> (T, Vec<CapturedEvent>) {
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.events);
    let subscriber = tracing_subscriber::registry().with(layer);

    let result = tracing::subscriber::with_default(subscriber, f);

    let events = events.lock().expect("capture lock poisoned").clone();
    (result, events)
}
