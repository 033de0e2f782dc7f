//! Route handlers and their one-shot completion callback.
//!
//! A handler receives the request input and a [`Responder`]. Completing the
//! responder consumes it, so a handler can answer at most once; the adapter
//! turns the completion into exactly one HTTP response.

use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::HandlerError;

/// Outcome a handler reports: a payload to serialize, or an error.
pub type HandlerResult = Result<Value, HandlerError>;

type HandlerFn = dyn Fn(Value, Responder) + Send + Sync;

/// Caller-supplied route handler.
#[derive(Clone)]
pub struct RouteHandler(Arc<HandlerFn>);

impl RouteHandler {
    /// Wrap a callback-style handler.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value, Responder) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap an async handler; the returned future is driven on its own task
    /// and its output completes the responder.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::new(move |input, responder| {
            let fut = f(input);
            tokio::spawn(async move {
                responder.respond(fut.await);
            });
        })
    }

    /// Run the handler and wait for its completion.
    ///
    /// A panic inside the handler, or a responder dropped without being
    /// completed, is reported as a handler error.
    pub async fn invoke(&self, input: Value) -> HandlerResult {
        let (responder, completion) = Responder::channel();
        let handler = self.0.clone();

        if let Err(panic) = catch_unwind(AssertUnwindSafe(move || handler(input, responder))) {
            let message = panic_message(panic.as_ref());
            tracing::error!(error = %message, "Route handler panicked");
            return Err(HandlerError::new(message));
        }

        match completion.await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Route handler dropped its responder without responding");
                Err(HandlerError::new("handler completed without responding"))
            }
        }
    }
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RouteHandler")
    }
}

/// Completion callback handed to a route handler.
pub struct Responder {
    tx: oneshot::Sender<HandlerResult>,
}

impl Responder {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<HandlerResult>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Complete the request with a handler outcome.
    pub fn respond(self, result: HandlerResult) {
        // Receiver is gone only if the request was already abandoned.
        if self.tx.send(result).is_err() {
            tracing::debug!("Response dropped, request no longer pending");
        }
    }

    /// Complete successfully with any serializable payload.
    pub fn ok<T: Serialize>(self, payload: T) {
        let result = serde_json::to_value(payload).map_err(HandlerError::from);
        self.respond(result);
    }

    /// Complete with an error; its message becomes the 500 body.
    pub fn fail(self, error: impl Into<HandlerError>) {
        self.respond(Err(error.into()));
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("pending", &!self.tx.is_closed())
            .finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
