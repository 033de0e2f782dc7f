//! Stop handle for a running [`RouteServer`](crate::RouteServer).

use tokio::sync::broadcast;

/// Trigger that asks a running server to stop accepting and drain.
///
/// Obtained from `RouteServer::shutdown_handle` before the server is started;
/// clones share the same signal, so any copy can stop the server.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask the server to stop. Returns `false` when no server is running
    /// under this handle, in which case nothing happens.
    pub fn trigger(&self) -> bool {
        self.tx.send(()).is_ok()
    }

    /// Whether a server is currently serving under this handle.
    pub fn is_serving(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_without_server_is_a_no_op() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_serving());
        assert!(!shutdown.trigger());
    }

    #[tokio::test]
    async fn test_any_clone_stops_the_server() {
        let shutdown = Shutdown::new();
        let mut serving = shutdown.subscribe();
        let handle = shutdown.clone();
        assert!(handle.is_serving());
        assert!(handle.trigger());
        assert!(serving.recv().await.is_ok());
    }
}
