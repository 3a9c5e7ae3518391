//! Process-wide handle to the LSP client.
//!
//! Notifications go through one queue drained by a single task, so they reach
//! the client in the order they were sent. Until the client is set, and in
//! tests that drive the server directly, every notification is dropped.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_lsp_server::ls_types;
use tower_lsp_server::Client;

static QUEUE: OnceLock<mpsc::UnboundedSender<Notification>> = OnceLock::new();

#[derive(Debug)]
enum Notification {
    Log {
        message_type: ls_types::MessageType,
        message: String,
    },
    Diagnostics {
        uri: ls_types::Uri,
        diagnostics: Vec<ls_types::Diagnostic>,
        version: Option<i32>,
    },
}

impl Notification {
    async fn send(self, client: &Client) {
        match self {
            Notification::Log {
                message_type,
                message,
            } => client.log_message(message_type, message).await,
            Notification::Diagnostics {
                uri,
                diagnostics,
                version,
            } => client.publish_diagnostics(uri, diagnostics, version).await,
        }
    }
}

/// Start the queue worker for `client` on the current runtime.
pub fn init_client(client: Client) {
    let Ok(handle) = Handle::try_current() else {
        tracing::warn!("No runtime for the LSP client, notifications are dropped");
        return;
    };
    let (sender, _worker) = spawn_queue(&handle, move |notification| {
        let client = client.clone();
        async move { notification.send(&client).await }
    });
    if QUEUE.set(sender).is_err() {
        tracing::warn!("LSP client already initialized, keeping the first one");
    }
}

/// Deliver every queued notification in order, one at a time, until all
/// senders are dropped.
fn spawn_queue<F, Fut>(
    handle: &Handle,
    deliver: F,
) -> (mpsc::UnboundedSender<Notification>, JoinHandle<()>)
where
    F: Fn(Notification) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let worker = handle.spawn(async move {
        while let Some(notification) = receiver.recv().await {
            deliver(notification).await;
        }
    });
    (sender, worker)
}

fn enqueue(notification: Notification) {
    if let Some(sender) = QUEUE.get() {
        // fails only once the worker is gone at shutdown
        sender.send(notification).ok();
    }
}

pub fn log_message(message_type: ls_types::MessageType, message: String) {
    enqueue(Notification::Log {
        message_type,
        message,
    });
}

pub fn publish_diagnostics(
    uri: ls_types::Uri,
    diagnostics: Vec<ls_types::Diagnostic>,
    version: Option<i32>,
) {
    enqueue(Notification::Diagnostics {
        uri,
        diagnostics,
        version,
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_queue_delivers_in_send_order() {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);
        let (sender, worker) = spawn_queue(&Handle::current(), move |notification| {
            let sink = Arc::clone(&sink);
            async move {
                let Notification::Diagnostics { version, .. } = notification else {
                    return;
                };
                // older versions take longer, so concurrent delivery would reorder them
                let delay = 20 - u64::try_from(version.unwrap()).unwrap();
                tokio::time::sleep(Duration::from_millis(delay)).await;
                sink.lock().unwrap().push(version.unwrap());
            }
        });

        let uri: ls_types::Uri = "file:///page.twig".parse().unwrap();
        for version in 1..=10 {
            sender
                .send(Notification::Diagnostics {
                    uri: uri.clone(),
                    diagnostics: Vec::new(),
                    version: Some(version),
                })
                .unwrap();
        }
        drop(sender);
        worker.await.unwrap();

        assert_eq!(*delivered.lock().unwrap(), (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_notifications_without_client_are_dropped() {
        publish_diagnostics("file:///page.twig".parse().unwrap(), Vec::new(), Some(1));
        log_message(ls_types::MessageType::INFO, "hello".to_string());
    }
}
