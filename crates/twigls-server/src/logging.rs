//! Tracing setup for the language server.
//!
//! Events go to a daily-rolling log file and, from INFO up, to the client as
//! `window/logMessage` through [`LspLayer`].

use std::sync::Arc;

use tower_lsp_server::ls_types::MessageType;
use tracing::field::Visit;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

/// Forwards tracing events to the LSP client.
pub struct LspLayer {
    send_message: Arc<dyn Fn(MessageType, String) + Send + Sync>,
}

impl LspLayer {
    pub fn new<F>(send_message: F) -> Self
    where
        F: Fn(MessageType, String) + Send + Sync + 'static,
    {
        Self {
            send_message: Arc::new(send_message),
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }
}

fn message_type(level: Level) -> Option<MessageType> {
    match level {
        Level::ERROR => Some(MessageType::ERROR),
        Level::WARN => Some(MessageType::WARNING),
        Level::INFO => Some(MessageType::INFO),
        Level::DEBUG => Some(MessageType::LOG),
        // too noisy for the client
        Level::TRACE => None,
    }
}

impl<S> Layer<S> for LspLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let Some(message_type) = message_type(*event.metadata().level()) else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Some(message) = visitor.message {
            (self.send_message)(message_type, message);
        }
    }
}

/// Install the global subscriber.
///
/// The file layer writes to `<temp dir>/twigls.log.<date>` filtered by
/// `RUST_LOG` (default `info`); the client layer gets INFO and above. Keep the
/// returned guard alive or buffered file output is lost.
pub fn init_tracing<F>(send_message: F) -> WorkerGuard
where
    F: Fn(MessageType, String) + Send + Sync + 'static,
{
    let file_appender = tracing_appender::rolling::daily(std::env::temp_dir(), "twigls.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    let lsp_layer =
        LspLayer::new(send_message).with_filter(tracing_subscriber::filter::LevelFilter::INFO);

    if Registry::default()
        .with(file_layer)
        .with(lsp_layer)
        .try_init()
        .is_err()
    {
        eprintln!("tracing subscriber already installed");
    }

    guard
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_forwards_info_and_above() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let layer = LspLayer::new(move |message_type, message| {
            sink.lock().unwrap().push((message_type, message));
        });
        let subscriber = Registry::default()
            .with(layer.with_filter(tracing_subscriber::filter::LevelFilter::INFO));

        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!("hidden");
            tracing::debug!("hidden");
            tracing::info!("opened {}", "page.twig");
            tracing::warn!(uri = "x", "parse failed");
            tracing::error!("boom");
        });

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (MessageType::INFO, "opened page.twig".to_string()),
                (MessageType::WARNING, "parse failed".to_string()),
                (MessageType::ERROR, "boom".to_string()),
            ]
        );
    }

    #[test]
    fn test_trace_never_reaches_client() {
        assert_eq!(message_type(Level::TRACE), None);
        assert_eq!(message_type(Level::DEBUG), Some(MessageType::LOG));
    }
}
