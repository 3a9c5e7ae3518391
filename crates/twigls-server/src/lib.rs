mod client;
mod logging;
mod server;
mod session;

use anyhow::Result;
use tower_lsp_server::LspService;
use tower_lsp_server::Server;

pub use crate::logging::init_tracing;
pub use crate::logging::LspLayer;
pub use crate::server::TwigLanguageServer;
pub use crate::session::Session;

/// Run the language server over stdio until the client disconnects.
pub async fn serve() -> Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(|client| {
        client::init_client(client);
        let log_guard = init_tracing(client::log_message);
        TwigLanguageServer::new(log_guard)
    })
    .finish();

    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
