use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp_server::jsonrpc::Result as LspResult;
use tower_lsp_server::ls_types;
use tower_lsp_server::LanguageServer;
use tracing_appender::non_blocking::WorkerGuard;
use twigls_ide::collect_diagnostics;
use twigls_syntax::SyntaxTree;

use crate::client;
use crate::session::Session;

const SERVER_NAME: &str = "Twig Language Server";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct TwigLanguageServer {
    session: Arc<RwLock<Session>>,
    _log_guard: WorkerGuard,
}

impl TwigLanguageServer {
    #[must_use]
    pub fn new(log_guard: WorkerGuard) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::default())),
            _log_guard: log_guard,
        }
    }

    pub async fn with_session<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let session = self.session.read().await;
        f(&session)
    }

    pub async fn with_session_mut<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.session.write().await;
        f(&mut session)
    }

    /// Diagnostics for every open document, e.g. after a settings reload.
    async fn republish_all(&self) {
        let published = self
            .with_session(|session| {
                session
                    .documents()
                    .uris()
                    .filter_map(|uri| {
                        let version = session.documents().document(uri)?.version();
                        let diagnostics = diagnostics_for(session, session.documents().tree(uri));
                        Some((uri.to_string(), diagnostics, version))
                    })
                    .collect::<Vec<_>>()
            })
            .await;

        for (uri, diagnostics, version) in published {
            match uri.parse() {
                Ok(uri) => client::publish_diagnostics(uri, diagnostics, Some(version)),
                Err(_) => tracing::warn!("Cannot republish diagnostics for invalid URI {uri}"),
            }
        }
    }
}

/// Diagnostics honouring the session's settings. No tree means none.
fn diagnostics_for(session: &Session, tree: Option<&SyntaxTree>) -> Vec<ls_types::Diagnostic> {
    tree.map(|tree| collect_diagnostics(tree, &session.settings().diagnostics))
        .unwrap_or_default()
}

impl LanguageServer for TwigLanguageServer {
    async fn initialize(
        &self,
        params: ls_types::InitializeParams,
    ) -> LspResult<ls_types::InitializeResult> {
        tracing::info!("Initializing server...");

        let session = Session::from_initialize(&params);
        let semantic_tokens = session.settings().semantic_tokens.enabled;
        *self.session.write().await = session;

        Ok(ls_types::InitializeResult {
            capabilities: ls_types::ServerCapabilities {
                text_document_sync: Some(ls_types::TextDocumentSyncCapability::Options(
                    ls_types::TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(ls_types::TextDocumentSyncKind::INCREMENTAL),
                        will_save: Some(false),
                        will_save_wait_until: Some(false),
                        save: Some(ls_types::SaveOptions::default().into()),
                    },
                )),
                completion_provider: Some(ls_types::CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![
                        "{".to_string(),
                        "|".to_string(),
                        ".".to_string(),
                    ]),
                    ..Default::default()
                }),
                semantic_tokens_provider: semantic_tokens.then(|| {
                    ls_types::SemanticTokensServerCapabilities::SemanticTokensOptions(
                        ls_types::SemanticTokensOptions {
                            legend: twigls_ide::legend(),
                            full: Some(ls_types::SemanticTokensFullOptions::Bool(true)),
                            range: Some(false),
                            ..Default::default()
                        },
                    )
                }),
                definition_provider: Some(ls_types::OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ls_types::ServerInfo {
                name: SERVER_NAME.to_string(),
                version: Some(SERVER_VERSION.to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _params: ls_types::InitializedParams) {
        let root = self.with_session(Session::project_root).await;
        match root {
            Some(root) => tracing::info!("Server initialized for {root}"),
            None => tracing::info!("Server initialized without a project root"),
        }
    }

    async fn shutdown(&self) -> LspResult<()> {
        tracing::info!("Shutting down");
        Ok(())
    }

    async fn did_open(&self, params: ls_types::DidOpenTextDocumentParams) {
        tracing::info!("Opened document: {:?}", params.text_document.uri);

        let document = params.text_document;
        let diagnostics = self
            .with_session_mut(|session| {
                session.documents_mut().open(
                    document.uri.as_str(),
                    document.text,
                    document.version,
                    &document.language_id,
                );
                diagnostics_for(session, session.tree(&document.uri))
            })
            .await;

        client::publish_diagnostics(document.uri, diagnostics, Some(document.version));
    }

    async fn did_change(&self, params: ls_types::DidChangeTextDocumentParams) {
        tracing::debug!("Changed document: {:?}", params.text_document.uri);

        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let result = self
            .with_session_mut(|session| {
                session
                    .documents_mut()
                    .change(uri.as_str(), version, params.content_changes)?;
                Ok::<_, twigls_workspace::DocumentError>(diagnostics_for(
                    session,
                    session.tree(&uri),
                ))
            })
            .await;

        match result {
            Ok(diagnostics) => client::publish_diagnostics(uri, diagnostics, Some(version)),
            Err(err) => tracing::warn!("Rejected change to {}: {err}", uri.as_str()),
        }
    }

    async fn did_close(&self, params: ls_types::DidCloseTextDocumentParams) {
        tracing::info!("Closed document: {:?}", params.text_document.uri);

        let uri = params.text_document.uri;
        self.with_session_mut(|session| session.documents_mut().close(uri.as_str()))
            .await;
        client::publish_diagnostics(uri, Vec::new(), None);
    }

    async fn did_change_configuration(&self, params: ls_types::DidChangeConfigurationParams) {
        tracing::info!("Configuration change detected. Reloading settings...");

        let client_settings = Some(params.settings).filter(serde_json::Value::is_object);
        self.with_session_mut(|session| session.reload_settings(client_settings))
            .await;
        self.republish_all().await;
    }

    async fn completion(
        &self,
        params: ls_types::CompletionParams,
    ) -> LspResult<Option<ls_types::CompletionResponse>> {
        let position = params.text_document_position;
        let items = self
            .with_session(|session| {
                let uri = position.text_document.uri.as_str();
                let document = session.documents().document(uri)?;
                Some(twigls_ide::handle_completion(
                    document.content(),
                    session.documents().tree(uri),
                    position.position,
                    session.documents().encoding(),
                ))
            })
            .await;

        Ok(items
            .filter(|items| !items.is_empty())
            .map(ls_types::CompletionResponse::Array))
    }

    async fn semantic_tokens_full(
        &self,
        params: ls_types::SemanticTokensParams,
    ) -> LspResult<Option<ls_types::SemanticTokensResult>> {
        let data = self
            .with_session(|session| {
                if !session.settings().semantic_tokens.enabled {
                    return None;
                }
                session
                    .tree(&params.text_document.uri)
                    .map(twigls_ide::semantic_tokens)
            })
            .await;

        Ok(data.map(|data| {
            ls_types::SemanticTokensResult::Tokens(ls_types::SemanticTokens {
                result_id: None,
                data,
            })
        }))
    }

    async fn goto_definition(
        &self,
        params: ls_types::GotoDefinitionParams,
    ) -> LspResult<Option<ls_types::GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        Ok(self
            .with_session(|session| {
                let tree = session.tree(&position.text_document.uri)?;
                twigls_ide::goto_include_definition(
                    tree,
                    position.position,
                    session.workspace_folders(),
                    &session.settings().templates,
                )
            })
            .await)
    }
}
