use camino::Utf8Path;
use camino::Utf8PathBuf;
use tower_lsp_server::ls_types;
use twigls_conf::Settings;
use twigls_syntax::Parser;
use twigls_syntax::SyntaxTree;
use twigls_workspace::paths;
use twigls_workspace::DocumentManager;

/// Server state shared by every request handler.
#[derive(Debug)]
pub struct Session {
    documents: DocumentManager<Parser>,
    settings: Settings,
    workspace_folders: Vec<Utf8PathBuf>,
    /// `initializationOptions`, re-applied whenever settings are reloaded.
    client_settings: Option<serde_json::Value>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            documents: DocumentManager::new(Parser::new()),
            settings: Settings::default(),
            workspace_folders: Vec::new(),
            client_settings: None,
        }
    }
}

impl Session {
    /// Build a session from the `initialize` request.
    ///
    /// Settings come from the first workspace folder, falling back to the
    /// process working directory when the client sent none.
    #[must_use]
    pub fn from_initialize(params: &ls_types::InitializeParams) -> Self {
        let workspace_folders: Vec<Utf8PathBuf> = params
            .workspace_folders
            .iter()
            .flatten()
            .filter_map(|folder| paths::uri_to_path(&folder.uri))
            .collect();

        let mut session = Self {
            workspace_folders,
            client_settings: params.initialization_options.clone(),
            ..Self::default()
        };
        session.reload_settings(None);
        session
    }

    #[must_use]
    pub fn project_root(&self) -> Option<Utf8PathBuf> {
        self.workspace_folders.first().cloned().or_else(|| {
            std::env::current_dir()
                .ok()
                .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        })
    }

    /// Reload settings from disk, layering `client` (or the stored
    /// initialization options) on top. Keeps the old settings on error, and
    /// only stores `client` once it has loaded cleanly.
    pub fn reload_settings(&mut self, client: Option<serde_json::Value>) {
        let Some(root) = self.project_root() else {
            tracing::warn!("No project root, using default settings");
            return;
        };

        let candidate = client.as_ref().or(self.client_settings.as_ref());
        match load_settings(&root, candidate) {
            Ok(settings) => {
                self.settings = settings;
                if client.is_some() {
                    self.client_settings = client;
                }
            }
            Err(err) => tracing::error!("Failed to load settings from {root}: {err}"),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn workspace_folders(&self) -> &[Utf8PathBuf] {
        &self.workspace_folders
    }

    #[must_use]
    pub fn documents(&self) -> &DocumentManager<Parser> {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut DocumentManager<Parser> {
        &mut self.documents
    }

    #[must_use]
    pub fn tree(&self, uri: &ls_types::Uri) -> Option<&SyntaxTree> {
        self.documents.tree(uri.as_str())
    }
}

fn load_settings(
    root: &Utf8Path,
    client: Option<&serde_json::Value>,
) -> Result<Settings, twigls_conf::ConfigError> {
    Settings::with_client_settings(root.as_std_path(), client)
}
