mod cache;
mod document;
mod manager;
pub mod paths;
mod walk;

use thiserror::Error;
use tower_lsp_server::ls_types;

pub use cache::TreeCache;
pub use document::TextDocument;
pub use manager::DocumentManager;
pub use walk::walk_files;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document not open: {0}")]
    NotOpen(String),
    #[error("Change range {0:?} is outside the document")]
    InvalidRange(ls_types::Range),
}
