//! Conversion between `file://` URIs and filesystem paths.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use tower_lsp_server::ls_types;

/// Characters escaped in the path component of a file URI.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Convert a `file:` URI into a path. Other schemes yield `None`.
#[must_use]
pub fn uri_to_path(uri: &ls_types::Uri) -> Option<Utf8PathBuf> {
    let rest = uri.as_str().strip_prefix("file://")?;
    // skip the (usually empty) authority
    let path = &rest[rest.find('/')?..];
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;

    #[cfg(windows)]
    let decoded = {
        // `/C:/...` becomes `C:/...`
        let trimmed = decoded.strip_prefix('/').unwrap_or(&decoded).to_string();
        std::borrow::Cow::<str>::Owned(trimmed)
    };

    Some(Utf8PathBuf::from(decoded.as_ref()))
}

/// Convert an absolute path into a `file:` URI.
#[must_use]
pub fn path_to_uri(path: &Utf8Path) -> Option<ls_types::Uri> {
    if !path.is_absolute() {
        return None;
    }

    #[cfg(windows)]
    let path = format!("/{}", path.as_str().replace('\\', "/"));
    #[cfg(not(windows))]
    let path = path.as_str().to_string();

    let encoded = utf8_percent_encode(&path, PATH_SEGMENT);
    format!("file://{encoded}").parse().ok()
}
