use camino::Utf8Path;
use camino::Utf8PathBuf;
use tower_lsp_server::ls_types;
use twigls_conf::TemplatesSettings;
use twigls_syntax::Point;
use twigls_syntax::SyntaxKind;
use twigls_syntax::SyntaxNode;
use twigls_syntax::SyntaxTree;
use twigls_workspace::paths::path_to_uri;

/// Jump from the template name in `{% include '...' %}` to the template file.
///
/// The name is looked up under `templates.root` in each workspace folder, as
/// given and then with `templates.file_extension` appended.
pub fn goto_include_definition(
    tree: &SyntaxTree,
    position: ls_types::Position,
    workspace_folders: &[Utf8PathBuf],
    templates: &TemplatesSettings,
) -> Option<ls_types::GotoDefinitionResponse> {
    let node = tree
        .root_node()
        .descendant_for_position(Point::new(position.line, position.character))?;
    let template_name = include_template_name(&node)?;
    tracing::debug!("Found include reference: '{}'", template_name);

    let Some(path) = workspace_folders
        .iter()
        .find_map(|folder| resolve_template(folder, template_name, templates))
    else {
        tracing::debug!("Template '{}' not found in workspace folders", template_name);
        return None;
    };

    let uri = path_to_uri(&path)?;
    Some(ls_types::GotoDefinitionResponse::Scalar(ls_types::Location {
        uri,
        range: ls_types::Range::default(),
    }))
}

fn include_template_name<'t>(node: &SyntaxNode<'t>) -> Option<&'t str> {
    if node.kind() != SyntaxKind::String {
        return None;
    }

    let tag = node
        .parent()
        .filter(|parent| parent.kind() == SyntaxKind::StatementBlock)?;
    let keyword = tag.child_of_kind(SyntaxKind::Keyword)?;
    if keyword.text() != "include" {
        return None;
    }

    Some(strip_quotes(node.text()))
}

fn strip_quotes(text: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| {
            text.strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(text)
}

fn resolve_template(
    folder: &Utf8Path,
    name: &str,
    templates: &TemplatesSettings,
) -> Option<Utf8PathBuf> {
    let exact = folder.join(&templates.root).join(name);
    if exact.exists() {
        return Some(exact);
    }

    if name.ends_with(&templates.file_extension) {
        return None;
    }
    let with_extension = Utf8PathBuf::from(format!("{exact}{}", templates.file_extension));
    with_extension.exists().then_some(with_extension)
}
