use camino::Utf8Path;
use camino::Utf8PathBuf;
use ignore::WalkBuilder;

/// Collect the files under `paths` accepted by `predicate`.
///
/// Files named directly are checked against `predicate` as given. Directories
/// are walked with the `ignore` crate's standard filters, so hidden entries
/// and anything excluded by `.gitignore` or `.ignore` files are skipped.
///
/// Returns a sorted, deduplicated list.
#[must_use]
pub fn walk_files(
    paths: &[Utf8PathBuf],
    predicate: impl Fn(&Utf8Path) -> bool,
) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if predicate(path) {
                files.push(path.clone());
            }
            continue;
        }

        if !path.is_dir() {
            tracing::warn!(%path, "skipping path that is neither file nor directory");
            continue;
        }

        let walker = WalkBuilder::new(path.as_std_path())
            .standard_filters(true)
            .build();

        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Some(utf8) = Utf8Path::from_path(entry.path()) else {
                continue;
            };
            if predicate(utf8) {
                files.push(utf8.to_owned());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn is_twig(path: &Utf8Path) -> bool {
        path.extension() == Some("twig")
    }

    fn names(files: &[Utf8PathBuf]) -> Vec<&str> {
        files.iter().filter_map(|p| p.file_name()).collect()
    }

    #[test]
    fn test_walks_directory_with_predicate() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::write(root.join("base.twig"), "").unwrap();
        fs::write(root.join("partials/nav.twig"), "").unwrap();
        fs::write(root.join("style.css"), "").unwrap();

        let files = walk_files(&[root], is_twig);
        assert_eq!(names(&files), vec!["base.twig", "nav.twig"]);
    }

    #[test]
    fn test_skips_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join(".cache/old.twig"), "").unwrap();
        fs::write(root.join("page.twig"), "").unwrap();

        let files = walk_files(&[root], is_twig);
        assert_eq!(names(&files), vec!["page.twig"]);
    }

    #[test]
    fn test_explicit_files_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let page = root.join("page.twig");
        fs::write(&page, "").unwrap();

        let files = walk_files(&[page.clone(), root.clone(), root.join("missing")], is_twig);
        assert_eq!(files, vec![page]);
    }
}
