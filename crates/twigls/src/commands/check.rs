use std::io::Read as _;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use twigls_conf::Settings;
use twigls_ide::collect_diagnostics;
use twigls_ide::render_diagnostic;
use twigls_workspace::walk_files;

use crate::args::Args;
use crate::cli::init_stderr_logging;
use crate::commands::Command;
use crate::exit::Exit;

const STDIN_PATH: &str = "-";

#[derive(Debug, Parser)]
pub struct Check {
    /// Files or directories to check, `-` for stdin. Defaults to the current
    /// directory.
    paths: Vec<Utf8PathBuf>,
}

impl Command for Check {
    fn execute(&self, args: &Args) -> Result<Exit> {
        init_stderr_logging(args);

        let project_root = current_dir()?;
        let settings = Settings::new(project_root.as_std_path()).unwrap_or_else(|err| {
            tracing::warn!("Failed to load settings, using defaults: {err}");
            Settings::default()
        });

        if self.paths.iter().any(|path| path == STDIN_PATH) {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read stdin")?;
            let rendered = check_source("<stdin>", &source, &settings);
            return Ok(summarize(&[rendered], args));
        }

        let roots = if self.paths.is_empty() {
            vec![project_root]
        } else {
            self.paths.clone()
        };
        let extension = settings.templates.file_extension.as_str();
        let files = walk_files(&roots, |path| is_template(path, extension));
        tracing::info!("Checking {} files", files.len());

        let mut results = Vec::with_capacity(files.len());
        for path in &files {
            match std::fs::read_to_string(path) {
                Ok(source) => results.push(check_source(path.as_str(), &source, &settings)),
                Err(err) => tracing::warn!("Skipping {path}: {err}"),
            }
        }

        Ok(summarize(&results, args))
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}

fn is_template(path: &Utf8Path, extension: &str) -> bool {
    path.file_name()
        .is_some_and(|name| name.len() > extension.len() && name.ends_with(extension))
}

/// One rendered line per diagnostic in `source`.
fn check_source(path: &str, source: &str, settings: &Settings) -> Vec<String> {
    let tree = twigls_syntax::Parser::new().parse_text(source);
    collect_diagnostics(&tree, &settings.diagnostics)
        .iter()
        .map(|diagnostic| render_diagnostic(path, diagnostic))
        .collect()
}

fn summarize(results: &[Vec<String>], args: &Args) -> Exit {
    let mut warning_count = 0;
    let mut file_count = 0;

    for rendered in results.iter().filter(|rendered| !rendered.is_empty()) {
        file_count += 1;
        warning_count += rendered.len();
        if !args.quiet {
            for line in rendered {
                println!("{line}");
            }
        }
    }

    if warning_count == 0 {
        return Exit::success();
    }

    let exit = Exit::error();
    if args.quiet {
        return exit;
    }
    let warning_word = if warning_count == 1 { "warning" } else { "warnings" };
    let file_word = if file_count == 1 { "file" } else { "files" };
    exit.with_message(format!(
        "Found {warning_count} {warning_word} in {file_count} {file_word}."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_template() {
        assert!(is_template(Utf8Path::new("views/page.twig"), ".twig"));
        assert!(is_template(Utf8Path::new("page.html.twig"), ".twig"));
        assert!(!is_template(Utf8Path::new("views/page.html"), ".twig"));
        assert!(!is_template(Utf8Path::new(".twig"), ".twig"));
    }

    #[test]
    fn test_check_source_renders_each_diagnostic() {
        let rendered = check_source("page.twig", "{% if a %}\n{% endfor %}", &Settings::default());
        assert_eq!(rendered.len(), 2);
        assert!(rendered.iter().all(|line| line.starts_with("page.twig:")));
    }

    #[test]
    fn test_check_source_honours_settings() {
        let mut settings = Settings::default();
        settings.diagnostics.enabled = false;
        assert!(check_source("page.twig", "{% if a %}", &settings).is_empty());
    }
}
