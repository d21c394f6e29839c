//! Scan command - redacts sensitive text in a document.

mod output;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use shroud_core::prelude::*;

use self::output::write_output;
use super::{load_or_default, open_store};
use crate::ui::{exit, pluralise_word, print_info, print_warning};
use crate::{InputFormat, ScanArgs};

/// Executes the `shroud scan` command.
pub fn run(args: &ScanArgs, store_dir: &Path) -> super::Result {
    let settings = effective_settings(args, store_dir);
    let enabled = settings.enabled;

    let document = read_document(args)?;
    let mut redactor = Redactor::new(document, settings);
    let report = redactor.start_auto_redaction();

    if !enabled {
        print_warning("redaction is disabled in the saved settings; nothing was masked");
    }
    for id in &report.patterns_skipped {
        print_warning(&format!("skipped invalid pattern {id}"));
    }

    write_output(&redactor, &report, args)?;

    if args.output.is_some() {
        let count = report.spans_created.len();
        print_info(&format!(
            "redacted {count} {}",
            pluralise_word(count, "span", "spans")
        ));
    }

    if args.check && !report.spans_created.is_empty() {
        std::process::exit(exit::REDACTED);
    }

    Ok(())
}

/// Saved settings with the command-line overrides applied on top.
fn effective_settings(args: &ScanArgs, store_dir: &Path) -> RedactionSettings {
    let mut settings = load_or_default(&open_store(store_dir));

    for term in &args.patterns {
        settings.add_custom_pattern(term);
    }
    for term in &args.excludes {
        settings.add_exclude_term(term);
    }
    if args.no_pii {
        settings.auto_redact_pii = false;
    }
    if args.block {
        settings.block_style = true;
    }

    settings
}

fn read_document(args: &ScanArgs) -> super::Result<Document> {
    let from_stdin = args.input.as_os_str() == "-";
    let source = if from_stdin {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(&args.input).with_context(|| format!("failed to read {}", args.input.display()))?
    };

    if is_tree_input(args.input_format, &args.input) {
        Document::from_json(&source).with_context(|| format!("{} is not a valid document tree", display_name(args)))
    } else {
        Ok(Document::from_plain_text(&source))
    }
}

fn is_tree_input(format: InputFormat, path: &Path) -> bool {
    match format {
        InputFormat::Tree => true,
        InputFormat::Text => false,
        InputFormat::Auto => path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json")),
    }
}

fn display_name(args: &ScanArgs) -> String {
    if args.input.as_os_str() == "-" {
        "stdin".to_owned()
    } else {
        args.input.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn auto_detects_tree_input_by_extension() {
        assert!(is_tree_input(InputFormat::Auto, &PathBuf::from("page.json")));
        assert!(is_tree_input(InputFormat::Auto, &PathBuf::from("PAGE.JSON")));
        assert!(!is_tree_input(InputFormat::Auto, &PathBuf::from("notes.txt")));
        assert!(!is_tree_input(InputFormat::Auto, &PathBuf::from("-")));
    }

    #[test]
    fn explicit_format_wins_over_extension() {
        assert!(!is_tree_input(InputFormat::Text, &PathBuf::from("page.json")));
        assert!(is_tree_input(InputFormat::Tree, &PathBuf::from("page.txt")));
    }
}
