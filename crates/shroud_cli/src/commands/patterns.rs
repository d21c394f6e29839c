//! Patterns command - lists redaction patterns.

use std::path::Path;

use shroud_core::PatternSource;
use shroud_core::prelude::*;

use super::{load_or_default, open_store};
use crate::PatternsArgs;
use crate::ui::{colors, pluralise_word, print_command_header, print_warning, truncate_with_ellipsis};

const REGEX_TRUNCATE_WIDTH: usize = 60;

/// Lists the built-in PII patterns, or with `--active` the full set the saved
/// settings would run.
pub fn run(args: &PatternsArgs, store_dir: &Path) -> super::Result {
    print_command_header("patterns");

    let patterns = if args.active {
        let settings = load_or_default(&open_store(store_dir));
        let (set, skipped) = PatternSet::compile(&settings);
        for e in &skipped {
            print_warning(&e.to_string());
        }
        if !settings.enabled {
            print_warning("redaction is disabled; these patterns will not run");
        }
        set
    } else {
        PatternSet::builtin_pii()?
    };

    print_count(patterns.len());
    for pattern in patterns.patterns() {
        print_pattern(pattern, args.verbose);
    }

    Ok(())
}

fn print_count(count: usize) {
    println!(
        "{}",
        colors::muted().apply_to(format!("{count} {}", pluralise_word(count, "pattern", "patterns")))
    );
    println!();
}

fn print_pattern(pattern: &Pattern, verbose: bool) {
    let source = match pattern.source {
        PatternSource::Builtin => "built-in",
        PatternSource::Custom => "custom",
    };

    println!(
        "  {:<18} {}  {}",
        colors::accent().apply_to(pattern.id.as_ref()),
        colors::primary().apply_to(pattern.name.as_ref()),
        colors::muted().apply_to(source)
    );

    if verbose {
        println!(
            "  {:<18} {}",
            "",
            colors::secondary().apply_to(truncate_with_ellipsis(pattern.regex.as_str(), REGEX_TRUNCATE_WIDTH))
        );
    }
}
