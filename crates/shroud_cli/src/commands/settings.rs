//! Settings command - inspects and edits the persisted redaction settings.

use std::path::Path;

use anyhow::{Context, bail};
use serde_json::Value;
use shroud_core::prelude::*;
use shroud_core::settings::{CompiledPattern, PatternEntry};
use shroud_core::store::KeyValueStore;

use super::open_store;
use crate::SettingsCommand;
use crate::ui::{colors, indicators, print_command_header, print_field, print_info, print_success, print_warning};

/// Executes `shroud settings`; with no subcommand it shows the settings.
pub fn run(command: Option<&SettingsCommand>, store_dir: &Path) -> super::Result {
    let mut store = open_store(store_dir);

    match command {
        None => show(&store, false),
        Some(SettingsCommand::Show { json }) => show(&store, *json),
        Some(SettingsCommand::AddPattern { term, regex, flags }) => add_pattern(&mut store, term, *regex, flags),
        Some(SettingsCommand::AddExclude { term }) => add_exclude(&mut store, term),
        Some(SettingsCommand::RemovePattern { index }) => remove_pattern(&mut store, *index),
        Some(SettingsCommand::RemoveExclude { index }) => remove_exclude(&mut store, *index),
        Some(SettingsCommand::Set { key, value }) => set(&mut store, key, value),
        Some(SettingsCommand::Reset) => reset(&mut store),
    }
}

fn show<S: KeyValueStore>(store: &SettingsStore<S>, json: bool) -> super::Result {
    let settings = match store.try_load() {
        Ok(settings) => settings,
        Err(e) => {
            print_warning(&format!("{e}; showing defaults"));
            RedactionSettings::default()
        }
    };

    if json {
        println!("{}", settings.to_json()?);
        return Ok(());
    }

    print_command_header("settings");
    print_field("enabled", &settings.enabled.to_string());
    print_field("autoRedactPII", &settings.auto_redact_pii.to_string());
    print_field("revealBehavior", behavior_name(settings.reveal_behavior));
    print_field("blockStyle", &settings.block_style.to_string());
    print_field("touchSupport", &settings.touch_support.to_string());

    println!();
    print_list(
        "customPatterns",
        &settings.custom_patterns.iter().map(describe_entry).collect::<Vec<_>>(),
    );
    print_list("excludeTerms", &settings.exclude_terms);

    Ok(())
}

const fn behavior_name(behavior: RevealBehavior) -> &'static str {
    match behavior {
        RevealBehavior::Cursor => "cursor",
        RevealBehavior::Click => "click",
        RevealBehavior::Hover => "hover",
    }
}

fn describe_entry(entry: &PatternEntry) -> String {
    match entry {
        PatternEntry::Literal(term) => term.clone(),
        PatternEntry::Compiled(compiled) => format!("/{}/{}", compiled.regex, compiled.flags),
    }
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        print_field(label, "none");
        return;
    }

    print_field(label, "");
    for (index, item) in items.iter().enumerate() {
        println!(
            "    {} {} {}",
            colors::muted().apply_to(indicators::BULLET),
            colors::accent().apply_to(index),
            colors::secondary().apply_to(item)
        );
    }
}

fn add_pattern<S: KeyValueStore>(store: &mut SettingsStore<S>, term: &str, regex: bool, flags: &str) -> super::Result {
    let mut settings = store.try_load()?;

    let entry = if regex {
        PatternEntry::Compiled(CompiledPattern::new(term, flags))
    } else {
        PatternEntry::Literal(term.trim().to_owned())
    };
    let index = settings.custom_patterns.len();
    Pattern::from_entry(index, &entry).context("pattern does not compile")?;

    if !settings.add_custom_entry(entry) {
        print_info("pattern is blank or already present; nothing to do");
        return Ok(());
    }

    store.save(&settings)?;
    print_success(&format!("added custom pattern {index}"));
    Ok(())
}

fn add_exclude<S: KeyValueStore>(store: &mut SettingsStore<S>, term: &str) -> super::Result {
    let mut settings = store.try_load()?;

    if !settings.add_exclude_term(term) {
        print_info("term is blank or already present; nothing to do");
        return Ok(());
    }

    store.save(&settings)?;
    print_success(&format!("added exclusion term '{}'", term.trim()));
    Ok(())
}

fn remove_pattern<S: KeyValueStore>(store: &mut SettingsStore<S>, index: usize) -> super::Result {
    let mut settings = store.try_load()?;

    let Some(removed) = settings.remove_custom_pattern(index) else {
        bail!(
            "no custom pattern at index {index} ({} configured)",
            settings.custom_patterns.len()
        );
    };

    store.save(&settings)?;
    print_success(&format!("removed custom pattern {}", describe_entry(&removed)));
    Ok(())
}

fn remove_exclude<S: KeyValueStore>(store: &mut SettingsStore<S>, index: usize) -> super::Result {
    let mut settings = store.try_load()?;

    let Some(removed) = settings.remove_exclude_term(index) else {
        bail!(
            "no exclusion term at index {index} ({} configured)",
            settings.exclude_terms.len()
        );
    };

    store.save(&settings)?;
    print_success(&format!("removed exclusion term '{removed}'"));
    Ok(())
}

fn set<S: KeyValueStore>(store: &mut SettingsStore<S>, key: &str, raw: &str) -> super::Result {
    let settings = store.try_load()?;
    let Value::Object(mut map) = serde_json::to_value(&settings)? else {
        bail!("settings did not serialise to an object");
    };

    if key == "version" {
        bail!("'version' is managed automatically");
    }
    if !map.contains_key(key) {
        let known: Vec<&str> = map.keys().map(String::as_str).filter(|k| *k != "version").collect();
        bail!("unknown setting '{key}' - use one of: {}", known.join(", "));
    }

    map.insert(key.to_owned(), parse_value(raw));
    let updated = RedactionSettings::merged_with(map).with_context(|| format!("invalid value for '{key}'"))?;

    store.save(&updated)?;
    print_success(&format!("set {key}"));
    Ok(())
}

/// Parses `raw` as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn reset<S: KeyValueStore>(store: &mut SettingsStore<S>) -> super::Result {
    store.reset()?;
    print_success("settings reset to defaults");
    Ok(())
}

#[cfg(test)]
mod tests {
    use shroud_core::store::MemoryStore;

    use super::*;

    fn memory_store() -> SettingsStore<MemoryStore> {
        SettingsStore::new(MemoryStore::new())
    }

    #[test]
    fn parse_value_prefers_json() {
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("[\"a\"]"), serde_json::json!(["a"]));
        assert_eq!(parse_value("click"), Value::String("click".to_owned()));
    }

    #[test]
    fn set_updates_one_key() {
        let mut store = memory_store();
        set(&mut store, "revealBehavior", "click").unwrap();
        set(&mut store, "blockStyle", "true").unwrap();

        let settings = store.try_load().unwrap();
        assert_eq!(settings.reveal_behavior, RevealBehavior::Click);
        assert!(settings.block_style);
        assert!(settings.enabled);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut store = memory_store();
        assert!(set(&mut store, "colour", "red").is_err());
        assert!(set(&mut store, "version", "2").is_err());
        assert!(set(&mut store, "revealBehavior", "wiggle").is_err());
        assert!(store.inner().get(shroud_core::SETTINGS_KEY).unwrap().is_none());
    }

    #[test]
    fn invalid_regex_is_not_saved() {
        let mut store = memory_store();
        assert!(add_pattern(&mut store, "[unclosed", true, "").is_err());
        assert!(store.try_load().unwrap().custom_patterns.is_empty());
    }

    #[test]
    fn add_and_remove_exclusions() {
        let mut store = memory_store();
        add_exclude(&mut store, " acme.com ").unwrap();
        add_exclude(&mut store, "acme.com").unwrap();
        assert_eq!(store.try_load().unwrap().exclude_terms, vec!["acme.com"]);

        assert!(remove_exclude(&mut store, 3).is_err());
        remove_exclude(&mut store, 0).unwrap();
        assert!(store.try_load().unwrap().exclude_terms.is_empty());
    }

    #[test]
    fn compiled_entries_are_described_with_slashes() {
        let entry = PatternEntry::Compiled(CompiledPattern::new("\\d+", "i"));
        assert_eq!(describe_entry(&entry), "/\\d+/i");
        assert_eq!(describe_entry(&PatternEntry::from("secret")), "secret");
    }
}
