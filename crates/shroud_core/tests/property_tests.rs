//! Property-based tests for `shroud_core`.
//!
//! These tests verify invariants that should hold for all inputs,
//! catching edge cases that hand-written tests might miss.

use proptest::prelude::*;
use shroud_core::prelude::*;
use shroud_core::settings::{CompiledPattern, PatternEntry};
use shroud_core::span::{DisplayMode, SpanRegistry, SpanSource};
use shroud_core::store::MemoryStore;
use shroud_core::{RevealCursor, RevealMachine};

/// A run of words, emails, phone numbers and SSNs separated by spaces and
/// the occasional paragraph break.
fn document_text() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        4 => "[a-zA-Z]{1,8}",
        1 => "[a-z]{1,6}@[a-z]{2,6}\\.(com|org|io)",
        1 => "[0-9]{3}-[0-9]{3}-[0-9]{4}",
        1 => "[0-9]{3}-[0-9]{2}-[0-9]{4}",
        1 => Just("\n\n".to_owned()),
    ];
    prop::collection::vec(token, 0..16).prop_map(|tokens| tokens.join(" "))
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Reveal(usize),
    Hide(usize),
    Toggle(usize),
    Enter(usize),
    Leave(usize),
    HideAll,
}

fn op(spans: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..spans).prop_map(Op::Reveal),
        (0..spans).prop_map(Op::Hide),
        (0..spans).prop_map(Op::Toggle),
        (0..spans).prop_map(Op::Enter),
        (0..spans).prop_map(Op::Leave),
        Just(Op::HideAll),
    ]
}

fn reveal_behavior() -> impl Strategy<Value = RevealBehavior> {
    prop_oneof![
        Just(RevealBehavior::Cursor),
        Just(RevealBehavior::Click),
        Just(RevealBehavior::Hover),
    ]
}

fn pattern_entry() -> impl Strategy<Value = PatternEntry> {
    prop_oneof![
        "[a-z]{1,10}".prop_map(PatternEntry::Literal),
        ("[a-z]{1,6}\\\\d\\+", "[gims]{0,3}").prop_map(|(regex, flags)| {
            PatternEntry::Compiled(CompiledPattern { regex, flags })
        }),
    ]
}

prop_compose! {
    fn settings()(
        enabled in any::<bool>(),
        auto_redact_pii in any::<bool>(),
        custom_patterns in prop::collection::vec(pattern_entry(), 0..4),
        exclude_terms in prop::collection::vec("[a-z.@]{1,12}", 0..4),
        reveal_behavior in reveal_behavior(),
        block_style in any::<bool>(),
        touch_support in any::<bool>(),
    ) -> RedactionSettings {
        RedactionSettings {
            enabled,
            auto_redact_pii,
            custom_patterns,
            exclude_terms,
            reveal_behavior,
            block_style,
            touch_support,
            ..RedactionSettings::default()
        }
    }
}

proptest! {
    /// Scanning an already scanned document creates no spans and leaves the
    /// markup unchanged.
    #[test]
    fn scan_is_idempotent(text in document_text()) {
        let mut redactor = Redactor::new(Document::from_plain_text(&text), RedactionSettings::default());
        let first = redactor.start_auto_redaction();
        let markup = redactor.render_markup();

        let second = redactor.start_auto_redaction();

        prop_assert!(second.spans_created.is_empty());
        prop_assert_eq!(redactor.spans().len(), first.spans_created.len());
        prop_assert_eq!(redactor.render_markup(), markup);
    }

    /// No sequence of reveal operations leaves more than one span revealed,
    /// and the cursor always names the revealed span.
    #[test]
    fn at_most_one_span_is_revealed(
        touch in prop::collection::vec(any::<bool>(), 1..40),
        ops in prop::collection::vec(op(4), 1..40),
    ) {
        let mut spans = SpanRegistry::new();
        let ids: Vec<SpanId> = (0..4)
            .map(|i| spans.register(NodeId::new(i), "secret", DisplayMode::Inline, SpanSource::Api))
            .collect();
        let mut cursor = RevealCursor::new();

        for (step, op) in ops.into_iter().enumerate() {
            let via = if touch[step % touch.len()] { InputModality::Touch } else { InputModality::Pointer };
            let mut machine = RevealMachine::new(&mut spans, &mut cursor);
            match op {
                Op::Reveal(i) => { machine.reveal(ids[i], via); }
                Op::Hide(i) => { machine.hide(ids[i]); }
                Op::Toggle(i) => { machine.toggle(ids[i], via); }
                Op::Enter(i) => { machine.pointer_enter(ids[i]); }
                Op::Leave(i) => { machine.pointer_leave(ids[i]); }
                Op::HideAll => { machine.hide_all(); }
            }

            let revealed = spans.revealed();
            prop_assert!(revealed.len() <= 1, "revealed: {:?}", revealed);
            prop_assert_eq!(revealed.first().copied(), cursor.current());
            for span in spans.iter() {
                prop_assert!(!span.touch_locked || span.reveal_state == RevealState::Revealed);
            }
        }
    }

    /// A wrapped span never contains an exclusion term, in any letter case.
    #[test]
    fn excluded_terms_are_never_wrapped(text in document_text(), term in "[a-zA-Z0-9@.-]{1,3}") {
        let mut settings = RedactionSettings::default();
        settings.add_exclude_term(&term);
        settings.add_custom_entry(PatternEntry::Compiled(CompiledPattern::new("[a-z]+", "i")));

        let mut redactor = Redactor::new(Document::from_plain_text(&text), settings);
        redactor.start_auto_redaction();

        let needle = term.to_lowercase();
        for span in redactor.spans().iter() {
            prop_assert!(
                !span.original_text.to_lowercase().contains(&needle),
                "span {:?} contains excluded term {:?}",
                span.original_text,
                term
            );
        }
    }

    /// Saving then loading any fully specified settings record is lossless.
    #[test]
    fn settings_round_trip_through_store(settings in settings()) {
        let mut store = SettingsStore::new(MemoryStore::new());
        store.save(&settings).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(store.try_load().map_err(|e| TestCaseError::fail(e.to_string()))?, settings);
    }

    /// Export replaces a span with exactly `max(1, chars / 2)` block
    /// characters and never leaks the original text.
    #[test]
    fn export_masks_span_text(
        prefix in "[0-9 ]{0,10}",
        secret in "[A-Za-zé]{1,20}",
        suffix in "[0-9 ]{0,10}",
    ) {
        let mut settings = RedactionSettings {
            auto_redact_pii: false,
            ..RedactionSettings::default()
        };
        settings.add_custom_pattern(&secret);

        let text = format!("{prefix}{secret}{suffix}");
        let mut redactor = Redactor::new(Document::from_plain_text(&text), settings);
        redactor.start_auto_redaction();

        let run = "█".repeat((secret.chars().count() / 2).max(1));
        let export = redactor.export_redacted_content();
        prop_assert_eq!(&export, &format!("{prefix}{run}{suffix}"));
        prop_assert!(!export.contains(&secret));
    }

    /// Clearing every redaction restores the original visible text byte for byte.
    #[test]
    fn clear_all_restores_text(text in document_text()) {
        let mut redactor = Redactor::new(Document::from_plain_text(&text), RedactionSettings::default());
        redactor.start_auto_redaction();
        let first_span = redactor.spans().iter().next().map(|s| s.id);
        if let Some(span) = first_span {
            redactor.toggle_reveal_touch(span);
        }

        redactor.clear_all_redactions();

        let root = redactor.document().root();
        prop_assert_eq!(redactor.document().text_content(root), text.clone());
        prop_assert_eq!(redactor.export_redacted_content(), text);
        prop_assert!(redactor.spans().is_empty());
    }
}
