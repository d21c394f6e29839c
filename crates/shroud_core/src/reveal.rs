//! The reveal state machine.
//!
//! A span is either hidden or revealed, and at most one span in the registry
//! is revealed at a time. The "currently revealed" pointer lives in a
//! [`RevealCursor`] owned by the caller and lent to a [`RevealMachine`] for
//! the duration of one input event, so the machine can be driven without a
//! document.

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::span::{RevealState, SpanId, SpanRegistry};

/// The input path an event arrived on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InputModality {
    /// Mouse or pen with hover support.
    #[default]
    Pointer,
    /// Touch screen; reveals are toggles and set the touch lock.
    Touch,
}

/// Tracks which span, if any, is currently revealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealCursor {
    current: Option<SpanId>,
}

impl RevealCursor {
    /// Creates a cursor with nothing revealed.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Returns the revealed span, if any.
    #[must_use]
    pub const fn current(&self) -> Option<SpanId> {
        self.current
    }

    /// Forgets the revealed span without touching any span state.
    pub const fn reset(&mut self) {
        self.current = None;
    }
}

/// A state change applied to one span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The span that changed.
    pub span: SpanId,
    /// Its new display state.
    pub state: RevealState,
    /// Its new touch lock flag.
    pub touch_locked: bool,
}

/// Applies reveal and hide requests to a [`SpanRegistry`].
///
/// Every method returns the transitions it applied, in order, so the caller
/// can mirror them onto the presentation layer. Requests naming an unknown
/// span are ignored and return no transitions.
#[derive(Debug)]
pub struct RevealMachine<'a> {
    spans: &'a mut SpanRegistry,
    cursor: &'a mut RevealCursor,
}

impl<'a> RevealMachine<'a> {
    /// Borrows the registry and cursor for one round of input handling.
    pub const fn new(spans: &'a mut SpanRegistry, cursor: &'a mut RevealCursor) -> Self {
        Self { spans, cursor }
    }

    /// Reveals `id`, first hiding whichever other span is revealed.
    ///
    /// A touch reveal sets the touch lock. A pointer reveal of a span that is
    /// already revealed changes nothing.
    pub fn reveal(&mut self, id: SpanId, via: InputModality) -> Vec<Transition> {
        let mut transitions = Vec::new();
        if !self.spans.contains(id) {
            return transitions;
        }

        if let Some(other) = self.cursor.current
            && other != id
        {
            transitions.extend(self.hide(other));
        }

        let lock = via == InputModality::Touch;
        let Some(span) = self.spans.get_mut(id) else {
            return transitions;
        };
        if span.is_revealed() && (span.touch_locked || !lock) {
            self.cursor.current = Some(id);
            return transitions;
        }

        span.reveal_state = RevealState::Revealed;
        span.touch_locked = lock;
        self.cursor.current = Some(id);

        #[cfg(feature = "tracing")]
        trace!(span = %id, ?via, "revealed");

        transitions.push(Transition {
            span: id,
            state: RevealState::Revealed,
            touch_locked: lock,
        });
        transitions
    }

    /// Hides `id` and clears its touch lock. Hiding a hidden span does nothing.
    pub fn hide(&mut self, id: SpanId) -> Vec<Transition> {
        if self.cursor.current == Some(id) {
            self.cursor.current = None;
        }

        let Some(span) = self.spans.get_mut(id) else {
            return Vec::new();
        };
        if !span.is_revealed() {
            return Vec::new();
        }

        span.reveal_state = RevealState::Hidden;
        span.touch_locked = false;

        #[cfg(feature = "tracing")]
        trace!(span = %id, "hidden");

        vec![Transition {
            span: id,
            state: RevealState::Hidden,
            touch_locked: false,
        }]
    }

    /// Pointer entered `id`.
    pub fn pointer_enter(&mut self, id: SpanId) -> Vec<Transition> {
        self.reveal(id, InputModality::Pointer)
    }

    /// Pointer left `id`. Only the currently revealed span reacts.
    pub fn pointer_leave(&mut self, id: SpanId) -> Vec<Transition> {
        if self.cursor.current == Some(id) {
            self.hide(id)
        } else {
            Vec::new()
        }
    }

    /// Hides `id` if it is revealed, otherwise reveals it via `via`.
    pub fn toggle(&mut self, id: SpanId, via: InputModality) -> Vec<Transition> {
        match self.spans.get(id) {
            Some(span) if span.is_revealed() => self.hide(id),
            Some(_) => self.reveal(id, via),
            None => Vec::new(),
        }
    }

    /// Hides every revealed span and clears the cursor.
    pub fn hide_all(&mut self) -> Vec<Transition> {
        self.cursor.current = None;
        self.spans
            .revealed()
            .into_iter()
            .flat_map(|id| self.hide(id))
            .collect()
    }
}
