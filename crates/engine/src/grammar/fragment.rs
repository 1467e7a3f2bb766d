//! Fragment — composable named pieces of a line grammar.
//!
//! A fragment carries its regex source text together with the capture
//! slots it declares, so a composed grammar knows its full slot set and
//! alternation priority stays visible in the composition itself instead
//! of being buried in concatenated pattern strings.

/// One piece of a line grammar: regex source plus declared capture slots.
///
/// Slot order follows composition order, which for alternations is also
/// the match priority (the regex engine takes the leftmost alternative).
#[derive(Debug, Clone)]
pub struct Fragment {
    text: String,
    slots: Vec<&'static str>,
}

impl Fragment {
    /// A fragment matching the regex `text` verbatim, declaring no slots.
    ///
    /// `text` must not contain a top-level alternation; wrap it with
    /// [`Fragment::alt`] instead so composition stays associative.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            slots: Vec::new(),
        }
    }

    /// A fragment matching `text` literally, metacharacters escaped.
    pub fn lit(text: &str) -> Self {
        Self {
            text: regex::escape(text),
            slots: Vec::new(),
        }
    }

    /// Wrap `inner` in a named capture group, declaring `slot`.
    pub fn capture(slot: &'static str, inner: Fragment) -> Self {
        let mut slots = vec![slot];
        slots.extend(inner.slots);
        Self {
            text: format!("(?P<{}>{})", slot, inner.text),
            slots,
        }
    }

    /// Concatenate fragments with no separator.
    pub fn seq(parts: impl IntoIterator<Item = Fragment>) -> Self {
        Self::join(parts, "")
    }

    /// Concatenate fragments separated by a single space.
    pub fn spaced(parts: impl IntoIterator<Item = Fragment>) -> Self {
        Self::join(parts, " ")
    }

    /// Alternation. Order is priority: the first alternative that
    /// matches wins.
    pub fn alt(parts: impl IntoIterator<Item = Fragment>) -> Self {
        let mut texts = Vec::new();
        let mut slots = Vec::new();
        for part in parts {
            texts.push(format!("(?:{})", part.text));
            slots.extend(part.slots);
        }
        Self {
            text: format!("(?:{})", texts.join("|")),
            slots,
        }
    }

    /// Make this fragment optional.
    pub fn opt(self) -> Self {
        Self {
            text: format!("(?:{})?", self.text),
            slots: self.slots,
        }
    }

    /// The composed regex source.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Every capture slot this fragment declares, in composition order.
    pub fn slots(&self) -> &[&'static str] {
        &self.slots
    }

    fn join(parts: impl IntoIterator<Item = Fragment>, sep: &str) -> Self {
        let mut texts = Vec::new();
        let mut slots = Vec::new();
        for part in parts {
            texts.push(part.text);
            slots.extend(part.slots);
        }
        Self {
            text: texts.join(sep),
            slots,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
