//! Translation sections and the table that selects between them.

use crate::slot::{Slot, SLOT_COUNT};
use crate::stroke::StrokeSequence;
use regex::Regex;

/// A named rule set, either matched against window titles or the default.
#[derive(Debug, Clone)]
pub struct TranslationSection {
    name: String,
    pattern: Option<Regex>,
    slots: Vec<Option<StrokeSequence>>,
}

impl TranslationSection {
    /// Create an empty section. `pattern == None` makes it a default section.
    pub fn new(name: impl Into<String>, pattern: Option<Regex>) -> Self {
        Self {
            name: name.into(),
            pattern,
            slots: vec![None; SLOT_COUNT],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source text of the pattern, `None` for the default section.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    pub fn is_default(&self) -> bool {
        self.pattern.is_none()
    }

    /// Whether this section's pattern matches `window_text` anywhere.
    /// The default section matches everything.
    pub fn matches(&self, window_text: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(true, |re| re.is_match(window_text))
    }

    /// Sequence bound to `slot` in this section only.
    pub fn get(&self, slot: Slot) -> Option<&StrokeSequence> {
        self.slots.get(slot.index()?)?.as_ref()
    }

    pub fn is_bound(&self, slot: Slot) -> bool {
        self.get(slot).is_some()
    }

    /// Bind a sequence to an unbound slot.
    ///
    /// Returns `false` and leaves the existing binding in place if the slot
    /// is already bound or does not exist.
    pub fn bind(&mut self, slot: Slot, sequence: StrokeSequence) -> bool {
        let Some(entry) = slot.index().and_then(|i| self.slots.get_mut(i)) else {
            return false;
        };
        if entry.is_some() {
            return false;
        }
        *entry = Some(sequence);
        true
    }

    /// Number of bound slots.
    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Ordered list of sections plus the default section.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    sections: Vec<TranslationSection>,
    default: Option<usize>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section in file order.
    ///
    /// A default section replaces any previously installed default as the
    /// fallback; returns `true` when that happens.
    pub fn push(&mut self, section: TranslationSection) -> bool {
        let replaced = section.is_default() && self.default.is_some();
        if section.is_default() {
            self.default = Some(self.sections.len());
        }
        self.sections.push(section);
        replaced
    }

    pub fn sections(&self) -> &[TranslationSection] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn default_section(&self) -> Option<&TranslationSection> {
        self.sections.get(self.default?)
    }

    /// Section governing a window: the first patterned section (in file
    /// order) whose pattern matches, otherwise the default section.
    pub fn select(&self, window_text: &str) -> Option<&TranslationSection> {
        self.sections
            .iter()
            .filter(|s| !s.is_default())
            .find(|s| s.matches(window_text))
            .or_else(|| self.default_section())
    }

    /// Sequence for `slot` in `section`, falling back to the default section.
    pub fn lookup<'a>(
        &'a self,
        section: Option<&'a TranslationSection>,
        slot: Slot,
    ) -> Option<&'a StrokeSequence> {
        section
            .and_then(|s| s.get(slot))
            .or_else(|| self.default_section()?.get(slot))
    }

    /// Select the section for `window_text` and resolve `slot` in it.
    pub fn resolve(&self, window_text: &str, slot: Slot) -> Option<&StrokeSequence> {
        self.lookup(self.select(window_text), slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keysym::Symbol;
    use crate::slot::Direction;
    use crate::stroke::StrokeOp;

    fn seq(c: char) -> StrokeSequence {
        let sym = Symbol::from_char(c).unwrap();
        StrokeSequence::from(vec![StrokeOp::press(sym), StrokeOp::release(sym)])
    }

    fn section(name: &str, pattern: &str) -> TranslationSection {
        TranslationSection::new(name, Some(Regex::new(pattern).unwrap()))
    }

    #[test]
    fn test_bind_first_wins() {
        let mut s = TranslationSection::new("d", None);
        assert!(s.bind(Slot::Jog(Direction::Left), seq('a')));
        assert!(!s.bind(Slot::Jog(Direction::Left), seq('b')));
        assert_eq!(s.get(Slot::Jog(Direction::Left)), Some(&seq('a')));
        assert_eq!(s.bound_count(), 1);
    }

    #[test]
    fn test_bind_out_of_range_slot() {
        let mut s = TranslationSection::new("d", None);
        assert!(!s.bind(Slot::KeyDown(16), seq('a')));
        assert_eq!(s.bound_count(), 0);
    }

    #[test]
    fn test_first_matching_section_wins() {
        let mut table = TranslationTable::new();
        table.push(section("A", "foo"));
        table.push(section("B", "bar"));
        table.push(TranslationSection::new("default", None));

        assert_eq!(table.select("foobar").map(|s| s.name()), Some("A"));
        assert_eq!(table.select("a bar").map(|s| s.name()), Some("B"));
        assert_eq!(table.select("nothing").map(|s| s.name()), Some("default"));
    }

    #[test]
    fn test_default_is_last_resort_regardless_of_position() {
        let mut table = TranslationTable::new();
        table.push(TranslationSection::new("default", None));
        table.push(section("Emacs", "emacs"));

        assert_eq!(table.select("emacs@host").map(|s| s.name()), Some("Emacs"));
        assert_eq!(table.select("xterm").map(|s| s.name()), Some("default"));
    }

    #[test]
    fn test_no_match_without_default() {
        let mut table = TranslationTable::new();
        table.push(section("A", "^foo$"));
        assert!(table.select("foobar").is_none());
        assert!(table.resolve("foobar", Slot::KeyDown(1)).is_none());
    }

    #[test]
    fn test_later_default_replaces_earlier() {
        let mut table = TranslationTable::new();
        assert!(!table.push(TranslationSection::new("first", None)));
        assert!(table.push(TranslationSection::new("second", None)));
        assert_eq!(table.default_section().map(|s| s.name()), Some("second"));
        assert_eq!(table.sections().len(), 2);
    }

    #[test]
    fn test_slot_falls_back_to_default() {
        let mut specific = section("A", "foo");
        specific.bind(Slot::KeyDown(1), seq('x'));
        let mut default = TranslationSection::new("default", None);
        default.bind(Slot::KeyDown(1), seq('y'));
        default.bind(Slot::KeyDown(2), seq('z'));

        let mut table = TranslationTable::new();
        table.push(specific);
        table.push(default);

        assert_eq!(table.resolve("foo", Slot::KeyDown(1)), Some(&seq('x')));
        assert_eq!(table.resolve("foo", Slot::KeyDown(2)), Some(&seq('z')));
        assert_eq!(table.resolve("foo", Slot::KeyDown(3)), None);
    }
}
