/// Selection context: the tags and slot values a generator input exposes
/// to phrase expansion.
use rustc_hash::{FxHashMap, FxHashSet};

use crate::schema::Selection;

#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    kind: &'static str,
    /// Tags in declaration order, kept for stable seeding.
    ordered_tags: Vec<String>,
    tags: FxHashSet<String>,
    slots: FxHashMap<&'static str, String>,
}

impl SelectionContext {
    pub fn from_selection<S: Selection>(selection: &S) -> Self {
        let ordered_tags = selection.tags();
        Self {
            kind: selection.kind(),
            tags: ordered_tags.iter().cloned().collect(),
            ordered_tags,
            slots: selection.slots().into_iter().collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn tags(&self) -> &[String] {
        &self.ordered_tags
    }

    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::story::VisualStoryInput;

    #[test]
    fn context_from_story_selection() {
        let ctx = SelectionContext::from_selection(&VisualStoryInput::default());
        assert_eq!(ctx.kind(), "story");
        assert!(ctx.has_tag("setting:village"));
        assert!(!ctx.has_tag("setting:city"));
        assert_eq!(ctx.slot("theme"), Some("Local Heroes"));
        assert_eq!(ctx.slot("grade"), None);
        assert_eq!(ctx.tags()[0], "kind:story");
    }
}
