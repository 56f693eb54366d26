/// Content lint: structural checks for phrase books before they reach the
/// generators.
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::phrasebook::PhraseBook;

/// What a phrase book is checked against.
#[derive(Debug, Clone, Default)]
pub struct LintScope {
    /// Rules the generators expand directly.
    pub required_rules: Vec<String>,
    /// Slots available to rules whose name starts with a given prefix
    /// (e.g. `lesson_`).
    pub prefixed_slots: Vec<(String, Vec<String>)>,
    /// Slots available to rules with no matching prefix.
    pub shared_slots: Vec<String>,
    /// Every tag a selection can carry. Empty disables the tag check.
    pub known_tags: Vec<String>,
}

impl LintScope {
    fn slots_for(&self, rule_name: &str) -> &[String] {
        self.prefixed_slots
            .iter()
            .find(|(prefix, _)| rule_name.starts_with(prefix.as_str()))
            .map(|(_, slots)| slots.as_slice())
            .unwrap_or(&self.shared_slots)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn lint(book: &PhraseBook, scope: &LintScope) -> LintReport {
    let mut report = LintReport::default();
    let known_tags: FxHashSet<&str> = scope.known_tags.iter().map(String::as_str).collect();
    let mut referenced: FxHashSet<&str> = FxHashSet::default();

    for required in &scope.required_rules {
        if !book.rules.contains_key(required) {
            report
                .errors
                .push(format!("Required rule '{required}' is missing"));
        }
    }

    let mut names: Vec<&String> = book.rules.keys().collect();
    names.sort();

    for name in &names {
        let rule = &book.rules[name.as_str()];
        let allowed_slots = scope.slots_for(name);

        if !rule.has_fallback() {
            report.errors.push(format!(
                "Rule '{name}' has no unconditional variant to fall back on"
            ));
        }

        for (i, variant) in rule.variants.iter().enumerate() {
            if variant.alternatives.is_empty() {
                report
                    .errors
                    .push(format!("Rule '{name}' variant {i} has no alternatives"));
            } else if variant.total_weight() == 0 {
                report
                    .errors
                    .push(format!("Rule '{name}' variant {i} has zero total weight"));
            }

            if !known_tags.is_empty() {
                for tag in variant.requires.iter().chain(&variant.excludes) {
                    if !known_tags.contains(tag.as_str()) {
                        report.warnings.push(format!(
                            "Rule '{name}' variant {i} uses unknown tag '{tag}'"
                        ));
                    }
                }
            }

            for alt in &variant.alternatives {
                for slot in alt.template.slots() {
                    if !allowed_slots.iter().any(|s| s == slot) {
                        report
                            .errors
                            .push(format!("Rule '{name}' uses unknown slot '{slot}'"));
                    }
                }
                for target in alt.template.rule_refs() {
                    referenced.insert(target);
                    if !book.rules.contains_key(target) {
                        report.errors.push(format!(
                            "Rule '{name}' references non-existent rule '{target}'"
                        ));
                    }
                }
            }
        }
    }

    for name in &names {
        let required = scope.required_rules.iter().any(|r| r == *name);
        if !required && !referenced.contains(name.as_str()) {
            report
                .warnings
                .push(format!("Rule '{name}' is never referenced"));
        }
    }

    for cycle in find_cycles(book) {
        report
            .errors
            .push(format!("Reference cycle: {}", cycle.join(" -> ")));
    }

    report.errors.dedup();
    report
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Every rule-reference cycle, each reported once from its first rule
/// in name order.
fn find_cycles(book: &PhraseBook) -> Vec<Vec<String>> {
    let mut edges: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for (name, rule) in &book.rules {
        let mut targets: Vec<&str> = rule
            .variants
            .iter()
            .flat_map(|v| &v.alternatives)
            .flat_map(|a| a.template.rule_refs())
            .filter(|t| book.rules.contains_key(*t))
            .collect();
        targets.sort_unstable();
        targets.dedup();
        edges.insert(name.as_str(), targets);
    }

    let mut names: Vec<&str> = edges.keys().copied().collect();
    names.sort_unstable();

    let mut marks: FxHashMap<&str, Mark> = FxHashMap::default();
    let mut cycles = Vec::new();
    for name in names {
        let mut path = Vec::new();
        visit(name, &edges, &mut marks, &mut path, &mut cycles);
    }
    cycles
}

fn visit<'a>(
    node: &'a str,
    edges: &FxHashMap<&'a str, Vec<&'a str>>,
    marks: &mut FxHashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    match marks.get(node) {
        Some(Mark::Done) => return,
        Some(Mark::Visiting) => {
            if let Some(start) = path.iter().position(|n| *n == node) {
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(node.to_string());
                cycles.push(cycle);
            }
            return;
        }
        None => {}
    }

    marks.insert(node, Mark::Visiting);
    path.push(node);
    if let Some(targets) = edges.get(node) {
        for target in targets {
            visit(*target, edges, marks, path, cycles);
        }
    }
    path.pop();
    marks.insert(node, Mark::Done);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> LintScope {
        LintScope {
            required_rules: vec!["lesson_title".to_string()],
            prefixed_slots: vec![(
                "lesson_".to_string(),
                vec!["theme".to_string(), "grade".to_string()],
            )],
            shared_slots: vec!["theme".to_string()],
            known_tags: vec!["theme:local_heroes".to_string()],
        }
    }

    #[test]
    fn clean_book_passes() {
        let book = PhraseBook::parse_ron(
            r#"{
                "lesson_title": [
                    Rule(requires: ["theme:local_heroes"], alternatives: [(weight: 1, text: "{grade} meets {rule:hero}")]),
                    Rule(alternatives: [(weight: 1, text: "{theme} for {grade}")]),
                ],
                "hero": [Rule(alternatives: [(weight: 1, text: "the {theme} helpers")])],
            }"#,
        )
        .unwrap();
        let report = lint(&book, &scope());
        assert!(report.is_clean(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn reports_structural_errors() {
        let book = PhraseBook::parse_ron(
            r#"{
                "hero": [
                    Rule(requires: ["theme:local_heroes"], alternatives: [(weight: 0, text: "{grade} hero {rule:ghost}")]),
                    Rule(requires: ["theme:local_heros"], alternatives: []),
                ],
            }"#,
        )
        .unwrap();
        let report = lint(&book, &scope());
        let all = report.errors.join("\n");
        assert!(all.contains("Required rule 'lesson_title' is missing"));
        assert!(all.contains("'hero' has no unconditional variant"));
        assert!(all.contains("zero total weight"));
        assert!(all.contains("has no alternatives"));
        assert!(all.contains("unknown slot 'grade'"));
        assert!(all.contains("non-existent rule 'ghost'"));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("unknown tag 'theme:local_heros'")));
        assert!(report.warnings.iter().any(|w| w.contains("'hero' is never referenced")));
    }

    #[test]
    fn weights_beyond_u32_range_are_accepted() {
        let book = PhraseBook::parse_ron(
            r#"{
                "lesson_title": [Rule(alternatives: [
                    (weight: 4000000000, text: "{theme} walk"),
                    (weight: 4000000000, text: "{theme} talk"),
                ])],
            }"#,
        )
        .unwrap();
        let report = lint(&book, &scope());
        assert!(report.is_clean(), "{:?}", report.errors);
    }

    #[test]
    fn detects_indirect_cycles() {
        let book = PhraseBook::parse_ron(
            r#"{
                "lesson_title": [Rule(alternatives: [(weight: 1, text: "{rule:a}")])],
                "a": [Rule(alternatives: [(weight: 1, text: "{rule:b}")])],
                "b": [Rule(alternatives: [(weight: 1, text: "x"), (weight: 1, text: "{rule:a}")])],
            }"#,
        )
        .unwrap();
        let report = lint(&book, &scope());
        assert_eq!(
            report.errors,
            vec!["Reference cycle: a -> b -> a".to_string()]
        );
    }
}
