/// Phrase book runtime: templates, tag-guarded phrase rules, RON loading
/// and expansion.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::context::SelectionContext;
use crate::core::variety;

/// Maximum nesting of `{rule:..}` references during expansion.
pub const MAX_EXPANSION_DEPTH: usize = 16;

#[derive(Debug, Error)]
pub enum PhraseError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("phrase rule not found: {0}")]
    RuleNotFound(String),
    #[error("no variant of '{0}' matches the selection")]
    NoMatchingVariant(String),
    #[error("rule '{rule}' uses unknown slot '{slot}'")]
    UnknownSlot { rule: String, slot: String },
    #[error("expansion of '{0}' exceeded the nesting limit")]
    RecursionLimit(String),
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Selection value interpolation: `{theme}`.
    Slot(String),
    /// Reference to another phrase rule: `{rule:theme_motif}`.
    RuleRef(String),
}

/// A parsed template: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{name}` → `Slot`
    /// - `{rule:name}` → `RuleRef`
    /// - `{{` / `}}` → literal `{` / `}`
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, PhraseError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            if chars[i] == '{' {
                // Escaped brace
                if i + 1 < len && chars[i + 1] == '{' {
                    literal_buf.push('{');
                    i += 2;
                    continue;
                }

                if !literal_buf.is_empty() {
                    segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                }

                let start = i + 1;
                let mut end = start;
                let mut closed = false;
                while end < len {
                    match chars[end] {
                        '{' => {
                            return Err(PhraseError::TemplateParse(
                                "nested braces are not allowed".to_string(),
                            ));
                        }
                        '}' => {
                            closed = true;
                            break;
                        }
                        _ => end += 1,
                    }
                }

                if !closed {
                    return Err(PhraseError::TemplateParse("unclosed brace".to_string()));
                }

                let content: String = chars[start..end].iter().collect();
                let content = content.trim();
                if content.is_empty() {
                    return Err(PhraseError::TemplateParse("empty braces".to_string()));
                }

                segments.push(Self::parse_segment(content)?);
                i = end + 1;
            } else if chars[i] == '}' {
                if i + 1 < len && chars[i + 1] == '}' {
                    literal_buf.push('}');
                    i += 2;
                    continue;
                }
                return Err(PhraseError::TemplateParse(
                    "unmatched closing brace".to_string(),
                ));
            } else {
                literal_buf.push(chars[i]);
                i += 1;
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    fn parse_segment(content: &str) -> Result<TemplateSegment, PhraseError> {
        if let Some(name) = content.strip_prefix("rule:") {
            let name = name.trim();
            if name.is_empty() {
                return Err(PhraseError::TemplateParse(
                    "empty rule name in '{rule:}'".to_string(),
                ));
            }
            return Ok(TemplateSegment::RuleRef(name.to_string()));
        }
        Ok(TemplateSegment::Slot(content.to_string()))
    }

    /// Slot names referenced directly by this template.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::Slot(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Rule names referenced directly by this template.
    pub fn rule_refs(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::RuleRef(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Render using slots only; rule references and unknown slots are
    /// kept verbatim. Used for fallback text.
    pub fn render_slots(&self, ctx: &SelectionContext) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Slot(name) => match ctx.slot(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                },
                TemplateSegment::RuleRef(name) => {
                    out.push_str("{rule:");
                    out.push_str(name);
                    out.push('}');
                }
            }
        }
        out
    }
}

/// A weighted text alternative within a phrase variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    pub weight: u32,
    pub template: Template,
}

/// Alternatives guarded by selection tags.
///
/// A variant with no `requires` is the rule's generic fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseVariant {
    pub requires: Vec<String>,
    pub excludes: Vec<String>,
    pub alternatives: Vec<Alternative>,
}

impl PhraseVariant {
    pub fn matches(&self, ctx: &SelectionContext) -> bool {
        self.requires.iter().all(|t| ctx.has_tag(t))
            && !self.excludes.iter().any(|t| ctx.has_tag(t))
    }

    pub fn is_unconditional(&self) -> bool {
        self.requires.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.alternatives.iter().map(|a| a.weight as u64).sum()
    }
}

/// A named lookup table of phrase variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseRule {
    pub name: String,
    pub variants: Vec<PhraseVariant>,
}

impl PhraseRule {
    /// The most specific matching variant; ties go to the earliest declared.
    pub fn select(&self, ctx: &SelectionContext) -> Option<&PhraseVariant> {
        let mut best: Option<&PhraseVariant> = None;
        for variant in self.variants.iter().filter(|v| v.matches(ctx)) {
            match best {
                Some(current) if current.requires.len() >= variant.requires.len() => {}
                _ => best = Some(variant),
            }
        }
        best
    }

    pub fn has_fallback(&self) -> bool {
        self.variants.iter().any(|v| v.is_unconditional() && v.excludes.is_empty())
    }
}

/// A set of named phrase rules.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PhraseBook {
    pub rules: HashMap<String, PhraseRule>,
}

// RON deserialization helpers. The RON format uses a different shape
// than the internal types, so we need intermediate structs.

#[derive(Debug, Deserialize)]
struct RonAlternative {
    weight: u32,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Rule")]
struct RonRule {
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    excludes: Vec<String>,
    alternatives: Vec<RonAlternative>,
}

impl PhraseBook {
    /// Load a phrase book from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<PhraseBook, PhraseError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a phrase book from a RON string.
    pub fn parse_ron(input: &str) -> Result<PhraseBook, PhraseError> {
        let raw: HashMap<String, Vec<RonRule>> = ron::from_str(input)?;
        let mut rules = HashMap::new();

        for (name, ron_rules) in raw {
            let mut variants = Vec::with_capacity(ron_rules.len());
            for ron_rule in ron_rules {
                let mut alternatives = Vec::with_capacity(ron_rule.alternatives.len());
                for alt in ron_rule.alternatives {
                    let template = Template::parse(&alt.text).map_err(|e| {
                        PhraseError::TemplateParse(format!("in rule '{name}': {e}"))
                    })?;
                    alternatives.push(Alternative {
                        weight: alt.weight,
                        template,
                    });
                }
                variants.push(PhraseVariant {
                    requires: ron_rule.requires,
                    excludes: ron_rule.excludes,
                    alternatives,
                });
            }
            rules.insert(name.clone(), PhraseRule { name, variants });
        }

        Ok(PhraseBook { rules })
    }

    /// Merge another phrase book into this one. Rules from `other`
    /// override rules in `self` with the same name.
    pub fn merge(&mut self, other: PhraseBook) {
        for (name, rule) in other.rules {
            self.rules.insert(name, rule);
        }
    }

    /// Expand a rule against a selection.
    pub fn expand<R: Rng + ?Sized>(
        &self,
        rule_name: &str,
        ctx: &SelectionContext,
        rng: &mut R,
    ) -> Result<String, PhraseError> {
        let mut out = String::new();
        self.expand_into(rule_name, ctx, rng, 0, &mut out)?;
        Ok(out)
    }

    fn expand_into<R: Rng + ?Sized>(
        &self,
        rule_name: &str,
        ctx: &SelectionContext,
        rng: &mut R,
        depth: usize,
        out: &mut String,
    ) -> Result<(), PhraseError> {
        if depth >= MAX_EXPANSION_DEPTH {
            return Err(PhraseError::RecursionLimit(rule_name.to_string()));
        }

        let rule = self
            .rules
            .get(rule_name)
            .ok_or_else(|| PhraseError::RuleNotFound(rule_name.to_string()))?;
        let variant = rule
            .select(ctx)
            .ok_or_else(|| PhraseError::NoMatchingVariant(rule_name.to_string()))?;
        let alternative = variety::pick_weighted(&variant.alternatives, |a| a.weight, rng)
            .ok_or_else(|| PhraseError::NoMatchingVariant(rule_name.to_string()))?;

        for segment in &alternative.template.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Slot(name) => {
                    let value = ctx.slot(name).ok_or_else(|| PhraseError::UnknownSlot {
                        rule: rule_name.to_string(),
                        slot: name.clone(),
                    })?;
                    out.push_str(value);
                }
                TemplateSegment::RuleRef(name) => {
                    self.expand_into(name, ctx, rng, depth + 1, out)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::lesson::LessonPlanInput;
    use crate::schema::options::{Language, Subject};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lesson_ctx(subject: Subject, language: Language) -> SelectionContext {
        SelectionContext::from_selection(&LessonPlanInput {
            subject,
            language,
            ..LessonPlanInput::default()
        })
    }

    #[test]
    fn equally_specific_variants_prefer_the_first_declared() {
        let book = PhraseBook::parse_ron(
            r#"{
                "math_first": [
                    Rule(requires: ["subject:math"], alternatives: [(weight: 1, text: "math")]),
                    Rule(requires: ["language:hindi"], alternatives: [(weight: 1, text: "hindi")]),
                    Rule(alternatives: [(weight: 1, text: "generic")]),
                ],
                "hindi_first": [
                    Rule(requires: ["language:hindi"], alternatives: [(weight: 1, text: "hindi")]),
                    Rule(requires: ["subject:math"], alternatives: [(weight: 1, text: "math")]),
                    Rule(alternatives: [(weight: 1, text: "generic")]),
                ],
            }"#,
        )
        .unwrap();
        let ctx = lesson_ctx(Subject::Math, Language::Hindi);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(book.expand("math_first", &ctx, &mut rng).unwrap(), "math");
        assert_eq!(book.expand("hindi_first", &ctx, &mut rng).unwrap(), "hindi");
    }

    #[test]
    fn huge_weights_do_not_overflow() {
        let book = PhraseBook::parse_ron(
            r#"{ "big": [Rule(alternatives: [
                (weight: 4000000000, text: "one"),
                (weight: 4000000000, text: "two"),
            ])] }"#,
        )
        .unwrap();
        let variant = &book.rules["big"].variants[0];
        assert_eq!(variant.total_weight(), 8_000_000_000);

        let ctx = lesson_ctx(Subject::Evs, Language::English);
        let mut rng = StdRng::seed_from_u64(1);
        let text = book.expand("big", &ctx, &mut rng).unwrap();
        assert!(text == "one" || text == "two");
    }

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("Hello, class.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Hello, class.".to_string())]
        );
    }

    #[test]
    fn parse_slot_and_rule_ref() {
        let t = Template::parse("Explore {theme} with {rule:theme_motif}.").unwrap();
        assert_eq!(t.segments.len(), 5);
        assert_eq!(t.segments[1], TemplateSegment::Slot("theme".to_string()));
        assert_eq!(
            t.segments[3],
            TemplateSegment::RuleRef("theme_motif".to_string())
        );
        assert_eq!(t.slots().collect::<Vec<_>>(), vec!["theme"]);
        assert_eq!(t.rule_refs().collect::<Vec<_>>(), vec!["theme_motif"]);
    }

    #[test]
    fn parse_escaped_braces() {
        let t = Template::parse("Use {{braces}} here.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Use {braces} here.".to_string())]
        );
    }

    #[test]
    fn parse_errors() {
        assert!(Template::parse("Bad {} here").is_err());
        assert!(Template::parse("Bad {outer{inner}} here").is_err());
        assert!(Template::parse("Bad {unclosed here").is_err());
        assert!(Template::parse("Bad } here").is_err());
        assert!(Template::parse("Bad {rule:} here").is_err());
    }

    #[test]
    fn load_fixture_from_ron() {
        let path = std::path::PathBuf::from("tests/fixtures/test_phrasebook.ron");
        let book = PhraseBook::load_from_ron(&path).unwrap();
        assert_eq!(book.rules.len(), 3);
        let warm_up = &book.rules["warm_up"];
        assert_eq!(warm_up.variants.len(), 3);
        assert_eq!(warm_up.variants[0].requires, vec!["subject:math".to_string()]);
        assert!(warm_up.has_fallback());
    }

    #[test]
    fn bad_template_names_rule() {
        let err = PhraseBook::parse_ron(
            r#"{ "broken": [Rule(alternatives: [(weight: 1, text: "oops {")])] }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn most_specific_variant_wins() {
        let book = PhraseBook::load_from_ron(Path::new("tests/fixtures/test_phrasebook.ron")).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let math_hindi = lesson_ctx(Subject::Math, Language::Hindi);
        let text = book.expand("warm_up", &math_hindi, &mut rng).unwrap();
        assert!(text.starts_with("गिनती"), "got: {text}");

        let math_english = lesson_ctx(Subject::Math, Language::English);
        let text = book.expand("warm_up", &math_english, &mut rng).unwrap();
        assert!(text.starts_with("Count"), "got: {text}");

        let art = lesson_ctx(Subject::Art, Language::English);
        let text = book.expand("warm_up", &art, &mut rng).unwrap();
        assert!(text.contains("Nature & Seasons"), "got: {text}");
    }

    #[test]
    fn excludes_block_variant() {
        let book = PhraseBook::parse_ron(
            r#"{
                "greeting": [
                    Rule(requires: [], excludes: ["language:hindi"], alternatives: [(weight: 1, text: "Good morning")]),
                ],
            }"#,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let hindi = lesson_ctx(Subject::Evs, Language::Hindi);
        assert!(matches!(
            book.expand("greeting", &hindi, &mut rng),
            Err(PhraseError::NoMatchingVariant(_))
        ));
        assert!(!book.rules["greeting"].has_fallback());
    }

    #[test]
    fn unknown_slot_is_an_error() {
        let book = PhraseBook::parse_ron(
            r#"{ "title": [Rule(alternatives: [(weight: 1, text: "A {colour} day")])] }"#,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let ctx = lesson_ctx(Subject::Evs, Language::English);
        assert!(matches!(
            book.expand("title", &ctx, &mut rng),
            Err(PhraseError::UnknownSlot { slot, .. }) if slot == "colour"
        ));
    }

    #[test]
    fn self_reference_hits_limit() {
        let book = PhraseBook::parse_ron(
            r#"{ "echo": [Rule(alternatives: [(weight: 1, text: "again {rule:echo}")])] }"#,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let ctx = lesson_ctx(Subject::Evs, Language::English);
        assert!(matches!(
            book.expand("echo", &ctx, &mut rng),
            Err(PhraseError::RecursionLimit(_))
        ));
    }

    #[test]
    fn missing_rule_reference() {
        let book = PhraseBook::default();
        let mut rng = StdRng::seed_from_u64(1);
        let ctx = lesson_ctx(Subject::Evs, Language::English);
        assert!(matches!(
            book.expand("nope", &ctx, &mut rng),
            Err(PhraseError::RuleNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn render_slots_keeps_unknowns() {
        let ctx = lesson_ctx(Subject::Evs, Language::English);
        let t = Template::parse("{theme} for {grade}: {mystery} {rule:x}").unwrap();
        assert_eq!(
            t.render_slots(&ctx),
            "Nature & Seasons for Class 3: {mystery} {rule:x}"
        );
    }

    #[test]
    fn ron_round_trip() {
        let mut book = PhraseBook::default();
        book.rules.insert(
            "title".to_string(),
            PhraseRule {
                name: "title".to_string(),
                variants: vec![PhraseVariant {
                    requires: vec!["theme:local_heroes".to_string()],
                    excludes: vec![],
                    alternatives: vec![Alternative {
                        weight: 1,
                        template: Template::parse("Heroes of {setting}").unwrap(),
                    }],
                }],
            },
        );

        let serialized = ron::to_string(&book).unwrap();
        let deserialized: PhraseBook = ron::from_str(&serialized).unwrap();
        assert_eq!(deserialized.rules.len(), 1);
        assert_eq!(deserialized.rules["title"].variants[0].requires.len(), 1);
    }

    #[test]
    fn merge_precedence() {
        let mut base = PhraseBook::parse_ron(
            r#"{
                "shared": [Rule(alternatives: [(weight: 1, text: "base version")])],
                "base_only": [Rule(alternatives: [(weight: 1, text: "only in base")])],
            }"#,
        )
        .unwrap();
        let overrides = PhraseBook::parse_ron(
            r#"{ "shared": [Rule(alternatives: [(weight: 2, text: "override version")])] }"#,
        )
        .unwrap();

        base.merge(overrides);

        assert_eq!(base.rules["shared"].variants[0].alternatives[0].weight, 2);
        assert!(base.rules.contains_key("base_only"));
    }
}
