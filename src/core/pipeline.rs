/// The content pipeline: Selection → lesson spark, visual story or ebook pack.
///
/// Wires together content loading, linting, variant selection, weighted
/// phrase expansion and tidying. Generation itself is total: a field whose
/// expansion fails is logged and filled from a generic fallback template.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::context::SelectionContext;
use crate::core::library;
use crate::core::lint::{lint, LintReport, LintScope};
use crate::core::phrasebook::{PhraseBook, PhraseError, Template};
use crate::core::variety;
use crate::schema::ebook::{Chapter, Ebook, EbookInput};
use crate::schema::lesson::{LessonPlan, LessonPlanInput};
use crate::schema::options::all_tags;
use crate::schema::story::{StoryScene, VisualStory, VisualStoryInput, SCENE_BEATS};
use crate::schema::Selection;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("phrase book error: {0}")]
    Phrase(#[from] PhraseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("content failed lint with {} error(s): {}", .0.len(), .0.join("; "))]
    InvalidContent(Vec<String>),
}

/// Every chapter beat an ebook can use, across reading levels.
const EBOOK_BEATS: [&str; 4] = ["spark", "journey", "puzzle", "home"];

/// Slots every kind of selection provides; the only ones shared rules may use.
const SHARED_SLOTS: [&str; 2] = ["theme", "language"];

/// Rule names the generators expand directly.
pub fn required_rules() -> Vec<String> {
    let mut rules: Vec<String> = [
        "lesson_title",
        "lesson_overview",
        "lesson_goal_knowledge",
        "lesson_goal_skill",
        "lesson_goal_values",
        "lesson_warm_up",
        "lesson_main_activity",
        "lesson_assessment",
        "lesson_take_home",
        "story_title",
        "story_hook",
        "story_reflection",
        "ebook_title",
        "ebook_description",
        "ebook_printable_activity",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    for beat in SCENE_BEATS {
        for part in ["heading", "cue", "narration", "hint"] {
            rules.push(format!("story_{beat}_{part}"));
        }
    }
    for beat in EBOOK_BEATS {
        for part in ["heading", "summary", "extension"] {
            rules.push(format!("ebook_{beat}_{part}"));
        }
    }
    rules
}

/// The checks every phrase book must pass before an engine is built.
pub fn lint_scope() -> LintScope {
    let owned = |slots: &[&str]| slots.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    LintScope {
        required_rules: required_rules(),
        prefixed_slots: vec![
            ("lesson_".to_string(), owned(LessonPlanInput::SLOTS)),
            ("story_".to_string(), owned(VisualStoryInput::SLOTS)),
            ("ebook_".to_string(), owned(EbookInput::SLOTS)),
        ],
        shared_slots: owned(&SHARED_SLOTS),
        known_tags: all_tags(),
    }
}

/// Lint a content pack the way the engine builder would see it.
///
/// An overlay pack is merged over the built-in content first, so it only
/// needs to define the rules it replaces. A standalone pack must define
/// every rule the generators need on its own.
pub fn lint_pack(pack: PhraseBook, standalone: bool) -> Result<LintReport, EngineError> {
    let mut book = if standalone {
        PhraseBook::default()
    } else {
        library::builtin_phrasebook()?
    };
    book.merge(pack);
    Ok(lint(&book, &lint_scope()))
}

/// The content engine. Built via `ContentEngine::builder()`.
///
/// Immutable once built; every generator takes `&self`.
#[derive(Debug, Clone)]
pub struct ContentEngine {
    phrasebook: PhraseBook,
    seed: u64,
}

/// Builder for constructing a `ContentEngine`.
pub struct ContentEngineBuilder {
    builtin: bool,
    content_dir: Option<PathBuf>,
    seed: u64,
    /// Directly provided phrases, merged last.
    phrasebook: Option<PhraseBook>,
}

impl ContentEngine {
    pub fn builder() -> ContentEngineBuilder {
        ContentEngineBuilder {
            builtin: true,
            content_dir: None,
            seed: 0,
            phrasebook: None,
        }
    }

    /// The built-in content with seed 0.
    pub fn builtin() -> Result<ContentEngine, EngineError> {
        Self::builder().build()
    }

    /// An engine with no phrases at all: every field renders its generic
    /// fallback. Only used when the built-in content cannot be loaded.
    pub(crate) fn fallback_only() -> ContentEngine {
        ContentEngine {
            phrasebook: PhraseBook::default(),
            seed: 0,
        }
    }

    pub fn phrasebook(&self) -> &PhraseBook {
        &self.phrasebook
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a lesson spark.
    pub fn lesson_plan(&self, input: &LessonPlanInput) -> LessonPlan {
        self.compose_lesson(input, 0)
    }

    /// Generate a visual story.
    pub fn visual_story(&self, input: &VisualStoryInput) -> VisualStory {
        self.compose_story(input, 0)
    }

    /// Generate an ebook pack.
    pub fn ebook(&self, input: &EbookInput) -> Ebook {
        self.compose_ebook(input, 0)
    }

    /// Generate `count` lesson sparks for the same selection. The first
    /// equals `lesson_plan(input)`.
    pub fn lesson_plan_variants(&self, input: &LessonPlanInput, count: usize) -> Vec<LessonPlan> {
        (0..count as u64)
            .map(|v| self.compose_lesson(input, v))
            .collect()
    }

    pub fn visual_story_variants(&self, input: &VisualStoryInput, count: usize) -> Vec<VisualStory> {
        (0..count as u64)
            .map(|v| self.compose_story(input, v))
            .collect()
    }

    pub fn ebook_variants(&self, input: &EbookInput, count: usize) -> Vec<Ebook> {
        (0..count as u64)
            .map(|v| self.compose_ebook(input, v))
            .collect()
    }

    fn compose_lesson(&self, input: &LessonPlanInput, variant: u64) -> LessonPlan {
        debug!(?input, variant, "composing lesson spark");
        let c = Composer::new(self, input, variant);
        LessonPlan {
            title: c.field("lesson_title", "{theme} lesson spark for {grade}"),
            overview: c.field(
                "lesson_overview",
                "A {duration_minutes} minute {subject} session on {theme} for {grade}.",
            ),
            learning_goals: vec![
                c.field(
                    "lesson_goal_knowledge",
                    "Describe one new idea about {theme} in {subject}.",
                ),
                c.field(
                    "lesson_goal_skill",
                    "Practise a {subject} skill through a hands-on {theme} task.",
                ),
                c.field(
                    "lesson_goal_values",
                    "Share and listen respectfully while working in small groups.",
                ),
            ],
            warm_up: c.field(
                "lesson_warm_up",
                "{warm_up_minutes} minutes: open with a song or picture talk about {theme}.",
            ),
            main_activity: c.field(
                "lesson_main_activity",
                "{main_minutes} minutes: learners explore {theme} in small groups and present what they find.",
            ),
            assessment: c.field(
                "lesson_assessment",
                "{closing_minutes} minutes: exit ticket with one thing learned and one question.",
            ),
            take_home: c.field(
                "lesson_take_home",
                "Talk with family about {theme} and bring one idea to share tomorrow.",
            ),
        }
    }

    fn compose_story(&self, input: &VisualStoryInput, variant: u64) -> VisualStory {
        debug!(?input, variant, "composing visual story");
        let c = Composer::new(self, input, variant);
        let scenes = SCENE_BEATS
            .iter()
            .map(|beat| StoryScene {
                heading: c.field(&format!("story_{beat}_heading"), "A {theme} moment"),
                visual_cue: c.field(
                    &format!("story_{beat}_cue"),
                    "Show a picture of the {setting} linked to {theme}.",
                ),
                narration: c.field(
                    &format!("story_{beat}_narration"),
                    "Our friends in the {setting} take the next step in their {theme} story.",
                ),
                activity_hint: c.field(
                    &format!("story_{beat}_hint"),
                    "Invite learners to act out this scene with gestures.",
                ),
            })
            .collect();

        VisualStory {
            title: c.field("story_title", "A {theme} story from the {setting}"),
            hook: c.field(
                "story_hook",
                "Something surprising is about to happen in the {setting}.",
            ),
            scenes,
            reflection: c.field(
                "story_reflection",
                "Close your eyes, breathe slowly and remember one kind act from the story.",
            ),
        }
    }

    fn compose_ebook(&self, input: &EbookInput, variant: u64) -> Ebook {
        debug!(?input, variant, "composing ebook pack");
        let c = Composer::new(self, input, variant);
        let chapters = input
            .chapter_beats()
            .iter()
            .map(|beat| Chapter {
                heading: c.field(&format!("ebook_{beat}_heading"), "{theme} chapter"),
                summary: c.field(
                    &format!("ebook_{beat}_summary"),
                    "The story continues with a new {theme} adventure.",
                ),
                classroom_extension: c.field(
                    &format!("ebook_{beat}_extension"),
                    "Discuss the chapter in pairs and practise {focus_skill}.",
                ),
            })
            .collect();

        Ebook {
            title: c.field("ebook_title", "{theme} storybook for {grade}"),
            description: c.field(
                "ebook_description",
                "A {theme} storybook for {grade} readers that builds {focus_skill}.",
            ),
            chapters,
            printable_activity: c.field(
                "ebook_printable_activity",
                "Draw and label your favourite {theme} moment.",
            ),
        }
    }
}

/// Renders the fields of one generated record.
struct Composer<'e> {
    engine: &'e ContentEngine,
    ctx: SelectionContext,
    variant: u64,
}

impl<'e> Composer<'e> {
    fn new<S: Selection>(engine: &'e ContentEngine, selection: &S, variant: u64) -> Self {
        Self {
            engine,
            ctx: SelectionContext::from_selection(selection),
            variant,
        }
    }

    fn field(&self, rule: &str, fallback: &str) -> String {
        let seed = variety::field_seed(self.engine.seed, self.variant, &self.ctx, rule);
        let mut rng = StdRng::seed_from_u64(seed);
        match self.engine.phrasebook.expand(rule, &self.ctx, &mut rng) {
            Ok(text) => {
                let text = variety::tidy(&text);
                if text.is_empty() {
                    warn!(rule, "phrase expanded to empty text, using fallback");
                    self.fallback(fallback)
                } else {
                    text
                }
            }
            Err(e) => {
                warn!(rule, error = %e, "phrase expansion failed, using fallback");
                self.fallback(fallback)
            }
        }
    }

    fn fallback(&self, template: &str) -> String {
        let text = match Template::parse(template) {
            Ok(t) => t.render_slots(&self.ctx),
            Err(_) => template.to_string(),
        };
        variety::tidy(&text)
    }
}

impl ContentEngineBuilder {
    /// Include the built-in content packs (on by default).
    pub fn builtin(mut self, enabled: bool) -> Self {
        self.builtin = enabled;
        self
    }

    /// Merge every `.ron` pack in `path` over the built-in content, in file
    /// name order.
    pub fn content_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.content_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Provide phrases directly (for testing without files).
    pub fn with_phrasebook(mut self, phrasebook: PhraseBook) -> Self {
        self.phrasebook = Some(phrasebook);
        self
    }

    pub fn build(self) -> Result<ContentEngine, EngineError> {
        let mut phrasebook = if self.builtin {
            library::builtin_phrasebook()?
        } else {
            PhraseBook::default()
        };

        if let Some(ref dir) = self.content_dir {
            load_ron_files_from_dir(dir, |path| {
                debug!(path = %path.display(), "loading content pack");
                phrasebook.merge(PhraseBook::load_from_ron(path)?);
                Ok(())
            })?;
        }

        if let Some(extra) = self.phrasebook {
            phrasebook.merge(extra);
        }

        let report = lint(&phrasebook, &lint_scope());
        for warning in &report.warnings {
            debug!(%warning, "content lint warning");
        }
        if !report.is_clean() {
            return Err(EngineError::InvalidContent(report.errors));
        }

        debug!(rules = phrasebook.rules.len(), seed = self.seed, "content engine ready");
        Ok(ContentEngine {
            phrasebook,
            seed: self.seed,
        })
    }
}

/// Load all .ron files from a directory in file name order, calling
/// `loader` for each.
fn load_ron_files_from_dir<F>(dir: &Path, mut loader: F) -> Result<(), EngineError>
where
    F: FnMut(&Path) -> Result<(), EngineError>,
{
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in paths {
        loader(&path)?;
    }
    Ok(())
}
