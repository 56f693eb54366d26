use serde::{Deserialize, Serialize};

use super::options::{Language, StorySetting, Theme};
use super::{Printable, Selection};

/// Selections for a visual story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualStoryInput {
    pub theme: Theme,
    pub setting: StorySetting,
    pub language: Language,
}

impl Default for VisualStoryInput {
    fn default() -> Self {
        Self {
            theme: Theme::LocalHeroes,
            setting: StorySetting::Village,
            language: Language::English,
        }
    }
}

/// Story beats, in storyboard order.
pub const SCENE_BEATS: [&str; 4] = ["arrival", "discovery", "challenge", "celebration"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryScene {
    pub heading: String,
    pub visual_cue: String,
    pub narration: String,
    /// Facilitation tip for the teacher.
    pub activity_hint: String,
}

/// A generated storyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualStory {
    pub title: String,
    /// Opening line that draws learners in.
    pub hook: String,
    pub scenes: Vec<StoryScene>,
    /// Closing "reflect & calm" prompt.
    pub reflection: String,
}

impl Selection for VisualStoryInput {
    const SLOTS: &'static [&'static str] = &["theme", "setting", "language"];

    fn kind(&self) -> &'static str {
        "story"
    }

    fn tags(&self) -> Vec<String> {
        vec![
            "kind:story".to_string(),
            self.theme.tag(),
            self.setting.tag(),
            self.language.tag(),
        ]
    }

    fn slots(&self) -> Vec<(&'static str, String)> {
        vec![
            ("theme", self.theme.label().to_string()),
            ("setting", self.setting.label().to_string()),
            ("language", self.language.label().to_string()),
        ]
    }
}

impl Printable for VisualStory {
    fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n_{}_\n", self.title, self.hook);
        for (i, scene) in self.scenes.iter().enumerate() {
            out.push_str(&format!(
                "\n## {}. {}\n\n**Visual cue:** {}\n\n{}\n\n_Facilitation tip:_ {}\n",
                i + 1,
                scene.heading,
                scene.visual_cue,
                scene.narration,
                scene.activity_hint
            ));
        }
        out.push_str(&format!("\n## Reflect & calm\n\n{}\n", self.reflection));
        out
    }

    fn to_share_text(&self) -> String {
        let mut out = format!("*{}*\n{}\n", self.title, self.hook);
        for scene in &self.scenes {
            out.push_str(&format!("\n*{}*\n{}\n", scene.heading, scene.narration));
        }
        out.push_str(&format!("\n{}\n", self.reflection));
        out
    }
}
