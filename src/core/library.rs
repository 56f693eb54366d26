/// Built-in content packs, compiled into the binary.
use tracing::debug;

use crate::core::phrasebook::{PhraseBook, PhraseError};

pub const SHARED: &str = include_str!("../../content/shared.ron");
pub const LESSON_SPARK: &str = include_str!("../../content/lesson_spark.ron");
pub const VISUAL_STORY: &str = include_str!("../../content/visual_story.ron");
pub const EBOOK_PACK: &str = include_str!("../../content/ebook_pack.ron");

/// Built-in packs in merge order.
pub const PACKS: [(&str, &str); 4] = [
    ("shared", SHARED),
    ("lesson_spark", LESSON_SPARK),
    ("visual_story", VISUAL_STORY),
    ("ebook_pack", EBOOK_PACK),
];

/// Parse and merge every built-in pack.
pub fn builtin_phrasebook() -> Result<PhraseBook, PhraseError> {
    let mut book = PhraseBook::default();
    for (name, source) in PACKS {
        let pack = PhraseBook::parse_ron(source)?;
        debug!(pack = name, rules = pack.rules.len(), "loaded built-in pack");
        book.merge(pack);
    }
    Ok(book)
}
