pub mod catalog;
pub mod ebook;
pub mod lesson;
pub mod options;
pub mod story;

/// A generator input: a flat record of closed option values.
///
/// The engine turns a selection into tags (which pick phrase variants)
/// and slots (which fill `{name}` placeholders).
pub trait Selection {
    /// Slot names this kind of input provides.
    const SLOTS: &'static [&'static str];

    /// Short name of the generator: `lesson`, `story` or `ebook`.
    fn kind(&self) -> &'static str;

    /// Selection tags, including `kind:<kind>`.
    fn tags(&self) -> Vec<String>;

    fn slots(&self) -> Vec<(&'static str, String)>;
}

/// Print- and chat-friendly renderings of generated content.
pub trait Printable {
    /// Markdown for printing or projecting.
    fn to_markdown(&self) -> String;

    /// Compact message for sharing with caregivers over chat apps.
    /// Uses `*bold*` headings and bullet points.
    fn to_share_text(&self) -> String;
}
