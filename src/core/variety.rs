/// Variety helpers: stable seeding, weighted choice and text tidying.
use rand::Rng;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

use crate::core::context::SelectionContext;

/// Derive the rng seed for one generated field.
///
/// Every field gets its own seed, so editing one rule never changes the
/// wording of another field for the same selection.
pub fn field_seed(engine_seed: u64, variant: u64, ctx: &SelectionContext, field: &str) -> u64 {
    let mut hasher = FxHasher::default();
    engine_seed.hash(&mut hasher);
    variant.hash(&mut hasher);
    ctx.kind().hash(&mut hasher);
    for tag in ctx.tags() {
        tag.hash(&mut hasher);
    }
    field.hash(&mut hasher);
    hasher.finish()
}

/// Pick an item by weight. Zero-weight items are never chosen; returns
/// `None` when the total weight is zero.
pub fn pick_weighted<'a, T, R, F>(items: &'a [T], weight: F, rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> u32,
{
    let total: u64 = items.iter().map(|i| weight(i) as u64).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for item in items {
        let w = weight(item) as u64;
        if roll < w {
            return Some(item);
        }
        roll -= w;
    }
    None
}

/// Collapse whitespace runs, drop spaces before punctuation and capitalise
/// the first letter.
pub fn tidy(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    for ch in collapsed.chars() {
        if matches!(ch, '.' | ',' | '!' | '?' | ':' | ';') && out.ends_with(' ') {
            out.pop();
        }
        out.push(ch);
    }

    let mut chars = out.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => out,
    }
}
