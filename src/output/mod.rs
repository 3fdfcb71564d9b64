// Output formatting: terminal display and exported artifacts.

pub mod export;
pub mod terminal;

/// Fit free text on one terminal line: collapse whitespace runs (overviews
/// often contain line breaks) and cut at `max_chars` characters, appending
/// "..." when something was dropped.
///
/// Counts chars rather than bytes, so titles like "Déjà Vu" never split
/// mid-character.
pub fn clip_text(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        None => flat,
        Some((cut, _)) => format!("{}...", flat[..cut].trim_end()),
    }
}
