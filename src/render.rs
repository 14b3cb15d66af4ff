//! Placeholder substitution inside a loaded deck.

use std::path::Path;

use log::debug;

use certmill_deck::{DeckError, Presentation};

/// Token replaced by the participant's name.
pub const NAME_TOKEN: &str = "{NOME}";
/// Token replaced by the certificate number.
pub const ID_TOKEN: &str = "{NUMERO}";

/// Ordered token-to-value mapping.
///
/// Substitution is a single left-to-right pass over the text. Once a token
/// is replaced, scanning resumes after the inserted value, so values that
/// themselves contain a token stay literal. Tokens are tried in insertion
/// order at each position.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((token.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `text` contains at least one mapped token.
    pub fn matches(&self, text: &str) -> bool {
        self.entries
            .iter()
            .any(|(token, _)| !token.is_empty() && text.contains(token.as_str()))
    }

    /// Replaces every token occurrence in `text`.
    pub fn apply(&self, text: &str) -> String {
        if self.entries.is_empty() || text.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        'scan: while !rest.is_empty() {
            for (token, value) in &self.entries {
                if token.is_empty() {
                    continue;
                }
                if let Some(tail) = rest.strip_prefix(token.as_str()) {
                    out.push_str(value);
                    rest = tail;
                    continue 'scan;
                }
            }
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
        out
    }
}

/// Substitutes placeholders in every text run of every slide.
///
/// Only runs that contain a token are rewritten; everything else keeps its
/// original bytes, formatting included. Returns the number of runs changed.
///
/// A token split across two runs (an artifact of in-editor formatting) is
/// not recognized; the template must keep each token inside a single run.
pub fn fill_placeholders(deck: &mut Presentation, map: &PlaceholderMap) -> usize {
    if map.is_empty() {
        return 0;
    }
    let mut replaced = 0;
    for mut slide in deck.slides_mut() {
        let mut rewritten = 0;
        for mut shape in slide.shapes() {
            for mut paragraph in shape.paragraphs() {
                for mut run in paragraph.runs() {
                    let text = run.text();
                    if map.matches(&text) {
                        run.set_text(&map.apply(&text));
                        rewritten += 1;
                    }
                }
            }
        }
        if rewritten > 0 {
            debug!("[RENDER] {rewritten} runs rewritten in {}", slide.name());
        }
        replaced += rewritten;
    }
    replaced
}

/// Loads the template fresh from disk and fills every placeholder.
///
/// The reload is deliberate: substituted values must never leak from one
/// record into the next, so a parsed template is never reused.
pub fn render_template(template: &Path, map: &PlaceholderMap) -> Result<Presentation, DeckError> {
    let mut deck = Presentation::open(template)?;
    fill_placeholders(&mut deck, map);
    Ok(deck)
}
