//! Filename hygiene for generated certificates.

/// Characters Windows refuses in file names. The same set is rejected on
/// every OS so a batch produces identical names everywhere.
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Participant names are truncated to this many characters in file names.
const MAX_NAME_CHARS: usize = 50;

/// Replaces each reserved character with a single underscore.
///
/// Total function: any input maps to some (possibly empty) token. Length
/// limiting is the caller's concern.
pub fn sanitize_component(text: &str) -> String {
    text.chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect()
}

/// Builds the deterministic output file name for one participant.
///
/// Both parts are sanitized; the name part is additionally truncated to
/// keep paths short enough for every filesystem in play.
pub fn certificate_file_name(id: &str, name: &str, extension: &str) -> String {
    let id_safe = sanitize_component(id);
    let name_safe = sanitize_component(name);
    let name_safe = truncate_chars(&name_safe, MAX_NAME_CHARS);
    format!("Certificado_{id_safe}_{name_safe}.{extension}")
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
