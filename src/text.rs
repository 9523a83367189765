const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "vs", "cf", "no", "nos", "art", "para", "paras", "sec", "fig", "approx",
    "incl", "z.b", "bzw", "vgl", "abs", "nr", "ggf", "inkl", "ca", "u.a", "d.h", "s", "ff",
];

pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub fn word_count(input: &str) -> usize {
    input.split_whitespace().count()
}

/// Returns at most `max_chars` characters of `text` starting at byte offset `start`.
pub fn char_window(text: &str, start: usize, max_chars: usize) -> &str {
    let Some(tail) = text.get(start..) else {
        return "";
    };

    match tail.char_indices().nth(max_chars) {
        Some((end, _)) => &tail[..end],
        None => tail,
    }
}

/// Splits on `.`, `!` or `?` followed by whitespace and an uppercase letter.
///
/// Umlauts count as uppercase letters. Abbreviations are not recognised, so
/// "e.g. The" splits.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::<&str>::new();
    let mut start = 0usize;

    for (index, character) in text.char_indices() {
        if index < start || !is_terminator(character) {
            continue;
        }

        let end = index + character.len_utf8();
        let Some(next_start) = next_sentence_start(text, end) else {
            continue;
        };

        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = next_start;
    }

    let remainder = text[start..].trim();
    if !remainder.is_empty() {
        sentences.push(remainder);
    }

    sentences
}

/// Returns the leading sentence of `text`, skipping full stops that belong to
/// abbreviations, initials, decimals or ellipses.
pub fn first_sentence(text: &str) -> &str {
    let trimmed = text.trim();

    for (index, character) in trimmed.char_indices() {
        if !is_terminator(character) {
            continue;
        }

        let end = index + character.len_utf8();
        if next_sentence_start(trimmed, end).is_none() {
            continue;
        }

        if character == '.' && ends_with_abbreviation(&trimmed[..index]) {
            continue;
        }

        return &trimmed[..end];
    }

    trimmed
}

fn is_terminator(character: char) -> bool {
    matches!(character, '.' | '!' | '?')
}

fn next_sentence_start(text: &str, end: usize) -> Option<usize> {
    let rest = &text[end..];
    let first = rest.chars().next()?;
    if !first.is_whitespace() {
        return None;
    }

    let trimmed = rest.trim_start();
    let next = trimmed.chars().next()?;
    if !next.is_uppercase() {
        return None;
    }

    Some(text.len() - trimmed.len())
}

fn ends_with_abbreviation(prefix: &str) -> bool {
    let Some(token) = prefix.split_whitespace().last() else {
        return false;
    };
    let token = token
        .trim_start_matches(|character: char| matches!(character, '(' | '[' | '"' | '„'))
        .to_lowercase();

    if token.chars().count() == 1 && token.chars().all(char::is_alphabetic) {
        return true;
    }

    ABBREVIATIONS.contains(&token.as_str())
}
