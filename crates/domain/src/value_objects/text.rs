//! Plain-text helpers shared by stories, nodes, speech and style analysis.
//!
//! Story and node content arrives as rich text (HTML produced by the editor).
//! Everything that counts or measures prose works on the stripped form.

use std::sync::LazyLock;

use regex_lite::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static BLOCK_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p>|<br\s*/?>|</h[1-6]>|</blockquote>").expect("valid regex"));
static BLANK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Remove markup tags and decode the handful of entities the editor emits.
pub fn strip_markup(content: &str) -> String {
    let without_tags = TAG_RE.replace_all(content, " ");
    without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Count whitespace-delimited tokens after stripping markup.
pub fn word_count(content: &str) -> u32 {
    strip_markup(content).split_whitespace().count() as u32
}

/// Split rich text into plain-text paragraphs.
///
/// Block-closing tags and blank lines both end a paragraph.
pub fn paragraphs(content: &str) -> Vec<String> {
    let with_breaks = BLOCK_BREAK_RE.replace_all(content, "\n\n");
    let plain = strip_markup(&with_breaks);
    BLANK_LINE_RE
        .split(&plain)
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

/// Truncate to at most `max_chars` characters (not bytes).
///
/// Returns the input unchanged when it already fits.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Split text into chunks of at most `max_chars` characters for narration.
///
/// Breaks on sentence boundaries first; a sentence longer than `max_chars`
/// is broken on word boundaries, and a single word longer than `max_chars`
/// is hard-split.
pub fn chunk_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        for piece in split_oversized(&sentence, max_chars) {
            let needed = if current.is_empty() {
                piece.chars().count()
            } else {
                current.chars().count() + 1 + piece.chars().count()
            };

            if needed > max_chars && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split prose into sentences, keeping terminal punctuation attached.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |next| next.is_whitespace());
            if at_boundary {
                let sentence = current.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                current.clear();
            }
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

fn split_oversized(sentence: &str, max_chars: usize) -> Vec<String> {
    if sentence.chars().count() <= max_chars {
        return vec![sentence.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for word in sentence.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            for part in chars.chunks(max_chars) {
                pieces.push(part.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current.chars().count() + 1 + word_len
        };
        if needed > max_chars {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
