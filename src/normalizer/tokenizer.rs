//! Tweet-aware tokenizer.
//!
//! Splits text into word and symbol tokens while keeping Twitter-specific
//! shapes (handles, hashtags) intact. Optionally folds case, shortens
//! exaggerated character runs and drops `@handle` mentions.

use regex::Regex;
use std::sync::OnceLock;

static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
static EMOTICON_REGEX: OnceLock<Regex> = OnceLock::new();

/// Phone numbers: optional country and area code, then 3 + 4 digits.
const PHONE_PATTERN: &str = r"(?:(?:\+?[01][ *\-.)]*)?(?:\(?\d{3}[ *\-.)]*)?\d{3}[ *\-.)]*\d{4})";

/// Western emoticons in both directions, plus hearts.
const EMOTICON_PATTERN: &str = r"(?i:[<>]?[;:=8][\-o*']?[)\](\[dDpP/:}{@|\\]|[)\](\[dDpP/:}{@|\\][\-o*']?[;:=8][<>]?|</?3)";

/// Longest run of a repeated character kept by length reduction.
const MAX_RUN: usize = 3;

/// Longest handle Twitter allows; a longer run keeps its tail as a word.
const MAX_HANDLE_LEN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweetTokenizer {
    pub preserve_case: bool,
    pub reduce_len: bool,
    pub strip_handles: bool,
}

impl Default for TweetTokenizer {
    fn default() -> Self {
        Self {
            preserve_case: true,
            reduce_len: false,
            strip_handles: false,
        }
    }
}

impl TweetTokenizer {
    /// Settings used by the normalization pipeline: lowercase, reduce
    /// lengthening, strip handles.
    pub fn for_normalization() -> Self {
        Self {
            preserve_case: false,
            reduce_len: true,
            strip_handles: true,
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut text = text.to_string();
        if self.strip_handles {
            text = remove_handles(&text);
        }
        if self.reduce_len {
            text = reduce_lengthening(&text);
        }

        let regex = TOKEN_REGEX.get_or_init(|| {
            let alternatives = [
                PHONE_PATTERN,
                EMOTICON_PATTERN,
                r"@[\w_]+",
                r"#+[\w_]+",
                r"[^\W\d_](?:[^\W\d_]|['\-_])+[^\W\d_]",
                r"[+\-]?\d+[,/.:\-]\d+[+\-]?",
                r"[\w_]+",
                r"\.(?:\s*\.)+",
                r"\S",
            ];
            Regex::new(&alternatives.join("|")).unwrap()
        });

        regex
            .find_iter(&text)
            .map(|m| {
                let token = m.as_str();
                // Emoticons keep their case: ":D" and ":d" differ.
                if self.preserve_case || is_emoticon(token) {
                    token.to_string()
                } else {
                    token.to_lowercase()
                }
            })
            .collect()
    }
}

/// Whether `token` contains an emoticon anywhere.
fn is_emoticon(token: &str) -> bool {
    EMOTICON_REGEX
        .get_or_init(|| Regex::new(EMOTICON_PATTERN).unwrap())
        .is_match(token)
}

/// Collapse any run of the same character longer than three down to three,
/// e.g. "waaaaayyyy" becomes "waaayyy".
pub fn reduce_lengthening(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    let mut run = 0;

    for c in text.chars() {
        if Some(c) == previous && c != '\n' {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }
        if run <= MAX_RUN {
            out.push(c);
        }
    }

    out
}

fn is_handle_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Characters that, directly before an `@`, mean it is not a mention
/// (e-mail addresses, `!@#` noise and so on).
fn blocks_handle(c: char) -> bool {
    is_handle_char(c) || matches!(c, '!' | '@' | '#' | '$' | '%' | '&' | '*')
}

/// Replace `@handle` mentions with a single space.
///
/// A handle is 1-15 ASCII word characters after an `@` that is not glued to
/// a preceding word. A run directly followed by another `@` is left alone.
pub fn remove_handles(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '@' && (i == 0 || !blocks_handle(chars[i - 1])) {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() && is_handle_char(chars[end]) {
                end += 1;
            }
            let run = end - start;
            let followed_by_at = chars.get(end) == Some(&'@');

            let matched = if run > MAX_HANDLE_LEN {
                Some(MAX_HANDLE_LEN)
            } else if run > 0 && !followed_by_at {
                Some(run)
            } else {
                None
            };

            if let Some(len) = matched {
                out.push(' ');
                i = start + len;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out
}
