//! Key pattern tokens.
//!
//! A pattern position is either a literal key name (already in canonical
//! bracket notation, e.g. `x`, `<esc>`, `<c-r>`) or one of the wildcard kinds.
//! Typed keys are plain strings; a typed string that happens to spell a
//! wildcard (`<any>`) is treated as that wildcard so matching stays symmetric.

use smallvec::SmallVec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wildcard {
    /// Matches anything.
    Any,
    /// A single ASCII digit.
    Number,
    /// A single ASCII letter.
    Alpha,
    /// Anything that is not a control key.
    Character,
    /// The configured leader key.
    Leader,
}

impl Wildcard {
    pub const fn notation(self) -> &'static str {
        match self {
            Wildcard::Any => "<any>",
            Wildcard::Number => "<number>",
            Wildcard::Alpha => "<alpha>",
            Wildcard::Character => "<character>",
            Wildcard::Leader => "<leader>",
        }
    }

    /// Classify a key name. Wildcard names are matched case-insensitively.
    pub fn classify(key: &str) -> Option<Wildcard> {
        if !(key.starts_with('<') && key.ends_with('>')) || key.len() < 5 {
            return None;
        }
        [
            Wildcard::Any,
            Wildcard::Number,
            Wildcard::Alpha,
            Wildcard::Character,
            Wildcard::Leader,
        ]
        .into_iter()
        .find(|w| w.notation().eq_ignore_ascii_case(key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Literal(String),
    Wildcard(Wildcard),
}

impl Token {
    pub fn parse(key: &str) -> Token {
        match Wildcard::classify(key) {
            Some(w) => Token::Wildcard(w),
            None => Token::Literal(key.to_string()),
        }
    }

    pub fn literal(key: impl Into<String>) -> Token {
        Token::Literal(key.into())
    }

    /// Borrowed view used by the matcher.
    pub fn view(&self) -> KeyView<'_> {
        match self {
            Token::Literal(s) => KeyView {
                text: s,
                wildcard: None,
            },
            Token::Wildcard(w) => KeyView {
                text: w.notation(),
                wildcard: Some(*w),
            },
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Token::Literal(s) => s,
            Token::Wildcard(w) => w.notation(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Token {
    fn from(key: &str) -> Self {
        Token::parse(key)
    }
}

/// One side of a positional comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyView<'a> {
    pub text: &'a str,
    pub wildcard: Option<Wildcard>,
}

impl<'a> KeyView<'a> {
    pub fn of(key: &'a str) -> Self {
        Self {
            text: key,
            wildcard: Wildcard::classify(key),
        }
    }
}

/// One key sequence; most Vim commands are one to three keys long.
pub type KeyPattern = SmallVec<[Token; 4]>;

pub fn pattern<I, S>(keys: I) -> KeyPattern
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter().map(|k| Token::parse(k.as_ref())).collect()
}
