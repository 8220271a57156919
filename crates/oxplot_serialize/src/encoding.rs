//! Output encodings for serialized documents.
use std::{fmt::Write as _, str::FromStr};

use crate::error::UnknownEncoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// How serialized text is turned into bytes for a sink
pub enum Encoding {
    /// UTF-8 bytes
    #[default]
    Utf8,
    /// ASCII bytes, with any other character written as a numeric character reference
    UsAscii,
    /// Text for character sinks; written as UTF-8 when a byte sink is used
    Unicode,
}

impl Encoding {
    /// The canonical label of the encoding
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::UsAscii => "us-ascii",
            Self::Unicode => "none",
        }
    }

    /// Rewrites serialized markup so that it only contains characters of this encoding
    pub fn apply(self, markup: String) -> String {
        match self {
            Self::Utf8 | Self::Unicode => markup,
            Self::UsAscii => escape_non_ascii(markup),
        }
    }

    /// Converts serialized markup into the bytes of this encoding
    pub fn encode(self, markup: String) -> Vec<u8> {
        self.apply(markup).into_bytes()
    }
}

fn escape_non_ascii(markup: String) -> String {
    if markup.is_ascii() {
        return markup;
    }
    let mut result = String::with_capacity(markup.len());
    for char in markup.chars() {
        if char.is_ascii() {
            result.push(char);
        } else {
            // Writing to a `String` cannot fail
            let _ = write!(result, "&#{};", u32::from(char));
        }
    }
    result
}

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "us-ascii" | "ascii" => Ok(Self::UsAscii),
            "none" | "unicode" => Ok(Self::Unicode),
            _ => Err(UnknownEncoding(s.to_string())),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[test]
fn parse_labels() {
    assert_eq!("UTF-8".parse(), Ok(Encoding::Utf8));
    assert_eq!("ascii".parse(), Ok(Encoding::UsAscii));
    assert_eq!("none".parse(), Ok(Encoding::Unicode));
    assert_eq!(
        "latin-1".parse::<Encoding>(),
        Err(UnknownEncoding(String::from("latin-1")))
    );
}

#[test]
fn ascii_uses_character_references() {
    assert_eq!(
        Encoding::UsAscii.encode(String::from("<text>π≈3</text>")),
        b"<text>&#960;&#8776;3</text>".to_vec()
    );
    assert_eq!(
        Encoding::Utf8.encode(String::from("π")),
        "π".as_bytes().to_vec()
    );
}
