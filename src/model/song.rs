//! Song value type

use serde::{Deserialize, Serialize};

/// Words that introduce a featuring credit inside parentheses.
const FEATURE_MARKERS: [&str; 4] = ["ft", "featuring", "with", "feat"];

/// A track as shown on the board. Two songs are the same song when all
/// three fields match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub title: String,
    pub artist: String,
    /// Empty when the source has no artwork for the track.
    #[serde(default)]
    pub album_art: String,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album_art: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album_art: album_art.into(),
        }
    }

    /// Title without parenthesised featuring credits, e.g.
    /// `"Song (feat. Someone)"` becomes `"Song"`.
    pub fn trimmed_title(&self) -> String {
        trim_featuring(&self.title)
    }
}

/// Removes every `(...)` group that contains one of the marker words,
/// together with the whitespace in front of it.
pub fn trim_featuring(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut rest = title;

    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')').map(|i| open + i) else {
            break;
        };
        let inner = &rest[open + 1..close];
        if has_marker(inner) {
            out.push_str(rest[..open].trim_end());
        } else {
            out.push_str(&rest[..=close]);
        }
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}

fn has_marker(inner: &str) -> bool {
    inner
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| {
            FEATURE_MARKERS
                .iter()
                .any(|marker| word.eq_ignore_ascii_case(marker))
        })
}
