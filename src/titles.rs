//! Best-effort title/year extraction from filename-like strings.
//!
//! Handles the common release-name shape: separators folded to spaces, the
//! title read up to the first standalone year or quality token. This is the
//! "smart match" collaborator for the lookup engine; anything it cannot
//! place simply stays part of the name.

use std::sync::OnceLock;

use regex::Regex;

/// Result of parsing a free-text guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub name: String,
    pub year: Option<i32>,
}

/// Tokens that terminate the title portion of a release name.
const QUALITY_TOKENS: &[&str] = &[
    "480p", "576p", "720p", "1080p", "2160p", "4k", "bluray", "bdrip", "brrip", "dvdrip", "dvd",
    "webrip", "webdl", "web-dl", "hdtv", "hdrip", "cam", "ts", "x264", "x265", "h264", "h265",
    "hevc", "xvid", "divx", "proper", "repack", "limited", "unrated", "extended", "remastered",
];

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(19|20)\d{2}$").expect("valid year regex"))
}

/// Parse a filename-like string into a title and optional year.
///
/// A four-digit year is only treated as a year when it is not the first
/// token, so titles like "2012" survive. Quality tokens and anything after
/// them are discarded.
pub fn parse_title(raw: &str) -> ParsedTitle {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '.' | '_' | '(' | ')' | '[' | ']' => ' ',
            c => c,
        })
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    let mut name_end = tokens.len();
    let mut year = None;
    for (i, token) in tokens.iter().enumerate() {
        let lower = token.to_ascii_lowercase();
        // Release group tags ride on the last token ("x264-GROUP")
        let bare = lower.split('-').next().unwrap_or(&lower);
        if QUALITY_TOKENS.contains(&bare) {
            name_end = i;
            break;
        }
        if i > 0 && year_re().is_match(token) {
            year = token.parse().ok();
            name_end = i;
            break;
        }
    }

    ParsedTitle {
        name: tokens[..name_end].join(" "),
        year,
    }
}
