//! Text normalization for fetched posts.
//!
//! One pass of [`clean_text`] does, in order:
//!
//! 1. drop every `#` (the hashtag word stays),
//! 2. drop every `\n`,
//! 3. drop `http://` / `https://` URLs up to the next whitespace,
//! 4. drop every `@` (the mentioned name stays),
//! 5. drop emoji and pictograph characters (see [`EMOJI_RANGES`]),
//! 6. lowercase.
//!
//! Whitespace around removed tokens is left alone, so `"a #b c"` becomes `"a b c"` and
//! `"a https://x b"` becomes `"a  b"`.
//!
//! A single pass can produce new matches (`"htt@p://x"` only becomes a URL once the
//! `@` is gone), so passes repeat until the text stops changing. That keeps cleaning
//! idempotent.
use crate::table::{Cell, Table, TableError};
use regex::Regex;
use std::sync::LazyLock;

/// Column cleaned when the caller does not name one.
pub const DEFAULT_COLUMN: &str = "text";

const MAX_PASSES: usize = 4;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("URL regex is valid"));

/// Inclusive code point ranges treated as emoji. Several overlap; the union is what
/// matters. Note that `U+24C2..=U+1F251` together with the supplementary planes covers
/// everything from U+24C2 upward, CJK included.
pub const EMOJI_RANGES: &[(char, char)] = &[
    ('\u{1F600}', '\u{1F64F}'), // emoticons
    ('\u{1F300}', '\u{1F5FF}'), // symbols & pictographs
    ('\u{1F680}', '\u{1F6FF}'), // transport & map symbols
    ('\u{1F1E0}', '\u{1F1FF}'), // regional indicators (flags)
    ('\u{2500}', '\u{2BEF}'),
    ('\u{2702}', '\u{27B0}'), // dingbats
    ('\u{24C2}', '\u{1F251}'),
    ('\u{1F926}', '\u{1F937}'),
    ('\u{10000}', '\u{10FFFF}'),
    ('\u{2640}', '\u{2642}'),
    ('\u{2600}', '\u{2B55}'),
    ('\u{200D}', '\u{200D}'), // zero width joiner
    ('\u{23CF}', '\u{23CF}'),
    ('\u{23E9}', '\u{23E9}'),
    ('\u{231A}', '\u{231A}'),
    ('\u{FE0F}', '\u{FE0F}'), // variation selector-16
    ('\u{3030}', '\u{3030}'),
];

fn is_emoji(c: char) -> bool {
    EMOJI_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

fn normalize_once(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|&c| c != '#' && c != '\n').collect();
    let mut s = URL.replace_all(&stripped, "").into_owned();
    s.retain(|c| c != '@' && !is_emoji(c));
    s.to_lowercase()
}

/// Normalize a single post.
///
/// ```
/// use chirp_social::clean::clean_text;
///
/// assert_eq!(
///     clean_text("Check this out! https://example.com/x #cool @friend 😀"),
///     "check this out!  cool friend "
/// );
/// assert_eq!(clean_text("Line one\nLine two"), "line oneline two");
/// ```
pub fn clean_text(raw: &str) -> String {
    let mut cur = normalize_once(raw);
    for _ in 1..MAX_PASSES {
        let next = normalize_once(&cur);
        if next == cur {
            break;
        }
        cur = next;
    }
    cur
}

/// Coerce a cell to text and clean it. A missing value becomes `"none"`.
pub fn clean_cell(cell: &Cell) -> Cell {
    Cell::Text(clean_text(&cell.as_text()))
}

/// Clean every value in `column`, leaving the rest of the table as it was.
///
/// ```
/// use chirp_social::clean::{clean_column, DEFAULT_COLUMN};
/// use chirp_social::table::{Cell, Table};
///
/// let table = Table::from_column("text", ["HELLO #world"]);
/// let table = clean_column(table, DEFAULT_COLUMN).unwrap();
/// assert_eq!(table.column("text").unwrap(), vec![&Cell::from("hello world")]);
/// ```
pub fn clean_column(table: Table, column: &str) -> Result<Table, TableError> {
    let rows = table.len();
    let cleaned = table.map_column(column, clean_cell)?;
    tracing::debug!(column, rows, "clean.column");
    Ok(cleaned)
}
