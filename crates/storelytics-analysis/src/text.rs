//! Deterministic cleaning and tokenization of free review text.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use storelytics_core::RawReview;

use crate::types::round_to;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("valid url regex"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w.-]+@[\w.-]+\.\w+\b").expect("valid email regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[@#]\w+").expect("valid mention regex"));
static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\p{Extended_Pictographic}\x{1F1E6}-\x{1F1FF}\x{1F3FB}-\x{1F3FF}\x{FE0F}\x{200D}\x{20E3}]+",
    )
    .expect("valid emoji regex")
});
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z][a-zA-Z']{2,}").expect("valid token regex"));

/// Windows-1252 code points in `0x80..=0x9F` that differ from Latin-1.
const CP1252_HIGH: &[(char, u8)] = &[
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Cleans review text.
///
/// Stages, in order: encoding repair, entity decoding, markup stripping,
/// URL, e-mail and `@mention`/`#hashtag` removal, optional emoji removal,
/// optional lowercasing, whitespace collapse. Removed spans become a space so
/// neighbouring words never fuse. Empty input yields an empty string.
///
/// Entity decoding and markup stripping repeat until the text stops
/// changing, so `&amp;lt;b&amp;gt;` leaves no tag behind. Each pass that
/// changes the text makes it shorter.
#[must_use]
pub fn clean_text(raw: &str, keep_emojis: bool, lowercase: bool) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut visible = repair_text(raw);
    loop {
        let next = strip_markup(&visible);
        if next == visible {
            break;
        }
        visible = next;
    }

    let t = URL_RE.replace_all(&visible, " ");
    let t = EMAIL_RE.replace_all(&t, " ");
    let t = MENTION_RE.replace_all(&t, " ");
    let t = if keep_emojis {
        t
    } else {
        EMOJI_RE.replace_all(&t, " ").into_owned().into()
    };
    let t = if lowercase {
        t.to_lowercase()
    } else {
        t.into_owned()
    };

    WS_RE.replace_all(&t, " ").trim().to_owned()
}

/// Alphabetic tokens of three or more characters; apostrophes allowed after
/// the first letter. Case is preserved.
#[must_use]
pub fn tokenize_en(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// `"en"` when at least 80 % of alphabetic characters are ASCII, else
/// `"other"`.
///
/// This is a script heuristic, not language identification: French or
/// German without many accents will read as `"en"`.
#[must_use]
pub fn detect_language(text: &str) -> &'static str {
    let (ascii, total) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(ascii, total), c| {
            (ascii + usize::from(c.is_ascii_alphabetic()), total + 1)
        });
    if total == 0 {
        return "other";
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = ascii as f64 / total as f64;
    if ratio >= 0.8 {
        "en"
    } else {
        "other"
    }
}

/// Mean of non-zero ratings (2 decimals) and a histogram keyed by the
/// rating digit.
#[must_use]
pub fn summarize_stars(reviews: &[RawReview]) -> (Option<f64>, BTreeMap<String, usize>) {
    let stars: Vec<u8> = reviews
        .iter()
        .map(|r| r.rating)
        .filter(|&r| r > 0)
        .collect();

    let mut by_star = BTreeMap::new();
    for star in &stars {
        *by_star.entry(star.to_string()).or_insert(0) += 1;
    }

    if stars.is_empty() {
        return (None, by_star);
    }
    let sum: u64 = stars.iter().map(|&s| u64::from(s)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f64 / stars.len() as f64;
    (Some(round_to(mean, 2)), by_star)
}

/// Best-effort repair: undo UTF-8 read as Windows-1252, straighten curly
/// quotes, drop control characters other than whitespace.
fn repair_text(text: &str) -> String {
    let fixed = fix_mojibake(text).unwrap_or_else(|| text.to_owned());
    fixed
        .chars()
        .filter_map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' | '\u{2032}' => Some('\''),
            '\u{201C}' | '\u{201D}' | '\u{201F}' | '\u{2033}' => Some('"'),
            c if c.is_control() && !c.is_whitespace() => None,
            c => Some(c),
        })
        .collect()
}

/// Re-encodes each run of non-ASCII single-byte characters as Windows-1252
/// and decodes it as UTF-8.
///
/// ASCII and characters with no single-byte encoding (emoji, CJK) end a run
/// and are copied through. A run that does not decode stays as it was.
/// Returns `None` when nothing changed.
fn fix_mojibake(text: &str) -> Option<String> {
    if text.is_ascii() {
        return None;
    }
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    let mut bytes = Vec::new();
    for c in text.chars() {
        if let Some(byte) = cp1252_byte(c).filter(|_| !c.is_ascii()) {
            run.push(c);
            bytes.push(byte);
        } else {
            flush_run(&mut out, &mut run, &mut bytes);
            out.push(c);
        }
    }
    flush_run(&mut out, &mut run, &mut bytes);
    (out != text).then_some(out)
}

fn cp1252_byte(c: char) -> Option<u8> {
    match u32::from(c) {
        cp @ 0..=0xFF => u8::try_from(cp).ok(),
        _ => CP1252_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|&(_, b)| b),
    }
}

fn flush_run(out: &mut String, run: &mut String, bytes: &mut Vec<u8>) {
    match String::from_utf8(std::mem::take(bytes)) {
        Ok(decoded) => out.push_str(&decoded),
        Err(_) => out.push_str(run),
    }
    run.clear();
}

/// Parses `text` as an HTML fragment and returns its text nodes joined by a
/// single space. Entities are decoded along the way.
fn strip_markup(text: &str) -> String {
    if !text.contains('<') && !text.contains('&') {
        return text.to_owned();
    }
    let fragment = Html::parse_fragment(text);
    fragment.root_element().text().collect::<Vec<_>>().join(" ")
}
