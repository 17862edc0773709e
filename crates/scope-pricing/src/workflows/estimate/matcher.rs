//! Declarative matchers that pull `(number, unit phrase)` occurrences out of scope text.
//!
//! A quantity pattern tolerates up to two intervening words between the number and
//! its unit noun ("4 new recessed can lights"), sums every non-degenerate occurrence,
//! and reports `None` rather than zero when nothing usable was written.

use regex::{Captures, Regex};
use std::sync::LazyLock;

const NUMBER: &str = r"(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|fifteen|twenty)";

/// Intervening word: must carry a letter so bare numbers never act as adjectives.
/// Spelled-out numbers also carry letters; `QuantityPattern::accepts` drops those.
const GAP_WORD: &str = r"[a-z0-9'/\-]*[a-z][a-z0-9'/\-]*";

const CONJUNCTIONS: &[&str] = &["and", "or", "plus", "with", "then", "&"];

const NUMBER_WORDS: &[(&str, f64)] = &[
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("eleven", 11.0),
    ("twelve", 12.0),
    ("fifteen", 15.0),
    ("twenty", 20.0),
];

/// Units of rating or capacity. A number followed by one of these describes the
/// equipment ("20 amp circuit", "50 gallon heater"), not how many units there are.
const RATING_WORDS: &[&str] = &[
    "a", "amp", "amps", "ampere", "amperes", "v", "volt", "volts", "w", "watt", "watts", "kw",
    "kilowatt", "kilowatts", "gal", "gallon", "gallons", "gpf", "gpm", "gph", "btu", "btus",
    "psi", "ton", "tons",
];

fn is_number_word(word: &str) -> bool {
    NUMBER_WORDS.iter().any(|(name, _)| *name == word)
}

static SQFT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*-?\s*(?:sq\.?\s*(?:ft|feet)|sqft|square\s+(?:feet|foot|ft)|sf)\b",
    )
    .expect("SQFT_PATTERN regex should compile")
});

static SHEET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(\d+)\s+((?:{GAP_WORD}\s+){{0,2}}?)(?:sheets?|boards?)\b(?:\s+of\s+((?:{GAP_WORD}\s+)?4'?\s*x\s*\d+'?))?"
    ))
    .expect("SHEET_PATTERN regex should compile")
});

static SHEET_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"4'?\s*x\s*(8|10|12)\b").expect("SHEET_SIZE regex should compile")
});

/// Lowercase, strip invisible characters, and collapse runs of whitespace.
pub(crate) fn normalize(text: &str) -> String {
    let cleaned = text.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Parse a digit or number word; non-finite and non-positive values are discarded.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let value = match NUMBER_WORDS.iter().find(|(name, _)| *name == raw) {
        Some((_, value)) => *value,
        None => raw.replace(',', "").parse::<f64>().ok()?,
    };

    (value.is_finite() && value > 0.0).then_some(value)
}

fn accumulate(total: &mut Option<f64>, value: f64) {
    let next = total.unwrap_or(0.0) + value;
    if next.is_finite() {
        *total = Some(next);
    }
}

/// Matcher for one class of countable units.
pub(crate) struct QuantityPattern {
    nouns: String,
    inline: Regex,
    labeled: Option<Regex>,
    rejected_gap_words: &'static [&'static str],
    rejected_next_words: &'static [&'static str],
}

impl QuantityPattern {
    /// `nouns` is a regex alternation of unit forms, e.g. `"outlets?|receptacles?"`.
    pub(crate) fn new(nouns: &str) -> Self {
        Self {
            nouns: nouns.to_string(),
            inline: Self::compile_inline(nouns, false),
            labeled: None,
            rejected_gap_words: &[],
            rejected_next_words: &[],
        }
    }

    fn compile_inline(nouns: &str, capture_next: bool) -> Regex {
        let next = if capture_next { r"(?:\s+([a-z]+))?" } else { "" };
        Regex::new(&format!(
            r"\b{NUMBER}\s+((?:{GAP_WORD}\s+){{0,2}}?)(?:{nouns})\b{next}"
        ))
        .expect("quantity pattern should compile")
    }

    /// Also accept `label: N` / `label = N` syntax.
    pub(crate) fn with_labels(mut self) -> Self {
        let labeled = Regex::new(&format!(r"\b(?:{})\s*[:=]\s*{NUMBER}\b", self.nouns))
            .expect("labeled quantity pattern should compile");
        self.labeled = Some(labeled);
        self
    }

    /// Drop matches whose intervening words include one of `words`.
    pub(crate) fn rejecting_gap(mut self, words: &'static [&'static str]) -> Self {
        self.rejected_gap_words = words;
        self
    }

    /// Drop matches immediately followed by one of `words` ("2 bedroom doors").
    pub(crate) fn rejecting_next(mut self, words: &'static [&'static str]) -> Self {
        self.inline = Self::compile_inline(&self.nouns, true);
        self.rejected_next_words = words;
        self
    }

    fn accepts(&self, captures: &Captures<'_>) -> bool {
        let gap = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        let gap_ok = gap.split_whitespace().all(|word| {
            !CONJUNCTIONS.contains(&word)
                && !RATING_WORDS.contains(&word)
                && !is_number_word(word)
                && !self.rejected_gap_words.contains(&word)
        });
        let next_ok = captures
            .get(3)
            .map(|m| !self.rejected_next_words.contains(&m.as_str()))
            .unwrap_or(true);
        gap_ok && next_ok
    }

    /// Sum of every accepted occurrence, or `None` when nothing usable matched.
    pub(crate) fn sum(&self, text: &str) -> Option<f64> {
        let mut total = None;
        let mut start = 0;

        while let Some(captures) = self.inline.captures_at(text, start) {
            let (Some(whole), Some(number)) = (captures.get(0), captures.get(1)) else {
                break;
            };
            if !self.accepts(&captures) {
                // Resume after the rejected number so a later count can still claim the unit.
                start = number.end();
                continue;
            }
            if let Some(value) = parse_number(number.as_str()) {
                accumulate(&mut total, value);
            }
            start = whole.end();
        }

        if let Some(labeled) = &self.labeled {
            for captures in labeled.captures_iter(text) {
                if let Some(value) = captures.get(1).and_then(|m| parse_number(m.as_str())) {
                    accumulate(&mut total, value);
                }
            }
        }

        total
    }

    /// Whole-unit count; fractional sums round to the nearest unit.
    pub(crate) fn count(&self, text: &str) -> Option<u32> {
        self.sum(text)
            .map(|value| value.round().min(u32::MAX as f64) as u32)
            .filter(|count| *count > 0)
    }
}

/// Case-insensitive keyword set matched on word boundaries.
pub(crate) struct Vocabulary {
    regex: Regex,
}

impl Vocabulary {
    /// `terms` are regex fragments; they are joined into one alternation.
    pub(crate) fn new(terms: &[&str]) -> Self {
        let regex = Regex::new(&format!(r"\b(?:{})\b", terms.join("|")))
            .expect("vocabulary pattern should compile");
        Self { regex }
    }

    pub(crate) fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub(crate) fn first<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex.find(text).map(|m| m.as_str())
    }
}

/// Sum of every explicit square-footage figure in the text.
pub(crate) fn sum_sqft(text: &str) -> Option<f64> {
    let mut total = None;
    for captures in SQFT_PATTERN.captures_iter(text) {
        if let Some(value) = captures.get(1).and_then(|m| parse_number(m.as_str())) {
            accumulate(&mut total, value);
        }
    }
    total
}

/// Sheet tally converted to square feet using the stated board size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SheetTally {
    pub(crate) sheets: u32,
    pub(crate) sqft: f64,
}

fn sheet_size_sqft(descriptor: &str, default_sqft: f64) -> f64 {
    SHEET_SIZE
        .captures(descriptor)
        .and_then(|captures| captures.get(1))
        .map(|length| match length.as_str() {
            "10" => 40.0,
            "12" => 48.0,
            _ => 32.0,
        })
        .unwrap_or(default_sqft)
}

pub(crate) fn sum_sheets(text: &str, default_sqft: f64) -> Option<SheetTally> {
    let mut sheets = 0u32;
    let mut sqft = 0.0;

    for captures in SHEET_PATTERN.captures_iter(text) {
        let gap = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        if gap
            .split_whitespace()
            .any(|word| CONJUNCTIONS.contains(&word))
        {
            continue;
        }
        let Some(count) = captures.get(1).and_then(|m| parse_number(m.as_str())) else {
            continue;
        };
        let descriptor = match captures.get(3) {
            Some(trailing) => format!("{gap} {}", trailing.as_str()),
            None => gap.to_string(),
        };
        let count = count.round() as u32;
        sheets = sheets.saturating_add(count);
        sqft += count as f64 * sheet_size_sqft(&descriptor, default_sqft);
    }

    (sheets > 0 && sqft.is_finite() && sqft > 0.0).then_some(SheetTally { sheets, sqft })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlets() -> QuantityPattern {
        QuantityPattern::new("outlets?|receptacles?")
    }

    #[test]
    fn sums_every_occurrence() {
        let text = normalize("Add 4 outlets in the kitchen and 3 outlets in the garage");
        assert_eq!(outlets().count(&text), Some(7));
    }

    #[test]
    fn tolerates_two_adjectives_but_not_three() {
        let lights = QuantityPattern::new("can lights?|recessed lights?");
        assert_eq!(lights.count("install 4 new recessed can lights"), Some(4));
        assert_eq!(lights.count("install 4 brand new led can lights"), None);
    }

    #[test]
    fn conjunctions_break_the_gap() {
        let faucets = QuantityPattern::new("faucets?");
        assert_eq!(faucets.count("replace 3 toilets and faucets"), None);
        assert_eq!(faucets.count("replace 3 toilets and 2 faucets"), Some(2));
    }

    #[test]
    fn bare_numbers_never_act_as_adjectives() {
        let faucets = QuantityPattern::new("faucets?");
        assert_eq!(faucets.count("replace 3 toilets 2 faucets"), Some(2));
        assert_eq!(faucets.count("replace 3 toilets two faucets"), Some(2));

        let doors = QuantityPattern::new("doors?");
        assert_eq!(doors.count("paint 3 rooms two doors"), Some(2));
    }

    #[test]
    fn ratings_are_not_unit_counts() {
        let circuits = QuantityPattern::new("circuits?");
        assert_eq!(circuits.count("add a dedicated 20 amp circuit"), None);
        assert_eq!(circuits.count("run a 240 volt circuit for the dryer"), None);
        assert_eq!(circuits.count("run 2 dedicated 20a circuits"), Some(2));

        let heaters = QuantityPattern::new("water heaters?");
        assert_eq!(heaters.count("replace 50 gallon water heater"), None);
        assert_eq!(heaters.count("replace 2 water heaters"), Some(2));
    }

    #[test]
    fn absence_is_not_zero() {
        assert_eq!(outlets().sum("replace the outlets"), None);
        assert_eq!(outlets().sum("0 outlets"), None);
    }

    #[test]
    fn number_words_and_labels_are_understood() {
        let patches = QuantityPattern::new("patch(?:es)?|holes?").with_labels();
        assert_eq!(patches.count("two holes behind the door, patches: 3"), Some(5));
    }

    #[test]
    fn rejected_gap_and_next_words_are_skipped() {
        let fixtures = QuantityPattern::new("lights?|fixtures?").rejecting_gap(&["recessed"]);
        assert_eq!(fixtures.count("4 recessed lights and 2 pendant lights"), Some(2));

        let rooms = QuantityPattern::new("rooms?|bedrooms?").rejecting_next(&["doors", "door"]);
        assert_eq!(rooms.count("paint 2 bedroom doors and 3 bedrooms"), Some(3));
    }

    #[test]
    fn square_footage_accepts_common_spellings() {
        assert_eq!(sum_sqft("about 1,200 sq ft of walls"), Some(1200.0));
        assert_eq!(sum_sqft("400 sqft ceiling plus 250 square feet walls"), Some(650.0));
        assert_eq!(sum_sqft("300sf"), Some(300.0));
        assert_eq!(sum_sqft("twelve feet"), None);
    }

    #[test]
    fn sheet_counts_convert_by_board_size() {
        let tally = sum_sheets("hang 10 4x12 sheets and 5 sheets of 4x8", 32.0)
            .expect("sheets parsed");
        assert_eq!(tally.sheets, 15);
        assert_eq!(tally.sqft, 10.0 * 48.0 + 5.0 * 32.0);

        let plain = sum_sheets("hang 6 sheets", 32.0).expect("sheets parsed");
        assert_eq!(plain.sqft, 192.0);
        assert_eq!(sum_sheets("a few sheets", 32.0), None);
    }

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize("  Replace\u{200b}  3\tTOILETS "), "replace 3 toilets");
    }
}
