//! Title text processing shared by the matching strategies.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::MatchingError;

/// Words carrying no event identity.
pub const STOP_WORDS: &[&str] = &[
    "will", "the", "be", "in", "by", "at", "on", "for", "of", "to", "and", "or", "a", "an",
];

/// Spelling variants folded onto one keyword after stop-word removal.
const SYNONYMS: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("hit", "reach"),
    ("hits", "reach"),
    ("reaches", "reach"),
    ("reached", "reach"),
    ("exceed", "reach"),
    ("exceeds", "reach"),
    ("surpass", "reach"),
    ("surpasses", "reach"),
    ("wins", "win"),
    ("winner", "win"),
    ("won", "win"),
];

const MONTHS: &[(&str, &str)] = &[
    ("january", "january"),
    ("jan", "january"),
    ("february", "february"),
    ("feb", "february"),
    ("march", "march"),
    ("mar", "march"),
    ("april", "april"),
    ("apr", "april"),
    ("may", "may"),
    ("june", "june"),
    ("jun", "june"),
    ("july", "july"),
    ("jul", "july"),
    ("august", "august"),
    ("aug", "august"),
    ("september", "september"),
    ("sept", "september"),
    ("sep", "september"),
    ("october", "october"),
    ("oct", "october"),
    ("november", "november"),
    ("nov", "november"),
    ("december", "december"),
    ("dec", "december"),
];

/// Rejects titles that cannot be a provider's market question.
///
/// Empty titles are allowed; they simply never match.
///
/// # Errors
///
/// Returns [`MatchingError::InvalidTitle`] for titles longer than
/// `max_len` characters or containing control characters.
pub fn validate_title(title: &str, max_len: usize) -> Result<(), MatchingError> {
    let len = title.chars().count();
    if len > max_len {
        return Err(MatchingError::invalid_title(format!(
            "{len} characters exceeds limit of {max_len}"
        )));
    }
    if title.chars().any(|c| c.is_control() && !c.is_whitespace()) {
        return Err(MatchingError::invalid_title("contains control characters"));
    }
    Ok(())
}

/// Splits a lowercased title into raw words.
fn words(lowered: &str) -> impl Iterator<Item = &str> {
    lowered
        .split(|c: char| c.is_whitespace() || c == '-' || c == '/')
        .filter(|w| !w.is_empty())
}

/// Parses an amount such as `100000`, `1.5`, `100k` or `2.5m`.
///
/// Digit-group commas and currency symbols must already be stripped.
pub fn parse_amount(word: &str) -> Option<Decimal> {
    if !word.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let (body, multiplier) = match word.chars().last() {
        Some('k') => (&word[..word.len() - 1], dec!(1000)),
        Some('m') => (&word[..word.len() - 1], dec!(1000000)),
        Some('b') => (&word[..word.len() - 1], dec!(1000000000)),
        _ => (word, Decimal::ONE),
    };

    if body.is_empty()
        || !body.chars().all(|c| c.is_ascii_digit() || c == '.')
        || body.matches('.').count() > 1
    {
        return None;
    }

    let value: Decimal = body.parse().ok()?;
    value.checked_mul(multiplier).map(|v| v.normalize())
}

/// Strips punctuation from a lowercased word, canonicalizing amounts.
///
/// `$100,000` and `$100k` both become `100000`; `u.s.` becomes `us`.
fn clean_word(word: &str) -> String {
    let kept: String = word
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.')
        .collect();
    let trimmed = kept.trim_matches('.');

    match parse_amount(trimmed) {
        Some(amount) => amount.to_string(),
        None => trimmed.replace('.', ""),
    }
}

fn fold_synonym(token: String) -> String {
    SYNONYMS
        .iter()
        .find(|(from, _)| *from == token)
        .map_or(token, |(_, to)| (*to).to_string())
}

/// Extracts the identity-bearing keywords of a title.
///
/// Lowercases, strips punctuation, removes [`STOP_WORDS`], drops tokens of
/// two characters or fewer, then folds synonyms.
#[must_use]
pub fn tokenize(title: &str) -> BTreeSet<String> {
    let lowered = title.to_lowercase();
    words(&lowered)
        .map(clean_word)
        .filter(|t| t.chars().count() > 2 && !STOP_WORDS.contains(&t.as_str()))
        .map(fold_synonym)
        .collect()
}

/// Sørensen–Dice coefficient over character bigrams, in `[0, 1]`.
///
/// Case and whitespace are ignored. Bigrams are counted as a multiset, so
/// the score is symmetric in its arguments.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let b: Vec<char> = b
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut counts: HashMap<(char, char), usize> = HashMap::new();
    for pair in a.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut intersection = 0usize;
    for pair in b.windows(2) {
        if let Some(count) = counts.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }

    (2 * intersection) as f64 / ((a.len() - 1) + (b.len() - 1)) as f64
}

/// Numeric and calendar facts stated in a title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFacts {
    /// Canonical amounts (`$100k` → `100000`), years excluded.
    pub amounts: BTreeSet<String>,
    /// Canonical month names.
    pub months: BTreeSet<&'static str>,
    /// Four-digit years in 2000-2099.
    pub years: BTreeSet<u16>,
}

/// Extracts amounts, months and years from a title.
///
/// "may" only counts as a month next to a day number or a year, so the
/// modal verb in "Bitcoin may reach $100k" states no date.
#[must_use]
pub fn extract_facts(title: &str) -> TitleFacts {
    let lowered = title.to_lowercase();
    let mut facts = TitleFacts::default();

    let tokens: Vec<(bool, String)> = words(&lowered)
        .map(|word| {
            let kept: String = word
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '.')
                .collect();
            (word.starts_with('$'), kept.trim_matches('.').to_string())
        })
        .collect();

    for (i, (is_currency, token)) in tokens.iter().enumerate() {
        let (is_currency, token) = (*is_currency, token.as_str());

        if let Some((_, month)) = MONTHS.iter().find(|(name, _)| *name == token) {
            let dated = *month != "may"
                || [i.checked_sub(1), Some(i + 1)]
                    .into_iter()
                    .flatten()
                    .filter_map(|j| tokens.get(j))
                    .any(|(currency, t)| !currency && is_day_or_year(t));
            if dated {
                facts.months.insert(*month);
            }
            continue;
        }

        let Some(amount) = parse_amount(token) else {
            continue;
        };

        let year = (!is_currency && token.len() == 4)
            .then(|| token.parse::<u16>().ok())
            .flatten()
            .filter(|y| (2000..=2099).contains(y));

        match year {
            Some(year) => {
                facts.years.insert(year);
            }
            None => {
                facts.amounts.insert(amount.to_string());
            }
        }
    }

    facts
}

fn is_day_or_year(token: &str) -> bool {
    token
        .parse::<u16>()
        .is_ok_and(|n| (1..=31).contains(&n) || (2000..=2099).contains(&n))
}
