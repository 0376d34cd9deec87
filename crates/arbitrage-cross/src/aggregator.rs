//! Collapses per-pair evaluations into a ranked opportunity list.

use std::collections::HashSet;

use tracing::debug;

use crate::evaluator::ArbitrageResult;

/// Drops rejected pairs, deduplicates and ranks the rest.
///
/// Results are deduplicated on the normalized (trimmed, lowercased) title of
/// listing A, keeping the first occurrence in input order, then stably
/// sorted by margin, largest first. The output depends only on the input
/// sequence.
#[must_use]
pub fn aggregate<I>(results: I) -> Vec<ArbitrageResult>
where
    I: IntoIterator<Item = Option<ArbitrageResult>>,
{
    aggregate_counted(results).0
}

/// Like [`aggregate`], also returning how many duplicates were dropped.
#[must_use]
pub fn aggregate_counted<I>(results: I) -> (Vec<ArbitrageResult>, usize)
where
    I: IntoIterator<Item = Option<ArbitrageResult>>,
{
    let mut seen = HashSet::new();
    let mut duplicates = 0;

    let mut kept: Vec<ArbitrageResult> = results
        .into_iter()
        .flatten()
        .filter(|result| {
            let key = result.listing_a.normalized_title();
            if seen.insert(key) {
                true
            } else {
                debug!(title = %result.listing_a.title, "Dropping duplicate opportunity");
                duplicates += 1;
                false
            }
        })
        .collect();

    // sort_by is stable, so equal margins keep input order
    kept.sort_by(|a, b| b.margin.cmp(&a.margin));

    (kept, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BinaryQuote, Category, MarketListing, Platform, Strategy};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn result(title_a: &str, source_b: &str, margin: Decimal) -> ArbitrageResult {
        let listing = |platform: Platform, source_id: &str, title: &str| MarketListing {
            platform,
            source_id: source_id.to_string(),
            title: title.to_string(),
            category: Category::Other,
            quote: BinaryQuote {
                yes: dec!(0.5),
                no: dec!(0.5),
            },
            volume: Decimal::ZERO,
        };

        ArbitrageResult {
            listing_a: listing(Platform::Kalshi, title_a, title_a),
            listing_b: listing(Platform::Polymarket, source_b, source_b),
            strategy: Strategy::BuyYesANoB,
            margin,
            price_delta_yes_pct: Decimal::ZERO,
            price_delta_no_pct: Decimal::ZERO,
            confidence: 0.7,
            matched_keywords: Default::default(),
        }
    }

    #[test]
    fn test_drops_none_and_sorts_descending() {
        let out = aggregate(vec![
            Some(result("A", "pa", dec!(0.05))),
            None,
            Some(result("B", "pb", dec!(0.15))),
            None,
            Some(result("C", "pc", dec!(0.10))),
        ]);

        let margins: Vec<Decimal> = out.iter().map(|r| r.margin).collect();
        assert_eq!(margins, vec![dec!(0.15), dec!(0.10), dec!(0.05)]);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        // The later duplicate has a larger margin but still loses
        let (out, dropped) = aggregate_counted(vec![
            Some(result("Will BTC hit $100k?", "first", dec!(0.05))),
            Some(result("  will btc HIT $100k? ", "second", dec!(0.20))),
        ]);

        assert_eq!(dropped, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].listing_b.source_id, "first");
        assert_eq!(out[0].margin, dec!(0.05));
    }

    #[test]
    fn test_equal_margins_keep_input_order() {
        let out = aggregate(vec![
            Some(result("A", "pa", dec!(0.10))),
            Some(result("B", "pb", dec!(0.10))),
            Some(result("C", "pc", dec!(0.10))),
        ]);
        let titles: Vec<&str> = out.iter().map(|r| r.listing_a.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_is_deterministic() {
        let input = || {
            vec![
                Some(result("X", "px", dec!(0.03))),
                Some(result("Y", "py", dec!(0.30))),
                Some(result("x", "px2", dec!(0.40))),
                None,
            ]
        };
        assert_eq!(aggregate(input()), aggregate(input()));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(Vec::<Option<ArbitrageResult>>::new()).is_empty());
        assert!(aggregate(vec![None, None]).is_empty());
    }
}
