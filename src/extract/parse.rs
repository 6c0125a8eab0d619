//! Price-string and label parsing heuristics for scraped pages.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

/// "yes ... 57¢" cent-suffixed price pattern.
static YES_CENTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"yes[^¢]*?(\d+(?:\.\d+)?)¢").expect("valid cents pattern"));

/// Bare-decimal fallback pattern for pages that omit the cent sign.
static YES_DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"yes[^\d]*?(\d+(?:\.\d+)?)").expect("valid decimal pattern"));

/// Open tag with a class attribute.
static CLASS_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<[a-zA-Z][^>]*\bclass="([^"]*)"[^>]*>"#).expect("valid tag pattern"));

/// Any markup tag, for text extraction.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid strip pattern"));

/// How far past a matched element the price heuristics look.
const CHUNK_WINDOW: usize = 1200;

fn has_all_classes(attr: &str, spec: &str) -> bool {
    let classes: Vec<&str> = attr.split_whitespace().collect();
    spec.split_whitespace().all(|c| classes.contains(&c))
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx.min(s.len())
}

/// Tag-stripped, whitespace-collapsed text chunks following elements whose
/// class attribute carries every class in `class_spec`.
pub fn class_chunks(html: &str, class_spec: &str) -> Vec<String> {
    if class_spec.trim().is_empty() {
        return Vec::new();
    }

    let matches: Vec<(usize, usize)> = CLASS_TAG_RE
        .captures_iter(html)
        .filter(|caps| has_all_classes(&caps[1], class_spec))
        .map(|caps| {
            let whole = caps.get(0).expect("whole match");
            (whole.start(), whole.end())
        })
        .collect();

    matches
        .iter()
        .enumerate()
        .map(|(i, &(_, end))| {
            let next_start = matches
                .get(i + 1)
                .map(|&(s, _)| s)
                .unwrap_or_else(|| html.len());
            let cap = floor_char_boundary(html, next_start.min(end + CHUNK_WINDOW));
            let stripped = TAG_RE.replace_all(&html[end..cap], " ");
            stripped.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Immediate text of matching elements (up to the next tag), for labels.
pub fn class_immediate_text(html: &str, class_spec: &str) -> Vec<String> {
    if class_spec.trim().is_empty() {
        return Vec::new();
    }

    CLASS_TAG_RE
        .captures_iter(html)
        .filter(|caps| has_all_classes(&caps[1], class_spec))
        .filter_map(|caps| {
            let end = caps.get(0).expect("whole match").end();
            let rest = &html[end..];
            let text = match rest.find('<') {
                Some(pos) => &rest[..pos],
                None => rest,
            };
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}

/// Extract "yes" prices from one text chunk.
///
/// The cent-suffixed pattern wins; when it finds nothing, the bare-decimal
/// fallback applies, filtered to the plausible (0, 100] price range.
pub fn yes_prices(text: &str) -> Vec<Decimal> {
    let lowered = text.to_lowercase();
    if !lowered.contains("yes") {
        return Vec::new();
    }

    let cents: Vec<Decimal> = YES_CENTS_RE
        .captures_iter(&lowered)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();
    if !cents.is_empty() {
        return cents;
    }

    YES_DECIMAL_RE
        .captures_iter(&lowered)
        .filter_map(|caps| caps[1].parse::<Decimal>().ok())
        .filter(|p| *p > Decimal::ZERO && *p <= Decimal::ONE_HUNDRED)
        .collect()
}

/// Extract all "yes" prices from elements matching `class_spec`.
pub fn extract_yes_prices(html: &str, class_spec: &str) -> Vec<Decimal> {
    class_chunks(html, class_spec)
        .iter()
        .flat_map(|chunk| yes_prices(chunk))
        .collect()
}

/// Extract outcome labels from elements matching `class_spec`.
pub fn extract_outcome_labels(html: &str, class_spec: &str) -> Vec<String> {
    class_immediate_text(html, class_spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const PAGE: &str = r#"
        <div class="row price-cell odd">
            <span>Yes 57¢</span><span>No 45¢</span>
        </div>
        <div class="row price-cell odd"><b>Yes 12.5¢</b></div>
        <div class="row other"><span>Yes 99¢</span></div>
        <p class="name-cell">Bitcoin above 100k</p>
        <p class="name-cell">Bitcoin below 100k</p>
    "#;

    #[test]
    fn cent_pattern_wins_over_decimal_fallback() {
        assert_eq!(yes_prices("buy yes 57¢ or no 45¢"), vec![dec!(57)]);
    }

    #[test]
    fn decimal_fallback_filters_implausible_values() {
        assert_eq!(yes_prices("yes at 42.5 right now"), vec![dec!(42.5)]);
        assert_eq!(yes_prices("yes 250 shares"), Vec::<Decimal>::new());
    }

    #[test]
    fn text_without_yes_yields_nothing() {
        assert_eq!(yes_prices("no 45¢ only"), Vec::<Decimal>::new());
    }

    #[test]
    fn prices_come_only_from_matching_elements() {
        let prices = extract_yes_prices(PAGE, "price-cell row");
        assert_eq!(prices, vec![dec!(57), dec!(12.5)]);
    }

    #[test]
    fn labels_come_from_immediate_element_text() {
        let labels = extract_outcome_labels(PAGE, "name-cell");
        assert_eq!(labels, vec!["Bitcoin above 100k", "Bitcoin below 100k"]);
    }

    #[test]
    fn empty_selector_matches_nothing() {
        assert!(extract_yes_prices(PAGE, "").is_empty());
        assert!(extract_outcome_labels(PAGE, " ").is_empty());
    }
}
