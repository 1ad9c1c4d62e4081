//! Plan-name and price-text normalization.
//!
//! Both functions are total: any input yields a category or an optional
//! number, never an error.

use super::models::PlanCategory;
use regex_lite::Regex;
use std::sync::LazyLock;

/// Leftmost run of digits and separators, optionally starting with a point.
static NUMERIC_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.?\d[\d.,]*").unwrap());

/// Maps a storefront plan title onto a [`PlanCategory`].
///
/// Matching is case-insensitive and the first rule wins, so
/// "Family Duo" is a family plan.
pub fn normalize_plan_name(raw: &str) -> PlanCategory {
    let name = raw.to_lowercase();

    if name.contains("family") {
        PlanCategory::Family
    } else if name.contains("duo") {
        PlanCategory::Duo
    } else if name.contains("student") {
        PlanCategory::Student
    } else if ["individual", "standard", "basic"].iter().any(|k| name.contains(k)) {
        PlanCategory::Individual
    } else {
        PlanCategory::Unknown
    }
}

/// Parses the numeric price out of a price label like "€8,99/month".
///
/// Whitespace is removed first, then only the leftmost numeric run is
/// considered; later runs ("was 12.99", "for 3 months") are ignored.
/// Returns `None` when no run exists or it does not parse as a finite,
/// non-negative number.
pub fn clean_price(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let run = NUMERIC_RUN.find(&compact)?.as_str();
    let run = run.trim_end_matches(['.', ',']);

    let value: f64 = normalize_separators(run).parse().ok()?;

    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Rewrites a numeric run so that only a single `.` decimal point remains.
///
/// With both separators present the later one is the decimal point only if
/// the earlier one groups digits in threes; otherwise the run ends at the
/// first switch of separator. A lone comma is a decimal comma unless
/// exactly three digits follow it.
fn normalize_separators(run: &str) -> String {
    let last_comma = run.rfind(',');
    let last_period = run.rfind('.');

    match (last_comma, last_period) {
        (Some(c), Some(p)) => {
            let (decimal_at, grouping) = if c > p { (c, '.') } else { (p, ',') };
            let (whole, fraction) = (&run[..decimal_at], &run[decimal_at + 1..]);

            if is_grouped(whole, grouping) {
                // 1.234,56 -> 1234.56, 1,234.50 -> 1234.50
                format!("{}.{}", whole.replace(grouping, ""), fraction)
            } else {
                // 5.99,3 -> 5.99
                normalize_separators(leading_separator_run(run))
            }
        }
        (Some(c), None) => {
            let single = run.matches(',').count() == 1;
            if single && run.len() - c - 1 != 3 {
                run.replace(',', ".")
            } else {
                run.replace(',', "")
            }
        }
        (None, Some(_)) => {
            let groups: Vec<&str> = run.split('.').collect();
            if groups.len() > 2 && groups[1..].iter().all(|g| g.len() == 3) {
                run.replace('.', "")
            } else {
                run.to_string()
            }
        }
        (None, None) => run.to_string(),
    }
}

/// True if `digits` is one leading group of 1-3 digits followed by
/// `separator`-joined groups of exactly three.
fn is_grouped(digits: &str, separator: char) -> bool {
    let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    let mut groups = digits.split(separator);
    let head_ok = groups.next().is_some_and(|g| (1..=3).contains(&g.len()) && all_digits(g));
    head_ok && groups.all(|g| g.len() == 3 && all_digits(g))
}

/// Cuts the run where its separator first changes kind.
fn leading_separator_run(run: &str) -> &str {
    let mut first = None;
    for (i, c) in run.char_indices() {
        if c == '.' || c == ',' {
            match first {
                None => first = Some(c),
                Some(f) if f != c => return &run[..i],
                Some(_) => {}
            }
        }
    }
    run
}
