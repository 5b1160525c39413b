// src/record/credits.rs

/// Keywords marking the end of the credit count, tried in order.
const KEYWORDS: [&str; 2] = [" credit", " crédit"];

/// How many characters before the keyword may hold the opening parenthesis.
const LOOKBACK: usize = 8;

/// Best-effort credit count from a course or program title.
///
/// `"Intro to X (3 credits)"` → 3.0, `"Seminar (3-6 credits)"` → 3.0 (first
/// bound of a range). Anything that doesn't fit the pattern yields 0.0.
pub fn get_credits(title: &str) -> f64 {
    let Some(end) = KEYWORDS.iter().find_map(|k| title.find(k)) else {
        return 0.0;
    };

    let start = title[..end]
        .char_indices()
        .rev()
        .take(LOOKBACK)
        .find(|&(_, c)| c == '(')
        .map(|(i, _)| i + 1);
    let Some(start) = start else {
        return 0.0;
    };

    let inner = title[start..end].trim();
    inner
        .parse::<f64>()
        .or_else(|_| inner.split('-').next().unwrap_or_default().trim().parse())
        .unwrap_or(0.0)
}
