//! Number-set expansion
//!
//! Turns the numbers segment of a bet line into literal number strings.
//! Three reference forms, tried in order; the first non-empty result wins:
//!
//! ```text
//! tai             symbolic combination (name or alias of a catalog entry)
//! 10/12keo20      arithmetic sequence: start, next, end (step = next - start)
//! 12.34,56 78     literal list split on '.', ',', '-' and whitespace
//! ```

use betcode_types::{CombinationRule, NumberCombination};
use nom::{
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0},
    combinator::all_consuming,
    error::ParseError as NomParseError,
    sequence::delimited,
    IResult,
};
use std::collections::HashSet;
use tracing::warn;

use crate::normalize::fold_key;

/// Default bound on the numbers a single sequence may produce
pub const DEFAULT_MAX_EXPANDED_NUMBERS: usize = 1000;

/// Outcome of expanding one numbers segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    Combination { name: String, numbers: Vec<String> },
    /// Matched a combination whose rule is never evaluated
    Unsupported { name: String, method: String },
    Sequence { numbers: Vec<String> },
    /// Matched the sequence form but exceeded the expansion bound
    SequenceTooLong { limit: usize },
    Literal { numbers: Vec<String> },
    Empty,
}

impl Expansion {
    /// Expanded numbers; empty for every non-producing outcome
    pub fn numbers(&self) -> &[String] {
        match self {
            Expansion::Combination { numbers, .. }
            | Expansion::Sequence { numbers }
            | Expansion::Literal { numbers } => numbers,
            Expansion::Unsupported { .. } | Expansion::SequenceTooLong { .. } | Expansion::Empty => {
                &[]
            }
        }
    }

    pub fn into_numbers(self) -> Vec<String> {
        match self {
            Expansion::Combination { numbers, .. }
            | Expansion::Sequence { numbers }
            | Expansion::Literal { numbers } => numbers,
            Expansion::Unsupported { .. } | Expansion::SequenceTooLong { .. } | Expansion::Empty => {
                vec![]
            }
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Expand a numbers segment with the default sequence bound.
///
/// Never fails: no match yields an empty list.
pub fn expand(token: &str, combos: &[NumberCombination]) -> Vec<String> {
    expand_token(token, combos, DEFAULT_MAX_EXPANDED_NUMBERS).into_numbers()
}

/// Expand a numbers segment, reporting which form produced the numbers.
pub fn expand_token(token: &str, combos: &[NumberCombination], max_numbers: usize) -> Expansion {
    let token = token.trim();
    if token.is_empty() {
        return Expansion::Empty;
    }

    if let Some(expansion) = expand_combination(token, combos) {
        return expansion;
    }

    match expand_sequence(token, max_numbers) {
        Some(Ok(numbers)) if !numbers.is_empty() => return Expansion::Sequence { numbers },
        Some(Err(limit)) => {
            warn!("Sequence '{}' exceeds {} numbers", token, max_numbers);
            return Expansion::SequenceTooLong { limit };
        }
        _ => {}
    }

    let numbers = expand_literal(token);
    if numbers.is_empty() {
        Expansion::Empty
    } else {
        Expansion::Literal { numbers }
    }
}

/// Numbers produced by a closed combination rule; `None` for custom rules.
pub fn generate(rule: &CombinationRule) -> Option<Vec<String>> {
    if !rule.is_supported() {
        return None;
    }

    let keep = |n: u32| -> bool {
        let (tens, units) = (n / 10, n % 10);
        match rule {
            CombinationRule::Big => n >= 50,
            CombinationRule::Small => n < 50,
            CombinationRule::Even => n % 2 == 0,
            CombinationRule::Odd => n % 2 == 1,
            CombinationRule::EvenEven => tens % 2 == 0 && units % 2 == 0,
            CombinationRule::OddOdd => tens % 2 == 1 && units % 2 == 1,
            CombinationRule::EvenOdd => tens % 2 == 0 && units % 2 == 1,
            CombinationRule::OddEven => tens % 2 == 1 && units % 2 == 0,
            CombinationRule::Doubles => tens == units,
            CombinationRule::Head { digit } => tens == u32::from(*digit),
            CombinationRule::Tail { digit } => units == u32::from(*digit),
            CombinationRule::Custom { .. } => false,
        }
    };

    Some((0..100).filter(|n| keep(*n)).map(|n| format!("{:02}", n)).collect())
}

/// Distinct digit permutations of a number, in ascending order.
///
/// ```
/// use betcode::numbers::permutations;
///
/// assert_eq!(permutations("112"), vec!["112", "121", "211"]);
/// ```
pub fn permutations(number: &str) -> Vec<String> {
    permutations_bounded(number, usize::MAX).unwrap_or_default()
}

/// Distinct digit permutations, or `None` once more than `limit` exist.
pub fn permutations_bounded(number: &str, limit: usize) -> Option<Vec<String>> {
    let mut digits: Vec<char> = number.chars().collect();
    digits.sort_unstable();

    let mut out = Vec::new();
    let mut used = vec![false; digits.len()];
    let mut current = Vec::with_capacity(digits.len());
    if permute(&digits, &mut used, &mut current, &mut out, limit) {
        Some(out)
    } else {
        None
    }
}

/// Depth-first walk skipping repeated digits; `false` when `limit` is passed.
fn permute(
    digits: &[char],
    used: &mut [bool],
    current: &mut Vec<char>,
    out: &mut Vec<String>,
    limit: usize,
) -> bool {
    if current.len() == digits.len() {
        out.push(current.iter().collect());
        return out.len() <= limit;
    }
    for i in 0..digits.len() {
        if used[i] || (i > 0 && digits[i] == digits[i - 1] && !used[i - 1]) {
            continue;
        }
        used[i] = true;
        current.push(digits[i]);
        let within = permute(digits, used, current, out, limit);
        current.pop();
        used[i] = false;
        if !within {
            return false;
        }
    }
    true
}

/// Priced ticket set for a line: the numbers themselves, or every distinct
/// permutation of them for permutation bet types.
///
/// `None` when the permutation set grows past `limit` tickets.
pub fn tickets(numbers: &[String], is_permutation: bool, limit: usize) -> Option<Vec<String>> {
    if !is_permutation {
        return Some(numbers.to_vec());
    }
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for number in numbers {
        for permutation in permutations_bounded(number, limit)? {
            if seen.insert(permutation.clone()) {
                out.push(permutation);
            }
        }
        if out.len() > limit {
            return None;
        }
    }
    Some(out)
}

// ============================================================================
// Forms
// ============================================================================

fn expand_combination(token: &str, combos: &[NumberCombination]) -> Option<Expansion> {
    let key = fold_key(token);
    let combo = combos
        .iter()
        .find(|c| c.lookup_keys().any(|k| fold_key(k) == key))?;

    Some(match generate(&combo.generator) {
        Some(numbers) => Expansion::Combination {
            name: combo.name.clone(),
            numbers,
        },
        None => {
            let method = match &combo.generator {
                CombinationRule::Custom { calculation_method } => calculation_method.clone(),
                other => format!("{:?}", other),
            };
            warn!(
                "Combination '{}' uses unsupported rule '{}'",
                combo.name, method
            );
            Expansion::Unsupported {
                name: combo.name.clone(),
                method,
            }
        }
    })
}

/// `<start>/<next>keo<end>`, whitespace allowed around each part
fn sequence<'a, E: NomParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (&'a str, &'a str, &'a str), E> {
    let (input, start) = delimited(multispace0, digit1, multispace0)(input)?;
    let (input, _) = char('/')(input)?;
    let (input, next) = delimited(multispace0, digit1, multispace0)(input)?;
    let (input, _) = tag("keo")(input)?;
    let (input, end) = delimited(multispace0, digit1, multispace0)(input)?;
    Ok((input, (start, next, end)))
}

/// `None` when the token is not a sequence, `Some(Err(limit))` when the
/// sequence would exceed `max_numbers`.
fn expand_sequence(token: &str, max_numbers: usize) -> Option<Result<Vec<String>, usize>> {
    let folded = fold_key(token);
    let (_, (start_text, next_text, end_text)) =
        all_consuming(sequence::<nom::error::Error<&str>>)(folded.as_str()).ok()?;

    let start: u64 = start_text.parse().ok()?;
    let next: u64 = next_text.parse().ok()?;
    let end: u64 = end_text.parse().ok()?;

    if next <= start || end < start {
        return Some(Ok(vec![]));
    }
    let step = next - start;
    let count = (end - start) / step + 1;
    if count > max_numbers as u64 {
        return Some(Err(max_numbers));
    }

    let width = start_text.len();
    Some(Ok((0..count)
        .map(|i| format!("{:0width$}", start + i * step, width = width))
        .collect()))
}

fn expand_literal(token: &str) -> Vec<String> {
    let parts: Vec<&str> = token
        .split(|c: char| c == '.' || c == ',' || c == '-' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    if parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())) {
        parts.into_iter().map(str::to_string).collect()
    } else {
        vec![]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sequence_expansion() {
        let combos = fixtures::combinations();
        assert_eq!(
            expand("10/12keo20", &combos),
            strings(&["10", "12", "14", "16", "18", "20"])
        );
        assert_eq!(
            expand("01/03KÉO09", &combos),
            strings(&["01", "03", "05", "07", "09"])
        );
        assert_eq!(
            expand("100/110 keo 130", &combos),
            strings(&["100", "110", "120", "130"])
        );
    }

    #[test]
    fn test_sequence_end_not_on_step() {
        let combos = fixtures::combinations();
        assert_eq!(
            expand("10/13keo20", &combos),
            strings(&["10", "13", "16", "19"])
        );
    }

    #[test]
    fn test_invalid_sequences_are_empty() {
        let combos = fixtures::combinations();
        assert!(expand("12/10keo20", &combos).is_empty());
        assert!(expand("12/12keo20", &combos).is_empty());
        assert!(expand("20/22keo10", &combos).is_empty());
        assert!(expand("ab/12keo20", &combos).is_empty());
    }

    #[test]
    fn test_sequence_too_long() {
        let combos = fixtures::combinations();
        assert_eq!(
            expand_token("0/1keo5000", &combos, 1000),
            Expansion::SequenceTooLong { limit: 1000 }
        );
        assert_eq!(expand_token("0/1keo99", &combos, 1000).numbers().len(), 100);
    }

    #[test]
    fn test_combination_by_name_and_alias() {
        let combos = fixtures::combinations();
        let big = expand("Tài", &combos);
        assert_eq!(big.len(), 50);
        assert_eq!(big.first().map(String::as_str), Some("50"));
        assert_eq!(big.last().map(String::as_str), Some("99"));

        assert_eq!(expand(" TAI ", &combos), big);

        let doubles = expand("kep", &combos);
        assert_eq!(doubles, strings(&["00", "11", "22", "33", "44", "55", "66", "77", "88", "99"]));

        let head = expand("dau5", &combos);
        assert_eq!(head.len(), 10);
        assert!(head.iter().all(|n| n.starts_with('5')));
    }

    #[test]
    fn test_parity_rules() {
        let even = generate(&CombinationRule::Even).unwrap();
        assert_eq!(even.len(), 50);
        assert!(even.contains(&"00".to_string()));

        let even_even = generate(&CombinationRule::EvenEven).unwrap();
        assert_eq!(even_even.len(), 25);
        assert!(even_even.contains(&"48".to_string()));
        assert!(!even_even.contains(&"49".to_string()));

        let odd_even = generate(&CombinationRule::OddEven).unwrap();
        assert_eq!(odd_even.len(), 25);
        assert!(odd_even.contains(&"10".to_string()));

        let small = generate(&CombinationRule::Small).unwrap();
        assert_eq!(small.first().map(String::as_str), Some("00"));
        assert_eq!(small.len(), 50);
    }

    #[test]
    fn test_unsupported_combination() {
        let combos = fixtures::combinations();
        assert_eq!(
            expand_token("May Mắn", &combos, 1000),
            Expansion::Unsupported {
                name: "Lucky".into(),
                method: "n % 7 == 0".into(),
            }
        );
        assert!(expand("may man", &combos).is_empty());
        assert!(generate(&CombinationRule::Tail { digit: 12 }).is_none());
    }

    #[test]
    fn test_literal_lists() {
        let combos = fixtures::combinations();
        assert_eq!(
            expand("12.34,56 78-90", &combos),
            strings(&["12", "34", "56", "78", "90"])
        );
        assert_eq!(expand("..12..34  ", &combos), strings(&["12", "34"]));
        assert_eq!(expand("12.345", &combos), strings(&["12", "345"]));
        assert!(expand("12.ab", &combos).is_empty());
        assert!(expand("", &combos).is_empty());
    }

    #[test]
    fn test_permutations() {
        assert_eq!(
            permutations("123"),
            strings(&["123", "132", "213", "231", "312", "321"])
        );
        assert_eq!(permutations("11"), strings(&["11"]));
        assert_eq!(
            tickets(&strings(&["12", "21", "33"]), true, 1000),
            Some(strings(&["12", "21", "33"]))
        );
        assert_eq!(
            tickets(&strings(&["12", "21"]), false, 1000),
            Some(strings(&["12", "21"]))
        );
    }

    #[test]
    fn test_permutation_limit() {
        // 10 distinct digits would be 3 628 800 tickets
        assert_eq!(permutations_bounded("0123456789", 1000), None);
        assert_eq!(tickets(&strings(&["0123456789"]), true, 1000), None);

        // 6 distinct digits: exactly 720
        assert_eq!(permutations_bounded("123456", 720).map(|p| p.len()), Some(720));
        assert_eq!(permutations_bounded("123456", 719), None);

        // Limit applies to the combined set, not per number
        assert_eq!(tickets(&strings(&["123", "456"]), true, 12).map(|t| t.len()), Some(12));
        assert_eq!(tickets(&strings(&["123", "456"]), true, 11), None);

        // Plain bet types are never capped
        assert!(tickets(&strings(&["0123456789"]), false, 0).is_some());
    }
}
