//! Numeric-aware string ordering for invoice numbers.
//!
//! Runs of ASCII digits compare by numeric value, everything else compares
//! case-insensitively, so `"INV-9"` sorts before `"INV-10"` and `"inv-2"` sits next to
//! `"INV-2"`. Ties fall back to plain byte order to keep the ordering total.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                out.push(make_chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(prev) = in_digits {
        out.push(make_chunk(&s[start..], prev));
    }
    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(s)
    } else {
        Chunk::Text(s)
    }
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    let a_lower = a.chars().flat_map(char::to_lowercase);
    let b_lower = b.chars().flat_map(char::to_lowercase);
    a_lower.cmp(b_lower)
}

/// Compares two strings the way a person reads them.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => cmp_text(x, y),
            // Digits sort before letters, as in a locale-aware collation.
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sorted(input: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        v.sort_by(|a, b| natural_cmp(a, b));
        v
    }

    #[test]
    fn numbers_sort_by_value() {
        assert_eq!(
            sorted(&["INV-2", "INV-10", "INV-1"]),
            vec!["INV-1", "INV-2", "INV-10"]
        );
        assert_eq!(sorted(&["10", "9", "100"]), vec!["9", "10", "100"]);
    }

    #[test]
    fn case_does_not_split_groups() {
        assert_eq!(
            sorted(&["inv-3", "INV-2", "Inv-1"]),
            vec!["Inv-1", "INV-2", "inv-3"]
        );
    }

    #[test]
    fn leading_zeros_compare_by_value() {
        assert_eq!(natural_cmp("A007", "A7"), "A007".cmp("A7"));
        assert_eq!(natural_cmp("A008", "A10"), Ordering::Less);
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(natural_cmp("INV", "INV-1"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
        assert_eq!(natural_cmp("", ""), Ordering::Equal);
    }

    proptest! {
        #[test]
        fn ordering_is_antisymmetric(a in "[A-Za-z0-9-]{0,8}", b in "[A-Za-z0-9-]{0,8}") {
            prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
        }

        #[test]
        fn equal_only_for_identical(a in "[A-Za-z0-9-]{0,8}", b in "[A-Za-z0-9-]{0,8}") {
            prop_assert_eq!(natural_cmp(&a, &b) == Ordering::Equal, a == b);
        }

        #[test]
        fn plain_numbers_follow_integer_order(x in 0u32..100_000, y in 0u32..100_000) {
            prop_assert_eq!(natural_cmp(&x.to_string(), &y.to_string()), x.cmp(&y));
        }
    }
}
