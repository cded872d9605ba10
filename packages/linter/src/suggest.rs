//! Closest-name suggestions for misspelt tables, fields and functions.

/// Closest candidate by edit distance, if it is similar enough
/// (at most half the longer name's length away).
pub(crate) fn closest<'a, I>(input: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.to_lowercase();
    let mut best: Option<(&str, usize)> = None;

    for candidate in candidates {
        let distance = levenshtein(&input_lower, &candidate.to_lowercase());
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
    }

    best.and_then(|(name, distance)| {
        let max_len = input.chars().count().max(name.chars().count());
        (distance <= max_len / 2).then_some(name)
    })
}

pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("amount", "amount"), 0);
        assert_eq!(levenshtein("amount", "amont"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn test_closest() {
        let fields = ["amount", "country", "merchant_id"];

        assert_eq!(closest("ammount", fields), Some("amount"));
        assert_eq!(closest("Country", fields), Some("country"));
        assert_eq!(closest("zzzzzzzz", fields), None);
        assert_eq!(closest("x", std::iter::empty()), None);
    }
}
