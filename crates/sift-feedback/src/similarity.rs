//! Token-level similarity between a generated reply and its edit.

use std::collections::HashSet;

/// Jaccard similarity over lowercased alphanumeric tokens. Two empty texts are identical.
pub fn token_jaccard(a: &str, b: &str) -> f64 {
    let left = tokens(a);
    let right = tokens(b);
    let union = left.union(&right).count();
    if union == 0 {
        return 1.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_and_disjoint() {
        assert_eq!(token_jaccard("Your refund is on its way", "your refund, is on its way!"), 1.0);
        assert_eq!(token_jaccard("alpha beta", "gamma delta"), 0.0);
        assert_eq!(token_jaccard("", "  "), 1.0);
    }

    #[test]
    fn partial_overlap() {
        // {refund, issued, today} vs {refund, issued, tomorrow}: 2 / 4
        assert!((token_jaccard("refund issued today", "refund issued tomorrow") - 0.5).abs() < 1e-12);
    }
}
