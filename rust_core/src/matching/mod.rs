//! Approximate name matching
//!
//! Resolves free-text player and team names against a flat candidate list
//! using normalized Levenshtein similarity.

use strsim::levenshtein;

/// Minimum similarity for a player lookup to count as a match.
pub const PLAYER_MATCH_THRESHOLD: f64 = 0.7;

/// Team names are short and often abbreviated, so the bar is lower.
pub const TEAM_MATCH_THRESHOLD: f64 = 0.6;

/// Best candidate found by [`NameResolver::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch<'a, T> {
    pub name: &'a str,
    pub payload: &'a T,
    pub similarity: f64,
}

/// Similarity in `[0, 1]` between two names, case-insensitive.
///
/// `1 - distance / max(len)`, with lengths counted in characters. Two empty
/// strings have similarity 0 so that an empty query never matches.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

/// Fuzzy resolver over `(display name, payload)` pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameResolver {
    threshold: f64,
}

impl NameResolver {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn players() -> Self {
        Self::new(PLAYER_MATCH_THRESHOLD)
    }

    pub fn teams() -> Self {
        Self::new(TEAM_MATCH_THRESHOLD)
    }

    /// Candidate with the highest similarity strictly above the threshold.
    /// Ties keep the first candidate in input order. `None` means not found.
    pub fn resolve<'a, T>(&self, query: &str, candidates: &'a [(String, T)]) -> Option<NameMatch<'a, T>> {
        let mut best: Option<NameMatch<'a, T>> = None;

        for (name, payload) in candidates {
            let score = similarity(query, name);
            if score <= self.threshold {
                continue;
            }
            let better = match &best {
                Some(current) => score > current.similarity,
                None => true,
            };
            if better {
                best = Some(NameMatch {
                    name: name.as_str(),
                    payload,
                    similarity: score,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> Vec<(String, u64)> {
        vec![
            ("Patrick Mahomes".to_string(), 1),
            ("Travis Kelce".to_string(), 2),
            ("Christian McCaffrey".to_string(), 3),
            ("Justin Jefferson".to_string(), 4),
        ]
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let candidates = players();
        let found = NameResolver::players()
            .resolve("travis kelce", &candidates)
            .unwrap();
        assert_eq!(found.name, "Travis Kelce");
        assert_eq!(*found.payload, 2);
        assert!((found.similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_typo_still_matches() {
        let candidates = players();
        let found = NameResolver::players()
            .resolve("Christian McCafrey", &candidates)
            .unwrap();
        assert_eq!(*found.payload, 3);
    }

    #[test]
    fn test_below_threshold_is_not_found() {
        let candidates = players();
        assert!(NameResolver::players().resolve("Tom Brady", &candidates).is_none());
    }

    #[test]
    fn test_empty_inputs_not_found() {
        let empty: Vec<(String, u64)> = Vec::new();
        assert!(NameResolver::players().resolve("", &empty).is_none());
        assert!(NameResolver::players().resolve("Travis Kelce", &empty).is_none());
        assert!(NameResolver::players().resolve("", &players()).is_none());
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let candidates = vec![
            ("Josh Allen".to_string(), "QB"),
            ("Josh Allen".to_string(), "LB"),
        ];
        let found = NameResolver::players().resolve("Josh Allen", &candidates).unwrap();
        assert_eq!(*found.payload, "QB");
    }

    #[test]
    fn test_threshold_is_strict() {
        // one substitution over four chars -> similarity exactly 0.75
        let candidates = vec![("abcx".to_string(), ())];
        assert_eq!(similarity("abcd", "abcx"), 0.75);
        assert!(NameResolver::new(0.75).resolve("abcd", &candidates).is_none());
        assert!(NameResolver::new(0.7).resolve("abcd", &candidates).is_some());
    }

    #[test]
    fn test_team_threshold_accepts_partial_name() {
        let teams = vec![
            ("Coach Dad".to_string(), 2u32),
            ("UGF Pandas".to_string(), 4u32),
            ("Beyond Cursed".to_string(), 5u32),
        ];
        let found = NameResolver::teams().resolve("ugf panda", &teams).unwrap();
        assert_eq!(*found.payload, 4);
    }
}
