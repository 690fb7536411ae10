// 🎯 Fuzzy Matcher - Pick catalog labels by token overlap
// Score = sum of matched token lengths, +1 for every match after the first.
// Ties go to the shorter label; a full tie returns every tied id.

use serde::{Deserialize, Serialize};

// ============================================================================
// CANDIDATES & RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Opaque catalog id
    pub id: String,

    /// Menu text the attributes are scored against
    pub label: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Candidate {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Build candidates from (id, label) pairs, keeping their order
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Vec<Candidate> {
        pairs
            .iter()
            .map(|(id, label)| Candidate::new(*id, *label))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Ids tied for the best score, in candidate order
    pub ids: Vec<String>,

    pub score: usize,

    /// Character length of the winning label(s)
    pub label_len: usize,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_ambiguous(&self) -> bool {
        self.ids.len() > 1
    }

    /// The winning id when exactly one candidate won
    pub fn unique(&self) -> Option<&str> {
        match self.ids.as_slice() {
            [id] => Some(id.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// MATCHER
// ============================================================================

#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    /// Label words that also satisfy a literal "2WD" token
    two_wheel_drive_aliases: Vec<String>,
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        FuzzyMatcher {
            two_wheel_drive_aliases: vec!["FWD".to_string(), "RWD".to_string()],
        }
    }

    /// Score one label against the attribute tokens. Zero means no overlap.
    pub fn score(&self, attributes: &[String], label: &str) -> usize {
        let label_upper = label.to_uppercase();
        let mut score = 0;
        let mut matched_any = false;

        for token in attributes.iter().filter(|token| !token.is_empty()) {
            let hit = label_upper.contains(&token.to_uppercase())
                || (token == "2WD"
                    && self
                        .two_wheel_drive_aliases
                        .iter()
                        .any(|alias| label_upper.contains(alias.as_str())));

            if hit {
                score += token.chars().count();
                if matched_any {
                    score += 1;
                }
                matched_any = true;
            }
        }

        score
    }

    /// Best-scoring candidates. With `must_contain`, labels lacking that
    /// text (case-insensitive) are not considered at all.
    pub fn best(
        &self,
        must_contain: Option<&str>,
        attributes: &[String],
        candidates: &[Candidate],
    ) -> MatchResult {
        let required = must_contain.map(str::to_uppercase);
        let mut result = MatchResult::default();

        for candidate in candidates {
            if let Some(required) = &required {
                if !candidate.label.to_uppercase().contains(required.as_str()) {
                    continue;
                }
            }

            let score = self.score(attributes, &candidate.label);
            if score == 0 {
                continue;
            }

            let label_len = candidate.label.chars().count();
            if score > result.score || (score == result.score && label_len < result.label_len) {
                result = MatchResult {
                    ids: vec![candidate.id.clone()],
                    score,
                    label_len,
                };
            } else if score == result.score && label_len == result.label_len {
                result.ids.push(candidate.id.clone());
            }
        }

        if result.is_ambiguous() {
            log::debug!(
                "{} candidates tied at score {} (label length {}): {:?}",
                result.ids.len(),
                result.score,
                result.label_len,
                result.ids
            );
        }

        result
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Score one label with the default matcher
pub fn score_label(attributes: &[String], label: &str) -> usize {
    FuzzyMatcher::default().score(attributes, label)
}

/// Best candidates with the default matcher
pub fn fuzzy_match(
    must_contain: Option<&str>,
    attributes: &[String],
    candidates: &[Candidate],
) -> MatchResult {
    FuzzyMatcher::default().best(must_contain, attributes, candidates)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_single_token_scores_its_length() {
        assert_eq!(score_label(&tokens(&["Civic"]), "Civic EX"), 5);
        assert_eq!(score_label(&tokens(&["ex"]), "Civic EX"), 2);
    }

    #[test]
    fn test_later_matches_add_one() {
        // 5 + (3 + 1)
        assert_eq!(score_label(&tokens(&["Civic", "Nope", "AWD"]), "Civic AWD"), 9);
        // Unmatched first token does not consume the first-match slot
        assert_eq!(score_label(&tokens(&["Nope", "Civic"]), "Civic"), 5);
    }

    #[test]
    fn test_two_wheel_drive_generalization() {
        assert_eq!(score_label(&tokens(&["2WD"]), "Focus FWD"), 3);
        assert_eq!(score_label(&tokens(&["2WD"]), "Ranger RWD"), 3);
        assert_eq!(score_label(&tokens(&["2WD"]), "Ranger 4WD"), 0);
        // Only the literal token generalizes
        assert_eq!(score_label(&tokens(&["2wd"]), "Focus FWD"), 0);
    }

    #[test]
    fn test_empty_tokens_are_ignored() {
        assert_eq!(score_label(&tokens(&["", "Civic", ""]), "Civic"), 5);
    }

    #[test]
    fn test_focus_shorter_label_wins() {
        let candidates = Candidate::from_pairs(&[
            ("29291", "Focus FWD Auto 4-spd"),
            ("29292", "Focus FWD Man 5-spd"),
        ]);
        let result = fuzzy_match(None, &tokens(&["Focus", "FWD", "2WD"]), &candidates);
        assert_eq!(result.ids, vec!["29292"]);
        assert_eq!(result.score, 13);
        assert_eq!(result.label_len, 19);
        assert_eq!(result.unique(), Some("29292"));
    }

    #[test]
    fn test_full_tie_keeps_candidate_order() {
        let candidates = Candidate::from_pairs(&[
            ("b", "Focus FWD Auto"),
            ("a", "Focus FWD Manu"),
            ("c", "Focus"),
        ]);
        let result = fuzzy_match(None, &tokens(&["Focus", "FWD"]), &candidates);
        assert_eq!(result.ids, vec!["b", "a"]);
        assert!(result.is_ambiguous());
        assert_eq!(result.unique(), None);
    }

    #[test]
    fn test_no_overlap_is_empty() {
        let candidates = Candidate::from_pairs(&[("1", "Accord"), ("2", "Pilot")]);
        let result = fuzzy_match(None, &tokens(&["Civic", "AWD"]), &candidates);
        assert!(result.is_empty());
        assert_eq!(result.score, 0);

        assert!(fuzzy_match(None, &tokens(&["Civic"]), &[]).is_empty());
        assert!(fuzzy_match(None, &[], &candidates).is_empty());
    }

    #[test]
    fn test_must_contain_filters_labels() {
        let candidates = Candidate::from_pairs(&[
            ("1", "Sport AWD Turbo Wagon"),
            ("2", "Outback AWD"),
        ]);
        let attrs = tokens(&["AWD", "Turbo", "Wagon"]);

        let open = fuzzy_match(None, &attrs, &candidates);
        assert_eq!(open.ids, vec!["1"]);

        let scoped = fuzzy_match(Some("outback"), &attrs, &candidates);
        assert_eq!(scoped.ids, vec!["2"]);

        let none = fuzzy_match(Some("Legacy"), &attrs, &candidates);
        assert!(none.is_empty());
    }

    #[test]
    fn test_length_counts_characters() {
        // "Série" has 5 characters but 6 bytes
        let candidates = Candidate::from_pairs(&[("1", "Série X"), ("2", "Series X")]);
        let result = fuzzy_match(None, &tokens(&["X"]), &candidates);
        assert_eq!(result.ids, vec!["1"]);
        assert_eq!(result.label_len, 7);
    }

    #[test]
    fn test_result_serializes() {
        let result = MatchResult {
            ids: vec!["42".to_string()],
            score: 5,
            label_len: 8,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"ids":["42"],"score":5,"label_len":8}"#);
    }
}
