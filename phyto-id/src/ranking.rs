//! Top-K ranking of raw classifier scores
//!
//! Scores are ranked by descending value; equal scores keep ascending class
//! index order (stable sort) so identical input tensors always produce the
//! same ranking. NaN scores are never ranked.

use crate::types::{clamp_confidence, RawPrediction};
use std::cmp::Ordering;

/// Indices and scores of the `k` highest scores
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| !score.is_nan())
        .collect();

    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    indexed.truncate(k);
    indexed
}

/// Rank scores and attach class names, converting scores to percentages
///
/// An index with no entry in `class_names` is named `class_<index>`, which
/// will not match any catalog id.
pub fn rank_predictions(scores: &[f32], class_names: &[String], k: usize) -> Vec<RawPrediction> {
    top_k(scores, k)
        .into_iter()
        .map(|(class_index, score)| RawPrediction {
            class_index,
            class_id: class_names
                .get(class_index)
                .cloned()
                .unwrap_or_else(|| format!("class_{}", class_index)),
            confidence: clamp_confidence(score * 100.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("plant-{}", i)).collect()
    }

    #[test]
    fn test_top_k_descending() {
        let scores = [0.1, 0.5, 0.2, 0.9, 0.05];
        let ranked = top_k(&scores, 3);
        let indices: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![3, 1, 2]);
    }

    #[test]
    fn test_tie_broken_by_lower_index() {
        let mut scores = [0.01f32; 10];
        scores[3] = 0.4;
        scores[7] = 0.4;

        let ranked = top_k(&scores, 2);
        assert_eq!(ranked[0].0, 3, "Lower index must rank first on a tie");
        assert_eq!(ranked[1].0, 7);
    }

    #[test]
    fn test_k_larger_than_scores() {
        let ranked = top_k(&[0.3, 0.7], 5);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_nan_scores_skipped() {
        let ranked = top_k(&[f32::NAN, 0.2, 0.1], 3);
        let indices: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_rank_predictions_percentages() {
        let predictions = rank_predictions(&[0.25, 0.75], &names(2), 5);
        assert_eq!(predictions[0].class_id, "plant-1");
        assert_eq!(predictions[0].confidence, 75.0);
        assert_eq!(predictions[1].confidence, 25.0);
    }

    #[test]
    fn test_rank_predictions_missing_class_name() {
        let predictions = rank_predictions(&[0.1, 0.2, 0.9], &names(2), 1);
        assert_eq!(predictions[0].class_index, 2);
        assert_eq!(predictions[0].class_id, "class_2");
    }

    #[test]
    fn test_rank_predictions_clamps_logits() {
        let predictions = rank_predictions(&[3.5, -1.0], &names(2), 2);
        assert_eq!(predictions[0].confidence, 100.0);
        assert_eq!(predictions[1].confidence, 0.0);
    }
}
