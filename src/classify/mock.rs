//! Deterministic fallback predictions.
//!
//! Used when every hosted-model endpoint fails. Pure in
//! `(byte_len, user_id)`: identical inputs always yield the same class and
//! confidence, so repeated analysis of the same image by the same user is
//! reproducible while different images still spread across classes.

use std::collections::BTreeMap;

use super::diseases::DISEASE_CLASSES;
use crate::models::Prediction;

const CONFIDENCE_FLOOR: f64 = 0.70;
const CONFIDENCE_CEIL: f64 = 0.95;

/// Synthesize a plausible multi-class prediction from the image size and the
/// caller's user id.
///
/// The selection index is `(byte_len + user_id.len()) % 7` into the fixed
/// class table; a bounded jitter of roughly +-0.05 is applied to the selected
/// class's base confidence, clamped to [0.70, 0.95]. The remaining
/// probability mass is spread over the other classes in table order with
/// per-class clamping to [0.01, 0.15]; the last class absorbs whatever pool
/// is left (floored at 0.01). The resulting values intentionally need not
/// sum to exactly 1 after clamping; downstream consumers see these exact
/// allocations, so they are not normalized.
pub fn mock_prediction(byte_len: usize, user_id: &str) -> Prediction {
    let seed = byte_len + user_id.len();
    let selected_idx = seed % DISEASE_CLASSES.len();
    let selected = &DISEASE_CLASSES[selected_idx];

    let jitter = (seed % 100) as f64 / 1000.0 - 0.05;
    let confidence = (selected.base_confidence + jitter).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEIL);

    let mut all_probabilities = BTreeMap::new();
    let mut pool = 1.0 - confidence;
    let last = DISEASE_CLASSES.len() - 1;
    for (idx, class) in DISEASE_CLASSES.iter().enumerate() {
        if idx == selected_idx {
            all_probabilities.insert(class.code.to_string(), confidence);
        } else if idx == last {
            all_probabilities.insert(class.code.to_string(), pool.max(0.01));
        } else {
            let share = (pool / (DISEASE_CLASSES.len() - idx) as f64).clamp(0.01, 0.15);
            all_probabilities.insert(class.code.to_string(), share);
            pool -= share;
        }
    }

    Prediction {
        disease_code: selected.code.to_string(),
        disease_name: Some(selected.name.to_string()),
        confidence,
        all_probabilities,
        mocked: true,
    }
}

/// Round a [0, 1] probability to a percentage with two-decimal precision.
pub fn to_percentage(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example_selects_akiec_at_76_2() {
        // user "u1" (len 2) + 100 bytes -> seed 102 -> index 4 (akiec, 0.81),
        // jitter (102 % 100)/1000 - 0.05 = -0.048, confidence 0.762.
        let p = mock_prediction(100, "u1");
        assert_eq!(p.disease_code, "akiec");
        assert!((p.confidence - 0.762).abs() < 1e-9);
        assert_eq!(to_percentage(p.confidence), 76.2);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let a = mock_prediction(4321, "user-abc");
        let b = mock_prediction(4321, "user-abc");
        assert_eq!(a.disease_code, b.disease_code);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.all_probabilities, b.all_probabilities);
    }

    #[test]
    fn confidence_stays_in_bounds() {
        for byte_len in [0usize, 1, 99, 100, 1234, 98765, 10_000_000] {
            for user_id in ["", "u", "u1", "a-much-longer-user-identifier"] {
                let p = mock_prediction(byte_len, user_id);
                assert!(p.confidence >= CONFIDENCE_FLOOR, "{byte_len} {user_id}");
                assert!(p.confidence <= CONFIDENCE_CEIL, "{byte_len} {user_id}");
            }
        }
    }

    #[test]
    fn distribution_has_seven_clamped_entries() {
        for seed_len in 0..50usize {
            let p = mock_prediction(seed_len, "u1");
            assert_eq!(p.all_probabilities.len(), 7);
            for (code, prob) in &p.all_probabilities {
                assert!(
                    (0.01..=CONFIDENCE_CEIL).contains(prob),
                    "{code} out of range at seed_len {seed_len}: {prob}"
                );
            }
            // Selected class carries the final confidence.
            assert_eq!(p.all_probabilities[&p.disease_code], p.confidence);
        }
    }

    #[test]
    fn marked_as_mocked() {
        assert!(mock_prediction(10, "u").mocked);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(to_percentage(0.762), 76.2);
        assert_eq!(to_percentage(0.87654), 87.65);
        assert_eq!(to_percentage(1.0), 100.0);
    }
}
