use airsoft_env::{
    action::{ACTION_SIZE, ActionVector},
    observation::Observation,
    policy::Policy,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("linear policy over {input_size} inputs needs {expected} weights, got {actual}")]
pub struct PolicyShapeError {
    input_size: usize,
    expected: usize,
    actual: usize,
}

/// A single-layer policy: `action = tanh(W · observation + b)`.
///
/// Weights are stored row-major, one row of `input_size + 1` values per
/// action field, the bias last.
///
/// ```
/// use airsoft_training::policy::LinearPolicy;
///
/// let policy = LinearPolicy::zeros(4);
/// assert_eq!(policy.weights().len(), LinearPolicy::parameter_count(4));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLinearPolicy")]
pub struct LinearPolicy {
    input_size: usize,
    weights: Vec<f32>,
}

#[derive(Deserialize)]
struct RawLinearPolicy {
    input_size: usize,
    weights: Vec<f32>,
}

impl TryFrom<RawLinearPolicy> for LinearPolicy {
    type Error = PolicyShapeError;

    fn try_from(raw: RawLinearPolicy) -> Result<Self, Self::Error> {
        Self::new(raw.input_size, raw.weights)
    }
}

impl LinearPolicy {
    /// Number of weights needed for `input_size` observation values.
    #[must_use]
    pub const fn parameter_count(input_size: usize) -> usize {
        ACTION_SIZE * (input_size + 1)
    }

    pub fn new(input_size: usize, weights: Vec<f32>) -> Result<Self, PolicyShapeError> {
        let expected = Self::parameter_count(input_size);
        if weights.len() != expected {
            return Err(PolicyShapeError {
                input_size,
                expected,
                actual: weights.len(),
            });
        }
        Ok(Self {
            input_size,
            weights,
        })
    }

    pub(crate) fn with_weights(input_size: usize, weights: Vec<f32>) -> Self {
        debug_assert_eq!(weights.len(), Self::parameter_count(input_size));
        Self {
            input_size,
            weights,
        }
    }

    /// A policy whose every output is zero, so it never opens a gate.
    #[must_use]
    pub fn zeros(input_size: usize) -> Self {
        Self {
            input_size,
            weights: vec![0.0; Self::parameter_count(input_size)],
        }
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

impl Policy for LinearPolicy {
    fn predict(&self, observation: &Observation) -> ActionVector {
        let inputs = observation.as_slice();
        assert_eq!(
            inputs.len(),
            self.input_size,
            "observation size does not match policy input size"
        );

        let mut outputs = [0.0; ACTION_SIZE];
        let rows = self.weights.chunks_exact(self.input_size + 1);
        for (output, row) in outputs.iter_mut().zip(rows) {
            let (weights, bias) = row.split_at(self.input_size);
            let sum = weights.iter().zip(inputs).map(|(w, x)| w * x).sum::<f32>() + bias[0];
            *output = sum.tanh();
        }
        ActionVector::new_lossy(outputs)
    }
}

#[cfg(test)]
mod tests {
    use airsoft_engine::Arena;
    use airsoft_env::{
        action::field,
        observation::{HEADING_OBSERVATION_SIZE, ObservationLayout, encode},
    };

    use super::*;

    #[test]
    fn test_zeros_keeps_gates_closed() {
        let policy = LinearPolicy::zeros(HEADING_OBSERVATION_SIZE);
        let observation = encode(&Arena::default(), 0, ObservationLayout::Heading);
        let action = policy.predict(&observation);
        assert_eq!(action, ActionVector::IDLE);
    }

    #[test]
    fn test_bias_drives_output() {
        let input_size = HEADING_OBSERVATION_SIZE;
        let mut weights = vec![0.0; LinearPolicy::parameter_count(input_size)];
        // bias of the fire row
        weights[field::FIRE * (input_size + 1) + input_size] = 2.0;
        // a huge weight elsewhere still saturates within [-1, 1]
        weights[0] = 1000.0;
        let policy = LinearPolicy::new(input_size, weights).unwrap();

        let observation = encode(&Arena::default(), 0, ObservationLayout::Heading);
        let action = policy.predict(&observation);
        assert!(action.is_gate_open(field::FIRE));
        assert!((action.values()[field::FIRE] - 2.0_f32.tanh()).abs() < 1e-6);
        assert!(action.values().iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_shape_is_validated() {
        let err = LinearPolicy::new(3, vec![0.0; 10]).unwrap_err();
        assert_eq!(err.to_string(), "linear policy over 3 inputs needs 48 weights, got 10");
    }

    #[test]
    fn test_deserialize_rejects_wrong_shape() {
        let policy = LinearPolicy::zeros(2);
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(serde_json::from_str::<LinearPolicy>(&json).unwrap(), policy);

        let bad = r#"{ "input_size": 2, "weights": [0.0] }"#;
        assert!(serde_json::from_str::<LinearPolicy>(bad).is_err());
    }
}
