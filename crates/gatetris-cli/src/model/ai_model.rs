use std::{collections::BTreeMap, path::Path};

use chrono::{DateTime, Utc};
use gatetris_evaluator::scoring::{BoardFeature, Weights};
use serde::{Deserialize, Serialize};

use crate::util;

/// A trained weight set, keyed by feature id.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct AiModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub final_fitness: u64,
    pub weights: BTreeMap<String, f64>,
}

impl AiModel {
    pub(crate) fn new(name: String, final_fitness: u64, weights: &Weights) -> Self {
        Self {
            name,
            trained_at: Utc::now(),
            final_fitness,
            weights: BoardFeature::ALL
                .iter()
                .map(|feature| (feature.id().to_owned(), weights[*feature]))
                .collect(),
        }
    }

    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        util::read_json("AI model", path)
    }

    pub(crate) fn to_weights(&self) -> anyhow::Result<Weights> {
        let mut weights = Weights::new([0.0; BoardFeature::LEN]);
        for (feature_id, weight) in &self.weights {
            let feature = BoardFeature::from_id(feature_id)
                .ok_or_else(|| anyhow::anyhow!("Feature ID {feature_id} in model not found"))?;
            weights[feature] = *weight;
        }
        let missing: Vec<_> = BoardFeature::ALL
            .into_iter()
            .map(BoardFeature::id)
            .filter(|id| !self.weights.contains_key(*id))
            .collect();
        anyhow::ensure!(
            missing.is_empty(),
            "Model is missing weights for: {}",
            missing.join(", ")
        );
        Ok(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_round_trip_through_json() {
        let weights = Weights::new([0.5, -1.0, -2.0, 0.0, -7.25, -3.0, -1.5, 4.0]);
        let model = AiModel::new("test".to_owned(), 42, &weights);
        let json = serde_json::to_string(&model).unwrap();
        let loaded: AiModel = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.final_fitness, 42);
        assert_eq!(loaded.weights["holes"], -7.25);
        assert_eq!(loaded.to_weights().unwrap(), weights);
    }

    #[test]
    fn test_unknown_feature_is_rejected() {
        let mut model = AiModel::new("test".to_owned(), 0, &Weights::FIXED);
        model.weights.insert("bumpiness".to_owned(), 1.0);
        let err = model.to_weights().unwrap_err();
        assert!(err.to_string().contains("bumpiness"));
    }

    #[test]
    fn test_missing_feature_is_rejected() {
        let mut model = AiModel::new("test".to_owned(), 0, &Weights::FIXED);
        model.weights.remove("wells");
        let err = model.to_weights().unwrap_err();
        assert!(err.to_string().contains("wells"));
    }
}
