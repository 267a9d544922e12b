//! Persisted disease classifier.
//!
//! A model file holds a standardizing scaler and a fitted logistic
//! regression as plain JSON. The scaler is applied to every input before
//! scoring, so callers pass raw feature vectors.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Disease;

/// Bumped whenever the JSON layout changes incompatibly.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model file I/O error for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Model file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported model format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("Model file holds a {found} model, expected {expected}")]
    WrongDisease { found: String, expected: String },

    #[error("Feature count mismatch: model expects {expected}, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("Malformed model: {0}")]
    Malformed(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Training failed: {0}")]
    Training(String),
}

/// Per-feature standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on row-major samples. Constant columns get a scale of 1.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ModelError> {
        let width = rows
            .first()
            .map(|r| r.len())
            .ok_or_else(|| ModelError::Dataset("no rows to fit scaler".into()))?;
        let n = rows.len() as f64;

        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x / n;
            }
        }

        let mut scale = vec![0.0; width];
        for row in rows {
            for ((s, x), m) in scale.iter_mut().zip(row).zip(&mean) {
                *s += (x - m).powi(2) / n;
            }
        }
        for s in scale.iter_mut() {
            *s = s.sqrt();
            if *s < f64::EPSILON {
                *s = 1.0;
            }
        }

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

/// How a model file came to be; informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub trained_at: String,
    pub source: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_accuracy: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseClassifier {
    pub format_version: u32,
    pub disease: Disease,
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Probability at or above which `predict` answers 1.
    pub threshold: f64,
    pub metadata: TrainingMetadata,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl DiseaseClassifier {
    pub fn feature_count(&self) -> usize {
        self.coefficients.len()
    }

    /// Positive-class probability for one raw feature vector.
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.feature_count() {
            return Err(ModelError::FeatureCount {
                expected: self.feature_count(),
                got: features.len(),
            });
        }
        let scaled = self.scaler.transform(features);
        let z: f64 = self.intercept
            + self
                .coefficients
                .iter()
                .zip(&scaled)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        Ok(sigmoid(z))
    }

    /// 0/1 class label.
    pub fn predict(&self, features: &[f64]) -> Result<u8, ModelError> {
        let p = self.predict_proba(features)?;
        Ok(u8::from(p >= self.threshold))
    }

    /// Internal consistency of a freshly loaded or trained model.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat {
                found: self.format_version,
                expected: MODEL_FORMAT_VERSION,
            });
        }
        let n = self.coefficients.len();
        if n == 0 {
            return Err(ModelError::Malformed("no coefficients".into()));
        }
        if self.scaler.mean.len() != n || self.scaler.scale.len() != n || self.feature_names.len() != n {
            return Err(ModelError::Malformed(format!(
                "{n} coefficients but scaler has {}/{} entries and {} feature names",
                self.scaler.mean.len(),
                self.scaler.scale.len(),
                self.feature_names.len()
            )));
        }
        if self.scaler.scale.iter().any(|s| *s == 0.0) {
            return Err(ModelError::Malformed("zero scale".into()));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| ModelError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load and validate a model file, checking it was trained for `disease`.
    pub fn load(path: &Path, disease: Disease) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model: DiseaseClassifier = serde_json::from_slice(&bytes)?;
        model.validate()?;
        if model.disease != disease {
            return Err(ModelError::WrongDisease {
                found: model.disease.as_str().into(),
                expected: disease.as_str().into(),
            });
        }
        Ok(model)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Hand-built model: positive when the single feature exceeds its mean.
    pub(crate) fn toy_model(disease: Disease, width: usize) -> DiseaseClassifier {
        let mut coefficients = vec![0.0; width];
        coefficients[0] = 4.0;
        DiseaseClassifier {
            format_version: MODEL_FORMAT_VERSION,
            disease,
            feature_names: (0..width).map(|i| format!("f{i}")).collect(),
            scaler: StandardScaler {
                mean: vec![10.0; width],
                scale: vec![2.0; width],
            },
            coefficients,
            intercept: 0.0,
            threshold: 0.5,
            metadata: TrainingMetadata {
                trained_at: "2024-01-01 00:00:00".into(),
                source: "toy".into(),
                train_rows: 0,
                test_rows: 0,
                test_accuracy: 1.0,
                seed: 0,
            },
        }
    }

    #[test]
    fn scaler_standardizes_columns() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.mean, vec![2.0, 5.0]);
        assert_eq!(scaler.scale, vec![1.0, 1.0]); // second column constant
        assert_eq!(scaler.transform(&[3.0, 7.0]), vec![1.0, 2.0]);
    }

    #[test]
    fn scaler_needs_rows() {
        assert!(StandardScaler::fit(&[]).is_err());
    }

    #[test]
    fn probability_follows_scaled_input() {
        let model = toy_model(Disease::Diabetes, 2);
        let at_mean = model.predict_proba(&[10.0, 0.0]).unwrap();
        assert!((at_mean - 0.5).abs() < 1e-12);

        let high = model.predict_proba(&[14.0, 0.0]).unwrap();
        assert!(high > 0.99);
        assert_eq!(model.predict(&[14.0, 0.0]).unwrap(), 1);
        assert_eq!(model.predict(&[6.0, 0.0]).unwrap(), 0);
    }

    #[test]
    fn feature_count_is_enforced() {
        let model = toy_model(Disease::Diabetes, 8);
        let err = model.predict_proba(&[1.0; 7]).unwrap_err();
        assert!(matches!(err, ModelError::FeatureCount { expected: 8, got: 7 }));
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("diabetes.json");
        let model = toy_model(Disease::Diabetes, 8);
        model.save(&path).unwrap();

        let loaded = DiseaseClassifier::load(&path, Disease::Diabetes).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn load_rejects_other_disease() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        toy_model(Disease::Parkinsons, 22).save(&path).unwrap();

        let err = DiseaseClassifier::load(&path, Disease::Diabetes).unwrap_err();
        assert!(matches!(err, ModelError::WrongDisease { .. }));
    }

    #[test]
    fn load_rejects_future_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        let mut model = toy_model(Disease::Diabetes, 8);
        model.format_version = 99;
        std::fs::write(&path, serde_json::to_string(&model).unwrap()).unwrap();

        let err = DiseaseClassifier::load(&path, Disease::Diabetes).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedFormat { found: 99, .. }));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = DiseaseClassifier::load(Path::new("/nonexistent/x.json"), Disease::Diabetes)
            .unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }

    #[test]
    fn validate_catches_length_mismatch() {
        let mut model = toy_model(Disease::Diabetes, 8);
        model.scaler.mean.pop();
        assert!(matches!(model.validate(), Err(ModelError::Malformed(_))));
    }
}
