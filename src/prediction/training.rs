//! Offline training from the public CSV datasets.
//!
//! Loads the dataset columns a disease model needs, imputes missing values
//! with column medians, standardizes, fits an L2-regularized logistic
//! regression on a seeded 80/20 split, and reports held-out accuracy.

use std::io::Read;
use std::path::Path;

use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::Disease;

use super::classifier::{
    DiseaseClassifier, ModelError, StandardScaler, TrainingMetadata, MODEL_FORMAT_VERSION,
};
use super::features::{parkinsons_feature_names, DIABETES_FEATURES, HEART_DISEASE_FEATURES};

pub const DEFAULT_SEED: u64 = 42;
const TEST_FRACTION: f64 = 0.2;
const MAX_ITERATIONS: u64 = 150;

/// Column layout of a training CSV.
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    pub features: &'static [&'static str],
    pub label: &'static str,
    /// Columns where a literal 0 means "not measured".
    pub zero_as_missing: &'static [&'static str],
}

impl DatasetLayout {
    pub fn for_disease(disease: Disease) -> Self {
        match disease {
            Disease::Diabetes => DatasetLayout {
                features: DIABETES_FEATURES,
                label: "Outcome",
                zero_as_missing: &["Glucose", "BloodPressure", "SkinThickness", "Insulin", "BMI"],
            },
            Disease::HeartDisease => DatasetLayout {
                features: HEART_DISEASE_FEATURES,
                label: "DEATH_EVENT",
                zero_as_missing: &[],
            },
            // The `name` column is simply never selected.
            Disease::Parkinsons => DatasetLayout {
                features: parkinsons_feature_names(),
                label: "status",
                zero_as_missing: &[],
            },
        }
    }
}

/// Feature rows (NaN = missing) with boolean labels.
#[derive(Debug, Clone)]
pub struct LabelledData {
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<bool>,
}

/// Read the layout's columns from CSV; rows without a usable label are skipped.
pub fn load_dataset<R: Read>(layout: &DatasetLayout, reader: R) -> Result<LabelledData, ModelError> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv.headers()?.clone();

    let index_of = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ModelError::Dataset(format!("missing column '{name}'")))
    };
    let feature_idx = layout
        .features
        .iter()
        .map(|f| index_of(*f))
        .collect::<Result<Vec<_>, _>>()?;
    let label_idx = index_of(layout.label)?;
    let zero_missing: Vec<bool> = layout
        .features
        .iter()
        .map(|f| layout.zero_as_missing.contains(f))
        .collect();

    let mut rows = Vec::new();
    let mut labels = Vec::new();
    let mut skipped = 0usize;
    for record in csv.records() {
        let record = record?;
        let label = match record.get(label_idx).and_then(|v| v.parse::<f64>().ok()) {
            Some(v) => v != 0.0,
            None => {
                skipped += 1;
                continue;
            }
        };
        let row = feature_idx
            .iter()
            .zip(&zero_missing)
            .map(|(&i, &zero_is_missing)| {
                match record.get(i).and_then(|v| v.parse::<f64>().ok()) {
                    Some(v) if v.is_finite() && !(zero_is_missing && v == 0.0) => v,
                    _ => f64::NAN,
                }
            })
            .collect();
        rows.push(row);
        labels.push(label);
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Rows without a usable label were skipped");
    }
    if rows.is_empty() {
        return Err(ModelError::Dataset("dataset has no rows".into()));
    }
    Ok(LabelledData { rows, labels })
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Replace NaN cells with their column median (0 for an all-missing column).
pub fn impute_medians(rows: &mut [Vec<f64>]) -> Vec<f64> {
    let width = rows.first().map(|r| r.len()).unwrap_or(0);
    let medians: Vec<f64> = (0..width)
        .map(|c| {
            let mut present: Vec<f64> = rows.iter().map(|r| r[c]).filter(|v| !v.is_nan()).collect();
            median(&mut present).unwrap_or(0.0)
        })
        .collect();

    for row in rows.iter_mut() {
        for (cell, m) in row.iter_mut().zip(&medians) {
            if cell.is_nan() {
                *cell = *m;
            }
        }
    }
    medians
}

fn to_matrix(rows: &[Vec<f64>]) -> Result<Array2<f64>, ModelError> {
    let width = rows.first().map(|r| r.len()).unwrap_or(0);
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), width), flat)
        .map_err(|e| ModelError::Dataset(e.to_string()))
}

/// Fit a classifier on already-loaded data.
pub fn train_classifier(
    disease: Disease,
    layout: &DatasetLayout,
    mut data: LabelledData,
    source: &str,
    seed: u64,
) -> Result<DiseaseClassifier, ModelError> {
    impute_medians(&mut data.rows);

    let mut order: Vec<usize> = (0..data.rows.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let test_len = ((data.rows.len() as f64) * TEST_FRACTION).round() as usize;
    let (test_idx, train_idx) = order.split_at(test_len);
    if train_idx.is_empty() {
        return Err(ModelError::Dataset("not enough rows to train".into()));
    }

    let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<bool>) {
        (
            idx.iter().map(|&i| data.rows[i].clone()).collect(),
            idx.iter().map(|&i| data.labels[i]).collect(),
        )
    };
    let (train_rows, train_labels) = pick(train_idx);
    let (test_rows, test_labels) = pick(test_idx);

    let scaler = StandardScaler::fit(&train_rows)?;
    let scaled_train: Vec<Vec<f64>> = train_rows.iter().map(|r| scaler.transform(r)).collect();

    let x = to_matrix(&scaled_train)?;
    let y = Array1::from(train_labels.clone());
    let dataset = Dataset::new(x.clone(), y);
    let fitted = LogisticRegression::default()
        .max_iterations(MAX_ITERATIONS)
        .fit(&dataset)
        .map_err(|e| ModelError::Training(e.to_string()))?;

    let mut coefficients = fitted.params().to_vec();
    let mut intercept = fitted.intercept();

    // Orient the weights so that the sigmoid scores the `true` class,
    // whichever label the estimator treated as positive.
    let estimator_labels = fitted.predict(&x);
    let agree = scaled_train
        .iter()
        .zip(estimator_labels.iter())
        .filter(|(row, label)| {
            let z: f64 = intercept
                + coefficients
                    .iter()
                    .zip(row.iter())
                    .map(|(w, v)| w * v)
                    .sum::<f64>();
            (z >= 0.0) == **label
        })
        .count();
    if agree * 2 < scaled_train.len() {
        coefficients.iter_mut().for_each(|w| *w = -*w);
        intercept = -intercept;
    }

    let mut classifier = DiseaseClassifier {
        format_version: MODEL_FORMAT_VERSION,
        disease,
        feature_names: layout.features.iter().map(|f| f.to_string()).collect(),
        scaler,
        coefficients,
        intercept,
        threshold: 0.5,
        metadata: TrainingMetadata {
            trained_at: crate::db::timestamp_now(),
            source: source.to_string(),
            train_rows: train_idx.len(),
            test_rows: test_idx.len(),
            test_accuracy: 0.0,
            seed,
        },
    };
    classifier.validate()?;

    let train_accuracy = accuracy(&classifier, &train_rows, &train_labels)?;
    let test_accuracy = if test_rows.is_empty() {
        train_accuracy
    } else {
        accuracy(&classifier, &test_rows, &test_labels)?
    };
    classifier.metadata.test_accuracy = test_accuracy;

    tracing::info!(
        disease = disease.as_str(),
        train_rows = train_idx.len(),
        test_rows = test_idx.len(),
        train_accuracy,
        test_accuracy,
        "Model trained"
    );

    Ok(classifier)
}

fn accuracy(model: &DiseaseClassifier, rows: &[Vec<f64>], labels: &[bool]) -> Result<f64, ModelError> {
    if rows.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for (row, &label) in rows.iter().zip(labels) {
        if (model.predict(row)? == 1) == label {
            correct += 1;
        }
    }
    Ok(correct as f64 / rows.len() as f64)
}

/// Train from a CSV file and write the model file.
pub fn train_from_csv(
    disease: Disease,
    csv_path: &Path,
    out_path: &Path,
    seed: u64,
) -> Result<DiseaseClassifier, ModelError> {
    let layout = DatasetLayout::for_disease(disease);
    let file = std::fs::File::open(csv_path).map_err(|source| ModelError::Io {
        path: csv_path.display().to_string(),
        source,
    })?;
    let data = load_dataset(&layout, file)?;
    tracing::info!(
        disease = disease.as_str(),
        rows = data.rows.len(),
        path = %csv_path.display(),
        "Dataset loaded"
    );

    let classifier = train_classifier(disease, &layout, data, &csv_path.display().to_string(), seed)?;
    classifier.save(out_path)?;
    tracing::info!(path = %out_path.display(), "Model written");
    Ok(classifier)
}
