//! Parkinson's voice measurements (UCI Oxford dataset layout).
//!
//! The 22 measurements are always handled in dataset column order; the
//! struct, the form, the table columns and the feature vector are all
//! generated from the single list below so they cannot drift apart.

use serde::{Deserialize, Serialize};

use super::form::{parse_int, parse_real, FormError, LabelledValues, NewRecord, RawField};

macro_rules! voice_measurements {
    ($($field:ident => $label:literal),+ $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct ParkinsonsMeasurements {
            $(pub $field: f64),+
        }

        #[derive(Debug, Clone, Default, Serialize, Deserialize)]
        #[serde(default)]
        pub struct ParkinsonsForm {
            pub patient_id: RawField,
            $(pub $field: RawField),+
        }

        /// Table columns in feature order.
        pub const PARKINSONS_COLUMNS: &[&str] = &[$(stringify!($field)),+];

        /// Dataset headers in feature order.
        pub const PARKINSONS_LABELS: &[&str] = &[$($label),+];

        impl ParkinsonsMeasurements {
            pub fn values(&self) -> Vec<f64> {
                vec![$(self.$field),+]
            }

            /// Rebuild from values in column order; `None` on a length mismatch.
            pub fn from_values(values: &[f64]) -> Option<Self> {
                if values.len() != PARKINSONS_COLUMNS.len() {
                    return None;
                }
                let mut it = values.iter().copied();
                Some(Self {
                    $($field: it.next()?),+
                })
            }
        }

        impl ParkinsonsForm {
            pub fn parse(&self) -> Result<NewRecord<ParkinsonsMeasurements>, FormError> {
                Ok(NewRecord {
                    patient_id: parse_int("patient_id", &self.patient_id)?,
                    measurements: ParkinsonsMeasurements {
                        $($field: parse_real(stringify!($field), &self.$field)?),+
                    },
                })
            }
        }
    };
}

voice_measurements! {
    fo => "MDVP:Fo(Hz)",
    fhi => "MDVP:Fhi(Hz)",
    flo => "MDVP:Flo(Hz)",
    jitter_percent => "MDVP:Jitter(%)",
    jitter_abs => "MDVP:Jitter(Abs)",
    rap => "MDVP:RAP",
    ppq => "MDVP:PPQ",
    ddp => "Jitter:DDP",
    shimmer => "MDVP:Shimmer",
    shimmer_db => "MDVP:Shimmer(dB)",
    apq3 => "Shimmer:APQ3",
    apq5 => "Shimmer:APQ5",
    apq => "MDVP:APQ",
    dda => "Shimmer:DDA",
    nhr => "NHR",
    hnr => "HNR",
    rpde => "RPDE",
    dfa => "DFA",
    spread1 => "spread1",
    spread2 => "spread2",
    d2 => "D2",
    ppe => "PPE",
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkinsonsRecord {
    pub id: i64,
    pub patient_id: i64,
    #[serde(flatten)]
    pub measurements: ParkinsonsMeasurements,
    pub created_at: Option<String>,
}

impl LabelledValues for ParkinsonsMeasurements {
    fn labelled_values(&self) -> Vec<(&'static str, String)> {
        PARKINSONS_LABELS
            .iter()
            .copied()
            .zip(self.values().into_iter().map(|v| v.to_string()))
            .collect()
    }
}
