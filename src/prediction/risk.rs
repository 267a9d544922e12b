use serde::{Deserialize, Serialize};

/// Probability bands shown next to each verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

pub const MEDIUM_RISK_THRESHOLD: f64 = 0.3;
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

impl RiskBand {
    /// Low below 0.3, Medium from 0.3 up to (excluding) 0.7, High from 0.7.
    pub fn from_probability(p: f64) -> Self {
        if p < MEDIUM_RISK_THRESHOLD {
            RiskBand::Low
        } else if p < HIGH_RISK_THRESHOLD {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low Risk",
            RiskBand::Medium => "Medium Risk",
            RiskBand::High => "High Risk",
        }
    }
}
