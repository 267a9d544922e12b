use serde::{Deserialize, Serialize};

use super::form::{optional_text, parse_int, required_text, FormError, RawField};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<String>,
}

impl Patient {
    /// Sex encoding used by the heart failure dataset: 1 = male, 0 otherwise.
    /// Encoding female as 1 would invert the sex column the models learned.
    pub fn sex_code(&self) -> i64 {
        match self.gender.as_deref() {
            Some(g) if g.trim().eq_ignore_ascii_case("male") => 1,
            _ => 0,
        }
    }
}

/// Patient Information form, as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientForm {
    pub name: RawField,
    pub age: RawField,
    pub gender: RawField,
    pub address: RawField,
    pub phone_number: RawField,
    pub email: RawField,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: i64,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl PatientForm {
    pub fn parse(&self) -> Result<NewPatient, FormError> {
        Ok(NewPatient {
            name: required_text("name", &self.name)?,
            age: parse_int("age", &self.age)?,
            gender: optional_text(&self.gender),
            address: optional_text(&self.address),
            phone_number: optional_text(&self.phone_number),
            email: optional_text(&self.email),
        })
    }
}
