use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{DiabetesForm, DiabetesMeasurements, DiabetesRecord};

use crate::db::timestamp_now;

pub fn insert_diabetes_record(conn: &Connection, form: &DiabetesForm) -> Result<i64, DatabaseError> {
    let record = form.parse()?;
    let m = &record.measurements;
    conn.execute(
        "INSERT INTO diabetes_data (patient_id, pregnancies, glucose, blood_pressure,
                                    skin_thickness, insulin, bmi, diabetes_pedigree, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.patient_id,
            m.pregnancies,
            m.glucose,
            m.blood_pressure,
            m.skin_thickness,
            m.insulin,
            m.bmi,
            m.diabetes_pedigree,
            timestamp_now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Earliest diabetes record for a patient.
pub fn get_diabetes_record(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<DiabetesRecord>, DatabaseError> {
    let record = conn
        .query_row(
            "SELECT id, patient_id, pregnancies, glucose, blood_pressure, skin_thickness,
                    insulin, bmi, diabetes_pedigree, created_at
             FROM diabetes_data WHERE patient_id = ?1
             ORDER BY id ASC LIMIT 1",
            params![patient_id],
            |row| {
                Ok(DiabetesRecord {
                    id: row.get(0)?,
                    patient_id: row.get(1)?,
                    measurements: DiabetesMeasurements {
                        pregnancies: row.get(2)?,
                        glucose: row.get(3)?,
                        blood_pressure: row.get(4)?,
                        skin_thickness: row.get(5)?,
                        insulin: row.get(6)?,
                        bmi: row.get(7)?,
                        diabetes_pedigree: row.get(8)?,
                    },
                    created_at: row.get(9)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}
