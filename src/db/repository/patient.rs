use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Patient, PatientForm};

use crate::db::timestamp_now;

/// Coerce and insert a patient; returns the new patient id.
pub fn insert_patient(conn: &Connection, form: &PatientForm) -> Result<i64, DatabaseError> {
    let patient = form.parse()?;
    conn.execute(
        "INSERT INTO patients (name, age, gender, address, phone_number, email, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            patient.name,
            patient.age,
            patient.gender,
            patient.address,
            patient.phone_number,
            patient.email,
            timestamp_now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            "SELECT id, name, age, gender, address, phone_number, email, created_at
             FROM patients WHERE id = ?1",
            params![id],
            |row| {
                Ok(Patient {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    age: row.get(2)?,
                    gender: row.get(3)?,
                    address: row.get(4)?,
                    phone_number: row.get(5)?,
                    email: row.get(6)?,
                    created_at: row.get(7)?,
                })
            },
        )
        .optional()?;
    Ok(patient)
}
