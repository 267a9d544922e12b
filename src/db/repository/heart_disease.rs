use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{HeartDiseaseForm, HeartDiseaseMeasurements, HeartDiseaseRecord};

use crate::db::timestamp_now;

pub fn insert_heart_disease_record(
    conn: &Connection,
    form: &HeartDiseaseForm,
) -> Result<i64, DatabaseError> {
    let record = form.parse()?;
    let m = &record.measurements;
    conn.execute(
        "INSERT INTO heart_disease_data (patient_id, anaemia, creatine, diabetes, ejection_fraction,
                                         bp, platelets, serum_creatinine, serum_sodium, smoking,
                                         follow_up, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            record.patient_id,
            m.anaemia,
            m.creatine,
            m.diabetes,
            m.ejection_fraction,
            m.bp,
            m.platelets,
            m.serum_creatinine,
            m.serum_sodium,
            m.smoking,
            m.follow_up,
            timestamp_now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Earliest heart disease record for a patient.
pub fn get_heart_disease_record(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<HeartDiseaseRecord>, DatabaseError> {
    let record = conn
        .query_row(
            "SELECT id, patient_id, anaemia, creatine, diabetes, ejection_fraction, bp,
                    platelets, serum_creatinine, serum_sodium, smoking, follow_up, created_at
             FROM heart_disease_data WHERE patient_id = ?1
             ORDER BY id ASC LIMIT 1",
            params![patient_id],
            |row| {
                Ok(HeartDiseaseRecord {
                    id: row.get(0)?,
                    patient_id: row.get(1)?,
                    measurements: HeartDiseaseMeasurements {
                        anaemia: row.get(2)?,
                        creatine: row.get(3)?,
                        diabetes: row.get(4)?,
                        ejection_fraction: row.get(5)?,
                        bp: row.get(6)?,
                        platelets: row.get(7)?,
                        serum_creatinine: row.get(8)?,
                        serum_sodium: row.get(9)?,
                        smoking: row.get(10)?,
                        follow_up: row.get(11)?,
                    },
                    created_at: row.get(12)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_clinical_database;

    fn form() -> HeartDiseaseForm {
        HeartDiseaseForm {
            patient_id: "2".into(),
            anaemia: "yes".into(),
            creatine: "7861".into(),
            diabetes: "no".into(),
            ejection_fraction: "38".into(),
            bp: "no".into(),
            platelets: "263358.03".into(),
            serum_creatinine: "1.1".into(),
            serum_sodium: "136".into(),
            smoking: "yes".into(),
            follow_up: "6".into(),
        }
    }

    #[test]
    fn heart_disease_insert_and_retrieve() {
        let conn = open_memory_clinical_database().unwrap();
        let id = insert_heart_disease_record(&conn, &form()).unwrap();

        let record = get_heart_disease_record(&conn, 2).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(
            record.measurements,
            HeartDiseaseMeasurements {
                anaemia: 1,
                creatine: 7861,
                diabetes: 0,
                ejection_fraction: 38,
                bp: 0,
                platelets: 263358.03,
                serum_creatinine: 1.1,
                serum_sodium: 136,
                smoking: 1,
                follow_up: 6,
            }
        );
        assert!(record.created_at.is_some());
    }

    #[test]
    fn missing_record_is_none() {
        let conn = open_memory_clinical_database().unwrap();
        assert!(get_heart_disease_record(&conn, 2).unwrap().is_none());
    }
}
