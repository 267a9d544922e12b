use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{ParkinsonsForm, ParkinsonsMeasurements, ParkinsonsRecord, PARKINSONS_COLUMNS};

use crate::db::timestamp_now;

pub fn insert_parkinsons_record(
    conn: &Connection,
    form: &ParkinsonsForm,
) -> Result<i64, DatabaseError> {
    let record = form.parse()?;

    let columns = PARKINSONS_COLUMNS.join(", ");
    // patient_id + measurements + created_at
    let placeholders = (1..=PARKINSONS_COLUMNS.len() + 2)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO parkinsons_data (patient_id, {columns}, created_at) VALUES ({placeholders})"
    );

    let mut values: Vec<rusqlite::types::Value> =
        Vec::with_capacity(PARKINSONS_COLUMNS.len() + 2);
    values.push(record.patient_id.into());
    values.extend(record.measurements.values().into_iter().map(Into::into));
    values.push(timestamp_now().into());

    conn.execute(&sql, params_from_iter(values))?;
    Ok(conn.last_insert_rowid())
}

/// Earliest voice-measurement record for a patient.
pub fn get_parkinsons_record(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<ParkinsonsRecord>, DatabaseError> {
    let n = PARKINSONS_COLUMNS.len();
    let sql = format!(
        "SELECT id, patient_id, {}, created_at FROM parkinsons_data
         WHERE patient_id = ?1 ORDER BY id ASC LIMIT 1",
        PARKINSONS_COLUMNS.join(", ")
    );

    let row = conn
        .query_row(&sql, params![patient_id], |row| {
            let id: i64 = row.get(0)?;
            let patient_id: i64 = row.get(1)?;
            let mut values = Vec::with_capacity(n);
            for i in 0..n {
                values.push(row.get::<_, f64>(i + 2)?);
            }
            let created_at: Option<String> = row.get(n + 2)?;
            Ok((id, patient_id, values, created_at))
        })
        .optional()?;

    match row {
        Some((id, patient_id, values, created_at)) => {
            let measurements = ParkinsonsMeasurements::from_values(&values).ok_or_else(|| {
                DatabaseError::ConstraintViolation(format!(
                    "parkinsons_data row {id} has {} measurements",
                    values.len()
                ))
            })?;
            Ok(Some(ParkinsonsRecord {
                id,
                patient_id,
                measurements,
                created_at,
            }))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_clinical_database;
    use crate::models::parkinsons::tests::SAMPLE;

    fn form(patient_id: &str) -> ParkinsonsForm {
        let m = ParkinsonsMeasurements::from_values(&SAMPLE).unwrap();
        ParkinsonsForm {
            patient_id: patient_id.into(),
            fo: m.fo.to_string().into(),
            fhi: m.fhi.to_string().into(),
            flo: m.flo.to_string().into(),
            jitter_percent: m.jitter_percent.to_string().into(),
            jitter_abs: m.jitter_abs.to_string().into(),
            rap: m.rap.to_string().into(),
            ppq: m.ppq.to_string().into(),
            ddp: m.ddp.to_string().into(),
            shimmer: m.shimmer.to_string().into(),
            shimmer_db: m.shimmer_db.to_string().into(),
            apq3: m.apq3.to_string().into(),
            apq5: m.apq5.to_string().into(),
            apq: m.apq.to_string().into(),
            dda: m.dda.to_string().into(),
            nhr: m.nhr.to_string().into(),
            hnr: m.hnr.to_string().into(),
            rpde: m.rpde.to_string().into(),
            dfa: m.dfa.to_string().into(),
            spread1: m.spread1.to_string().into(),
            spread2: m.spread2.to_string().into(),
            d2: m.d2.to_string().into(),
            ppe: m.ppe.to_string().into(),
        }
    }

    #[test]
    fn parkinsons_insert_and_retrieve() {
        let conn = open_memory_clinical_database().unwrap();
        let id = insert_parkinsons_record(&conn, &form("5")).unwrap();

        let record = get_parkinsons_record(&conn, 5).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.patient_id, 5);
        assert_eq!(record.measurements.values(), SAMPLE.to_vec());
        assert!(record.created_at.is_some());
    }

    #[test]
    fn missing_record_is_none() {
        let conn = open_memory_clinical_database().unwrap();
        assert!(get_parkinsons_record(&conn, 5).unwrap().is_none());
    }
}
