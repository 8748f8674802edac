use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::Score;

/// Retrieve a participant's scores oldest-first. The join keeps scores of
/// soft-deleted participants out of every read without touching the rows
/// themselves.
pub fn fetch_for_participant(conn: &Connection, participant_id: i64) -> Result<Vec<Score>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.participant_id, s.score, s.recorded_on
         FROM scores s
         JOIN participants p ON p.id = s.participant_id
         WHERE s.participant_id = ?1 AND p.is_deleted = 0
         ORDER BY s.recorded_on, s.id",
    )?;

    let scores = stmt
        .query_map(params![participant_id], |row| {
            Ok(Score {
                id: row.get(0)?,
                participant_id: row.get(1)?,
                score: row.get(2)?,
                recorded_on: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connection, participants};
    use crate::models::ProfileRow;
    use chrono::NaiveDate;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        connection::ensure_schema(&conn).unwrap();
        conn
    }

    fn sample_profile() -> ProfileRow {
        ProfileRow {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            emergency_contact: "9876543211".to_string(),
            address: "12 Lake Road".to_string(),
            date_of_birth: "1990-04-02".to_string(),
            gender: "F".to_string(),
            blood_group: "O+".to_string(),
        }
    }

    fn record_score(conn: &Connection, participant_id: i64, score: i64, day: u32) {
        conn.execute(
            "INSERT INTO scores (participant_id, score, recorded_on) VALUES (?1, ?2, ?3)",
            params![
                participant_id,
                score,
                NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
            ],
        )
        .unwrap();
    }

    #[test]
    fn scores_come_back_oldest_first() {
        let conn = test_conn();
        let id = participants::insert_participant(&conn, &sample_profile()).unwrap();
        record_score(&conn, id, 40, 9);
        record_score(&conn, id, 55, 3);

        let scores = fetch_for_participant(&conn, id).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].score, 55, "earlier recording should sort first");
        assert_eq!(scores[1].score, 40);
    }

    #[test]
    fn soft_deleted_participant_scores_are_hidden() {
        let conn = test_conn();
        let id = participants::insert_participant(&conn, &sample_profile()).unwrap();
        record_score(&conn, id, 72, 5);
        assert_eq!(fetch_for_participant(&conn, id).unwrap().len(), 1);

        participants::soft_delete(&conn, id).unwrap();
        assert!(
            fetch_for_participant(&conn, id).unwrap().is_empty(),
            "scores of a soft-deleted participant should not be readable"
        );
    }
}
