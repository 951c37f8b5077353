use rusqlite::params;
use uuid::Uuid;

use crate::database::{self, get_timestamp, get_uuid, Database};
use crate::error::{Result, StoreError};
use crate::models::AdminResponse;

impl Database {
    pub fn create_admin_response(
        &self,
        submission_id: Uuid,
        responder_id: Uuid,
        message: &str,
    ) -> Result<AdminResponse> {
        let now = database::now();
        let response = AdminResponse {
            id: Uuid::new_v4(),
            message: message.to_string(),
            submission_id,
            responder_id,
            created_at: now,
            updated_at: now,
        };

        self.conn().execute(
            "INSERT INTO admin_responses (id, message, submission_id, responder_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                response.id.to_string(),
                response.message,
                response.submission_id.to_string(),
                response.responder_id.to_string(),
                database::ts(&response.created_at),
                database::ts(&response.updated_at),
            ],
        )?;

        Ok(response)
    }

    /// Responses to one submission, oldest first (conversation order).
    pub fn list_responses_for_submission(&self, submission_id: Uuid) -> Result<Vec<AdminResponse>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, message, submission_id, responder_id, created_at, updated_at
             FROM admin_responses
             WHERE submission_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![submission_id.to_string()], row_to_response)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

fn row_to_response(row: &rusqlite::Row<'_>) -> rusqlite::Result<AdminResponse> {
    Ok(AdminResponse {
        id: get_uuid(row, 0)?,
        message: row.get(1)?,
        submission_id: get_uuid(row, 2)?,
        responder_id: get_uuid(row, 3)?,
        created_at: get_timestamp(row, 4)?,
        updated_at: get_timestamp(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seed_with_submission;

    #[test]
    fn responses_in_conversation_order() {
        let (db, seed, submission) = seed_with_submission();

        let first = db
            .create_admin_response(submission.id, seed.admin.id, "Crew scheduled")
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = db
            .create_admin_response(submission.id, seed.admin.id, "Repaired")
            .unwrap();

        let listed = db.list_responses_for_submission(submission.id).unwrap();
        assert_eq!(listed, vec![first, second]);
        assert!(db
            .list_responses_for_submission(Uuid::new_v4())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn same_timestamp_keeps_insertion_order() {
        let (db, seed, submission) = seed_with_submission();
        let ids: Vec<_> = ["One", "Two", "Three"]
            .into_iter()
            .map(|msg| {
                db.create_admin_response(submission.id, seed.admin.id, msg)
                    .unwrap()
                    .id
            })
            .collect();
        db.conn()
            .execute(
                "UPDATE admin_responses SET created_at = '2024-01-01T00:00:00.000000Z'",
                [],
            )
            .unwrap();

        let listed: Vec<_> = db
            .list_responses_for_submission(submission.id)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn unknown_responder_rejected() {
        let (db, _, submission) = seed_with_submission();
        assert!(db
            .create_admin_response(submission.id, Uuid::new_v4(), "Hello")
            .is_err());
    }

    #[test]
    fn deleted_with_submission() {
        let (db, seed, submission) = seed_with_submission();
        db.create_admin_response(submission.id, seed.admin.id, "On it")
            .unwrap();
        db.delete_submission(submission.id).unwrap();

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM admin_responses", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
