//! CRUD operations for [`Submission`] records.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use civic_shared::SubmissionStatus;

use crate::database::{self, get_enum, get_timestamp, get_uuid, Database};
use crate::error::{not_found, Result, StoreError};
use crate::models::{NewSubmission, Submission, SubmissionFilter};

const COLUMNS: &str = "id, title, description, type, status, location, attachment_url, \
                       user_id, category_id, agency_id, created_at, updated_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new submission with status [`SubmissionStatus::Open`].
    pub fn create_submission(&self, new: &NewSubmission) -> Result<Submission> {
        let now = database::now();
        let submission = Submission {
            id: Uuid::new_v4(),
            title: new.title.clone(),
            description: new.description.clone(),
            submission_type: new.submission_type,
            status: SubmissionStatus::Open,
            location: new.location.clone(),
            attachment_url: new.attachment_url.clone(),
            user_id: new.user_id,
            category_id: new.category_id,
            agency_id: new.agency_id,
            created_at: now,
            updated_at: now,
        };

        self.conn().execute(
            &format!(
                "INSERT INTO submissions ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                submission.id.to_string(),
                submission.title,
                submission.description,
                submission.submission_type.as_str(),
                submission.status.as_str(),
                submission.location,
                submission.attachment_url,
                submission.user_id.to_string(),
                submission.category_id.to_string(),
                submission.agency_id.to_string(),
                database::ts(&submission.created_at),
                database::ts(&submission.updated_at),
            ],
        )?;

        Ok(submission)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_submission(&self, id: Uuid) -> Result<Submission> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM submissions WHERE id = ?1"),
                params![id.to_string()],
                row_to_submission,
            )
            .map_err(not_found)
    }

    pub fn submission_exists(&self, id: Uuid) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM submissions WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// List submissions matching every set filter, newest first.
    pub fn list_submissions(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {COLUMNS}
             FROM submissions
             WHERE (?1 IS NULL OR user_id = ?1)
               AND (?2 IS NULL OR agency_id = ?2)
               AND (?3 IS NULL OR status = ?3)
             ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map(
            params![
                filter.user_id.map(|id| id.to_string()),
                filter.agency_id.map(|id| id.to_string()),
                filter.status.map(|s| s.as_str()),
            ],
            row_to_submission,
        )?;

        let mut submissions = Vec::new();
        for row in rows {
            submissions.push(row?);
        }
        Ok(submissions)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    pub fn update_submission_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<Submission> {
        let affected = self.conn().execute(
            "UPDATE submissions SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![
                id.to_string(),
                status.as_str(),
                database::ts(&database::now())
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_submission(id)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    // ON DELETE CASCADE: responses + notifications for it go too
    pub fn delete_submission(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM submissions WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_submission(row: &rusqlite::Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: get_uuid(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        submission_type: get_enum(row, 3)?,
        status: get_enum(row, 4)?,
        location: row.get(5)?,
        attachment_url: row.get(6)?,
        user_id: get_uuid(row, 7)?,
        category_id: get_uuid(row, 8)?,
        agency_id: get_uuid(row, 9)?,
        created_at: get_timestamp(row, 10)?,
        updated_at: get_timestamp(row, 11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed, Seed};
    use civic_shared::SubmissionType;

    fn new_submission(seed: &Seed, title: &str) -> NewSubmission {
        NewSubmission {
            title: title.into(),
            description: "Large pothole near the school gate".into(),
            submission_type: SubmissionType::Complaint,
            location: Some("MG Road".into()),
            attachment_url: None,
            user_id: seed.citizen.id,
            category_id: seed.category.id,
            agency_id: seed.agency.id,
        }
    }

    #[test]
    fn new_submission_is_open() {
        let (db, seed) = seed();
        let submission = db
            .create_submission(&new_submission(&seed, "Pothole"))
            .unwrap();

        assert_eq!(submission.status, SubmissionStatus::Open);
        assert_eq!(submission.created_at, submission.updated_at);
        assert_eq!(db.get_submission(submission.id).unwrap(), submission);
    }

    #[test]
    fn list_filters_and_orders_newest_first() {
        let (db, seed) = seed();
        let first = db.create_submission(&new_submission(&seed, "First")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = db.create_submission(&new_submission(&seed, "Second")).unwrap();
        db.update_submission_status(first.id, SubmissionStatus::Resolved)
            .unwrap();

        let all = db.list_submissions(&SubmissionFilter::default()).unwrap();
        assert_eq!(
            all.iter().map(|s| s.id).collect::<Vec<_>>(),
            [second.id, first.id]
        );

        let resolved = db
            .list_submissions(&SubmissionFilter {
                status: Some(SubmissionStatus::Resolved),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, first.id);

        let other_user = db
            .list_submissions(&SubmissionFilter {
                user_id: Some(Uuid::new_v4()),
                ..Default::default()
            })
            .unwrap();
        assert!(other_user.is_empty());

        let by_agency = db
            .list_submissions(&SubmissionFilter {
                agency_id: Some(seed.agency.id),
                user_id: Some(seed.citizen.id),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_agency.len(), 2);
    }

    #[test]
    fn same_timestamp_lists_latest_insert_first() {
        let (db, seed) = seed();
        let first = db.create_submission(&new_submission(&seed, "First")).unwrap();
        let second = db.create_submission(&new_submission(&seed, "Second")).unwrap();
        db.conn()
            .execute(
                "UPDATE submissions SET created_at = '2024-01-01T00:00:00.000000Z'",
                [],
            )
            .unwrap();

        let listed: Vec<_> = db
            .list_submissions(&SubmissionFilter::default())
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(listed, [second.id, first.id]);
    }

    #[test]
    fn status_update_touches_updated_at_only() {
        let (db, seed) = seed();
        let submission = db
            .create_submission(&new_submission(&seed, "Pothole"))
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2));
        let updated = db
            .update_submission_status(submission.id, SubmissionStatus::InProgress)
            .unwrap();

        assert_eq!(updated.status, SubmissionStatus::InProgress);
        assert_eq!(updated.created_at, submission.created_at);
        assert!(updated.updated_at > submission.updated_at);
    }

    #[test]
    fn missing_submission() {
        let (db, _) = seed();
        assert!(matches!(
            db.update_submission_status(Uuid::new_v4(), SubmissionStatus::Rejected),
            Err(StoreError::NotFound)
        ));
        assert!(!db.delete_submission(Uuid::new_v4()).unwrap());
        assert!(!db.submission_exists(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn deleting_user_cascades() {
        let (db, seed) = seed();
        let submission = db
            .create_submission(&new_submission(&seed, "Pothole"))
            .unwrap();
        assert!(db.submission_exists(submission.id).unwrap());
        assert!(db.delete_user(seed.citizen.id).unwrap());
        assert!(!db.submission_exists(submission.id).unwrap());
        assert!(matches!(
            db.get_submission(submission.id),
            Err(StoreError::NotFound)
        ));
    }
}
