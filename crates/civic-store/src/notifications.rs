//! CRUD operations for [`Notification`] records.

use rusqlite::params;
use uuid::Uuid;

use crate::database::{self, get_enum, get_opt_uuid, get_timestamp, get_uuid, Database};
use crate::error::{not_found, Result, StoreError};
use crate::models::{NewNotification, Notification};

const COLUMNS: &str =
    "id, message, is_read, type, user_id, submission_id, created_at, updated_at";

impl Database {
    /// Insert an unread notification.
    pub fn create_notification(&self, new: &NewNotification) -> Result<Notification> {
        let now = database::now();
        let notification = Notification {
            id: Uuid::new_v4(),
            message: new.message.clone(),
            is_read: false,
            notification_type: new.notification_type,
            user_id: new.user_id,
            submission_id: new.submission_id,
            created_at: now,
            updated_at: now,
        };

        self.conn().execute(
            &format!("INSERT INTO notifications ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            params![
                notification.id.to_string(),
                notification.message,
                notification.is_read as i32,
                notification.notification_type.as_str(),
                notification.user_id.to_string(),
                notification.submission_id.map(|id| id.to_string()),
                database::ts(&notification.created_at),
                database::ts(&notification.updated_at),
            ],
        )?;

        Ok(notification)
    }

    pub fn get_notification(&self, id: Uuid) -> Result<Notification> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM notifications WHERE id = ?1"),
                params![id.to_string()],
                row_to_notification,
            )
            .map_err(not_found)
    }

    /// A user's notifications, newest first; `unread_only` hides read ones.
    pub fn list_notifications_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {COLUMNS}
             FROM notifications
             WHERE user_id = ?1 AND (?2 = 0 OR is_read = 0)
             ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map(
            params![user_id.to_string(), unread_only as i32],
            row_to_notification,
        )?;

        let mut notifications = Vec::new();
        for row in rows {
            notifications.push(row?);
        }
        Ok(notifications)
    }

    /// Mark a notification read. Marking an already-read one still bumps
    /// `updated_at`, since every write does.
    pub fn mark_notification_read(&self, id: Uuid) -> Result<Notification> {
        let affected = self.conn().execute(
            "UPDATE notifications SET is_read = 1, updated_at = ?2 WHERE id = ?1",
            params![id.to_string(), database::ts(&database::now())],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_notification(id)
    }

    pub fn delete_notification(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM notifications WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    let is_read_int: i32 = row.get(2)?;
    Ok(Notification {
        id: get_uuid(row, 0)?,
        message: row.get(1)?,
        is_read: is_read_int != 0,
        notification_type: get_enum(row, 3)?,
        user_id: get_uuid(row, 4)?,
        submission_id: get_opt_uuid(row, 5)?,
        created_at: get_timestamp(row, 6)?,
        updated_at: get_timestamp(row, 7)?,
    })
}
