//! CRUD operations for [`User`] records, including the citizen profile view.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use civic_shared::CitizenProfile;

use crate::database::{self, get_enum, get_opt_uuid, get_timestamp, get_uuid, Database};
use crate::error::{not_found, unique_conflict, Result, StoreError};
use crate::models::{NewUser, User};

const COLUMNS: &str = "id, first_name, last_name, email, phone, address, city, district, \
                       password_hash, role, agency_id, created_at, updated_at";

const EMAIL_TAKEN: &str = "Email already registered.";

impl Database {
    /// Insert a new user. A duplicate email yields [`StoreError::Conflict`].
    pub fn create_user(&self, new: &NewUser) -> Result<User> {
        let now = database::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            address: new.address.clone(),
            city: new.city.clone(),
            district: new.district.clone(),
            password_hash: new.password_hash.clone(),
            role: new.role,
            agency_id: new.agency_id,
            created_at: now,
            updated_at: now,
        };

        self.conn()
            .execute(
                &format!("INSERT INTO users ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"),
                params![
                    user.id.to_string(),
                    user.first_name,
                    user.last_name,
                    user.email,
                    user.phone,
                    user.address,
                    user.city,
                    user.district,
                    user.password_hash,
                    user.role.as_str(),
                    user.agency_id.map(|id| id.to_string()),
                    database::ts(&user.created_at),
                    database::ts(&user.updated_at),
                ],
            )
            .map_err(|e| unique_conflict(e, EMAIL_TAKEN))?;

        Ok(user)
    }

    pub fn get_user(&self, id: Uuid) -> Result<User> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
                params![id.to_string()],
                row_to_user,
            )
            .map_err(not_found)
    }

    /// Look a user up by email, matching case-insensitively.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE email = ?1 COLLATE NOCASE"),
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_exists(&self, id: Uuid) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM users WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Overwrite the citizen-editable fields of a user.
    ///
    /// The profile is stored as given; callers validate and normalize it
    /// first.
    pub fn update_user_profile(&self, id: Uuid, profile: &CitizenProfile) -> Result<User> {
        let affected = self
            .conn()
            .execute(
                "UPDATE users SET
                    first_name = ?2,
                    last_name  = ?3,
                    email      = ?4,
                    phone      = ?5,
                    address    = ?6,
                    city       = ?7,
                    district   = ?8,
                    updated_at = ?9
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    profile.first_name,
                    profile.last_name,
                    profile.email,
                    profile.phone,
                    profile.address,
                    profile.city,
                    profile.district,
                    database::ts(&database::now()),
                ],
            )
            .map_err(|e| unique_conflict(e, EMAIL_TAKEN))?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_user(id)
    }

    // ON DELETE CASCADE: submissions, responses and notifications go with it
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

impl User {
    /// The profile-form view of this user.
    pub fn profile(&self) -> CitizenProfile {
        CitizenProfile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone().unwrap_or_default(),
            city: self.city.clone().unwrap_or_default(),
            district: self.district.clone(),
        }
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: get_uuid(row, 0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        city: row.get(6)?,
        district: row.get(7)?,
        password_hash: row.get(8)?,
        role: get_enum(row, 9)?,
        agency_id: get_opt_uuid(row, 10)?,
        created_at: get_timestamp(row, 11)?,
        updated_at: get_timestamp(row, 12)?,
    })
}
