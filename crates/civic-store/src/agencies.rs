//! CRUD operations for [`Agency`] records.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::{self, get_timestamp, get_uuid, Database};
use crate::error::{not_found, Result, StoreError};
use crate::models::{Agency, AgencyUpdate, NewAgency};

const COLUMNS: &str =
    "id, name, description, email, phone, address, created_at, updated_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new agency with a generated id.
    pub fn create_agency(&self, new: &NewAgency) -> Result<Agency> {
        let now = database::now();
        let agency = Agency {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            description: new.description.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            address: new.address.clone(),
            created_at: now,
            updated_at: now,
        };

        self.conn().execute(
            "INSERT INTO agencies (id, name, description, email, phone, address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                agency.id.to_string(),
                agency.name,
                agency.description,
                agency.email,
                agency.phone,
                agency.address,
                database::ts(&agency.created_at),
                database::ts(&agency.updated_at),
            ],
        )?;

        Ok(agency)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single agency by UUID.
    pub fn get_agency(&self, id: Uuid) -> Result<Agency> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM agencies WHERE id = ?1"),
                params![id.to_string()],
                row_to_agency,
            )
            .map_err(not_found)
    }

    /// Whether an agency with this id exists.
    pub fn agency_exists(&self, id: Uuid) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM agencies WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// List all agencies, ordered by name.
    pub fn list_agencies(&self) -> Result<Vec<Agency>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {COLUMNS} FROM agencies ORDER BY name ASC, rowid ASC"))?;
        let rows = stmt.query_map([], row_to_agency)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Apply a partial update and return the updated row.
    pub fn update_agency(&self, id: Uuid, changes: &AgencyUpdate) -> Result<Agency> {
        let mut agency = self.get_agency(id)?;

        if let Some(name) = &changes.name {
            agency.name = name.clone();
        }
        if let Some(description) = &changes.description {
            agency.description = description.clone();
        }
        if let Some(email) = &changes.email {
            agency.email = email.clone();
        }
        if let Some(phone) = &changes.phone {
            agency.phone = phone.clone();
        }
        if let Some(address) = &changes.address {
            agency.address = address.clone();
        }
        agency.updated_at = database::now();

        let affected = self.conn().execute(
            "UPDATE agencies SET
                name        = ?2,
                description = ?3,
                email       = ?4,
                phone       = ?5,
                address     = ?6,
                updated_at  = ?7
             WHERE id = ?1",
            params![
                id.to_string(),
                agency.name,
                agency.description,
                agency.email,
                agency.phone,
                agency.address,
                database::ts(&agency.updated_at),
            ],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(agency)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    // ON DELETE CASCADE: categories + submissions go with it, staff keep
    // their account with agency_id cleared
    pub fn delete_agency(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM agencies WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

fn row_to_agency(row: &rusqlite::Row<'_>) -> rusqlite::Result<Agency> {
    Ok(Agency {
        id: get_uuid(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        created_at: get_timestamp(row, 6)?,
        updated_at: get_timestamp(row, 7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn create_and_get() {
        let db = db();
        let agency = db
            .create_agency(&NewAgency {
                name: "Public Works".into(),
                email: Some("works@city.gov".into()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(agency.created_at, agency.updated_at);
        assert_eq!(db.get_agency(agency.id).unwrap(), agency);
        assert!(db.agency_exists(agency.id).unwrap());
        assert!(!db.agency_exists(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn list_is_sorted_by_name() {
        let db = db();
        for name in ["Water", "Roads", "Health"] {
            db.create_agency(&NewAgency {
                name: name.into(),
                ..Default::default()
            })
            .unwrap();
        }
        let names: Vec<_> = db
            .list_agencies()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, ["Health", "Roads", "Water"]);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let db = db();
        let agency = db
            .create_agency(&NewAgency {
                name: "Parks".into(),
                phone: Some("5550001111".into()),
                ..Default::default()
            })
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2));
        let updated = db
            .update_agency(
                agency.id,
                &AgencyUpdate {
                    description: Some(Some("Parks and gardens".into())),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Parks");
        assert_eq!(updated.phone.as_deref(), Some("5550001111"));
        assert_eq!(updated.description.as_deref(), Some("Parks and gardens"));
        assert_eq!(updated.created_at, agency.created_at);
        assert!(updated.updated_at > agency.updated_at);
    }

    #[test]
    fn update_can_clear_optional_fields() {
        let db = db();
        let agency = db
            .create_agency(&NewAgency {
                name: "Parks".into(),
                email: Some("parks@city.gov".into()),
                phone: Some("5550001111".into()),
                ..Default::default()
            })
            .unwrap();

        let updated = db
            .update_agency(
                agency.id,
                &AgencyUpdate {
                    email: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(updated.email.is_none());
        assert_eq!(updated.phone.as_deref(), Some("5550001111"));
        assert_eq!(db.get_agency(agency.id).unwrap(), updated);
    }

    #[test]
    fn update_and_delete_missing() {
        let db = db();
        assert!(matches!(
            db.update_agency(Uuid::new_v4(), &AgencyUpdate::default()),
            Err(StoreError::NotFound)
        ));
        assert!(!db.delete_agency(Uuid::new_v4()).unwrap());
        assert!(matches!(
            db.get_agency(Uuid::new_v4()),
            Err(StoreError::NotFound)
        ));
    }
}
