//! CRUD operations for [`Category`] records.

use rusqlite::params;
use uuid::Uuid;

use crate::database::{self, get_timestamp, get_uuid, Database};
use crate::error::{not_found, Result, StoreError};
use crate::models::Category;

impl Database {
    /// Insert a new category bound to `agency_id`.
    ///
    /// The agency is expected to exist; the foreign key rejects the insert
    /// otherwise. Name and agency are not unique together, so repeating a
    /// call creates another row.
    pub fn create_category(&self, name: &str, agency_id: Uuid) -> Result<Category> {
        let now = database::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            agency_id,
            created_at: now,
            updated_at: now,
        };

        self.conn().execute(
            "INSERT INTO categories (id, name, agency_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                category.id.to_string(),
                category.name,
                category.agency_id.to_string(),
                database::ts(&category.created_at),
                database::ts(&category.updated_at),
            ],
        )?;

        Ok(category)
    }

    pub fn get_category(&self, id: Uuid) -> Result<Category> {
        self.conn()
            .query_row(
                "SELECT id, name, agency_id, created_at, updated_at
                 FROM categories
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_category,
            )
            .map_err(not_found)
    }

    /// List categories ordered by name, optionally only one agency's.
    pub fn list_categories(&self, agency_id: Option<Uuid>) -> Result<Vec<Category>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, agency_id, created_at, updated_at
             FROM categories
             WHERE (?1 IS NULL OR agency_id = ?1)
             ORDER BY name ASC, created_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map(
            params![agency_id.map(|id| id.to_string())],
            row_to_category,
        )?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    pub fn rename_category(&self, id: Uuid, name: &str) -> Result<Category> {
        let affected = self.conn().execute(
            "UPDATE categories SET name = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.to_string(), name, database::ts(&database::now())],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_category(id)
    }

    // ON DELETE CASCADE: the category's submissions go with it
    pub fn delete_category(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM categories WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: get_uuid(row, 0)?,
        name: row.get(1)?,
        agency_id: get_uuid(row, 2)?,
        created_at: get_timestamp(row, 3)?,
        updated_at: get_timestamp(row, 4)?,
    })
}
