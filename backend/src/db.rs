//! The record store: profiles and their embedded documents in SQLite.
//!
//! A `Profile` row owns its `documents` rows exclusively; documents have no
//! identity outside their profile. The `file_type` column carries a `CHECK`
//! constraint over the allowed MIME set, so a disallowed type makes the
//! whole insert fail at the schema layer. Inserts run in a transaction, so
//! a failed submission never leaves a partial record visible to reads.
//!
//! Addresses are stored as JSON text columns; `NULL` in `permanent_address`
//! means the address was absent, not empty.

use chrono::NaiveDate;
use common::model::address::Address;
use common::model::document::{Document, ALLOWED_FILE_TYPES};
use common::model::profile::Profile;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::path::Path;
use uuid::Uuid;

fn schema() -> String {
    let allowed = ALLOWED_FILE_TYPES
        .map(|t| format!("'{t}'"))
        .join(", ");
    format!(
        "
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,
    residential_address TEXT NOT NULL,
    permanent_address TEXT,
    is_same_as_residential INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    file_name TEXT NOT NULL,
    file_type TEXT NOT NULL CHECK (file_type IN ({allowed})),
    file_path TEXT NOT NULL
);
"
    )
}

/// Opens the database file and applies the schema.
pub fn open(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.execute_batch(&schema())?;
    Ok(conn)
}

/// In-memory database with the same schema, for tests.
pub fn open_in_memory() -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(&schema())?;
    Ok(conn)
}

/// Persists a profile and its documents atomically.
///
/// Assigns a fresh identifier and returns the profile as persisted. On any
/// failure (schema violation included) the transaction rolls back and no
/// partial record remains.
pub fn insert_profile(
    conn: &mut Connection,
    mut profile: Profile,
) -> Result<Profile, rusqlite::Error> {
    profile.id = Uuid::new_v4().to_string();

    let residential = encode_address(&profile.residential_address)?;
    let permanent = profile
        .permanent_address
        .as_ref()
        .map(encode_address)
        .transpose()?;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO profiles (id, first_name, last_name, email, date_of_birth,
                               residential_address, permanent_address, is_same_as_residential)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            profile.id,
            profile.first_name,
            profile.last_name,
            profile.email,
            profile.date_of_birth.to_string(),
            residential,
            permanent,
            profile.is_same_as_residential,
        ],
    )?;
    for doc in &profile.documents {
        tx.execute(
            "INSERT INTO documents (profile_id, file_name, file_type, file_path)
             VALUES (?1, ?2, ?3, ?4)",
            params![profile.id, doc.file_name, doc.file_type, doc.file_path],
        )?;
    }
    tx.commit()?;

    Ok(profile)
}

/// Returns every persisted profile with its documents in upload order.
/// Profile order is store-default (insertion order in practice).
pub fn list_profiles(conn: &Connection) -> Result<Vec<Profile>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, email, date_of_birth,
                residential_address, permanent_address, is_same_as_residential
         FROM profiles",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Profile {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            date_of_birth: decode_date(&row.get::<_, String>(4)?, 4)?,
            residential_address: decode_address(&row.get::<_, String>(5)?, 5)?,
            permanent_address: row
                .get::<_, Option<String>>(6)?
                .map(|raw| decode_address(&raw, 6))
                .transpose()?,
            is_same_as_residential: row.get(7)?,
            documents: Vec::new(),
        })
    })?;

    let mut profiles: Vec<Profile> = rows.collect::<Result<_, _>>()?;
    for profile in &mut profiles {
        profile.documents = documents_for(conn, &profile.id)?;
    }
    Ok(profiles)
}

fn documents_for(conn: &Connection, profile_id: &str) -> Result<Vec<Document>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT file_name, file_type, file_path FROM documents
         WHERE profile_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![profile_id], |row| {
        Ok(Document {
            file_name: row.get(0)?,
            file_type: row.get(1)?,
            file_path: row.get(2)?,
        })
    })?;
    rows.collect()
}

fn encode_address(address: &Address) -> Result<String, rusqlite::Error> {
    serde_json::to_string(address).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn decode_address(raw: &str, idx: usize) -> Result<Address, rusqlite::Error> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn decode_date(raw: &str, idx: usize) -> Result<NaiveDate, rusqlite::Error> {
    raw.parse()
        .map_err(|e: chrono::ParseError| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        })
}
