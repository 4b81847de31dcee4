// src/db/board_store.rs

use crate::db::connection::Database;
use crate::domain::board::SiteBoard;
use crate::domain::site::SiteRecord;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::ServerError;

// Slot names carried over from the original storage keys.
pub const SLOT_ONGOING: &str = "wb_rows";
pub const SLOT_SOAK: &str = "wb_soak";
pub const SLOT_CANCELLED: &str = "wb_cancelled";

/// Loads the whole board from its three slots. A missing slot is an
/// empty sequence, so a fresh database yields an empty board.
pub fn load_board(db: &Database) -> Result<SiteBoard, ServerError> {
    db.with_conn(|conn| {
        Ok(SiteBoard {
            ongoing: load_slot(conn, SLOT_ONGOING)?,
            soak: load_slot(conn, SLOT_SOAK)?,
            cancelled: load_slot(conn, SLOT_CANCELLED)?,
        })
    })
}

/// Persists all three sequences in one transaction, so the stored board
/// can never hold a record in two stages (or in none) after a partial
/// write. Save failures propagate; they are never treated as success.
pub fn save_board(db: &Database, board: &SiteBoard) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        save_slot(&tx, SLOT_ONGOING, &board.ongoing)?;
        save_slot(&tx, SLOT_SOAK, &board.soak)?;
        save_slot(&tx, SLOT_CANCELLED, &board.cancelled)?;

        tx.commit().map_err(|e| ServerError::DbError(e.to_string()))
    })
}

fn load_slot(conn: &Connection, slot: &str) -> Result<Vec<SiteRecord>, ServerError> {
    let payload: Option<String> = conn
        .query_row(
            "SELECT payload FROM board_slots WHERE slot = ?1",
            params![slot],
            |row| row.get(0),
        )
        .optional()?;

    match payload {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| ServerError::DbError(format!("Corrupt payload in slot {slot}: {e}"))),
        None => Ok(Vec::new()),
    }
}

fn save_slot(tx: &Connection, slot: &str, records: &[SiteRecord]) -> Result<(), ServerError> {
    let payload = serde_json::to_string(records)
        .map_err(|e| ServerError::DbError(format!("Serialize slot {slot} failed: {e}")))?;
    tx.execute(
        r#"
        INSERT INTO board_slots (slot, payload, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(slot) DO UPDATE SET
            payload = excluded.payload,
            updated_at = excluded.updated_at
        "#,
        params![slot, payload, Utc::now().naive_utc()],
    )?;
    Ok(())
}
