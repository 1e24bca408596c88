use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tauri::{AppHandle, Manager};

use crate::{Movement, SessionState};

type AnyResult<T> = Result<T, Box<dyn Error>>;

/// Fixed key the whole session blob lives under.
pub const STORAGE_KEY: &str = "finanzas-data-v1";

pub fn data_path(app: &AppHandle) -> AnyResult<PathBuf> {
    let data_dir = app.path().app_data_dir()?;
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("finanzas.sqlite"))
}

pub fn open_connection(path: &Path) -> AnyResult<Connection> {
    Ok(Connection::open(path)?)
}

pub fn init_store(path: &Path) -> AnyResult<()> {
    let conn = open_connection(path)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS session_store (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );",
    )?;
    Ok(())
}

/// Total function: any read or parse failure falls back to the empty
/// default and is never surfaced to the user.
pub fn load(path: &Path) -> SessionState {
    match read_blob(path) {
        Ok(Some(raw)) => decode_state(&raw),
        Ok(None) => SessionState::default(),
        Err(err) => {
            log::warn!("stored session is unreadable, starting empty: {err}");
            SessionState::default()
        }
    }
}

/// Serializes the full session and overwrites the blob under the fixed key.
pub fn save(path: &Path, state: &SessionState) -> AnyResult<()> {
    let raw = serde_json::to_string(state)?;
    let conn = open_connection(path)?;
    conn.execute(
        "INSERT OR REPLACE INTO session_store (key, value) VALUES (?1, ?2)",
        params![STORAGE_KEY, raw],
    )?;
    Ok(())
}

fn read_blob(path: &Path) -> AnyResult<Option<String>> {
    let conn = open_connection(path)?;
    let raw = conn
        .query_row(
            "SELECT value FROM session_store WHERE key = ?1",
            [STORAGE_KEY],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw)
}

// Each field is coerced on its own: a malformed movement list or goal does
// not discard the other field.
fn decode_state(raw: &str) -> SessionState {
    let parsed = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("stored session blob is not valid JSON, starting empty: {err}");
            return SessionState::default();
        }
    };

    let movements = parsed
        .get("movements")
        .cloned()
        .and_then(|value| serde_json::from_value::<Vec<Movement>>(value).ok())
        .unwrap_or_default();
    let goal = parsed.get("goal").and_then(Value::as_f64).unwrap_or(0.0);

    SessionState { movements, goal }
}
