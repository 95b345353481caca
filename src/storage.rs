use crate::board::{Board, NewBoard};
use crate::error::Result;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{Connection, params};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::watch;

pub type BoardSubscription = watch::Receiver<Vec<Board>>;

/// Collection path holding the kanban boards of one application.
pub fn board_namespace(app_id: &str) -> String {
    format!("artifacts/{}/public/data/kanban_panels", app_id)
}

pub trait BoardStore: Send + Sync {
    /// Live view of the collection. The receiver starts with the current
    /// snapshot and sees a full replacement after every change.
    fn subscribe(&self, namespace: &str) -> Result<BoardSubscription>;
    fn list(&self, namespace: &str) -> Result<Vec<Board>>;
    fn create(&self, namespace: &str, board: &NewBoard) -> Result<Board>;
    /// Deleting an unknown id is not an error.
    fn delete(&self, namespace: &str, id: &str) -> Result<()>;
}

pub fn default_db_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "example", "ChatwootKanban")?;
    Some(proj.data_dir().join("boards.sqlite"))
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub struct SqliteBoardStore {
    conn: Mutex<Connection>,
    watchers: Mutex<HashMap<String, watch::Sender<Vec<Board>>>>,
}

impl SqliteBoardStore {
    pub fn open(path: &Path) -> Result<Self> {
        ensure_dir(path)?;
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS boards (
                id TEXT PRIMARY KEY,
                namespace TEXT NOT NULL,
                name TEXT NOT NULL,
                columns_json TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS boards_namespace ON boards(namespace, created_at);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            watchers: Mutex::new(HashMap::new()),
        })
    }

    fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_watchers(&self) -> std::sync::MutexGuard<'_, HashMap<String, watch::Sender<Vec<Board>>>> {
        self.watchers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(conn: &Connection, namespace: &str) -> Result<Vec<Board>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, columns_json, created_at FROM boards
             WHERE namespace = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![namespace], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, DateTime<Utc>>(3)?,
            ))
        })?;
        let mut out = Vec::new();
        for r in rows {
            let (id, name, columns_json, created_at) = r?;
            let columns = match serde_json::from_str::<Vec<String>>(&columns_json) {
                Ok(columns) => columns,
                Err(e) => {
                    log::warn!("board {} has unreadable columns, skipping: {}", id, e);
                    continue;
                }
            };
            out.push(Board {
                id,
                name,
                columns,
                created_at,
            });
        }
        Ok(out)
    }

    fn notify(&self, namespace: &str) -> Result<()> {
        let snapshot = Self::load(&self.lock_conn(), namespace)?;
        let mut watchers = self.lock_watchers();
        if let Some(tx) = watchers.get(namespace) {
            if tx.send(snapshot).is_err() {
                watchers.remove(namespace);
            }
        }
        Ok(())
    }
}

impl BoardStore for SqliteBoardStore {
    fn subscribe(&self, namespace: &str) -> Result<BoardSubscription> {
        let snapshot = Self::load(&self.lock_conn(), namespace)?;
        let mut watchers = self.lock_watchers();
        if let Some(tx) = watchers.get(namespace) {
            if !tx.is_closed() {
                tx.send_replace(snapshot);
                return Ok(tx.subscribe());
            }
        }
        let (tx, rx) = watch::channel(snapshot);
        watchers.insert(namespace.to_string(), tx);
        Ok(rx)
    }

    fn list(&self, namespace: &str) -> Result<Vec<Board>> {
        Self::load(&self.lock_conn(), namespace)
    }

    fn create(&self, namespace: &str, board: &NewBoard) -> Result<Board> {
        let created = Board {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: board.name().to_string(),
            columns: board.columns().to_vec(),
            created_at: Utc::now(),
        };
        self.lock_conn().execute(
            "INSERT INTO boards (id, namespace, name, columns_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                created.id,
                namespace,
                created.name,
                serde_json::to_string(&created.columns)?,
                created.created_at
            ],
        )?;
        log::debug!("created board {} in {}", created.id, namespace);
        self.notify(namespace)?;
        Ok(created)
    }

    fn delete(&self, namespace: &str, id: &str) -> Result<()> {
        let removed = self
            .lock_conn()
            .execute("DELETE FROM boards WHERE namespace = ?1 AND id = ?2", params![namespace, id])?;
        if removed > 0 {
            log::debug!("deleted board {} from {}", id, namespace);
            self.notify(namespace)?;
        }
        Ok(())
    }
}
