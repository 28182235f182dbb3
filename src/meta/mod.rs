//! Transactional store of Users, Groups, Files and Paths, backed by SQLite.
//!
//! A single connection guarded by an async mutex is the writer; SQLite's own
//! transaction isolation gives the grouped mutations below their atomicity.
//! Queries that don't need a transaction just lock, run, and unlock.

mod schema;
mod types;

pub use types::{File, FileType, Group, Path, User};

use std::path::Path as FsPath;
use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{Error, Result, ADMIN_UID};

/// Permission bits the root directory is seeded with: rwxr-xr-x.
const ROOT_PERMISSIONS: u32 = 0o755;
const DEFAULT_DIR_PERMISSIONS: u32 = 0o755;
const DEFAULT_FILE_PERMISSIONS: u32 = 0o644;
const DEFAULT_SYMLINK_PERMISSIONS: u32 = 0o755;
const ROOT_INO: u64 = 1;

/// The SQLite-backed metadata store.
pub struct MetaStore {
    conn: Arc<Mutex<Connection>>,
}

impl MetaStore {
    /// Open (or create) the database at `path`, apply pragmas, create the
    /// schema if absent, and seed the root directory and its admin owner.
    pub async fn open(path: impl AsRef<FsPath>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection> {
            let conn = Connection::open(&path)?;
            Self::init(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(|e| Error::mismatch(format!("database open task panicked: {e}")))??;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Open an in-memory database, for tests.
    pub async fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(schema::SCHEMA_SQL)?;
        Self::seed_root(conn)?;
        Ok(())
    }

    fn seed_root(conn: &Connection) -> Result<()> {
        let exists: Option<i64> =
            conn.query_row("select ino from Files where ino = ?1", params![ROOT_INO as i64], |r| r.get(0)).optional()?;
        if exists.is_some() {
            return Ok(());
        }
        debug!("seeding root directory and administrator");
        conn.execute(
            "insert or ignore into Users (uid, password_hash, group_gid) values (?1, '', NULL)",
            params![ADMIN_UID as i64],
        )?;
        conn.execute(
            "insert into Files (ino, type, permissions, owner_uid, group_gid) values (?1, ?2, ?3, ?4, NULL)",
            params![ROOT_INO as i64, FileType::Directory.as_i64(), ROOT_PERMISSIONS as i64, ADMIN_UID as i64],
        )?;
        conn.execute("insert into Paths (path, ino) values ('/', ?1)", params![ROOT_INO as i64])?;
        Ok(())
    }

    // ---- queries -------------------------------------------------------

    pub async fn find_user(&self, uid: u32) -> Result<Option<User>> {
        let conn = self.conn.lock().await;
        conn.query_row("select uid, group_gid from Users where uid = ?1", params![uid as i64], |r| {
            Ok(User { uid: r.get::<_, i64>(0)? as u32, group_gid: r.get::<_, Option<i64>>(1)?.map(|g| g as u32) })
        })
        .optional()
        .map_err(Error::from)
    }

    pub async fn find_group(&self, gid: u32) -> Result<Option<Group>> {
        let conn = self.conn.lock().await;
        conn.query_row("select gid from Groups where gid = ?1", params![gid as i64], |r| {
            Ok(Group { gid: r.get::<_, i64>(0)? as u32 })
        })
        .optional()
        .map_err(Error::from)
    }

    pub async fn find_group_of_user(&self, uid: u32) -> Result<Option<Group>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "select g.gid from Users u join Groups g on g.gid = u.group_gid where u.uid = ?1",
            params![uid as i64],
            |r| Ok(Group { gid: r.get::<_, i64>(0)? as u32 }),
        )
        .optional()
        .map_err(Error::from)
    }

    pub async fn find_file_by_ino(&self, ino: u64) -> Result<Option<File>> {
        let conn = self.conn.lock().await;
        Self::query_file(&conn, ino)
    }

    fn query_file(conn: &Connection, ino: u64) -> Result<Option<File>> {
        conn.query_row(
            "select ino, type, permissions, owner_uid, group_gid from Files where ino = ?1",
            params![ino as i64],
            Self::row_to_file,
        )
        .optional()
        .map_err(Error::from)
    }

    fn row_to_file(r: &rusqlite::Row<'_>) -> rusqlite::Result<File> {
        let file_type_raw: i64 = r.get(1)?;
        Ok(File {
            ino: r.get::<_, i64>(0)? as u64,
            file_type: FileType::from_i64(file_type_raw).unwrap_or(FileType::Regular),
            permissions: r.get::<_, i64>(2)? as u32,
            owner_uid: r.get::<_, i64>(3)? as u32,
            group_gid: r.get::<_, Option<i64>>(4)?.map(|g| g as u32),
        })
    }

    pub async fn find_path(&self, path: &str) -> Result<Option<Path>> {
        let conn = self.conn.lock().await;
        conn.query_row("select path, ino from Paths where path = ?1", params![path], |r| {
            Ok(Path { path: r.get(0)?, ino: r.get::<_, i64>(1)? as u64 })
        })
        .optional()
        .map_err(Error::from)
    }

    pub async fn find_paths_of_file(&self, ino: u64) -> Result<Vec<Path>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("select path, ino from Paths where ino = ?1")?;
        let rows = stmt
            .query_map(params![ino as i64], |r| Ok(Path { path: r.get(0)?, ino: r.get::<_, i64>(1)? as u64 }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ---- single-row mutations -------------------------------------------

    pub async fn update_permissions(&self, ino: u64, permissions: u32) -> Result<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "update Files set permissions = ?1 where ino = ?2",
            params![permissions as i64, ino as i64],
        )?;
        if changed == 0 {
            return Err(Error::NoEntry);
        }
        Ok(())
    }

    pub async fn update_owner_group(&self, ino: u64, owner_uid: u32, group_gid: Option<u32>) -> Result<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "update Files set owner_uid = ?1, group_gid = ?2 where ino = ?3",
            params![owner_uid as i64, group_gid.map(|g| g as i64), ino as i64],
        )?;
        if changed == 0 {
            return Err(Error::NoEntry);
        }
        Ok(())
    }

    // ---- grouped transactions --------------------------------------------

    /// Insert a new directory File (keyed by the host inode `ino` the
    /// BackingStore already assigned it) and its single Path row.
    pub async fn mkdir_txn(&self, child_path: &str, ino: u64, owner_uid: u32, group_gid: Option<u32>) -> Result<File> {
        self.insert_txn(child_path, ino, FileType::Directory, DEFAULT_DIR_PERMISSIONS, owner_uid, group_gid).await
    }

    /// Insert a new regular File (keyed by the host inode) and its single
    /// Path row.
    pub async fn create_txn(&self, child_path: &str, ino: u64, owner_uid: u32, group_gid: Option<u32>) -> Result<File> {
        self.insert_txn(child_path, ino, FileType::Regular, DEFAULT_FILE_PERMISSIONS, owner_uid, group_gid).await
    }

    /// Insert a new symlink File (keyed by the host inode) and its single
    /// Path row.
    pub async fn symlink_txn(&self, child_path: &str, ino: u64, owner_uid: u32, group_gid: Option<u32>) -> Result<File> {
        self.insert_txn(child_path, ino, FileType::Symlink, DEFAULT_SYMLINK_PERMISSIONS, owner_uid, group_gid).await
    }

    /// Insert a File row under the exact `ino` the BackingStore already
    /// assigned the entry (a host inode, not a SQLite rowid), so every
    /// later `lstat`-then-`find_file_by_ino` lookup resolves.
    async fn insert_txn(
        &self,
        child_path: &str,
        ino: u64,
        file_type: FileType,
        permissions: u32,
        owner_uid: u32,
        group_gid: Option<u32>,
    ) -> Result<File> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "insert into Files (ino, type, permissions, owner_uid, group_gid) values (?1, ?2, ?3, ?4, ?5)",
            params![ino as i64, file_type.as_i64(), permissions as i64, owner_uid as i64, group_gid.map(|g| g as i64)],
        )?;
        tx.execute("insert into Paths (path, ino) values (?1, ?2)", params![child_path, ino as i64])?;
        tx.commit()?;
        Ok(File { ino, file_type, permissions, owner_uid, group_gid })
    }

    /// Bind a new Path to an existing File (hardlink target). The File row
    /// is left untouched.
    pub async fn hardlink_txn(&self, target_ino: u64, link_path: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute("insert into Paths (path, ino) values (?1, ?2)", params![link_path, target_ino as i64])?;
        tx.commit()?;
        Ok(())
    }

    /// Remove a Path; if it was the File's last binding, remove the File
    /// too. Used by `unlink` (any file type except directories).
    pub async fn unlink_txn(&self, path: &str, ino: u64) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let removed = tx.execute("delete from Paths where path = ?1", params![path])?;
        if removed == 0 {
            return Err(Error::NoEntry);
        }
        let remaining: i64 =
            tx.query_row("select count(*) from Paths where ino = ?1", params![ino as i64], |r| r.get(0))?;
        if remaining == 0 {
            tx.execute("delete from Files where ino = ?1", params![ino as i64])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Remove a directory's Path and File row. A directory must have
    /// exactly one Path; if it doesn't, the rows are left untouched and
    /// [`Error::mismatch`] is returned so the caller can surface EIO.
    pub async fn rmdir_txn(&self, path: &str, ino: u64) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let path_count: i64 =
            tx.query_row("select count(*) from Paths where ino = ?1", params![ino as i64], |r| r.get(0))?;
        if path_count != 1 {
            return Err(Error::mismatch(format!("directory ino {ino} has {path_count} path bindings")));
        }
        tx.execute("delete from Paths where path = ?1", params![path])?;
        tx.execute("delete from Files where ino = ?1", params![ino as i64])?;
        tx.commit()?;
        Ok(())
    }

    /// Move a Path from `old_path` to `new_path`, leaving the File
    /// untouched.
    pub async fn rename_txn(&self, old_path: &str, new_path: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let ino: i64 = tx
            .query_row("select ino from Paths where path = ?1", params![old_path], |r| r.get(0))
            .optional()?
            .ok_or(Error::NoEntry)?;
        tx.execute("delete from Paths where path = ?1", params![old_path])?;
        tx.execute("insert into Paths (path, ino) values (?1, ?2)", params![new_path, ino])?;
        tx.commit()?;
        Ok(())
    }
}
