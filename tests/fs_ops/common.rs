use rfsd::backing_store::BackingStore;
use rfsd::meta::MetaStore;
use rfsd::service::{Caller, Filesystem};
use rfsd::ADMIN_UID;
use rusqlite::{params, Connection};
use tempfile::TempDir;

pub const ROOT_INO: u64 = 1;

pub struct Fixture {
    pub backing_dir: TempDir,
    db_dir: TempDir,
    pub fs: Filesystem,
}

impl Fixture {
    pub async fn new() -> Self {
        let backing_dir = TempDir::new().expect("create backing temp dir");
        let db_dir = TempDir::new().expect("create db temp dir");
        let db_path = db_dir.path().join("meta.db");
        let meta = MetaStore::open(&db_path).await.expect("open metastore");
        let backing = BackingStore::new(backing_dir.path());
        Self { backing_dir, db_dir, fs: Filesystem::new(meta, backing) }
    }

    pub async fn admin(&self) -> Caller {
        self.fs.caller(ADMIN_UID).await.expect("admin user is always seeded")
    }

    pub async fn caller(&self, uid: u32) -> Caller {
        self.fs.caller(uid).await.expect("user must exist")
    }

    /// Insert a User row the way the authentication collaborator's own
    /// schema migrations would, by opening a second connection onto the
    /// same database file. The core itself never writes this table.
    pub fn add_user(&self, uid: u32, group_gid: Option<u32>) {
        let conn = self.raw_conn();
        conn.execute(
            "insert into Users (uid, password_hash, group_gid) values (?1, '', ?2)",
            params![uid as i64, group_gid.map(|g| g as i64)],
        )
        .expect("seed test user");
    }

    pub fn add_group(&self, gid: u32) {
        let conn = self.raw_conn();
        conn.execute("insert into Groups (gid) values (?1)", params![gid as i64]).expect("seed test group");
    }

    fn raw_conn(&self) -> Connection {
        Connection::open(self.db_dir.path().join("meta.db")).expect("open metadata db directly")
    }
}
