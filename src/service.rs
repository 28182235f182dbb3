//! Glues [`crate::meta::MetaStore`] and [`crate::backing_store::BackingStore`]
//! together behind one handle. [`crate::attr_ops`], [`crate::file_ops`] and
//! [`crate::io_ops`] are all `impl Filesystem` blocks defined in their own
//! files, rather than free functions, so every operation shares the same
//! resolve-check-mutate-commit helpers.

use std::sync::Arc;

use crate::backing_store::BackingStore;
use crate::meta::{File, MetaStore, User};
use crate::permission::{self, Op};
use crate::signup::{NoopSignupSink, SignupSink};
use crate::{Error, Result};

/// The caller an operation runs as.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user: User,
}

/// Shared handle to the two backing stores plus the signup side channel.
/// Cheap to clone — every field is internally reference-counted.
#[derive(Clone)]
pub struct Filesystem {
    pub(crate) meta: Arc<MetaStore>,
    pub(crate) backing: Arc<BackingStore>,
    pub(crate) signup: Arc<dyn SignupSink>,
}

impl Filesystem {
    /// Build a handle with a no-op signup sink, suitable for tests and for
    /// callers that never write the reserved files.
    pub fn new(meta: MetaStore, backing: BackingStore) -> Self {
        Self::with_signup(meta, backing, Arc::new(NoopSignupSink))
    }

    pub fn with_signup(meta: MetaStore, backing: BackingStore, signup: Arc<dyn SignupSink>) -> Self {
        Self { meta: Arc::new(meta), backing: Arc::new(backing), signup }
    }

    pub fn meta(&self) -> &MetaStore {
        &self.meta
    }

    pub fn backing(&self) -> &BackingStore {
        &self.backing
    }

    /// Build a [`Caller`] for `uid`, resolving its primary group.
    pub async fn caller(&self, uid: u32) -> Result<Caller> {
        let user = self.meta.find_user(uid).await?.ok_or(Error::Access)?;
        Ok(Caller { user })
    }

    /// Resolve an inode to its `File` row, or `ENOENT`.
    pub(crate) async fn require_file(&self, ino: u64) -> Result<File> {
        self.meta.find_file_by_ino(ino).await?.ok_or(Error::NoEntry)
    }

    /// Resolve a canonical path to the single `Path` row pointing at it, or
    /// `ENOENT`.
    pub(crate) async fn require_path_ino(&self, canonical: &str) -> Result<u64> {
        Ok(self.meta.find_path(canonical).await?.ok_or(Error::NoEntry)?.ino)
    }

    /// A canonical path bound to `ino`. Directories have exactly one
    /// (invariant 4); the first is used for anything that may be
    /// hardlinked.
    pub(crate) async fn path_of(&self, ino: u64) -> Result<String> {
        self.meta
            .find_paths_of_file(ino)
            .await?
            .into_iter()
            .next()
            .map(|p| p.path)
            .ok_or(Error::NoEntry)
    }

    pub(crate) fn require_dir(file: &File) -> Result<()> {
        if !matches!(file.file_type, crate::meta::FileType::Directory) {
            return Err(Error::NotDir);
        }
        Ok(())
    }

    pub(crate) fn check(file: &File, op: Op, caller: &Caller) -> Result<()> {
        if permission::allowed(file, op, &caller.user) {
            Ok(())
        } else {
            Err(Error::Access)
        }
    }
}
