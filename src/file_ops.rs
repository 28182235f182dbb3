//! mkdir, rmdir, create, unlink, rename, hardlink, symlink, readlink.
//!
//! Every mutation follows resolve/check, mutate the backing store, commit
//! metadata, re-stat. If the backing mutation fails the metadata commit is
//! never attempted; if the metadata commit fails after a successful backing
//! mutation the divergence is logged and left for `readdir`/`lookup` to
//! surface as an `EIO` mismatch rather than silently repaired.

use tracing::error;

use crate::entry::Entry;
use crate::meta::FileType;
use crate::path_codec;
use crate::permission::Op;
use crate::service::{Caller, Filesystem};
use crate::{Error, Result};

impl Filesystem {
    pub async fn mkdir(&self, parent_ino: u64, name: &str, caller: &Caller) -> Result<Entry> {
        let parent = self.require_file(parent_ino).await?;
        Self::require_dir(&parent)?;
        Self::check(&parent, Op::Write, caller)?;
        let parent_path = self.path_of(parent_ino).await?;
        let child_path = path_codec::child_path_of(&parent_path, name)?;

        self.backing.mkdir(&child_path).await?;
        let stat = self.backing.lstat(&child_path).await?;
        let commit = self.meta.mkdir_txn(&child_path, stat.ino, caller.user.uid, caller.user.group_gid).await;
        let file = self.commit_or_log(&child_path, commit, "mkdir")?;
        Ok(Entry::assemble(&child_path, &file, &stat))
    }

    pub async fn rmdir(&self, parent_ino: u64, name: &str, caller: &Caller) -> Result<()> {
        let parent = self.require_file(parent_ino).await?;
        Self::require_dir(&parent)?;
        Self::check(&parent, Op::Write, caller)?;
        let parent_path = self.path_of(parent_ino).await?;
        let child_path = path_codec::child_path_of(&parent_path, name)?;
        let child_ino = self.require_path_ino(&child_path).await?;
        let child = self.require_file(child_ino).await?;
        Self::require_dir(&child)?;

        self.backing.rmdir(&child_path).await?;
        let commit = self.meta.rmdir_txn(&child_path, child_ino).await;
        self.commit_or_log_unit(&child_path, commit, "rmdir")
    }

    pub async fn create(&self, parent_ino: u64, name: &str, caller: &Caller) -> Result<Entry> {
        let parent = self.require_file(parent_ino).await?;
        Self::require_dir(&parent)?;
        Self::check(&parent, Op::Write, caller)?;
        let parent_path = self.path_of(parent_ino).await?;
        let child_path = path_codec::child_path_of(&parent_path, name)?;

        self.backing.write_file_exclusive(&child_path).await?;
        let stat = self.backing.lstat(&child_path).await?;
        let commit = self.meta.create_txn(&child_path, stat.ino, caller.user.uid, caller.user.group_gid).await;
        let file = self.commit_or_log(&child_path, commit, "create")?;
        Ok(Entry::assemble(&child_path, &file, &stat))
    }

    pub async fn unlink(&self, parent_ino: u64, name: &str, caller: &Caller) -> Result<()> {
        let parent = self.require_file(parent_ino).await?;
        Self::require_dir(&parent)?;
        Self::check(&parent, Op::Write, caller)?;
        let parent_path = self.path_of(parent_ino).await?;
        let child_path = path_codec::child_path_of(&parent_path, name)?;
        let child_ino = self.require_path_ino(&child_path).await?;
        let child = self.require_file(child_ino).await?;
        if matches!(child.file_type, FileType::Directory) {
            return Err(Error::IsDir);
        }

        self.backing.unlink(&child_path).await?;
        let commit = self.meta.unlink_txn(&child_path, child_ino).await;
        self.commit_or_log_unit(&child_path, commit, "unlink")
    }

    pub async fn rename(
        &self,
        old_parent_ino: u64,
        old_name: &str,
        new_parent_ino: u64,
        new_name: &str,
        caller: &Caller,
    ) -> Result<Entry> {
        let old_parent = self.require_file(old_parent_ino).await?;
        Self::require_dir(&old_parent)?;
        Self::check(&old_parent, Op::Write, caller)?;
        let new_parent = self.require_file(new_parent_ino).await?;
        Self::require_dir(&new_parent)?;
        Self::check(&new_parent, Op::Write, caller)?;

        let old_parent_path = self.path_of(old_parent_ino).await?;
        let old_path = path_codec::child_path_of(&old_parent_path, old_name)?;
        let new_parent_path = self.path_of(new_parent_ino).await?;
        let new_path = path_codec::child_path_of(&new_parent_path, new_name)?;
        let ino = self.require_path_ino(&old_path).await?;

        self.backing.rename(&old_path, &new_path).await?;
        let commit = self.meta.rename_txn(&old_path, &new_path).await;
        self.commit_or_log_unit(&new_path, commit, "rename")?;
        let file = self.require_file(ino).await?;
        let stat = self.backing.lstat(&new_path).await?;
        Ok(Entry::assemble(&new_path, &file, &stat))
    }

    pub async fn hardlink(&self, target_ino: u64, link_parent_ino: u64, link_name: &str, caller: &Caller) -> Result<Entry> {
        let target = self.require_file(target_ino).await?;
        if matches!(target.file_type, FileType::Directory) {
            return Err(Error::IsDir);
        }
        let link_parent = self.require_file(link_parent_ino).await?;
        Self::require_dir(&link_parent)?;
        Self::check(&link_parent, Op::Write, caller)?;

        let target_path = self.path_of(target_ino).await?;
        let link_parent_path = self.path_of(link_parent_ino).await?;
        let link_path = path_codec::child_path_of(&link_parent_path, link_name)?;

        self.backing.link(&target_path, &link_path).await?;
        let commit = self.meta.hardlink_txn(target_ino, &link_path).await;
        self.commit_or_log_unit(&link_path, commit, "hardlink")?;
        let stat = self.backing.lstat(&link_path).await?;
        Ok(Entry::assemble(&link_path, &target, &stat))
    }

    pub async fn symlink(
        &self,
        target_path: &str,
        link_parent_ino: u64,
        link_name: &str,
        caller: &Caller,
    ) -> Result<Entry> {
        let link_parent = self.require_file(link_parent_ino).await?;
        Self::require_dir(&link_parent)?;
        Self::check(&link_parent, Op::Write, caller)?;

        let link_parent_path = self.path_of(link_parent_ino).await?;
        let link_path = path_codec::child_path_of(&link_parent_path, link_name)?;

        self.backing.symlink(target_path, &link_path).await?;
        let stat = self.backing.lstat(&link_path).await?;
        let commit = self.meta.symlink_txn(&link_path, stat.ino, caller.user.uid, caller.user.group_gid).await;
        let file = self.commit_or_log(&link_path, commit, "symlink")?;
        Ok(Entry::assemble(&link_path, &file, &stat))
    }

    pub async fn readlink(&self, ino: u64, caller: &Caller) -> Result<String> {
        let file = self.require_file(ino).await?;
        if !matches!(file.file_type, FileType::Symlink) {
            return Err(Error::invalid("not a symlink"));
        }
        Self::check(&file, Op::Read, caller)?;
        let path = self.path_of(ino).await?;
        self.backing.readlink(&path).await
    }

    /// Log and propagate a failed metadata commit that followed a
    /// successful backing mutation.
    fn commit_or_log<T>(&self, path: &str, commit: Result<T>, op: &str) -> Result<T> {
        commit.map_err(|e| {
            error!(path, op, error = %e, "metadata commit failed after backing mutation succeeded");
            e
        })
    }

    fn commit_or_log_unit(&self, path: &str, commit: Result<()>, op: &str) -> Result<()> {
        self.commit_or_log(path, commit, op)
    }
}
