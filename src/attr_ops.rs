//! lookup, readdir, getattr, setattr.

use crate::entry::Entry;
use crate::meta::FileType;
use crate::path_codec;
use crate::permission::Op;
use crate::service::{Caller, Filesystem};
use crate::{Error, Result};

impl Filesystem {
    /// Resolve `name` inside the directory `parent_ino`.
    pub async fn lookup(&self, parent_ino: u64, name: &str, caller: &Caller) -> Result<Entry> {
        let parent = self.require_file(parent_ino).await?;
        Self::require_dir(&parent)?;
        Self::check(&parent, Op::Read, caller)?;

        let parent_path = self.path_of(parent_ino).await?;
        let child_path = path_codec::child_path_of(&parent_path, name)?;

        let stat = self.backing.lstat(&child_path).await?;
        let file = self
            .meta
            .find_file_by_ino(stat.ino)
            .await?
            .ok_or_else(|| Error::mismatch(format!("lookup: no File row for ino {}", stat.ino)))?;
        let path_row = self.meta.find_path(&child_path).await?.ok_or(Error::mismatch("lookup: no Path row for stat'd entry"))?;
        if path_row.ino != file.ino {
            return Err(Error::mismatch("lookup: Path/File ino mismatch"));
        }

        Ok(Entry::assemble(&child_path, &file, &stat))
    }

    /// List the entries directly inside the directory `ino`, omitting any
    /// child the caller cannot read.
    pub async fn readdir(&self, ino: u64, caller: &Caller) -> Result<Vec<Entry>> {
        let dir = self.require_file(ino).await?;
        Self::require_dir(&dir)?;
        Self::check(&dir, Op::Read, caller)?;

        let dir_path = self.path_of(ino).await?;
        let names = self.backing.readdir(&dir_path).await?;

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let child_path = path_codec::child_path_of(&dir_path, &name)?;
            let stat = self.backing.lstat(&child_path).await?;
            let file = self
                .meta
                .find_file_by_ino(stat.ino)
                .await?
                .ok_or_else(|| Error::mismatch(format!("readdir: no File row for ino {}", stat.ino)))?;
            if !crate::permission::allowed(&file, Op::Read, &caller.user) {
                continue;
            }
            entries.push(Entry::assemble(&child_path, &file, &stat));
        }
        Ok(entries)
    }

    /// Fetch `ino`'s attributes. If `if_modified_since` (seconds since the
    /// epoch) is at or after the entry's current mtime, returns `None` to
    /// signal "not modified".
    pub async fn getattr(&self, ino: u64, if_modified_since: Option<i64>, caller: &Caller) -> Result<Option<Entry>> {
        let file = self.require_file(ino).await?;
        Self::check(&file, Op::Read, caller)?;

        let path = self.path_of(ino).await?;
        let stat = self.backing.lstat(&path).await?;

        if let Some(since) = if_modified_since {
            if since * 1000 >= stat.mtime_ms {
                return Ok(None);
            }
        }
        Ok(Some(Entry::assemble(&path, &file, &stat)))
    }

    /// Apply the requested attribute changes and return the updated entry.
    pub async fn setattr(
        &self,
        ino: u64,
        perm: Option<u32>,
        uid: Option<u32>,
        gid: Option<u32>,
        size: Option<u64>,
        caller: &Caller,
    ) -> Result<Entry> {
        let file = self.require_file(ino).await?;
        Self::check(&file, Op::Write, caller)?;
        let path = self.path_of(ino).await?;

        if let Some(perm) = perm {
            if perm > 0o777 {
                return Err(Error::invalid("permissions out of range"));
            }
            self.backing.chmod(&path, perm).await?;
            self.meta.update_permissions(ino, perm).await?;
        }

        if let Some(new_uid) = uid {
            let (owner_uid, group_gid) = match self.meta.find_user(new_uid).await? {
                Some(target) => (target.uid, target.group_gid),
                None => (caller.user.uid, caller.user.group_gid),
            };
            self.meta.update_owner_group(ino, owner_uid, group_gid).await?;
        } else if gid.is_some() {
            return Err(Error::Access);
        }

        if let Some(size) = size {
            if matches!(file.file_type, FileType::Directory) {
                return Err(Error::IsDir);
            }
            self.backing.truncate(&path, size).await?;
        }

        let file = self.require_file(ino).await?;
        let stat = self.backing.lstat(&path).await?;
        Ok(Entry::assemble(&path, &file, &stat))
    }
}
