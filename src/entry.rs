//! The wire-facing entry descriptor: one `lstat` plus one MetaStore `File`
//! row, joined at response-assembly time. Never persisted — always built
//! fresh from the sources of truth.

use serde::Serialize;

use crate::backing_store::Stat;
use crate::meta::{File, FileType};
use crate::path_codec;

/// JSON shape returned by lookup/readdir/getattr/setattr/mkdir/create.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub ino: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: u8,
    pub permissions: u32,
    pub owner: u32,
    pub group: Option<u32>,
    pub size: String,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
    pub btime: Option<i64>,
    pub nlinks: u32,
}

impl Entry {
    /// Assemble the descriptor for `canonical_path`, given its File row and
    /// a fresh stat of the backing entry.
    pub fn assemble(canonical_path: &str, file: &File, stat: &Stat) -> Self {
        let name = path_codec::basename(canonical_path).unwrap_or("").to_owned();
        Entry {
            ino: file.ino.to_string(),
            name,
            path: canonical_path.to_owned(),
            entry_type: file_type_tag(file.file_type),
            permissions: file.permissions,
            owner: file.owner_uid,
            group: file.group_gid,
            size: stat.size.to_string(),
            atime: stat.atime_ms,
            mtime: stat.mtime_ms,
            ctime: stat.ctime_ms,
            btime: stat.btime_ms,
            nlinks: stat.nlink,
        }
    }
}

fn file_type_tag(file_type: FileType) -> u8 {
    match file_type {
        FileType::Regular => 0,
        FileType::Directory => 1,
        FileType::Symlink => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_entry_from_file_and_stat() {
        let file = File { ino: 7, file_type: FileType::Regular, permissions: 0o644, owner_uid: 42, group_gid: None };
        let stat = Stat {
            ino: 7,
            is_dir: false,
            is_symlink: false,
            size: 12,
            nlink: 1,
            atime_ms: 1,
            mtime_ms: 2,
            ctime_ms: 3,
            btime_ms: Some(4),
        };
        let entry = Entry::assemble("/docs/hello.txt", &file, &stat);
        assert_eq!(entry.ino, "7");
        assert_eq!(entry.name, "hello.txt");
        assert_eq!(entry.entry_type, 0);
        assert_eq!(entry.size, "12");
    }
}
