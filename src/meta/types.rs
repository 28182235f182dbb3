//! Plain record types for the metadata store. Owner/group "relations" are
//! non-null / nullable foreign-key fields looked up eagerly when an
//! operation needs the full row, never a cyclic object graph.

/// The type tag stored on a [`File`] row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular = 0,
    Directory = 1,
    Symlink = 2,
}

impl FileType {
    pub fn from_i64(v: i64) -> crate::Result<Self> {
        match v {
            0 => Ok(FileType::Regular),
            1 => Ok(FileType::Directory),
            2 => Ok(FileType::Symlink),
            other => Err(crate::Error::mismatch(format!("unknown file type {other}"))),
        }
    }

    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// A user account. The core only ever reads these rows; they are created by
/// the authentication collaborator.
#[derive(Debug, Clone)]
pub struct User {
    pub uid: u32,
    pub group_gid: Option<u32>,
}

/// A group. Membership is the `Users.group_gid` foreign key, so a `Group`
/// itself carries nothing beyond its id.
#[derive(Debug, Clone, Copy)]
pub struct Group {
    pub gid: u32,
}

/// An inode record.
#[derive(Debug, Clone)]
pub struct File {
    pub ino: u64,
    pub file_type: FileType,
    pub permissions: u32,
    pub owner_uid: u32,
    pub group_gid: Option<u32>,
}

/// A name binding: one canonical path pointing at one inode.
#[derive(Debug, Clone)]
pub struct Path {
    pub path: String,
    pub ino: u64,
}
