//! POSIX rwx permission evaluation, plus the one administrator bypass.

use crate::meta::{File, User};
use crate::ADMIN_UID;

/// The access mode an operation is being checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read,
    Write,
    Exec,
}

impl Op {
    fn mask(self) -> u32 {
        match self {
            Op::Read => 0o4,
            Op::Write => 0o2,
            Op::Exec => 0o1,
        }
    }
}

/// Whether `user` may perform `op` on `file`.
///
/// `user_group` is the caller's primary group, already resolved by the
/// caller via `MetaStore::find_group_of_user` — kept as a parameter here so
/// this function stays a pure, synchronous check.
pub fn allowed(file: &File, op: Op, user: &User) -> bool {
    if user.uid == ADMIN_UID {
        return true;
    }
    let mask = op.mask();
    let owner_bits = (file.permissions >> 6) & mask;
    let group_bits = (file.permissions >> 3) & mask;
    let other_bits = file.permissions & mask;

    if user.uid == file.owner_uid && owner_bits == mask {
        return true;
    }
    if let (Some(file_gid), Some(user_gid)) = (file.group_gid, user.group_gid) {
        if file_gid == user_gid && group_bits == mask {
            return true;
        }
    }
    other_bits == mask
}
