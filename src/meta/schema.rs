//! SQLite schema for the metadata store.

/// Users, Groups, Files and Paths tables plus the indices MetaStore's
/// queries rely on. Group membership is the many-to-one `Users.group_gid`
/// foreign key rather than a separate membership table — a Group never
/// needs to enumerate its members for any operation in this crate.
pub const SCHEMA_SQL: &str = r#"
create table if not exists Groups (
    gid integer primary key
);

create table if not exists Users (
    uid           integer primary key,
    password_hash text not null,
    group_gid     integer references Groups(gid)
);

create table if not exists Files (
    ino         integer primary key,
    type        integer not null check (type in (0, 1, 2)),
    permissions integer not null check (permissions >= 0 and permissions <= 511),
    owner_uid   integer not null references Users(uid),
    group_gid   integer references Groups(gid)
);

create table if not exists Paths (
    path text primary key,
    ino  integer not null references Files(ino) on delete cascade
);

create index if not exists IndexPathsIno on Paths(ino);
"#;
