use crate::common::{Fixture, ROOT_INO};
use rfsd::Error;

const OTHER_UID: u32 = 6000;

#[tokio::test]
async fn other_user_cannot_write_default_permissions() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;
    fixture.add_user(OTHER_UID, None);
    let other = fixture.caller(OTHER_UID).await;

    let created = fixture.fs.create(ROOT_INO, "a.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();
    assert_eq!(created.permissions, 0o644);

    let err = fixture.fs.write(ino, 0, b"hi", &other).await.expect_err("other user cannot write");
    assert_eq!(err, Error::Access);
}

#[tokio::test]
async fn other_user_can_read_default_permissions() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;
    fixture.add_user(OTHER_UID, None);
    let other = fixture.caller(OTHER_UID).await;

    let created = fixture.fs.create(ROOT_INO, "a.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();
    fixture.fs.write(ino, 0, b"hi", &admin).await.unwrap();

    let data = fixture.fs.read(ino, 0, 16, &other).await.expect("other user can read world-readable file");
    assert_eq!(data, b"hi");
}

#[tokio::test]
async fn owner_chmod_to_owner_only_locks_out_other_user() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;
    fixture.add_user(OTHER_UID, None);
    let other = fixture.caller(OTHER_UID).await;

    let created = fixture.fs.create(ROOT_INO, "secret.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();
    fixture.fs.setattr(ino, Some(0o600), None, None, None, &admin).await.unwrap();

    let err = fixture.fs.read(ino, 0, 16, &other).await.expect_err("locked out after chmod");
    assert_eq!(err, Error::Access);
}

#[tokio::test]
async fn admin_bypasses_permission_checks_even_with_zero_mode() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let created = fixture.fs.create(ROOT_INO, "locked.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();
    fixture.fs.setattr(ino, Some(0o000), None, None, None, &admin).await.unwrap();

    fixture.fs.write(ino, 0, b"still works", &admin).await.expect("admin bypasses permission bits");
}
