use crate::common::{Fixture, ROOT_INO};

#[tokio::test]
async fn getattr_reports_not_modified_since_the_future() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let created = fixture.fs.create(ROOT_INO, "a.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();

    let far_future = 9_999_999_999i64;
    let result = fixture.fs.getattr(ino, Some(far_future), &admin).await.expect("getattr succeeds");
    assert!(result.is_none());
}

#[tokio::test]
async fn setattr_updates_permissions_and_size() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let created = fixture.fs.create(ROOT_INO, "resize.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();
    fixture.fs.write(ino, 0, b"abc", &admin).await.unwrap();

    let entry =
        fixture.fs.setattr(ino, Some(0o600), None, None, Some(1), &admin).await.expect("setattr succeeds");
    assert_eq!(entry.permissions, 0o600);
    assert_eq!(entry.size, "1");
}

#[tokio::test]
async fn setattr_changes_owner_to_a_known_user() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;
    fixture.add_user(7000, None);

    let created = fixture.fs.create(ROOT_INO, "a.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();

    let entry = fixture.fs.setattr(ino, None, Some(7000), None, None, &admin).await.expect("setattr succeeds");
    assert_eq!(entry.owner, 7000);
}
