use crate::common::{Fixture, ROOT_INO};
use rfsd::Error;

#[tokio::test]
async fn symlink_create_and_readlink_round_trip() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let target = fixture.fs.create(ROOT_INO, "target.txt", &admin).await.unwrap();
    let target_ino: u64 = target.ino.parse().unwrap();
    fixture.fs.write(target_ino, 0, b"payload", &admin).await.unwrap();

    let link = fixture
        .fs
        .symlink("/target.txt", ROOT_INO, "link", &admin)
        .await
        .expect("make symlink succeeds");
    assert_eq!(link.entry_type, 2);
    let link_ino: u64 = link.ino.parse().unwrap();

    let resolved = fixture.fs.readlink(link_ino, &admin).await.expect("readlink succeeds");
    assert_eq!(resolved, "/target.txt");
}

#[tokio::test]
async fn readlink_rejects_non_symlink() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let created = fixture.fs.create(ROOT_INO, "plain.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();

    let err = fixture.fs.readlink(ino, &admin).await.expect_err("not a symlink");
    assert_eq!(err, Error::InvalidArgument("not a symlink".to_owned()));
}

#[tokio::test]
async fn hardlink_shares_inode_with_target() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let target = fixture.fs.create(ROOT_INO, "a.txt", &admin).await.unwrap();
    let target_ino: u64 = target.ino.parse().unwrap();
    fixture.fs.write(target_ino, 0, b"shared", &admin).await.unwrap();

    let linked = fixture.fs.hardlink(target_ino, ROOT_INO, "b.txt", &admin).await.expect("hardlink succeeds");
    assert_eq!(linked.ino, target.ino);

    let data = fixture.fs.read(target_ino, 0, 16, &admin).await.unwrap();
    assert_eq!(data, b"shared");
}
