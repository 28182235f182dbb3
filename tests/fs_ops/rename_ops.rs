use crate::common::{Fixture, ROOT_INO};
use rfsd::Error;

#[tokio::test]
async fn rename_moves_file_between_directories() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let dir = fixture.fs.mkdir(ROOT_INO, "dest", &admin).await.unwrap();
    let dir_ino: u64 = dir.ino.parse().unwrap();

    let created = fixture.fs.create(ROOT_INO, "old.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();
    fixture.fs.write(ino, 0, b"renamed", &admin).await.unwrap();

    let moved =
        fixture.fs.rename(ROOT_INO, "old.txt", dir_ino, "new.txt", &admin).await.expect("rename succeeds");
    assert_eq!(moved.path, "/dest/new.txt");

    let err = fixture.fs.lookup(ROOT_INO, "old.txt", &admin).await.expect_err("old name is gone");
    assert_eq!(err, Error::NoEntry);

    let data = fixture.fs.read(ino, 0, 16, &admin).await.expect("read via unchanged ino");
    assert_eq!(data, b"renamed");
}

#[tokio::test]
async fn rename_rejects_empty_name() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let dir = fixture.fs.mkdir(ROOT_INO, "dest", &admin).await.unwrap();
    let dir_ino: u64 = dir.ino.parse().unwrap();

    assert!(fixture.fs.rename(ROOT_INO, "", dir_ino, "copy", &admin).await.is_err());
}
