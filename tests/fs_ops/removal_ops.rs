use crate::common::{Fixture, ROOT_INO};
use rfsd::Error;

#[tokio::test]
async fn unlink_removes_file() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    fixture.fs.create(ROOT_INO, "temp.txt", &admin).await.unwrap();
    fixture.fs.unlink(ROOT_INO, "temp.txt", &admin).await.expect("unlink succeeds");

    let err = fixture.fs.lookup(ROOT_INO, "temp.txt", &admin).await.expect_err("file is gone");
    assert_eq!(err, Error::NoEntry);
}

#[tokio::test]
async fn unlink_rejects_directories() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    fixture.fs.mkdir(ROOT_INO, "dir", &admin).await.unwrap();
    let err = fixture.fs.unlink(ROOT_INO, "dir", &admin).await.expect_err("unlink a directory fails");
    assert_eq!(err, Error::IsDir);
}

#[tokio::test]
async fn unlink_keeps_file_alive_through_remaining_hardlink() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let created = fixture.fs.create(ROOT_INO, "a.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();
    fixture.fs.write(ino, 0, b"payload", &admin).await.unwrap();
    fixture.fs.hardlink(ino, ROOT_INO, "b.txt", &admin).await.unwrap();

    fixture.fs.unlink(ROOT_INO, "a.txt", &admin).await.expect("unlink first link succeeds");

    let data = fixture.fs.read(ino, 0, 16, &admin).await.expect("file still reachable via second link");
    assert_eq!(data, b"payload");
}
