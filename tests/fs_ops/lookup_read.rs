use crate::common::{Fixture, ROOT_INO};
use rfsd::Error;

#[tokio::test]
async fn lookup_finds_created_file() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    fixture.fs.create(ROOT_INO, "hello.txt", &admin).await.unwrap();
    let entry = fixture.fs.lookup(ROOT_INO, "hello.txt", &admin).await.expect("lookup succeeds");
    assert_eq!(entry.path, "/hello.txt");
    assert_eq!(entry.entry_type, 0);
}

#[tokio::test]
async fn lookup_missing_entry_is_no_entry() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let err = fixture.fs.lookup(ROOT_INO, "nope.txt", &admin).await.expect_err("lookup fails");
    assert_eq!(err, Error::NoEntry);
}

#[tokio::test]
async fn read_returns_written_bytes() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let created = fixture.fs.create(ROOT_INO, "notes.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();
    fixture.fs.write(ino, 0, b"abcdefghijklmnopqrstuvwxyz", &admin).await.unwrap();

    let data = fixture.fs.read(ino, 2, 6, &admin).await.expect("read succeeds");
    assert_eq!(data, b"cdefgh");
}

#[tokio::test]
async fn read_past_eof_is_empty() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let created = fixture.fs.create(ROOT_INO, "short.txt", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();
    fixture.fs.write(ino, 0, b"abc", &admin).await.unwrap();

    let data = fixture.fs.read(ino, 10, 16, &admin).await.expect("read past eof");
    assert!(data.is_empty());
}
