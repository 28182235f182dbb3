use crate::common::{Fixture, ROOT_INO};
use rfsd::Error;

#[tokio::test]
async fn create_gives_default_regular_permissions() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let entry = fixture.fs.create(ROOT_INO, "report.txt", &admin).await.expect("create succeeds");
    assert_eq!(entry.permissions, 0o644);
    assert_eq!(entry.entry_type, 0);
}

#[tokio::test]
async fn create_rejects_duplicate_name() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    fixture.fs.create(ROOT_INO, "data.bin", &admin).await.unwrap();
    let err = fixture.fs.create(ROOT_INO, "data.bin", &admin).await.expect_err("second create fails");
    assert_eq!(err, Error::Exist);
}

#[tokio::test]
async fn write_returns_byte_count_and_persists() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let created = fixture.fs.create(ROOT_INO, "data.bin", &admin).await.unwrap();
    let ino: u64 = created.ino.parse().unwrap();

    let payload = vec![1u8; 32];
    let written = fixture.fs.write(ino, 0, &payload, &admin).await.expect("write succeeds");
    assert_eq!(written, payload.len() as u64);

    let entry = fixture.fs.getattr(ino, None, &admin).await.unwrap().expect("getattr succeeds");
    assert_eq!(entry.size, "32");
}
