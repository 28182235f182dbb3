use crate::common::{Fixture, ROOT_INO};
use rfsd::Error;

#[tokio::test]
async fn mkdir_creates_directory_entry() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let entry = fixture.fs.mkdir(ROOT_INO, "docs", &admin).await.expect("mkdir succeeds");
    assert_eq!(entry.path, "/docs");
    assert_eq!(entry.entry_type, 1);
}

#[tokio::test]
async fn readdir_lists_created_children_sorted() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    fixture.fs.mkdir(ROOT_INO, "b_dir", &admin).await.unwrap();
    fixture.fs.create(ROOT_INO, "a_file.txt", &admin).await.unwrap();

    let mut entries = fixture.fs.readdir(ROOT_INO, &admin).await.expect("readdir succeeds");
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    let names: Vec<_> = entries.into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["a_file.txt".to_owned(), "b_dir".to_owned()]);
}

#[tokio::test]
async fn rmdir_rejects_nonempty_directory() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    let dir = fixture.fs.mkdir(ROOT_INO, "docs", &admin).await.unwrap();
    let dir_ino: u64 = dir.ino.parse().unwrap();
    fixture.fs.create(dir_ino, "note.txt", &admin).await.unwrap();

    let err = fixture.fs.rmdir(ROOT_INO, "docs", &admin).await.expect_err("rmdir fails");
    assert_eq!(err, Error::NotEmpty);
}

#[tokio::test]
async fn rmdir_removes_empty_directory() {
    let fixture = Fixture::new().await;
    let admin = fixture.admin().await;

    fixture.fs.mkdir(ROOT_INO, "empty", &admin).await.unwrap();
    fixture.fs.rmdir(ROOT_INO, "empty", &admin).await.expect("rmdir succeeds");

    let err = fixture.fs.lookup(ROOT_INO, "empty", &admin).await.expect_err("directory is gone");
    assert_eq!(err, Error::NoEntry);
}
