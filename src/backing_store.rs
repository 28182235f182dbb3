//! The host directory tree that actually holds entry bytes. Every method
//! takes a canonical path (see [`crate::path_codec`]) and maps host I/O
//! errors onto [`Error`] via [`Error::from_io`].

use std::io::SeekFrom;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path as FsPath, PathBuf};

use tokio::fs::{self, File as TokioFile, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::path_codec;
use crate::{Error, Result};

/// A host `lstat` result, trimmed to what the core needs.
#[derive(Debug, Clone, Copy)]
pub struct Stat {
    pub ino: u64,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub size: u64,
    pub nlink: u32,
    pub atime_ms: i64,
    pub mtime_ms: i64,
    pub ctime_ms: i64,
    /// Creation time, when the host filesystem tracks one.
    pub btime_ms: Option<i64>,
}

/// Wraps a fixed root directory on the host filesystem.
#[derive(Debug, Clone)]
pub struct BackingStore {
    root: PathBuf,
}

impl BackingStore {
    /// Create a store rooted at `root`. The directory must already exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn fs_path(&self, canonical: &str) -> PathBuf {
        path_codec::to_fs_path(&self.root, canonical)
    }

    pub async fn mkdir(&self, canonical: &str) -> Result<()> {
        fs::create_dir(self.fs_path(canonical)).await.map_err(Error::from_io)
    }

    /// Remove an empty directory. Fails with [`Error::NotEmpty`] otherwise.
    pub async fn rmdir(&self, canonical: &str) -> Result<()> {
        fs::remove_dir(self.fs_path(canonical)).await.map_err(Error::from_io)
    }

    /// Create a new regular file, failing with [`Error::Exist`] if one is
    /// already there.
    pub async fn write_file_exclusive(&self, canonical: &str) -> Result<()> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.fs_path(canonical))
            .await
            .map(|_| ())
            .map_err(Error::from_io)
    }

    /// Open an existing regular file for reading and writing, not
    /// truncating its contents.
    pub async fn open_read_write(&self, canonical: &str) -> Result<TokioFile> {
        OpenOptions::new().read(true).write(true).open(self.fs_path(canonical)).await.map_err(Error::from_io)
    }

    pub async fn read(&self, canonical: &str, offset: u64, size: u64) -> Result<Vec<u8>> {
        let meta = fs::metadata(self.fs_path(canonical)).await.map_err(Error::from_io)?;
        let len = meta.len();
        if offset >= len {
            return Ok(Vec::new());
        }
        let to_read = size.min(len - offset) as usize;
        let mut file = self.open_read_write(canonical).await?;
        file.seek(SeekFrom::Start(offset)).await.map_err(Error::from_io)?;
        let mut buf = vec![0u8; to_read];
        file.read_exact(&mut buf).await.map_err(Error::from_io)?;
        Ok(buf)
    }

    pub async fn write(&self, canonical: &str, offset: u64, bytes: &[u8]) -> Result<u64> {
        let mut file = self.open_read_write(canonical).await?;
        file.seek(SeekFrom::Start(offset)).await.map_err(Error::from_io)?;
        file.write_all(bytes).await.map_err(Error::from_io)?;
        file.flush().await.map_err(Error::from_io)?;
        Ok(bytes.len() as u64)
    }

    /// Replace the full contents of an existing regular file.
    pub async fn overwrite(&self, canonical: &str, bytes: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new().write(true).truncate(true).open(self.fs_path(canonical)).await.map_err(Error::from_io)?;
        file.write_all(bytes).await.map_err(Error::from_io)?;
        file.flush().await.map_err(Error::from_io)
    }

    pub async fn truncate(&self, canonical: &str, size: u64) -> Result<()> {
        let file = OpenOptions::new().write(true).open(self.fs_path(canonical)).await.map_err(Error::from_io)?;
        file.set_len(size).await.map_err(Error::from_io)
    }

    pub async fn rename(&self, old: &str, new: &str) -> Result<()> {
        fs::rename(self.fs_path(old), self.fs_path(new)).await.map_err(Error::from_io)
    }

    pub async fn unlink(&self, canonical: &str) -> Result<()> {
        fs::remove_file(self.fs_path(canonical)).await.map_err(Error::from_io)
    }

    pub async fn symlink(&self, target: &str, linkpath: &str) -> Result<()> {
        let target = target.to_owned();
        let linkpath = self.fs_path(linkpath);
        tokio::task::spawn_blocking(move || std::os::unix::fs::symlink(target, linkpath))
            .await
            .map_err(|e| Error::mismatch(format!("symlink task panicked: {e}")))?
            .map_err(Error::from_io)
    }

    pub async fn link(&self, target: &str, linkpath: &str) -> Result<()> {
        let target = self.fs_path(target);
        let linkpath = self.fs_path(linkpath);
        tokio::task::spawn_blocking(move || std::fs::hard_link(target, linkpath))
            .await
            .map_err(|e| Error::mismatch(format!("link task panicked: {e}")))?
            .map_err(Error::from_io)
    }

    pub async fn readlink(&self, canonical: &str) -> Result<String> {
        let target = fs::read_link(self.fs_path(canonical)).await.map_err(Error::from_io)?;
        Ok(target.to_string_lossy().into_owned())
    }

    /// List entry names directly inside a directory, in no particular
    /// order.
    pub async fn readdir(&self, canonical: &str) -> Result<Vec<String>> {
        let mut rd = fs::read_dir(self.fs_path(canonical)).await.map_err(Error::from_io)?;
        let mut names = Vec::new();
        while let Some(entry) = rd.next_entry().await.map_err(Error::from_io)? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    /// `lstat` an entry: does not follow a final symlink component.
    pub async fn lstat(&self, canonical: &str) -> Result<Stat> {
        Self::lstat_path(&self.fs_path(canonical)).await
    }

    async fn lstat_path(path: &FsPath) -> Result<Stat> {
        let meta = fs::symlink_metadata(path).await.map_err(Error::from_io)?;
        let btime_ms = meta.created().ok().and_then(|t| {
            t.duration_since(std::time::UNIX_EPOCH).ok().map(|d| d.as_millis() as i64)
        });
        Ok(Stat {
            ino: meta.ino(),
            is_dir: meta.file_type().is_dir(),
            is_symlink: meta.file_type().is_symlink(),
            size: meta.len(),
            nlink: meta.nlink() as u32,
            atime_ms: meta.atime() * 1000 + meta.atime_nsec() / 1_000_000,
            mtime_ms: meta.mtime() * 1000 + meta.mtime_nsec() / 1_000_000,
            ctime_ms: meta.ctime() * 1000 + meta.ctime_nsec() / 1_000_000,
            btime_ms,
        })
    }

    /// Total and available bytes on the filesystem backing `root`, via
    /// `statvfs(2)`.
    #[cfg(unix)]
    pub async fn free_space(&self) -> Result<(u64, u64)> {
        use std::ffi::CString;
        use std::mem::MaybeUninit;

        let root = self.root.clone();
        tokio::task::spawn_blocking(move || -> Result<(u64, u64)> {
            let c_path = CString::new(root.as_os_str().as_encoded_bytes())
                .map_err(|e| Error::mismatch(format!("root path is not a valid C string: {e}")))?;
            let mut stat = MaybeUninit::<libc::statvfs>::uninit();
            // SAFETY: `c_path` is a valid NUL-terminated string and `stat` is
            // large enough for libc to fill in; the return value is checked.
            let rc = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
            if rc != 0 {
                return Err(Error::from_io(std::io::Error::last_os_error()));
            }
            let stat = unsafe { stat.assume_init() };
            let block_size = stat.f_frsize as u64;
            let total = stat.f_blocks as u64 * block_size;
            let available = stat.f_bavail as u64 * block_size;
            Ok((total, available))
        })
        .await
        .map_err(|e| Error::mismatch(format!("statvfs task panicked: {e}")))?
    }

    /// Apply a permission change to the backing entry. Symlinks have no
    /// mode of their own on most platforms; callers only invoke this for
    /// non-symlink files.
    pub async fn chmod(&self, canonical: &str, mode: u32) -> Result<()> {
        let path = self.fs_path(canonical);
        tokio::task::spawn_blocking(move || std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)))
            .await
            .map_err(|e| Error::mismatch(format!("chmod task panicked: {e}")))?
            .map_err(Error::from_io)
    }
}
