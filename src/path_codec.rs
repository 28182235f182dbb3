//! Path hygiene: normalizes client-supplied paths into canonical POSIX form
//! and maps them onto the backing store. Consolidated here so traversal
//! attacks are rejected in exactly one place for anything that leaves this
//! module.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A single raw path the client may have sent: a plain string, a sequence of
/// segments, or (from a Windows-side driver) backslash-separated.
pub enum RawPath<'a> {
    Single(&'a str),
    Segments(&'a [&'a str]),
}

/// Normalize `raw` into a canonical POSIX path beginning with `/`.
///
/// Rejects any result that escapes the root or contains a `.`/`..` segment
/// after normalization with [`Error::InvalidArgument`].
pub fn normalize(raw: RawPath<'_>) -> Result<String> {
    let owned: String;
    let segments: Vec<&str> = match raw {
        RawPath::Single(s) => {
            owned = s.replace('\\', "/");
            owned.split('/').collect()
        }
        RawPath::Segments(segs) => segs.to_vec(),
    };

    let mut parts: Vec<&str> = Vec::new();
    for seg in segments {
        if seg.is_empty() {
            continue;
        }
        if seg == "." {
            continue;
        }
        if seg == ".." {
            return Err(Error::invalid("path escapes root"));
        }
        parts.push(seg);
    }

    let canonical = format!("/{}", parts.join("/"));
    if !canonical.starts_with('/') {
        return Err(Error::invalid("path escapes root"));
    }
    Ok(canonical)
}

/// Append `canonical` to the fixed filesystem root.
pub fn to_fs_path(root: &Path, canonical: &str) -> PathBuf {
    debug_assert!(canonical.starts_with('/'));
    if canonical == "/" {
        return root.to_path_buf();
    }
    root.join(canonical.trim_start_matches('/'))
}

/// Build the canonical child path of `parent` given a single path segment
/// `name`. Rejects names that are empty, `.`, `..`, or contain `/`.
pub fn child_path_of(parent: &str, name: &str) -> Result<String> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(Error::invalid(format!("illegal name: {name:?}")));
    }
    if parent == "/" {
        Ok(format!("/{name}"))
    } else {
        Ok(format!("{parent}/{name}"))
    }
}

/// The final path segment of a canonical path. `/` has no basename.
pub fn basename(canonical: &str) -> Option<&str> {
    if canonical == "/" {
        return None;
    }
    canonical.rsplit('/').next()
}
