//! Persistent on-disk frame store.
//!
//! Each entry lives in its own file named after the SHA-256 of its key:
//!
//! ```text
//! RLF1 <status> <content-type or ->\n
//! <key>\n
//! <body bytes>
//! ```
//!
//! The key line is checked on read so a truncated or foreign file is treated
//! as a miss rather than served.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::r#trait::FrameStore;
use crate::cache::types::CacheError;
use crate::provider::HttpResponse;

const MAGIC: &str = "RLF1";
const ENTRY_EXTENSION: &str = "frame";
const NO_CONTENT_TYPE: &str = "-";

/// Frame store that persists across sessions in a directory.
#[derive(Debug, Clone)]
pub struct DiskFrameStore {
    directory: PathBuf,
}

impl DiskFrameStore {
    /// Open (creating if needed) a store rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let directory = directory.into();
        if !directory.exists() {
            fs::create_dir_all(&directory)?;
        }
        Ok(Self { directory })
    }

    /// Root directory of the store.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file holding `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.directory
            .join(format!("{:x}.{}", digest, ENTRY_EXTENSION))
    }

    /// Total size of entry files in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.entry_files()
            .iter()
            .filter_map(|path| fs::metadata(path).ok())
            .map(|meta| meta.len())
            .sum()
    }

    fn entry_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.directory) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION))
            .collect()
    }
}

fn encode_entry(key: &str, response: &HttpResponse) -> Result<Vec<u8>, CacheError> {
    if key.contains('\n') || key.contains('\r') {
        return Err(CacheError::Unstorable {
            key: key.to_string(),
            reason: "key contains a line break".to_string(),
        });
    }
    let content_type = response
        .content_type
        .as_deref()
        .filter(|ct| !ct.is_empty() && !ct.contains('\n'))
        .unwrap_or(NO_CONTENT_TYPE);

    let mut bytes = format!("{} {} {}\n{}\n", MAGIC, response.status, content_type, key)
        .into_bytes();
    bytes.extend_from_slice(&response.body);
    Ok(bytes)
}

fn split_line(bytes: &[u8]) -> Option<(&str, &[u8])> {
    let end = bytes.iter().position(|&b| b == b'\n')?;
    let line = std::str::from_utf8(&bytes[..end]).ok()?;
    Some((line, &bytes[end + 1..]))
}

fn decode_entry(path: &Path, bytes: &[u8]) -> Result<(String, HttpResponse), CacheError> {
    let corrupt = |reason: &str| CacheError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let (header, rest) = split_line(bytes).ok_or_else(|| corrupt("missing header"))?;
    let (key, body) = split_line(rest).ok_or_else(|| corrupt("missing key line"))?;

    let mut fields = header.splitn(3, ' ');
    if fields.next() != Some(MAGIC) {
        return Err(corrupt("bad magic"));
    }
    let status = fields
        .next()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| corrupt("bad status"))?;
    let content_type = match fields.next() {
        Some(NO_CONTENT_TYPE) | None => None,
        Some(ct) => Some(ct.to_string()),
    };

    Ok((
        key.to_string(),
        HttpResponse {
            status,
            content_type,
            body: body.to_vec(),
        },
    ))
}

impl FrameStore for DiskFrameStore {
    fn get(&self, key: &str) -> Option<HttpResponse> {
        let path = self.entry_path(key);
        let bytes = fs::read(&path).ok()?;

        match decode_entry(&path, &bytes) {
            Ok((stored_key, response)) if stored_key == key => Some(response),
            Ok((stored_key, _)) => {
                warn!(path = %path.display(), stored_key = %stored_key, "Cache entry key mismatch");
                None
            }
            Err(e) => {
                debug!(error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    fn put(&self, key: &str, response: &HttpResponse) -> Result<(), CacheError> {
        let bytes = encode_entry(key, response)?;
        let path = self.entry_path(key);
        let tmp = path.with_extension("tmp");

        fs::write(&tmp, &bytes)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(key = key, bytes = bytes.len(), "Frame stored on disk");
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.entry_path(key).exists()
    }

    fn len(&self) -> usize {
        self.entry_files().len()
    }

    fn clear(&self) -> Result<(), CacheError> {
        for path in self.entry_files() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
