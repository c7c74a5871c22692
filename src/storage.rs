// ============================================================================
// SESSION STORAGE: per-session directories for uploaded and processed images
// ============================================================================
//
// Layout: `<root>/<session-id>/<sanitized filename>`. Session ids are UUID v4
// in canonical lowercase form. Every path handed out is checked to stay under
// `root`.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Result, TranspalentorError};
use crate::io;
use crate::raster::RasterImage;

pub const UNNAMED_FILE: &str = "unnamed_file";

pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// `true` only for a canonical (lowercase, hyphenated) UUID v4.
pub fn validate_session_id(session_id: &str) -> bool {
    match Uuid::parse_str(session_id) {
        Ok(id) => id.get_version_num() == 4 && id.hyphenated().to_string() == session_id,
        Err(_) => false,
    }
}

/// Make a user-supplied filename safe to join under a session directory.
///
/// Path separators and `..` become `_`, then anything outside
/// `[A-Za-z0-9-_.]` becomes `_`. An empty result becomes `unnamed_file`.
pub fn sanitize_filename(filename: &str) -> String {
    let flattened = filename.replace(['/', '\\'], "_").replace("..", "_");
    let cleaned: String = flattened
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        UNNAMED_FILE.to_string()
    } else {
        cleaned
    }
}

/// `<stem>_processed.png` for a stored filename.
pub fn processed_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(UNNAMED_FILE);
    format!("{}_processed.png", stem)
}

/// Swap the extension of a sanitized name for `ext` unless it already ends
/// with it.
pub fn with_extension(filename: &str, ext: &str) -> String {
    let suffix = format!(".{}", ext);
    if filename.ends_with(&suffix) {
        return filename.to_string();
    }
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    format!("{}{}", stem, suffix)
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_dir(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id)
    }

    /// Create the session directory if needed. Rejects malformed ids.
    pub fn ensure_session_dir(&self, session_id: &str) -> Result<PathBuf> {
        if !validate_session_id(session_id) {
            return Err(TranspalentorError::SessionNotFound(session_id.to_string()));
        }
        let dir = self.session_dir(session_id);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// `true` when `path` resolves to somewhere under the store root.
    ///
    /// Resolution is lexical for path components that do not exist yet, so a
    /// file about to be written can be checked before it is created.
    pub fn is_path_safe(&self, path: &Path) -> bool {
        let Ok(base) = absolutize(&self.root) else {
            return false;
        };
        match absolutize(path) {
            Ok(resolved) => resolved.starts_with(&base),
            Err(_) => false,
        }
    }

    /// Path of an existing file in an existing session.
    pub fn file_path(&self, session_id: &str, filename: &str) -> Result<PathBuf> {
        if !validate_session_id(session_id) {
            return Err(TranspalentorError::SessionNotFound(session_id.to_string()));
        }
        let path = self.session_dir(session_id).join(filename);
        if !self.is_path_safe(&path) {
            return Err(TranspalentorError::UnsafePath(path));
        }
        if !path.is_file() {
            return Err(TranspalentorError::SessionNotFound(session_id.to_string()));
        }
        Ok(path)
    }

    /// Store raw upload bytes under `filename` (already sanitized).
    pub fn save_upload(&self, session_id: &str, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = self.ensure_session_dir(session_id)?;
        let path = dir.join(filename);
        if !self.is_path_safe(&path) {
            return Err(TranspalentorError::UnsafePath(path));
        }
        fs::write(&path, bytes)?;
        log::info!("stored upload {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    pub fn load_raster(&self, session_id: &str, filename: &str) -> Result<RasterImage> {
        let path = self.file_path(session_id, filename)?;
        io::load_raster(&path)
    }

    /// Write `raster` as PNG under `filename` in the session, replacing any
    /// existing file of that name.
    pub fn persist_raster(&self, session_id: &str, filename: &str, raster: &RasterImage) -> Result<PathBuf> {
        let dir = self.ensure_session_dir(session_id)?;
        let path = dir.join(filename);
        if !self.is_path_safe(&path) {
            return Err(TranspalentorError::UnsafePath(path));
        }
        io::save_png(raster, &path)?;
        log::info!("persisted {}", path.display());
        Ok(path)
    }

    /// Remove a session directory and everything in it.
    pub fn cleanup(&self, session_id: &str) -> Result<()> {
        if !validate_session_id(session_id) {
            return Err(TranspalentorError::SessionNotFound(session_id.to_string()));
        }
        let dir = self.session_dir(session_id);
        if !dir.is_dir() {
            return Err(TranspalentorError::SessionNotFound(session_id.to_string()));
        }
        fs::remove_dir_all(&dir)?;
        log::info!("removed session {}", session_id);
        Ok(())
    }
}

/// Absolute, `..`-free form of `path`. Existing prefixes are canonicalized so
/// symlinks are followed; the non-existent tail is normalized lexically.
fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = if existing.exists() {
        existing.canonicalize()?
    } else {
        existing.to_path_buf()
    };
    for part in tail.into_iter().rev() {
        resolved.push(part);
    }

    let mut out = PathBuf::new();
    for comp in resolved.components() {
        match comp {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other),
        }
    }
    Ok(out)
}
