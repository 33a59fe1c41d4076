//! Mock authentication: one persisted key-value slot for the signed-in user.
//!
//! The core never branches on identity beyond stamping `created_by`; this
//! module only remembers who is logged in between shell runs.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::FormError;

const SESSION_FILE: &str = "session.json";
const TMP_SUFFIX: &str = "tmp";

/// The authenticated user's identity slot, shape `{id, email, name}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl AuthUser {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Persists the [`AuthUser`] slot as a single JSON file.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Uses the platform data directory, falling back to the current
    /// directory when none is available.
    pub fn new() -> Result<Self, FormError> {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("form_core");
        Self::with_base_dir(base)
    }

    pub fn with_base_dir(base: impl Into<PathBuf>) -> Result<Self, FormError> {
        let base = base.into();
        ensure_dir(&base)?;
        Ok(Self {
            path: base.join(SESSION_FILE),
        })
    }

    /// Returns the stored user, or `None` when nobody is logged in.
    pub fn load(&self) -> Result<Option<AuthUser>, FormError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    pub fn save(&self, user: &AuthUser) -> Result<(), FormError> {
        let json = serde_json::to_string_pretty(user)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(email = %user.email, "session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), FormError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn ensure_dir(path: &Path) -> Result<(), FormError> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), FormError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_load_clear_roundtrip() {
        let temp = TempDir::new().expect("temp dir");
        let store = SessionStore::with_base_dir(temp.path()).expect("session store");
        assert!(store.load().expect("load empty").is_none());

        let user = AuthUser::new("ada@example.com", "Ada");
        store.save(&user).expect("save user");
        let loaded = store.load().expect("load user").expect("user present");
        assert_eq!(loaded, user);

        store.clear().expect("clear session");
        assert!(store.load().expect("load cleared").is_none());
    }
}
