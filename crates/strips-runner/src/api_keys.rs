//! API key registry.
//!
//! Each file name inside the key directory is one accepted key. The file
//! contents are not read. An empty registry disables access control.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::Result;

/// Set of accepted API keys.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    /// Load the keys from `dir`. A missing directory yields an empty set.
    pub fn load(dir: &Path) -> Result<Self> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    dir = %dir.display(),
                    "No API keys folder present. Proceeding without API access control."
                );
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut keys = HashSet::new();
        for entry in entries {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                keys.insert(name.to_string());
            }
        }

        if keys.is_empty() {
            warn!(
                dir = %dir.display(),
                "API keys folder empty. Proceeding without API access control."
            );
        } else {
            info!(dir = %dir.display(), count = keys.len(), "Loaded API keys");
        }
        Ok(Self { keys })
    }

    /// Build a registry from explicit keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether requests must carry a key.
    pub fn is_enforced(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Whether a request carrying `key` may proceed.
    pub fn allows(&self, key: Option<&str>) -> bool {
        if !self.is_enforced() {
            return true;
        }
        key.is_some_and(|k| self.keys.contains(k))
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key is registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_file_names() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("abc123"), b"").unwrap();
        std::fs::write(dir.path().join("other-key"), b"ignored contents").unwrap();

        let keys = ApiKeys::load(dir.path()).unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.allows(Some("abc123")));
        assert!(!keys.allows(Some("ignored contents")));
        assert!(!keys.allows(None));
    }

    #[test]
    fn test_missing_dir_disables_control() {
        let dir = tempfile::TempDir::new().unwrap();
        let keys = ApiKeys::load(&dir.path().join("apikeys")).unwrap();
        assert!(!keys.is_enforced());
        assert!(keys.allows(None));
        assert!(keys.allows(Some("anything")));
    }

    #[test]
    fn test_empty_dir_disables_control() {
        let dir = tempfile::TempDir::new().unwrap();
        let keys = ApiKeys::load(dir.path()).unwrap();
        assert!(keys.is_empty());
        assert!(keys.allows(None));
    }
}
