//! File side-channel metadata
//!
//! Every renamed file carries its own original base name in out-of-band
//! metadata that travels with the file through renames, which is exactly
//! what makes restoration possible from the file alone, with no in-memory
//! state and no central index.
//!
//! The native carrier is an extended attribute (`user.pylo.orig`); because
//! xattrs are not universally available the mechanism is abstracted behind
//! [`SidecarStore`], with a JSON-document fallback keyed by the file's
//! current path. Map-backed stores do not travel with the file by
//! themselves, so the trait includes a [`relocate`](SidecarStore::relocate)
//! hook the renamer calls after every successful move; the xattr
//! implementation treats it as a no-op.

use std::path::Path;

use crate::error::Result;

/// Capability interface for per-file original-name metadata
pub trait SidecarStore: Send {
    /// Attach `name` to the file at `path`
    fn write_original_name(&self, path: &Path, name: &str) -> Result<()>;

    /// Read back the stored original name, trimmed of surrounding
    /// whitespace; `None` when absent or empty
    fn read_original_name(&self, path: &Path) -> Result<Option<String>>;

    /// Remove the stored original name, if any
    fn clear_original_name(&self, path: &Path) -> Result<()>;

    /// Follow the file after a rename from `from` to `to`
    ///
    /// No-op for carriers that physically travel with the file.
    fn relocate(&self, _from: &Path, _to: &Path) -> Result<()> {
        Ok(())
    }
}

/// Normalize raw sidecar bytes into the stored name
fn normalize(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(unix)]
pub use self::unix::XattrSidecar;

#[cfg(unix)]
mod unix {
    use std::path::Path;

    use crate::error::{PyloError, Result};

    use super::{normalize, SidecarStore};

    /// Name of the extended attribute holding the original base name
    const ATTR_NAME: &str = "user.pylo.orig";

    /// Extended-attribute backed sidecar store
    ///
    /// The attribute lives on the file's own filesystem entry, so its
    /// lifetime is bound to the file and it moves with every rename.
    #[derive(Debug, Default)]
    pub struct XattrSidecar;

    impl SidecarStore for XattrSidecar {
        fn write_original_name(&self, path: &Path, name: &str) -> Result<()> {
            xattr::set(path, ATTR_NAME, name.as_bytes())
                .map_err(|e| PyloError::sidecar(format!("set {:?}: {}", path, e)))
        }

        fn read_original_name(&self, path: &Path) -> Result<Option<String>> {
            match xattr::get(path, ATTR_NAME) {
                Ok(Some(bytes)) => Ok(normalize(&bytes)),
                Ok(None) => Ok(None),
                Err(e) => Err(PyloError::sidecar(format!("get {:?}: {}", path, e))),
            }
        }

        fn clear_original_name(&self, path: &Path) -> Result<()> {
            xattr::remove(path, ATTR_NAME)
                .map_err(|e| PyloError::sidecar(format!("remove {:?}: {}", path, e)))
        }
    }
}

pub use self::json::JsonSidecar;

mod json {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use tracing::debug;

    use crate::error::Result;
    use crate::utils::atomic_write;

    use super::{normalize, SidecarStore};

    /// File name of the fallback sidecar document inside the data dir
    const FILE_MAP_NAME: &str = "pylo_files.orig.json";

    /// JSON-document fallback sidecar store
    ///
    /// One object per user profile mapping a file's current absolute path
    /// to its original base name. For platforms or filesystems without
    /// extended attributes. A missing or unparseable document is treated
    /// as empty, never as an error.
    #[derive(Debug)]
    pub struct JsonSidecar {
        doc_path: PathBuf,
    }

    impl JsonSidecar {
        /// Create a store persisting under the given application-data dir
        pub fn new(data_dir: &Path) -> Self {
            JsonSidecar {
                doc_path: data_dir.join(FILE_MAP_NAME),
            }
        }

        fn load(&self) -> HashMap<String, String> {
            match std::fs::read_to_string(&self.doc_path) {
                Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                    debug!("Sidecar document unparseable, starting empty: {}", e);
                    HashMap::new()
                }),
                Err(_) => HashMap::new(),
            }
        }

        fn save(&self, map: &HashMap<String, String>) -> Result<()> {
            let json = serde_json::to_vec(map)?;
            atomic_write(&self.doc_path, &json)
        }

        fn key(path: &Path) -> String {
            path.to_string_lossy().into_owned()
        }
    }

    impl SidecarStore for JsonSidecar {
        fn write_original_name(&self, path: &Path, name: &str) -> Result<()> {
            let mut map = self.load();
            map.insert(Self::key(path), name.to_string());
            self.save(&map)
        }

        fn read_original_name(&self, path: &Path) -> Result<Option<String>> {
            Ok(self
                .load()
                .get(&Self::key(path))
                .and_then(|name| normalize(name.as_bytes())))
        }

        fn clear_original_name(&self, path: &Path) -> Result<()> {
            let mut map = self.load();
            if map.remove(&Self::key(path)).is_some() {
                self.save(&map)?;
            }
            Ok(())
        }

        fn relocate(&self, from: &Path, to: &Path) -> Result<()> {
            let mut map = self.load();
            if let Some(name) = map.remove(&Self::key(from)) {
                map.insert(Self::key(to), name);
                self.save(&map)?;
            }
            Ok(())
        }
    }
}

/// Construct the preferred sidecar store for this platform
///
/// Unix gets the extended-attribute carrier; everything else falls back to
/// the JSON document under `data_dir`.
pub fn default_sidecar(data_dir: &Path) -> Box<dyn SidecarStore> {
    #[cfg(unix)]
    {
        let _ = data_dir;
        Box::new(XattrSidecar)
    }
    #[cfg(not(unix))]
    {
        Box::new(JsonSidecar::new(data_dir))
    }
}
