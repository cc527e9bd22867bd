//! Local anonymous identity.
//!
//! The first run mints a UUID v4 and stores it in
//! `~/.config/cellcount/identity`; later runs read the same value back.

use std::path::{Path, PathBuf};

use cellcount_core::error::Result;
use cellcount_core::identity::{Identity, IdentityProvider};
use uuid::Uuid;

use crate::paths::LabPaths;

#[derive(Debug, Clone)]
pub struct LocalIdentityProvider {
    identity: Option<Identity>,
    path: PathBuf,
}

impl LocalIdentityProvider {
    /// Uses the default identity file.
    pub fn load_or_create() -> Result<Self> {
        Self::at(LabPaths::identity_file()?)
    }

    /// Reads the identity stored at `path`, creating one if absent.
    pub fn at(path: PathBuf) -> Result<Self> {
        let identity = match read_identity(&path)? {
            Some(identity) => identity,
            None => {
                let identity = Identity::new(Uuid::new_v4().to_string());
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, identity.as_str())?;
                tracing::info!("[Identity] Created anonymous identity {}", identity);
                identity
            }
        };

        Ok(Self {
            identity: Some(identity),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_identity(path: &Path) -> Result<Option<Identity>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let id = content.trim();
            Ok((!id.is_empty()).then(|| Identity::new(id)))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.identity.clone()
    }
}
