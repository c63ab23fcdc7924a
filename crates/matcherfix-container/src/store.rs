use crate::errors::ContainerError;
use crate::file::{read_descriptor, write_descriptor, WriteOptions};
use matcherfix_canonical::{ConfigDescriptor, UserId};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension of stored descriptors.
pub const EXTENSION: &str = "pb";

/// Storage backend keyed by tenant.
pub trait DescriptorStore {
    /// Loads the descriptor stored for `user`.
    ///
    /// Returns [`ContainerError::NotFound`] when nothing is stored.
    fn load(&self, user: &UserId) -> Result<ConfigDescriptor, ContainerError>;

    /// Stores `desc` under its `user`, replacing any previous descriptor.
    fn store(&self, desc: &ConfigDescriptor) -> Result<(), ContainerError>;

    /// Lists tenants with a stored descriptor, sorted.
    fn users(&self) -> Result<Vec<UserId>, ContainerError>;
}

/// Keeps one `AlertConfigDesc` file per tenant: `<root>/<user>.pb`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    options: WriteOptions,
}

impl DirectoryStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, ContainerError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            options: WriteOptions::default(),
        })
    }

    /// Requests an fsync of every written file.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.options.sync = sync;
        self
    }

    /// Directory holding the descriptor files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, user: &UserId) -> PathBuf {
        self.root.join(format!("{}.{}", user, EXTENSION))
    }
}

impl DescriptorStore for DirectoryStore {
    fn load(&self, user: &UserId) -> Result<ConfigDescriptor, ContainerError> {
        match read_descriptor(self.path_for(user)) {
            Err(ContainerError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                Err(ContainerError::NotFound(user.to_string()))
            }
            other => other,
        }
    }

    fn store(&self, desc: &ConfigDescriptor) -> Result<(), ContainerError> {
        let user = UserId::parse(desc.user.as_str())?;
        write_descriptor(self.path_for(&user), desc, &self.options)?;
        debug!(user = %user, "stored descriptor");
        Ok(())
    }

    fn users(&self) -> Result<Vec<UserId>, ContainerError> {
        let mut users = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(user) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| UserId::parse(stem).ok())
            {
                users.push(user);
            }
        }
        users.sort();
        Ok(users)
    }
}
