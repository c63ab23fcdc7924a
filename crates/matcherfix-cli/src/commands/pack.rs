//! Pack command implementation.

use crate::errors::CliError;
use crate::path;
use matcherfix_canonical::{ConfigDescriptor, TemplateDesc, UserId};
use matcherfix_container::{write_descriptor, DescriptorStore, DirectoryStore, WriteOptions};
use std::path::PathBuf;
use tracing::debug;

/// Where a packed descriptor goes.
pub enum Target {
    /// A single descriptor file.
    File(PathBuf),
    /// A store directory, as `<dir>/<user>.pb`.
    Store(PathBuf),
}

pub fn run(
    config: PathBuf,
    user: String,
    template_paths: Vec<PathBuf>,
    target: Target,
) -> Result<(), CliError> {
    let user = UserId::parse(user)?;
    let raw_config = path::read_text(&config)?;

    let mut templates = Vec::with_capacity(template_paths.len());
    for template in &template_paths {
        let filename = template
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| CliError::InvalidPath {
                path: template.clone(),
                reason: "template has no file name",
            })?;
        templates.push(TemplateDesc {
            filename,
            body: path::read_text(template)?,
        });
    }

    let desc = ConfigDescriptor {
        user: user.to_string(),
        raw_config,
        templates,
    };

    let written = match target {
        Target::File(output) => {
            write_descriptor(&output, &desc, &WriteOptions::default())
                .map_err(CliError::container(&output))?;
            output
        }
        Target::Store(directory) => {
            let store = DirectoryStore::open(&directory).map_err(CliError::container(&directory))?;
            store.store(&desc).map_err(CliError::container(&directory))?;
            store.root().join(format!("{}.{}", user, matcherfix_container::store::EXTENSION))
        }
    };

    debug!(user = %user, templates = desc.templates.len(), "packed descriptor");
    println!("{} {}", written.display(), desc.digest());
    Ok(())
}
