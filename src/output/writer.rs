//! Dart file writing

use crate::error::{Error, Result};
use crate::schema::file_stem;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// `UserInfo` → `user_info.dart`
pub fn dart_file_name(class: &str) -> String {
    format!("{}.dart", file_stem(class))
}

/// `// GENERATED BY \`cmd args\``
pub fn provenance_line(cmd: &str, args: &str) -> String {
    if args.is_empty() {
        format!("// GENERATED BY `{cmd}`")
    } else {
        format!("// GENERATED BY `{cmd} {args}`")
    }
}

/// Prepend the provenance comment to generated code
pub fn with_provenance(code: &str, cmd: &str, args: &str) -> String {
    format!("{}\n\n{code}", provenance_line(cmd, args))
}

/// Write `code` to `path`
///
/// An existing file is only replaced with `force`. Missing parent
/// directories are created.
pub async fn write_code(path: &Path, code: &str, force: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).await.map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            Error::Other(format!(
                "{} already exists, use --force to overwrite",
                path.display()
            ))
        } else {
            Error::Io(e)
        }
    })?;
    file.write_all(code.as_bytes()).await?;
    file.flush().await?;

    info!(path = %path.display(), bytes = code.len(), "wrote dart file");
    Ok(())
}
