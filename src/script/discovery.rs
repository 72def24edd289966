use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{TransformError, TransformResult};

/// A runnable script found in the script directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// File name shown on the run button.
    pub display_name: String,
    pub path: PathBuf,
}

/// Lists scripts in `dir` whose extension is `extension`, sorted by name.
///
/// The directory is created when missing. The prelude file is loaded into
/// every sandbox and is never listed as a runnable script.
pub fn discover_scripts(
    dir: &Path,
    extension: &str,
    prelude_file: Option<&str>,
) -> TransformResult<Vec<ScriptEntry>> {
    fs::create_dir_all(dir).map_err(|err| TransformError::io(dir, &err))?;
    let entries = fs::read_dir(dir).map_err(|err| TransformError::io(dir, &err))?;

    let mut scripts = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, dir = %dir.display(), "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if Some(file_name) == prelude_file {
            continue;
        }
        scripts.push(ScriptEntry {
            display_name: file_name.to_owned(),
            path: path.clone(),
        });
    }

    scripts.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    debug!(dir = %dir.display(), count = scripts.len(), "discovered scripts");
    Ok(scripts)
}
