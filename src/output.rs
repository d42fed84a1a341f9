use std::fs;
use std::path::Path;

use crate::error::LuminolError;

/// Write `content` to `path` atomically: parents are created, the bytes go
/// to a sibling temp file, and a rename makes them visible. An interrupted
/// run therefore never leaves a partially written output.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), LuminolError> {
    let io_err = |message: String| LuminolError::Io {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| io_err(format!("cannot create parent directory: {e}")))?;
        }
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| io_err("output path has no file name".into()))?;
    let tmp = path.with_file_name(format!(".{}.luminol-tmp", file_name.to_string_lossy()));

    fs::write(&tmp, content).map_err(|e| io_err(format!("cannot write temp file: {e}")))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(format!("cannot move temp file into place: {e}")));
    }

    tracing::info!(path = %path.display(), "wrote output file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("luminol-output-tests").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn writes_content_and_creates_parents() {
        let dir = scratch("parents");
        let path = dir.join("nested").join("colors.css");

        write_atomic(&path, "body { }\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "body { }\n");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = scratch("overwrite");
        let path = dir.join("out.conf");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn leaves_no_temp_file_behind() {
        let dir = scratch("clean");
        let path = dir.join("out.conf");

        write_atomic(&path, "data").unwrap();
        let entries: Vec<_> = fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1, "only the output file should remain");
    }

    #[test]
    fn unwritable_target_is_io_error() {
        let err = write_atomic(Path::new("/proc/luminol-denied/out"), "x").unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }
}
