use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::StorageError;

pub(crate) fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read `path`, `None` when it does not exist.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_error(path)(err)),
    }
}

/// Replace `path` with `contents` through a uniquely named sibling and a
/// rename. Concurrent writers never share a temporary file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    let mut tmp = NamedTempFile::new_in(parent).map_err(io_error(parent))?;
    tmp.write_all(contents).map_err(io_error(tmp.path()))?;
    tmp.persist(path).map_err(|err| io_error(path)(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn should_create_parent_and_replace_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(read_optional(&path).unwrap().as_deref(), Some("second"));
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn should_treat_missing_file_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_optional(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn should_not_lose_writes_when_two_writers_race() {
        let dir = TempDir::new().unwrap();
        let path = Arc::new(dir.path().join("lifecycle.txt"));

        let writers: Vec<_> = [b"uvlight=4400\n", b"uvlight=4399\n"]
            .into_iter()
            .map(|contents| {
                let path = Arc::clone(&path);
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| write_atomic(&path, contents))
                        .filter(Result::is_err)
                        .count()
                })
            })
            .collect();
        let failures: usize = writers.into_iter().map(|w| w.join().unwrap()).sum();

        assert_eq!(failures, 0);
        let content = read_optional(&path).unwrap().unwrap();
        assert!(content == "uvlight=4400\n" || content == "uvlight=4399\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
