//! Lifecycle counters stored as `device=hours` lines.

use std::path::PathBuf;

use terrarium_app::ports::LifecycleRepository;
use terrarium_domain::device::LifecycleCounter;
use terrarium_domain::error::TerrariumError;

use crate::fs;

/// [`LifecycleRepository`] backed by a line-oriented text file.
pub struct LifecycleFile {
    path: PathBuf,
}

impl LifecycleFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LifecycleRepository for LifecycleFile {
    /// Malformed lines are skipped with a warning.
    fn load(&self) -> Result<Vec<LifecycleCounter>, TerrariumError> {
        let Some(raw) = fs::read_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        let counters = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match line.parse::<LifecycleCounter>() {
                Ok(counter) => Some(counter),
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), line, error = %err, "skipping lifecycle line");
                    None
                }
            })
            .collect();
        Ok(counters)
    }

    fn save(&self, counters: &[LifecycleCounter]) -> Result<(), TerrariumError> {
        let raw: String = counters.iter().map(|c| format!("{c}\n")).collect();
        fs::write_atomic(&self.path, raw.as_bytes())?;
        tracing::debug!(path = %self.path.display(), count = counters.len(), "lifecycle counters saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn counter(device: &str, hours: u32) -> LifecycleCounter {
        LifecycleCounter {
            device: device.to_string(),
            hours,
        }
    }

    #[test]
    fn should_load_empty_list_before_first_save() {
        let dir = TempDir::new().unwrap();
        let repo = LifecycleFile::new(dir.path().join("lifecycle.txt"));
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn should_write_one_line_per_counter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lifecycle.txt");
        let repo = LifecycleFile::new(&path);

        repo.save(&[counter("uvlight", 4399), counter("pump", 12)]).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "uvlight=4399\npump=12\n");
        assert_eq!(
            repo.load().unwrap(),
            vec![counter("uvlight", 4399), counter("pump", 12)]
        );
    }

    #[test]
    fn should_skip_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lifecycle.txt");
        std::fs::write(&path, "uvlight=100\ngarbage\n\nfan_in=abc\n").unwrap();

        let counters = LifecycleFile::new(&path).load().unwrap();
        assert_eq!(counters, vec![counter("uvlight", 100)]);
    }
}
