use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes a finished report blob to disk and returns the full path. The
/// exporter only builds the blob; saving it is the presentation layer's job.
pub fn save_report(dir: &Path, filename: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.join(filename);
    fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_report_writes_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_report(dir.path(), "grammar_hero_pronouns_2024-03-09.txt", "hello").unwrap();

        assert!(path.ends_with("grammar_hero_pronouns_2024-03-09.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_save_report_overwrites_same_day_file() {
        let dir = tempfile::tempdir().unwrap();
        save_report(dir.path(), "report.txt", "first").unwrap();
        let path = save_report(dir.path(), "report.txt", "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_save_report_missing_dir_errors() {
        let result = save_report(Path::new("/definitely/not/a/dir"), "report.txt", "x");
        assert!(result.is_err());
    }
}
