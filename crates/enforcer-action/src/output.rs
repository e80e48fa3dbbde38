//! GitHub Actions step outputs and report artifacts.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Where step outputs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutputs {
    /// Append `name=value` lines to the file named by `GITHUB_OUTPUT`.
    File(PathBuf),
    /// Legacy `::set-output` workflow commands on stdout.
    Stdout,
}

impl StepOutputs {
    pub fn new(output_file: Option<PathBuf>) -> Self {
        match output_file.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => StepOutputs::File(path),
            None => StepOutputs::Stdout,
        }
    }

    /// Set a single-line output value.
    pub fn set(&self, name: &str, value: impl std::fmt::Display) -> std::io::Result<()> {
        let value = value.to_string();
        if value.contains('\n') {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("output {} must be a single line", name),
            ));
        }

        match self {
            StepOutputs::File(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{}={}", name, value)?;
                debug!(name, value = %value, path = %path.display(), "Set step output");
            }
            StepOutputs::Stdout => {
                println!("::set-output name={}::{}", name, value);
            }
        }
        Ok(())
    }
}

/// Write the report to a temporary file that outlives the process.
///
/// The file is created in `dir` when given (e.g. `RUNNER_TEMP`), otherwise
/// in the system temp directory.
pub fn write_report_file(report: &str, dir: Option<&Path>) -> std::io::Result<PathBuf> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("evaluation-report-").suffix(".md");

    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(report.as_bytes())?;

    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_outputs_appended_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "existing=1\n").unwrap();

        let outputs = StepOutputs::new(Some(path.clone()));
        outputs.set("pass", false).unwrap();
        outputs.set("report", "/tmp/report.md").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "existing=1\npass=false\nreport=/tmp/report.md\n");
    }

    #[test]
    fn test_empty_output_path_falls_back_to_stdout() {
        assert_eq!(StepOutputs::new(Some(PathBuf::new())), StepOutputs::Stdout);
        assert_eq!(StepOutputs::new(None), StepOutputs::Stdout);
    }

    #[test]
    fn test_multiline_value_rejected() {
        let dir = tempdir().unwrap();
        let outputs = StepOutputs::new(Some(dir.path().join("out")));
        assert!(outputs.set("report", "a\nb").is_err());
    }

    #[test]
    fn test_report_file_persists() {
        let dir = tempdir().unwrap();
        let path = write_report_file("# Report\n", Some(dir.path())).unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().unwrap(), "md");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Report\n");
    }
}
