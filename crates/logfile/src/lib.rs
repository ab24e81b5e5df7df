//! Plain-text log files for long running test harnesses.
//!
//! Every file starts with a `New test at <UTC time>:` header, and is appended to afterwards.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum LogFileError {
    #[error("failed to create log directory '{path}'")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write log file '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Creates `path`, and its missing parents, as a directory.
pub fn init_path(path: impl AsRef<Path>) -> Result<(), LogFileError> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|source| LogFileError::CreateDir {
        path: path.to_owned(),
        source,
    })
}

/// Truncates every file in `paths`, leaving only the header.
pub fn init_files<I>(paths: I) -> Result<(), LogFileError>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let header = header();

    for path in paths {
        let path = path.as_ref();
        fs::write(path, &header).map_err(|source| LogFileError::Write {
            path: path.to_owned(),
            source,
        })?;
    }

    Ok(())
}

fn header() -> String {
    format!("New test at {}:\n\n", chrono::Utc::now())
}

/* ---------------------------------------------------------------------------------------------- */
/*                                            LOG FILE                                            */
/* ---------------------------------------------------------------------------------------------- */

/// Handle of a log file opened for appending.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    file: File,
}

impl LogFile {
    /// Prepares the parent directory, writes a fresh header, and opens the file for appending.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, LogFileError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|x| !x.as_os_str().is_empty()) {
            init_path(parent)?;
        }

        init_files([&path])?;

        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|source| LogFileError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, args: fmt::Arguments<'_>) -> Result<(), LogFileError> {
        self.file
            .write_fmt(args)
            .map_err(|source| LogFileError::Write {
                path: self.path.clone(),
                source,
            })
    }

    /// Appends `args` followed by a blank line.
    pub fn appendln(&mut self, args: fmt::Arguments<'_>) -> Result<(), LogFileError> {
        self.append(args)?;
        self.append(format_args!("\n\n"))
    }
}

/* ---------------------------------------------------------------------------------------------- */
/*                                              TESTS                                             */
/* ---------------------------------------------------------------------------------------------- */

#[cfg(test)]
mod __test {
    use super::*;

    #[test]
    fn init_path_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs/insert");

        init_path(&nested).unwrap();
        assert!(nested.is_dir());
        init_path(&nested).unwrap();
    }

    #[test]
    fn init_files_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.log");
        let b = dir.path().join("b.log");
        fs::write(&a, "stale content").unwrap();

        init_files([&a, &b]).unwrap();

        for path in [&a, &b] {
            let text = fs::read_to_string(path).unwrap();
            assert!(text.starts_with("New test at "));
            assert!(text.ends_with(":\n\n"));
            assert!(!text.contains("stale"));
        }
    }

    #[test]
    fn init_files_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir/tree.log");

        let err = init_files([&missing]).unwrap_err();
        assert!(matches!(&err, LogFileError::Write { path, .. } if path == &missing));
    }

    #[test]
    fn append_after_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iar/tree.log");

        let mut log = LogFile::create(&path).unwrap();
        log.appendln(format_args!("seed is: {}", 659)).unwrap();
        log.append(format_args!("done")).unwrap();
        drop(log);

        let text = fs::read_to_string(&path).unwrap();
        let (header, body) = text.split_once(":\n\n").unwrap();
        assert!(header.starts_with("New test at "));
        assert_eq!(body, "seed is: 659\n\ndone");
    }
}
