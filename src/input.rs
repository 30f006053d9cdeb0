//! Open an input file, or fall back to standard input.
//!
//! Commands that take an optional input path read from stdin when no path
//! is given. An interactive terminal on stdin is refused with
//! [`ClapbindError::NoFileSpecified`] unless manual input is enabled, so a
//! command never sits waiting for typed input by accident.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use crate::error::ClapbindError;
use crate::fs::FileSystem;

/// Where stdin comes from and whether typing into a terminal is allowed.
#[derive(Default)]
pub struct InputOptions<'a> {
    stdin: Option<Box<dyn Read + 'a>>,
    manual_input: bool,
}

impl<'a> InputOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from `reader` instead of the process stdin. A substituted reader
    /// is never treated as a terminal.
    pub fn stdin(mut self, reader: impl Read + 'a) -> Self {
        self.stdin = Some(Box::new(reader));
        self
    }

    /// Accept stdin even when it is an interactive terminal.
    pub fn manual_input(mut self, enabled: bool) -> Self {
        self.manual_input = enabled;
        self
    }
}

impl std::fmt::Debug for InputOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputOptions")
            .field("custom_stdin", &self.stdin.is_some())
            .field("manual_input", &self.manual_input)
            .finish()
    }
}

/// Open `path` through `fs`, or return stdin when `path` is `None` or empty.
pub fn open_or_stdin<'a>(
    fs: &'a dyn FileSystem,
    path: Option<&Path>,
    options: InputOptions<'a>,
) -> Result<Box<dyn Read + 'a>, ClapbindError> {
    if let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) {
        return fs.open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ClapbindError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ClapbindError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        });
    }

    match options.stdin {
        Some(reader) => Ok(reader),
        None => {
            let stdin = io::stdin();
            if !options.manual_input && stdin.is_terminal() {
                return Err(ClapbindError::NoFileSpecified);
            }
            Ok(Box::new(stdin))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{MemoryFs, OsFs};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn read_all(mut reader: Box<dyn Read + '_>) -> String {
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        buf
    }

    #[test]
    fn named_file_is_opened_through_fs() {
        let fs = MemoryFs::new().with_file("/in/data.yaml", "a: 1\n");
        let reader = open_or_stdin(
            &fs,
            Some(Path::new("/in/data.yaml")),
            InputOptions::new().stdin(Cursor::new("from stdin")),
        )
        .unwrap();
        assert_eq!(read_all(reader), "a: 1\n");
    }

    #[test]
    fn missing_file_is_not_found() {
        let fs = MemoryFs::new();
        let err = open_or_stdin(&fs, Some(Path::new("/nope.json")), InputOptions::new())
            .err()
            .unwrap();
        assert!(matches!(err, ClapbindError::NotFound { .. }));
    }

    #[test]
    fn no_path_reads_substituted_stdin() {
        let fs = MemoryFs::new();
        let reader =
            open_or_stdin(&fs, None, InputOptions::new().stdin(Cursor::new("piped"))).unwrap();
        assert_eq!(read_all(reader), "piped");
    }

    #[test]
    fn empty_path_falls_back_to_stdin() {
        let fs = MemoryFs::new();
        let reader = open_or_stdin(
            &fs,
            Some(Path::new("")),
            InputOptions::new().stdin(Cursor::new("piped")),
        )
        .unwrap();
        assert_eq!(read_all(reader), "piped");
    }

    #[test]
    fn os_file_is_read_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "on disk").unwrap();
        let reader = open_or_stdin(&OsFs, Some(&path), InputOptions::new()).unwrap();
        assert_eq!(read_all(reader), "on disk");
    }

    #[test]
    fn terminal_stdin_requires_manual_input() {
        let fs = MemoryFs::new();
        let result = open_or_stdin(&fs, None, InputOptions::new());
        if io::stdin().is_terminal() {
            assert!(matches!(result, Err(ClapbindError::NoFileSpecified)));
            assert!(open_or_stdin(&fs, None, InputOptions::new().manual_input(true)).is_ok());
        } else {
            assert!(result.is_ok());
        }
    }
}
