//! Note files.
//!
//! Notes are created exclusively; an existing file is replaced only after
//! confirmation or when the caller chose a policy up front.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pianote_core::markdown::STUB;

/// What to do when a note already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existing {
    Ask,
    Overwrite,
    Skip,
}

/// Outcome of writing one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Written {
    Created(PathBuf),
    Overwritten(PathBuf),
    Skipped(PathBuf),
    /// Sent to stdout instead of a file.
    Printed,
    /// The document was an empty stub; nothing was written.
    Stub,
}

/// `{dir}/{code padded to 6} - {title}.md`, with `/` in the title replaced by `|`.
pub fn note_path(dir: &Path, code: &str, title: &str) -> PathBuf {
    dir.join(format!("{:0>6} - {}.md", code, title.replace('/', "|")))
}

/// `{dir}/{novel code padded to 6}/EP.{ordinal} - {title}.md` for an episode body.
pub fn body_path(dir: &Path, novel_code: &str, ordinal: u32, title: &str) -> PathBuf {
    dir.join(format!("{:0>6}", novel_code)).join(format!("EP.{} - {}.md", ordinal, title.replace('/', "|")))
}

/// Write `document` to `path`, creating parent directories.
///
/// `confirm` is asked before replacing an existing file when `existing` is [`Existing::Ask`].
pub fn write_note<F>(path: &Path, document: &str, existing: Existing, mut confirm: F) -> Result<Written>
where
    F: FnMut(&Path) -> io::Result<bool>,
{
    if document == STUB {
        tracing::debug!(path = %path.display(), "not writing an empty note");
        return Ok(Written::Stub);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(document.as_bytes()).with_context(|| format!("writing {}", path.display()))?;
            return Ok(Written::Created(path.to_path_buf()));
        }
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
        Err(err) => return Err(err).with_context(|| format!("opening {}", path.display())),
    }

    let replace = match existing {
        Existing::Overwrite => true,
        Existing::Skip => false,
        Existing::Ask => confirm(path).context("reading the overwrite answer")?,
    };

    if !replace {
        return Ok(Written::Skipped(path.to_path_buf()));
    }

    fs::write(path, document).with_context(|| format!("writing {}", path.display()))?;
    Ok(Written::Overwritten(path.to_path_buf()))
}

/// Ask on stderr whether to replace `path`. Anything but `y` keeps the file.
pub fn prompt_overwrite(path: &Path) -> io::Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{} already exists. Overwrite? (y/n): ", path.display())?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Where and how notes are written for one run.
#[derive(Debug, Clone)]
pub struct NoteWriter {
    pub dir: PathBuf,
    pub existing: Existing,
    /// Print documents to stdout instead of writing files.
    pub print: bool,
}

impl NoteWriter {
    /// Write a novel or episode note.
    pub fn write(&self, code: &str, title: &str, document: &str) -> Result<Written> {
        self.write_to(&note_path(&self.dir, code, title), document)
    }

    /// Write an episode body under its novel's folder.
    pub fn write_body(&self, novel_code: &str, ordinal: u32, title: &str, document: &str) -> Result<Written> {
        self.write_to(&body_path(&self.dir, novel_code, ordinal, title), document)
    }

    fn write_to(&self, path: &Path, document: &str) -> Result<Written> {
        if self.print {
            print!("{document}");
            return Ok(Written::Printed);
        }

        let written = write_note(path, document, self.existing, prompt_overwrite)?;
        match &written {
            Written::Created(path) => tracing::info!("wrote {}", path.display()),
            Written::Overwritten(path) => tracing::info!("overwrote {}", path.display()),
            Written::Skipped(path) => tracing::info!("kept existing {}", path.display()),
            Written::Printed | Written::Stub => {}
        }
        Ok(written)
    }
}
