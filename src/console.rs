//! Where user-facing status lines go.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
};

use anyhow::Context;

pub trait ConsoleSink {
    fn append(&mut self, message: &str);
}

/// No console attached: messages go to the diagnostic log.
#[derive(Debug, Default)]
pub struct LogConsole;

impl ConsoleSink for LogConsole {
    fn append(&mut self, message: &str) {
        log::info!("{}", message);
    }
}

/// Append-only console file, one line per message.
#[derive(Debug)]
pub struct FileConsole {
    file: File,
}

impl FileConsole {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Could not open console file {}", path.display()))?;
        Ok(Self { file })
    }
}

impl ConsoleSink for FileConsole {
    fn append(&mut self, message: &str) {
        if let Err(e) = writeln!(self.file, "{}", message) {
            log::error!("Console write failed ({}): {}", e, message);
        }
    }
}
