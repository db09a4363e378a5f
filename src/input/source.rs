use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

/// Where a block of text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
    Inline(String),
}

impl InputSource {
    /// `-` means stdin, anything else is a file path.
    pub fn from_path_arg(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self, InputSource::Stdin)
    }
}

pub fn read_input(source: &InputSource) -> Result<String> {
    match source {
        InputSource::File(path) => {
            debug!("Reading {}", path.display());
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))
        }
        InputSource::Stdin => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
        InputSource::Inline(text) => Ok(text.clone()),
    }
}
