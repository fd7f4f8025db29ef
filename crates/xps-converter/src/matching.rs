//! Mainfile detection
//!
//! Prodigy stamps its name into the first header line of every export, so
//! sniffing the start of a file is enough to decide whether it is ours.

use crate::ConvertError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::path::Path;

/// Pattern a supported file contains near its start
pub const MAINFILE_CONTENTS_RE: &str = r"SpecsLab Prodigy";

/// Number of leading bytes inspected
pub const MAINFILE_SNIFF_BYTES: usize = 4096;

static MAINFILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(MAINFILE_CONTENTS_RE).expect("valid mainfile regex"));

/// Static description of this parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserInfo {
    pub name: &'static str,
    pub code_name: &'static str,
    pub domain: &'static str,
    pub code_homepage: &'static str,
    pub mainfile_contents_re: &'static str,
}

pub const PARSER_INFO: ParserInfo = ParserInfo {
    name: "parsers/xps",
    code_name: "XPS",
    domain: "ems",
    code_homepage: "https://www.example.eu/",
    mainfile_contents_re: MAINFILE_CONTENTS_RE,
};

/// Check whether the start of `contents` identifies a Prodigy export
#[must_use]
pub fn is_mainfile(contents: &str) -> bool {
    let mut end = contents.len().min(MAINFILE_SNIFF_BYTES);
    while !contents.is_char_boundary(end) {
        end -= 1;
    }
    MAINFILE_RE.is_match(&contents[..end])
}

/// Check whether the file at `path` is a Prodigy export
///
/// # Errors
///
/// Returns `ConvertError::Io` if the file cannot be read
pub fn is_mainfile_path(path: &Path) -> Result<bool, ConvertError> {
    let file = std::fs::File::open(path).map_err(|err| ConvertError::io(path, err))?;
    let mut head = Vec::with_capacity(MAINFILE_SNIFF_BYTES);
    file.take(MAINFILE_SNIFF_BYTES as u64)
        .read_to_end(&mut head)
        .map_err(|err| ConvertError::io(path, err))?;
    Ok(is_mainfile(&String::from_utf8_lossy(&head)))
}
