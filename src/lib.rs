//! Parser for SpecsLab Prodigy XY photoelectron spectroscopy exports
//!
//! Re-exports the lexer, parser and converter crates and provides the
//! file-level entry points.

use std::path::Path;

pub use xps_ast as ast;
pub use xps_converter as converter;
pub use xps_lexer as lexer;
pub use xps_parser as parser;

pub use xps_ast::{Dataset, Metadata, Spectrum, XpsError};
pub use xps_converter::{Archive, ConvertError, ConvertOptions, Converter};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert an XY file into a dataset
///
/// # Errors
///
/// Returns `ConvertError` if the file cannot be read or converted
pub fn parse_file(path: &Path, options: ConvertOptions) -> Result<Dataset, ConvertError> {
    Converter::new(options).convert_file(path)
}

/// Convert an XY file into archive entries with default options
///
/// # Errors
///
/// Returns `ConvertError` if the file cannot be read or converted
pub fn parse_archive(path: &Path) -> Result<Archive, ConvertError> {
    let dataset = parse_file(path, ConvertOptions::default())?;
    Ok(Archive::from_dataset(&dataset))
}
