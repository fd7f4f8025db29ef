//! JSON export of datasets and archives

use crate::ConvertError;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use xps_ast::Dataset;

const INDENT: &[u8] = b"    ";

/// Pretty JSON indented by four spaces
///
/// # Errors
///
/// Returns `ConvertError::Json` if the value cannot be serialized
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, ConvertError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write `value` as pretty JSON to `path`
///
/// # Errors
///
/// Returns `ConvertError` if serialization or writing fails
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ConvertError> {
    let json = to_json_string(value)?;
    std::fs::write(path, json).map_err(|err| ConvertError::io(path, err))
}

/// Load a dataset previously written by [`write_json`]
///
/// # Errors
///
/// Returns `ConvertError` if the file cannot be read or is not a dataset
pub fn read_dataset(path: &Path) -> Result<Dataset, ConvertError> {
    let content = std::fs::read_to_string(path).map_err(|err| ConvertError::io(path, err))?;
    Ok(serde_json::from_str(&content)?)
}

/// The JSON file written next to an input file: same stem, `.json` extension
#[must_use]
pub fn json_path_for(input: &Path) -> PathBuf {
    input.with_extension("json")
}
