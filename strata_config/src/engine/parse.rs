//! Format-specific parsing of configuration fragments.

use camino::Utf8Path;
use serde_json::{Map, Value};

use crate::error::{StrataError, invalid_data};

/// Parse fragment data according to the file extension.
///
/// Supported formats are YAML (`.yml`, `.yaml`) and JSON (`.json`). Syntax
/// errors are re-raised with the file path and the 1-based line/column of the
/// offending token.
pub(super) fn parse_by_format(
    path: &Utf8Path,
    data: &str,
) -> Result<Map<String, Value>, StrataError> {
    let ext = path.extension().map(str::to_ascii_lowercase);
    let value = match ext.as_deref() {
        Some("yml" | "yaml") => {
            serde_yaml::from_str::<Value>(data).map_err(|e| yaml_parse_error(path, &e))?
        }
        Some("json") => {
            serde_json::from_str::<Value>(data).map_err(|e| json_parse_error(path, &e))?
        }
        _ => {
            return Err(invalid_data(
                path.as_std_path(),
                "unrecognised configuration file extension (expected .yml, .yaml or .json)",
            ));
        }
    };
    into_mapping(path, value)
}

/// Fragments must carry a mapping at the root; an empty document counts as an
/// empty mapping.
fn into_mapping(path: &Utf8Path, value: Value) -> Result<Map<String, Value>, StrataError> {
    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        _ => Err(invalid_data(
            path.as_std_path(),
            "configuration file does not define a top-level mapping",
        )),
    }
}

fn yaml_parse_error(path: &Utf8Path, err: &serde_yaml::Error) -> StrataError {
    let (line, column) = err
        .location()
        .map_or((1, 1), |loc| (loc.line(), loc.column()));
    StrataError::Parse {
        path: path.to_owned(),
        line,
        column,
        message: err.to_string(),
    }
}

fn json_parse_error(path: &Utf8Path, err: &serde_json::Error) -> StrataError {
    StrataError::Parse {
        path: path.to_owned(),
        line: err.line(),
        column: err.column(),
        message: err.to_string(),
    }
}
