//! User-facing error message formatting.
//!
//! Matches on typed errors (serde_json categories, io::ErrorKind) rather than
//! parsing strings.

use serde_json::error::Category;
use std::io;

use crate::document::ImportError;

/// Message shown in the error modal when an import fails.
pub fn user_message_from_import(err: &ImportError) -> String {
    match err {
        ImportError::Io { path, source } => format!(
            "Could not read {}. {}",
            path.display(),
            user_message_from_io(source)
        ),
        ImportError::Parse(e) => match e.classify() {
            Category::Eof => format!(
                "Error reading JSON file: the document ends unexpectedly (line {}).",
                e.line()
            ),
            Category::Syntax => format!(
                "Error reading JSON file: syntax error at line {}, column {}.",
                e.line(),
                e.column()
            ),
            Category::Io => "Error reading JSON file: I/O failure.".to_string(),
            Category::Data => format!("Error reading JSON file: {}", e),
        },
        ImportError::MissingData => {
            "Error reading JSON file: expected a \"data\" array of {name, value} records."
                .to_string()
        }
        ImportError::InvalidRecord { index, reason } => format!(
            "Error reading JSON file: record {} is invalid ({}).",
            index + 1,
            reason
        ),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error) -> String {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data (is the file UTF-8 text?).".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::Interrupted => "Operation interrupted.".to_string(),
        _ => {
            let msg = err.to_string();
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            msg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::import;
    use std::path::PathBuf;

    #[test]
    fn truncated_json_reports_eof() {
        let err = import(r#"{"data": ["#).unwrap_err();
        let msg = user_message_from_import(&err);
        assert!(msg.contains("ends unexpectedly"), "{}", msg);
    }

    #[test]
    fn syntax_error_reports_position() {
        let err = import("{data: 1}").unwrap_err();
        let msg = user_message_from_import(&err);
        assert!(msg.contains("line 1"), "{}", msg);
    }

    #[test]
    fn invalid_record_is_one_based() {
        let err = import(r#"{"data": [{"name": "a"}]}"#).unwrap_err();
        assert!(user_message_from_import(&err).contains("record 1"));
    }

    #[test]
    fn not_found_io() {
        let err = ImportError::Io {
            path: PathBuf::from("/missing.json"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let msg = user_message_from_import(&err);
        assert!(msg.contains("/missing.json"));
        assert!(msg.contains("not found"));
    }
}
