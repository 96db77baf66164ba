use crate::contract::ValidationError;

/// Lexically normalizes an object key: empty and `.` segments are dropped and
/// each `..` cancels the segment before it. Leading `..` segments that have
/// nothing to cancel are kept.
pub fn normalize_key(key: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in key.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return ".".to_string();
    }
    segments.join("/")
}

/// Local file name an artifact is staged under: the final component of the
/// normalized key.
pub fn staging_file_name(key: &str) -> Result<String, ValidationError> {
    if key.trim().is_empty() {
        return Err(ValidationError::new("storage key cannot be empty"));
    }

    let normalized = normalize_key(key);
    let file_name = normalized.rsplit('/').next().unwrap_or_default();
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        return Err(ValidationError::new(format!(
            "storage key '{key}' does not name a file"
        )));
    }

    Ok(file_name.to_string())
}
