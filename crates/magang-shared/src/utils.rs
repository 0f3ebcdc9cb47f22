//! Utility functions

/// Usernames are compared case-insensitively and stored trimmed.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Lower-cased extension of a client-supplied file name, without the dot.
pub fn file_extension(file_name: &str) -> Option<String> {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_ascii_lowercase()),
        _ => None,
    }
}

/// Blank optional text collapses to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("foto.JPG"), Some("jpg".to_string()));
        assert_eq!(file_extension("C:\\docs\\laporan.final.pdf"), Some("pdf".to_string()));
        assert_eq!(file_extension(".bashrc"), None);
        assert_eq!(file_extension("noext"), None);
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Amara "), "amara");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" 0812 ".into())), Some("0812".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
