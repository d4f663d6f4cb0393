//! Secret loading: inline environment payload first, then a local file.

use std::path::Path;

/// Where a loaded secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Environment,
    File,
}

/// Resolve a secret from an inline value or a file.
///
/// A non-blank inline value wins. Otherwise the file is read; a missing
/// file yields `None` so callers can pick their own fallback.
pub fn load_secret(
    inline: Option<&str>,
    file: impl AsRef<Path>,
) -> std::io::Result<Option<(String, SecretSource)>> {
    if let Some(value) = inline.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(Some((value.to_string(), SecretSource::Environment)));
    }

    match std::fs::read_to_string(file.as_ref()) {
        Ok(contents) => {
            let contents = contents.trim();
            if contents.is_empty() {
                Ok(None)
            } else {
                Ok(Some((contents.to_string(), SecretSource::File)))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
