//! Request validation, run before any filesystem mutation.

use hoard_core::{Error, MAX_CANDIDATE_KEYS, MAX_KEY_LENGTH, Result};

/// Reject an absent or empty path list.
pub fn validate_paths(paths: Option<&[String]>) -> Result<()> {
    match paths {
        Some(paths) if !paths.is_empty() => Ok(()),
        _ => Err(Error::PathValidation(
            "Path Validation Error: At least one directory or file path is required".into(),
        )),
    }
}

/// Reject keys that are too long or contain a comma.
pub fn validate_key(key: &str) -> Result<()> {
    let length = key.chars().count();
    if length > MAX_KEY_LENGTH {
        return Err(Error::KeyValidation(format!(
            "Key Validation Error: {} cannot be larger than {} characters.",
            key, MAX_KEY_LENGTH
        )));
    }
    if key.contains(',') {
        return Err(Error::KeyValidation(format!(
            "Key Validation Error: {} cannot contain commas.",
            key
        )));
    }
    Ok(())
}

/// Build the ordered candidate list and validate its size and every key in it.
pub fn candidate_keys(primary_key: &str, restore_keys: &[String]) -> Result<Vec<String>> {
    let mut keys = Vec::with_capacity(restore_keys.len() + 1);
    keys.push(primary_key.to_string());
    keys.extend(restore_keys.iter().cloned());

    if keys.len() > MAX_CANDIDATE_KEYS {
        return Err(Error::KeyValidation(format!(
            "Key Validation Error: Keys are limited to a maximum of {}.",
            MAX_CANDIDATE_KEYS
        )));
    }
    for key in &keys {
        validate_key(key)?;
    }
    Ok(keys)
}
