//! Persistent opaque client identity, sent as `user_id` on every session start.

use std::fs;
use std::path::Path;

use crate::error::GlimpseError;

/// Loads the client id from `path`, generating and persisting a fresh UUIDv4
/// on first run. The path may start with `~`.
pub fn load_or_create(path: &str) -> Result<String, GlimpseError> {
    let expanded = shellexpand::tilde(path).into_owned();
    let file = Path::new(&expanded);

    if let Ok(existing) = fs::read_to_string(file) {
        let id = existing.trim();
        if !id.is_empty() {
            return Ok(id.to_string());
        }
    }

    let id = uuid::Uuid::new_v4().to_string();
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file, &id)?;
    tracing::info!(path = %expanded, "Generated new client id");
    Ok(id)
}
