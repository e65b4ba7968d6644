//! Folder PIN vault.
//!
//! A folder may carry one numeric PIN. Only its SHA-256 digest is kept.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use super::path as folder_path;
use crate::{MediaboxError, Result};

/// Minimum PIN length in digits.
pub const MIN_PIN_LENGTH: usize = 4;

/// Maximum PIN length in digits.
pub const MAX_PIN_LENGTH: usize = 8;

/// Mapping from folder path to hashed PIN.
#[derive(Debug, Default)]
pub struct PinVault {
    pins: HashMap<String, String>,
}

/// Validate a PIN: 4 to 8 ASCII digits.
pub fn validate_pin(pin: &str) -> Result<()> {
    let len = pin.len();
    if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&len) || !pin.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(MediaboxError::Validation(format!(
            "PIN must be {MIN_PIN_LENGTH}-{MAX_PIN_LENGTH} digits"
        )));
    }
    Ok(())
}

fn hash_pin(pin: &str) -> String {
    format!("{:x}", Sha256::digest(pin.as_bytes()))
}

/// Compare two digests without short-circuiting on the first mismatch.
fn digests_equal(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl PinVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the PIN for a folder, replacing any existing one.
    pub fn set_pin(&mut self, folder: &str, pin: &str) -> Result<()> {
        validate_pin(pin)?;
        self.pins.insert(folder.to_string(), hash_pin(pin));
        Ok(())
    }

    /// Check a PIN. Returns false when the folder has no PIN.
    pub fn verify_pin(&self, folder: &str, pin: &str) -> bool {
        match self.pins.get(folder) {
            Some(stored) => digests_equal(stored, &hash_pin(pin)),
            None => false,
        }
    }

    /// Remove a folder's PIN. Returns whether one was set.
    pub fn remove_pin(&mut self, folder: &str) -> bool {
        self.pins.remove(folder).is_some()
    }

    /// Whether the folder has a PIN.
    pub fn is_locked(&self, folder: &str) -> bool {
        self.pins.contains_key(folder)
    }

    /// Move PIN entries for a folder and its descendants to a new path.
    pub fn rebase(&mut self, old: &str, new: &str) {
        let moved: Vec<String> = self
            .pins
            .keys()
            .filter(|p| folder_path::is_within(p, old))
            .cloned()
            .collect();

        for path in moved {
            if let (Some(digest), Some(target)) = (
                self.pins.remove(&path),
                folder_path::rebase(&path, old, new),
            ) {
                self.pins.insert(target, digest);
            }
        }
    }

    /// Drop PIN entries for a folder and its descendants.
    ///
    /// Returns the number of entries removed.
    pub fn remove_within(&mut self, folder: &str) -> usize {
        let before = self.pins.len();
        self.pins.retain(|p, _| !folder_path::is_within(p, folder));
        before - self.pins.len()
    }
}
