//! Wearer profile
//!
//! Height and weight travel with the session as an explicit value —
//! constructed once, passed where needed — with their own load/save
//! lifecycle. Persistence is a small JSON document; a missing file
//! loads as the defaults, so first launch needs no setup step.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use thiserror_no_std::Error;

/// Physical profile of the wearer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserProfile {
    /// Height in meters
    pub height_m: f32,
    /// Weight in kilograms
    pub weight_kg: f32,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            height_m: 1.70,
            weight_kg: 60.0,
        }
    }
}

/// Errors from profile persistence.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Filesystem failure
    #[error("profile I/O failed: {0}")]
    Io(#[from] io::Error),

    /// File exists but does not parse as a profile
    #[error("profile file malformed: {0}")]
    Format(#[from] serde_json::Error),
}

impl UserProfile {
    /// Load a profile, falling back to defaults when the file does
    /// not exist yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Persist the profile.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProfileError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let profile = UserProfile::default();
        assert_eq!(profile.height_m, 1.70);
        assert_eq!(profile.weight_kg, 60.0);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let profile = UserProfile {
            height_m: 1.82,
            weight_kg: 74.5,
        };
        profile.save(&path).unwrap();

        assert_eq!(UserProfile::load(&path).unwrap(), profile);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = UserProfile::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, UserProfile::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.json");
        std::fs::write(&path, b"not json at all").unwrap();

        assert!(matches!(
            UserProfile::load(&path),
            Err(ProfileError::Format(_))
        ));
    }
}
