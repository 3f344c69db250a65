use std::{env, fs, io, path::PathBuf};

use tracing::warn;

use crate::types::Profile;

/// Advisory local copy of the last profile the server returned.
///
/// Overwritten on every successful round-trip, cleared when the server
/// confirms deletion, and discarded when it fails to parse. Never a second
/// source of truth; readers fall back to it only when the server is
/// unreachable.
pub struct ProfileCache {
    path: PathBuf,
}

impl ProfileCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        let base = env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".cache"))
            .unwrap_or_else(env::temp_dir);

        base.join("profile-cli").join("profile.json")
    }

    pub fn load(&self) -> Option<Profile> {
        let bytes = fs::read(&self.path).ok()?;

        match serde_json::from_slice(&bytes) {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!("discarding corrupted profile cache: {err}");
                let _ = fs::remove_file(&self.path);
                None
            }
        }
    }

    pub fn save(&self, profile: &Profile) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(profile).map_err(io::Error::other)?;
        fs::write(&self.path, json)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn scratch_cache(tag: &str) -> ProfileCache {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = env::temp_dir()
            .join(format!("profile-cache-test-{tag}-{nanos}"))
            .join("profile.json");

        ProfileCache::new(path)
    }

    fn profile() -> Profile {
        Profile {
            id: "abc".to_string(),
            first_name: "John".to_string(),
            last_name: Some("Doe".to_string()),
            email: "john@example.com".to_string(),
            age: Some(30),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn round_trips_and_clears() {
        let cache = scratch_cache("roundtrip");

        assert!(cache.load().is_none());

        cache.save(&profile()).unwrap();
        assert_eq!(cache.load(), Some(profile()));

        cache.clear().unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn clear_on_missing_file_is_ok() {
        let cache = scratch_cache("clear-missing");
        assert!(cache.clear().is_ok());
    }

    #[test]
    fn corrupted_cache_is_discarded_and_removed() {
        let cache = scratch_cache("corrupt");

        fs::create_dir_all(cache.path.parent().unwrap()).unwrap();
        fs::write(&cache.path, b"{not json").unwrap();

        assert!(cache.load().is_none());
        assert!(!cache.path.exists());
    }
}
