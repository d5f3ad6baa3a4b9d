use std::path::PathBuf;

/// Shortest token lifetime issued, so `expires_at` always lies after `issued_at`
const MIN_EXPIRATION_MINUTES: u64 = 1;
/// Cloud IoT refuses device tokens valid for more than a day
const MAX_EXPIRATION_MINUTES: u64 = 24 * 60;

/// Configuration for device JWT generation
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub expiration_minutes: u64,
    /// Directory that relative private key references resolve against
    pub key_directory: Option<PathBuf>,
}

impl JwtConfig {
    pub fn new(expiration_minutes: u64, key_directory: Option<PathBuf>) -> Self {
        Self {
            expiration_minutes,
            key_directory,
        }
    }

    pub fn token_lifetime(&self) -> chrono::Duration {
        let minutes = self
            .expiration_minutes
            .clamp(MIN_EXPIRATION_MINUTES, MAX_EXPIRATION_MINUTES);
        chrono::Duration::minutes(minutes as i64)
    }

    /// Resolve a private key reference to a file path
    pub fn key_path(&self, reference: &str) -> PathBuf {
        let path = PathBuf::from(reference);
        match &self.key_directory {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            expiration_minutes: 20,
            key_directory: None,
        }
    }
}
