//! Runtime configuration, read from the environment with defaults suitable
//! for local development.

use std::path::PathBuf;
use std::time::Duration;

/// Service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Path of the SQLite database file.
    pub db_path: PathBuf,
    /// Directory holding uploaded image files.
    pub uploads_dir: PathBuf,
    /// Files younger than this are never reclaimed by the orphan sweep
    /// (an upload may not have been associated with its record yet).
    pub reconcile_min_age: Duration,
    /// When set, persistence error detail is included in error bodies.
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("STOREFRONT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("storefront-data"));

        let uploads_dir = std::env::var("STOREFRONT_UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("uploads"));

        let reconcile_min_age = std::env::var("STOREFRONT_RECONCILE_MIN_AGE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(3600));

        let dev_mode = std::env::var("STOREFRONT_DEV")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

        Self {
            db_path: data_dir.join("storefront.db"),
            uploads_dir,
            reconcile_min_age,
            dev_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::from_env();
        assert_eq!(config.reconcile_min_age, Duration::from_secs(3600));
        assert!(config.uploads_dir.ends_with("uploads"));
    }
}
