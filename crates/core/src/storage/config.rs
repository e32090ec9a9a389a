//! Storage configuration types.

use std::path::PathBuf;

/// Storage service configuration.
///
/// Passed to [`MediaStorage::new`](super::MediaStorage::new) once at startup;
/// the service never consults process-wide state.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory all uploads are written under.
    pub media_root: PathBuf,
    /// URL path segment uploads are served from, e.g. `/uploads`.
    pub url_prefix: String,
    /// Bytes read from the source and written to disk per step.
    pub chunk_size: usize,
}

impl StorageConfig {
    /// Default chunk size: 1 MiB.
    pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

    /// Create a new storage config with the default chunk size.
    #[must_use]
    pub fn new(media_root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            media_root: media_root.into(),
            url_prefix: url_prefix.into(),
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the chunk size. Zero is bumped to one byte.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl From<&quill_shared::MediaSettings> for StorageConfig {
    fn from(settings: &quill_shared::MediaSettings) -> Self {
        Self::new(settings.root.clone(), settings.url_prefix.clone())
            .with_chunk_size(settings.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::new("./media", "/uploads");
        assert_eq!(config.media_root, PathBuf::from("./media"));
        assert_eq!(config.url_prefix, "/uploads");
        assert_eq!(config.chunk_size, StorageConfig::DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_zero_chunk_size_is_bumped() {
        let config = StorageConfig::new("./media", "/uploads").with_chunk_size(0);
        assert_eq!(config.chunk_size, 1);
    }

    #[test]
    fn test_from_media_settings() {
        let settings = quill_shared::MediaSettings {
            root: PathBuf::from("/srv/media"),
            url_prefix: "/files".to_string(),
            max_upload_bytes: 1024,
            chunk_size: 4096,
        };
        let config = StorageConfig::from(&settings);
        assert_eq!(config.media_root, PathBuf::from("/srv/media"));
        assert_eq!(config.url_prefix, "/files");
        assert_eq!(config.chunk_size, 4096);
    }
}
