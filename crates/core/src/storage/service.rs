//! Local media storage service.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use super::config::StorageConfig;
use super::error::StorageError;
use super::naming::{build_url, generate_filename, normalize_prefix, normalize_subdir, strip_prefix};

/// A file written by [`MediaStorage::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Public URL path, e.g. `/uploads/users/3f2a….png`. Persist this verbatim.
    pub url: String,
    /// Where the file lives on disk.
    pub path: PathBuf,
    /// Generated filename (token plus extension).
    pub filename: String,
    /// Normalised subdirectory, if any.
    pub subdir: Option<String>,
    /// Bytes written.
    pub size: u64,
}

/// Streams uploads into the media root under collision-free names.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    config: StorageConfig,
    /// `config.url_prefix` without surrounding slashes.
    prefix: String,
}

impl MediaStorage {
    /// Create a storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL prefix contains `.`/`..` segments.
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let prefix = normalize_prefix(&config.url_prefix)?;
        Ok(Self { config, prefix })
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Directory all uploads are written under.
    #[must_use]
    pub fn media_root(&self) -> &Path {
        &self.config.media_root
    }

    /// URL path uploads are served from, with a leading slash.
    #[must_use]
    pub fn url_prefix(&self) -> String {
        build_url([self.prefix.as_str()])
    }

    /// Save `source` under `{media_root}/{subdir}/` with a fresh random name.
    ///
    /// Only the lower-cased extension of `original_name` is kept. The
    /// directory is created if missing. The source is read and written in
    /// chunks of `chunk_size` bytes and is dropped before this returns.
    /// If writing fails, or the returned future is dropped mid-write, the
    /// partially written file is removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidSubdir`] for traversal attempts and
    /// [`StorageError::Io`] for any filesystem failure. Nothing is retried.
    pub async fn save<R>(
        &self,
        source: R,
        original_name: Option<&str>,
        subdir: Option<&str>,
    ) -> Result<StoredAsset, StorageError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let subdir = normalize_subdir(subdir)?;

        let mut dir = self.config.media_root.clone();
        if let Some(subdir) = &subdir {
            dir.extend(subdir.split('/'));
        }
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io("create directory", &dir, e))?;

        let filename = generate_filename(original_name);
        let path = dir.join(&filename);

        // create_new: a name clash fails loudly instead of overwriting.
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| StorageError::io("create file", &path, e))?;

        let guard = PartialFile::new(&path);
        let size = copy_in_chunks(source, file, &path, self.config.chunk_size).await?;
        guard.keep();

        let url = build_url(
            std::iter::once(self.prefix.as_str())
                .chain(subdir.as_deref())
                .chain(std::iter::once(filename.as_str())),
        );

        debug!(url = %url, size, "Stored upload");

        Ok(StoredAsset {
            url,
            path,
            filename,
            subdir,
            size,
        })
    }

    /// On-disk location of a URL produced by [`save`](Self::save).
    ///
    /// Returns `None` when the URL is outside the public prefix or contains
    /// traversal segments.
    #[must_use]
    pub fn path_for(&self, url: &str) -> Option<PathBuf> {
        let segments = strip_prefix(url, &self.prefix)?;
        let mut path = self.config.media_root.clone();
        path.extend(segments);
        Some(path)
    }
}

/// Copy `source` into `file` one chunk at a time. Both are consumed.
async fn copy_in_chunks<R>(
    mut source: R,
    mut file: fs::File,
    path: &Path,
    chunk_size: usize,
) -> Result<u64, StorageError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut chunk = vec![0u8; chunk_size];
    let mut written = 0u64;

    loop {
        let n = source
            .read(&mut chunk)
            .await
            .map_err(|e| StorageError::io("read upload for", path, e))?;
        if n == 0 {
            break;
        }
        file.write_all(&chunk[..n])
            .await
            .map_err(|e| StorageError::io("write", path, e))?;
        written += n as u64;
    }

    file.flush()
        .await
        .map_err(|e| StorageError::io("flush", path, e))?;

    Ok(written)
}

/// Removes a half-written file unless [`keep`](Self::keep) is called.
///
/// Runs on early return and on cancellation alike, since both drop it.
struct PartialFile {
    path: Option<PathBuf>,
}

impl PartialFile {
    fn new(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    fn keep(mut self) {
        self.path = None;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Removed partial upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial upload"),
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime")
    }

    fn has_dot_segment(raw: &str) -> bool {
        raw.split('/').any(|segment| segment == "." || segment.contains(".."))
    }

    // Property: prefixes and subdirs made of dotted segments are either
    // rejected, or yield a URL that starts with the prefix and never contains
    // `..` or an empty path segment.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]
        #[test]
        fn prop_url_is_canonical(
            prefix in "/?[a-z.]{1,8}(/[a-z.]{1,8}){0,2}/?",
            subdir in proptest::option::of("/?[a-z0-9_.-]{1,8}(/{1,2}[a-z0-9_.-]{1,8}){0,2}/?"),
            original in proptest::option::of(".{0,40}"),
        ) {
            let dir = tempfile::tempdir().expect("tempdir");
            let storage = match MediaStorage::new(StorageConfig::new(dir.path(), prefix.clone())) {
                Ok(storage) => storage,
                Err(err) => {
                    prop_assert!(matches!(err, StorageError::InvalidPrefix(_)));
                    prop_assert!(has_dot_segment(&prefix));
                    return Ok(());
                }
            };
            prop_assert!(!has_dot_segment(&prefix));

            let result = runtime()
                .block_on(storage.save(&b"x"[..], original.as_deref(), subdir.as_deref()));
            let asset = match result {
                Ok(asset) => asset,
                Err(err) => {
                    prop_assert!(matches!(err, StorageError::InvalidSubdir(_)));
                    prop_assert!(subdir.as_deref().is_some_and(has_dot_segment));
                    return Ok(());
                }
            };

            prop_assert!(asset.url.starts_with(&storage.url_prefix()));
            prop_assert!(asset.url.starts_with('/'));
            prop_assert!(!asset.url.ends_with('/'));
            prop_assert!(!asset.url.contains(".."));
            prop_assert!(!asset.url.contains("//"));
            prop_assert_eq!(storage.path_for(&asset.url), Some(asset.path.clone()));
            prop_assert!(asset.path.starts_with(dir.path()));
        }
    }

    // Property: the stored name never carries anything from the original name
    // except a lower-cased alphanumeric extension.
    proptest! {
        #[test]
        fn prop_extension_is_lowercase_alnum(original in ".{0,60}") {
            if let Some(ext) = super::super::naming::file_extension(Some(&original)) {
                prop_assert!(ext.starts_with('.'));
                prop_assert!(ext[1..].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
            }
        }
    }
}
