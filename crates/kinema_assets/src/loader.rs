use std::path::Path;
use std::sync::{Arc, OnceLock};

use tokio::runtime::Runtime;

use kinema_animation::format::DEFAULT_MOTION_NAME;
use kinema_animation::{ImportSettings, ImportedMotion, MotionFile, import_motion, parse_motion};
use kinema_core::{Error, LoadError};

use crate::io::{AssetReader, FileAssetReader};

pub(crate) fn get_loader_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::new().expect("Failed to create motion loader runtime"))
}

/// A fetched, parsed and imported motion file.
#[derive(Debug, Clone)]
pub struct LoadedMotion {
    pub uri: String,
    pub motion: Arc<MotionFile>,
    pub imported: ImportedMotion,
}

/// Reads motion files through an [`AssetReader`] and runs them through the
/// import pipeline.
pub struct MotionLoader<R: AssetReader = FileAssetReader> {
    reader: R,
    settings: ImportSettings,
}

impl<R: AssetReader> MotionLoader<R> {
    pub fn new(reader: R, settings: ImportSettings) -> Self {
        Self { reader, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Fetches and imports `uri`. The parse runs on a blocking worker so
    /// the async executor is never stalled by large files.
    pub async fn load(&self, uri: &str) -> Result<LoadedMotion, LoadError> {
        let bytes = self.reader.read_bytes(uri).await?;

        let uri_owned = uri.to_string();
        let settings = self.settings.clone();
        tokio::task::spawn_blocking(move || import_bytes(&uri_owned, &bytes, &settings))
            .await
            .map_err(|_| LoadError::Cancelled(uri.to_string()))?
    }
}

impl<R: AssetReader + 'static> MotionLoader<R> {
    /// Blocking variant of [`MotionLoader::load`] for hosts without an
    /// executor.
    pub fn load_blocking(&self, uri: &str) -> Result<LoadedMotion, LoadError> {
        get_loader_runtime().block_on(self.load(uri))
    }
}

impl Default for MotionLoader<FileAssetReader> {
    fn default() -> Self {
        Self::new(FileAssetReader::default(), ImportSettings::default())
    }
}

/// Decodes, parses and imports raw motion-file bytes.
///
/// A motion without a `// name:` comment is named after the file stem.
pub fn import_bytes(uri: &str, bytes: &[u8], settings: &ImportSettings) -> Result<LoadedMotion, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|_| LoadError::Utf8 { uri: uri.to_string() })?;

    let import_error = |source: Error| LoadError::Import {
        uri: uri.to_string(),
        source,
    };

    let mut motion = parse_motion(text).map_err(|e| import_error(e.into()))?;
    if motion.name == DEFAULT_MOTION_NAME
        && let Some(stem) = Path::new(uri).file_stem().and_then(|s| s.to_str())
    {
        motion.name = stem.to_string();
    }

    let imported = import_motion(&motion, settings).map_err(import_error)?;

    Ok(LoadedMotion {
        uri: uri.to_string(),
        motion: Arc::new(motion),
        imported,
    })
}
