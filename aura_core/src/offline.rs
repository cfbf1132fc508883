//! Offline asset cache.
//!
//! Mirrors the install/fetch contract of the app's caching worker: a fixed
//! manifest is downloaded into a named cache at install time, and later
//! requests are served from the cache first, falling back to the origin.

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Name of the asset cache; bump to invalidate older installs
pub const CACHE_NAME: &str = "aura-health-v1";

/// Paths pre-populated at install time
pub const ASSET_MANIFEST: [&str; 7] = [
    "./",
    "./index.html",
    "./css/style.css",
    "./js/app.js",
    "./manifest.json",
    "./assets/icons/icon-192.png",
    "./assets/icons/icon-512.png",
];

/// Where assets come from when the cache misses
pub trait Origin {
    fn fetch(&mut self, path: &str) -> Result<Vec<u8>>;
}

/// Origin serving assets from a directory; `./` maps to `index.html`
pub struct DirOrigin {
    root: PathBuf,
}

impl DirOrigin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches("./"));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::InvalidInput(format!("asset path escapes root: {}", path)));
        }

        let resolved = self.root.join(relative);
        if relative.as_os_str().is_empty() || resolved.is_dir() {
            Ok(resolved.join("index.html"))
        } else {
            Ok(resolved)
        }
    }
}

impl Origin for DirOrigin {
    fn fetch(&mut self, path: &str) -> Result<Vec<u8>> {
        let resolved = self.resolve(path)?;
        Ok(std::fs::read(resolved)?)
    }
}

/// Named cache of asset bodies keyed by request path
#[derive(Debug, Clone)]
pub struct OfflineCache {
    name: String,
    entries: HashMap<String, Vec<u8>>,
}

impl Default for OfflineCache {
    fn default() -> Self {
        Self::new(CACHE_NAME)
    }
}

impl OfflineCache {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Download every manifest path into the cache
    ///
    /// All-or-nothing: if any asset cannot be fetched the cache is left
    /// as it was and the error is returned.
    pub fn install<O: Origin>(&mut self, origin: &mut O) -> Result<usize> {
        let mut fetched = HashMap::with_capacity(ASSET_MANIFEST.len());
        for path in ASSET_MANIFEST {
            let body = origin.fetch(path).map_err(|e| Error::AssetUnavailable {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            fetched.insert(path.to_string(), body);
        }

        let count = fetched.len();
        self.entries.extend(fetched);
        tracing::info!("Installed {} assets into cache {}", count, self.name);
        Ok(count)
    }

    /// Serve `path` from the cache, or from `origin` on a miss
    ///
    /// Misses are not written back to the cache.
    pub fn fetch<O: Origin>(&self, path: &str, origin: &mut O) -> Result<Vec<u8>> {
        if let Some(body) = self.entries.get(path) {
            tracing::trace!("Cache hit for {}", path);
            return Ok(body.clone());
        }

        tracing::debug!("Cache miss for {}, fetching from origin", path);
        origin.fetch(path).map_err(|e| Error::AssetUnavailable {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}
