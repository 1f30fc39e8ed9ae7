use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use minijinja::{Environment, Error, State};
use sha2::{Digest, Sha256};

/// Resolves static asset paths to URLs carrying a content hash, so browsers
/// refetch the stylesheet whenever it changes.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Arc::default(),
        }
    }

    pub fn asset_path(&self, path: &str) -> String {
        if let Some(hashed_path) = self.cache.read().ok().and_then(|c| c.get(path).cloned()) {
            return hashed_path;
        }

        let Ok(contents) = fs::read(self.root.join(path)) else {
            return format!("/static/{path}");
        };
        let hash = Sha256::digest(contents);
        let hashed_path = format!("/static/{path}?v={:.8x}", hash);
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(path.to_string(), hashed_path.clone());
        }
        hashed_path
    }

    pub fn register(&self, env: &mut Environment<'_>) {
        let loader = self.clone();
        env.add_function("asset", move |_state: &State, path: String| -> Result<String, Error> {
            Ok(loader.asset_path(&path))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_existing_files_and_passes_missing_ones_through() {
        let dir = std::env::temp_dir().join(format!("asset-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("style.css"), "body { margin: 0; }").unwrap();
        let loader = AssetLoader::new(&dir);

        let hashed = loader.asset_path("style.css");
        assert!(hashed.starts_with("/static/style.css?v="));
        assert_eq!(loader.asset_path("style.css"), hashed);
        assert_eq!(loader.asset_path("missing.js"), "/static/missing.js");

        fs::remove_dir_all(&dir).unwrap();
    }
}
