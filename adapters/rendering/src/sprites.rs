use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::SpriteKey;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Asset path of every sprite a backend needs to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteManifest {
    paths: BTreeMap<SpriteKey, PathBuf>,
}

impl Default for SpriteManifest {
    /// Every key maps to `images/<name>.jpg`.
    fn default() -> Self {
        let base = Path::new("images");
        let paths = SpriteKey::ALL
            .into_iter()
            .map(|key| (key, base.join(format!("{}.jpg", key.name()))))
            .collect();
        Self { paths }
    }
}

impl SpriteManifest {
    /// Loads a manifest whose relative paths resolve against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_toml_str(&contents, &base)
    }

    /// Parses a manifest; keys it leaves out keep their default asset.
    pub fn from_toml_str(contents: &str, base_path: &Path) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
        if manifest.version != SUPPORTED_MANIFEST_VERSION {
            bail!(
                "unsupported sprite manifest version {}; expected {}",
                manifest.version,
                SUPPORTED_MANIFEST_VERSION
            );
        }

        let mut resolved = Self::default();
        for (name, relative_path) in manifest.sprites {
            let Some(key) = SpriteKey::from_name(&name) else {
                bail!("unknown sprite key `{name}` in manifest");
            };
            let _ = resolved.paths.insert(key, base_path.join(relative_path));
        }
        Ok(resolved)
    }

    /// Asset path of the provided sprite.
    #[must_use]
    pub fn path(&self, key: SpriteKey) -> Option<&Path> {
        self.paths.get(&key).map(PathBuf::as_path)
    }

    /// Number of sprites described.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Reports whether the manifest describes no sprites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    #[serde(default)]
    sprites: BTreeMap<String, String>,
}
