use std::fs;
use std::path::{Path, PathBuf};

use editor::Dictionary;
use richdoc::nodes::{DEFAULT_LEVELS, Heading};
use serde::Deserialize;

/// Highest `h` tag a heading may render as.
const MAX_RENDERED_LEVEL: u8 = 6;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("heading_levels must not be empty")]
    NoLevels,

    #[error("heading level {0} is not supported (expected 1 to 4)")]
    InvalidLevel(u8),

    #[error("heading level {level} with offset {offset} renders past h6")]
    OffsetTooLarge { level: u8, offset: u8 },
}

/// Settings read from `richdoc.toml`. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Scopes fold records. Defaults to the document's file stem.
    pub document_id: Option<String>,
    /// JSON file holding fold records. Fold state is not persisted without one.
    pub store: Option<PathBuf>,
    pub heading_levels: Vec<u8>,
    pub heading_offset: u8,
    pub dictionary: Dictionary,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            document_id: None,
            store: None,
            heading_levels: DEFAULT_LEVELS.to_vec(),
            heading_offset: 0,
            dictionary: Dictionary::default(),
        }
    }
}

impl Config {
    /// Load and validate the file at `path`, or the defaults when there is none.
    ///
    /// A relative `store` path is resolved against the config file's directory.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let (Some(store), Some(dir)) = (&config.store, path.parent()) {
            if store.is_relative() {
                config.store = Some(dir.join(store));
            }
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.heading_levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        for &level in &self.heading_levels {
            if !DEFAULT_LEVELS.contains(&level) {
                return Err(ConfigError::InvalidLevel(level));
            }
            if u16::from(level) + u16::from(self.heading_offset) > u16::from(MAX_RENDERED_LEVEL) {
                return Err(ConfigError::OffsetTooLarge {
                    level,
                    offset: self.heading_offset,
                });
            }
        }
        Ok(())
    }

    pub fn heading(&self) -> Heading {
        let mut levels = self.heading_levels.clone();
        levels.sort_unstable();
        levels.dedup();
        Heading::new(levels, self.heading_offset)
    }

    /// The configured document id, or the stem of `file`.
    pub fn document_id_for(&self, file: &Path) -> String {
        if let Some(id) = &self.document_id {
            return id.clone();
        }
        file.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("richdoc.toml");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.heading_levels, vec![1, 2, 3, 4]);
        assert_eq!(config.heading_offset, 0);
        assert!(config.store.is_none());
        assert_eq!(config.document_id_for(Path::new("notes/guide.md")), "guide");
    }

    #[test]
    fn reads_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
document_id = "handbook"
store = "folds.json"
heading_levels = [2, 1]
heading_offset = 1

[dictionary]
link_copied = "Copied!"
"#,
        );
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.document_id_for(Path::new("guide.md")), "handbook");
        assert_eq!(config.store, Some(dir.path().join("folds.json")));
        assert_eq!(config.heading(), Heading::new(vec![1, 2], 1));
        assert_eq!(config.dictionary.link_copied, "Copied!");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "heading_offset = 2\n");
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.heading_levels, vec![1, 2, 3, 4]);
        assert_eq!(config.dictionary, Dictionary::default());
    }

    #[test]
    fn rejects_bad_levels() {
        let dir = tempfile::tempdir().unwrap();

        let path = write_config(&dir, "heading_levels = [1, 5]\n");
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::InvalidLevel(5))));

        let path = write_config(&dir, "heading_levels = []\n");
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::NoLevels)));

        let path = write_config(&dir, "heading_offset = 3\n");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::OffsetTooLarge { level: 4, offset: 3 })
        ));
    }

    #[test]
    fn reports_unknown_keys_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "colour = \"blue\"\n");
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Parse { .. })));

        let missing = dir.path().join("nope.toml");
        assert!(matches!(Config::load(Some(&missing)), Err(ConfigError::Read { .. })));
    }
}
