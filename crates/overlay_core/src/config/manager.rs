//! Reading and writing `settings.toml`.
//!
//! Writes always go through a temp file in the same directory followed by
//! a rename. Updating one section edits that table in the on-disk document
//! and leaves the rest of the file, comments included, as it was.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use toml_edit::{DocumentMut, Item, Table};

use super::settings::{ConfigSection, Settings};

const FILE_HEADER: &str = "# Padel Overlay settings\n\
                           # Written by the application; edits to values are kept.\n";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// `settings.toml` in the platform config directory.
///
/// Falls back to `.config/settings.toml` under the working directory when
/// no home directory can be resolved.
pub fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", "padel-overlay")
        .map(|dirs| dirs.config_dir().join("settings.toml"))
        .unwrap_or_else(|| PathBuf::from(".config").join("settings.toml"))
}

/// In-memory settings bound to their file.
///
/// Edits through [`settings_mut`](Self::settings_mut) stay in memory until
/// [`save`](Self::save) or [`update_section`](Self::update_section).
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Starts from defaults; nothing is read until `load` or `load_or_create`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Read the file. Fails with [`ConfigError::NotFound`] when it is absent.
    pub fn load(&mut self) -> ConfigResult<()> {
        let content = self.read_existing()?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Read the file, or write one with defaults when it is absent.
    ///
    /// A file with missing keys or unknown sections is rewritten in full.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        let content = match self.read_existing() {
            Ok(content) => content,
            Err(ConfigError::NotFound(_)) => {
                tracing::info!("Creating default config at {}", self.config_path.display());
                self.settings = Settings::default();
                return self.save();
            }
            Err(e) => return Err(e),
        };

        self.settings = toml::from_str(&content)?;
        let document: DocumentMut = content.parse()?;
        if self.needs_repair(&document)? {
            tracing::info!("Repairing config file {}", self.config_path.display());
            self.save()?;
        }
        Ok(())
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    /// Create the logs folder if needed.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        fs::create_dir_all(self.logs_folder())?;
        Ok(())
    }

    /// Rewrite the whole file from the in-memory settings.
    pub fn save(&self) -> ConfigResult<()> {
        let mut document = DocumentMut::new();
        for section in ConfigSection::ALL {
            let mut table = self.section_edit_table(section)?;
            table
                .decor_mut()
                .set_prefix(format!("\n# {}\n", section.description()));
            document.insert(section.table_name(), Item::Table(table));
        }

        self.write_atomic(&format!("{FILE_HEADER}{document}"))?;
        Ok(())
    }

    /// Write one section to disk, keeping everything else in the file.
    ///
    /// The file is re-read first, so sections changed on disk since the
    /// last load are not overwritten.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let mut document = match self.read_existing() {
            Ok(content) => content.parse::<DocumentMut>()?,
            Err(ConfigError::NotFound(_)) => DocumentMut::new(),
            Err(e) => return Err(e),
        };

        let fresh = self.section_edit_table(section)?;
        let name = section.table_name();
        match document.get_mut(name).and_then(Item::as_table_mut) {
            Some(existing) => {
                existing.retain(|key, _| fresh.contains_key(key));
                for (key, item) in fresh.iter() {
                    existing[key] = item.clone();
                }
            }
            None => {
                document.insert(name, Item::Table(fresh));
            }
        }

        self.write_atomic(&document.to_string())?;
        tracing::debug!("Updated [{}] in {}", name, self.config_path.display());
        Ok(())
    }

    fn read_existing(&self) -> ConfigResult<String> {
        match fs::read_to_string(&self.config_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ConfigError::NotFound(self.config_path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Unknown top-level keys, or a section lacking keys the settings define.
    fn needs_repair(&self, document: &DocumentMut) -> ConfigResult<bool> {
        let unknown = document.iter().any(|(key, _)| {
            !ConfigSection::ALL
                .iter()
                .any(|section| section.table_name() == key)
        });
        if unknown {
            return Ok(true);
        }

        for section in ConfigSection::ALL {
            let expected = self.settings.section_table(section)?;
            let complete = document
                .get(section.table_name())
                .and_then(Item::as_table)
                .is_some_and(|present| expected.keys().all(|key| present.contains_key(key)));
            if !complete {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn section_edit_table(&self, section: ConfigSection) -> ConfigResult<Table> {
        let values = self.settings.section_table(section)?;
        let parsed: DocumentMut = toml::to_string(&values)?.parse()?;
        Ok(parsed.as_table().clone())
    }

    fn write_atomic(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Same directory, so the rename stays on one filesystem
        let temp_path = self.config_path.with_extension("toml.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_writes_every_section() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".config").join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.starts_with("# Padel Overlay settings"));
        for table in ["[worker]", "[paths]", "[logging]", "[update]"] {
            assert!(content.contains(table), "missing {table}");
        }
        assert!(content.contains("# Overlay worker invocation\n[worker]"));
    }

    #[test]
    fn saved_file_loads_back() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.settings_mut().paths.xml_path = "/data/match 1.xml".to_string();
        manager.save().unwrap();

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().paths.xml_path, "/data/match 1.xml");
        assert_eq!(reloaded.settings().worker.args, vec!["main.py"]);
    }

    #[test]
    fn partial_file_keeps_values_and_gains_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        fs::write(&config_path, "[paths]\ndefault_output = \"final.mp4\"\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert_eq!(manager.settings().paths.default_output, "final.mp4");
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[update]"));
        assert!(content.contains("final.mp4"));
    }

    #[test]
    fn complete_file_is_left_untouched() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        ConfigManager::new(&config_path).save().unwrap();

        let mut content = fs::read_to_string(&config_path).unwrap();
        content.push_str("# my note\n");
        fs::write(&config_path, &content).unwrap();

        ConfigManager::new(&config_path).load_or_create().unwrap();
        assert_eq!(fs::read_to_string(&config_path).unwrap(), content);
    }

    #[test]
    fn unknown_sections_are_dropped() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        ConfigManager::new(&config_path).save().unwrap();

        let mut content = fs::read_to_string(&config_path).unwrap();
        content.push_str("\n[legacy]\nfoo = 1\n");
        fs::write(&config_path, content).unwrap();

        ConfigManager::new(&config_path).load_or_create().unwrap();
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(!content.contains("[legacy]"));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("absent.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn update_section_keeps_other_sections_from_disk() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        // Edited on disk after the manager loaded it
        let content = fs::read_to_string(&config_path).unwrap();
        fs::write(
            &config_path,
            content.replace("program = \"python\"", "program = \"python3\""),
        )
        .unwrap();

        manager.settings_mut().paths.excel_path = "scores.xlsx".to_string();
        manager.update_section(ConfigSection::Paths).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("# Output default and last used inputs\n[paths]"));

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().paths.excel_path, "scores.xlsx");
        assert_eq!(reloaded.settings().worker.program, "python3");
    }

    #[test]
    fn update_section_creates_missing_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.settings_mut().paths.video_folder = "/vids".to_string();
        manager.update_section(ConfigSection::Paths).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[paths]"));
        assert!(content.contains("video_folder = \"/vids\""));
        assert!(!content.contains("[worker]"));
    }

    #[test]
    fn no_temp_file_is_left_behind() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        ConfigManager::new(&config_path).load_or_create().unwrap();

        assert!(!config_path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn ensure_dirs_creates_logs_folder() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("settings.toml"));
        let logs = dir.path().join("logs");
        manager.settings_mut().paths.logs_folder = logs.to_string_lossy().into_owned();

        manager.ensure_dirs_exist().unwrap();
        assert!(logs.is_dir());
    }

    #[test]
    fn default_path_ends_with_settings_file() {
        assert!(default_config_path().ends_with("settings.toml"));
    }
}
