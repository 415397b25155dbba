use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use which::which;

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Path of the JSON snapshot holding the whole note collection
    pub data_file: PathBuf,

    /// Whether to seed two example notes when no snapshot exists
    pub seed_examples: bool,

    /// Default editor command (falls back to $EDITOR, then platform defaults)
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: default_data_file(),
            seed_examples: true,
            editor_command: None,
        }
    }
}

/// Default snapshot location under the platform data directory, falling
/// back to the current directory when none can be resolved.
fn default_data_file() -> PathBuf {
    ProjectDirs::from("", "", "agenda")
        .map(|dirs| dirs.data_dir().join("notes.json"))
        .unwrap_or_else(|| PathBuf::from("notes.json"))
}

impl Config {
    /// Configuration pointing at an explicit snapshot file.
    pub fn with_data_file(data_file: PathBuf) -> Self {
        Config {
            data_file,
            ..Config::default()
        }
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else {
            // Try common Linux editors
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}
