use serde::{Deserialize, Serialize};

/// User configuration from Companion Config.yaml
///
/// Contains user-specific settings and directory overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "Companion_Settings", default)]
    pub companion_settings: CompanionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionSettings {
    /// Root of the `<car>/<track>/<setup>.json` hierarchy. Empty means the
    /// simulator's default location under the user's Documents folder.
    #[serde(rename = "Setups Directory", default)]
    pub setups_dir: String,

    #[serde(rename = "Log Directory", default = "default_log_dir")]
    pub log_dir: String,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

impl Default for CompanionSettings {
    fn default() -> Self {
        Self {
            setups_dir: String::new(),
            log_dir: default_log_dir(),
            debug_mode: false,
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}
