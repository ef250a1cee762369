use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Tunable checker rules. The defaults match the current ruleset: no volume
/// ceiling, duplicate-play detection against the music stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rules {
    /// When set, `volume` values above this bound are errors. The historical
    /// `<= 1` rule is retired by default but can be re-enabled here.
    #[serde(default)]
    pub max_volume: Option<f64>,
    /// Reproduce the historical duplicate-play lookup, which scanned the
    /// image stack for loop-tagged entries and therefore never fired.
    #[serde(default)]
    pub legacy_music_duplicate_lookup: bool,
    /// `say` content spanning at least this many lines draws a style warning.
    #[serde(default = "default_say_line_limit")]
    pub say_line_limit: u32,
}

fn default_say_line_limit() -> u32 {
    3
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_volume: None,
            legacy_music_duplicate_lookup: false,
            say_line_limit: default_say_line_limit(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub env_name: String,
    pub scripts_dir: PathBuf,
    #[serde(default)]
    pub rules: Rules,
}

impl Default for Config {
    fn default() -> Self {
        let env_name = env::var("VNSA_ENV").unwrap_or_else(|_| String::from("default"));

        let scripts_dir = if let Ok(custom_dir) = env::var("VNSA_SCRIPTS_DIR") {
            PathBuf::from(custom_dir)
        } else {
            let local_scripts = Path::new("./data/scripts");
            if local_scripts.is_dir() {
                local_scripts.to_path_buf()
            } else {
                Self::base_dir().join(".vnsa").join(&env_name).join("scripts")
            }
        };

        Config {
            env_name,
            scripts_dir,
            rules: Rules::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = Self::get_config_path();
        if !config_path.exists() {
            let config = Config::default();
            config.save().unwrap_or_default();
            return config;
        }

        match fs::read_to_string(&config_path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Config::default(),
        }
    }

    pub fn save(&self) -> io::Result<()> {
        let config_path = Self::get_config_path();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)
    }

    pub fn get_config_path() -> PathBuf {
        let env_name = env::var("VNSA_ENV").unwrap_or_else(|_| String::from("default"));
        Self::base_dir()
            .join(".vnsa")
            .join(&env_name)
            .join("config.json")
    }

    fn base_dir() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(env::var("USERPROFILE").unwrap_or_else(|_| String::from(".")))
        } else {
            PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from(".")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_match_the_current_ruleset() {
        let rules = Rules::default();
        assert_eq!(rules.max_volume, None);
        assert!(!rules.legacy_music_duplicate_lookup);
        assert_eq!(rules.say_line_limit, 3);
    }

    #[test]
    fn rules_round_trip_through_json() {
        let rules = Rules {
            max_volume: Some(1.0),
            legacy_music_duplicate_lookup: true,
            say_line_limit: 5,
        };
        let json = serde_json::to_string(&rules).unwrap();
        let back: Rules = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_volume, Some(1.0));
        assert!(back.legacy_music_duplicate_lookup);
        assert_eq!(back.say_line_limit, 5);
    }

    #[test]
    fn missing_rule_fields_fall_back_to_defaults() {
        let rules: Rules = serde_json::from_str("{}").unwrap();
        assert_eq!(rules.max_volume, None);
        assert_eq!(rules.say_line_limit, 3);
    }
}
