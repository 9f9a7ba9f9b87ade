/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD), or from
/// an explicit path. Falls back to defaults if the file is missing or
/// incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub mission: MissionConfig,
    pub caves_dir: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MissionConfig {
    pub seed: u64,
    pub max_steps: usize,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    mission: TomlMission,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlMission {
    #[serde(default = "default_seed")]
    seed: u64,
    #[serde(default = "default_max_steps")]
    max_steps: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_caves_dir")]
    caves_dir: String,
    #[serde(default = "default_log")]
    log: String,
}

// ── Defaults ──

fn default_seed() -> u64 { 100 }
fn default_max_steps() -> usize { 500 }
fn default_caves_dir() -> String { "caves".into() }
fn default_log() -> String { "warn".into() }

impl Default for TomlMission {
    fn default() -> Self {
        TomlMission {
            seed: default_seed(),
            max_steps: default_max_steps(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            caves_dir: default_caves_dir(),
            log: default_log(),
        }
    }
}

// ── Loading ──

impl RunConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let paths: Vec<PathBuf> = search_dirs.iter().map(|d| d.join("config.toml")).collect();
        let toml_cfg = load_toml(&paths);
        RunConfig::resolve(toml_cfg, &search_dirs)
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> Self {
        let base = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        let toml_cfg = load_toml(&[path.to_path_buf()]);
        RunConfig::resolve(toml_cfg, &[base])
    }

    /// Parse config text directly; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(RunConfig::resolve(toml_cfg, &[]))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve caves directory
        let caves_dir_str = &toml_cfg.general.caves_dir;
        let caves_dir = if PathBuf::from(caves_dir_str).is_absolute() {
            PathBuf::from(caves_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(caves_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(caves_dir_str))
        };

        RunConfig {
            mission: MissionConfig {
                seed: toml_cfg.mission.seed,
                max_steps: toml_cfg.mission.max_steps,
            },
            caves_dir,
            log: toml_cfg.general.log,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig::resolve(TomlConfig::default(), &[])
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First readable, parseable file among `paths`.
fn load_toml(paths: &[PathBuf]) -> TomlConfig {
    for path in paths {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warn!(path = %path.display(), "config parse error, using defaults: {e}");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), "could not read config: {e}");
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = RunConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, RunConfig::default());
        assert_eq!(cfg.mission.seed, 100);
        assert_eq!(cfg.mission.max_steps, 500);
        assert_eq!(cfg.log, "warn");
        assert_eq!(cfg.caves_dir, PathBuf::from("caves"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = RunConfig::from_toml_str("[mission]\nseed = 7\n").unwrap();
        assert_eq!(cfg.mission.seed, 7);
        assert_eq!(cfg.mission.max_steps, 500);
        assert_eq!(cfg.log, "warn");
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(RunConfig::from_toml_str("[mission]\nseed = \"seven\"\n").is_err());
    }

    #[test]
    fn missing_explicit_file_falls_back() {
        let cfg = RunConfig::load_from(Path::new("/nonexistent/cavewalk.toml"));
        assert_eq!(cfg.mission, RunConfig::default().mission);
    }
}
