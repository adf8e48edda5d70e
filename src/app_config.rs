//! Application configuration loading for CLI defaults.
//!
//! The file lives at `$XDG_CONFIG_HOME/signposting/config.toml` (or
//! `$HOME/.config/signposting/config.toml`) and holds flat `key = value`
//! lines. Command-line flags override every value it sets.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use signposting::DiscoveryConfig;

use crate::cli::{Args, Mode};

/// File configuration for CLI defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Linksets followed per URL in `all` mode (0..=50).
    pub max_linksets: Option<u64>,
    /// Custom User-Agent header.
    pub user_agent: Option<String>,
    /// Default discovery mode.
    pub mode: Option<Mode>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against CLI constraints.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if let Some(max_linksets) = self.max_linksets
            && max_linksets > 50
        {
            bail!("Invalid config value for `max_linksets`: {max_linksets}. Expected range: 0..=50");
        }
        if let Some(user_agent) = &self.user_agent
            && user_agent.trim().is_empty()
        {
            bail!("Invalid config value for `user_agent`: must not be empty");
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    /// Default tracing level for this setting.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Effective settings after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mode: Mode,
    pub discovery: DiscoveryConfig,
    /// Tracing level used when `RUST_LOG` is unset
    pub log_level: &'static str,
}

impl Settings {
    /// Merges CLI flags over file values over built-in defaults.
    #[must_use]
    pub fn resolve(args: &Args, file: Option<&FileConfig>) -> Self {
        let file = file.cloned().unwrap_or_default();
        let mut discovery = DiscoveryConfig::default();
        if let Some(secs) = args.connect_timeout.or(file.connect_timeout_secs) {
            discovery.connect_timeout_secs = secs;
        }
        if let Some(secs) = args.read_timeout.or(file.read_timeout_secs) {
            discovery.read_timeout_secs = secs;
        }
        if let Some(max) = args.max_linksets.or(file.max_linksets) {
            discovery.max_linksets = usize::try_from(max).unwrap_or(usize::MAX);
        }
        if let Some(user_agent) = file.user_agent {
            discovery.user_agent = user_agent;
        }

        // Priority: quiet flag > verbose flag > config verbosity > info
        let log_level = if args.quiet {
            "error"
        } else {
            match args.verbose {
                0 => file
                    .verbosity
                    .map_or("info", VerbositySetting::log_level),
                1 => "debug",
                _ => "trace",
            }
        };

        Self {
            mode: args.mode.or(file.mode).unwrap_or(Mode::All),
            discovery,
            log_level,
        }
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/signposting/config.toml`
/// 2. `$HOME/.config/signposting/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("signposting")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("signposting")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
        loaded_from_file: true,
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "connect_timeout_secs" | "read_timeout_secs" | "max_linksets" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                match key {
                    "connect_timeout_secs" => cfg.connect_timeout_secs = Some(parsed),
                    "read_timeout_secs" => cfg.read_timeout_secs = Some(parsed),
                    _ => cfg.max_linksets = Some(parsed),
                }
            }
            "user_agent" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `user_agent` value on line {line_no}"))?;
                cfg.user_agent = Some(parsed);
            }
            "mode" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `mode` value on line {line_no}"))?;
                cfg.mode = Some(parse_mode(&parsed).with_context(|| {
                    format!("Invalid `mode` value '{parsed}' on line {line_no}")
                })?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `verbosity` value on line {line_no}"))?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_mode(value: &str) -> Result<Mode> {
    match value {
        "head" => Ok(Mode::Head),
        "html" => Ok(Mode::Html),
        "linkset" => Ok(Mode::Linkset),
        "all" => Ok(Mode::All),
        _ => bail!("Expected one of: head, html, linkset, all"),
    }
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["signposting"];
        argv.extend_from_slice(extra);
        argv.push("https://example.org/");
        Args::try_parse_from(argv).unwrap()
    }

    // ==================== Parsing ====================

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
read_timeout_secs = 45
mode = "head"
"#,
        )
        .unwrap();
        assert_eq!(cfg.read_timeout_secs, Some(45));
        assert_eq!(cfg.mode, Some(Mode::Head));
        assert!(cfg.connect_timeout_secs.is_none());
    }

    #[test]
    fn test_parse_config_all_fields_with_comments() {
        let cfg = parse_config_str(
            r#"
# discovery defaults
connect_timeout_secs = 5 # fast fail
read_timeout_secs = 20
max_linksets = 2
user_agent = "my-harvester/1.0 (#1)"
mode = "linkset"
verbosity = "quiet"
"#,
        )
        .unwrap();
        assert_eq!(cfg.connect_timeout_secs, Some(5));
        assert_eq!(cfg.max_linksets, Some(2));
        assert_eq!(cfg.user_agent.as_deref(), Some("my-harvester/1.0 (#1)"));
        assert_eq!(cfg.mode, Some(Mode::Linkset));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err = parse_config_str("connect_timeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_numeric_values_with_trailing_tokens() {
        let err = parse_config_str("read_timeout_secs = 4 trailing").unwrap_err();
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_too_many_linksets() {
        let err = parse_config_str("max_linksets = 51").unwrap_err();
        assert!(err.to_string().contains("max_linksets"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_mode() {
        let err = parse_config_str(r#"mode = "ftp""#).unwrap_err();
        assert!(err.to_string().contains("mode"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("user_agent = bot").unwrap_err();
        assert!(err.to_string().contains("user_agent"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("mode").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_load_file_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_linksets = 3\n").unwrap();
        let cfg = load_file_config(&path).unwrap();
        assert_eq!(cfg.max_linksets, Some(3));
    }

    #[test]
    fn test_load_file_config_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_linksets = many\n").unwrap();
        let err = load_file_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn test_verbosity_labels() {
        assert_eq!(VerbositySetting::Default.as_str(), "default");
        assert_eq!(VerbositySetting::Debug.as_str(), "debug");
        assert_eq!(VerbositySetting::Quiet.log_level(), "error");
    }

    // ==================== Merging ====================

    #[test]
    fn test_settings_defaults_without_file() {
        let settings = Settings::resolve(&args(&[]), None);
        assert_eq!(settings.mode, Mode::All);
        assert_eq!(settings.discovery, DiscoveryConfig::default());
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_settings_file_values_apply() {
        let file = parse_config_str(
            "read_timeout_secs = 90\nmode = \"html\"\nverbosity = \"verbose\"\nuser_agent = \"x/1\"",
        )
        .unwrap();
        let settings = Settings::resolve(&args(&[]), Some(&file));
        assert_eq!(settings.discovery.read_timeout_secs, 90);
        assert_eq!(settings.discovery.user_agent, "x/1");
        assert_eq!(settings.mode, Mode::Html);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_settings_flags_override_file() {
        let file = parse_config_str("read_timeout_secs = 90\nmode = \"html\"").unwrap();
        let settings = Settings::resolve(
            &args(&["--read-timeout", "7", "--mode", "head", "-q"]),
            Some(&file),
        );
        assert_eq!(settings.discovery.read_timeout_secs, 7);
        assert_eq!(settings.mode, Mode::Head);
        assert_eq!(settings.log_level, "error");
    }
}
