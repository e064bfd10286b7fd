use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SlsError;
use crate::SlsResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["sls.toml", ".sls.toml", ".config/sls.toml"];

/// Configuration loaded from `sls.toml`.
///
/// ```toml
/// depth = 4
///
/// [exclude]
/// patterns = ["target/", "*.log"]
/// ```
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SlsConfig {
	/// Default traversal ceiling when no `--depth` is given.
	#[serde(default)]
	pub depth: Option<usize>,
	/// Extra exclusion rules.
	#[serde(default)]
	pub exclude: ExcludeConfig,
}

/// Gitignore-style exclusions applied to every listed directory.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ExcludeConfig {
	/// Layered after the built-in ignores and before any `.slsignore` or
	/// `.gitignore` file, so ignore files can re-include with `!pattern`.
	///
	/// Examples: `"build/"`, `"*.generated.md"`.
	#[serde(default)]
	pub patterns: Vec<String>,
}

impl SlsConfig {
	/// Resolve the config file path for a directory using
	/// [`CONFIG_FILE_CANDIDATES`].
	pub fn resolve_path(dir: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| dir.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load configuration from `dir`, or `None` when no config file exists.
	pub fn load(dir: &Path) -> SlsResult<Option<SlsConfig>> {
		let Some(config_path) = Self::resolve_path(dir) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: SlsConfig =
			toml::from_str(&content).map_err(|e| SlsError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}
}
