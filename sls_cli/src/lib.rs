use std::path::PathBuf;

use clap::Parser;
use sls_core::NameFilter;
use sls_core::SlsError;
use sls_core::SlsResult;

pub use output::*;

mod output;

/// Smallest accepted `--depth`.
pub const MIN_DEPTH: usize = 1;
/// Largest accepted `--depth`.
pub const MAX_DEPTH: usize = 10;
/// Environment variable naming the schema root when `--root` is absent.
pub const ROOT_ENV_VAR: &str = "SLS_ROOT";

#[derive(Parser)]
#[command(
	author,
	version,
	about = "List directories with the descriptions, depth hints and schemas their authors left \
	         behind.",
	long_about = "sls (semantic listing) prints a directory tree annotated with metadata taken \
	              from README.md front matter and from sls:schema declarations in ancestor \
	              directories.\n\nOutput is JSON unless stdout is a terminal. Use --human or \
	              --json to choose explicitly.\n\nExamples:\n  sls                     List the \
	              current directory\n  sls guilds --depth 2    Limit the tree to two levels\n  \
	              sls --audit             Show where each description came from\n  sls \
	              --validate          Check required schema entries exist"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct SlsCli {
	/// Directory or file to list.
	#[arg(default_value = ".")]
	pub path: PathBuf,

	/// Emit JSON, even on a terminal.
	#[arg(long, default_value_t = false, conflicts_with = "human")]
	pub json: bool,

	/// Emit a human-readable tree, even when piped.
	#[arg(long, default_value_t = false)]
	pub human: bool,

	/// Maximum traversal depth, between 1 and 10. Defaults to the `depth`
	/// configured in sls.toml, or 3.
	#[arg(long, short, allow_negative_numbers = true)]
	pub depth: Option<i64>,

	/// Include hidden and ignored entries.
	#[arg(long, short, default_value_t = false)]
	pub all: bool,

	/// Annotate entries with the source of their description, depth and
	/// height.
	#[arg(long, default_value_t = false)]
	pub audit: bool,

	/// Check that every required schema entry exists instead of listing.
	#[arg(long, default_value_t = false)]
	pub validate: bool,

	/// Do not attach the ancestor (height) context.
	#[arg(long, default_value_t = false)]
	pub no_height: bool,

	/// Only list files whose name matches this glob, e.g. `*.md`.
	/// Directories are always listed.
	#[arg(long, short)]
	pub filter: Option<String>,

	/// Schema root. Falls back to $SLS_ROOT, then to the nearest ancestor
	/// whose README.md declares `sls:schema`.
	#[arg(long)]
	pub root: Option<PathBuf>,

	/// Log recovered failures (unreadable metadata, bad ignore files) to
	/// stderr.
	#[arg(long, default_value_t = false)]
	pub debug: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
	Json,
	Human,
}

impl SlsCli {
	/// `--human` and `--json` win; otherwise a terminal gets the tree.
	pub fn output_mode(&self, stdout_is_terminal: bool) -> OutputMode {
		if self.human || (!self.json && stdout_is_terminal) {
			OutputMode::Human
		} else {
			OutputMode::Json
		}
	}

	/// The requested depth ceiling, checked against
	/// [`MIN_DEPTH`]..=[`MAX_DEPTH`].
	pub fn depth(&self) -> SlsResult<Option<usize>> {
		self.depth.map(check_depth).transpose()
	}

	pub fn name_filter(&self) -> SlsResult<Option<NameFilter>> {
		self.filter.as_deref().map(NameFilter::new).transpose()
	}
}

/// Accept a depth ceiling from `--depth` or `sls.toml` only when it lies in
/// [`MIN_DEPTH`]..=[`MAX_DEPTH`].
pub fn check_depth(depth: i64) -> SlsResult<usize> {
	usize::try_from(depth)
		.ok()
		.filter(|depth| (MIN_DEPTH..=MAX_DEPTH).contains(depth))
		.ok_or(SlsError::InvalidDepth {
			depth,
			min: MIN_DEPTH,
			max: MAX_DEPTH,
		})
}
