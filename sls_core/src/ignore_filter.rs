use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use tracing::debug;

use crate::paths::normalize_path;
use crate::paths::relative_parts;

/// Tool-specific ignore file. Takes precedence over [`GENERIC_IGNORE_FILE`]
/// in the same directory.
pub const TOOL_IGNORE_FILE: &str = ".slsignore";

pub const GENERIC_IGNORE_FILE: &str = ".gitignore";

/// Always excluded, before any ignore file is consulted.
pub const DEFAULT_IGNORES: [&str; 7] = [
	".git",
	"node_modules",
	".DS_Store",
	"*.swp",
	"*.swo",
	TOOL_IGNORE_FILE,
	GENERIC_IGNORE_FILE,
];

/// Composite gitignore-syntax matcher for the entries of one directory.
///
/// Each ignore file is compiled against its own directory so anchored
/// patterns such as `/build` only apply where they were written.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
	dir: PathBuf,
	/// Lowest precedence first: built-ins and extra patterns, then one
	/// matcher per ignore file from the root down to `dir`.
	layers: Vec<Gitignore>,
}

impl IgnoreFilter {
	/// Build the matcher for `dir`.
	///
	/// Rules are layered in order: [`DEFAULT_IGNORES`], `extra_patterns`,
	/// then one ignore file per directory from `root` down to `dir`, so that
	/// deeper rules (including negations) override shallower ones. Without a
	/// root, or when `dir` lies outside it, only `dir` itself is consulted.
	pub fn build(dir: &Path, root: Option<&Path>, extra_patterns: &[String]) -> Self {
		let dir = normalize_path(dir);
		let mut builder = GitignoreBuilder::new(&dir);

		let defaults = DEFAULT_IGNORES.iter().copied();
		for pattern in defaults.chain(extra_patterns.iter().map(String::as_str)) {
			if let Err(error) = builder.add_line(None, pattern) {
				debug!(%pattern, %error, "skipping invalid ignore pattern");
			}
		}
		let mut layers = vec![finish(&builder, &dir)];

		for directory in cascade(&dir, root) {
			let Some(file) = ignore_file_in(&directory) else {
				continue;
			};

			let mut builder = GitignoreBuilder::new(&directory);
			if let Some(error) = builder.add(&file) {
				debug!(path = %file.display(), %error, "failed to load ignore file");
			}
			layers.push(finish(&builder, &directory));
		}

		Self { dir, layers }
	}

	/// Whether the immediate child `name` of the filtered directory is
	/// excluded. The deepest layer with an opinion decides.
	pub fn ignores(&self, name: &str, is_dir: bool) -> bool {
		let path = self.dir.join(name);

		self.layers
			.iter()
			.rev()
			.map(|layer| layer.matched(&path, is_dir))
			.find(|matched| !matched.is_none())
			.is_some_and(|matched| matched.is_ignore())
	}
}

fn finish(builder: &GitignoreBuilder, dir: &Path) -> Gitignore {
	builder.build().unwrap_or_else(|error| {
		debug!(dir = %dir.display(), %error, "falling back to an empty ignore matcher");
		Gitignore::empty()
	})
}

/// Dot-prefixed names are hidden.
pub fn is_hidden(name: &str) -> bool {
	name.starts_with('.')
}

/// Directories whose ignore files apply to `dir`, root-first.
fn cascade(dir: &Path, root: Option<&Path>) -> Vec<PathBuf> {
	let Some(root) = root else {
		return vec![dir.to_path_buf()];
	};
	let Some(parts) = relative_parts(root, dir) else {
		return vec![dir.to_path_buf()];
	};

	let mut current = normalize_path(root);
	let mut directories = vec![current.clone()];
	for part in parts {
		current.push(part);
		directories.push(current.clone());
	}

	directories
}

fn ignore_file_in(dir: &Path) -> Option<PathBuf> {
	[TOOL_IGNORE_FILE, GENERIC_IGNORE_FILE]
		.iter()
		.map(|name| dir.join(name))
		.find(|path| path.is_file())
}
