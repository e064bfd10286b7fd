use std::path::Path;
use std::path::PathBuf;

use crate::paths::normalize_path;
use crate::schema::read_schema;

/// Walk upward from `start` (inclusive) to the first directory whose
/// metadata document declares a schema.
///
/// This is a convenience for front ends; the resolution, traversal and
/// validation functions never call it and only use the root they are given.
pub fn discover_root(start: &Path) -> Option<PathBuf> {
	let start = normalize_path(start);
	let first = if start.is_dir() {
		start.as_path()
	} else {
		start.parent()?
	};

	first
		.ancestors()
		.find(|dir| read_schema(dir).is_some())
		.map(Path::to_path_buf)
}
