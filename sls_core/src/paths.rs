use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Make `path` absolute and lexically resolve `.` and `..` components
/// without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
	let absolute = if path.is_absolute() {
		path.to_path_buf()
	} else {
		std::env::current_dir()
			.map(|cwd| cwd.join(path))
			.unwrap_or_else(|_| path.to_path_buf())
	};

	let mut normalized = PathBuf::new();
	for component in absolute.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				normalized.pop();
			}
			other => normalized.push(other.as_os_str()),
		}
	}

	normalized
}

/// Path segments leading from `root` to `path`. Returns `None` when `path`
/// lies outside `root`; an empty list means `path` is `root` itself.
pub fn relative_parts(root: &Path, path: &Path) -> Option<Vec<String>> {
	let root = normalize_path(root);
	let path = normalize_path(path);
	let relative = path.strip_prefix(&root).ok()?;

	Some(
		relative
			.components()
			.map(|component| component.as_os_str().to_string_lossy().into_owned())
			.collect(),
	)
}

/// Final path segment as an owned string, falling back to the full display
/// form for paths such as `/` that have no file name.
pub fn base_name(path: &Path) -> String {
	path.file_name().map_or_else(
		|| path.display().to_string(),
		|name| name.to_string_lossy().into_owned(),
	)
}
