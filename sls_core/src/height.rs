use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::EntryType;
use crate::frontmatter::METADATA_FILE_NAME;
use crate::frontmatter::METADATA_SUFFIX;
use crate::frontmatter::parse_front_matter;
use crate::paths::base_name;
use crate::paths::normalize_path;
use crate::paths::relative_parts;
use crate::schema::resolve_defaults;

/// One directory above the queried entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ancestor {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// Where the queried entry sits relative to the root, with descriptive
/// context for the directories above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeightContext {
	/// `/`-separated path from the root to the entry.
	pub path: String,
	/// Outermost collected ancestor first, immediate parent last.
	pub ancestors: Vec<Ancestor>,
}

/// The document holding an entry's own metadata: `README.md` inside a
/// directory, or the entry itself for markdown files.
fn metadata_document(entry_path: &Path) -> Option<PathBuf> {
	if entry_path.is_dir() {
		let document = entry_path.join(METADATA_FILE_NAME);
		return document.is_file().then_some(document);
	}

	let name = base_name(entry_path);
	(entry_path.is_file() && name.ends_with(METADATA_SUFFIX)).then(|| entry_path.to_path_buf())
}

/// Number of ancestor levels to attach to `entry_path`: the entry's own
/// `sls:height`, else the schema default, else `0`.
pub fn resolve_height(entry_path: &Path, root: Option<&Path>) -> usize {
	let entry_path = normalize_path(entry_path);
	let local = metadata_document(&entry_path).and_then(|document| parse_front_matter(&document).height);
	if let Some(height) = local {
		return height;
	}

	let entry_type = if entry_path.is_dir() {
		EntryType::Directory
	} else {
		EntryType::File
	};

	resolve_defaults(&entry_path, &base_name(&entry_path), entry_type, root)
		.height
		.unwrap_or(0)
}

/// Description of an ancestor directory: local front matter first, then the
/// schema default.
pub fn ancestor_description(dir: &Path, root: Option<&Path>) -> Option<String> {
	let document = dir.join(METADATA_FILE_NAME);
	if document.is_file() {
		if let Some(description) = parse_front_matter(&document).description {
			return Some(description);
		}
	}

	resolve_defaults(dir, &base_name(dir), EntryType::Directory, root).description
}

/// Collect up to `levels` ancestors of `entry_path`, stopping below `root`.
///
/// Returns `None` when `levels` is zero, no root is known, or the entry lies
/// outside the root.
pub fn build_height_context(
	entry_path: &Path,
	levels: usize,
	root: Option<&Path>,
) -> Option<HeightContext> {
	if levels == 0 {
		return None;
	}

	let root = normalize_path(root?);
	let entry_path = normalize_path(entry_path);
	let parts = relative_parts(&root, &entry_path)?;

	let mut ancestors = Vec::new();
	let mut current = entry_path.parent();
	while let Some(dir) = current {
		if ancestors.len() >= levels || dir == root || !dir.starts_with(&root) {
			break;
		}

		ancestors.push(Ancestor {
			name: base_name(dir),
			description: ancestor_description(dir, Some(&root)),
		});
		current = dir.parent();
	}
	ancestors.reverse();

	Some(HeightContext {
		path: parts.join("/"),
		ancestors,
	})
}
