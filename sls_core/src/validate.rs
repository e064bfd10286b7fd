use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::EntryType;
use crate::paths::normalize_path;
use crate::paths::relative_parts;
use crate::schema::ChildKey;
use crate::schema::Schema;
use crate::schema::SchemaChild;
use crate::schema::pattern_matches;
use crate::schema::read_schema;

/// Directories never searched for schema documents.
pub const SKIPPED_DIRECTORIES: [&str; 2] = [".git", "node_modules"];

/// Outcome of one required-child check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
	/// Where the declared child is expected.
	pub path: PathBuf,
	/// Metadata document declaring the schema.
	pub schema_path: PathBuf,
	pub required: bool,
	pub exists: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
	pub results: Vec<ValidationResult>,
	/// Checks whose target exists.
	pub passed: usize,
	/// Required checks whose target is missing.
	pub failed: usize,
}

impl ValidationSummary {
	fn from_results(results: Vec<ValidationResult>) -> Self {
		let passed = results.iter().filter(|result| result.exists).count();
		let failed = results
			.iter()
			.filter(|result| result.required && !result.exists)
			.count();

		Self {
			results,
			passed,
			failed,
		}
	}

	pub fn is_ok(&self) -> bool {
		self.failed == 0
	}
}

/// Check every schema declared anywhere under `dir` against the tree.
///
/// `root` only bounds the scope: a `dir` outside it validates nothing.
pub fn validate(dir: &Path, root: Option<&Path>) -> ValidationSummary {
	let dir = normalize_path(dir);
	if root.is_some_and(|root| relative_parts(root, &dir).is_none()) {
		debug!(dir = %dir.display(), "validation target lies outside the root");
		return ValidationSummary::default();
	}

	let mut results = Vec::new();
	for (schema_path, schema) in collect_all_schemas(&dir) {
		let Some(base) = schema_path.parent() else {
			continue;
		};
		check_children(base, &schema.children, &schema_path, &mut results);
	}

	ValidationSummary::from_results(results)
}

/// Every schema-bearing metadata document under `dir`, in sorted walk order.
pub fn collect_all_schemas(dir: &Path) -> Vec<(PathBuf, Schema)> {
	let mut schemas = Vec::new();
	let mut visited = HashSet::new();
	walk_schemas(dir, &mut schemas, &mut visited);
	schemas
}

fn walk_schemas(dir: &Path, schemas: &mut Vec<(PathBuf, Schema)>, visited: &mut HashSet<PathBuf>) {
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited.insert(canonical) {
		debug!(dir = %dir.display(), "skipping already visited directory");
		return;
	}

	if let Some(found) = read_schema(dir) {
		schemas.push(found);
	}

	for path in sorted_subdirectories(dir) {
		let skipped = path
			.file_name()
			.and_then(|name| name.to_str())
			.is_some_and(|name| SKIPPED_DIRECTORIES.contains(&name));
		if !skipped {
			walk_schemas(&path, schemas, visited);
		}
	}
}

fn sorted_subdirectories(dir: &Path) -> Vec<PathBuf> {
	let items = match fs::read_dir(dir) {
		Ok(items) => items,
		Err(error) => {
			debug!(dir = %dir.display(), %error, "failed to read directory");
			return Vec::new();
		}
	};

	let mut directories: Vec<PathBuf> = items
		.filter_map(Result::ok)
		.map(|item| item.path())
		.filter(|path| path.is_dir())
		.collect();
	directories.sort();
	directories
}

fn exists_as(path: &Path, entry_type: Option<EntryType>) -> bool {
	match entry_type {
		Some(EntryType::Directory) => path.is_dir(),
		Some(EntryType::File) => path.is_file(),
		None => path.exists(),
	}
}

/// Required named children are checked at `base/name` and descended into
/// when present; optional ones are not checked at all. Pattern children with
/// nested declarations are applied to every matching subdirectory of `base`.
fn check_children(
	base: &Path,
	children: &[SchemaChild],
	schema_path: &Path,
	results: &mut Vec<ValidationResult>,
) {
	for child in children {
		match &child.key {
			ChildKey::Name(name) => {
				if !child.required {
					continue;
				}

				let path = base.join(name);
				let exists = exists_as(&path, child.entry_type);
				results.push(ValidationResult {
					path: path.clone(),
					schema_path: schema_path.to_path_buf(),
					required: true,
					exists,
				});

				if exists && !child.children.is_empty() {
					check_children(&path, &child.children, schema_path, results);
				}
			}
			ChildKey::Pattern(glob) => {
				if child.children.is_empty() {
					continue;
				}

				for path in sorted_subdirectories(base) {
					let matched = path
						.file_name()
						.and_then(|name| name.to_str())
						.is_some_and(|name| pattern_matches(glob, name));
					if matched {
						check_children(&path, &child.children, schema_path, results);
					}
				}
			}
		}
	}
}
