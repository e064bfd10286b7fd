use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobBuilder;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use crate::EntryType;
use crate::MetadataSource;
use crate::frontmatter::KEY_DEPTH;
use crate::frontmatter::KEY_DESCRIPTION;
use crate::frontmatter::KEY_HEIGHT;
use crate::frontmatter::METADATA_FILE_NAME;
use crate::frontmatter::coerce_bool;
use crate::frontmatter::coerce_count;
use crate::frontmatter::coerce_string;
use crate::frontmatter::parse_front_matter;
use crate::paths::normalize_path;
use crate::paths::relative_parts;

/// A structural contract for a directory's children, declared under
/// `sls:schema` in a metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
	pub children: Vec<SchemaChild>,
}

/// How a schema child selects entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildKey {
	/// Exact basename.
	Name(String),
	/// Glob matched against the basename.
	Pattern(Glob),
}

/// One declared child. Nested `children` describe the child's own contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaChild {
	pub key: ChildKey,
	/// When set, only entries of this type can match.
	pub entry_type: Option<EntryType>,
	pub required: bool,
	pub description: Option<String>,
	pub depth: Option<usize>,
	pub height: Option<usize>,
	pub children: Vec<SchemaChild>,
}

impl Schema {
	/// Decode a schema from front matter. A schema without a single valid
	/// child is discarded.
	pub(crate) fn from_value(value: &Value) -> Option<Self> {
		let children = parse_children(value.get("children")?);
		if children.is_empty() {
			debug!("discarding schema without valid children");
			return None;
		}

		Some(Self { children })
	}
}

fn parse_children(value: &Value) -> Vec<SchemaChild> {
	let Value::Array(items) = value else {
		return Vec::new();
	};

	items.iter().filter_map(SchemaChild::from_value).collect()
}

impl SchemaChild {
	fn from_value(value: &Value) -> Option<Self> {
		let Value::Object(map) = value else {
			return None;
		};
		let key = parse_key(map)?;

		Some(Self {
			key,
			entry_type: map
				.get("type")
				.and_then(Value::as_str)
				.and_then(EntryType::parse),
			required: map.get("required").and_then(coerce_bool).unwrap_or(false),
			description: map.get(KEY_DESCRIPTION).and_then(coerce_string),
			depth: map.get(KEY_DEPTH).and_then(coerce_count),
			height: map.get(KEY_HEIGHT).and_then(coerce_count),
			children: map.get("children").map(parse_children).unwrap_or_default(),
		})
	}

	pub fn name(&self) -> Option<&str> {
		match &self.key {
			ChildKey::Name(name) => Some(name),
			ChildKey::Pattern(_) => None,
		}
	}

	pub fn pattern(&self) -> Option<&str> {
		match &self.key {
			ChildKey::Name(_) => None,
			ChildKey::Pattern(glob) => Some(glob.glob()),
		}
	}

	fn accepts(&self, entry_type: EntryType) -> bool {
		self.entry_type.is_none_or(|declared| declared == entry_type)
	}

	fn matches_name(&self, name: &str) -> bool {
		matches!(&self.key, ChildKey::Name(declared) if declared == name)
	}

	fn matches_pattern(&self, name: &str) -> bool {
		matches!(&self.key, ChildKey::Pattern(glob) if pattern_matches(glob, name))
	}
}

/// Exactly one of `name` and `pattern` must be present.
fn parse_key(map: &Map<String, Value>) -> Option<ChildKey> {
	let name = map.get("name").and_then(coerce_string);
	let pattern = map.get("pattern").and_then(coerce_string);

	match (name, pattern) {
		(Some(name), None) => Some(ChildKey::Name(name)),
		(None, Some(pattern)) => {
			match compile_pattern(&pattern) {
				Ok(glob) => Some(ChildKey::Pattern(glob)),
				Err(error) => {
					debug!(%pattern, %error, "discarding schema child with invalid pattern");
					None
				}
			}
		}
		(Some(name), Some(pattern)) => {
			debug!(%name, %pattern, "discarding schema child declaring both name and pattern");
			None
		}
		(None, None) => {
			debug!("discarding schema child without name or pattern");
			None
		}
	}
}

pub(crate) fn compile_pattern(pattern: &str) -> Result<Glob, globset::Error> {
	GlobBuilder::new(pattern).literal_separator(true).build()
}

/// Match a basename against a schema pattern. Dot-prefixed names only match
/// patterns that themselves start with `.`, so `*` never selects `.git`.
pub(crate) fn pattern_matches(glob: &Glob, name: &str) -> bool {
	if name.starts_with('.') && !glob.glob().starts_with('.') {
		return false;
	}

	glob.compile_matcher().is_match(name)
}

/// Find the declaration that governs an entry. Children whose declared type
/// conflicts with `entry_type` are skipped. An exact name match beats any
/// pattern match; within each kind the first declaration wins.
pub fn match_child<'a>(
	children: &'a [SchemaChild],
	name: &str,
	entry_type: EntryType,
) -> Option<&'a SchemaChild> {
	let candidates = || children.iter().filter(move |child| child.accepts(entry_type));

	candidates()
		.find(|child| child.matches_name(name))
		.or_else(|| candidates().find(|child| child.matches_pattern(name)))
}

/// A schema found while walking from the root toward an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorSchema {
	/// Path of the metadata document declaring the schema.
	pub path: PathBuf,
	pub schema: Schema,
	/// Segments from the root to the directory holding the document.
	pub relative_parts: Vec<String>,
}

/// Read the schema declared by `dir`'s metadata document, if any.
pub(crate) fn read_schema(dir: &Path) -> Option<(PathBuf, Schema)> {
	let document = dir.join(METADATA_FILE_NAME);
	if !document.is_file() {
		return None;
	}

	let schema = parse_front_matter(&document).schema?;
	Some((document, schema))
}

/// Collect every schema declared between `root` and `entry_path`
/// (both inclusive), ordered root-first. Paths outside `root` yield nothing.
pub fn collect_ancestor_schemas(entry_path: &Path, root: &Path) -> Vec<AncestorSchema> {
	let Some(parts) = relative_parts(root, entry_path) else {
		return Vec::new();
	};

	let mut current = normalize_path(root);
	let mut schemas = Vec::new();
	if let Some((path, schema)) = read_schema(&current) {
		schemas.push(AncestorSchema {
			path,
			schema,
			relative_parts: Vec::new(),
		});
	}

	for (index, part) in parts.iter().enumerate() {
		current.push(part);
		if let Some((path, schema)) = read_schema(&current) {
			schemas.push(AncestorSchema {
				path,
				schema,
				relative_parts: parts[..=index].to_vec(),
			});
		}
	}

	schemas
}

/// Provenance of each field in [`ResolvedDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
	pub description: Option<MetadataSource>,
	pub depth: Option<MetadataSource>,
	pub height: Option<MetadataSource>,
}

/// Defaults an entry inherits from ancestor schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDefaults {
	pub description: Option<String>,
	pub depth: Option<usize>,
	pub height: Option<usize>,
	pub source: Provenance,
}

impl ResolvedDefaults {
	/// Fill fields that are still unset from `child`.
	fn absorb(&mut self, child: &SchemaChild, schema_path: &Path) {
		let source = || {
			Some(MetadataSource::Schema {
				path: schema_path.to_path_buf(),
			})
		};

		if self.description.is_none() && child.description.is_some() {
			self.description.clone_from(&child.description);
			self.source.description = source();
		}

		if self.depth.is_none() && child.depth.is_some() {
			self.depth = child.depth;
			self.source.depth = source();
		}

		if self.height.is_none() && child.height.is_some() {
			self.height = child.height;
			self.source.height = source();
		}
	}
}

/// Walk the schema tree along `segments`. Intermediate segments are matched
/// as directories, the final one as `entry_type`.
fn navigate<'a>(
	schema: &'a Schema,
	segments: &[&str],
	entry_type: EntryType,
) -> Option<&'a SchemaChild> {
	let (last, intermediate) = segments.split_last()?;
	let mut children = schema.children.as_slice();

	for segment in intermediate {
		let child = match_child(children, segment, EntryType::Directory)?;
		children = child.children.as_slice();
	}

	match_child(children, last, entry_type)
}

/// Resolve schema defaults for the entry `name` at `entry_path`.
///
/// Schemas are folded root-first and a field, once set, is never replaced:
/// the schema closest to the root is authoritative and deeper schemas only
/// fill gaps.
pub fn resolve_defaults(
	entry_path: &Path,
	name: &str,
	entry_type: EntryType,
	root: Option<&Path>,
) -> ResolvedDefaults {
	let mut defaults = ResolvedDefaults::default();
	let Some(root) = root else {
		return defaults;
	};

	let entry_path = normalize_path(entry_path);
	let Some(parent) = entry_path.parent() else {
		return defaults;
	};
	let Some(parent_parts) = relative_parts(root, parent) else {
		return defaults;
	};

	for ancestor in collect_ancestor_schemas(parent, root) {
		let mut segments: Vec<&str> = parent_parts[ancestor.relative_parts.len()..]
			.iter()
			.map(String::as_str)
			.collect();
		segments.push(name);

		if let Some(child) = navigate(&ancestor.schema, &segments, entry_type) {
			defaults.absorb(child, &ancestor.path);
		}
	}

	defaults
}
