use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::fs::Metadata;
use std::path::Path;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;
use globset::GlobMatcher;
use tracing::debug;
use tracing::trace;

use crate::Entry;
use crate::EntryType;
use crate::MetadataSource;
use crate::SlsError;
use crate::SlsResult;
use crate::config::SlsConfig;
use crate::frontmatter::FrontMatter;
use crate::frontmatter::METADATA_FILE_NAME;
use crate::frontmatter::METADATA_SUFFIX;
use crate::frontmatter::parse_front_matter;
use crate::ignore_filter::IgnoreFilter;
use crate::ignore_filter::is_hidden;
use crate::paths::base_name;
use crate::paths::normalize_path;
use crate::schema::ResolvedDefaults;
use crate::schema::compile_pattern;
use crate::schema::resolve_defaults;

/// Depth ceiling used when neither the caller nor the configuration sets one.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Description given to an entry that re-enters one of its own ancestors.
pub const SYMLINK_LOOP_DESCRIPTION: &str = "(symlink loop detected)";

/// Glob restricting which files appear in a listing.
#[derive(Debug, Clone)]
pub struct NameFilter {
	pattern: String,
	matcher: GlobMatcher,
}

impl NameFilter {
	pub fn new(pattern: &str) -> SlsResult<Self> {
		if pattern.trim().is_empty() {
			return Err(SlsError::InvalidFilter {
				filter: pattern.to_string(),
				reason: "filter pattern cannot be empty".to_string(),
			});
		}

		let glob = compile_pattern(pattern).map_err(|error| {
			SlsError::InvalidFilter {
				filter: pattern.to_string(),
				reason: error.kind().to_string(),
			}
		})?;

		Ok(Self {
			pattern: pattern.to_string(),
			matcher: glob.compile_matcher(),
		})
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	pub fn is_match(&self, name: &str) -> bool {
		self.matcher.is_match(name)
	}
}

/// Options for a single traversal.
#[derive(Debug, Clone, Default)]
pub struct TraverseOptions {
	/// Boundary for schema inheritance and ignore-file cascading.
	pub root: Option<PathBuf>,
	/// Depth ceiling for the whole walk. Depth directives found below the
	/// query root still override it for their own subtree.
	pub max_depth: Option<usize>,
	/// Include hidden and ignored entries.
	pub all: bool,
	/// Record where each description, depth and height came from.
	pub audit: bool,
	/// Only list files whose name matches. Directories are always kept.
	pub filter: Option<NameFilter>,
	/// Extra gitignore-syntax rules layered over the defaults.
	pub exclude_patterns: Vec<String>,
}

impl TraverseOptions {
	/// Construct [`TraverseOptions`] from an optional [`SlsConfig`].
	pub fn from_config(config: Option<&SlsConfig>) -> Self {
		Self {
			max_depth: config.and_then(|c| c.depth),
			exclude_patterns: config
				.map(|c| c.exclude.patterns.clone())
				.unwrap_or_default(),
			..Self::default()
		}
	}
}

/// Walk `path` and build its annotated entry tree.
///
/// Only failures on `path` itself are returned; unreadable descendants are
/// logged and omitted.
pub fn traverse(path: &Path, options: &TraverseOptions) -> SlsResult<Entry> {
	let path = normalize_path(path);
	if !path.exists() {
		return Err(SlsError::InvalidPath {
			path: path.display().to_string(),
			reason: "path does not exist".to_string(),
		});
	}

	traverse_node(&path, options, 0, None, &HashSet::new())
}

fn traverse_node(
	path: &Path,
	options: &TraverseOptions,
	depth: usize,
	effective_max_depth: Option<usize>,
	visited: &HashSet<PathBuf>,
) -> SlsResult<Entry> {
	let metadata = fs::metadata(path)?;
	let name = base_name(path);
	let entry_type = EntryType::from(&metadata);
	let modified = modified_at(&metadata);

	// Each branch extends its own copy, so siblings never see each other.
	let identity = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
	if visited.contains(&identity) {
		debug!(path = %path.display(), "symlink loop detected");
		let mut entry = Entry::new(name, entry_type, modified);
		entry.description = Some(SYMLINK_LOOP_DESCRIPTION.to_string());
		return Ok(entry);
	}
	let mut visited = visited.clone();
	visited.insert(identity);

	let defaults = resolve_defaults(path, &name, entry_type, options.root.as_deref());

	match entry_type {
		EntryType::File => Ok(file_entry(path, name, &metadata, modified, defaults, options)),
		EntryType::Directory => {
			let node = DirectoryNode {
				path,
				depth,
				effective_max_depth,
				visited: &visited,
			};
			Ok(directory_entry(&node, name, modified, defaults, options))
		}
	}
}

fn file_entry(
	path: &Path,
	name: String,
	metadata: &Metadata,
	modified: DateTime<Utc>,
	defaults: ResolvedDefaults,
	options: &TraverseOptions,
) -> Entry {
	let local = if name.ends_with(METADATA_SUFFIX) {
		parse_front_matter(path)
	} else {
		FrontMatter::default()
	};

	let mut entry = Entry::new(name, EntryType::File, modified);
	entry.size = Some(metadata.len());
	annotate(&mut entry, local, defaults, options);
	entry
}

struct DirectoryNode<'a> {
	path: &'a Path,
	depth: usize,
	effective_max_depth: Option<usize>,
	visited: &'a HashSet<PathBuf>,
}

fn directory_entry(
	node: &DirectoryNode<'_>,
	name: String,
	modified: DateTime<Utc>,
	defaults: ResolvedDefaults,
	options: &TraverseOptions,
) -> Entry {
	let document = node.path.join(METADATA_FILE_NAME);
	let local = if document.is_file() {
		parse_front_matter(&document)
	} else {
		FrontMatter::default()
	};

	let (directive, _) = layer(local.depth, defaults.depth, defaults.source.depth.clone());
	let mut entry = Entry::new(name, EntryType::Directory, modified);
	annotate(&mut entry, local, defaults, options);

	let filter = IgnoreFilter::build(node.path, options.root.as_deref(), &options.exclude_patterns);
	let is_query_root = node.depth == 0;
	let mut max_depth = node
		.effective_max_depth
		.or(options.max_depth)
		.unwrap_or(DEFAULT_MAX_DEPTH);

	match directive {
		Some(0) if !is_query_root => {
			trace!(path = %node.path.display(), "zero depth directive, collapsing to a count");
			entry.file_count = Some(count_visible_children(node.path, &filter, options));
			return entry;
		}
		Some(levels) if !is_query_root => max_depth = node.depth + levels,
		Some(levels) if levels > 0 && options.max_depth.is_none() => max_depth = levels,
		_ => {}
	}

	if node.depth >= max_depth {
		trace!(path = %node.path.display(), depth = node.depth, "depth ceiling reached");
		entry.truncated = true;
		entry.truncated_count = Some(count_visible_children(node.path, &filter, options));
		return entry;
	}

	entry.children = Some(read_children(node, &filter, max_depth, options));
	entry
}

/// Merge local front matter with schema defaults, local first.
fn annotate(
	entry: &mut Entry,
	local: FrontMatter,
	defaults: ResolvedDefaults,
	options: &TraverseOptions,
) {
	let (description, description_source) = layer(
		local.description,
		defaults.description,
		defaults.source.description,
	);
	entry.description = description;
	entry.summary = local.summary;
	entry.tags = local.tags;

	if options.audit {
		let (_, depth_source) = layer(local.depth, defaults.depth, defaults.source.depth);
		let (_, height_source) = layer(local.height, defaults.height, defaults.source.height);
		entry.description_source = description_source;
		entry.height_source = height_source;
		entry.depth_source = match entry.r#type {
			EntryType::Directory => depth_source.or(Some(MetadataSource::Default)),
			EntryType::File => depth_source,
		};
	}
}

/// Pick the local value over the inherited one, reporting which won.
fn layer<T>(
	local: Option<T>,
	inherited: Option<T>,
	inherited_source: Option<MetadataSource>,
) -> (Option<T>, Option<MetadataSource>) {
	match (local, inherited) {
		(Some(value), _) => (Some(value), Some(MetadataSource::Local)),
		(None, Some(value)) => (Some(value), inherited_source),
		(None, None) => (None, None),
	}
}

fn read_children(
	node: &DirectoryNode<'_>,
	filter: &IgnoreFilter,
	max_depth: usize,
	options: &TraverseOptions,
) -> Vec<Entry> {
	let items = match fs::read_dir(node.path) {
		Ok(items) => items,
		Err(error) => {
			debug!(path = %node.path.display(), %error, "failed to read directory");
			return Vec::new();
		}
	};

	let mut children = Vec::new();
	for item in items {
		let item = match item {
			Ok(item) => item,
			Err(error) => {
				debug!(path = %node.path.display(), %error, "failed to read directory entry");
				continue;
			}
		};

		let name = item.file_name().to_string_lossy().into_owned();
		let path = item.path();
		let is_dir = path.is_dir();
		if !is_listed(&name, is_dir, filter, options) {
			trace!(path = %path.display(), "skipping excluded entry");
			continue;
		}

		if !is_dir && options.filter.as_ref().is_some_and(|f| !f.is_match(&name)) {
			continue;
		}

		if declares_ignore(&path, &name, is_dir) {
			trace!(path = %path.display(), "skipping entry marked sls:ignore");
			continue;
		}

		match traverse_node(
			&path,
			options,
			node.depth + 1,
			Some(max_depth),
			node.visited,
		) {
			Ok(child) => children.push(child),
			Err(error) => debug!(path = %path.display(), %error, "omitting unreadable entry"),
		}
	}

	sort_entries(&mut children);
	children
}

/// Metadata documents, hidden names and ignored names are excluded unless
/// `all` is set. The metadata document is always excluded.
fn is_listed(name: &str, is_dir: bool, filter: &IgnoreFilter, options: &TraverseOptions) -> bool {
	if name == METADATA_FILE_NAME {
		return false;
	}

	options.all || !(is_hidden(name) || filter.ignores(name, is_dir))
}

fn declares_ignore(path: &Path, name: &str, is_dir: bool) -> bool {
	let document = if is_dir {
		path.join(METADATA_FILE_NAME)
	} else if name.ends_with(METADATA_SUFFIX) {
		path.to_path_buf()
	} else {
		return false;
	};

	document.is_file() && parse_front_matter(&document).is_ignored()
}

/// Non-recursive count of the children a listing of `dir` would show.
fn count_visible_children(dir: &Path, filter: &IgnoreFilter, options: &TraverseOptions) -> usize {
	let Ok(items) = fs::read_dir(dir) else {
		debug!(path = %dir.display(), "failed to count directory entries");
		return 0;
	};

	items
		.filter_map(Result::ok)
		.filter(|item| {
			let name = item.file_name().to_string_lossy().into_owned();
			is_listed(&name, item.path().is_dir(), filter, options)
		})
		.count()
}

/// Directories before files, then by name.
pub fn sort_entries(entries: &mut [Entry]) {
	entries.sort_by(|a, b| {
		match (a.r#type, b.r#type) {
			(EntryType::Directory, EntryType::File) => Ordering::Less,
			(EntryType::File, EntryType::Directory) => Ordering::Greater,
			_ => compare_names(&a.name, &b.name),
		}
	});
}

/// Case-insensitive, with lowercase ahead of uppercase on ties.
///
/// This approximates locale collation by comparing lowercased code points:
/// letters with diacritics sort after plain ASCII (`zebra` before `éclair`)
/// rather than beside their base letter. The order is identical on every
/// host, independent of the process locale.
pub fn compare_names(a: &str, b: &str) -> Ordering {
	a.to_lowercase()
		.cmp(&b.to_lowercase())
		.then_with(|| b.cmp(a))
}

fn modified_at(metadata: &Metadata) -> DateTime<Utc> {
	metadata
		.modified()
		.map(DateTime::<Utc>::from)
		.unwrap_or_default()
}
