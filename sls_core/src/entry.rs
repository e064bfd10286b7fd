use std::fs::Metadata;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Whether a node is a regular file or a directory. Symlinks are reported as
/// the type of their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
	File,
	Directory,
}

impl EntryType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::File => "file",
			Self::Directory => "directory",
		}
	}

	/// Parse the `type` value used by schema declarations.
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim() {
			"file" => Some(Self::File),
			"directory" => Some(Self::Directory),
			_ => None,
		}
	}
}

impl From<&Metadata> for EntryType {
	fn from(metadata: &Metadata) -> Self {
		if metadata.is_dir() {
			Self::Directory
		} else {
			Self::File
		}
	}
}

/// Which layer produced a resolved metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataSource {
	/// The entry's own front matter.
	Local,
	/// A schema declared in the metadata document at `path`.
	Schema { path: PathBuf },
	/// Built-in fallback.
	Default,
}

/// A traversed file or directory.
///
/// The provenance fields (`description_source`, `depth_source`,
/// `height_source`) are only populated when traversal runs in audit mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
	/// Filesystem basename.
	pub name: String,
	pub r#type: EntryType,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub summary: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub tags: Vec<String>,
	pub modified: DateTime<Utc>,
	/// Size in bytes, files only.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub size: Option<u64>,
	/// Number of immediate children of a directory collapsed by a zero depth
	/// directive.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub file_count: Option<usize>,
	/// Set when the depth ceiling stopped recursion at this directory.
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub truncated: bool,
	/// Number of immediate children omitted by truncation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub truncated_count: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub children: Option<Vec<Entry>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description_source: Option<MetadataSource>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub depth_source: Option<MetadataSource>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub height_source: Option<MetadataSource>,
}

impl Entry {
	pub fn new(name: impl Into<String>, r#type: EntryType, modified: DateTime<Utc>) -> Self {
		Self {
			name: name.into(),
			r#type,
			description: None,
			summary: None,
			tags: Vec::new(),
			modified,
			size: None,
			file_count: None,
			truncated: false,
			truncated_count: None,
			children: None,
			description_source: None,
			depth_source: None,
			height_source: None,
		}
	}

	pub fn is_directory(&self) -> bool {
		self.r#type == EntryType::Directory
	}

	/// Find an immediate child by name.
	pub fn child(&self, name: &str) -> Option<&Entry> {
		self.children
			.as_deref()
			.and_then(|children| children.iter().find(|child| child.name == name))
	}
}
