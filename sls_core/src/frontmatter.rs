use std::fs::File;
use std::io::Read;
use std::path::Path;

use markdown::Constructs;
use markdown::ParseOptions;
use markdown::mdast::Node;
use markdown::to_mdast;
use serde_json::Value;
use tracing::debug;
use tracing::trace;

use crate::SlsError;
use crate::SlsResult;
use crate::schema::Schema;

/// Canonical per-directory metadata document.
pub const METADATA_FILE_NAME: &str = "README.md";

/// Files with this suffix carry their own front matter.
pub const METADATA_SUFFIX: &str = ".md";

/// Documents larger than this are never opened for metadata (1 MiB).
pub const MAX_METADATA_FILE_SIZE: u64 = 1024 * 1024;

/// Only this many leading bytes of a document are scanned (64 KiB).
pub const MAX_METADATA_READ_BYTES: u64 = 64 * 1024;

pub(crate) const KEY_DESCRIPTION: &str = "description";
pub(crate) const KEY_SUMMARY: &str = "summary";
pub(crate) const KEY_TAGS: &str = "tags";
pub(crate) const KEY_DEPTH: &str = "sls:depth";
pub(crate) const KEY_HEIGHT: &str = "sls:height";
pub(crate) const KEY_IGNORE: &str = "sls:ignore";
pub(crate) const KEY_SCHEMA: &str = "sls:schema";

/// Metadata recognised in a document's front matter. Every field is
/// optional and validated independently; unrecognised keys are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
	pub description: Option<String>,
	pub summary: Option<String>,
	pub tags: Vec<String>,
	/// `sls:depth`
	pub depth: Option<usize>,
	/// `sls:height`
	pub height: Option<usize>,
	/// `sls:ignore`
	pub ignore: Option<bool>,
	/// `sls:schema`
	pub schema: Option<Schema>,
}

impl FrontMatter {
	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}

	/// Whether the document asks to be hidden from listings.
	pub fn is_ignored(&self) -> bool {
		self.ignore == Some(true)
	}

	fn from_value(value: &Value) -> Self {
		let Value::Object(map) = value else {
			return Self::default();
		};

		Self {
			description: map.get(KEY_DESCRIPTION).and_then(coerce_string),
			summary: map.get(KEY_SUMMARY).and_then(coerce_string),
			tags: map.get(KEY_TAGS).map(coerce_strings).unwrap_or_default(),
			depth: map.get(KEY_DEPTH).and_then(coerce_count),
			height: map.get(KEY_HEIGHT).and_then(coerce_count),
			ignore: map.get(KEY_IGNORE).and_then(coerce_bool),
			schema: map.get(KEY_SCHEMA).and_then(Schema::from_value),
		}
	}
}

/// Read the front matter of the document at `path`.
///
/// Never fails: oversized files, unreadable files and malformed preambles
/// all produce an empty [`FrontMatter`]. Failures are logged at debug level.
pub fn parse_front_matter(path: &Path) -> FrontMatter {
	match read_front_matter(path) {
		Ok(front_matter) => front_matter,
		Err(error) => {
			debug!(path = %path.display(), %error, "ignoring unreadable front matter");
			FrontMatter::default()
		}
	}
}

fn read_front_matter(path: &Path) -> SlsResult<FrontMatter> {
	let file = File::open(path)?;
	let size = file.metadata()?.len();
	if size > MAX_METADATA_FILE_SIZE {
		trace!(path = %path.display(), size, "skipping oversized metadata document");
		return Ok(FrontMatter::default());
	}

	let mut buffer = Vec::with_capacity(size.min(MAX_METADATA_READ_BYTES) as usize);
	file.take(MAX_METADATA_READ_BYTES).read_to_end(&mut buffer)?;
	let content = String::from_utf8_lossy(&buffer);

	let value = extract_front_matter(&content).map_err(|reason| {
		SlsError::Parse {
			path: path.display().to_string(),
			reason,
		}
	})?;

	Ok(value.as_ref().map(FrontMatter::from_value).unwrap_or_default())
}

/// Parse front matter from in-memory document content. Like
/// [`parse_front_matter`], malformed input yields an empty result.
pub fn parse_front_matter_str(content: &str) -> FrontMatter {
	match extract_front_matter(content) {
		Ok(value) => value.as_ref().map(FrontMatter::from_value).unwrap_or_default(),
		Err(reason) => {
			debug!(%reason, "ignoring malformed front matter");
			FrontMatter::default()
		}
	}
}

/// Locate the leading YAML (`---`) or TOML (`+++`) block and decode it.
/// Returns `Ok(None)` when the document has no preamble.
fn extract_front_matter(content: &str) -> Result<Option<Value>, String> {
	let options = ParseOptions {
		constructs: Constructs {
			frontmatter: true,
			..Constructs::gfm()
		},
		..ParseOptions::gfm()
	};
	let mdast = to_mdast(content, &options).map_err(|e| e.to_string())?;
	let Some(first) = mdast.children().and_then(|children| children.first()) else {
		return Ok(None);
	};

	match first {
		Node::Yaml(yaml) => {
			serde_yaml_ng::from_str::<Value>(&yaml.value)
				.map(Some)
				.map_err(|e| e.to_string())
		}
		Node::Toml(toml) => {
			toml::from_str::<Value>(&toml.value)
				.map(Some)
				.map_err(|e| e.to_string())
		}
		_ => Ok(None),
	}
}

/// Scalars become strings; empty strings, nulls and containers are dropped.
pub(crate) fn coerce_string(value: &Value) -> Option<String> {
	let text = match value {
		Value::String(text) => text.clone(),
		Value::Number(number) => number.to_string(),
		Value::Bool(flag) => flag.to_string(),
		_ => return None,
	};

	(!text.is_empty()).then_some(text)
}

pub(crate) fn coerce_strings(value: &Value) -> Vec<String> {
	match value {
		Value::Array(items) => {
			items
				.iter()
				.filter_map(|item| item.as_str().map(ToString::to_string))
				.collect()
		}
		_ => Vec::new(),
	}
}

/// Non-negative finite numbers (or numeric strings), truncated toward zero.
pub(crate) fn coerce_count(value: &Value) -> Option<usize> {
	let number = match value {
		Value::Number(number) => number.as_f64()?,
		Value::String(text) => text.trim().parse::<f64>().ok()?,
		_ => return None,
	};

	(number.is_finite() && number >= 0.0).then(|| number.trunc() as usize)
}

pub(crate) fn coerce_bool(value: &Value) -> Option<bool> {
	match value {
		Value::Bool(flag) => Some(*flag),
		Value::Number(number) => Some(number.as_f64().is_some_and(|n| n != 0.0)),
		Value::String(text) => {
			let falsy = matches!(
				text.trim().to_ascii_lowercase().as_str(),
				"" | "false" | "no" | "off" | "0"
			);
			Some(!falsy)
		}
		_ => None,
	}
}
