use std::fmt::Write;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use owo_colors::OwoColorize;
use serde::Serialize;
use sls_core::Entry;
use sls_core::HeightContext;
use sls_core::MetadataSource;
use sls_core::SlsResult;
use sls_core::ValidationResult;
use sls_core::ValidationSummary;

/// Outer width of the height box, borders included.
pub const HEIGHT_BOX_WIDTH: usize = 55;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

pub fn set_color_enabled(enabled: bool) {
	USE_COLOR.store(enabled, Ordering::Relaxed);
}

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,cyan) => {
		if color_enabled() {
			format!("{}", $text.cyan())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

#[derive(Serialize)]
struct ListOutput<'a> {
	#[serde(skip_serializing_if = "Option::is_none")]
	height: Option<&'a HeightContext>,
	entry: &'a Entry,
}

/// Machine-readable listing: `{"height": ..., "entry": ...}`.
pub fn format_json(entry: &Entry, height: Option<&HeightContext>) -> SlsResult<String> {
	let output = ListOutput { height, entry };
	let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::from)?;
	Ok(json)
}

pub fn format_validation_json(summary: &ValidationSummary) -> SlsResult<String> {
	let json = serde_json::to_string_pretty(summary).map_err(std::io::Error::from)?;
	Ok(json)
}

/// `path` relative to `base`, or the full path when it lies elsewhere.
fn display_relative(path: &Path, base: &Path) -> String {
	match path.strip_prefix(base) {
		Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
		Ok(relative) => relative.display().to_string(),
		Err(_) => path.display().to_string(),
	}
}

fn source_label(source: &MetadataSource, base: &Path) -> String {
	match source {
		MetadataSource::Local => "[local]".to_string(),
		MetadataSource::Schema { path } => format!("[schema: {}]", display_relative(path, base)),
		MetadataSource::Default => "[default]".to_string(),
	}
}

/// Boxed list of the ancestors above the queried entry.
pub fn format_height_box(height: &HeightContext) -> String {
	let inner = HEIGHT_BOX_WIDTH - 3;
	let mut lines = vec![
		format!("╭─ Height {}╮", "─".repeat(HEIGHT_BOX_WIDTH - 10)),
		format!("│ {:<inner$}│", height.path),
		format!("│{}│", " ".repeat(HEIGHT_BOX_WIDTH - 1)),
	];

	for ancestor in &height.ancestors {
		let description = ancestor.description.as_deref().unwrap_or("(no description)");
		let mut line = format!("{}: {description}", ancestor.name);
		if line.chars().count() > HEIGHT_BOX_WIDTH - 4 {
			line = line.chars().take(HEIGHT_BOX_WIDTH - 7).collect();
			line.push_str("...");
		}
		lines.push(format!("│ {line:<inner$}│"));
	}

	lines.push(format!("╰{}╯", "─".repeat(HEIGHT_BOX_WIDTH - 1)));
	lines.join("\n")
}

/// Human-readable tree. Schema paths in audit annotations are shown
/// relative to `base`.
pub fn format_tree(
	entry: &Entry,
	height: Option<&HeightContext>,
	audit: bool,
	base: &Path,
) -> String {
	let mut output = String::new();
	if let Some(height) = height {
		output.push_str(&format_height_box(height));
		output.push_str("\n\n");
	}

	let _ = writeln!(output, "{}{}", colored!(label(entry), bold), count_suffix(entry));
	let details = details(entry, audit, base);
	for detail in &details {
		let _ = writeln!(output, "│ {detail}");
	}
	if !details.is_empty() && entry.children.as_ref().is_some_and(|c| !c.is_empty()) {
		output.push_str("│\n");
	}

	write_children(&mut output, entry, "", audit, base);
	output.trim_end().to_string()
}

fn write_children(output: &mut String, entry: &Entry, prefix: &str, audit: bool, base: &Path) {
	let Some(children) = entry.children.as_deref() else {
		return;
	};

	for (index, child) in children.iter().enumerate() {
		let is_last = index + 1 == children.len();
		let connector = if is_last { "└─" } else { "├─" };
		let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });

		let name = if child.is_directory() {
			colored!(label(child), bold)
		} else {
			label(child)
		};
		let _ = writeln!(output, "{prefix}{connector} {name}{}", count_suffix(child));

		for (position, detail) in details(child, audit, base).iter().enumerate() {
			let marker = if position == 0 { "└─ " } else { "   " };
			let _ = writeln!(output, "{child_prefix}{marker}{}", colored!(detail, dimmed));
		}

		write_children(output, child, &child_prefix, audit, base);
	}
}

fn label(entry: &Entry) -> String {
	if entry.is_directory() {
		format!("{}/", entry.name)
	} else {
		entry.name.clone()
	}
}

fn count_suffix(entry: &Entry) -> String {
	if let Some(count) = entry.file_count {
		return format!(" ({count} items)");
	}

	if entry.truncated {
		let more = entry.truncated_count.unwrap_or(0);
		return format!(" ({more} more, truncated)");
	}

	String::new()
}

/// Description, summary, tags and, in audit mode, provenance lines.
fn details(entry: &Entry, audit: bool, base: &Path) -> Vec<String> {
	let mut lines = Vec::new();
	let source = |origin: Option<&MetadataSource>| {
		origin
			.filter(|_| audit)
			.map(|origin| format!(" {}", colored!(source_label(origin, base), cyan)))
			.unwrap_or_default()
	};

	if let Some(description) = &entry.description {
		lines.push(format!(
			"{description}{}",
			source(entry.description_source.as_ref())
		));
	}
	if let Some(summary) = &entry.summary {
		lines.push(format!("Summary: {summary}"));
	}
	if !entry.tags.is_empty() {
		lines.push(format!("Tags: {}", entry.tags.join(", ")));
	}

	if audit {
		let depth = entry
			.depth_source
			.as_ref()
			.filter(|source| **source != MetadataSource::Default);
		if depth.is_some() {
			lines.push(format!("depth{}", source(depth)));
		}
		if entry.height_source.is_some() {
			lines.push(format!("height{}", source(entry.height_source.as_ref())));
		}
	}

	lines
}

/// Validation report grouped by the schema document declaring each check.
pub fn format_validation(summary: &ValidationSummary, base: &Path) -> String {
	let mut groups: Vec<(&Path, Vec<&ValidationResult>)> = Vec::new();
	for result in &summary.results {
		match groups
			.iter_mut()
			.find(|(schema_path, _)| *schema_path == result.schema_path.as_path())
		{
			Some((_, results)) => results.push(result),
			None => groups.push((result.schema_path.as_path(), vec![result])),
		}
	}

	let mut lines = Vec::new();
	for (schema_path, results) in groups {
		lines.push(format!(
			"Checking schema from: {}",
			display_relative(schema_path, base)
		));

		for result in results {
			let status = if result.exists {
				colored!("✓", green)
			} else {
				colored!("✗", red)
			};
			let action = if result.exists { "exists" } else { "missing" };
			let suffix = if result.required { " (required)" } else { "" };
			lines.push(format!(
				"  {status} {} {action}{suffix}",
				display_relative(&result.path, base)
			));
		}

		lines.push(String::new());
	}

	let status = if summary.is_ok() {
		colored!("passed", green)
	} else {
		colored!("failed", red)
	};
	lines.push(format!(
		"Validation {status}: {} checks, {} errors",
		summary.results.len(),
		summary.failed
	));

	lines.join("\n")
}
