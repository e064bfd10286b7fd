#![allow(dead_code)]

use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;
use sls_core::AnyResult;
use tempfile::TempDir;

pub fn sls_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("sls"));
	cmd.env("NO_COLOR", "1")
		.env_remove("SLS_ROOT")
		.env_remove("RUST_LOG");
	cmd
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> AnyResult<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)?;

	Ok(())
}

/// A small schema-governed workspace: a root schema requiring `guilds`, and
/// a guild schema requiring `agents` with zero-depth `memories` and a
/// height of two for each agent.
pub fn workspace() -> AnyResult<TempDir> {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path();

	write_file(
		root,
		"README.md",
		"---\ndescription: Spectra workspace\nsls:schema:\n  children:\n    - name: guilds\n      \
		 type: directory\n      required: true\n---\n",
	)?;
	write_file(
		root,
		"guilds/README.md",
		"---\ndescription: All guilds\nsls:schema:\n  children:\n    - pattern: '*'\n      type: \
		 directory\n      children:\n        - name: agents\n          type: directory\n          \
		 required: true\n          description: Agents working in this guild\n          \
		 children:\n            - pattern: '*'\n              type: directory\n              \
		 sls:height: 2\n              children:\n                - name: memories\n                  \
		 description: Agent memories\n                  sls:depth: 0\n---\n",
	)?;
	write_file(
		root,
		"guilds/design-guild/README.md",
		"---\ndescription: Visual design and branding guild\n---\n",
	)?;
	write_file(
		root,
		"guilds/design-guild/agents/alice/README.md",
		"---\ndescription: Alice agent\n---\n",
	)?;
	write_file(
		root,
		"guilds/design-guild/agents/alice/notes.md",
		"---\ndescription: Working notes\n---\n",
	)?;
	for day in ["01", "02", "03"] {
		write_file(
			root,
			&format!("guilds/design-guild/agents/alice/memories/2026-01-{day}.md"),
			"remembered\n",
		)?;
	}

	Ok(tmp)
}

pub fn alice(root: &Path) -> PathBuf {
	root.join("guilds/design-guild/agents/alice")
}
