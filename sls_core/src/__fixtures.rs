use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::AnyResult;

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> AnyResult<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	fs::write(path, content)?;

	Ok(())
}

pub fn make_dir(root: &Path, relative: &str) -> AnyResult<()> {
	fs::create_dir_all(root.join(relative))?;
	Ok(())
}

/// Wrap a YAML body in `---` fences followed by some markdown.
pub fn yaml_document(yaml: &str) -> String {
	format!("---\n{}\n---\n\n# Heading\n\nBody text.\n", yaml.trim_end())
}

pub const ROOT_README: &str = r#"description: Spectra workspace
sls:schema:
  children:
    - name: guilds
      type: directory
      required: true
      description: Guild collection
      children:
        - pattern: "*"
          type: directory
          description: A guild (root schema)"#;

pub const GUILDS_README: &str = r#"description: All guilds
sls:schema:
  children:
    - pattern: "*"
      type: directory
      description: A guild (guilds schema)
      children:
        - name: agents
          type: directory
          required: true
          description: Agents working in this guild
          children:
            - pattern: "*"
              type: directory
              description: An agent
              sls:height: 2
              children:
                - name: memories
                  type: directory
                  description: Agent memories
                  sls:depth: 0"#;

/// A workspace with a root schema, a nested guild schema and two guilds.
///
/// ```text
/// README.md                      (schema: guilds required)
/// guilds/README.md               (schema: */agents required, */agents/*/memories depth 0)
/// guilds/design-guild/README.md  (local description)
/// guilds/design-guild/agents/alice/README.md
/// guilds/design-guild/agents/alice/notes.md
/// guilds/design-guild/agents/alice/memories/{3 files}
/// guilds/ops-guild/agents/bob/profile.md
/// ```
pub fn spectra_fixture() -> AnyResult<TempDir> {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path();

	write_file(root, "README.md", &yaml_document(ROOT_README))?;
	write_file(root, "guilds/README.md", &yaml_document(GUILDS_README))?;
	write_file(
		root,
		"guilds/design-guild/README.md",
		&yaml_document("description: Visual design and branding guild"),
	)?;
	write_file(
		root,
		"guilds/design-guild/agents/alice/README.md",
		&yaml_document("description: Alice agent\nsummary: Brand designer"),
	)?;
	write_file(
		root,
		"guilds/design-guild/agents/alice/notes.md",
		&yaml_document("description: Working notes"),
	)?;
	for day in ["2026-01-01", "2026-01-02", "2026-01-03"] {
		write_file(
			root,
			&format!("guilds/design-guild/agents/alice/memories/{day}.md"),
			"remembered\n",
		)?;
	}
	write_file(root, "guilds/ops-guild/agents/bob/profile.md", "# Bob\n")?;

	Ok(tmp)
}

/// Path of the `alice` agent directory inside [`spectra_fixture`].
pub fn alice(root: &Path) -> std::path::PathBuf {
	root.join("guilds/design-guild/agents/alice")
}
