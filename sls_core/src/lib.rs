//! `sls_core` is the core library for `sls`, a semantic directory listing
//! tool. It resolves the human- and agent-authored metadata attached to a
//! directory tree (descriptions, depth and height hints, ignore rules and
//! structural schemas) and produces a typed, annotated entry tree.
//!
//! ## Resolution Pipeline
//!
//! ```text
//! Query path
//!   → Ignore filter (default exclusions + cascading .slsignore/.gitignore)
//!   → Front matter (README.md / *.md preamble: description, sls:depth, ...)
//!   → Schema resolver (ancestor sls:schema declarations, root-first)
//!   → Traversal (depth ceilings, rollups, symlink-loop protection, sorting)
//!   → Entry tree (+ optional height context)
//! ```
//!
//! ## Modules
//!
//! - [`frontmatter`]: Bounded front matter extraction from metadata documents.
//! - [`ignore_filter`]: Gitignore-syntax exclusion matchers per directory.
//! - [`schema`]: Schema declarations, child matching and default resolution.
//! - [`height`]: Ancestor context ("height") for a queried entry.
//! - [`traverse`]: The top-down walk producing [`Entry`] trees.
//! - [`validate`]: Checks that required schema children exist.
//! - [`config`]: Optional `sls.toml` configuration.
//! - [`root`]: Upward discovery of the schema root.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use sls_core::TraverseOptions;
//! use sls_core::build_height_context;
//! use sls_core::resolve_height;
//! use sls_core::traverse;
//!
//! let root = Path::new("/srv/spectra");
//! let target = root.join("guilds/design-guild/agents/alice");
//! let options = TraverseOptions {
//! 	root: Some(root.to_path_buf()),
//! 	..TraverseOptions::default()
//! };
//!
//! let entry = traverse(&target, &options)?;
//! let levels = resolve_height(&target, Some(root));
//! let height = build_height_context(&target, levels, Some(root));
//! println!("{} ({:?})", entry.name, height.map(|h| h.path));
//! # Ok::<(), sls_core::SlsError>(())
//! ```

pub use config::*;
pub use entry::*;
pub use error::*;
pub use frontmatter::*;
pub use height::*;
pub use ignore_filter::*;
pub use root::*;
pub use schema::*;
pub use traverse::*;
pub use validate::*;

pub mod config;
mod entry;
#[allow(unused_assignments)]
mod error;
pub mod frontmatter;
pub mod height;
pub mod ignore_filter;
pub mod paths;
pub mod root;
pub mod schema;
pub mod traverse;
pub mod validate;

#[cfg(test)]
mod __fixtures;
