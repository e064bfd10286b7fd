use std::io::IsTerminal;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use sls_cli::OutputMode;
use sls_cli::ROOT_ENV_VAR;
use sls_cli::SlsCli;
use sls_cli::check_depth;
use sls_cli::format_json;
use sls_cli::format_tree;
use sls_cli::format_validation;
use sls_cli::format_validation_json;
use sls_cli::set_color_enabled;
use sls_core::SlsConfig;
use sls_core::SlsError;
use sls_core::SlsResult;
use sls_core::TraverseOptions;
use sls_core::build_height_context;
use sls_core::discover_root;
use sls_core::paths::normalize_path;
use sls_core::resolve_height;
use sls_core::traverse;
use sls_core::validate;
use supports_color::Stream;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
	let args = SlsCli::parse();
	init_tracing(args.debug);

	// Respect NO_COLOR env var and --no-color flag.
	let allow_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	set_color_enabled(allow_color && supports_color::on(Stream::Stdout).is_some());

	let report_color = allow_color && supports_color::on(Stream::Stderr).is_some();
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(report_color)
				.unicode(report_color)
				.build(),
		)
	}))
	.ok();

	let mode = args.output_mode(std::io::stdout().is_terminal());
	if let Err(error) = run(&args, mode) {
		let code = error.exit_code();
		match mode {
			OutputMode::Json => {
				match serde_json::to_string_pretty(&error.envelope()) {
					Ok(json) => eprintln!("{json}"),
					Err(_) => eprintln!("{error}"),
				}
			}
			OutputMode::Human => {
				let report: miette::Report = error.into();
				eprintln!("{report:?}");
			}
		}
		process::exit(code);
	}
}

/// `--debug` forces debug output; otherwise `RUST_LOG` applies with a `warn`
/// default.
fn init_tracing(debug: bool) {
	let filter = if debug {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.init();
}

fn run(args: &SlsCli, mode: OutputMode) -> SlsResult<()> {
	let path = resolve_target(&args.path)?;
	let max_depth = args.depth()?;
	let filter = args.name_filter()?;
	let root = resolve_root(args.root.as_deref(), &path)?;
	debug!(path = %path.display(), root = ?root, "resolved query");

	let base = root.clone().unwrap_or_else(|| query_dir(&path));
	let config = SlsConfig::load(&base)?;
	let config_depth = config
		.as_ref()
		.and_then(|config| config.depth)
		.map(|depth| check_depth(i64::try_from(depth).unwrap_or(i64::MAX)))
		.transpose()?;

	if args.validate {
		return run_validate(&path, root.as_deref(), &base, mode);
	}

	let options = TraverseOptions {
		root: root.clone(),
		max_depth: max_depth.or(config_depth),
		all: args.all,
		audit: args.audit,
		filter,
		..TraverseOptions::from_config(config.as_ref())
	};

	let entry = traverse(&path, &options)?;
	let height = if args.no_height {
		None
	} else {
		let levels = resolve_height(&path, root.as_deref());
		build_height_context(&path, levels, root.as_deref())
	};

	let output = match mode {
		OutputMode::Json => format_json(&entry, height.as_ref())?,
		OutputMode::Human => format_tree(&entry, height.as_ref(), args.audit, &base),
	};
	println!("{output}");

	Ok(())
}

fn run_validate(path: &Path, root: Option<&Path>, base: &Path, mode: OutputMode) -> SlsResult<()> {
	let summary = validate(path, root);
	match mode {
		OutputMode::Json => println!("{}", format_validation_json(&summary)?),
		OutputMode::Human => {
			println!("Validating {}...\n", path.display());
			println!("{}", format_validation(&summary, base));
		}
	}

	if summary.is_ok() {
		return Ok(());
	}

	Err(SlsError::ValidationFailed {
		failed: summary.failed,
		checks: summary.results.len(),
	})
}

/// Make the query path absolute and canonical. Missing paths are
/// `InvalidPath`.
fn resolve_target(path: &Path) -> SlsResult<PathBuf> {
	let absolute = normalize_path(path);
	if !absolute.exists() {
		return Err(SlsError::InvalidPath {
			path: path.display().to_string(),
			reason: "path does not exist".to_string(),
		});
	}

	Ok(absolute.canonicalize()?)
}

/// `--root`, then `$SLS_ROOT`, then the nearest schema-declaring ancestor.
fn resolve_root(flag: Option<&Path>, path: &Path) -> SlsResult<Option<PathBuf>> {
	if let Some(root) = flag {
		let absolute = normalize_path(root);
		if !absolute.is_dir() {
			return Err(SlsError::InvalidPath {
				path: root.display().to_string(),
				reason: "root must be an existing directory".to_string(),
			});
		}

		return Ok(Some(absolute.canonicalize()?));
	}

	if let Some(value) = std::env::var_os(ROOT_ENV_VAR) {
		let absolute = normalize_path(Path::new(&value));
		match absolute.canonicalize() {
			Ok(root) if root.is_dir() => return Ok(Some(root)),
			_ => debug!(root = %absolute.display(), "ignoring {ROOT_ENV_VAR}: not a directory"),
		}
	}

	Ok(discover_root(path))
}

fn query_dir(path: &Path) -> PathBuf {
	if path.is_dir() {
		return path.to_path_buf();
	}

	path.parent()
		.map_or_else(|| path.to_path_buf(), Path::to_path_buf)
}
