use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wikisync_cli::Commands;
use wikisync_cli::Selection;
use wikisync_cli::WikiSyncCli;
use wikisync_core::AnyEmptyResult;
use wikisync_core::AnyResult;
use wikisync_core::HtmlPreRenderer;
use wikisync_core::PreRenderer;
use wikisync_core::UploadReport;
use wikisync_core::WikiConfig;
use wikisync_core::WikiIndexer;
use wikisync_core::WikiNode;
use wikisync_core::WikiPaths;
use wikisync_core::WikiSynchronizer;
use wikisync_core::WikiUploader;
use wikisync_graphql::WikiJsClient;

fn main() {
	let args = WikiSyncCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	init_tracing(args.verbose, use_color);

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Index) => run_index(&args),
		Some(Commands::Render { selection }) => run_render(&args, selection),
		Some(Commands::Upload { selection, no_save }) => run_upload(&args, selection, *no_save),
		Some(Commands::Sync) => run_sync(&args),
		None => {
			eprintln!("No subcommand specified. Run `wikisync --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<wikisync_core::WikiError>() {
			Ok(wiki_err) => {
				let report: miette::Report = (*wiki_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("error: {e}");
			}
		}
		process::exit(2);
	}
}

fn init_tracing(verbose: bool, use_color: bool) {
	let default_filter = if verbose {
		"wikisync=debug"
	} else {
		"wikisync=info"
	};

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_ansi(use_color),
		)
		.init();
}

fn resolve_root(args: &WikiSyncCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_project(args: &WikiSyncCli) -> AnyResult<(WikiPaths, WikiConfig)> {
	let root = resolve_root(args);
	let mut config = WikiConfig::load_or_default(&root)?;
	if let Some(locale) = &args.locale {
		config.locale.clone_from(locale);
	}
	let paths = WikiPaths::from_config(root, &config);
	Ok((paths, config))
}

fn run_index(args: &WikiSyncCli) -> AnyEmptyResult {
	let (paths, config) = load_project(args)?;
	let mut indexer = WikiIndexer::new(&paths, &config);
	indexer.build_index()?;

	let tree = indexer.tree()?;
	for id in tree.pre_order() {
		let node = tree.get(id);
		let depth = tree.ancestors(id).count();
		let suffix = if node.is_directory() { "/" } else { "" };
		let template = node
			.template_path()
			.and_then(Path::file_name)
			.map_or_else(String::new, |name| format!(" ({})", name.to_string_lossy()));
		println!("{}{}{suffix}{template}", "  ".repeat(depth), node.name);
	}

	let renderable = indexer.get_all_documents()?.len();
	println!("\n{} node(s), {renderable} renderable", tree.len());

	Ok(())
}

fn run_render(args: &WikiSyncCli, selection: &Selection) -> AnyEmptyResult {
	let (paths, config) = load_project(args)?;
	let root = paths.root.clone();
	let mut uploader = WikiUploader::new(paths, &config, Some(pre_renderer(&config)))?;

	let report = upload_selection(&mut uploader, selection, true, false)?;
	print_report(&report, &root);

	Ok(())
}

fn run_upload(args: &WikiSyncCli, selection: &Selection, no_save: bool) -> AnyEmptyResult {
	let (paths, config) = load_project(args)?;
	if paths.env_file.is_file() {
		dotenvy::from_path(&paths.env_file)?;
	}

	let client = WikiJsClient::from_env(config.wiki.url.as_deref())?;
	let root = paths.root.clone();
	let mut uploader = WikiUploader::new(paths, &config, Some(pre_renderer(&config)))?
		.with_client(Box::new(client));

	let report = upload_selection(&mut uploader, selection, !no_save, true)?;
	print_report(&report, &root);
	println!("Uploaded {} page(s)", report.uploaded);

	Ok(())
}

fn run_sync(args: &WikiSyncCli) -> AnyEmptyResult {
	let (paths, config) = load_project(args)?;
	let synchronizer = WikiSynchronizer::new(&paths, &config)?;
	let written = synchronizer.sync()?;

	println!(
		"Synchronized {written} card file(s) into {}",
		make_relative(synchronizer.target_dir(), &paths.root)
	);

	Ok(())
}

fn pre_renderer(config: &WikiConfig) -> Box<dyn PreRenderer> {
	Box::new(HtmlPreRenderer::new(config.render.image_base_path.clone()))
}

fn upload_selection(
	uploader: &mut WikiUploader,
	selection: &Selection,
	is_save: bool,
	is_upload: bool,
) -> AnyResult<UploadReport> {
	if selection.is_empty() {
		println!("No pages selected. Pass `--filter <text>` or `--all`.");
	}

	let filter = |node: &WikiNode| selection.matches(node);
	Ok(uploader.upload(is_save, is_upload, Some(&filter))?)
}

fn print_report(report: &UploadReport, root: &Path) {
	for file in &report.saved_files {
		println!("  {}", make_relative(file, root));
	}
	println!(
		"Rendered {} of {} page(s), saved {}",
		report.processed, report.total, report.saved
	);
}

fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
