use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use wikisync_core::WikiNode;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Render card-game design data into wiki pages and publish them to Wiki.js.",
	long_about = "wikisync walks a tree of `contents.json` index files, renders every data file \
	              through its template and saves or publishes the result.\n\nQuick start:\n  \
	              wikisync index                 Print the content tree\n  wikisync render \
	              --all          Render every page into tmp/\n  wikisync upload --filter aP  \
	              Publish matching pages\n  wikisync sync                  Split design data \
	              into per-card files"
)]
pub struct WikiSyncCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Locale sub-directory of the data directory, overriding the config.
	#[arg(long, short, global = true)]
	pub locale: Option<String>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Build the content tree and print it with each node's template.
	Index,
	/// Render the selected pages and save them under the tmp directory.
	///
	/// Output paths mirror the data files' paths inside the data directory,
	/// with the extension of the template that rendered them.
	Render {
		#[command(flatten)]
		selection: Selection,
	},
	/// Render the selected pages and publish them to the wiki.
	///
	/// Pages are created when the wiki has none at their path and updated
	/// otherwise. The wiki is read from `WIKI_URL` (or `[wiki] url` in the
	/// config) and authenticated with `WIKI_API_TOKEN`; both may be set in a
	/// `.env` file at the project root.
	Upload {
		#[command(flatten)]
		selection: Selection,

		/// Publish without saving the rendered files.
		#[arg(long, default_value_t = false)]
		no_save: bool,
	},
	/// Split the registered design-data card files into per-card data files
	/// and regenerate the index files of their directories.
	Sync,
}

/// Which renderable nodes a command processes. Nothing is selected unless
/// `--filter` or `--all` is given.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
	/// Select nodes whose name or data file path contains this text. May be
	/// repeated.
	#[arg(long, short)]
	pub filter: Vec<String>,

	/// Select every renderable node.
	#[arg(long, default_value_t = false, conflicts_with = "filter")]
	pub all: bool,
}

impl Selection {
	pub fn is_empty(&self) -> bool {
		!self.all && self.filter.is_empty()
	}

	pub fn matches(&self, node: &WikiNode) -> bool {
		if self.all {
			return true;
		}

		let data_path = node
			.data_path()
			.map(|path| path.to_string_lossy().into_owned());
		self.filter.iter().any(|needle| {
			node.name.contains(needle.as_str())
				|| data_path
					.as_deref()
					.is_some_and(|path| path.contains(needle.as_str()))
		})
	}
}
