//! Command-line surface, grounded on `dog`'s `Options` (`src/options.rs`):
//! a flat `clap::Parser` struct of `Option<T>` fields with `--long` flags and
//! per-field `help` strings, rather than a subcommand tree.

use {clap::Parser, std::path::PathBuf};

#[derive(Clone, Debug, Parser)]
#[command(name = "blockparser", version, about = "Parse and chain-assemble block-file data directories")]
pub struct Options {
  /// Name of the analysis callback to run. `help` lists every registered
  /// name and exits.
  #[arg(default_value = "help")]
  pub callback: String,

  /// Extra arguments forwarded to the callback's `init`.
  #[arg(trailing_var_arg = true)]
  pub callback_args: Vec<String>,

  #[arg(long, value_enum, help = "Use <CHAIN>. [default: bitcoin]")]
  pub chain: Option<ChainArgument>,

  #[arg(long, help = "Load a custom network profile from <NETWORK_CONFIG> (JSON).")]
  pub network_config: Option<PathBuf>,

  #[arg(long, alias = "datadir", help = "Read block files from <DATA_DIR>. [default: ~/<chain's subdir>]")]
  pub data_dir: Option<PathBuf>,

  #[arg(long, help = "Stop after <HEIGHT_LIMIT> main-chain blocks.")]
  pub height_limit: Option<u32>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ChainArgument {
  Bitcoin,
  Litecoin,
  Dogecoin,
  Darkcoin,
}

impl ChainArgument {
  pub fn builtin_name(self) -> &'static str {
    match self {
      ChainArgument::Bitcoin => "bitcoin",
      ChainArgument::Litecoin => "litecoin",
      ChainArgument::Dogecoin => "dogecoin",
      ChainArgument::Darkcoin => "darkcoin",
    }
  }
}
