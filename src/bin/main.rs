use {
  blockparser::{callbacks, network::NetworkProfile, options::Options, Engine},
  clap::Parser,
  std::process,
};

fn main() {
  env_logger::builder().format_timestamp(None).init();

  if let Err(err) = run() {
    eprintln!("error: {err:#}");
    process::exit(1);
  }
}

fn run() -> anyhow::Result<()> {
  let options = Options::parse();

  if options.callback == "help" {
    println!("registered callbacks:");
    for name in callbacks::registered_names() {
      println!("  {name}");
    }
    return Ok(());
  }

  let mut callback = callbacks::construct(&options.callback)
    .ok_or_else(|| anyhow::anyhow!("unknown callback {:?}; run with `help` to list registered callbacks", options.callback))?;
  callback
    .init(&options.callback_args)
    .map_err(|message| anyhow::anyhow!("callback initialization failed: {message}"))?;

  let profile = resolve_profile(&options)?;
  let data_dir = resolve_data_dir(&options, &profile)?;

  log::info!("starting {} over {}", profile.name, data_dir.display());

  let mut engine = Engine::open(profile, &data_dir)?;
  engine.run(callback.as_mut(), options.height_limit)?;

  Ok(())
}

fn resolve_profile(options: &Options) -> anyhow::Result<NetworkProfile> {
  if let Some(path) = &options.network_config {
    return NetworkProfile::load_from_file(path);
  }
  let name = options
    .chain
    .map(|c| c.builtin_name())
    .unwrap_or("bitcoin");
  NetworkProfile::builtin(name).ok_or_else(|| anyhow::anyhow!("unknown network profile {name:?}"))
}

/// Mirrors `dog`'s `--data-dir` default derivation off `$HOME`
/// (`src/options.rs`): fall back to `~/<profile's data subdir>` and warn
/// if `$HOME` cannot be resolved at all.
fn resolve_data_dir(options: &Options, profile: &NetworkProfile) -> anyhow::Result<std::path::PathBuf> {
  if let Some(dir) = &options.data_dir {
    return Ok(dir.clone());
  }
  match dirs::home_dir() {
    Some(home) => Ok(home.join(&profile.data_subdir_name)),
    None => {
      log::warn!("could not resolve home directory; pass --data-dir explicitly");
      Err(anyhow::anyhow!("no --data-dir given and $HOME is unset"))
    }
  }
}
