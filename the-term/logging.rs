use std::path::Path;

use eyre::{
  Result,
  WrapErr,
};
use log::LevelFilter;

/// Route `log` records to `path`. The terminal belongs to the UI, so nothing
/// is written to stdout or stderr.
///
/// The dispatch itself passes every level; `level` is applied through the
/// global max level so [`set_level`] can change it once the config is read.
pub fn setup_logging(path: &Path, level: LevelFilter) -> Result<()> {
  let file = fern::log_file(path)
    .wrap_err_with(|| format!("failed to open log file '{}'", path.display()))?;

  fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} {} [{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.target(),
        record.level(),
        message
      ))
    })
    .level(LevelFilter::Trace)
    .level_for("hyper", LevelFilter::Warn)
    .level_for("hyper_util", LevelFilter::Warn)
    .level_for("reqwest", LevelFilter::Warn)
    .level_for("rustls", LevelFilter::Warn)
    .chain(file)
    .apply()
    .wrap_err("failed to install logger")?;

  set_level(level);
  Ok(())
}

pub fn set_level(level: LevelFilter) {
  log::set_max_level(level);
}
