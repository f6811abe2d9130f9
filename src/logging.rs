use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialise logging. Without debug the level is fixed at `info`; with
/// debug it defaults to `debug` and `RUST_LOG` may override it.
///
/// The terminal belongs to the UI, so output goes to `log_file` when one is
/// given and is discarded otherwise.
pub fn init(debug: bool, log_file: Option<&Path>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    let _ = match log_file.and_then(split_log_path) {
        Some((dir, name)) => builder
            .with_writer(tracing_appender::rolling::never(dir, name))
            .try_init(),
        None => builder.with_writer(std::io::sink).try_init(),
    };
}

fn split_log_path(path: &Path) -> Option<(&Path, &std::ffi::OsStr)> {
    let name = path.file_name()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Some((dir, name))
}
