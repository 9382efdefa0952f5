// Logging setup - the terminal belongs to the TUI, so logs go to a rolling file

use crate::config::LoggingConfig;
use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Keep the returned guard alive for the whole
/// run or buffered lines are lost on exit.
pub fn init_logging(config: &LoggingConfig, dev: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.directory)?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(&config.directory, "openump.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG wins over the config file
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    // Dev mode mirrors everything to stderr as well
    let stderr_layer = dev.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(guard)
}

/// Sends stderr to /dev/null while alive so ALSA chatter can't scribble over
/// the TUI. The original stderr comes back on drop.
#[cfg(unix)]
pub struct StderrRedirect {
    saved_fd: libc::c_int,
}

#[cfg(unix)]
impl StderrRedirect {
    pub fn to_null() -> Result<Self> {
        unsafe {
            let null_fd = libc::open(
                b"/dev/null\0".as_ptr() as *const libc::c_char,
                libc::O_WRONLY,
            );
            if null_fd == -1 {
                return Err(anyhow::anyhow!("Failed to open /dev/null"));
            }

            let saved_fd = libc::dup(libc::STDERR_FILENO);
            if saved_fd == -1 {
                libc::close(null_fd);
                return Err(anyhow::anyhow!("Failed to backup stderr"));
            }

            if libc::dup2(null_fd, libc::STDERR_FILENO) == -1 {
                libc::close(null_fd);
                libc::close(saved_fd);
                return Err(anyhow::anyhow!("Failed to redirect stderr"));
            }

            libc::close(null_fd);
            Ok(Self { saved_fd })
        }
    }
}

#[cfg(unix)]
impl Drop for StderrRedirect {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.saved_fd, libc::STDERR_FILENO);
            libc::close(self.saved_fd);
        }
    }
}
