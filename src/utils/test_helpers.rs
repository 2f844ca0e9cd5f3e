use std::path::Path;
use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Installs a test-writer tracing subscriber once per process.
///
/// Filtering follows `RUST_LOG`; without it only warnings from this crate
/// show up in failing test output.
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("workshop_cleaner=warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Writes a `project.json` into `folder`, creating the folder if needed.
pub fn write_project_file(
    folder: &Path,
    title: &str,
    kind: &str,
    workshop_id: &str,
) -> std::io::Result<()> {
    std::fs::create_dir_all(folder)?;
    let body = serde_json::json!({
        "title": title,
        "type": kind,
        "workshopid": workshop_id,
    });
    std::fs::write(folder.join("project.json"), body.to_string())
}

/// Permission-based tests are meaningless for root, which bypasses them.
#[cfg(test)]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
