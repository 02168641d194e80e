use std::fs::{self, File};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

/// Level for a configured name, falling back to `INFO` for anything unrecognised.
pub fn parse_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::INFO)
}

/// Route tracing output to `path`.
///
/// The terminal belongs to the UI, so nothing is logged unless a file is configured.
/// At `DEBUG` and below, span close events are recorded too.
pub fn init_file_logging(path: &Path, level: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::options().create(true).append(true).open(path)?;
    let level = parse_level(level);

    let span_events = if level >= Level::DEBUG {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_span_events(span_events)
        .with_max_level(level)
        .with_writer(Mutex::new(file))
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eyre!("failed to set tracing subscriber: {e}"))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level(" trace "), Level::TRACE);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("chatty"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn parent_dir_is_created() {
        let dir = std::env::temp_dir().join(format!("ticktop-log-{}", std::process::id()));
        let path = dir.join("nested").join("ticktop.log");
        ensure_parent_dir(&path).unwrap();
        assert!(dir.join("nested").is_dir());
        let _ = fs::remove_dir_all(&dir);
    }
}
