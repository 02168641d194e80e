use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading or parsing kernel counter sources.
///
/// Only [`SampleError::ProcessListing`] fails a whole tick; the other variants are
/// reported per metric or per field and the tick carries on without them.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("failed to read {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {field} in {record}: {value:?}")]
    MalformedField {
        record: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("failed to list processes under {}: {source}", path.display())]
    ProcessListing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse one numeric field, substituting zero and logging when it is absent or malformed.
pub(crate) fn parse_or_zero<T>(record: &'static str, field: &'static str, raw: Option<&str>) -> T
where
    T: std::str::FromStr + Default,
{
    let Some(raw) = raw else {
        tracing::warn!(record, field, "missing field, using 0");
        return T::default();
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            let err = SampleError::MalformedField {
                record,
                field,
                value: raw.to_string(),
            };
            tracing::warn!("{err}, using 0");
            T::default()
        }
    }
}
