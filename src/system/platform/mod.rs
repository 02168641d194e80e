use std::sync::OnceLock;

/// Page size assumed when the platform cannot report one.
const DEFAULT_PAGE_SIZE_BYTES: u64 = 4096;

pub trait PlatformExtensions {
    fn page_size_bytes() -> Option<u64>;
}

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod other;

#[cfg(unix)]
use unix as platform_impl;
#[cfg(not(unix))]
use other as platform_impl;

/// Memory page size in kB, queried once per process.
pub fn page_size_kb() -> f64 {
    static PAGE_SIZE_KB: OnceLock<f64> = OnceLock::new();
    *PAGE_SIZE_KB.get_or_init(|| {
        let bytes = platform_impl::Platform::page_size_bytes().unwrap_or_else(|| {
            tracing::warn!(
                "page size unavailable, assuming {} bytes",
                DEFAULT_PAGE_SIZE_BYTES
            );
            DEFAULT_PAGE_SIZE_BYTES
        });
        bytes as f64 / 1024.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_positive_and_stable() {
        let first = page_size_kb();
        assert!(first > 0.0);
        assert_eq!(first, page_size_kb());
    }
}
