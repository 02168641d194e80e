use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn page_size_bytes() -> Option<u64> {
        None
    }
}
