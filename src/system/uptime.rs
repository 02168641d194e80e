use serde::Serialize;

use super::error::parse_or_zero;

/// `/proc/uptime`: seconds since boot and idle seconds summed over all cores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Uptime {
    pub since_boot_secs: f64,
    pub idle_secs: f64,
}

impl Uptime {
    pub fn parse(content: &str) -> Self {
        let mut fields = content.split_whitespace();
        Self {
            since_boot_secs: parse_or_zero("uptime", "since_boot", fields.next()),
            idle_secs: parse_or_zero("uptime", "idle", fields.next()),
        }
    }

    /// Whole seconds since boot.
    pub fn whole_secs(&self) -> u64 {
        if self.since_boot_secs.is_finite() && self.since_boot_secs > 0.0 {
            self.since_boot_secs as u64
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_values() {
        let up = Uptime::parse("35782.46 271862.11\n");
        assert_eq!(up.whole_secs(), 35782);
        assert!((up.idle_secs - 271_862.11).abs() < 1e-6);
    }

    #[test]
    fn malformed_values_read_as_zero() {
        let up = Uptime::parse("garbage");
        assert_eq!(up.whole_secs(), 0);
        assert_eq!(up.idle_secs, 0.0);
    }
}
