use serde::Serialize;

use super::error::parse_or_zero;

/// The subset of `/proc/meminfo` the monitor uses, all in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemorySnapshot {
    pub total_kb: u64,
    pub free_kb: u64,
    pub available_kb: u64,
    pub buffers_kb: u64,
    pub cached_kb: u64,
    pub reclaimable_slab_kb: u64,
    pub shared_kb: u64,
}

impl MemorySnapshot {
    /// Keys that are absent from `content` stay at zero; unknown keys are ignored.
    pub fn parse(content: &str) -> Self {
        let mut snapshot = Self::default();
        for line in content.lines() {
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };
            let (field, slot) = match key {
                "MemTotal" => ("MemTotal", &mut snapshot.total_kb),
                "MemFree" => ("MemFree", &mut snapshot.free_kb),
                "MemAvailable" => ("MemAvailable", &mut snapshot.available_kb),
                "Buffers" => ("Buffers", &mut snapshot.buffers_kb),
                "Cached" => ("Cached", &mut snapshot.cached_kb),
                "SReclaimable" => ("SReclaimable", &mut snapshot.reclaimable_slab_kb),
                "Shmem" => ("Shmem", &mut snapshot.shared_kb),
                _ => continue,
            };
            let value = rest.trim().trim_end_matches("kB");
            *slot = parse_or_zero("meminfo", field, Some(value));
        }
        snapshot
    }

    /// Memory in use, in kB.
    ///
    /// Page cache and reclaimable slab count as free. When that accounting comes out larger
    /// than the total (inconsistent or missing inputs) only `MemFree` is subtracted instead.
    pub fn used_kb(&self) -> u64 {
        let total = self.total_kb as i128;
        let free = self.free_kb as i128;
        let slab = self.reclaimable_slab_kb as i128;

        let cached_adjusted = self.cached_kb as i128 + slab - self.shared_kb as i128;
        let accounted_free = free + cached_adjusted + slab + self.buffers_kb as i128;

        let used = if total >= accounted_free {
            total - accounted_free
        } else {
            total - free
        };
        used.max(0) as u64
    }

    pub fn usage(&self) -> MemoryUsage {
        MemoryUsage {
            used_kb: self.used_kb(),
            total_kb: self.total_kb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    pub used_kb: u64,
    pub total_kb: u64,
}

impl MemoryUsage {
    pub fn ratio(&self) -> f64 {
        if self.total_kb == 0 {
            return 0.0;
        }
        (self.used_kb as f64 / self.total_kb as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:       16314336 kB
MemFree:         1093172 kB
MemAvailable:    9121780 kB
Buffers:          524288 kB
Cached:          7602176 kB
SwapCached:            0 kB
Active:          8123456 kB
Shmem:            412000 kB
SReclaimable:     600000 kB
HugePages_Total:       0
";

    #[test]
    fn parses_consumed_keys_and_ignores_the_rest() {
        let mem = MemorySnapshot::parse(MEMINFO);
        assert_eq!(mem.total_kb, 16_314_336);
        assert_eq!(mem.free_kb, 1_093_172);
        assert_eq!(mem.available_kb, 9_121_780);
        assert_eq!(mem.buffers_kb, 524_288);
        assert_eq!(mem.cached_kb, 7_602_176);
        assert_eq!(mem.shared_kb, 412_000);
        assert_eq!(mem.reclaimable_slab_kb, 600_000);
    }

    #[test]
    fn swap_cached_does_not_shadow_cached() {
        let mem = MemorySnapshot::parse("SwapCached: 99 kB\nCached: 10 kB\n");
        assert_eq!(mem.cached_kb, 10);
    }

    #[test]
    fn absent_keys_stay_zero() {
        let mem = MemorySnapshot::parse("MemTotal: 2048 kB\n");
        assert_eq!(mem.total_kb, 2048);
        assert_eq!(mem.free_kb, 0);
        assert_eq!(mem.shared_kb, 0);
    }

    #[test]
    fn precise_accounting_matches_worked_example() {
        let mem = MemorySnapshot {
            total_kb: 1000,
            free_kb: 100,
            buffers_kb: 50,
            cached_kb: 200,
            reclaimable_slab_kb: 50,
            shared_kb: 20,
            ..MemorySnapshot::default()
        };
        assert_eq!(mem.used_kb(), 570);
    }

    #[test]
    fn falls_back_to_free_when_accounting_exceeds_total() {
        let mem = MemorySnapshot {
            total_kb: 1000,
            free_kb: 300,
            cached_kb: 900,
            ..MemorySnapshot::default()
        };
        assert_eq!(mem.used_kb(), 700);
    }

    #[test]
    fn fallback_never_goes_negative() {
        let mem = MemorySnapshot {
            total_kb: 100,
            free_kb: 400,
            ..MemorySnapshot::default()
        };
        assert_eq!(mem.used_kb(), 0);
    }

    #[test]
    fn usage_ratio_handles_zero_total() {
        let usage = MemorySnapshot::default().usage();
        assert_eq!(usage.ratio(), 0.0);
    }
}
