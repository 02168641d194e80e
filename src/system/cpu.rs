//! CPU counters from `/proc/stat` and the utilization derived from two samples of them.

use serde::Serialize;

use super::error::parse_or_zero;

/// Cumulative ticks spent in each CPU state since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub io_wait: u64,
    pub irq: u64,
    pub soft_irq: u64,
    pub steal: u64,
    pub guest: u64,
    pub guest_nice: u64,
}

impl CpuTimes {
    /// Idle time, with I/O wait counted as idle. `None` if the sum overflows.
    pub fn idle_ticks(&self) -> Option<u64> {
        self.idle.checked_add(self.io_wait)
    }

    /// Busy time. Guest ticks are already part of `user`, so they are left out.
    pub fn non_idle_ticks(&self) -> Option<u64> {
        [self.nice, self.system, self.irq, self.soft_irq, self.steal]
            .into_iter()
            .try_fold(self.user, u64::checked_add)
    }

    pub fn total_ticks(&self) -> Option<u64> {
        self.idle_ticks()?.checked_add(self.non_idle_ticks()?)
    }

    /// True when no accounted counter is lower than in `earlier`.
    fn follows(&self, earlier: &CpuTimes) -> bool {
        self.accounted()
            .into_iter()
            .zip(earlier.accounted())
            .all(|(now, before)| now >= before)
    }

    fn accounted(&self) -> [u64; 8] {
        [
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.io_wait,
            self.irq,
            self.soft_irq,
            self.steal,
        ]
    }
}

/// Tick deltas between two samples of the same CPU row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuDelta {
    pub total: f64,
    pub idle: f64,
}

impl CpuDelta {
    pub fn percent(&self) -> f64 {
        (self.total - self.idle) / self.total * 100.0
    }
}

/// Compute the elapsed total and idle ticks between `prev` and `curr`.
///
/// Returns `None` when any counter went backwards (reboot or rollover) or a tick sum
/// overflows. A zero total delta is replaced by 1 so the percentage reads 0 instead of
/// dividing by zero.
pub fn usage_delta(prev: &CpuTimes, curr: &CpuTimes) -> Option<CpuDelta> {
    if !curr.follows(prev) {
        return None;
    }
    let idle = curr.idle_ticks()?.checked_sub(prev.idle_ticks()?)?;
    let non_idle = curr.non_idle_ticks()?.checked_sub(prev.non_idle_ticks()?)?;

    let mut total = idle.checked_add(non_idle)? as f64;
    if total == 0.0 {
        total = 1.0;
    }

    Some(CpuDelta {
        total,
        idle: idle as f64,
    })
}

pub fn usage_percent(prev: &CpuTimes, curr: &CpuTimes) -> Option<f64> {
    usage_delta(prev, curr).map(|delta| delta.percent())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuRow {
    pub label: String,
    pub times: CpuTimes,
}

/// Every `cpu*` row of one `/proc/stat` read, in kernel order: aggregate first, then cores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuCounterSnapshot {
    rows: Vec<CpuRow>,
}

impl CpuCounterSnapshot {
    pub fn parse(content: &str) -> Self {
        let rows = content
            .lines()
            .filter(|line| line.starts_with("cpu"))
            .map(parse_row)
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[CpuRow] {
        &self.rows
    }

    pub fn aggregate(&self) -> Option<&CpuRow> {
        self.rows.first()
    }

    pub fn cores(&self) -> &[CpuRow] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Number of per-core rows, never less than one.
    pub fn core_count(&self) -> usize {
        self.cores().len().max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_row(line: &str) -> CpuRow {
    let mut fields = line.split_whitespace();
    let label = fields.next().unwrap_or_default().to_string();
    let mut next = |field: &'static str| parse_or_zero::<u64>("stat", field, fields.next());

    let user = next("user");
    let nice = next("nice");
    let system = next("system");
    let idle = next("idle");
    let io_wait = next("iowait");
    let irq = next("irq");
    let soft_irq = next("softirq");
    let steal = next("steal");
    // Older kernels stop at steal or guest.
    let mut optional = || fields.next().and_then(|v| v.parse().ok()).unwrap_or(0);
    let guest = optional();
    let guest_nice = optional();

    CpuRow {
        label,
        times: CpuTimes {
            user,
            nice,
            system,
            idle,
            io_wait,
            irq,
            soft_irq,
            steal,
            guest,
            guest_nice,
        },
    }
}

/// Aggregate usage and total tick delta over all cores between two snapshots.
pub fn aggregate_delta(prev: &CpuCounterSnapshot, curr: &CpuCounterSnapshot) -> Option<CpuDelta> {
    usage_delta(&prev.aggregate()?.times, &curr.aggregate()?.times)
}

/// Per-core usage, pairing rows by position rather than by label.
pub fn per_core_usage(prev: &CpuCounterSnapshot, curr: &CpuCounterSnapshot) -> Vec<Option<f64>> {
    curr.cores()
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let before = prev.cores().get(idx)?;
            usage_percent(&before.times, &row.times)
        })
        .collect()
}

/// The first `model name` entry of `/proc/cpuinfo`.
pub fn parse_model_name(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("model name"))
        .find_map(|line| {
            let (_, value) = line.split_once(':')?;
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        })
}

/// CPU brand as seen by `sysinfo`, for platforms whose cpuinfo has no model name.
pub fn fallback_model_name() -> Option<String> {
    use sysinfo::{CpuRefreshKind, RefreshKind, System};

    let sys = System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
    sys.cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
}
