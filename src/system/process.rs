use std::collections::BTreeMap;

use serde::Serialize;

use super::error::{SampleError, parse_or_zero};

/// One process's CPU accounting, parsed from `/proc/<pid>/stat`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessAccountingRecord {
    pub pid: u32,
    pub comm: String,
    pub utime_ticks: u64,
    pub stime_ticks: u64,
    /// Filled from the process's `statm` when the collector could read it.
    pub resident_kb: Option<u64>,
}

impl ProcessAccountingRecord {
    /// Parse a `stat` line by splitting on whitespace.
    ///
    /// Field 1 is the pid, field 2 the name, fields 14 and 15 utime and stime. A name that
    /// contains whitespace shifts every later field, so such processes get wrong tick counts.
    /// Only an unusable pid rejects the record; other bad fields read as zero.
    pub fn parse(content: &str) -> Result<Self, SampleError> {
        let fields: Vec<&str> = content.split_whitespace().collect();

        let raw_pid = fields.first().copied().unwrap_or_default();
        let pid = match raw_pid.parse::<u32>() {
            Ok(pid) if pid > 0 => pid,
            _ => {
                return Err(SampleError::MalformedField {
                    record: "stat",
                    field: "pid",
                    value: raw_pid.to_string(),
                });
            }
        };

        let comm = fields
            .get(1)
            .map(|name| name.trim_start_matches('(').trim_end_matches(')').to_string())
            .unwrap_or_default();

        Ok(Self {
            pid,
            comm,
            utime_ticks: parse_or_zero("stat", "utime", fields.get(13).copied()),
            stime_ticks: parse_or_zero("stat", "stime", fields.get(14).copied()),
            resident_kb: None,
        })
    }

    /// User plus system ticks, saturating at `u64::MAX`.
    pub fn total_ticks(&self) -> u64 {
        self.utime_ticks.saturating_add(self.stime_ticks)
    }

    pub fn with_resident_kb(mut self, resident_kb: u64) -> Self {
        self.resident_kb = Some(resident_kb);
        self
    }
}

/// `/proc/<pid>/statm`: instantaneous memory extents of one process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemoryExtent {
    pub virtual_kb: u64,
    pub resident_kb: u64,
    pub shared_kb: u64,
    pub text_kb: u64,
    pub data_kb: u64,
}

impl MemoryExtent {
    pub fn parse(content: &str) -> Self {
        let fields: Vec<&str> = content.split_whitespace().collect();
        let field = |idx: usize, name: &'static str| {
            parse_or_zero::<u64>("statm", name, fields.get(idx).copied())
        };
        // Field 4 (lib) and 6 (dt) are always zero on Linux 2.6+.
        Self {
            virtual_kb: field(0, "size"),
            resident_kb: field(1, "resident"),
            shared_kb: field(2, "shared"),
            text_kb: field(3, "text"),
            data_kb: field(5, "data"),
        }
    }
}

/// All processes seen in one tick, keyed and iterated by ascending pid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessTable {
    records: BTreeMap<u32, ProcessAccountingRecord>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A later record for the same pid replaces the earlier one.
    pub fn insert(&mut self, record: ProcessAccountingRecord) {
        self.records.insert(record.pid, record);
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessAccountingRecord> {
        self.records.get(&pid)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessAccountingRecord> {
        self.records.values()
    }
}

impl FromIterator<ProcessAccountingRecord> for ProcessTable {
    fn from_iter<I: IntoIterator<Item = ProcessAccountingRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

/// What per-process resident sizes are measured against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemoryScale {
    pub page_size_kb: f64,
    pub total_kb: u64,
}

impl MemoryScale {
    pub fn percent_of(&self, resident_kb: Option<u64>) -> f64 {
        let Some(resident_kb) = resident_kb else {
            return 0.0;
        };
        if self.total_kb == 0 || self.page_size_kb <= 0.0 {
            return 0.0;
        }
        resident_kb as f64 / self.page_size_kb / self.total_kb as f64 * 100.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessUsage {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub mem_percent: f64,
}

/// Attribute CPU time to every process in `curr` by diffing it against `prev`.
///
/// `elapsed_ticks` is one core's share of the aggregate tick delta. Processes without a
/// baseline in `prev` get 0 %; processes missing from `curr` are dropped. The result is
/// ordered by descending CPU share, ties keeping ascending pid order.
pub fn reconcile(
    prev: &ProcessTable,
    curr: &ProcessTable,
    elapsed_ticks: f64,
    core_count: usize,
    memory: MemoryScale,
) -> Vec<ProcessUsage> {
    let ceiling = core_count.max(1) as f64 * 100.0;

    let mut ranked: Vec<ProcessUsage> = curr
        .iter()
        .map(|record| {
            let cpu_percent = match prev.get(record.pid) {
                Some(before) if elapsed_ticks > 0.0 => {
                    let delta = record.total_ticks().saturating_sub(before.total_ticks());
                    (delta as f64 / elapsed_ticks * 100.0).clamp(0.0, ceiling)
                }
                _ => 0.0,
            };
            ProcessUsage {
                pid: record.pid,
                name: record.comm.clone(),
                cpu_percent,
                mem_percent: memory.percent_of(record.resident_kb),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    ranked
}
