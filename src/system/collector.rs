use super::cpu::{self, CpuCounterSnapshot};
use super::error::SampleError;
use super::memory::MemorySnapshot;
use super::process::{MemoryExtent, ProcessAccountingRecord, ProcessTable};
use super::source::{CounterSource, ProcFs};
use super::uptime::Uptime;

/// Everything read from the counter sources in one tick.
///
/// A `None` metric means its source could not be read this tick.
#[derive(Debug, Clone, Default)]
pub struct Sample {
    pub cpu: Option<CpuCounterSnapshot>,
    pub memory: Option<MemorySnapshot>,
    pub uptime: Option<Uptime>,
    pub processes: ProcessTable,
}

pub struct Collector<S = ProcFs> {
    source: S,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(ProcFs::default())
    }
}

impl<S: CounterSource> Collector<S> {
    pub fn new(source: S) -> Self {
        Collector { source }
    }

    /// Read one complete sample.
    ///
    /// Fails only when the process list itself cannot be enumerated; unreadable counter files
    /// leave their metric empty and processes that vanish mid-read are skipped.
    pub fn collect(&self) -> Result<Sample, SampleError> {
        let _span = tracing::debug_span!("collector.collect").entered();

        let cpu = self
            .read_metric("stat")
            .map(|content| CpuCounterSnapshot::parse(&content))
            .filter(|snapshot| !snapshot.is_empty());
        let memory = self
            .read_metric("meminfo")
            .map(|content| MemorySnapshot::parse(&content));
        let uptime = self
            .read_metric("uptime")
            .map(|content| Uptime::parse(&content));
        let processes = self.collect_processes()?;

        Ok(Sample {
            cpu,
            memory,
            uptime,
            processes,
        })
    }

    /// Model string of the first CPU, read once at startup.
    pub fn cpu_model(&self) -> String {
        self.read_metric("cpuinfo")
            .and_then(|content| cpu::parse_model_name(&content))
            .or_else(cpu::fallback_model_name)
            .unwrap_or_else(|| "Unknown CPU".to_string())
    }

    fn read_metric(&self, relative: &str) -> Option<String> {
        match self.source.read(relative) {
            Ok(content) => Some(content),
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        }
    }

    fn collect_processes(&self) -> Result<ProcessTable, SampleError> {
        let pids = self.source.list_pids()?;
        let mut table = ProcessTable::new();

        for pid in pids {
            let stat = match self.source.read(&format!("{pid}/stat")) {
                Ok(content) => content,
                Err(err) => {
                    // Usually the process exited between listing and reading.
                    tracing::debug!(pid, "skipping process: {err}");
                    continue;
                }
            };
            let record = match ProcessAccountingRecord::parse(&stat) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(pid, "skipping process: {err}");
                    continue;
                }
            };
            let record = match self.source.read(&format!("{pid}/statm")) {
                Ok(content) => record.with_resident_kb(MemoryExtent::parse(&content).resident_kb),
                Err(err) => {
                    tracing::debug!(pid, "no memory extent: {err}");
                    record
                }
            };
            table.insert(record);
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::source::StaticSource;

    #[test]
    fn collects_every_source() {
        let source = StaticSource::new()
            .with_file("stat", "cpu 10 0 5 100 0 0 0 0 0 0\ncpu0 10 0 5 100 0 0 0 0 0 0\n")
            .with_file("meminfo", "MemTotal: 2048 kB\nMemFree: 1024 kB\n")
            .with_file("uptime", "120.5 400.0\n")
            .with_file("1/stat", "1 (init) S 0 1 1 0 -1 0 0 0 0 0 7 3 0 0")
            .with_file("1/statm", "100 40 10 5 0 20 0")
            .with_pids(&[1]);

        let sample = Collector::new(source).collect().unwrap();
        assert_eq!(sample.cpu.unwrap().core_count(), 1);
        assert_eq!(sample.memory.unwrap().total_kb, 2048);
        assert_eq!(sample.uptime.unwrap().whole_secs(), 120);
        let init = sample.processes.get(1).unwrap();
        assert_eq!(init.total_ticks(), 10);
        assert_eq!(init.resident_kb, Some(40));
    }

    #[test]
    fn missing_sources_leave_metrics_empty() {
        let source = StaticSource::new()
            .with_file("1/stat", "1 (init) S 0 1 1 0 -1 0 0 0 0 0 7 3 0 0")
            .with_pids(&[1, 2]);

        let sample = Collector::new(source).collect().unwrap();
        assert!(sample.cpu.is_none());
        assert!(sample.memory.is_none());
        assert!(sample.uptime.is_none());
        // pid 2 vanished before its stat was read
        assert_eq!(sample.processes.len(), 1);
        assert_eq!(sample.processes.get(1).unwrap().resident_kb, None);
    }

    #[test]
    fn unlistable_process_root_fails_the_tick() {
        let source = StaticSource::new().with_file("stat", "cpu 1 1 1 1\n");
        let err = Collector::new(source).collect().unwrap_err();
        assert!(matches!(err, SampleError::ProcessListing { .. }));
    }

    #[test]
    fn cpu_model_prefers_cpuinfo() {
        let source = StaticSource::new().with_file("cpuinfo", "model name\t: Test CPU @ 3.00GHz\n");
        assert_eq!(Collector::new(source).cpu_model(), "Test CPU @ 3.00GHz");
    }
}
