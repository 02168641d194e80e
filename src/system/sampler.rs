//! The tick-to-tick accounting state machine.
//!
//! The only state carried across ticks is the [`Baseline`]: the previous tick's CPU counters
//! and process table. It lives inside the [`Sampler`] value, which the caller moves through
//! [`Sampler::advance`] once per tick, so the baseline is always replaced whole.

use serde::Serialize;

use super::collector::Sample;
use super::cpu::{self, CpuCounterSnapshot};
use super::memory::MemoryUsage;
use super::process::{self, MemoryScale, ProcessTable, ProcessUsage};
use super::uptime::Uptime;

/// Counters retained from the previous tick.
#[derive(Debug, Clone, Default)]
pub struct Baseline {
    pub cpu: Option<CpuCounterSnapshot>,
    pub processes: ProcessTable,
}

impl From<Sample> for Baseline {
    fn from(sample: Sample) -> Self {
        Baseline {
            cpu: sample.cpu,
            processes: sample.processes,
        }
    }
}

/// Metrics derived for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub cpu_usage_percent: Option<f64>,
    pub cpu_per_core: Vec<Option<f64>>,
    pub memory: Option<MemoryUsage>,
    pub uptime: Option<Uptime>,
    pub processes: Vec<ProcessUsage>,
}

#[derive(Debug, Clone, Default)]
pub enum Sampler {
    /// No sample taken yet, so there is nothing to diff against.
    #[default]
    Priming,
    Steady(Baseline),
}

impl Sampler {
    /// Feed the sample of a new tick.
    ///
    /// While priming, the sample only becomes the baseline and no report is produced.
    pub fn advance(self, sample: Sample, page_size_kb: f64) -> (Sampler, Option<TickReport>) {
        let _span = tracing::debug_span!("sampler.advance").entered();

        match self {
            Sampler::Priming => (Sampler::Steady(sample.into()), None),
            Sampler::Steady(baseline) => {
                let report = account(&baseline, &sample, page_size_kb);
                (Sampler::Steady(sample.into()), Some(report))
            }
        }
    }

    pub fn is_priming(&self) -> bool {
        matches!(self, Sampler::Priming)
    }
}

/// Derive a tick's metrics from the previous baseline and the current sample.
pub fn account(prev: &Baseline, curr: &Sample, page_size_kb: f64) -> TickReport {
    let cpu_pair = prev.cpu.as_ref().zip(curr.cpu.as_ref());

    let aggregate = cpu_pair.and_then(|(before, now)| cpu::aggregate_delta(before, now));
    let cpu_usage_percent = aggregate.map(|delta| delta.percent().clamp(0.0, 100.0));
    let cpu_per_core = cpu_pair
        .map(|(before, now)| {
            cpu::per_core_usage(before, now)
                .into_iter()
                .map(|usage| usage.map(|pct| pct.clamp(0.0, 100.0)))
                .collect()
        })
        .unwrap_or_default();

    let core_count = curr
        .cpu
        .as_ref()
        .map(CpuCounterSnapshot::core_count)
        .unwrap_or(1);
    let elapsed_ticks = aggregate
        .map(|delta| delta.total / core_count as f64)
        .unwrap_or(0.0);

    let memory = curr.memory.map(|mem| mem.usage());
    let scale = MemoryScale {
        page_size_kb,
        total_kb: memory.map(|m| m.total_kb).unwrap_or(0),
    };

    let processes = process::reconcile(
        &prev.processes,
        &curr.processes,
        elapsed_ticks,
        core_count,
        scale,
    );

    TickReport {
        cpu_usage_percent,
        cpu_per_core,
        memory,
        uptime: curr.uptime,
        processes,
    }
}
