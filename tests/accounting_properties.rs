use std::collections::BTreeSet;

use proptest::prelude::*;
use ticktop::system::cpu::{CpuTimes, usage_delta, usage_percent};
use ticktop::system::memory::MemorySnapshot;
use ticktop::system::process::{MemoryScale, ProcessAccountingRecord, ProcessTable, reconcile};

fn cpu_times() -> impl Strategy<Value = CpuTimes> {
    prop::array::uniform8(0u64..1_000_000).prop_map(|t| CpuTimes {
        user: t[0],
        nice: t[1],
        system: t[2],
        idle: t[3],
        io_wait: t[4],
        irq: t[5],
        soft_irq: t[6],
        steal: t[7],
        guest: 0,
        guest_nice: 0,
    })
}

fn advance(times: CpuTimes, by: [u64; 8]) -> CpuTimes {
    CpuTimes {
        user: times.user + by[0],
        nice: times.nice + by[1],
        system: times.system + by[2],
        idle: times.idle + by[3],
        io_wait: times.io_wait + by[4],
        irq: times.irq + by[5],
        soft_irq: times.soft_irq + by[6],
        steal: times.steal + by[7],
        ..times
    }
}

fn process_table(max_pid: u32) -> impl Strategy<Value = ProcessTable> {
    prop::collection::btree_map(1..max_pid, (0u64..10_000, 0u64..10_000, 0u64..100_000), 0..40)
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(pid, (utime, stime, resident))| ProcessAccountingRecord {
                    pid,
                    comm: format!("proc{pid}"),
                    utime_ticks: utime,
                    stime_ticks: stime,
                    resident_kb: Some(resident),
                })
                .collect()
        })
}

const SCALE: MemoryScale = MemoryScale {
    page_size_kb: 4.0,
    total_kb: 16_000_000,
};

proptest! {
    #[test]
    fn cpu_usage_stays_within_bounds(prev in cpu_times(), by in prop::array::uniform8(0u64..100_000)) {
        let curr = advance(prev, by);
        let pct = usage_percent(&prev, &curr).unwrap();
        prop_assert!((0.0..=100.0).contains(&pct), "usage {pct} out of range");
    }

    #[test]
    fn any_single_field_regression_yields_no_usage(
        prev in cpu_times(),
        by in prop::array::uniform8(0u64..100_000),
        field in 0usize..8,
        drop in 1u64..1_000,
    ) {
        let mut curr = advance(prev, by);
        let slot = match field {
            0 => &mut curr.user,
            1 => &mut curr.nice,
            2 => &mut curr.system,
            3 => &mut curr.idle,
            4 => &mut curr.io_wait,
            5 => &mut curr.irq,
            6 => &mut curr.soft_irq,
            _ => &mut curr.steal,
        };
        let before = match field {
            0 => prev.user,
            1 => prev.nice,
            2 => prev.system,
            3 => prev.idle,
            4 => prev.io_wait,
            5 => prev.irq,
            6 => prev.soft_irq,
            _ => prev.steal,
        };
        prop_assume!(before >= drop);
        *slot = before - drop;
        prop_assert!(usage_delta(&prev, &curr).is_none());
    }

    #[test]
    fn counter_regression_yields_no_usage(prev in cpu_times(), by in prop::array::uniform8(1u64..100_000)) {
        let curr = advance(prev, by);
        prop_assert!(usage_delta(&curr, &prev).is_none());
    }

    #[test]
    fn reconcile_reports_exactly_current_processes(
        prev in process_table(200),
        curr in process_table(200),
        elapsed in 1.0f64..10_000.0,
        cores in 1usize..16,
    ) {
        let ranked = reconcile(&prev, &curr, elapsed, cores, SCALE);

        let reported: BTreeSet<u32> = ranked.iter().map(|p| p.pid).collect();
        let expected: BTreeSet<u32> = curr.iter().map(|r| r.pid).collect();
        prop_assert_eq!(reported.len(), ranked.len());
        prop_assert_eq!(reported, expected);

        let ceiling = cores as f64 * 100.0;
        for usage in &ranked {
            prop_assert!(usage.cpu_percent >= 0.0 && usage.cpu_percent <= ceiling);
            if prev.get(usage.pid).is_none() {
                prop_assert_eq!(usage.cpu_percent, 0.0);
            }
        }
    }

    #[test]
    fn reconcile_ranks_descending_with_pid_ties(
        prev in process_table(100),
        curr in process_table(100),
        elapsed in 1.0f64..1_000.0,
    ) {
        let ranked = reconcile(&prev, &curr, elapsed, 4, SCALE);
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].cpu_percent >= pair[1].cpu_percent);
            if pair[0].cpu_percent == pair[1].cpu_percent {
                prop_assert!(pair[0].pid < pair[1].pid);
            }
        }
    }

    #[test]
    fn unchanged_table_attributes_nothing(
        table in process_table(500),
        elapsed in 1.0f64..10_000.0,
        cores in 1usize..16,
    ) {
        let ranked = reconcile(&table, &table, elapsed, cores, SCALE);
        prop_assert_eq!(ranked.len(), table.len());
        for usage in &ranked {
            prop_assert_eq!(usage.cpu_percent, 0.0);
        }
    }

    #[test]
    fn zero_elapsed_time_attributes_nothing(prev in process_table(100), curr in process_table(100)) {
        let ranked = reconcile(&prev, &curr, 0.0, 2, SCALE);
        prop_assert!(ranked.iter().all(|p| p.cpu_percent == 0.0));
    }

    #[test]
    fn used_memory_never_exceeds_total(
        total in 0u64..64_000_000,
        free in 0u64..64_000_000,
        buffers in 0u64..8_000_000,
        cached in 0u64..8_000_000,
        slab in 0u64..2_000_000,
        shared in 0u64..2_000_000,
    ) {
        // Shmem is accounted inside Cached.
        let shared = shared.min(cached);
        let snapshot = MemorySnapshot {
            total_kb: total,
            free_kb: free,
            available_kb: 0,
            buffers_kb: buffers,
            cached_kb: cached,
            reclaimable_slab_kb: slab,
            shared_kb: shared,
        };
        prop_assert!(snapshot.used_kb() <= total);
    }
}
