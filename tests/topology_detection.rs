// Worker / thread-affinity detection from CPU topology

use av1wrap::engine::{
    DetectionReason, ProcessorTopology, ThreadingOverrides, ThreadingPlan, TopologyError, classify,
    plan_threading,
};
use proptest::prelude::*;
use std::cell::Cell;

fn topo(logical: usize, physical: usize) -> ProcessorTopology {
    ProcessorTopology::new(logical, physical).expect("valid topology")
}

fn detect(logical: usize, physical: usize) -> av1wrap::engine::Detection {
    plan_threading(&ThreadingOverrides::default(), || Ok(topo(logical, physical))).unwrap()
}

#[test]
fn hyperthreaded_cpu_pins_sibling_pairs() {
    let detection = detect(16, 8);
    assert_eq!(
        detection.plan,
        ThreadingPlan::Enabled {
            worker_count: 8,
            affinity_group_size: 2
        }
    );
    assert_eq!(detection.reason, DetectionReason::Detected { smt: true });
}

#[test]
fn cpu_without_smt_uses_single_thread_groups() {
    let detection = detect(8, 8);
    assert_eq!(
        detection.plan,
        ThreadingPlan::Enabled {
            worker_count: 8,
            affinity_group_size: 1
        }
    );
    assert_eq!(detection.reason, DetectionReason::Detected { smt: false });
}

#[test]
fn hybrid_cpu_disables_detection_and_says_why() {
    let detection = detect(12, 8);
    assert_eq!(detection.plan, ThreadingPlan::Disabled);
    assert_eq!(
        detection.reason,
        DetectionReason::Heterogeneous {
            logical: 12,
            physical: 8
        }
    );
    assert!(detection.is_heterogeneous());
    assert_ne!(
        detection.to_string(),
        "Automatic thread detection: DISABLED",
        "hybrid result must be distinguishable from a plain opt-out"
    );
}

#[test]
fn ratio_that_truncates_to_two_is_still_hybrid() {
    // 24/10 = 2.4 would look like SMT under integer division
    let detection = detect(24, 10);
    assert_eq!(detection.plan, ThreadingPlan::Disabled);
    assert!(detection.is_heterogeneous());
}

#[test]
fn four_way_ratio_keeps_affinity_one() {
    assert_eq!(
        classify(&topo(32, 8)).plan,
        ThreadingPlan::Enabled {
            worker_count: 8,
            affinity_group_size: 1
        }
    );
}

#[test]
fn zero_physical_cores_is_invalid() {
    let result = plan_threading(&ThreadingOverrides::default(), || ProcessorTopology::new(8, 0));
    assert_eq!(
        result,
        Err(TopologyError::InvalidTopology {
            logical: 8,
            physical: 0
        })
    );
}

#[test]
fn suppressed_detection_does_not_query_the_host() {
    let queried = Cell::new(false);
    let overrides = ThreadingOverrides {
        detection_disabled: true,
        ..ThreadingOverrides::default()
    };

    let detection = plan_threading(&overrides, || {
        queried.set(true);
        ProcessorTopology::new(8, 0)
    })
    .unwrap();

    assert_eq!(detection.plan, ThreadingPlan::Disabled);
    assert_eq!(detection.reason, DetectionReason::Suppressed);
    assert!(!queried.get());
}

fn any_topology() -> impl Strategy<Value = ProcessorTopology> {
    (1usize..=256, 1usize..=8).prop_map(|(physical, extra)| {
        ProcessorTopology::new(physical * extra + (extra % 3), physical).unwrap()
    })
}

fn any_suppressing_overrides() -> impl Strategy<Value = ThreadingOverrides> {
    (any::<bool>(), any::<bool>(), any::<bool>())
        .prop_filter("at least one override", |(d, w, a)| *d || *w || *a)
        .prop_map(|(detection_disabled, workers_set, affinity_set)| ThreadingOverrides {
            detection_disabled,
            workers_set,
            affinity_set,
        })
}

proptest! {
    #[test]
    fn overrides_always_win(overrides in any_suppressing_overrides(), topology in any_topology()) {
        let detection = plan_threading(&overrides, || Ok(topology)).unwrap();
        prop_assert_eq!(detection.plan, ThreadingPlan::Disabled);
        prop_assert_eq!(detection.reason, DetectionReason::Suppressed);
    }

    #[test]
    fn enabled_plans_use_every_physical_core(topology in any_topology()) {
        if let ThreadingPlan::Enabled { worker_count, affinity_group_size } = classify(&topology).plan {
            prop_assert_eq!(worker_count, topology.physical_core_count());
            prop_assert!(affinity_group_size == 1 || affinity_group_size == 2);
            prop_assert_eq!(topology.logical_core_count() % topology.physical_core_count(), 0);
        } else {
            prop_assert!(topology.logical_core_count() % topology.physical_core_count() != 0);
        }
    }
}
