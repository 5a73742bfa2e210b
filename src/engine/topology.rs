// CPU topology probing and the worker / thread-affinity heuristic

use std::fmt;

use sysinfo::System;
use thiserror::Error;

/// Errors raised while building a [`ProcessorTopology`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("invalid processor topology: {logical} logical / {physical} physical cores")]
    InvalidTopology { logical: usize, physical: usize },

    #[error("the operating system did not report a physical core count")]
    Unavailable,
}

/// Logical and physical core counts of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorTopology {
    logical_core_count: usize,
    physical_core_count: usize,
}

impl ProcessorTopology {
    /// Validate core counts (physical > 0, logical >= physical)
    pub fn new(logical_core_count: usize, physical_core_count: usize) -> Result<Self, TopologyError> {
        if physical_core_count == 0 || logical_core_count < physical_core_count {
            return Err(TopologyError::InvalidTopology {
                logical: logical_core_count,
                physical: physical_core_count,
            });
        }

        Ok(Self {
            logical_core_count,
            physical_core_count,
        })
    }

    /// Query the host through sysinfo
    pub fn query() -> Result<Self, TopologyError> {
        let mut sys = System::new();
        sys.refresh_cpu();

        let physical = sys.physical_core_count().ok_or(TopologyError::Unavailable)?;
        let logical = sys.cpus().len();
        tracing::debug!(logical, physical, "queried processor topology");

        Self::new(logical, physical)
    }

    pub fn logical_core_count(&self) -> usize {
        self.logical_core_count
    }

    pub fn physical_core_count(&self) -> usize {
        self.physical_core_count
    }

    /// Logical threads per physical core. Real division: a 12/8 hybrid part is 1.5, not 1.
    pub fn core_ratio(&self) -> f64 {
        self.logical_core_count as f64 / self.physical_core_count as f64
    }
}

/// Worker / affinity recommendation handed to the command assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadingPlan {
    Disabled,
    Enabled {
        worker_count: usize,
        affinity_group_size: usize,
    },
}

/// User choices that switch the heuristic off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadingOverrides {
    pub detection_disabled: bool,
    pub workers_set: bool,
    pub affinity_set: bool,
}

impl ThreadingOverrides {
    pub fn suppresses_detection(&self) -> bool {
        self.detection_disabled || self.workers_set || self.affinity_set
    }
}

/// Why the detector produced its plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionReason {
    /// Turned off by the user or by an explicit worker/affinity value
    Suppressed,
    /// Non-integral logical/physical ratio (performance + efficiency cores)
    Heterogeneous { logical: usize, physical: usize },
    /// Uniform cores; `smt` is true when the ratio is exactly 2
    Detected { smt: bool },
}

/// Full detector outcome: the plan plus the classification behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub plan: ThreadingPlan,
    pub reason: DetectionReason,
}

impl Detection {
    pub fn suppressed() -> Self {
        Self {
            plan: ThreadingPlan::Disabled,
            reason: DetectionReason::Suppressed,
        }
    }

    pub fn is_heterogeneous(&self) -> bool {
        matches!(self.reason, DetectionReason::Heterogeneous { .. })
    }

    /// Console block printed before av1an starts
    pub fn report(&self) -> String {
        format!("THREADING INFORMATION:\n  {}\n", self)
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.reason, self.plan) {
            (DetectionReason::Detected { smt }, ThreadingPlan::Enabled { worker_count, affinity_group_size }) => write!(
                f,
                "Hyperthreading / SMT: {}, Workers: {}, Thread Affinity: {}",
                smt, worker_count, affinity_group_size
            ),
            (DetectionReason::Heterogeneous { logical, physical }, _) => write!(
                f,
                "Performance and efficiency cores detected ({} logical / {} physical), automatic thread detection: DISABLED",
                logical, physical
            ),
            _ => write!(f, "Automatic thread detection: DISABLED"),
        }
    }
}

/// Classify a topology and derive the worker / affinity recommendation.
///
/// Does not look at user overrides; see [`plan_threading`] for the full decision.
pub fn classify(topology: &ProcessorTopology) -> Detection {
    let ratio = topology.core_ratio();

    if ratio.fract() != 0.0 {
        return Detection {
            plan: ThreadingPlan::Disabled,
            reason: DetectionReason::Heterogeneous {
                logical: topology.logical_core_count(),
                physical: topology.physical_core_count(),
            },
        };
    }

    // Only ratio 2 counts as SMT; 4-way virtualised layouts still get affinity 1
    let smt = ratio == 2.0;
    let affinity_group_size = if smt { 2 } else { 1 };

    Detection {
        plan: ThreadingPlan::Enabled {
            worker_count: topology.physical_core_count(),
            affinity_group_size,
        },
        reason: DetectionReason::Detected { smt },
    }
}

/// Decide the threading plan.
///
/// Overrides are checked first, and `query` is only invoked when detection
/// is still on, so the OS is never probed for a plan the user has replaced.
pub fn plan_threading<F>(overrides: &ThreadingOverrides, query: F) -> Result<Detection, TopologyError>
where
    F: FnOnce() -> Result<ProcessorTopology, TopologyError>,
{
    if overrides.suppresses_detection() {
        let detection = Detection::suppressed();
        tracing::debug!(?overrides, "{}", detection);
        return Ok(detection);
    }

    let topology = query()?;
    let detection = classify(&topology);

    tracing::debug!(
        logical = topology.logical_core_count(),
        physical = topology.physical_core_count(),
        heterogeneous = detection.is_heterogeneous(),
        "{}",
        detection
    );

    Ok(detection)
}
