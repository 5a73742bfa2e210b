// Core engine - independent of argument parsing

pub mod command;
pub mod launch;
pub mod log;
pub mod search_path;
pub mod topology;

pub use command::{CommandLine, EncodeOptions, Rav1eOptions, Token, build_av1an_cmd};
pub use launch::{LaunchError, Launcher};
pub use log::write_debug_log;
pub use search_path::{SearchPath, SearchPathError};
pub use topology::{
    Detection, DetectionReason, ProcessorTopology, ThreadingOverrides, ThreadingPlan, TopologyError,
    classify, plan_threading,
};
