pub mod engine;
pub mod telemetry;
pub mod units;

pub use engine::{
    AnalysisEngine, BatchSummary, DispatchConfig, Dispatcher, EngineError, FailureEntry,
    Isolation, JobDescriptor, JobFault, Outcome, RegistryError, UnitRegistry, WorkerCommand,
};
pub use units::builtin_registry;
