pub mod adjust;
pub mod scenario;
pub mod sensitivity;

pub use adjust::{apply_adjustments, apply_named, Adjustment, AdjustmentTarget, NamedDelta};
pub use scenario::{run_scenarios, ScenarioAnalysis, ScenarioDefinition, ScenarioResult};
pub use sensitivity::{
    run_sensitivity, SensitivityInput, SensitivityOutput, SensitivityResult, TornadoRow,
};
