pub mod flow_state;
pub mod report_flow;

pub use flow_state::{FlowOutcome, WorkflowState};
pub use report_flow::ReportFlow;
