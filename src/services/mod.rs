pub mod output_writer;
pub mod polling;
pub mod submission;

pub use output_writer::{OutputSink, OutputWriter};
pub use polling::ReportPoller;
pub use submission::ReportSubmitter;
