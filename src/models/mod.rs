pub mod report;
pub mod site;
pub mod status;

pub use report::{OutputFormat, ReportRequestSpec, Timeframe};
pub use site::{SiteCredentials, VerifiedSite};
pub use status::{ReportHandle, ReportPayload, ReportStatus, FAILURE_SENTINEL};
