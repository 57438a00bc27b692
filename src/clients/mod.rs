pub mod report_client;

pub use report_client::{ApiResponse, ReportApi, ReportClient};
