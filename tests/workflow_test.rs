mod support;

use report_fetch::config::OutputConfig;
use report_fetch::error::{AppError, ConfigError, PollingError, SubmissionError};
use report_fetch::services::{OutputSink, OutputWriter};
use report_fetch::{App, Config, ReportApi, ReportFlow, RetryPolicy, WorkflowState};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use support::ScriptedApi;

fn config_for(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.site.baseuri = "https://api.test".to_string();
    config.site.orgid = Some("org-1".to_string());
    config.site.bearer = Some("token".to_string());
    config.retry_options = RetryPolicy::new(2, Duration::ZERO, Duration::ZERO);
    config.polling_options = RetryPolicy::new(2, Duration::ZERO, Duration::ZERO);
    config.output = OutputConfig {
        path: Some(output_dir.to_path_buf()),
        file_name: "learningActivity.json".to_string(),
    };
    config
}

fn flow(config: &Config, api: &Arc<ScriptedApi>) -> ReportFlow {
    let api: Arc<dyn ReportApi> = api.clone();
    let sink: Arc<dyn OutputSink> = Arc::new(OutputWriter::new());
    ReportFlow::new(config, api, sink)
}

#[tokio::test]
async fn test_structured_report_is_written_as_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    let api = Arc::new(
        ScriptedApi::new()
            .on_create(200, r#"{"id":"abc"}"#)
            .on_get(200, r#"{"records":[{"x":1}]}"#),
    );

    let outcome = flow(&config, &api).run().await;

    assert!(outcome.succeeded(), "{:?}", outcome.error);
    assert_eq!(outcome.state, WorkflowState::Done);
    assert_eq!(api.create_count(), 1);
    assert_eq!(api.polled_ids(), vec!["abc".to_string()]);

    let written = std::fs::read_to_string(dir.path().join("learningActivity.json")).unwrap();
    assert_eq!(written, r#"[{"x":1}]"#);
    assert_eq!(outcome.output, Some(dir.path().join("learningActivity.json")));
}

#[tokio::test]
async fn test_empty_bearer_aborts_without_any_call() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.site.bearer = Some(String::new());
    let api = Arc::new(ScriptedApi::new());

    let outcome = flow(&config, &api).run().await;

    assert!(!outcome.succeeded());
    assert_eq!(outcome.state, WorkflowState::Aborted);
    assert_eq!(outcome.failed_in, Some(WorkflowState::Idle));
    assert!(matches!(
        outcome.error,
        Some(AppError::Config(ConfigError::MissingBearer))
    ));
    assert_eq!(api.create_count(), 0);
    assert_eq!(api.get_count(), 0);
}

#[tokio::test]
async fn test_missing_orgid_aborts_without_any_call() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.site.orgid = None;
    let api = Arc::new(ScriptedApi::new());

    let outcome = flow(&config, &api).run().await;

    assert!(matches!(
        outcome.error,
        Some(AppError::Config(ConfigError::MissingOrgId))
    ));
    assert_eq!(api.create_count(), 0);
}

#[tokio::test]
async fn test_failed_submission_never_polls() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    let api = Arc::new(ScriptedApi::new().on_create(200, r#"{"status":"FAILED"}"#));

    let outcome = flow(&config, &api).run().await;

    assert!(!outcome.succeeded());
    assert_eq!(outcome.failed_in, Some(WorkflowState::Submitting));
    assert!(matches!(
        outcome.error,
        Some(AppError::Submission(SubmissionError::Exhausted { attempts: 3, .. }))
    ));
    assert_eq!(api.create_count(), 3);
    assert_eq!(api.get_count(), 0);
    assert!(!dir.path().join("learningActivity.json").exists());
}

#[tokio::test]
async fn test_polling_failure_keeps_previous_output_and_does_not_resubmit() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    let target = dir.path().join("learningActivity.json");
    std::fs::write(&target, "previous").unwrap();
    let api = Arc::new(
        ScriptedApi::new()
            .on_create(200, r#"{"id":"abc"}"#)
            .on_get(200, r#"{"reportId":"abc","status":"IN_PROGRESS"}"#),
    );

    let outcome = flow(&config, &api).run().await;

    assert_eq!(outcome.failed_in, Some(WorkflowState::Polling));
    assert!(matches!(
        outcome.error,
        Some(AppError::Polling(PollingError::TimedOut { attempts: 3, .. }))
    ));
    assert_eq!(api.create_count(), 1);
    assert_eq!(api.get_count(), 3);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "previous");
}

#[tokio::test]
async fn test_write_failure_aborts_without_fetching_again() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    // 目标位置被目录占用，删除和写入都会失败
    std::fs::create_dir(dir.path().join("learningActivity.json")).unwrap();
    let api = Arc::new(
        ScriptedApi::new()
            .on_create(200, r#"{"id":"abc"}"#)
            .on_get(200, r#"[{"x":1}]"#),
    );

    let outcome = flow(&config, &api).run().await;

    assert!(!outcome.succeeded());
    assert_eq!(outcome.state, WorkflowState::Aborted);
    assert_eq!(outcome.failed_in, Some(WorkflowState::Writing));
    assert!(matches!(outcome.error, Some(AppError::Output(_))));
    assert_eq!(outcome.output, None);
    assert_eq!(api.create_count(), 1);
    assert_eq!(api.get_count(), 1);
}

#[tokio::test]
async fn test_rerun_fully_replaces_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    let target = dir.path().join("learningActivity.json");
    std::fs::write(
        &target,
        r#"[{"x":1},{"x":2},{"x":3},{"x":4},{"x":5},{"x":6}]"#,
    )
    .unwrap();
    let api = Arc::new(
        ScriptedApi::new()
            .on_create(200, r#"{"id":"abc"}"#)
            .on_get(200, r#"[{"y":2}]"#),
    );

    let outcome = flow(&config, &api).run().await;

    assert!(outcome.succeeded());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), r#"[{"y":2}]"#);
}

#[tokio::test]
async fn test_zero_records_still_written_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    let api = Arc::new(
        ScriptedApi::new()
            .on_create(200, r#"{"id":"abc"}"#)
            .on_get(200, "[]"),
    );

    let outcome = flow(&config, &api).run().await;

    assert!(outcome.succeeded());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("learningActivity.json")).unwrap(),
        "[]"
    );
}

#[tokio::test]
async fn test_raw_format_written_verbatim_into_new_folder() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(&dir.path().join("results").join("output"));
    config.output.file_name = "contentAccess.csv".to_string();
    config.report.report_type = "content-access".to_string();
    config
        .report
        .request
        .insert("formatType".to_string(), "CSV".into());
    let csv = "title,totalAccesses\r\nRust,42\r\n";
    let api = Arc::new(
        ScriptedApi::new()
            .on_create(200, r#"{"id":"abc"}"#)
            .on_get(200, r#"{"reportId":"abc","status":"IN_PROGRESS"}"#)
            .on_get(200, csv),
    );

    let outcome = flow(&config, &api).run().await;

    assert!(outcome.succeeded(), "{:?}", outcome.error);
    assert_eq!(api.created_bodies()[0].0, "content-access");
    let written = std::fs::read_to_string(
        dir.path()
            .join("results")
            .join("output")
            .join("contentAccess.csv"),
    )
    .unwrap();
    assert_eq!(written, csv);
}

#[tokio::test]
async fn test_app_reports_success_flag() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.debug.log_path = dir.path().to_path_buf();

    let ok_api: Arc<dyn ReportApi> = Arc::new(
        ScriptedApi::new()
            .on_create(200, r#"{"id":"abc"}"#)
            .on_get(200, "[]"),
    );
    let sink: Arc<dyn OutputSink> = Arc::new(OutputWriter::new());
    assert!(App::with_parts(config.clone(), ok_api, sink.clone()).run().await);

    config.site.bearer = None;
    let unused_api: Arc<dyn ReportApi> = Arc::new(ScriptedApi::new());
    assert!(!App::with_parts(config, unused_api, sink).run().await);
}
