use report_fetch::config::OutputConfig;
use report_fetch::{logger, App, Config};
use tokio_test::{assert_ok, block_on};

/// 需要真实的 CUSTOMER_ORGID / CUSTOMER_BEARER，手动运行：cargo test -- --ignored
#[test]
#[ignore]
fn test_live_report_download() {
    logger::init_console();

    let mut config = assert_ok!(Config::load());
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    config.output = OutputConfig {
        path: Some(dir.path().to_path_buf()),
        file_name: "live.json".to_string(),
    };

    let succeeded = block_on(async {
        let app = App::initialize(config).await.expect("初始化应用失败");
        app.run().await
    });

    assert!(succeeded, "报表应该下载成功");
    assert!(dir.path().join("live.json").exists());
}

#[test]
fn test_bundled_profiles_parse() {
    for profile in ["default", "learningActivity", "contentAccess"] {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("config")
            .join(format!("{}.toml", profile));

        let config = assert_ok!(Config::from_file(&path));
        assert_ok!(config.report.to_spec());
        assert_ok!(config.output.destination());
    }
}
