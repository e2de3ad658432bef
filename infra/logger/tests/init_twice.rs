use slms_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn the_global_subscriber_installs_once() {
    let _keep = Logger::builder()
        .name("slms-primary")
        .level(LevelFilter::INFO)
        .init()
        .expect("first install");

    // A second install must fail loudly instead of silently rewiring logs.
    let err = Logger::builder()
        .name("slms-secondary")
        .level(LevelFilter::INFO)
        .init()
        .expect_err("second install");

    assert!(matches!(err, LoggerError::Subscriber { .. }));
}
