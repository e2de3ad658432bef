use anyhow::Context;
use slms::kernel::config::load_config;
use slms_logger::Logger;
use slms_runtime::RuntimeConfig;
use slms_server::{Server, apply_platform_port};

fn main() -> anyhow::Result<()> {
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    let mut cfg = load_config(Some("server")).context("Critical: Configuration is malformed")?;
    apply_platform_port(&mut cfg);

    let runtime = slms_runtime::build_runtime_with_config(&RuntimeConfig::high_performance())?;
    runtime.block_on(async { Server::builder().config(cfg).build().await?.run().await })
}
