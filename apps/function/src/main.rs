use anyhow::Context;
use optbind::kernel::config::load_host_config;
use optbind_function::{Server, init_logger};

#[optbind_runtime::main(memory_efficient)]
async fn main() -> anyhow::Result<()> {
    let cfg = load_host_config(Some("function")).context("Critical: host configuration is malformed")?;
    let _log = init_logger(env!("CARGO_PKG_NAME"), &cfg.logging)?;

    Server::builder().config(cfg).build()?.run().await
}
