//! Echo Worker Example
//!
//! Demonstrates one broker session against two workers:
//! - APP_CREATE / APP_START bring an application up
//! - APP_PING reads the configuration back
//! - REMOTE_CALL_PROCEDURE reaches the application's procedures
//! - APP_GREET probes peers over the TCP mesh
//! - APP_STOP tears everything down
//!
//! # Usage
//!
//! ```bash
//! cargo run --example echo_worker
//! ```

use anyhow::{Context, Result};
use hive_app::testing::EchoApp;
use hive_proto::{AppConfig, Operation};
use hive_runtime::{ControlHandle, ControlMessage, Dispatcher, PeerDirectory};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_subscriber::{fmt, EnvFilter};

fn spawn_worker(name: &str, directory: Arc<PeerDirectory>) -> (ControlHandle, JoinHandle<()>) {
    let (dispatcher, handle) = Dispatcher::with_blueprint(
        EchoApp::blueprint(name),
        AppConfig::new("127.0.0.1", 0),
        directory,
    );
    (handle, tokio::spawn(dispatcher.run()))
}

async fn request(handle: &mut ControlHandle, op: Operation) -> Result<ControlMessage> {
    handle.send(op).await?;
    handle.recv().await.context("control channel closed")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    println!("=== Hive Echo Worker Example ===");
    println!();

    // One directory is the mesh; every started worker registers into it
    let directory = Arc::new(PeerDirectory::new());
    let (mut echoes, echoes_task) = spawn_worker("echoes", directory.clone());
    let (mut oracle, oracle_task) = spawn_worker("oracle", directory.clone());

    // Bring both applications up
    for handle in [&mut echoes, &mut oracle] {
        println!("create: {:?}", request(handle, Operation::AppCreate).await?);
        println!("start:  {:?}", request(handle, Operation::AppStart).await?);
    }
    println!();

    // The config travels back verbatim
    let pinged = request(&mut echoes, Operation::AppPing).await?;
    println!("ping:   {pinged:?}");
    println!();

    // Procedures answer over the control channel
    let echoed = request(&mut echoes, Operation::call("echo", json!(["hello", "hive"]))).await?;
    println!("echo:   {echoed:?}");

    // Greet probes the mesh: self is skipped, oracle answers, ghost is down
    let greeted = request(&mut echoes, Operation::greet(["echoes", "oracle", "ghost"])).await?;
    println!("greet:  {greeted:?}");
    println!();

    // Tear down
    for handle in [&mut echoes, &mut oracle] {
        println!("stop:   {:?}", request(handle, Operation::AppStop).await?);
    }

    drop(echoes);
    drop(oracle);
    echoes_task.await?;
    oracle_task.await?;

    println!();
    println!("Both workers exited.");
    Ok(())
}
