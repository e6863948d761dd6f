//! Run one future to completion from synchronous code.
//!
//! Every call builds a fresh current-thread runtime, drives the future, and
//! tears the runtime down. Nothing is pooled between calls and there is no
//! cancellation or retry.

use std::future::Future;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The caller is already inside a runtime; blocking here would deadlock or panic.
    #[error("run_blocking called from inside an async runtime")]
    NestedRuntime,
    #[error("failed to build runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

pub fn run_blocking<F: Future>(fut: F) -> Result<F::Output, BridgeError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(BridgeError::NestedRuntime);
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(fut);
    drop(runtime);
    Ok(output)
}
