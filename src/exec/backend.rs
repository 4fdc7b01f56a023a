// src/exec/backend.rs

//! Pluggable build backend abstraction.
//!
//! The runtime talks to a `BuildBackend` instead of a raw mpsc sender, so
//! tests can swap in a fake backend that records dispatched builds and
//! emits `BuildFinished` events directly, without touching the filesystem.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::compile::CompilerSet;
use crate::engine::{RuntimeEvent, ScheduledBuild};
use crate::errors::{Error, Result};

use super::executor_loop::spawn_executor;

/// Trait abstracting how scheduled builds are executed.
pub trait BuildBackend: Send {
    /// Hand the given builds off for execution. Must not wait for them to
    /// finish; completion is reported through `RuntimeEvent::BuildFinished`.
    fn dispatch(
        &mut self,
        builds: Vec<ScheduledBuild>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real backend used in production: forwards builds to the executor loop,
/// which runs the matching compiler from `CompilerSet`.
pub struct RealBuildBackend {
    tx: mpsc::Sender<ScheduledBuild>,
}

impl RealBuildBackend {
    /// Spawns the background executor loop immediately.
    pub fn new(compilers: CompilerSet, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        let tx = spawn_executor(compilers, runtime_tx);
        Self { tx }
    }
}

impl BuildBackend for RealBuildBackend {
    fn dispatch(
        &mut self,
        builds: Vec<ScheduledBuild>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            for build in builds {
                tx.send(build).await.map_err(Error::from)?;
            }
            Ok(())
        })
    }
}
