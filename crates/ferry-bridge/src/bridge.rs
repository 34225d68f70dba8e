//! The asynchronous invocation bridge.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use ferry_core::HostValue;
use ferry_telemetry::{RequestContext, RequestGuard};
use serde::Serialize;
use tracing::{debug, warn};

use crate::deferred::{Deferred, Settler, deferred};
use crate::error::{BridgeError, BridgeResult};
use crate::operation::{Contract, Operation, OperationRegistry};

/// Name and contract of one exposed operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationInfo {
    /// Exposed name.
    pub name: &'static str,
    /// Call contract.
    pub contract: Contract,
}

/// Exposes a registry of operations as non-blocking calls.
///
/// Each [`invoke`](Self::invoke) runs on its own worker thread. There is no
/// pool, no queue and no ordering between invocations. Cloning is cheap; all
/// clones share one registry.
#[derive(Debug, Clone)]
pub struct Bridge {
    registry: Arc<OperationRegistry>,
    next_worker: Arc<AtomicU64>,
}

impl Bridge {
    /// Create a bridge over a frozen registry.
    #[must_use]
    pub fn new(registry: OperationRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            next_worker: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Exposed operations, sorted by name.
    #[must_use]
    pub fn operations(&self) -> Vec<OperationInfo> {
        self.registry
            .iter()
            .map(|op| OperationInfo {
                name: op.name(),
                contract: op.contract(),
            })
            .collect()
    }

    /// Start an invocation and return its handle immediately.
    ///
    /// `args` are moved into the worker unchanged. Unknown names give an
    /// already-rejected handle and start no worker.
    #[must_use = "the invocation's outcome is only observable through the handle"]
    pub fn invoke(&self, name: &str, args: Vec<HostValue>) -> Deferred {
        let Some(operation) = self.registry.get(name) else {
            warn!(operation = name, "Unknown operation requested");
            return Deferred::rejected(BridgeError::UnknownOperation(name.to_string()));
        };

        let worker_id = self.next_worker.fetch_add(1, Ordering::Relaxed);
        let context = RequestContext::new(name)
            .with_worker(worker_id)
            .with_arg_count(args.len());

        let (settler, handle) = deferred();
        let spawned = thread::Builder::new()
            .name(format!("ferry-worker-{worker_id}"))
            .spawn(move || run_worker(operation.as_ref(), &args, context, settler));

        match spawned {
            // Detached: the handle is the only link back to the worker.
            Ok(_) => handle,
            Err(e) => {
                warn!(operation = name, error = %e, "Failed to spawn worker");
                Deferred::rejected(BridgeError::Spawn(e.to_string()))
            },
        }
    }
}

/// Worker body: arity check and operation call behind the fault barrier,
/// then exactly one settlement.
fn run_worker(
    operation: &dyn Operation,
    args: &[HostValue],
    context: RequestContext,
    settler: Settler,
) {
    let _guard = RequestGuard::new(context);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| execute(operation, args)))
        .unwrap_or_else(|payload| Err(BridgeError::Fault(panic_message(payload.as_ref()))));

    match outcome {
        Ok(result) => {
            debug!(bytes = result.len(), "Operation fulfilled");
            settler.resolve(result);
        },
        Err(error) => {
            warn!(kind = error.kind(), error = %error, "Operation rejected");
            settler.reject(error);
        },
    }
}

fn execute(operation: &dyn Operation, args: &[HostValue]) -> BridgeResult<String> {
    operation
        .contract()
        .check_arity(operation.name(), args.len())?;
    operation.call(args)
}

/// Text of a panic payload. `panic!` produces `&str` or `String`.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
