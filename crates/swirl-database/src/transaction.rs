//! Optimistic read-modify-write over ETag conditional writes.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::database::Database;
use crate::error::{DatabaseError, DatabaseResult};
use crate::metrics::record_transaction_conflict;
use crate::path::DatabasePath;

/// Apply `apply` to the node at `path` until the conditional write sticks.
///
/// `apply` receives the current value (`None` when absent) and returns the new
/// value; an error from `apply` aborts the transaction. Returns the value that
/// was written.
pub async fn run_transaction<F>(
    db: &dyn Database,
    path: &DatabasePath,
    max_attempts: u32,
    mut apply: F,
) -> DatabaseResult<Value>
where
    F: FnMut(Option<&Value>) -> DatabaseResult<Value> + Send,
{
    let attempts = max_attempts.max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        let current = db.get_versioned(path).await?;
        let next = apply(current.value.as_ref())?;

        match db.set_if_match(path, &next, &current.etag).await {
            Ok(()) => return Ok(next),
            Err(e) if e.is_precondition_failed() => {
                debug!(
                    "Conditional write to {} lost a race (attempt {}), retrying",
                    path,
                    attempt + 1
                );
                record_transaction_conflict();
                last_error = Some(e);
                if attempt + 1 < attempts {
                    tokio::time::sleep(Duration::from_millis(50 * (attempt as u64 + 1))).await;
                }
            }
            Err(e) => return Err(e),
        }
    }

    warn!(
        "Transaction on {} failed after {} attempts: {:?}",
        path, attempts, last_error
    );
    Err(DatabaseError::PreconditionFailed(format!(
        "{} changed concurrently on each of {} attempts",
        path, attempts
    )))
}
