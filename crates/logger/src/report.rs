//! Reporting of delivery errors raised inside the tree

use dispatcher::DispatcherError;
use tracing::error;

/// Error callback handed to `Dispatcher::dispatch`
pub(crate) fn report_delivery_error(err: DispatcherError) {
    if let DispatcherError::Write { sink_name, .. } = &err {
        observability::record_write_failure(sink_name);
    }
    error!(error = %err, "Log delivery failed");
}
