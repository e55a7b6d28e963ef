//! Logging utilities for expansion sessions and layout passes.
//!
//! Emits through `tracing` when the `tracing` feature is on, otherwise falls back to stderr.

use crate::layout::{FitViewOptions, LayoutError};
use crate::schema::ValidationRejected;
use crate::session::{SessionError, SessionId};

/// Log a new expansion session.
pub fn log_session_submitted(session: SessionId, parent_id: &str) {
    #[cfg(feature = "tracing")]
    tracing::info!(session = session.0, parent_id = parent_id, "Expansion submitted");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[INFO] Expansion submitted: session {} parent {}", session.0, parent_id);
}

/// Log that the generator accepted the request and records are streaming.
pub fn log_session_streaming(session: SessionId, parent_id: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(session = session.0, parent_id = parent_id, "Expansion streaming");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] Expansion streaming: session {} parent {}", session.0, parent_id);
}

/// Log one record dropped by schema validation.
pub fn log_record_rejected(parent_id: &str, rejected: &ValidationRejected) {
    #[cfg(feature = "tracing")]
    tracing::warn!(parent_id = parent_id, index = rejected.index, reason = %rejected.reason, "Record rejected");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[WARN] Record rejected under {}: {}", parent_id, rejected);
}

/// Log records ignored past the per-session bound.
pub fn log_record_overflow(parent_id: &str, ignored: usize, max_records: usize) {
    #[cfg(feature = "tracing")]
    tracing::warn!(parent_id = parent_id, ignored, max_records, "Records beyond limit ignored");

    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "[WARN] {} records beyond limit {} ignored under {}",
        ignored, max_records, parent_id
    );
}

pub fn log_session_committed(session: SessionId, parent_id: &str, nodes: usize, rejected: usize) {
    #[cfg(feature = "tracing")]
    tracing::info!(session = session.0, parent_id = parent_id, nodes, rejected, "Expansion committed");

    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "[INFO] Expansion committed: session {} parent {} ({} nodes, {} rejected)",
        session.0, parent_id, nodes, rejected
    );
}

pub fn log_session_failed(session: SessionId, error: &SessionError) {
    #[cfg(feature = "tracing")]
    tracing::error!(session = session.0, %error, "Expansion failed");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[ERROR] Expansion failed: session {}: {}", session.0, error);
}

pub fn log_session_cancelled(session: SessionId, parent_id: &str) {
    #[cfg(feature = "tracing")]
    tracing::info!(session = session.0, parent_id = parent_id, "Expansion cancelled");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[INFO] Expansion cancelled: session {} parent {}", session.0, parent_id);
}

/// Log a report dropped because its session was cancelled, superseded or orphaned.
pub fn log_report_discarded(session: SessionId, parent_id: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(session = session.0, parent_id = parent_id, "Stale report discarded");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] Stale report discarded: session {} parent {}", session.0, parent_id);
}

pub fn log_layout_pass(nodes: usize, roots: usize) {
    #[cfg(feature = "tracing")]
    tracing::debug!(nodes, roots, "Layout pass");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] Layout pass: {} nodes, {} roots", nodes, roots);
}

pub fn log_layout_error(error: &LayoutError) {
    #[cfg(feature = "tracing")]
    tracing::error!(%error, "Layout failed; positions left unchanged");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[ERROR] Layout failed; positions left unchanged: {}", error);
}

pub fn log_fit_view(options: &FitViewOptions) {
    #[cfg(feature = "tracing")]
    tracing::debug!(duration_ms = options.duration_ms, padding = options.padding, "Fit view");

    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "[DEBUG] Fit view: duration {}ms padding {}",
        options.duration_ms, options.padding
    );
}
