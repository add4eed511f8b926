// SPDX-License-Identifier: MIT

/// Failures that escape the turn boundary rather than becoming in-history
/// text, as a closed error-kind set — this excludes the kinds that are
/// always captured as `ToolResult`/apology content instead.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// The `generate_response -> call_tools` loop hit the bound `K` without
    /// the model settling on a tool-call-free answer.
    #[error("tool loop exceeded {limit} round trips")]
    LoopLimitExceeded { limit: u32 },

    /// The enclosing turn was cancelled mid-flight.
    #[error("turn cancelled")]
    Cancelled,
}
