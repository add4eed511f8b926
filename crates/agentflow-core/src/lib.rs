// SPDX-License-Identifier: MIT
mod cancel;
mod error;
mod events;
mod format;
mod graph;
mod session;
mod state;
mod workflow;

pub use cancel::CancelHandle;
pub use error::WorkflowError;
pub use events::{chunk_text, AgentEvent, StepStatus};
pub use format::format_output;
pub use graph::{build_graph, to_json, to_mermaid, GraphNode, GraphSpec, GraphToolInfo, NodeKind};
pub use session::{InputSource, OutputSink, Session};
pub use state::{AgentState, ConversationState};
pub use workflow::{run_turn, TurnOutcome};
