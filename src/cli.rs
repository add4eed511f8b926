// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for the global `--output` flag. Only `info` and
/// `agent export` consult this; `chat`'s answer is always plain text on
/// stdout regardless of the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormatArg {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Graph export format for `agent export --format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormatArg {
    #[default]
    Mermaid,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "agentflow",
    about = "An interactive CLI agent that dispatches natural-language input to an LLM, drives a tool-use loop, and streams the answer back to the terminal",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (debug-level tracing on stderr).
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all but warning/error log output.
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format for `info` / `agent export` (text | json | yaml).
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormatArg,

    /// Path to the YAML config file (default: `<project_root>/settings.yaml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with the agent. One-shot if QUESTION is given or `--once` is
    /// passed; otherwise a continuous session until `/bye` or EOF.
    Chat {
        /// The question to ask. If omitted, starts a continuous session.
        question: Option<String>,

        /// Force one-shot mode even without a QUESTION (reads nothing
        /// further from stdin).
        #[arg(long)]
        once: bool,

        /// Disable streaming output; render the full answer once it's ready.
        #[arg(long)]
        no_stream: bool,

        /// Write a Markdown transcript to this path on exit.
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,

        /// Emit `workflow_step` events for each node entry/exit.
        #[arg(long)]
        debug: bool,
    },

    /// Print version, tool table, and remote tool-provider server table.
    Info,

    /// Print the version string.
    Version,

    /// Copy the sample config template to the live config path if absent.
    Setup,

    /// Workflow graph introspection and export.
    Agent {
        #[command(subcommand)]
        command: AgentCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// Emit the workflow graph as Mermaid or JSON.
    Export {
        /// Output format.
        #[arg(long, value_enum, default_value = "mermaid")]
        format: ExportFormatArg,

        /// Write to this path instead of stdout.
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Generate the `description` field from the configured model
        /// instead of a canned summary (JSON: the `description` field;
        /// Mermaid: a trailing prose section). Falls back to the canned
        /// description on any model failure.
        #[arg(long)]
        ai_description: bool,
    },
}
