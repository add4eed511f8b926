// SPDX-License-Identifier: MIT
//! Terminal/pipe input source and output sink for [`agentflow_core::Session`]'s
//! continuous mode.

use std::io::{self, BufRead, IsTerminal, Write};

use agentflow_core::{InputSource, OutputSink};

/// Reads lines from stdin, printing a prompt first when stdin is a terminal;
/// otherwise reads line-by-line with no prompt.
pub struct StdinSource {
    interactive: bool,
    lines: io::Lines<io::StdinLock<'static>>,
}

impl StdinSource {
    pub fn new() -> Self {
        let stdin = io::stdin();
        Self {
            interactive: stdin.is_terminal(),
            lines: stdin.lock().lines(),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for StdinSource {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if self.interactive {
            print!("{prompt}");
            let _ = io::stdout().flush();
        }
        match self.lines.next() {
            Some(Ok(line)) => Some(line),
            Some(Err(_)) | None => None,
        }
    }
}

/// Echoes piped input lines to stdout so transcripts stay faithful under
/// piping.
#[derive(Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn echo_line(&mut self, line: &str) {
        println!("{line}");
    }
}
