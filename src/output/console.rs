//! Human-readable listener output

use async_trait::async_trait;
use std::io::{self, Write};

use crate::common::errors::Result;
use crate::common::traits::OddsSink;
use crate::common::types::ListenerEvent;

/// Writes every listener event as text, one block per event
pub struct ConsoleSink<W> {
    writer: W,
}

impl ConsoleSink<io::Stdout> {
    /// Sink printing to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: Write + Send> OddsSink for ConsoleSink<W> {
    async fn emit(&mut self, event: ListenerEvent) -> Result<()> {
        writeln!(self.writer, "{}", event)?;
        if matches!(event, ListenerEvent::OddsUpdate(_)) {
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
