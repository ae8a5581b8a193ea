use crate::error::{ErrorBody, GameError, Result};
use crate::interfaces::csv::command_reader::Action;
use serde::Serialize;
use std::io::Write;

/// One JSON line describing the outcome of a command.
#[derive(Debug, Serialize)]
pub struct Response {
    pub action: Action,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn ok(action: Action, status: u16, result: Option<serde_json::Value>) -> Self {
        Self {
            action,
            status,
            result,
            error: None,
        }
    }

    pub fn failed(action: Action, err: &GameError) -> Self {
        Self {
            action,
            status: err.status_code(),
            result: None,
            error: Some(err.to_body()),
        }
    }
}

/// Writes responses as newline-delimited JSON.
pub struct ResponseWriter<W: Write> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_response(&mut self, response: &Response) -> Result<()> {
        serde_json::to_writer(&mut self.writer, response)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
