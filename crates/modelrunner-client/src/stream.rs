//! Streaming decoders for progress and chat responses
//!
//! Pull and push answer with newline-delimited JSON progress messages, HTML-escaped by the
//! server. Chat answers with `data: ` lines terminated by `data: [DONE]`.

use futures::Stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use crate::{
    error::ClientError,
    models::{OpenAIChatResponse, ProgressMessage},
    Result,
};

/// Prefix of every chat data line
pub const DATA_PREFIX: &str = "data: ";

/// Chat end-of-stream marker
pub const DONE_MARKER: &str = "[DONE]";

/// One decoded progress message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Progress(String),
    Success(String),
    Error(String),
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressEvent::Progress(_))
    }

    pub fn message(&self) -> &str {
        match self {
            ProgressEvent::Progress(m) | ProgressEvent::Success(m) | ProgressEvent::Error(m) => m,
        }
    }
}

/// Which streamed operation is being decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOperation {
    Pull,
    Push,
}

impl StreamOperation {
    /// Verb used in failure messages
    pub fn verb(&self) -> &'static str {
        match self {
            StreamOperation::Pull => "pulling",
            StreamOperation::Push => "pushing",
        }
    }
}

/// Decoder lifecycle.
///
/// `AwaitingTerminal` until a `success` or `error` message is produced, then
/// `TerminalReached`; `Closed` once nothing more will be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    AwaitingTerminal,
    TerminalReached,
    Closed,
}

/// Decode one progress line: unescape, parse, classify
pub fn decode_progress_line(line: &str) -> Result<ProgressEvent> {
    let unescaped = html_escape::decode_html_entities(line);
    let message: ProgressMessage =
        serde_json::from_str(&unescaped).map_err(|source| ClientError::Decode {
            what: "progress message",
            source,
        })?;

    match message.kind.as_str() {
        "progress" => Ok(ProgressEvent::Progress(message.message)),
        "success" => Ok(ProgressEvent::Success(message.message)),
        "error" => Ok(ProgressEvent::Error(message.message)),
        _ => Err(ClientError::UnknownMessageType(message.kind)),
    }
}

/// Lazy decoder over a pull or push progress stream
pub struct ProgressDecoder<R> {
    lines: Lines<R>,
    state: StreamState,
    operation: StreamOperation,
    model: String,
}

impl<R: AsyncBufRead + Unpin> ProgressDecoder<R> {
    pub fn new(reader: R, operation: StreamOperation, model: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            state: StreamState::AwaitingTerminal,
            operation,
            model: model.into(),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Next event, `Ok(None)` once closed.
    ///
    /// Hitting the end of input before a terminal message is an error, as is any line that does
    /// not decode. Either closes the decoder.
    pub async fn next_event(&mut self) -> Result<Option<ProgressEvent>> {
        match self.state {
            StreamState::Closed => return Ok(None),
            StreamState::TerminalReached => {
                self.state = StreamState::Closed;
                return Ok(None);
            }
            StreamState::AwaitingTerminal => {}
        }

        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.state = StreamState::Closed;
                    return Err(ClientError::StreamTruncated {
                        operation: self.operation.verb(),
                        model: self.model.clone(),
                    });
                }
                Err(e) => {
                    self.state = StreamState::Closed;
                    return Err(ClientError::Stream(e));
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let event = match decode_progress_line(&line) {
                Ok(event) => event,
                Err(e) => {
                    self.state = StreamState::Closed;
                    return Err(e);
                }
            };

            if event.is_terminal() {
                self.state = StreamState::TerminalReached;
            }
            debug!("{} {}: {:?}", self.operation.verb(), self.model, event);
            return Ok(Some(event));
        }
    }

    /// Drive to the terminal message, handing each progress message to `sink`.
    ///
    /// Returns the success message; an `error` message becomes [`ClientError::Operation`].
    pub async fn finish(mut self, mut sink: impl FnMut(&str)) -> Result<String> {
        while let Some(event) = self.next_event().await? {
            match event {
                ProgressEvent::Progress(message) => sink(&message),
                ProgressEvent::Success(message) => return Ok(message),
                ProgressEvent::Error(message) => {
                    return Err(ClientError::Operation {
                        operation: self.operation.verb(),
                        message,
                    })
                }
            }
        }

        Err(ClientError::StreamTruncated {
            operation: self.operation.verb(),
            model: self.model,
        })
    }

    /// Adapt into a `Stream` of events; it ends after the first terminal event or error
    pub fn into_stream(self) -> impl Stream<Item = Result<ProgressEvent>> {
        futures::stream::unfold(self, |mut decoder| async move {
            match decoder.next_event().await {
                Ok(Some(event)) => Some((Ok(event), decoder)),
                Ok(None) => None,
                Err(e) => Some((Err(e), decoder)),
            }
        })
    }
}

/// Lazy decoder over a chat completion stream
pub struct ChatDecoder<R> {
    lines: Lines<R>,
    done: bool,
}

impl<R: AsyncBufRead + Unpin> ChatDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            done: false,
        }
    }

    /// Next non-empty delta, `Ok(None)` at `[DONE]` or end of input
    pub async fn next_delta(&mut self) -> Result<Option<String>> {
        while !self.done {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Err(ClientError::Stream(e));
                }
            };

            let Some(data) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };

            if data.trim() == DONE_MARKER {
                self.done = true;
                break;
            }

            let chunk: OpenAIChatResponse = match serde_json::from_str(data) {
                Ok(chunk) => chunk,
                Err(source) => {
                    self.done = true;
                    return Err(ClientError::Decode {
                        what: "stream response",
                        source,
                    });
                }
            };

            if let Some(text) = chunk.delta_text() {
                return Ok(Some(text.to_string()));
            }
        }

        Ok(None)
    }

    /// Forward every delta to `sink` until the stream ends
    pub async fn finish(mut self, mut sink: impl FnMut(&str)) -> Result<()> {
        while let Some(delta) = self.next_delta().await? {
            sink(&delta);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_unescapes_before_parsing() {
        let line = r#"{&#34;type&#34;:&#34;progress&#34;,&#34;message&#34;:&#34;Downloaded 1 of 2&#34;}"#;
        assert_eq!(
            decode_progress_line(line).unwrap(),
            ProgressEvent::Progress("Downloaded 1 of 2".to_string())
        );
    }

    #[test]
    fn test_decode_unknown_type() {
        let err = decode_progress_line(r#"{"type":"warning","message":"x"}"#).unwrap_err();
        assert_eq!(err.to_string(), "unknown message type: warning");
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode_progress_line("not json").unwrap_err();
        assert!(err.is_decode());
    }
}
