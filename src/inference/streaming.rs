//! Events emitted during streaming generation.

use std::fmt;

use serde::Serialize;

/// Why a generation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A stop token (EOS/PAD by default) was sampled; it is kept in the output.
    EndToken,
    /// `max_length` new tokens were generated.
    MaxLength,
    /// The sequence reached `max_sequence_length`.
    ContextFull,
    /// The token callback asked to stop.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::EndToken => "end token",
            StopReason::MaxLength => "max length",
            StopReason::ContextFull => "context full",
            StopReason::Cancelled => "cancelled",
        })
    }
}

/// Event passed to the callback of
/// [`TextGenerator::generate_streaming`](super::TextGenerator::generate_streaming).
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationToken {
    /// A token was sampled and appended at `position` of the sequence.
    Token { id: usize, position: usize },
    /// Generation finished; always the last event.
    Done {
        reason: StopReason,
        total_tokens: usize,
        time_ms: f64,
    },
}
