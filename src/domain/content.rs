//! Writable content handles and the sink abstraction pages write into.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Immutable markup fragment. Written to sinks verbatim.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Content {
    bytes: Bytes,
}

impl Content {
    /// The sentinel returned by pull operations whose output was already
    /// written as a side effect.
    pub const fn empty() -> Self {
        Self {
            bytes: Bytes::new(),
        }
    }

    pub fn from_markup(markup: impl Into<String>) -> Self {
        Self {
            bytes: Bytes::from(markup.into()),
        }
    }

    pub const fn from_static(markup: &'static str) -> Self {
        Self {
            bytes: Bytes::from_static(markup.as_bytes()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Lossy UTF-8 view, mainly for tests and logging.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl From<Bytes> for Content {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl From<String> for Content {
    fn from(markup: String) -> Self {
        Self::from_markup(markup)
    }
}

impl From<&'static str> for Content {
    fn from(markup: &'static str) -> Self {
        Self::from_static(markup)
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Content")
            .field(&String::from_utf8_lossy(&self.bytes))
            .finish()
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("output sink closed before the render pass finished")]
    Closed,
}

/// Append-only destination for rendered content.
///
/// Implementations never expose what was written back to writers.
#[async_trait]
pub trait ContentSink: Send {
    async fn write(&mut self, content: &Content) -> Result<(), SinkError>;

    async fn write_str(&mut self, markup: &str) -> Result<(), SinkError> {
        self.write(&Content::from_markup(markup)).await
    }
}
