//! Concrete content sinks: an in-memory buffer and a streaming channel.

use std::{
    num::NonZeroUsize,
    pin::Pin,
    task::{Context, Poll},
};

use async_stream::stream;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::Stream;
use tokio::sync::mpsc;

use crate::domain::content::{Content, ContentSink, SinkError};

/// Collects everything written into memory. Used to capture a content page's
/// body and the output of intermediate layouts.
#[derive(Debug, Default)]
pub struct BufferSink {
    buffer: BytesMut,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn into_content(self) -> Content {
        Content::from(self.buffer.freeze())
    }
}

#[async_trait]
impl ContentSink for BufferSink {
    async fn write(&mut self, content: &Content) -> Result<(), SinkError> {
        self.buffer.extend_from_slice(content.as_bytes());
        Ok(())
    }
}

/// Sink half of a bounded streaming channel. Each non-empty write becomes one
/// chunk on the paired [`ContentStream`]; writers wait while the channel is full.
#[derive(Debug, Clone)]
pub struct StreamSink {
    sender: mpsc::Sender<Bytes>,
}

#[async_trait]
impl ContentSink for StreamSink {
    async fn write(&mut self, content: &Content) -> Result<(), SinkError> {
        if content.is_empty() {
            return Ok(());
        }
        self.sender
            .send(content.as_bytes().clone())
            .await
            .map_err(|_| SinkError::Closed)
    }
}

/// Receiving half of a streaming channel. Ends once every [`StreamSink`] clone
/// has been dropped.
pub struct ContentStream {
    inner: Pin<Box<dyn Stream<Item = Bytes> + Send>>,
}

impl Stream for ContentStream {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Create a streaming sink holding at most `capacity` pending chunks.
pub fn stream_channel(capacity: NonZeroUsize) -> (StreamSink, ContentStream) {
    let (sender, mut receiver) = mpsc::channel::<Bytes>(capacity.get());
    let chunks = stream! {
        while let Some(chunk) = receiver.recv().await {
            yield chunk;
        }
    };

    (
        StreamSink { sender },
        ContentStream {
            inner: Box::pin(chunks),
        },
    )
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn buffer_sink_appends_in_order() {
        let mut sink = BufferSink::with_capacity(16);
        sink.write_str("<main>").await.expect("write");
        sink.write(&Content::from_static("hello")).await.expect("write");
        sink.write_str("</main>").await.expect("write");

        assert_eq!(sink.len(), 18);
        assert_eq!(sink.into_content().to_string(), "<main>hello</main>");
    }

    #[tokio::test]
    async fn stream_sink_yields_non_empty_chunks() {
        let capacity = NonZeroUsize::new(4).expect("non-zero");
        let (mut sink, stream) = stream_channel(capacity);

        sink.write_str("a").await.expect("write");
        sink.write(&Content::empty()).await.expect("empty write");
        sink.write_str("b").await.expect("write");
        drop(sink);

        let chunks: Vec<Bytes> = stream.collect().await;
        assert_eq!(chunks, vec![Bytes::from("a"), Bytes::from("b")]);
    }

    #[tokio::test]
    async fn writing_after_receiver_dropped_fails() {
        let capacity = NonZeroUsize::new(1).expect("non-zero");
        let (mut sink, stream) = stream_channel(capacity);
        drop(stream);

        let err = sink.write_str("late").await.expect_err("closed");
        assert_eq!(err, SinkError::Closed);
    }
}
