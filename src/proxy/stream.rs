//! Response body streaming.
//!
//! Once headers are committed the only way to report a failure is the access
//! log, so the body stream itself records the request's terminal outcome:
//! `info` once the whole body has been handed over, `error` when reading it
//! fails or when the client goes away first.
//!
//! With a declared `Content-Length` the server stops polling after that many
//! bytes and drops the body without seeing end of stream, so completion is
//! judged by the byte count.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt};

use crate::observability::access_log::{self, AccessEntry, Outcome};
use crate::proxy::forward::ForwardError;

/// Body stream that logs how the transfer ended.
pub struct LoggedBody {
    inner: BoxStream<'static, reqwest::Result<Bytes>>,
    entry: Option<AccessEntry>,
    status: u16,
    expected: Option<u64>,
    sent: u64,
}

impl LoggedBody {
    pub fn new(response: reqwest::Response, entry: AccessEntry) -> Self {
        let status = response.status().as_u16();
        let expected = response.content_length();
        Self {
            inner: response.bytes_stream().boxed(),
            entry: Some(entry),
            status,
            expected,
            sent: 0,
        }
    }

    fn is_complete(&self) -> bool {
        self.expected.is_some_and(|expected| self.sent >= expected)
    }

    fn finish(&mut self, outcome: Outcome, detail: Option<&dyn std::fmt::Display>) {
        if let Some(entry) = self.entry.take() {
            access_log::record(outcome, &entry, self.status, detail);
        }
    }
}

impl Stream for LoggedBody {
    type Item = Result<Bytes, ForwardError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                self.sent += chunk.len() as u64;
                if self.is_complete() {
                    self.finish(Outcome::Info, None);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                let err = ForwardError::Streaming(e);
                self.finish(Outcome::Error, Some(&err));
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                self.finish(Outcome::Info, None);
                Poll::Ready(None)
            }
        }
    }
}

impl Drop for LoggedBody {
    fn drop(&mut self) {
        if self.is_complete() {
            self.finish(Outcome::Info, None);
        } else {
            self.finish(Outcome::Error, Some(&"client disconnected before transfer completed"));
        }
    }
}
