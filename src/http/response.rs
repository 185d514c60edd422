//! Response body wrapper that reports when the response is finished.
//!
//! # Design Decisions
//! - "Finished" means the body stream ended, errored, or was dropped
//!   (fully written or connection gone), whichever comes first
//! - The callback runs at most once
//! - Frames, size hints and end-of-stream are passed through untouched

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use http_body::{Body as HttpBody, Frame, SizeHint};

type OnComplete = Box<dyn FnOnce() + Send>;

pub(crate) struct CompletionBody {
    inner: Body,
    on_complete: Option<OnComplete>,
}

impl CompletionBody {
    pub(crate) fn new(inner: Body, on_complete: impl FnOnce() + Send + 'static) -> Self {
        Self {
            inner,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    fn complete(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }
}

impl HttpBody for CompletionBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let polled = Pin::new(&mut self.inner).poll_frame(cx);
        if matches!(polled, Poll::Ready(None) | Poll::Ready(Some(Err(_)))) {
            self.complete();
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CompletionBody {
    fn drop(&mut self) {
        self.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted(inner: Body) -> (CompletionBody, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let body = CompletionBody::new(inner, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (body, calls)
    }

    #[tokio::test]
    async fn test_fires_once_after_stream_end() {
        let (body, calls) = counted(Body::from("hello"));
        assert_eq!(http_body::Body::size_hint(&body).exact(), Some(5));

        let bytes = axum::body::to_bytes(Body::new(body), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fires_on_drop_without_polling() {
        let (body, calls) = counted(Body::empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        drop(body);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
