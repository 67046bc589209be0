//! # Listen Sessions
//!
//! A [`ListenSession`] is the consuming side of one subscription: a lazy,
//! infinite, non-restartable sequence of delivered events. The sequence has
//! three distinct endings: completed (graceful close), cancelled (the
//! session was dropped), and errored (transport failure, signalled by one
//! terminal [`ListenError`] item).
//!
//! Dropping a session unregisters its subscription, so cancellation removes
//! the handle from the table no later than the moment the sequence ends.

use crate::subscriptions::{SubscriptionEntry, SubscriptionId, SubscriptionTable};
use relay_types::{EventEnvelope, ServiceId};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio_stream::Stream;
use tracing::debug;

/// Terminal error of a listen sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListenError {
    /// The session's transport closed; no further events will arrive.
    #[error("transport closed")]
    TransportClosed,
}

/// The consuming half of one subscription.
///
/// Receive events with [`recv`](Self::recv), or convert into an
/// [`EventStream`] for combinator use. Dropping the session cancels the
/// subscription and removes it from the table.
pub struct ListenSession {
    entry: Arc<SubscriptionEntry>,
    table: Arc<SubscriptionTable>,
    finished: bool,
}

impl ListenSession {
    pub(crate) fn new(entry: Arc<SubscriptionEntry>, table: Arc<SubscriptionTable>) -> Self {
        Self {
            entry,
            table,
            finished: false,
        }
    }

    /// This session's subscription id.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.entry.id()
    }

    /// The service this session listens to.
    #[must_use]
    pub fn service(&self) -> &ServiceId {
        self.entry.service()
    }

    /// Receive the next delivered event.
    ///
    /// # Returns
    ///
    /// - `Some(Ok(envelope))` - the next event, in router processing order
    /// - `Some(Err(_))` - the transport failed; this is the final item
    /// - `None` - the sequence ended (graceful close, or after the error item)
    pub async fn recv(&mut self) -> Option<Result<Arc<EventEnvelope>, ListenError>> {
        if self.finished {
            return None;
        }
        match self.entry.queue().pop().await {
            Ok(Some(envelope)) => Some(Ok(envelope)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(_) => {
                self.finished = true;
                Some(Err(ListenError::TransportClosed))
            }
        }
    }

    /// Cancel the session, unregistering its subscription.
    ///
    /// Dropping the session has the same effect; this form just makes the
    /// intent explicit at call sites.
    pub fn cancel(self) {
        drop(self);
    }

    /// Tear the session down after a transport failure.
    ///
    /// Transitions the subscription `Open → Errored → Closed` and removes
    /// it; a racing dispatch sees the closed queue, never the dead
    /// transport.
    pub fn abort(&mut self) {
        self.finished = true;
        self.entry.mark_errored();
        self.table.unregister(self.id());
        debug!(subscription = %self.id(), "listen session aborted");
    }

    /// Convert into a [`Stream`] of delivered events.
    #[must_use]
    pub fn into_stream(self) -> EventStream {
        EventStream::new(self)
    }
}

impl Drop for ListenSession {
    fn drop(&mut self) {
        self.table.unregister(self.entry.id());
    }
}

type RecvFuture = Pin<
    Box<
        dyn Future<Output = (ListenSession, Option<Result<Arc<EventEnvelope>, ListenError>>)>
            + Send,
    >,
>;

enum StreamState {
    Idle(ListenSession),
    Waiting(RecvFuture),
    Done,
}

/// A stream wrapper for listen sessions.
///
/// Implements [`tokio_stream::Stream`] for use with stream combinators.
/// Dropping the stream cancels the underlying subscription.
pub struct EventStream {
    state: StreamState,
}

impl EventStream {
    /// Wrap a session in a stream.
    #[must_use]
    pub fn new(session: ListenSession) -> Self {
        Self {
            state: StreamState::Idle(session),
        }
    }
}

impl Stream for EventStream {
    type Item = Result<Arc<EventEnvelope>, ListenError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match std::mem::replace(&mut self.state, StreamState::Done) {
                StreamState::Idle(mut session) => {
                    self.state = StreamState::Waiting(Box::pin(async move {
                        let item = session.recv().await;
                        (session, item)
                    }));
                }
                StreamState::Waiting(mut future) => match future.as_mut().poll(cx) {
                    Poll::Ready((session, Some(item))) => {
                        self.state = StreamState::Idle(session);
                        return Poll::Ready(Some(item));
                    }
                    Poll::Ready((_session, None)) => return Poll::Ready(None),
                    Poll::Pending => {
                        self.state = StreamState::Waiting(future);
                        return Poll::Pending;
                    }
                },
                StreamState::Done => return Poll::Ready(None),
            }
        }
    }
}
