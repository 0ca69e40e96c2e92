use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::web::Bytes;
use futures_util::Stream;
use tokio::time::{self, Interval, MissedTickBehavior};

use super::broadcaster::{EventBroadcaster, Subscriber, SubscriberId};
use super::message::KEEP_ALIVE_FRAME;

/// Longest accepted gap between keep-alive frames.
pub const MAX_KEEP_ALIVE: Duration = Duration::from_secs(24 * 60 * 60);

/// One client's event stream, used directly as a streaming response body.
///
/// The subscription lives exactly as long as this value: dropping it (client
/// went away, response finished, server shutting down) unregisters it.
pub struct StreamConnection {
    broadcaster: EventBroadcaster,
    subscriber: Subscriber,
    keep_alive: Interval,
}

impl StreamConnection {
    pub fn open(broadcaster: &EventBroadcaster, keep_alive: Duration) -> Self {
        let subscriber = broadcaster.subscribe();

        let period = keep_alive.clamp(Duration::from_millis(1), MAX_KEEP_ALIVE);
        let mut keep_alive = time::interval_at(time::Instant::now() + period, period);
        keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            broadcaster: broadcaster.clone(),
            subscriber,
            keep_alive,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.subscriber.id()
    }
}

impl Stream for StreamConnection {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match this.subscriber.receiver_mut().poll_recv(cx) {
            Poll::Ready(Some(frame)) => {
                this.keep_alive.reset();
                return Poll::Ready(Some(Ok(frame)));
            }
            // evicted by the broadcaster
            Poll::Ready(None) => return Poll::Ready(None),
            Poll::Pending => {}
        }

        match this.keep_alive.poll_tick(cx) {
            Poll::Ready(_) => Poll::Ready(Some(Ok(Bytes::from_static(KEEP_ALIVE_FRAME)))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for StreamConnection {
    fn drop(&mut self) {
        self.broadcaster.unsubscribe(self.subscriber.id());
    }
}
