//! Polling subscriptions for the REST store.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::trace;

use folio_core::{ListenerStream, Result};

/// Build a listener that re-runs `fetch` every `interval`.
///
/// The first snapshot is fetched immediately. Later snapshots are yielded
/// only when they differ from the previous one. The first error ends the
/// stream after being yielded.
pub(crate) fn poll<T, F, Fut>(interval: Duration, fetch: F) -> ListenerStream<T>
where
    T: PartialEq + Clone + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last: Option<T> = None;

        loop {
            ticker.tick().await;

            match fetch().await {
                Ok(snapshot) => {
                    if last.as_ref() != Some(&snapshot) {
                        last = Some(snapshot.clone());
                        yield Ok(snapshot);
                    } else {
                        trace!("Snapshot unchanged");
                    }
                }
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    };

    ListenerStream::new(stream)
}
