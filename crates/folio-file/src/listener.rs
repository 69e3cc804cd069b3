//! Change subscriptions for the file-backed store.

use std::path::Path;

use notify::{RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, trace};

use folio_core::Result;
use folio_core::error::Error;
use folio_core::ListenerStream;

use crate::store::CHANGE_LOG;

/// Build a listener that re-reads a snapshot whenever the store changes.
///
/// Changes are noticed two ways: commits made through this process arrive
/// on `notices`, and commits from other processes are seen by a watcher on
/// the change log. The stream owns both; dropping it stops watching. A
/// snapshot is only yielded when it differs from the previous one.
pub(crate) fn watch<T, F>(
    root: &Path,
    notices: &broadcast::Sender<()>,
    fetch: F,
) -> Result<ListenerStream<T>>
where
    T: PartialEq + Clone + Send + 'static,
    F: Fn() -> Result<T> + Send + 'static,
{
    std::fs::create_dir_all(root)
        .map_err(|e| Error::storage(format!("failed to create store directory: {}", e)))?;

    let (tx, mut changed) = mpsc::channel::<()>(16);

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let Ok(event) = res else {
            return;
        };
        if !matches!(
            event.kind,
            notify::EventKind::Modify(_) | notify::EventKind::Create(_)
        ) {
            return;
        }
        let is_change_log = event
            .paths
            .iter()
            .any(|p| p.file_name().is_some_and(|n| n == CHANGE_LOG));
        if is_change_log {
            // A full channel already has a wakeup pending.
            let _ = tx.try_send(());
        }
    })
    .map_err(|e| Error::storage(format!("failed to create file watcher: {}", e)))?;

    watcher
        .watch(root, RecursiveMode::NonRecursive)
        .map_err(|e| Error::storage(format!("failed to watch store directory: {}", e)))?;

    let mut notices = notices.subscribe();

    let stream = async_stream::stream! {
        let _watcher = watcher;
        let mut last: Option<T> = None;

        loop {
            match fetch() {
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

            tokio::select! {
                notice = notices.recv() => {
                    if matches!(notice, Err(broadcast::error::RecvError::Closed)) {
                        debug!("Store closed, ending listener");
                        break;
                    }
                }
                Some(()) = changed.recv() => {}
                else => break,
            }
        }
    };

    Ok(ListenerStream::new(stream))
}
