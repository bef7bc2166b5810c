//! Bounded-concurrency upload pool.
//!
//! A fixed set of workers drains a shared queue. The worker count is the
//! concurrency limit, so at most that many uploads are ever in flight.
//! The first failure trips a cancellation token: no worker picks up a new
//! task afterwards, uploads already running are allowed to finish.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Concurrency;
use crate::error::PublishError;
use crate::transport::ArtifactSink;
use crate::types::{UploadSummary, UploadTask};

/// Uploads every task through `sink` with at most `concurrency` in flight.
///
/// Tasks are taken from the back of the list; completion order is
/// unspecified. Returns the first failure observed.
pub async fn upload_all(
    tasks: Vec<UploadTask>,
    concurrency: Concurrency,
    sink: Arc<dyn ArtifactSink>,
) -> Result<UploadSummary, PublishError> {
    let total = tasks.len();
    if total == 0 {
        return Ok(UploadSummary::default());
    }

    let workers = concurrency.workers_for(total);
    debug!(tasks = total, workers, "starting upload pool");

    let queue = Arc::new(Mutex::new(tasks));
    let cancel = CancellationToken::new();
    let gauge = Arc::new(InFlight::default());

    let mut set = JoinSet::new();
    for _ in 0..workers {
        set.spawn(worker(
            queue.clone(),
            sink.clone(),
            cancel.clone(),
            gauge.clone(),
        ));
    }

    let mut uploaded = 0;
    let mut first_error = None;
    while let Some(joined) = set.join_next().await {
        let result = joined.map_err(PublishError::from).and_then(|r| r);
        match result {
            Ok(n) => uploaded += n,
            Err(e) => {
                cancel.cancel();
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    let summary = UploadSummary {
        uploaded,
        peak_in_flight: gauge.peak(),
    };
    info!(
        uploaded = summary.uploaded,
        peak_in_flight = summary.peak_in_flight,
        "upload pool finished"
    );
    Ok(summary)
}

async fn worker(
    queue: Arc<Mutex<Vec<UploadTask>>>,
    sink: Arc<dyn ArtifactSink>,
    cancel: CancellationToken,
    gauge: Arc<InFlight>,
) -> Result<usize, PublishError> {
    let mut uploaded = 0;

    loop {
        if cancel.is_cancelled() {
            return Ok(uploaded);
        }
        // Lock is released before the upload starts.
        let Some(task) = queue.lock().await.pop() else {
            return Ok(uploaded);
        };

        let _slot = gauge.enter();
        if let Err(e) = sink.upload(&task).await {
            warn!(asset = %task.name, error = %e, "upload failed");
            cancel.cancel();
            return Err(e);
        }
        uploaded += 1;
    }
}

/// Tracks current and peak number of uploads in flight.
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) -> InFlightSlot<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightSlot(self)
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

struct InFlightSlot<'a>(&'a InFlight);

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}
