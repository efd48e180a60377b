//! Download worker pool.
//!
//! A fixed number of workers share one unbounded task queue. Each task is
//! received by exactly one worker. Workers stop once every [`TaskQueue`]
//! handle is dropped and the queue is empty, which makes
//! [`WorkerPool::join`] the drain barrier for a run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::download::fetch::{FetchOutcome, Fetcher};
use crate::download::state::{DownloadState, RunStats};
use crate::error::{Error, Result};
use crate::fs::medium_target;
use crate::media::{resolve, Task};

/// Producer handle of the shared task queue.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<Task>,
    pending: Arc<AtomicUsize>,
}

impl TaskQueue {
    /// Create a queue and the receiving end the workers consume.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Task>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let queue = Self {
            sender,
            pending: Arc::new(AtomicUsize::new(0)),
        };
        (queue, receiver)
    }

    /// Enqueue a task. Never blocks.
    pub fn push(&self, task: Task) -> Result<()> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.sender.send(task).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            Error::QueueClosed
        })
    }

    /// Tasks enqueued but not yet taken by a worker.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

/// What every worker needs to process a task.
#[derive(Debug)]
pub struct WorkerContext {
    pub fetcher: Fetcher,
    pub video_host: String,
    pub state: Arc<DownloadState>,
}

/// A fixed set of download workers.
pub struct WorkerPool {
    queue: TaskQueue,
    handles: Vec<JoinHandle<()>>,
    state: Arc<DownloadState>,
}

impl WorkerPool {
    /// Start `workers` workers on the current runtime.
    pub fn spawn(workers: usize, fetcher: Fetcher, video_host: String) -> Self {
        let (queue, receiver) = TaskQueue::channel();
        let receiver = Arc::new(Mutex::new(receiver));
        let state = Arc::new(DownloadState::new());

        let context = Arc::new(WorkerContext {
            fetcher,
            video_host,
            state: Arc::clone(&state),
        });

        let handles = (0..workers)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&receiver),
                    Arc::clone(&queue.pending),
                    Arc::clone(&context),
                ))
            })
            .collect();

        tracing::debug!("Started {} download workers", workers);

        Self {
            queue,
            handles,
            state,
        }
    }

    /// A producer handle for this pool's queue.
    pub fn queue(&self) -> TaskQueue {
        self.queue.clone()
    }

    /// Close the pool's own queue handle and wait for every task to finish.
    ///
    /// Returns once all other [`TaskQueue`] clones are dropped and the
    /// workers have drained the queue.
    pub async fn join(self) -> RunStats {
        drop(self.queue);

        for result in join_all(self.handles).await {
            if let Err(e) = result {
                tracing::error!("Download worker stopped unexpectedly: {}", e);
            }
        }

        self.state.snapshot()
    }
}

async fn run_worker(
    id: usize,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Task>>>,
    pending: Arc<AtomicUsize>,
    context: Arc<WorkerContext>,
) {
    loop {
        let task = receiver.lock().await.recv().await;
        let Some(task) = task else {
            break;
        };

        let remaining = pending.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        tracing::debug!("Worker {}: queue current size is {}", id, remaining);

        process_task(&context, task).await;
    }

    tracing::debug!("Worker {} finished", id);
}

/// Resolve, name and fetch the medium of one task, recording the outcome.
///
/// Failures are logged and counted; nothing here stops the worker.
pub async fn process_task(context: &WorkerContext, task: Task) -> Option<FetchOutcome> {
    let url = match resolve(task.kind, &task.post) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("{}", e);
            context.state.increment_unresolved();
            return None;
        }
    };

    let target = match medium_target(task.kind, &url, &context.video_host) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", url, e);
            context.state.increment_failed();
            return None;
        }
    };

    let dest = task.folder.join(&target.file_name);
    let outcome = context.fetcher.fetch(task.kind, &target, &dest).await;

    if let FetchOutcome::Failed(reason) = &outcome {
        tracing::debug!("{} {} failed: {}", task.kind, target.fetch_url, reason);
    }

    context.state.record(task.kind, &outcome);
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TumblrApi;
    use crate::config::OptionsConfig;
    use crate::media::{MediumKind, Photo, Post, VideoPost};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        let options = OptionsConfig {
            retries: 2,
            ..Default::default()
        };
        Fetcher::new(TumblrApi::new(&options, None).unwrap(), 2, None)
    }

    fn photo_task(url: &str, folder: &std::path::Path) -> Task {
        Task::new(
            MediumKind::Photo,
            Post::Photo(Photo {
                post_id: "1".to_string(),
                urls: vec![url.to_string()],
            }),
            folder.to_path_buf(),
        )
    }

    #[tokio::test]
    async fn test_unresolved_tasks_do_not_stop_the_pool() {
        let dir = tempfile::tempdir().unwrap();
        let pool = WorkerPool::spawn(3, fetcher(), "http://127.0.0.1:9".to_string());
        let queue = pool.queue();

        for _ in 0..5 {
            let task = Task::new(
                MediumKind::Video,
                Post::Video(VideoPost::default()),
                dir.path().to_path_buf(),
            );
            queue.push(task).unwrap();
        }
        drop(queue);

        let stats = pool.join().await;
        assert_eq!(stats.unresolved_count, 5);
        assert_eq!(stats.total_processed(), 5);
    }

    #[tokio::test]
    async fn test_pool_downloads_every_task_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"img".to_vec()))
            .expect(8)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let pool = WorkerPool::spawn(4, fetcher(), server.uri());
        let queue = pool.queue();

        for i in 0..8 {
            let url = format!("{}/media/photo_{}.jpg", server.uri(), i);
            queue.push(photo_task(&url, dir.path())).unwrap();
        }
        drop(queue);

        let stats = pool.join().await;
        assert_eq!(stats.pic_count, 8);
        for i in 0..8 {
            let path = dir.path().join(format!("photo_{}.jpg", i));
            assert_eq!(std::fs::read(path).unwrap(), b"img");
        }
    }

    #[tokio::test]
    async fn test_pending_counts_queued_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let (queue, _receiver) = TaskQueue::channel();

        queue
            .push(photo_task("http://127.0.0.1:9/a.jpg", dir.path()))
            .unwrap();
        queue
            .push(photo_task("http://127.0.0.1:9/b.jpg", dir.path()))
            .unwrap();
        assert_eq!(queue.pending(), 2);
    }

    #[tokio::test]
    async fn test_push_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (queue, receiver) = TaskQueue::channel();
        drop(receiver);

        let err = queue
            .push(photo_task("http://127.0.0.1:9/a.jpg", dir.path()))
            .unwrap_err();
        assert!(matches!(err, Error::QueueClosed));
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_process_task_rejects_traversal_name() {
        let dir = tempfile::tempdir().unwrap();
        let context = WorkerContext {
            fetcher: fetcher(),
            video_host: "http://127.0.0.1:9".to_string(),
            state: Arc::new(DownloadState::new()),
        };

        let outcome = process_task(&context, photo_task("http://127.0.0.1:9/..", dir.path())).await;
        assert!(outcome.is_none());
        assert_eq!(context.state.snapshot().failed_count, 1);
    }
}
