//! Feed pagination and run scheduling.

use std::path::Path;

use tokio::time::sleep;

use crate::api::TumblrApi;
use crate::config::Config;
use crate::download::fetch::Fetcher;
use crate::download::state::{AccountStats, RunStats};
use crate::download::worker::{TaskQueue, WorkerPool};
use crate::error::{Error, Result};
use crate::fs::{ensure_dir, get_account_folder};
use crate::media::{parse_feed_page, MediumKind, Task};
use crate::output::DownloadProgress;

/// Why pagination of one account/kind stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStop {
    /// The offset reached the configured cap.
    OffsetCap,
    /// A page came back without a post list.
    Exhausted,
    /// The feed answered 404 or could not be reached.
    Unavailable,
    /// Too many pages in a row could not be parsed.
    Malformed,
    /// The worker pool is gone.
    QueueClosed,
}

/// Result of paginating one account/kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub pages: u32,
    pub tasks: u64,
    pub next_offset: u32,
    pub stop: PageStop,
}

/// Walks the feed of every account and feeds the download workers.
pub struct Scheduler {
    api: TumblrApi,
    config: Config,
}

impl Scheduler {
    /// Create a scheduler; the HTTP client picks up the configured proxies.
    pub fn new(config: Config) -> Result<Self> {
        let api = TumblrApi::new(&config.options, config.proxies.as_ref())?;
        Ok(Self { api, config })
    }

    /// Download everything from every configured account.
    ///
    /// Returns after the last enqueued task has been processed.
    pub async fn run(&self) -> Result<RunStats> {
        let options = &self.config.options;
        let progress = options.show_downloads.then(DownloadProgress::default);
        let fetcher = Fetcher::new(self.api.clone(), options.retries, progress);

        let pool = WorkerPool::spawn(
            options.workers,
            fetcher,
            self.config.endpoints.video_host.clone(),
        );
        let queue = pool.queue();

        let mut accounts = Vec::with_capacity(self.config.sites.accounts.len());
        for account in &self.config.sites.accounts {
            accounts.push(self.schedule_account(account, &queue).await);
        }
        drop(queue);

        tracing::info!("All pages scheduled, waiting for downloads to finish");
        let mut stats = pool.join().await;
        stats.accounts = accounts;

        Ok(stats)
    }

    /// Enqueue the videos, then the photos, of one account.
    pub async fn schedule_account(&self, account: &str, queue: &TaskQueue) -> AccountStats {
        let mut stats = AccountStats::new(account);

        let folder = match get_account_folder(&self.config, account) {
            Ok(folder) => folder,
            Err(e) => {
                tracing::error!("Skipping site {}: {}", account, e);
                return stats;
            }
        };

        if let Err(e) = ensure_dir(&folder).await {
            tracing::error!("Cannot create {}: {}", folder.display(), e);
            return stats;
        }

        for kind in MediumKind::SCHEDULE_ORDER {
            let pagination = self.paginate(account, kind, &folder, queue).await;
            tracing::debug!(
                "Site {} {}: {} pages, {} tasks, stopped: {:?}",
                account,
                kind,
                pagination.pages,
                pagination.tasks,
                pagination.stop
            );

            stats.add_tasks(kind, pagination.tasks);
            if pagination.stop != PageStop::Unavailable {
                stats.available = true;
            }
            if pagination.stop == PageStop::QueueClosed {
                break;
            }
        }

        stats
    }

    /// Walk the pages of one account/kind, enqueuing one task per medium.
    pub async fn paginate(
        &self,
        account: &str,
        kind: MediumKind,
        folder: &Path,
        queue: &TaskQueue,
    ) -> Pagination {
        let options = &self.config.options;
        let page_size = options.page_size(kind);

        let mut pagination = Pagination {
            pages: 0,
            tasks: 0,
            next_offset: options.start,
            stop: PageStop::OffsetCap,
        };
        let mut malformed = 0;

        loop {
            let url = self
                .config
                .endpoints
                .page_url(account, kind, page_size, pagination.next_offset);
            tracing::info!("Fetching {}", url);

            let body = match self.api.get_page(account, &url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("{}", e);
                    pagination.stop = PageStop::Unavailable;
                    return pagination;
                }
            };

            match parse_feed_page(&body, kind) {
                Ok(posts) => {
                    malformed = 0;
                    pagination.pages += 1;

                    for item in posts.into_iter().flat_map(|post| post.flatten()) {
                        let task = Task::new(item.kind(), item, folder.to_path_buf());
                        if let Err(e) = queue.push(task) {
                            tracing::error!("Cannot enqueue {} for {}: {}", kind, account, e);
                            pagination.stop = PageStop::QueueClosed;
                            return pagination;
                        }
                        pagination.tasks += 1;
                    }

                    pagination.next_offset += page_size;
                    if pagination.next_offset >= options.max_offset {
                        pagination.stop = PageStop::OffsetCap;
                        return pagination;
                    }
                }
                Err(Error::FeedExhausted) => {
                    tracing::debug!("No more {} posts for {}", kind, account);
                    pagination.stop = PageStop::Exhausted;
                    return pagination;
                }
                Err(e) => {
                    malformed += 1;
                    if malformed > options.max_page_retries {
                        tracing::warn!(
                            "Giving up on {} posts of {} after {} unreadable pages: {}",
                            kind,
                            account,
                            malformed,
                            e
                        );
                        pagination.stop = PageStop::Malformed;
                        return pagination;
                    }
                    tracing::warn!(
                        "{} from URL {}, retrying ({}/{})",
                        e,
                        url,
                        malformed,
                        options.max_page_retries
                    );
                    sleep(options.page_retry_delay()).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{Photo, Post};
    use tokio::sync::mpsc::UnboundedReceiver;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, dir: &Path) -> Config {
        let mut config = Config::default();
        config.options.download_directory = Some(dir.to_path_buf());
        config.options.page_retry_delay_ms = 5;
        config.options.retries = 2;
        config.options.show_downloads = false;
        config.endpoints.feed_url = format!("{}/{{account}}/api/read", server.uri());
        config.endpoints.video_host = server.uri();
        config
    }

    fn photo_page(count: usize) -> String {
        let posts: String = (0..count)
            .map(|i| {
                format!(
                    r#"<post id="{i}" type="photo"><photo-url max-width="1280">https://media/p{i}_1280.jpg</photo-url></post>"#
                )
            })
            .collect();
        format!(r#"<tumblr version="1.0"><posts start="0" total="{count}">{posts}</posts></tumblr>"#)
    }

    fn drain(receiver: &mut UnboundedReceiver<Task>) -> Vec<Task> {
        let mut tasks = Vec::new();
        while let Ok(task) = receiver.try_recv() {
            tasks.push(task);
        }
        tasks
    }

    #[tokio::test]
    async fn test_single_page_reaches_offset_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/demo/api/read"))
            .and(query_param("type", "photo"))
            .and(query_param("num", "50"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(photo_page(3)))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let scheduler = Scheduler::new(config(&server, dir.path())).unwrap();
        let (queue, mut receiver) = TaskQueue::channel();

        let pagination = scheduler
            .paginate("demo", MediumKind::Photo, dir.path(), &queue)
            .await;

        assert_eq!(
            pagination,
            Pagination {
                pages: 1,
                tasks: 3,
                next_offset: 50,
                stop: PageStop::OffsetCap,
            }
        );
        let tasks = drain(&mut receiver);
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| t.kind == MediumKind::Photo));
        assert!(tasks.iter().all(|t| t.folder == dir.path()));
    }

    #[tokio::test]
    async fn test_missing_site_enqueues_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ghost/api/read"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let scheduler = Scheduler::new(config(&server, dir.path())).unwrap();
        let (queue, mut receiver) = TaskQueue::channel();

        let stats = scheduler.schedule_account("ghost", &queue).await;

        assert_eq!(stats.total_tasks(), 0);
        assert!(!stats.available);
        assert!(drain(&mut receiver).is_empty());
    }

    #[tokio::test]
    async fn test_photoset_enqueues_one_task_per_photo_in_order() {
        let server = MockServer::start().await;
        let body = r#"<tumblr><posts><post id="77" type="photo">
<photoset>
<photo offset="o1"><photo-url max-width="1280">https://media/s1.jpg</photo-url></photo>
<photo offset="o2"><photo-url max-width="1280">https://media/s2.jpg</photo-url></photo>
<photo offset="o3"><photo-url max-width="1280">https://media/s3.jpg</photo-url></photo>
<photo offset="o4"><photo-url max-width="1280">https://media/s4.jpg</photo-url></photo>
</photoset></post></posts></tumblr>"#;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let scheduler = Scheduler::new(config(&server, dir.path())).unwrap();
        let (queue, mut receiver) = TaskQueue::channel();

        let pagination = scheduler
            .paginate("demo", MediumKind::Photo, dir.path(), &queue)
            .await;
        assert_eq!(pagination.tasks, 4);

        let urls: Vec<String> = drain(&mut receiver)
            .into_iter()
            .map(|task| match task.post {
                Post::Photo(Photo { urls, .. }) => urls[0].clone(),
                other => panic!("unexpected post {:?}", other),
            })
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://media/s1.jpg",
                "https://media/s2.jpg",
                "https://media/s3.jpg",
                "https://media/s4.jpg"
            ]
        );
    }

    #[tokio::test]
    async fn test_walks_pages_until_cap() {
        let server = MockServer::start().await;
        for start in ["0", "2", "4"] {
            Mock::given(method("GET"))
                .and(query_param("start", start))
                .and(query_param("num", "2"))
                .respond_with(ResponseTemplate::new(200).set_body_string(photo_page(2)))
                .expect(1)
                .mount(&server)
                .await;
        }

        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&server, dir.path());
        config.options.photo_page_size = 2;
        config.options.max_offset = 6;
        let scheduler = Scheduler::new(config).unwrap();
        let (queue, mut receiver) = TaskQueue::channel();

        let pagination = scheduler
            .paginate("demo", MediumKind::Photo, dir.path(), &queue)
            .await;

        assert_eq!(pagination.pages, 3);
        assert_eq!(pagination.tasks, 6);
        assert_eq!(pagination.next_offset, 6);
        assert_eq!(pagination.stop, PageStop::OffsetCap);
        assert_eq!(drain(&mut receiver).len(), 6);
    }

    #[tokio::test]
    async fn test_empty_page_stops_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<tumblr><posts start="0" total="0"></posts></tumblr>"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let scheduler = Scheduler::new(config(&server, dir.path())).unwrap();
        let (queue, _receiver) = TaskQueue::channel();

        let pagination = scheduler
            .paginate("demo", MediumKind::Video, dir.path(), &queue)
            .await;
        assert_eq!(pagination.stop, PageStop::Exhausted);
        assert_eq!(pagination.tasks, 0);
    }

    #[tokio::test]
    async fn test_malformed_page_retry_is_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<tumblr><posts><post id=\"1\"></photo></posts></tumblr>"),
            )
            .expect(3)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&server, dir.path());
        config.options.max_page_retries = 2;
        let scheduler = Scheduler::new(config).unwrap();
        let (queue, _receiver) = TaskQueue::channel();

        let pagination = scheduler
            .paginate("demo", MediumKind::Photo, dir.path(), &queue)
            .await;
        assert_eq!(pagination.stop, PageStop::Malformed);
        assert_eq!(pagination.next_offset, 0);
    }

    #[tokio::test]
    async fn test_schedule_account_creates_folder_and_orders_kinds() {
        let server = MockServer::start().await;
        let video_body = r#"<tumblr><posts><post id="5" type="video"><video-player>&lt;source src="https://v/tumblr_v1" type="video/mp4"&gt;</video-player></post></posts></tumblr>"#;
        Mock::given(method("GET"))
            .and(query_param("type", "video"))
            .respond_with(ResponseTemplate::new(200).set_body_string(video_body))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("type", "photo"))
            .respond_with(ResponseTemplate::new(200).set_body_string(photo_page(2)))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let scheduler = Scheduler::new(config(&server, dir.path())).unwrap();
        let (queue, mut receiver) = TaskQueue::channel();

        let stats = scheduler.schedule_account("demo", &queue).await;
        assert!(dir.path().join("demo").is_dir());
        assert_eq!(stats.video_tasks, 1);
        assert_eq!(stats.photo_tasks, 2);
        assert!(stats.available);

        let kinds: Vec<MediumKind> = drain(&mut receiver).iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![MediumKind::Video, MediumKind::Photo, MediumKind::Photo]
        );
    }
}
