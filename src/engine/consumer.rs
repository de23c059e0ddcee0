// Consumer - プールのワーカー機能

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// ワーカーで実行するジョブ。引数はワーカー名
pub(crate) type Job = Box<dyn FnOnce(&str) + Send + 'static>;

/// ワーカー間で共有するジョブキュー
pub(crate) type JobQueue = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Job>>>;

/// ジョブをブロッキングスレッドで実行する
pub(crate) async fn run_job(worker_name: &str, job: Job) {
    let name = worker_name.to_string();
    if let Err(error) = tokio::task::spawn_blocking(move || job(&name)).await {
        warn!(worker = worker_name, "job terminated abnormally: {error}");
    }
}

/// 単一Consumerワーカー
pub(crate) fn spawn_single_consumer(worker_name: String, queue: JobQueue) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            // 次の作業を取得
            let job = {
                let mut rx = queue.lock().await;
                match rx.recv().await {
                    Some(job) => job,
                    None => break, // キュー終了
                }
            };

            run_job(&worker_name, job).await;
        }
        debug!(worker = %worker_name, "worker stopped");
    })
}

/// Consumers: 固定数のワーカー群を起動
pub(crate) fn spawn_consumers(
    name_prefix: &str,
    worker_count: usize,
    queue: mpsc::UnboundedReceiver<Job>,
) -> Vec<JoinHandle<()>> {
    let queue: JobQueue = Arc::new(tokio::sync::Mutex::new(queue));

    (0..worker_count)
        .map(|worker_id| {
            spawn_single_consumer(format!("{name_prefix}-{worker_id}"), Arc::clone(&queue))
        })
        .collect()
}
