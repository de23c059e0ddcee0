// WorkerPool - 解析・アーカイブ・汎用の3系統の実行コンテキスト
//
// 解析プールは固定数のワーカー、アーカイブプールは単一ワーカー、
// 汎用プールは投入ごとにワーカーを起動する。各プールはキューを共有しない。

use super::consumer::{run_job, spawn_consumers, Job};
use crate::core::{ErrorKind, PipelineConfig, PipelineError, ProcessingResult};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// プール種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Analysis,
    Archive,
    General,
}

impl PoolKind {
    /// ワーカー名の接頭辞
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Archive => "archive",
            Self::General => "general",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// プールの実行カウンタ
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub(crate) submitted: AtomicUsize,
    pub(crate) active: AtomicUsize,
    pub(crate) completed: AtomicUsize,
    pub(crate) failed: AtomicUsize,
}

impl PoolCounters {
    pub(crate) fn job_started(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn job_finished(&self, succeeded: bool) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        if succeeded {
            self.completed.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// プールの状態スナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub pool: PoolKind,
    /// 固定ワーカー数（汎用プールは `None`）
    pub workers: Option<usize>,
    pub active: usize,
    pub queued: usize,
    pub completed: usize,
    pub failed: usize,
    pub submitted: usize,
    pub accepting: bool,
}

/// 3プール分のスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSetSnapshot {
    pub analysis: PoolStatus,
    pub archive: PoolStatus,
    pub general: PoolStatus,
}

impl PoolSetSnapshot {
    pub fn pools(&self) -> [&PoolStatus; 3] {
        [&self.analysis, &self.archive, &self.general]
    }

    /// ログへ出力
    pub fn log(&self) {
        info!("=== Worker Pool Status ===");
        for status in self.pools() {
            let workers = status
                .workers
                .map(|count| count.to_string())
                .unwrap_or_else(|| "unbounded".to_string());
            info!(
                "{} pool - workers: {}, active: {}, queued: {}, completed: {}, failed: {}, submitted: {}",
                status.pool,
                workers,
                status.active,
                status.queued,
                status.completed,
                status.failed,
                status.submitted
            );
        }
    }
}

/// 投入したタスクの結果待ちハンドル
#[must_use = "task handles must be awaited to observe the result"]
#[derive(Debug)]
pub struct TaskHandle<T> {
    label: String,
    pool: PoolKind,
    submitted_at: Instant,
    receiver: oneshot::Receiver<ProcessingResult<T>>,
}

impl<T> TaskHandle<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pool(&self) -> PoolKind {
        self.pool
    }

    /// タスクの完了を待つ
    ///
    /// タスク自身のエラーは `ThreadExecution` で包み、原因として保持する。
    /// 結果を返さずにタスクが消えた場合は `ThreadInterrupted`。
    pub async fn wait(self) -> ProcessingResult<T> {
        let outcome = self.receiver.await;
        let elapsed = self.submitted_at.elapsed();
        debug!(
            pool = %self.pool,
            task = %self.label,
            wait_ms = elapsed.as_millis() as u64,
            wait_ns = elapsed.as_nanos() as u64,
            "task handle resolved"
        );

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error))
                if matches!(
                    error.kind(),
                    ErrorKind::ThreadExecution | ErrorKind::ThreadInterrupted
                ) =>
            {
                Err(error)
            }
            Ok(Err(error)) => Err(PipelineError::new(
                ErrorKind::ThreadExecution,
                format!("{} task '{}' failed", self.pool, self.label),
            )
            .caused_by(error)),
            Err(recv_error) => Err(PipelineError::from(recv_error)
                .with_resource(format!("{} task '{}'", self.pool, self.label))),
        }
    }
}

/// 単一のワーカープール
pub struct WorkerPool {
    kind: PoolKind,
    workers: Option<usize>,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<PoolCounters>,
    accepting: AtomicBool,
    spawned: AtomicUsize,
}

impl WorkerPool {
    /// 固定数のワーカーで作成（tokioランタイム内で呼ぶこと）
    pub fn bounded(kind: PoolKind, workers: usize) -> Self {
        let workers = workers.max(1);
        let (sender, queue) = mpsc::unbounded_channel();
        let counters = Arc::new(PoolCounters::default());
        let handles = spawn_consumers(kind.prefix(), workers, queue);
        debug!(pool = %kind, workers, "worker pool started");

        Self {
            kind,
            workers: Some(workers),
            sender: Mutex::new(Some(sender)),
            handles: Mutex::new(handles),
            counters,
            accepting: AtomicBool::new(true),
            spawned: AtomicUsize::new(workers),
        }
    }

    /// 投入ごとにワーカーを起動するプールを作成
    pub fn unbounded(kind: PoolKind) -> Self {
        Self {
            kind,
            workers: None,
            sender: Mutex::new(None),
            handles: Mutex::new(Vec::new()),
            counters: Arc::new(PoolCounters::default()),
            accepting: AtomicBool::new(true),
            spawned: AtomicUsize::new(0),
        }
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// タスクを投入する
    ///
    /// 固定プールでは空きワーカーが出るまでキューで待つ（拒否しない）。
    pub fn submit<T, F>(&self, label: impl Into<String>, task: F) -> ProcessingResult<TaskHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> ProcessingResult<T> + Send + 'static,
    {
        let label = label.into();
        if !self.is_accepting() {
            return Err(self.rejected(&label));
        }

        let (job, receiver) = wrap_task(label.clone(), task, Arc::clone(&self.counters));
        match self.workers {
            Some(_) => {
                let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
                let sender = sender.as_ref().ok_or_else(|| self.rejected(&label))?;
                sender.send(job).map_err(|_| self.rejected(&label))?;
            }
            None => {
                // shutdown はこのロックを取ってからハンドルを回収するため、
                // ロック内で受付状態を再確認し、起動と登録を同時に行う
                let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
                if !self.is_accepting() {
                    return Err(self.rejected(&label));
                }

                let worker_id = self.spawned.fetch_add(1, Ordering::SeqCst);
                let worker_name = format!("{}-{worker_id}", self.kind.prefix());
                handles.retain(|handle| !handle.is_finished());
                handles.push(tokio::spawn(async move {
                    run_job(&worker_name, job).await;
                }));
            }
        }

        self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        debug!(pool = %self.kind, task = %label, "task submitted");

        Ok(TaskHandle {
            label,
            pool: self.kind,
            submitted_at: Instant::now(),
            receiver,
        })
    }

    /// 現在の状態を取得
    pub fn status(&self) -> PoolStatus {
        let submitted = self.counters.submitted.load(Ordering::SeqCst);
        let active = self.counters.active.load(Ordering::SeqCst);
        let completed = self.counters.completed.load(Ordering::SeqCst);
        let failed = self.counters.failed.load(Ordering::SeqCst);

        PoolStatus {
            pool: self.kind,
            workers: self.workers,
            active,
            queued: submitted.saturating_sub(active + completed + failed),
            completed,
            failed,
            submitted,
            accepting: self.is_accepting(),
        }
    }

    /// 受付を停止し、実行中のタスクを待つ
    ///
    /// 上限時間内に終わらなければ残りを強制終了し `Ok(false)` を返す。
    pub async fn shutdown(&self, timeout: Duration) -> ProcessingResult<bool> {
        let mut handles = {
            let mut registered = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
            self.accepting.store(false, Ordering::SeqCst);
            std::mem::take(&mut *registered)
        };
        // 送信側を閉じるとワーカーは残りのキューを処理してから停止する
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let drained = tokio::time::timeout(timeout, async {
            for handle in handles.iter_mut() {
                handle.await?;
            }
            Ok::<(), tokio::task::JoinError>(())
        })
        .await;

        match drained {
            Ok(Ok(())) => {
                debug!(pool = %self.kind, "worker pool terminated gracefully");
                Ok(true)
            }
            Ok(Err(join_error)) => {
                handles.iter().for_each(JoinHandle::abort);
                Err(PipelineError::from(join_error).with_resource(format!("{} pool", self.kind)))
            }
            Err(_elapsed) => {
                warn!(
                    "{} pool did not terminate within {:?}, forcing shutdown",
                    self.kind, timeout
                );
                handles.iter().for_each(JoinHandle::abort);
                Ok(false)
            }
        }
    }

    fn rejected(&self, label: &str) -> PipelineError {
        PipelineError::new(
            ErrorKind::ThreadExecution,
            format!("{} pool is shut down, rejected task '{label}'", self.kind),
        )
    }
}

/// タスクをジョブに包み、結果の受信側を返す
///
/// カウンタは結果を送る前に更新する。
fn wrap_task<T, F>(
    label: String,
    task: F,
    counters: Arc<PoolCounters>,
) -> (Job, oneshot::Receiver<ProcessingResult<T>>)
where
    T: Send + 'static,
    F: FnOnce(&str) -> ProcessingResult<T> + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    let job: Job = Box::new(move |worker_name: &str| {
        counters.job_started();
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task(worker_name)))
            .unwrap_or_else(|payload| {
                Err(PipelineError::new(
                    ErrorKind::ThreadExecution,
                    format!("task '{label}' panicked: {}", panic_message(payload.as_ref())),
                ))
            });
        let elapsed = started.elapsed();
        debug!(
            worker = worker_name,
            task = %label,
            elapsed_ms = elapsed.as_millis() as u64,
            elapsed_ns = elapsed.as_nanos() as u64,
            "task finished"
        );

        counters.job_finished(outcome.is_ok());
        // 待機側が既に破棄されていても構わない
        let _ = sender.send(outcome);
    });
    (job, receiver)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 解析・アーカイブ・汎用の3プール
pub struct WorkerPoolSet {
    analysis: WorkerPool,
    archive: WorkerPool,
    general: WorkerPool,
    shutdown_timeout: Duration,
}

impl WorkerPoolSet {
    /// 設定に従って作成（tokioランタイム内で呼ぶこと）
    pub fn new<C: PipelineConfig + ?Sized>(config: &C) -> Self {
        let analysis_workers = config.analysis_workers();
        if analysis_workers == 0 {
            warn!("analysis pool needs at least one worker, using 1");
        }

        let pools = Self {
            analysis: WorkerPool::bounded(PoolKind::Analysis, analysis_workers),
            archive: WorkerPool::bounded(PoolKind::Archive, 1),
            general: WorkerPool::unbounded(PoolKind::General),
            shutdown_timeout: config.shutdown_timeout(),
        };
        info!(
            "Worker pools started (analysis: {}, archive: 1, general: unbounded)",
            analysis_workers.max(1)
        );
        pools
    }

    /// 既定設定（解析10ワーカー、待機30秒）で作成
    pub fn with_defaults() -> Self {
        Self::new(&crate::services::config::DefaultPipelineConfig::default())
    }

    pub fn submit_analysis<T, F>(
        &self,
        label: impl Into<String>,
        task: F,
    ) -> ProcessingResult<TaskHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> ProcessingResult<T> + Send + 'static,
    {
        self.analysis.submit(label, task)
    }

    pub fn submit_archive<T, F>(
        &self,
        label: impl Into<String>,
        task: F,
    ) -> ProcessingResult<TaskHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> ProcessingResult<T> + Send + 'static,
    {
        self.archive.submit(label, task)
    }

    pub fn submit_general<T, F>(
        &self,
        label: impl Into<String>,
        task: F,
    ) -> ProcessingResult<TaskHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> ProcessingResult<T> + Send + 'static,
    {
        self.general.submit(label, task)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// 3プールの状態を取得
    pub fn snapshot(&self) -> PoolSetSnapshot {
        PoolSetSnapshot {
            analysis: self.analysis.status(),
            archive: self.archive.status(),
            general: self.general.status(),
        }
    }

    /// 状態をログに出力して返す
    pub fn log_status(&self) -> PoolSetSnapshot {
        let snapshot = self.snapshot();
        snapshot.log();
        snapshot
    }

    /// 全プールを停止する
    pub async fn shutdown(&self) -> ProcessingResult<()> {
        info!("Shutting down worker pools...");
        for pool in [&self.analysis, &self.archive, &self.general] {
            pool.shutdown(self.shutdown_timeout).await?;
        }
        info!("All worker pools have been shut down");
        Ok(())
    }
}
