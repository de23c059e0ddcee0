// ファイル解析パイプラインのエラー型定義
// 全ての失敗はErrorKindで分類され、呼び出し側の応答カテゴリへ写像される

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// エラー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// 入力ディレクトリが存在しない
    DirectoryNotFound,
    /// ディレクトリへのアクセス失敗・ディレクトリ以外のパス
    DirectoryAccess,
    /// ファイルが存在しない
    FileNotFound,
    /// 解析対象外の拡張子
    InvalidFileType,
    /// 読み込み失敗など解析時のI/O障害
    FileProcessing,
    ArchiveCreation,
    ArchiveExtraction,
    /// ZIP形式として不正なアーカイブ
    InvalidArchive,
    /// ワーカー上でのタスク失敗
    ThreadExecution,
    /// 待機中の中断・タスク消失
    ThreadInterrupted,
    /// 処理対象が1件もない
    NoContent,
}

impl ErrorKind {
    /// 全種別の一覧
    pub const ALL: [ErrorKind; 11] = [
        Self::DirectoryNotFound,
        Self::DirectoryAccess,
        Self::FileNotFound,
        Self::InvalidFileType,
        Self::FileProcessing,
        Self::ArchiveCreation,
        Self::ArchiveExtraction,
        Self::InvalidArchive,
        Self::ThreadExecution,
        Self::ThreadInterrupted,
        Self::NoContent,
    ];

    /// 機械可読なコード表現を取得
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DirectoryNotFound => "DIRECTORY_NOT_FOUND",
            Self::DirectoryAccess => "DIRECTORY_ACCESS",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::InvalidFileType => "INVALID_FILE_TYPE",
            Self::FileProcessing => "FILE_PROCESSING",
            Self::ArchiveCreation => "ARCHIVE_CREATION",
            Self::ArchiveExtraction => "ARCHIVE_EXTRACTION",
            Self::InvalidArchive => "INVALID_ARCHIVE",
            Self::ThreadExecution => "THREAD_EXECUTION",
            Self::ThreadInterrupted => "THREAD_INTERRUPTED",
            Self::NoContent => "NO_CONTENT",
        }
    }

    /// 表示用ラベルを取得
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DirectoryNotFound => "ディレクトリ未検出エラー",
            Self::DirectoryAccess => "ディレクトリアクセスエラー",
            Self::FileNotFound => "ファイル未検出エラー",
            Self::InvalidFileType => "ファイル種別エラー",
            Self::FileProcessing => "ファイル処理エラー",
            Self::ArchiveCreation => "アーカイブ作成エラー",
            Self::ArchiveExtraction => "アーカイブ展開エラー",
            Self::InvalidArchive => "不正アーカイブエラー",
            Self::ThreadExecution => "タスク実行エラー",
            Self::ThreadInterrupted => "タスク中断エラー",
            Self::NoContent => "処理対象なし",
        }
    }

    /// 呼び出し側へ返す応答カテゴリ
    pub const fn status(&self) -> StatusCategory {
        match self {
            Self::DirectoryNotFound | Self::FileNotFound => StatusCategory::NotFound,
            Self::InvalidFileType | Self::InvalidArchive => StatusCategory::BadInput,
            Self::NoContent => StatusCategory::NoContent,
            Self::DirectoryAccess
            | Self::FileProcessing
            | Self::ArchiveCreation
            | Self::ArchiveExtraction
            | Self::ThreadExecution
            | Self::ThreadInterrupted => StatusCategory::ServerFault,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 応答カテゴリ（トランスポート層でのステータスに対応）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCategory {
    NotFound,
    BadInput,
    ServerFault,
    NoContent,
}

impl StatusCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::BadInput => "BAD_INPUT",
            Self::ServerFault => "SERVER_FAULT",
            Self::NoContent => "NO_CONTENT",
        }
    }

    /// HTTP相当のステータスコード
    pub const fn code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::BadInput => 400,
            Self::ServerFault => 500,
            Self::NoContent => 204,
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// パイプライン全体で共通のエラー型
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct PipelineError {
    kind: ErrorKind,
    message: String,
    resource: Option<String>,
    #[source]
    source: Option<anyhow::Error>,
}

impl PipelineError {
    /// 新しいエラーを作成
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            resource: None,
            source: None,
        }
    }

    /// 原因となったエラーを付与
    pub fn caused_by(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// 関連リソース（パス等）を付与
    pub fn with_resource(mut self, resource: impl fmt::Display) -> Self {
        self.resource = Some(resource.to_string());
        self
    }

    /// ディレクトリ未検出エラーの作成
    pub fn directory_not_found(path: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::DirectoryNotFound,
            format!("directory does not exist: {path}"),
        )
        .with_resource(path)
    }

    /// ディレクトリアクセスエラーの作成
    pub fn directory_access(path: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::DirectoryAccess,
            format!("cannot access directory {path}: {reason}"),
        )
        .with_resource(path)
    }

    /// ファイル未検出エラーの作成
    pub fn file_not_found(path: impl fmt::Display) -> Self {
        Self::new(ErrorKind::FileNotFound, format!("file does not exist: {path}"))
            .with_resource(path)
    }

    /// ファイル種別エラーの作成
    pub fn invalid_file_type(path: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::InvalidFileType,
            format!("only .txt files can be analyzed: {path}"),
        )
        .with_resource(path)
    }

    /// ファイル処理エラーの作成
    pub fn file_processing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FileProcessing, message)
    }

    /// 不正アーカイブエラーの作成
    pub fn invalid_archive(path: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::InvalidArchive,
            format!("not a valid zip archive: {path}"),
        )
        .with_resource(path)
    }

    /// 処理対象なしの作成
    pub fn no_content(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoContent, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// 原因チェーンを辿り、最も内側のパイプラインエラーの種別を取得
    pub fn root_kind(&self) -> ErrorKind {
        let mut current = self;
        while let Some(inner) = current
            .source
            .as_ref()
            .and_then(|source| source.downcast_ref::<PipelineError>())
        {
            current = inner;
        }
        current.kind
    }

    /// ワーカー上のタスク失敗を包んだエラーなら、タスク自身のエラーを取り出す
    pub fn into_task_cause(self) -> PipelineError {
        if self.kind != ErrorKind::ThreadExecution {
            return self;
        }

        let PipelineError {
            kind,
            message,
            resource,
            source,
        } = self;
        match source.map(|source| source.downcast::<PipelineError>()) {
            Some(Ok(inner)) => inner,
            Some(Err(other)) => PipelineError {
                kind,
                message,
                resource,
                source: Some(other),
            },
            None => PipelineError {
                kind,
                message,
                resource,
                source: None,
            },
        }
    }

    /// 応答カテゴリを取得
    pub fn status(&self) -> StatusCategory {
        self.kind.status()
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self.kind {
            ErrorKind::ThreadInterrupted => ErrorSeverity::Critical,
            ErrorKind::ThreadExecution
            | ErrorKind::ArchiveCreation
            | ErrorKind::ArchiveExtraction
            | ErrorKind::DirectoryAccess
            | ErrorKind::FileProcessing => ErrorSeverity::High,
            ErrorKind::DirectoryNotFound
            | ErrorKind::FileNotFound
            | ErrorKind::InvalidFileType
            | ErrorKind::InvalidArchive => ErrorSeverity::Medium,
            ErrorKind::NoContent => ErrorSeverity::Low,
        }
    }

    /// 入力を正せば再実行で回復できるかどうかを判定
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.status(), StatusCategory::ServerFault)
    }

    /// エラーコンテキストを取得
    pub fn context(&self) -> ErrorContext {
        let (operation, suggestion) = match self.kind {
            ErrorKind::DirectoryNotFound | ErrorKind::DirectoryAccess => (
                "directory_lookup",
                "ディレクトリのパスとアクセス権限を確認してください",
            ),
            ErrorKind::FileNotFound | ErrorKind::InvalidFileType => (
                "file_validation",
                "解析対象は存在する .txt ファイルである必要があります",
            ),
            ErrorKind::FileProcessing => (
                "file_analysis",
                "ファイルの読み込み権限とエンコーディング(UTF-8)を確認してください",
            ),
            ErrorKind::ArchiveCreation => (
                "archive_creation",
                "出力先の空き容量と書き込み権限を確認してください",
            ),
            ErrorKind::ArchiveExtraction | ErrorKind::InvalidArchive => (
                "archive_extraction",
                "アーカイブが破損していないか確認してください",
            ),
            ErrorKind::ThreadExecution | ErrorKind::ThreadInterrupted => (
                "task_execution",
                "原因エラーを確認して再実行してください",
            ),
            ErrorKind::NoContent => (
                "input_discovery",
                "入力ディレクトリに .txt ファイルを配置してください",
            ),
        };

        let context = ErrorContext::new(operation).with_suggestion(suggestion);
        match &self.resource {
            Some(resource) => context.with_resource(resource.clone()),
            None => context,
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - ログ出力程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - システム停止レベル
    Critical,
}

impl ErrorSeverity {
    /// 重要度の数値表現を取得
    pub const fn as_level(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// 重要度の文字列表現を取得
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// エラーコンテキスト情報
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// 実行していた操作
    pub operation: String,
    /// 関連するリソース（ファイルパス等）
    pub resource: Option<String>,
    /// エラー解決のための提案
    pub suggestion: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            resource: None,
            suggestion: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// パイプライン処理の結果型
pub type ProcessingResult<T> = std::result::Result<T, PipelineError>;

impl From<tokio::task::JoinError> for PipelineError {
    fn from(error: tokio::task::JoinError) -> Self {
        let kind = if error.is_cancelled() {
            ErrorKind::ThreadInterrupted
        } else {
            ErrorKind::ThreadExecution
        };
        PipelineError::new(kind, "worker task terminated abnormally").caused_by(error)
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for PipelineError {
    fn from(error: tokio::sync::oneshot::error::RecvError) -> Self {
        PipelineError::new(
            ErrorKind::ThreadInterrupted,
            "task was dropped before producing a result",
        )
        .caused_by(error)
    }
}
