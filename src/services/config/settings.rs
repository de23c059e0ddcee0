// 設定ファイル（JSON）の読み込みと検証

use super::implementations::{
    DefaultPipelineConfig, DEFAULT_ANALYSIS_WORKERS, DEFAULT_COPY_BUFFER_SIZE,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// ディレクトリ設定とパイプライン設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// 解析対象の .txt ファイルを置くディレクトリ
    pub input_directory: PathBuf,
    /// アーカイブの出力先ディレクトリ
    pub output_directory: PathBuf,
    pub pipeline: PipelineSettings,
}

/// パイプライン設定のファイル表現
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub analysis_workers: usize,
    pub shutdown_timeout_secs: u64,
    pub copy_buffer_size: usize,
    pub delete_sources_after_archive: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            input_directory: PathBuf::from("./input"),
            output_directory: PathBuf::from("./output"),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            analysis_workers: DEFAULT_ANALYSIS_WORKERS,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT.as_secs(),
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            delete_sources_after_archive: true,
        }
    }
}

impl AnalyzerSettings {
    /// JSONファイルから読み込み、検証する
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// ファイル指定があれば読み込み、なければ既定値を使う
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// 設定値の検証
    pub fn validate(&self) -> Result<()> {
        if self.input_directory.as_os_str().is_empty() {
            bail!("input_directory must not be empty");
        }
        if self.output_directory.as_os_str().is_empty() {
            bail!("output_directory must not be empty");
        }
        if self.pipeline.analysis_workers == 0 {
            bail!("pipeline.analysis_workers must be at least 1");
        }
        if self.pipeline.copy_buffer_size == 0 {
            bail!("pipeline.copy_buffer_size must be at least 1");
        }
        Ok(())
    }

    /// パイプライン設定へ変換
    pub fn pipeline_config(&self) -> DefaultPipelineConfig {
        DefaultPipelineConfig::new()
            .with_analysis_workers(self.pipeline.analysis_workers)
            .with_shutdown_timeout(Duration::from_secs(self.pipeline.shutdown_timeout_secs))
            .with_copy_buffer_size(self.pipeline.copy_buffer_size)
            .with_delete_sources(self.pipeline.delete_sources_after_archive)
    }

    /// 入出力ディレクトリの一覧
    pub fn configuration(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "inputDirectory".to_string(),
                self.input_directory.display().to_string(),
            ),
            (
                "outputDirectory".to_string(),
                self.output_directory.display().to_string(),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PipelineConfig;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = AnalyzerSettings::default();

        assert_eq!(settings.input_directory, PathBuf::from("./input"));
        assert_eq!(settings.output_directory, PathBuf::from("./output"));
        assert_eq!(settings.pipeline.analysis_workers, 10);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "input_directory": "/data/in", "pipeline": { "analysis_workers": 3 } }"#,
        )
        .unwrap();

        let settings = AnalyzerSettings::load(&path).unwrap();
        assert_eq!(settings.input_directory, PathBuf::from("/data/in"));
        assert_eq!(settings.output_directory, PathBuf::from("./output"));
        assert_eq!(settings.pipeline.analysis_workers, 3);
        assert_eq!(settings.pipeline.copy_buffer_size, 4096);

        let config = settings.pipeline_config();
        assert_eq!(config.analysis_workers(), 3);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_rejects_zero_workers() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "pipeline": { "analysis_workers": 0 } }"#).unwrap();

        let error = AnalyzerSettings::load(&path).unwrap_err();
        assert!(error.to_string().contains("analysis_workers"));
    }

    #[test]
    fn test_load_missing_or_malformed_file() {
        let temp_dir = tempdir().unwrap();
        assert!(AnalyzerSettings::load(&temp_dir.path().join("none.json")).is_err());

        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AnalyzerSettings::load(&path).is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        let settings = AnalyzerSettings::load_or_default(None).unwrap();
        assert_eq!(settings, AnalyzerSettings::default());
    }

    #[test]
    fn test_configuration_map() {
        let settings = AnalyzerSettings {
            input_directory: PathBuf::from("/srv/in"),
            output_directory: PathBuf::from("/srv/out"),
            ..AnalyzerSettings::default()
        };

        let configuration = settings.configuration();
        assert_eq!(configuration.len(), 2);
        assert_eq!(configuration["inputDirectory"], "/srv/in");
        assert_eq!(configuration["outputDirectory"], "/srv/out");
    }
}
