use super::print_json;
use crate::services::AnalyzerSettings;
use anyhow::Result;
use std::path::Path;

/// 有効な入出力ディレクトリ設定を表示する
pub fn execute_config(config: Option<&Path>) -> Result<()> {
    let settings = AnalyzerSettings::load_or_default(config)?;
    print_json(&settings.configuration())
}
