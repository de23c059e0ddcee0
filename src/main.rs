use anyhow::Result;
use clap::Parser;
use file_analyzer::cli::{
    execute_analyze, execute_config, execute_extract, execute_run, execute_validate,
    AnalyzeOptions, Cli, Commands, RunOptions,
};
use file_analyzer::PipelineError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(error) = run(cli.command).await {
        report_failure(&error);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Analyze {
            input,
            output,
            config,
            keep_sources,
        } => {
            execute_analyze(AnalyzeOptions {
                input,
                output,
                config,
                keep_sources,
            })
            .await
        }
        Commands::Run {
            files,
            input,
            archive,
            keep_sources,
        } => {
            execute_run(RunOptions {
                files,
                input,
                archive,
                keep_sources,
            })
            .await
        }
        Commands::Extract { archive, dest } => execute_extract(&archive, &dest).await,
        Commands::Validate { archive } => execute_validate(&archive).map(|_| ()),
        Commands::Config { config } => execute_config(config.as_deref()),
    }
}

/// 失敗時の表示（パイプラインエラーなら応答カテゴリも出す）
fn report_failure(error: &anyhow::Error) {
    match error.downcast_ref::<PipelineError>() {
        Some(pipeline_error) => {
            let status = pipeline_error.status();
            eprintln!("❌ [{} {}] {pipeline_error}", status.code(), status);
            eprintln!(
                "   重要度: {} ({})",
                pipeline_error.severity().as_str(),
                if pipeline_error.is_recoverable() {
                    "入力を修正して再実行できます"
                } else {
                    "再実行では回復しません"
                }
            );
            if pipeline_error.root_kind() != pipeline_error.kind() {
                eprintln!("   原因: {}", pipeline_error.root_kind());
            }
            if let Some(resource) = pipeline_error.resource() {
                eprintln!("   対象: {resource}");
            }
            if let Some(suggestion) = pipeline_error.context().suggestion {
                eprintln!("   💡 {suggestion}");
            }
        }
        None => eprintln!("❌ エラー: {error:#}"),
    }
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("file_analyzer=debug,warn")
        } else {
            EnvFilter::new("file_analyzer=info,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
