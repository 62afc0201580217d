use anyhow::Result;
use clap::Parser;
use colored::control as color_control;
use schemacast::cli::commands::model::{ModelCommand, ModelCommandHandler};
use schemacast::cli::commands::property::{PropertyCommand, PropertyCommandHandler};
use schemacast::cli::commands::tables::{TablesCommand, TablesCommandHandler};
use schemacast::cli::{Cli, Commands};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // CLIをパースして実行
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run_command(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// ログ出力を初期化する
///
/// RUST_LOG が設定されていればそれに従い、未設定時は --verbose で debug、それ以外は warn。
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// コマンドを実行する
fn run_command(cli: Cli) -> Result<String> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;

    // --config フラグの処理（絶対パスに変換）
    let config_path: Option<PathBuf> = cli.config.map(|p| {
        if p.is_absolute() {
            p
        } else {
            project_path.join(p)
        }
    });

    match cli.command {
        Commands::Property { model, property } => {
            let handler = PropertyCommandHandler::new();
            let command = PropertyCommand {
                project_path,
                config_path,
                model,
                property,
                format: cli.format,
            };
            handler.execute(&command)
        }

        Commands::Model { model } => {
            let handler = ModelCommandHandler::new();
            let command = ModelCommand {
                project_path,
                config_path,
                model,
                format: cli.format,
            };
            handler.execute(&command)
        }

        Commands::Tables { table } => {
            let handler = TablesCommandHandler::new();
            let command = TablesCommand {
                project_path,
                config_path,
                table,
                format: cli.format,
            };
            handler.execute(&command)
        }
    }
}
