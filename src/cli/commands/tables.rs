// tablesコマンドハンドラー
//
// スナップショットとマイグレーションから再構築したスキーマを表示します。

use crate::adapters::model_registry::ModelRegistry;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::schema::{Column, Schema, Table};
use anyhow::{anyhow, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

/// tablesコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct TablesCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 表示するテーブル（Noneの場合はすべて）
    pub table: Option<String>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// テーブル1件分の出力（カラムは名前順）
#[derive(Debug, Clone, Serialize)]
pub struct TableOutput {
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableOutput {
    fn from_table(table: &Table) -> Self {
        Self {
            name: table.name.clone(),
            columns: table
                .column_names()
                .into_iter()
                .filter_map(|name| table.get_column(name).cloned())
                .collect(),
        }
    }
}

/// tablesコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct TablesOutput {
    pub tables: Vec<TableOutput>,
}

impl TablesOutput {
    /// スキーマから出力を作成
    ///
    /// # Errors
    ///
    /// 指定されたテーブルが存在しない場合
    pub fn from_schema(schema: &Schema, table: Option<&str>) -> Result<Self> {
        let tables = match table {
            Some(name) => {
                let table = schema
                    .get_table(name)
                    .ok_or_else(|| anyhow!("Table not found: {}", name))?;
                vec![TableOutput::from_table(table)]
            }
            None => schema
                .table_names()
                .into_iter()
                .filter_map(|name| schema.get_table(name))
                .map(TableOutput::from_table)
                .collect(),
        };

        Ok(Self { tables })
    }
}

impl CommandOutput for TablesOutput {
    fn to_text(&self) -> String {
        if self.tables.is_empty() {
            return "No tables found".to_string();
        }

        let blocks: Vec<String> = self
            .tables
            .iter()
            .map(|table| {
                let mut block = format!("{}", table.name.bold());
                for column in &table.columns {
                    let mut line = format!(
                        "\n  {}: {}",
                        column.name,
                        column.readable_type.to_string().green()
                    );
                    if column.writeable_type != column.readable_type {
                        line.push_str(&format!(
                            " {} {}",
                            "write:".dimmed(),
                            column.writeable_type.to_string().cyan()
                        ));
                    }
                    if column.nullable {
                        line.push_str(&format!(" {}", "nullable".yellow()));
                    }
                    if !column.options.is_empty() {
                        line.push_str(&format!(" [{}]", column.options.join(", ")));
                    }
                    block.push_str(&line);
                }
                block
            })
            .collect();

        blocks.join("\n\n")
    }
}

/// tablesコマンドハンドラー
#[derive(Debug, Default)]
pub struct TablesCommandHandler {}

impl TablesCommandHandler {
    /// 新しいTablesCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// tablesコマンドを実行
    pub fn execute(&self, command: &TablesCommand) -> Result<String> {
        debug!(table = ?command.table, "Executing tables command");

        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let engine = context.build_engine(Rc::new(ModelRegistry::new()));

        let output = TablesOutput::from_schema(engine.schema(), command.table.as_deref())?;
        render_output(&output, &command.format)
    }
}
