// modelコマンドハンドラー
//
// モデルの推論可能なプロパティを一覧表示します。

use crate::cli::command_context::{resolve_model_class, CommandContext};
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::types::PropertyType;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

/// modelコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ModelCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// モデルクラス（完全修飾名またはクラス名）
    pub model: String,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// プロパティ1件分の出力
#[derive(Debug, Clone, Serialize)]
pub struct PropertyRow {
    pub name: String,
    pub readable_type: PropertyType,
    pub writable_type: PropertyType,
}

/// modelコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct ModelOutput {
    /// モデルクラス
    pub model: String,
    /// バインド先テーブル
    pub table: String,
    /// 推論されたプロパティ（名前順）
    pub properties: Vec<PropertyRow>,
}

impl CommandOutput for ModelOutput {
    fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {}\n",
            self.model.bold(),
            format!("(table: {})", self.table).dimmed()
        ));

        if self.properties.is_empty() {
            output.push_str("  No inferable properties");
            return output;
        }

        let width = self
            .properties
            .iter()
            .map(|p| p.name.len())
            .max()
            .unwrap_or(0);

        let lines: Vec<String> = self
            .properties
            .iter()
            .map(|p| {
                let mut line = format!(
                    "  ${:<width$}  {}",
                    p.name,
                    p.readable_type.to_string().green(),
                    width = width
                );
                if p.writable_type != p.readable_type {
                    line.push_str(&format!(
                        "  {} {}",
                        "write:".dimmed(),
                        p.writable_type.to_string().cyan()
                    ));
                }
                line
            })
            .collect();
        output.push_str(&lines.join("\n"));
        output
    }
}

/// modelコマンドハンドラー
#[derive(Debug, Default)]
pub struct ModelCommandHandler {}

impl ModelCommandHandler {
    /// 新しいModelCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// modelコマンドを実行
    pub fn execute(&self, command: &ModelCommand) -> Result<String> {
        debug!(model = %command.model, "Executing model command");

        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let registry = Rc::new(context.load_registry()?);
        let class = resolve_model_class(&registry, &command.model)?;
        let engine = context.build_engine(registry);

        let mut properties = Vec::new();
        for name in engine.inferable_properties(&class) {
            let property = engine.get_property(&class, &name)?;
            properties.push(PropertyRow {
                name,
                readable_type: property.readable_type,
                writable_type: property.writable_type,
            });
        }

        let output = ModelOutput {
            table: engine.table_for(&class).unwrap_or_default(),
            model: class,
            properties,
        };

        render_output(&output, &command.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_output_shows_diverging_write_type() {
        colored::control::set_override(false);
        let output = ModelOutput {
            model: "App\\Models\\User".to_string(),
            table: "users".to_string(),
            properties: vec![
                PropertyRow {
                    name: "id".to_string(),
                    readable_type: PropertyType::Int,
                    writable_type: PropertyType::union([PropertyType::Int, PropertyType::NumericString]),
                },
                PropertyRow {
                    name: "name".to_string(),
                    readable_type: PropertyType::String,
                    writable_type: PropertyType::String,
                },
            ],
        };

        let text = output.to_text();
        assert!(text.contains("(table: users)"));
        assert!(text.contains("$id    int  write: int|numeric-string"));
        assert!(text.contains("$name  string"));
        assert!(!text.contains("$name  string  write:"));
    }

    #[test]
    fn test_empty_model() {
        colored::control::set_override(false);
        let output = ModelOutput {
            model: "App\\Models\\Empty".to_string(),
            table: "empties".to_string(),
            properties: Vec::new(),
        };
        assert!(output.to_text().contains("No inferable properties"));
    }
}
