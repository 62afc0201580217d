// propertyコマンドハンドラー
//
// 単一のモデルプロパティについて推論結果を表示します。

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

/// propertyコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct PropertyCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// モデルクラス（完全修飾名またはクラス名）
    pub model: String,
    /// プロパティ名
    pub property: String,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// propertyコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct PropertyOutput {
    /// モデルクラス
    pub model: String,
    /// プロパティ名
    pub property: String,
    /// 推論対象かどうか
    pub inferred: bool,
    /// 読み取り時の型
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readable_type: Option<PropertyType>,
    /// 書き込み時の型
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writable_type: Option<PropertyType>,
}

impl CommandOutput for PropertyOutput {
    fn to_text(&self) -> String {
        let (Some(readable), Some(writable)) = (&self.readable_type, &self.writable_type) else {
            return format!(
                "{} {}::${} is not inferred from the schema",
                "✗".yellow(),
                self.model,
                self.property
            );
        };

        let mut output = String::new();
        output.push_str(&format!("{}::${}\n", self.model, self.property).bold().to_string());
        output.push_str(&format!("  read:  {}\n", readable.to_string().green()));
        output.push_str(&format!("  write: {}", writable.to_string().cyan()));
        output
    }
}

/// propertyコマンドハンドラー
#[derive(Debug, Default)]
pub struct PropertyCommandHandler {}

impl PropertyCommandHandler {
    /// 新しいPropertyCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// propertyコマンドを実行
    ///
    /// # Errors
    ///
    /// - 設定ファイル・モデル定義ファイルを読み込めない場合
    /// - モデルが登録されていない場合
    /// - 推論中に内部不整合が検出された場合
    pub fn execute(&self, command: &PropertyCommand) -> Result<String> {
        debug!(model = %command.model, property = %command.property, "Executing property command");

        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let registry = Rc::new(context.load_registry()?);
        let class = resolve_model_class(&registry, &command.model)?;
        let engine = context.build_engine(registry);

        let output = if engine.has_property(&class, &command.property) {
            let property = engine.get_property(&class, &command.property)?;
            PropertyOutput {
                model: class,
                property: command.property.clone(),
                inferred: true,
                readable_type: Some(property.readable_type),
                writable_type: Some(property.writable_type),
            }
        } else {
            PropertyOutput {
                model: class,
                property: command.property.clone(),
                inferred: false,
                readable_type: None,
                writable_type: None,
            }
        };

        render_output(&output, &command.format)
    }
}
