// コマンド共通コンテキスト
//
// 設定ファイル読み込み、モデル定義の読み込み、推論エンジンの組み立てをCLI層で集約する。

use crate::adapters::model_registry::ModelRegistry;
use crate::core::config::Config;
use crate::services::migration_loader::YamlMigrationSource;
use crate::services::migration_replayer::MigrationReplayer;
use crate::services::property_type_engine::ModelPropertyEngine;
use crate::services::snapshot_loader::SquashedSchemaLoader;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// プロジェクトルートから設定を読み込んでコンテキストを作成
    pub fn load(project_path: PathBuf) -> Result<Self> {
        Self::load_with_config(project_path, None)
    }

    /// カスタム設定ファイルパスを指定してコンテキストを作成
    pub fn load_with_config(
        project_path: PathBuf,
        custom_config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config_path = custom_config_path
            .unwrap_or_else(|| project_path.join(Config::DEFAULT_CONFIG_PATH));

        if !config_path.exists() {
            return Err(anyhow!(
                "Config file not found: {:?}. Create {} in the project root or pass --config.",
                config_path,
                Config::DEFAULT_CONFIG_PATH
            ));
        }

        let config =
            Config::from_file(&config_path).with_context(|| "Failed to read config file")?;

        Ok(Self {
            project_path,
            config_path,
            config,
        })
    }

    /// モデル定義ファイルの絶対パス
    pub fn models_file(&self) -> PathBuf {
        self.config.resolved_models_file(&self.project_path)
    }

    /// モデル定義を読み込む
    ///
    /// ファイルが存在しない場合は空のレジストリを返します。
    pub fn load_registry(&self) -> Result<ModelRegistry> {
        let path = self.models_file();
        if !path.exists() {
            debug!(path = %path.display(), "Models file not found, using empty registry");
            return Ok(ModelRegistry::new());
        }
        ModelRegistry::from_file(&path)
    }

    /// スナップショットの読み込み元
    pub fn snapshot_loader(&self) -> SquashedSchemaLoader {
        if self.config.disable_schema_scan {
            return SquashedSchemaLoader::disabled();
        }
        SquashedSchemaLoader::new(
            self.config.dialect,
            Some(self.config.resolved_schema_dump_path(&self.project_path)),
        )
    }

    /// マイグレーションの再生元
    pub fn migration_replayer(&self) -> MigrationReplayer {
        if self.config.disable_migration_scan {
            return MigrationReplayer::new(YamlMigrationSource::disabled());
        }
        MigrationReplayer::new(YamlMigrationSource::new(
            self.config.resolved_migration_paths(&self.project_path),
        ))
    }

    /// 推論エンジンを組み立てる
    pub fn build_engine(&self, registry: Rc<ModelRegistry>) -> ModelPropertyEngine {
        ModelPropertyEngine::new(&self.config, registry.clone(), registry)
            .with_snapshot(self.snapshot_loader())
            .with_migrations(self.migration_replayer())
    }
}

/// モデル名を登録済みのクラス名へ解決
pub fn resolve_model_class(registry: &ModelRegistry, name: &str) -> Result<String> {
    registry
        .find_model_class(name)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Model not found in models file: {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = CommandContext::load(temp_dir.path().to_path_buf());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_with_custom_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "version: \"1.0\"\ndialect: sqlite\n").unwrap();

        let context =
            CommandContext::load_with_config(temp_dir.path().to_path_buf(), Some(config_path))
                .unwrap();

        assert_eq!(context.models_file(), temp_dir.path().join("models.yaml"));
        assert_eq!(context.load_registry().unwrap().model_classes().len(), 0);
    }
}
