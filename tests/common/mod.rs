// 統合テスト共通ヘルパー

#![allow(dead_code)]

use anyhow::Result;
use schemacast::adapters::model_registry::ModelRegistry;
use schemacast::core::config::{Config, Dialect};
use schemacast::core::migration::Operation;
use schemacast::core::schema::{ColumnKind, ColumnSpec};
use schemacast::services::migration_replayer::MigrationReplayer;
use schemacast::services::property_type_engine::ModelPropertyEngine;
use schemacast::services::snapshot_loader::SquashedSchemaLoader;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// テスト用のモデル定義
pub const MODELS_YAML: &str = r#"
models:
  - class: App\Models\User
    casts:
      is_admin: boolean
      settings: encrypted:array
      plain_settings: array
      balance: App\Casts\AsMoney
      status: App\Enums\Status
      nickname: string
    soft_deletes: true
    property_tags: [tagged]
    methods:
      - name: fullName
        visibility: protected
        return_type: Illuminate\Database\Eloquent\Casts\Attribute
      - name: displayName
        visibility: public
        return_type: Illuminate\Database\Eloquent\Casts\Attribute
      - name: getAvatarAttribute
  - class: App\Models\Model
    abstract: true
  - class: App\Models\ApiToken
    primary_key: token
    key_type: string
  - class: App\Models\Broken
    instantiable: false
cast_classes:
  - class: App\Casts\AsMoney
    kind: value_object
    get: App\Money
    set: App\Money|int
  - class: App\Enums\Status
    kind: plain
"#;

/// usersテーブルを作成する操作列
pub fn users_operations() -> Vec<Operation> {
    vec![
        Operation::CreateTable {
            table: "users".to_string(),
            columns: vec![
                ColumnSpec::new("id", ColumnKind::Id, false),
                ColumnSpec::new("email", ColumnKind::String { length: Some(255) }, false),
                ColumnSpec::new("nickname", ColumnKind::String { length: None }, true),
                ColumnSpec::new("is_admin", ColumnKind::TinyInteger, false),
                ColumnSpec::new("settings", ColumnKind::Text, true),
                ColumnSpec::new("plain_settings", ColumnKind::Text, true),
                ColumnSpec::new("balance", ColumnKind::BigInteger, false),
                ColumnSpec::new("status", ColumnKind::String { length: None }, false),
                ColumnSpec::new("full_name", ColumnKind::String { length: None }, false),
                ColumnSpec::new("display_name", ColumnKind::String { length: None }, false),
                ColumnSpec::new("avatar", ColumnKind::String { length: None }, true),
                ColumnSpec::new("tagged", ColumnKind::String { length: None }, false),
            ],
        },
        Operation::AddTimestamps {
            table: "users".to_string(),
            tz: false,
        },
        Operation::AddSoftDeletes {
            table: "users".to_string(),
            column: "deleted_at".to_string(),
            tz: false,
        },
    ]
}

/// モデル定義レジストリを作成
pub fn registry() -> Rc<ModelRegistry> {
    Rc::new(MODELS_YAML.parse().expect("valid models yaml"))
}

/// メモリ上の操作列からエンジンを作成
pub fn engine_with(dialect: Dialect, operations: Vec<Operation>) -> ModelPropertyEngine {
    let registry = registry();
    ModelPropertyEngine::new(&Config::new(dialect), registry.clone(), registry)
        .with_migrations(MigrationReplayer::new(operations))
}

/// スナップショットと操作列からエンジンを作成
pub fn engine_with_snapshot(
    dialect: Dialect,
    dump: &str,
    operations: Vec<Operation>,
) -> ModelPropertyEngine {
    engine_with(dialect, operations)
        .with_snapshot(SquashedSchemaLoader::from_dumps(dialect, vec![dump.to_string()]))
}

/// テスト用のプロジェクトディレクトリを作成
///
/// 設定ファイルとモデル定義ファイルを書き込み、
/// マイグレーション・スキーマダンプ用ディレクトリを作成します。
pub fn setup_test_project(dialect: Dialect) -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let project_path = temp_dir.path().to_path_buf();

    let config = Config::new(dialect);
    let config_yaml = serde_saphyr::to_string(&config)?;
    fs::write(project_path.join(Config::DEFAULT_CONFIG_PATH), config_yaml)?;
    fs::write(project_path.join("models.yaml"), MODELS_YAML)?;

    fs::create_dir_all(project_path.join("database/migrations"))?;
    fs::create_dir_all(project_path.join("database/schema"))?;

    Ok((temp_dir, project_path))
}

/// マイグレーションファイルを書き込む
pub fn write_migration(project_path: &Path, file_name: &str, yaml: &str) -> Result<()> {
    fs::write(project_path.join("database/migrations").join(file_name), yaml)?;
    Ok(())
}

/// スキーマダンプを書き込む
pub fn write_schema_dump(project_path: &Path, file_name: &str, sql: &str) -> Result<()> {
    fs::write(project_path.join("database/schema").join(file_name), sql)?;
    Ok(())
}
