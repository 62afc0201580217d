// 設定ファイル管理
//
// プロジェクトの設定ファイル（YAML形式）の読み込みと検証を行います。
// データベース方言、マイグレーション・スキーマダンプの探索パス、
// 日付クラスなどの推論設定を管理します。

use crate::core::error::IoError;
use crate::core::types::DEFAULT_DATE_CLASS;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// データベース方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(rename = "postgresql", alias = "pgsql")]
    PostgreSQL,
    #[serde(rename = "mysql", alias = "mariadb")]
    MySQL,
    #[serde(rename = "sqlite")]
    SQLite,
    #[serde(rename = "sqlsrv")]
    SqlServer,
}

impl Dialect {
    /// ネイティブの真偽値カラム型を持つかどうか
    ///
    /// PostgreSQL以外は真偽値を小さな整数（0/1）として保存します。
    pub fn has_native_boolean(&self) -> bool {
        matches!(self, Dialect::PostgreSQL)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::PostgreSQL => write!(f, "postgresql"),
            Dialect::MySQL => write!(f, "mysql"),
            Dialect::SQLite => write!(f, "sqlite"),
            Dialect::SqlServer => write!(f, "sqlsrv"),
        }
    }
}

impl FromStr for Dialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pgsql" => Ok(Dialect::PostgreSQL),
            "mysql" | "mariadb" => Ok(Dialect::MySQL),
            "sqlite" => Ok(Dialect::SQLite),
            "sqlsrv" | "sqlserver" => Ok(Dialect::SqlServer),
            other => Err(anyhow!(
                "Unsupported dialect '{}'. Supported: postgresql, mysql, sqlite, sqlsrv",
                other
            )),
        }
    }
}

/// プロジェクト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 設定ファイルのバージョン
    pub version: String,

    /// データベース方言
    pub dialect: Dialect,

    /// マイグレーションディレクトリ（記載順に走査）
    #[serde(default = "default_migration_paths")]
    pub migration_paths: Vec<PathBuf>,

    /// スカッシュ済みスキーマダンプのディレクトリ
    #[serde(default = "default_schema_dump_path")]
    pub schema_dump_path: PathBuf,

    /// モデル定義ファイル
    #[serde(default = "default_models_file")]
    pub models_file: PathBuf,

    /// 日付キャストで使用するクラス
    #[serde(default = "default_date_class")]
    pub date_class: String,

    /// マイグレーションの走査を無効化
    #[serde(default)]
    pub disable_migration_scan: bool,

    /// スキーマダンプの走査を無効化
    #[serde(default)]
    pub disable_schema_scan: bool,
}

fn default_migration_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("database/migrations")]
}

fn default_schema_dump_path() -> PathBuf {
    PathBuf::from("database/schema")
}

fn default_models_file() -> PathBuf {
    PathBuf::from("models.yaml")
}

fn default_date_class() -> String {
    DEFAULT_DATE_CLASS.to_string()
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = crate::core::naming::CONFIG_FILE;

    /// 指定された方言の既定設定を作成
    pub fn new(dialect: Dialect) -> Self {
        Self {
            version: "1.0".to_string(),
            dialect,
            migration_paths: default_migration_paths(),
            schema_dump_path: default_schema_dump_path(),
            models_file: default_models_file(),
            date_class: default_date_class(),
            disable_migration_scan: false,
            disable_schema_scan: false,
        }
    }

    /// 設定ファイルを読み込む
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path).map_err(|e| IoError::FileRead {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let config: Config = content.parse()?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        // バージョンチェック
        if self.version.is_empty() {
            return Err(anyhow!("Config file version is not specified"));
        }

        if !self.disable_migration_scan && self.migration_paths.is_empty() {
            return Err(anyhow!(
                "At least one migration path is required unless migration scanning is disabled"
            ));
        }

        if self.date_class.trim().is_empty() {
            return Err(anyhow!("date_class must not be empty"));
        }

        Ok(())
    }

    /// プロジェクトルートを基準にマイグレーションディレクトリを解決
    pub fn resolved_migration_paths(&self, project_path: &Path) -> Vec<PathBuf> {
        self.migration_paths
            .iter()
            .map(|p| project_path.join(p))
            .collect()
    }

    /// プロジェクトルートを基準にスキーマダンプディレクトリを解決
    pub fn resolved_schema_dump_path(&self, project_path: &Path) -> PathBuf {
        project_path.join(&self.schema_dump_path)
    }

    /// プロジェクトルートを基準にモデル定義ファイルを解決
    pub fn resolved_models_file(&self, project_path: &Path) -> PathBuf {
        project_path.join(&self.models_file)
    }
}

/// std::str::FromStrトレイトの実装
impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_saphyr::from_str(yaml).with_context(|| "Failed to parse config file")
    }
}
