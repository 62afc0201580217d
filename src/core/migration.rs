// マイグレーションドメインモデル
//
// スキーマ変更操作の語彙（Operation）と、
// マイグレーションファイル（MigrationFile）を表現する型システム。

use crate::core::schema::{ColumnKind, ColumnSpec};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// スキーマ変更操作
///
/// 再生器（MigrationReplayer）が順番に適用する操作です。
/// 各操作はスキーママッピング以外を参照せずに適用できる情報を持ちます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// テーブル作成（既存テーブルは上書き）
    CreateTable {
        table: String,
        #[serde(default)]
        columns: Vec<ColumnSpec>,
    },

    /// テーブル削除
    DropTable { table: String },

    /// テーブル名変更
    RenameTable { from: String, to: String },

    /// カラム追加（既存カラムは上書き）
    AddColumn { table: String, column: ColumnSpec },

    /// カラム定義変更
    ModifyColumn { table: String, column: ColumnSpec },

    /// カラム名変更
    RenameColumn {
        table: String,
        from: String,
        to: String,
    },

    /// カラム削除
    DropColumn { table: String, columns: Vec<String> },

    /// created_at / updated_at の追加
    AddTimestamps {
        table: String,
        #[serde(default)]
        tz: bool,
    },

    /// created_at / updated_at の削除
    DropTimestamps { table: String },

    /// 論理削除カラムの追加
    AddSoftDeletes {
        table: String,
        #[serde(default = "default_soft_delete_column")]
        column: String,
        #[serde(default)]
        tz: bool,
    },

    /// 論理削除カラムの削除
    DropSoftDeletes {
        table: String,
        #[serde(default = "default_soft_delete_column")]
        column: String,
    },

    /// ポリモーフィック関連カラム（{name}_type, {name}_id）の追加
    AddMorphs {
        table: String,
        name: String,
        #[serde(default)]
        key: MorphKey,
        #[serde(default)]
        nullable: bool,
    },

    /// ポリモーフィック関連カラムの削除
    DropMorphs { table: String, name: String },

    /// remember_token の追加
    AddRememberToken { table: String },

    /// remember_token の削除
    DropRememberToken { table: String },
}

fn default_soft_delete_column() -> String {
    "deleted_at".to_string()
}

/// ポリモーフィック関連のキー種別
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphKey {
    #[default]
    Int,
    Uuid,
    Ulid,
}

impl MorphKey {
    /// `{name}_id` カラムの種別
    pub fn column_kind(&self) -> ColumnKind {
        match self {
            MorphKey::Int => ColumnKind::UnsignedBigInteger,
            MorphKey::Uuid => ColumnKind::Uuid,
            MorphKey::Ulid => ColumnKind::Ulid,
        }
    }
}

impl Operation {
    /// 対象テーブル名
    ///
    /// テーブル名変更の場合は変更元を返します。
    pub fn table(&self) -> &str {
        match self {
            Operation::CreateTable { table, .. }
            | Operation::DropTable { table }
            | Operation::AddColumn { table, .. }
            | Operation::ModifyColumn { table, .. }
            | Operation::RenameColumn { table, .. }
            | Operation::DropColumn { table, .. }
            | Operation::AddTimestamps { table, .. }
            | Operation::DropTimestamps { table }
            | Operation::AddSoftDeletes { table, .. }
            | Operation::DropSoftDeletes { table, .. }
            | Operation::AddMorphs { table, .. }
            | Operation::DropMorphs { table, .. }
            | Operation::AddRememberToken { table }
            | Operation::DropRememberToken { table } => table,
            Operation::RenameTable { from, .. } => from,
        }
    }

    /// 操作の種類を文字列で取得
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::CreateTable { .. } => "create_table",
            Operation::DropTable { .. } => "drop_table",
            Operation::RenameTable { .. } => "rename_table",
            Operation::AddColumn { .. } => "add_column",
            Operation::ModifyColumn { .. } => "modify_column",
            Operation::RenameColumn { .. } => "rename_column",
            Operation::DropColumn { .. } => "drop_column",
            Operation::AddTimestamps { .. } => "add_timestamps",
            Operation::DropTimestamps { .. } => "drop_timestamps",
            Operation::AddSoftDeletes { .. } => "add_soft_deletes",
            Operation::DropSoftDeletes { .. } => "drop_soft_deletes",
            Operation::AddMorphs { .. } => "add_morphs",
            Operation::DropMorphs { .. } => "drop_morphs",
            Operation::AddRememberToken { .. } => "add_remember_token",
            Operation::DropRememberToken { .. } => "drop_remember_token",
        }
    }
}

/// マイグレーションファイルの内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationDocument {
    /// ファイル内の操作（記載順）
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// マイグレーションファイル
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationFile {
    /// マイグレーションバージョン（ファイル名の拡張子を除いた部分）
    pub version: String,

    /// ファイル名先頭のタイムスタンプ（YYYY_MM_DD_HHmmss）
    pub created_at: Option<NaiveDateTime>,

    /// マイグレーションファイルのパス
    pub file_path: PathBuf,

    /// ファイル内の操作
    pub operations: Vec<Operation>,
}

impl MigrationFile {
    /// 新しいマイグレーションファイルを作成
    pub fn new(file_path: &Path, document: MigrationDocument) -> Self {
        let version = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let created_at = parse_version_timestamp(&version);

        Self {
            version,
            created_at,
            file_path: file_path.to_path_buf(),
            operations: document.operations,
        }
    }
}

/// バージョン先頭のタイムスタンプを解析
///
/// `2024_01_15_093000_create_users_table` 形式を想定します。
pub fn parse_version_timestamp(version: &str) -> Option<NaiveDateTime> {
    let prefix = version.get(..17)?;
    NaiveDateTime::parse_from_str(prefix, "%Y_%m_%d_%H%M%S").ok()
}
