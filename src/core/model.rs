// モデルドメインモデル
//
// リフレクションで観測されるモデルインスタンスの設定（ModelInstance）と、
// 推論結果（ModelProperty）を表現します。

use crate::core::naming;
use crate::core::types::PropertyType;
use serde::Serialize;
use std::collections::HashMap;

/// コンストラクタを経由せずに生成したモデルインスタンス
///
/// テーブル名・主キー・キャスト・日付属性など、
/// 型推論に必要なモデルの設定値を保持します。
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
    /// モデルクラス名
    pub class: String,

    /// テーブル名（未指定時はクラス名から導出）
    pub table: Option<String>,

    /// 主キー名
    pub key_name: String,

    /// 主キーの宣言型（型文字列）
    pub key_type: String,

    /// キャスト定義（プロパティ名 -> キャスト指定）
    pub casts: HashMap<String, String>,

    /// 明示的な日付属性
    pub dates: Vec<String>,

    /// タイムスタンプを使用するかどうか
    pub timestamps: bool,

    /// 作成日時カラム名
    pub created_at_column: String,

    /// 更新日時カラム名
    pub updated_at_column: String,

    /// 論理削除カラム名（論理削除を使用しない場合はNone）
    pub deleted_at_column: Option<String>,
}

impl ModelInstance {
    /// 既定値でモデルインスタンスを作成
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            table: None,
            key_name: "id".to_string(),
            key_type: "int".to_string(),
            casts: HashMap::new(),
            dates: Vec::new(),
            timestamps: true,
            created_at_column: "created_at".to_string(),
            updated_at_column: "updated_at".to_string(),
            deleted_at_column: None,
        }
    }

    /// テーブル名を取得
    pub fn get_table(&self) -> String {
        self.table
            .clone()
            .unwrap_or_else(|| naming::table_name_for(&self.class))
    }

    /// 主キー名を取得
    pub fn get_key_name(&self) -> &str {
        &self.key_name
    }

    /// 主キーの宣言型を取得
    pub fn get_key_type(&self) -> &str {
        &self.key_type
    }

    /// キャスト指定を取得
    pub fn get_cast(&self, property: &str) -> Option<&str> {
        self.casts.get(property).map(|c| c.as_str())
    }

    /// 日付属性の一覧を取得
    ///
    /// タイムスタンプ使用時は作成日時・更新日時カラムを含みます。
    pub fn get_dates(&self) -> Vec<String> {
        let mut dates = Vec::new();
        if self.timestamps {
            dates.push(self.created_at_column.clone());
            dates.push(self.updated_at_column.clone());
        }
        for date in &self.dates {
            if !dates.contains(date) {
                dates.push(date.clone());
            }
        }
        dates
    }

    /// 論理削除カラム名を取得
    pub fn get_deleted_at_column(&self) -> Option<&str> {
        self.deleted_at_column.as_deref()
    }

    /// 日付として扱うプロパティかどうか
    pub fn is_date_attribute(&self, property: &str) -> bool {
        self.get_dates().iter().any(|d| d == property)
            || self.get_deleted_at_column() == Some(property)
    }
}

/// 推論されたモデルプロパティ
///
/// 問い合わせごとに新しく生成される値オブジェクトです。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelProperty {
    /// 宣言クラス
    pub declaring_class: String,

    /// 読み取り時の型
    pub readable_type: PropertyType,

    /// 書き込み時の型
    pub writable_type: PropertyType,
}

impl ModelProperty {
    /// 新しいModelPropertyを作成
    pub fn new(
        declaring_class: impl Into<String>,
        readable_type: PropertyType,
        writable_type: PropertyType,
    ) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            readable_type,
            writable_type,
        }
    }
}
