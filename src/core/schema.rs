// スキーマドメインモデル
//
// マイグレーションの再生結果として得られるスキーマ状態を表現する型システム。
// Schema, Table, Column と、ネイティブカラム種別 ColumnKind を提供します。

use crate::core::types::PropertyType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// スキーマ定義
///
/// テーブル名からテーブル定義へのマッピングです。
/// 再生完了後はプロセス終了まで不変として扱います。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    /// テーブル定義のマップ（テーブル名 -> Table）
    pub tables: HashMap<String, Table>,
}

impl Schema {
    /// 空のスキーマを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// テーブルを追加（同名テーブルは上書き）
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// 指定されたテーブルが存在するか確認
    pub fn has_table(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    /// 指定されたテーブルを取得
    pub fn get_table(&self, table_name: &str) -> Option<&Table> {
        self.tables.get(table_name)
    }

    /// 指定されたテーブルを可変参照で取得
    pub fn get_table_mut(&mut self, table_name: &str) -> Option<&mut Table> {
        self.tables.get_mut(table_name)
    }

    /// テーブルを取得し、存在しなければ作成
    pub fn table_or_create(&mut self, table_name: &str) -> &mut Table {
        self.tables
            .entry(table_name.to_string())
            .or_insert_with(|| Table::new(table_name.to_string()))
    }

    /// テーブルを削除
    pub fn remove_table(&mut self, table_name: &str) -> Option<Table> {
        self.tables.remove(table_name)
    }

    /// テーブル名を変更
    ///
    /// 変更元が存在しない場合は何もせず false を返します。
    pub fn rename_table(&mut self, from: &str, to: &str) -> bool {
        match self.tables.remove(from) {
            Some(mut table) => {
                table.name = to.to_string();
                self.tables.insert(to.to_string(), table);
                true
            }
            None => false,
        }
    }

    /// テーブルのカラムを取得
    pub fn get_column(&self, table_name: &str, column_name: &str) -> Option<&Column> {
        self.get_table(table_name)
            .and_then(|table| table.get_column(column_name))
    }

    /// テーブル数を取得
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// テーブル名を昇順で取得
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// テーブル定義
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// テーブル名
    pub name: String,

    /// カラム定義のマップ（カラム名 -> Column）
    pub columns: HashMap<String, Column>,
}

impl Table {
    /// 新しいテーブルを作成
    pub fn new(name: String) -> Self {
        Self {
            name,
            columns: HashMap::new(),
        }
    }

    /// カラムを追加（同名カラムは上書き）
    pub fn set_column(&mut self, column: Column) {
        self.columns.insert(column.name.clone(), column);
    }

    /// 指定されたカラムを取得
    pub fn get_column(&self, column_name: &str) -> Option<&Column> {
        self.columns.get(column_name)
    }

    /// 指定されたカラムが存在するか確認
    pub fn has_column(&self, column_name: &str) -> bool {
        self.columns.contains_key(column_name)
    }

    /// カラムを削除
    pub fn remove_column(&mut self, column_name: &str) -> Option<Column> {
        self.columns.remove(column_name)
    }

    /// カラム名を変更
    ///
    /// 変更元が存在しない場合は何もせず false を返します。
    /// 変更先が既に存在する場合は上書きします。
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.columns.remove(from) {
            Some(mut column) => {
                column.name = to.to_string();
                self.columns.insert(to.to_string(), column);
                true
            }
            None => false,
        }
    }

    /// カラム名を昇順で取得
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// カラム定義
///
/// readable_type と writeable_type はそれぞれ独立して保持されます。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// カラム名
    pub name: String,

    /// 読み取り時の型
    pub readable_type: PropertyType,

    /// 書き込み時の型
    pub writeable_type: PropertyType,

    /// NULL許可フラグ
    pub nullable: bool,

    /// 列挙値（enum/set 以外は空）
    pub options: Vec<String>,
}

impl Column {
    /// カラム仕様からカラムを作成
    pub fn from_spec(spec: &ColumnSpec) -> Self {
        Self {
            name: spec.name.clone(),
            readable_type: spec.kind.readable_type(),
            writeable_type: spec.kind.writeable_type(),
            nullable: spec.nullable,
            options: spec.kind.options(),
        }
    }
}

/// カラム仕様
///
/// マイグレーション操作が運ぶカラム定義です。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// カラム名
    pub name: String,

    /// ネイティブカラム種別
    #[serde(flatten)]
    pub kind: ColumnKind,

    /// NULL許可フラグ
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnSpec {
    /// 新しいカラム仕様を作成
    pub fn new(name: impl Into<String>, kind: ColumnKind, nullable: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable,
        }
    }
}

/// ネイティブカラム種別
///
/// マイグレーションで宣言されるカラムの種類です。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    // 整数型
    Id,
    Increments,
    BigIncrements,
    MediumIncrements,
    SmallIncrements,
    TinyIncrements,
    Integer,
    BigInteger,
    MediumInteger,
    SmallInteger,
    TinyInteger,
    UnsignedInteger,
    UnsignedBigInteger,
    UnsignedMediumInteger,
    UnsignedSmallInteger,
    UnsignedTinyInteger,
    ForeignId,
    Year,

    // 数値型
    Decimal {
        #[serde(default)]
        precision: Option<u32>,
        #[serde(default)]
        scale: Option<u32>,
    },
    UnsignedDecimal {
        #[serde(default)]
        precision: Option<u32>,
        #[serde(default)]
        scale: Option<u32>,
    },
    Float,
    Double,

    /// 真偽値型
    Boolean,

    // 文字列型
    Char {
        #[serde(default)]
        length: Option<u32>,
    },
    String {
        #[serde(default)]
        length: Option<u32>,
    },
    Text,
    TinyText,
    MediumText,
    LongText,
    Uuid,
    Ulid,
    ForeignUuid,
    ForeignUlid,
    IpAddress,
    MacAddress,
    Binary,
    Json,
    Jsonb,
    RememberToken,

    // 日時型（キャストが無ければ文字列として扱う）
    Date,
    DateTime,
    DateTimeTz,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,

    // 空間型
    Geometry,
    Point,

    /// 列挙型
    Enum { values: Vec<String> },

    /// 集合型
    Set { values: Vec<String> },

    /// 解釈できない型
    Other { name: String },
}

impl ColumnKind {
    /// 整数系の種別かどうか
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnKind::Id
                | ColumnKind::Increments
                | ColumnKind::BigIncrements
                | ColumnKind::MediumIncrements
                | ColumnKind::SmallIncrements
                | ColumnKind::TinyIncrements
                | ColumnKind::Integer
                | ColumnKind::BigInteger
                | ColumnKind::MediumInteger
                | ColumnKind::SmallInteger
                | ColumnKind::TinyInteger
                | ColumnKind::UnsignedInteger
                | ColumnKind::UnsignedBigInteger
                | ColumnKind::UnsignedMediumInteger
                | ColumnKind::UnsignedSmallInteger
                | ColumnKind::UnsignedTinyInteger
                | ColumnKind::ForeignId
                | ColumnKind::Year
        )
    }

    /// 浮動小数点・固定小数点系の種別かどうか
    pub fn is_fractional(&self) -> bool {
        matches!(
            self,
            ColumnKind::Decimal { .. }
                | ColumnKind::UnsignedDecimal { .. }
                | ColumnKind::Float
                | ColumnKind::Double
        )
    }

    /// 読み取り時の型
    pub fn readable_type(&self) -> PropertyType {
        if self.is_integer() {
            return PropertyType::Int;
        }
        if self.is_fractional() {
            return PropertyType::Float;
        }

        match self {
            ColumnKind::Boolean => PropertyType::Bool,
            ColumnKind::Enum { values } if !values.is_empty() => PropertyType::union(
                values
                    .iter()
                    .map(|v| PropertyType::StringLiteral(v.clone())),
            ),
            ColumnKind::Other { .. } => PropertyType::Mixed,
            _ => PropertyType::String,
        }
    }

    /// 書き込み時の型
    ///
    /// 数値カラムは数値文字列の代入も受け付けます。
    pub fn writeable_type(&self) -> PropertyType {
        if self.is_integer() {
            return PropertyType::union([PropertyType::Int, PropertyType::NumericString]);
        }
        if self.is_fractional() {
            return PropertyType::union([
                PropertyType::Float,
                PropertyType::Int,
                PropertyType::NumericString,
            ]);
        }
        self.readable_type()
    }

    /// 列挙値
    pub fn options(&self) -> Vec<String> {
        match self {
            ColumnKind::Enum { values } | ColumnKind::Set { values } => values.clone(),
            _ => Vec::new(),
        }
    }
}
