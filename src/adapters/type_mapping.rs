// 型マッピングサービス
//
// スキーマダンプに現れるSQL型をネイティブカラム種別（ColumnKind）へ変換します。
// 方言固有の解釈は各TypeMapperが先に判定し、残りを共通規則で処理します。

use crate::core::config::Dialect;
use crate::core::schema::ColumnKind;

/// SQL型の解析結果
///
/// `varchar(255)` → name: "varchar", args: ["255"]
/// `timestamp(0) without time zone` → name: "timestamp without time zone", args: ["0"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlType {
    /// 小文字化した型名（複数語の場合は空白区切り）
    pub name: String,
    /// 括弧内の引数（クォートは除去済み）
    pub args: Vec<String>,
    /// UNSIGNED 指定
    pub unsigned: bool,
    /// 配列型（PostgreSQLの `integer[]` など）
    pub array: bool,
}

impl SqlType {
    /// 型名のみのSqlTypeを作成
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// 引数付きのSqlTypeを作成
    pub fn with_args(name: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            args: args.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    fn arg_u32(&self, index: usize) -> Option<u32> {
        self.args.get(index).and_then(|a| a.trim().parse().ok())
    }
}

/// 方言固有の型マッピング
pub trait TypeMapper {
    /// SQL型からColumnKindへ変換（方言固有の型のみ。該当しなければNone）
    fn parse_sql_type(&self, sql_type: &SqlType) -> Option<ColumnKind>;
}

/// PostgreSQL用型マッパー
pub struct PostgresTypeMapper;

/// MySQL用型マッパー
pub struct MySqlTypeMapper;

/// SQLite用型マッパー
pub struct SqliteTypeMapper;

/// SQL Server用型マッパー
pub struct SqlServerTypeMapper;

impl TypeMapper for PostgresTypeMapper {
    fn parse_sql_type(&self, sql_type: &SqlType) -> Option<ColumnKind> {
        match sql_type.name.as_str() {
            "serial" | "serial4" => Some(ColumnKind::Increments),
            "bigserial" | "serial8" => Some(ColumnKind::BigIncrements),
            "smallserial" | "serial2" => Some(ColumnKind::SmallIncrements),
            "inet" | "cidr" => Some(ColumnKind::IpAddress),
            "macaddr" | "macaddr8" => Some(ColumnKind::MacAddress),
            "bytea" => Some(ColumnKind::Binary),
            "timestamptz" | "timestamp with time zone" => Some(ColumnKind::TimestampTz),
            "timetz" | "time with time zone" => Some(ColumnKind::TimeTz),
            _ => None,
        }
    }
}

impl TypeMapper for MySqlTypeMapper {
    fn parse_sql_type(&self, sql_type: &SqlType) -> Option<ColumnKind> {
        match sql_type.name.as_str() {
            // tinyint(1) は真偽値カラム
            "tinyint" if sql_type.arg_u32(0) == Some(1) => Some(ColumnKind::Boolean),
            "datetime" => Some(ColumnKind::DateTime),
            "year" => Some(ColumnKind::Year),
            _ => None,
        }
    }
}

impl TypeMapper for SqliteTypeMapper {
    fn parse_sql_type(&self, sql_type: &SqlType) -> Option<ColumnKind> {
        match sql_type.name.as_str() {
            // SQLiteの型親和性に従い、名前に含まれる語で判定
            name if name.contains("int") && !name.contains("point") => Some(ColumnKind::Integer),
            "numeric" if sql_type.args.is_empty() => Some(ColumnKind::Float),
            _ => None,
        }
    }
}

impl TypeMapper for SqlServerTypeMapper {
    fn parse_sql_type(&self, sql_type: &SqlType) -> Option<ColumnKind> {
        match sql_type.name.as_str() {
            "bit" => Some(ColumnKind::Boolean),
            "nvarchar" | "varchar" if sql_type.args.first().map(|a| a.as_str()) == Some("max") => {
                Some(ColumnKind::Text)
            }
            "uniqueidentifier" => Some(ColumnKind::Uuid),
            "datetime2" | "smalldatetime" => Some(ColumnKind::DateTime),
            "datetimeoffset" => Some(ColumnKind::DateTimeTz),
            "money" | "smallmoney" => Some(ColumnKind::Decimal {
                precision: None,
                scale: Some(4),
            }),
            _ => None,
        }
    }
}

/// 型マッピングサービス
///
/// 方言に依存しない共通インターフェースで SQL型 → ColumnKind の変換を提供します。
pub struct TypeMappingService {
    dialect: Dialect,
    mapper: Box<dyn TypeMapper>,
}

impl TypeMappingService {
    /// 新しいTypeMappingServiceを作成
    pub fn new(dialect: Dialect) -> Self {
        let mapper: Box<dyn TypeMapper> = match dialect {
            Dialect::PostgreSQL => Box::new(PostgresTypeMapper),
            Dialect::MySQL => Box::new(MySqlTypeMapper),
            Dialect::SQLite => Box::new(SqliteTypeMapper),
            Dialect::SqlServer => Box::new(SqlServerTypeMapper),
        };
        Self { dialect, mapper }
    }

    /// 方言を取得
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// SQL型 → ColumnKind
    ///
    /// 解釈できない型は `ColumnKind::Other` になります。
    pub fn to_column_kind(&self, sql_type: &SqlType) -> ColumnKind {
        if sql_type.array {
            return ColumnKind::Other {
                name: format!("{}[]", sql_type.name),
            };
        }

        if let Some(kind) = self.mapper.parse_sql_type(sql_type) {
            return kind;
        }

        parse_common_sql_type(sql_type).unwrap_or_else(|| ColumnKind::Other {
            name: sql_type.name.clone(),
        })
    }
}

/// 方言共通のSQL型変換
fn parse_common_sql_type(sql_type: &SqlType) -> Option<ColumnKind> {
    let unsigned = sql_type.unsigned;

    let kind = match sql_type.name.as_str() {
        "int" | "integer" | "int4" | "mediumint" if unsigned => ColumnKind::UnsignedInteger,
        "int" | "integer" | "int4" => ColumnKind::Integer,
        "mediumint" => ColumnKind::MediumInteger,
        "bigint" | "int8" if unsigned => ColumnKind::UnsignedBigInteger,
        "bigint" | "int8" => ColumnKind::BigInteger,
        "smallint" | "int2" if unsigned => ColumnKind::UnsignedSmallInteger,
        "smallint" | "int2" => ColumnKind::SmallInteger,
        "tinyint" if unsigned => ColumnKind::UnsignedTinyInteger,
        "tinyint" => ColumnKind::TinyInteger,

        "decimal" | "numeric" => {
            let precision = sql_type.arg_u32(0);
            let scale = sql_type.arg_u32(1);
            if unsigned {
                ColumnKind::UnsignedDecimal { precision, scale }
            } else {
                ColumnKind::Decimal { precision, scale }
            }
        }
        "float" | "real" | "float4" => ColumnKind::Float,
        "double" | "double precision" | "float8" => ColumnKind::Double,

        "boolean" | "bool" => ColumnKind::Boolean,

        "char" | "character" | "nchar" | "bpchar" => ColumnKind::Char {
            length: sql_type.arg_u32(0),
        },
        "varchar" | "character varying" | "nvarchar" | "varchar2" => ColumnKind::String {
            length: sql_type.arg_u32(0),
        },
        "text" | "ntext" | "citext" | "clob" => ColumnKind::Text,
        "tinytext" => ColumnKind::TinyText,
        "mediumtext" => ColumnKind::MediumText,
        "longtext" => ColumnKind::LongText,

        "uuid" => ColumnKind::Uuid,
        "json" => ColumnKind::Json,
        "jsonb" => ColumnKind::Jsonb,

        "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary" | "image" => {
            ColumnKind::Binary
        }

        "date" => ColumnKind::Date,
        "datetime" => ColumnKind::DateTime,
        "time" | "time without time zone" => ColumnKind::Time,
        "timestamp" | "timestamp without time zone" => ColumnKind::Timestamp,
        "year" => ColumnKind::Year,

        "geometry" | "geography" => ColumnKind::Geometry,
        "point" => ColumnKind::Point,

        "enum" => ColumnKind::Enum {
            values: sql_type.args.clone(),
        },
        "set" => ColumnKind::Set {
            values: sql_type.args.clone(),
        },

        _ => return None,
    };

    Some(kind)
}
