// 型表現
//
// プロパティの読み取り型・書き込み型を表す型式（PropertyType）と、
// 型文字列をPropertyTypeへ変換するTypeStringResolverを提供します。

use crate::core::error::TypeParseError;
use serde::{Serialize, Serializer};
use std::fmt;

/// 日付キャストの既定クラス
pub const DEFAULT_DATE_CLASS: &str = "Illuminate\\Support\\Carbon";

/// コレクションクラス
pub const COLLECTION_CLASS: &str = "Illuminate\\Support\\Collection";

/// イミュータブル日付クラス
pub const IMMUTABLE_DATE_CLASS: &str = "Carbon\\CarbonImmutable";

/// プロパティ型
///
/// ホスト型チェッカーへ渡す前の内部型表現です。
/// 文字列化は境界（Display）でのみ行います。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    Int,
    Float,
    String,
    NumericString,
    Bool,
    Null,
    /// 制約なし（不明）
    Mixed,
    /// 配列キー（int|string）
    ArrayKey,
    /// 任意のオブジェクト
    AnyObject,
    /// 整数リテラル
    IntLiteral(i64),
    /// 文字列リテラル
    StringLiteral(String),
    /// 配列
    Array {
        key: Box<PropertyType>,
        value: Box<PropertyType>,
    },
    /// クラス参照（ジェネリクス引数付き）
    Object {
        class: String,
        type_args: Vec<PropertyType>,
    },
    /// 和型
    Union(Vec<PropertyType>),
}

impl PropertyType {
    /// クラス参照を作成
    pub fn object(class: impl Into<String>) -> Self {
        PropertyType::Object {
            class: normalize_class_name(&class.into()),
            type_args: Vec::new(),
        }
    }

    /// ジェネリクス引数付きのクラス参照を作成
    pub fn generic(class: impl Into<String>, type_args: Vec<PropertyType>) -> Self {
        PropertyType::Object {
            class: normalize_class_name(&class.into()),
            type_args,
        }
    }

    /// `array<array-key, mixed>`
    pub fn mixed_array() -> Self {
        PropertyType::Array {
            key: Box::new(PropertyType::ArrayKey),
            value: Box::new(PropertyType::Mixed),
        }
    }

    /// スカラー型（int|float|string|bool）
    pub fn scalar() -> Self {
        PropertyType::Union(vec![
            PropertyType::Int,
            PropertyType::Float,
            PropertyType::String,
            PropertyType::Bool,
        ])
    }

    /// 複数の型の和を作成
    ///
    /// ネストした和型は平坦化し、重複は除去します。
    /// Mixedを含む場合はMixedに吸収されます。
    pub fn union<I>(types: I) -> Self
    where
        I: IntoIterator<Item = PropertyType>,
    {
        let mut members: Vec<PropertyType> = Vec::new();

        for ty in types {
            let flattened = match ty {
                PropertyType::Union(inner) => inner,
                other => vec![other],
            };
            for member in flattened {
                if member == PropertyType::Mixed {
                    return PropertyType::Mixed;
                }
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }

        match members.len() {
            0 => PropertyType::Mixed,
            1 => members.remove(0),
            _ => PropertyType::Union(members),
        }
    }

    /// nullを加えた型を返す（冪等）
    pub fn nullable(self) -> Self {
        PropertyType::union([self, PropertyType::Null])
    }

    /// nullを受け入れるかどうか
    pub fn accepts_null(&self) -> bool {
        match self {
            PropertyType::Null | PropertyType::Mixed => true,
            PropertyType::Union(members) => members.iter().any(|m| m.accepts_null()),
            _ => false,
        }
    }

    /// 指定クラスの参照かどうか
    pub fn is_object_of(&self, class: &str) -> bool {
        match self {
            PropertyType::Object { class: own, .. } => {
                own.eq_ignore_ascii_case(&normalize_class_name(class))
            }
            _ => false,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Int => write!(f, "int"),
            PropertyType::Float => write!(f, "float"),
            PropertyType::String => write!(f, "string"),
            PropertyType::NumericString => write!(f, "numeric-string"),
            PropertyType::Bool => write!(f, "bool"),
            PropertyType::Null => write!(f, "null"),
            PropertyType::Mixed => write!(f, "mixed"),
            PropertyType::ArrayKey => write!(f, "array-key"),
            PropertyType::AnyObject => write!(f, "object"),
            PropertyType::IntLiteral(value) => write!(f, "{}", value),
            PropertyType::StringLiteral(value) => {
                write!(f, "'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
            }
            PropertyType::Array { key, value } => write!(f, "array<{}, {}>", key, value),
            PropertyType::Object { class, type_args } => {
                write!(f, "{}", class)?;
                if !type_args.is_empty() {
                    let args: Vec<String> = type_args.iter().map(|a| a.to_string()).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
            PropertyType::Union(members) => {
                let parts: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "{}", parts.join("|"))
            }
        }
    }
}

impl Serialize for PropertyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// クラス名の先頭のバックスラッシュを除去
fn normalize_class_name(class: &str) -> String {
    class.trim().trim_start_matches('\\').to_string()
}

/// 型文字列リゾルバー
///
/// `int|null`、`?string`、`array<string, int>`、`App\Money` のような
/// 型文字列をPropertyTypeへ変換します。
#[derive(Debug, Clone, Default)]
pub struct TypeStringResolver;

impl TypeStringResolver {
    /// 新しいTypeStringResolverを作成
    pub fn new() -> Self {
        Self
    }

    /// 型文字列を解決
    ///
    /// # Errors
    ///
    /// - 空の型式
    /// - 括弧の対応が取れていない型式
    /// - 解釈できないトークン
    pub fn resolve(&self, expression: &str) -> Result<PropertyType, TypeParseError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(TypeParseError::Empty);
        }

        let parts = split_top_level(trimmed, '|', expression)?;
        let mut members = Vec::with_capacity(parts.len());
        for part in parts {
            members.push(self.resolve_atom(part.trim(), expression)?);
        }

        Ok(PropertyType::union(members))
    }

    fn resolve_atom(&self, atom: &str, source: &str) -> Result<PropertyType, TypeParseError> {
        if atom.is_empty() {
            return Err(TypeParseError::UnexpectedToken {
                token: "|".to_string(),
                expression: source.to_string(),
            });
        }

        // ?T は T|null の省略形
        if let Some(rest) = atom.strip_prefix('?') {
            return Ok(self.resolve_atom(rest.trim(), source)?.nullable());
        }

        if let Some(literal) = parse_string_literal(atom) {
            return Ok(PropertyType::StringLiteral(literal));
        }

        if let Ok(value) = atom.parse::<i64>() {
            return Ok(PropertyType::IntLiteral(value));
        }

        let (name, args) = match atom.find('<') {
            Some(open) => {
                if !atom.ends_with('>') {
                    return Err(TypeParseError::Unbalanced {
                        expression: source.to_string(),
                    });
                }
                let inner = &atom[open + 1..atom.len() - 1];
                let mut args = Vec::new();
                for arg in split_top_level(inner, ',', source)? {
                    args.push(self.resolve(arg).map_err(|e| match e {
                        TypeParseError::Empty => TypeParseError::UnexpectedToken {
                            token: ",".to_string(),
                            expression: source.to_string(),
                        },
                        other => other,
                    })?);
                }
                (atom[..open].trim(), args)
            }
            None => (atom, Vec::new()),
        };

        if !is_identifier(name) {
            return Err(TypeParseError::UnexpectedToken {
                token: name.to_string(),
                expression: source.to_string(),
            });
        }

        let keyword = match name.to_ascii_lowercase().as_str() {
            "int" | "integer" => Some(PropertyType::Int),
            "float" | "double" => Some(PropertyType::Float),
            "string" => Some(PropertyType::String),
            "numeric-string" => Some(PropertyType::NumericString),
            "bool" | "boolean" => Some(PropertyType::Bool),
            "null" => Some(PropertyType::Null),
            "mixed" => Some(PropertyType::Mixed),
            "array-key" => Some(PropertyType::ArrayKey),
            "object" => Some(PropertyType::AnyObject),
            "scalar" => Some(PropertyType::scalar()),
            "array" => Some(match args.len() {
                0 => PropertyType::mixed_array(),
                1 => PropertyType::Array {
                    key: Box::new(PropertyType::ArrayKey),
                    value: Box::new(args[0].clone()),
                },
                _ => PropertyType::Array {
                    key: Box::new(args[0].clone()),
                    value: Box::new(args[1].clone()),
                },
            }),
            _ => None,
        };

        Ok(keyword.unwrap_or_else(|| PropertyType::generic(name, args)))
    }
}

/// 文字列リテラル（'...' または "..."）を解釈
fn parse_string_literal(atom: &str) -> Option<String> {
    let quote = atom.chars().next()?;
    if (quote != '\'' && quote != '"') || atom.len() < 2 || !atom.ends_with(quote) {
        return None;
    }
    let inner = &atom[1..atom.len() - 1];
    Some(inner.replace(&format!("\\{}", quote), &quote.to_string()))
}

/// 型名・クラス名として有効な文字だけで構成されているか
fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\\' || c == '-')
}

/// 括弧とクォートの外側にある区切り文字で分割
fn split_top_level<'a>(
    input: &'a str,
    separator: char,
    source: &str,
) -> Result<Vec<&'a str>, TypeParseError> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (pos, c) in input.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(TypeParseError::Unbalanced {
                            expression: source.to_string(),
                        });
                    }
                }
                c if c == separator && depth == 0 => {
                    parts.push(&input[start..pos]);
                    start = pos + c.len_utf8();
                }
                _ => {}
            },
        }
    }

    if depth != 0 || quote.is_some() {
        return Err(TypeParseError::Unbalanced {
            expression: source.to_string(),
        });
    }

    parts.push(&input[start..]);
    Ok(parts)
}
