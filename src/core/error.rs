// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、TypeParseError, ReflectionError, InferenceError, IoError を定義します。

use thiserror::Error;

/// 型文字列の解析エラー
///
/// 型式を内部表現へ変換できなかった場合に発生します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    /// Empty type expression
    #[error("Empty type expression")]
    Empty,

    /// Unbalanced brackets or quotes
    #[error("Unbalanced type expression: {expression}")]
    Unbalanced {
        /// 解析対象の型式
        expression: String,
    },

    /// Unexpected token
    #[error("Unexpected token '{token}' in type expression: {expression}")]
    UnexpectedToken {
        /// 解釈できなかったトークン
        token: String,
        /// 解析対象の型式
        expression: String,
    },
}

impl TypeParseError {
    /// 空の型式エラーかどうか
    pub fn is_empty(&self) -> bool {
        matches!(self, TypeParseError::Empty)
    }

    /// 括弧不整合エラーかどうか
    pub fn is_unbalanced(&self) -> bool {
        matches!(self, TypeParseError::Unbalanced { .. })
    }

    /// 不正トークンエラーかどうか
    pub fn is_unexpected_token(&self) -> bool {
        matches!(self, TypeParseError::UnexpectedToken { .. })
    }
}

/// リフレクションエラー
///
/// モデルクラスの情報取得やインスタンス化に失敗した場合に発生します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectionError {
    /// Class not found
    #[error("Class not found: {class}")]
    ClassNotFound {
        /// クラス名
        class: String,
    },

    /// Class cannot be instantiated without its constructor
    #[error("Class cannot be instantiated: {class} ({reason})")]
    NotInstantiable {
        /// クラス名
        class: String,
        /// 理由
        reason: String,
    },
}

impl ReflectionError {
    /// クラス未検出エラーかどうか
    pub fn is_class_not_found(&self) -> bool {
        matches!(self, ReflectionError::ClassNotFound { .. })
    }

    /// インスタンス化不可エラーかどうか
    pub fn is_not_instantiable(&self) -> bool {
        matches!(self, ReflectionError::NotInstantiable { .. })
    }
}

/// 型推論エラー
///
/// プロパティ型の解決時に呼び出し元へ伝播するエラーです。
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    /// hasPropertyの事前条件が破られた（内部不変条件違反）
    #[error("Internal error, this should not happen: {message} (model: {class}, property: {property})")]
    ShouldNotHappen {
        /// モデルクラス名
        class: String,
        /// プロパティ名
        property: String,
        /// 詳細
        message: String,
    },

    /// Reflection failure
    #[error("Reflection error: {0}")]
    Reflection(#[from] ReflectionError),

    /// Declared type could not be parsed
    #[error("Type parse error: {0}")]
    TypeParse(#[from] TypeParseError),
}

impl InferenceError {
    /// 内部不変条件違反エラーを作成
    pub fn should_not_happen(class: &str, property: &str, message: impl Into<String>) -> Self {
        InferenceError::ShouldNotHappen {
            class: class.to_string(),
            property: property.to_string(),
            message: message.into(),
        }
    }

    /// 内部不変条件違反かどうか
    pub fn is_should_not_happen(&self) -> bool {
        matches!(self, InferenceError::ShouldNotHappen { .. })
    }

    /// リフレクションエラーかどうか
    pub fn is_reflection(&self) -> bool {
        matches!(self, InferenceError::Reflection(_))
    }

    /// 型解析エラーかどうか
    pub fn is_type_parse(&self) -> bool {
        matches!(self, InferenceError::TypeParse(_))
    }
}

/// I/Oエラー
///
/// ファイル操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// ファイルパス
        path: String,
    },

    /// File read error
    #[error("Failed to read file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

impl IoError {
    /// ファイルが見つからないエラーかどうか
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, IoError::FileNotFound { .. })
    }

    /// ファイル読み込みエラーかどうか
    pub fn is_file_read(&self) -> bool {
        matches!(self, IoError::FileRead { .. })
    }
}
