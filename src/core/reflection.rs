// リフレクション契約
//
// ホスト型チェッカーのリフレクションAPIを抽象化したトレイトを定義します。
// 実装はリフレクションの代わりに明示的なメタデータ表を使用できます。

use crate::core::error::ReflectionError;
use crate::core::model::ModelInstance;
use crate::core::types::PropertyType;
use serde::{Deserialize, Serialize};

/// 属性キャスト記述子のクラス
pub const ATTRIBUTE_CLASS: &str = "Illuminate\\Database\\Eloquent\\Casts\\Attribute";

/// メソッドの可視性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// メソッド情報
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    /// メソッド名
    pub name: String,
    /// 可視性
    pub visibility: Visibility,
    /// 戻り値の型（宣言が無い場合はNone）
    pub return_type: Option<PropertyType>,
}

impl MethodInfo {
    /// 属性キャスト記述子を返すメソッドかどうか
    pub fn returns_attribute(&self) -> bool {
        self.return_type
            .as_ref()
            .is_some_and(|ty| ty.is_object_of(ATTRIBUTE_CLASS))
    }
}

/// カスタムキャストクラスの契約
#[derive(Debug, Clone, PartialEq)]
pub enum CastClass {
    /// 値オブジェクトキャスト（get/set を持つ）
    ValueObject {
        /// get が返す型
        get: PropertyType,
        /// set が受け付ける型（宣言が無い場合はNone）
        set: Option<PropertyType>,
    },
    /// 書き込み専用キャスト（読み取りはカラムの型のまま）
    Inbound {
        /// set が受け付ける型
        set: Option<PropertyType>,
    },
    /// キャスト実装を別クラスに委譲するクラス
    Castable {
        /// 委譲先のキャストクラス
        caster: String,
    },
    /// キャスト契約を持たない既存クラス（列挙型など）
    Plain,
}

/// モデルクラスのリフレクション
pub trait ModelReflector {
    /// モデルクラスのサブクラスかどうか
    fn is_subclass_of_model(&self, class: &str) -> bool;

    /// 抽象クラスかどうか
    fn is_abstract(&self, class: &str) -> bool;

    /// クラス自身が宣言するメソッドを取得（大文字小文字を区別しない）
    fn native_method(&self, class: &str, method: &str) -> Option<MethodInfo>;

    /// コンストラクタを経由せずにインスタンスを生成
    fn instantiate_bare(&self, class: &str) -> Result<ModelInstance, ReflectionError>;

    /// キャストクラスとして参照できるクラスを取得
    fn cast_class(&self, class: &str) -> Option<CastClass>;

    /// メソッドが存在するかどうか
    fn has_native_method(&self, class: &str, method: &str) -> bool {
        self.native_method(class, method).is_some()
    }
}

/// 型タグ（アノテーション）の参照
pub trait PropertyTagLookup {
    /// ユーザーが明示的に型を宣言したプロパティかどうか
    fn has_property_tag(&self, class: &str, property: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_attribute() {
        let method = MethodInfo {
            name: "firstName".to_string(),
            visibility: Visibility::Protected,
            return_type: Some(PropertyType::generic(
                "\\Illuminate\\Database\\Eloquent\\Casts\\Attribute",
                vec![PropertyType::String, PropertyType::Mixed],
            )),
        };
        assert!(method.returns_attribute());

        let plain = MethodInfo {
            name: "posts".to_string(),
            visibility: Visibility::Public,
            return_type: Some(PropertyType::object(
                "Illuminate\\Database\\Eloquent\\Relations\\HasMany",
            )),
        };
        assert!(!plain.returns_attribute());

        let untyped = MethodInfo {
            name: "firstName".to_string(),
            visibility: Visibility::Protected,
            return_type: None,
        };
        assert!(!untyped.returns_attribute());
    }
}
