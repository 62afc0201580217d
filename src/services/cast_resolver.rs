// キャスト解決サービス
//
// モデルのキャスト指定とカラムのネイティブ型から、
// 読み取り時・書き込み時の型を計算します。
// NULL許可の反映は呼び出し側（プロパティ型エンジン）が行います。

use crate::core::config::Dialect;
use crate::core::reflection::{CastClass, ModelReflector};
use crate::core::types::{PropertyType, COLLECTION_CLASS, DEFAULT_DATE_CLASS, IMMUTABLE_DATE_CLASS};
use tracing::debug;

/// Castable の委譲を辿る上限
const MAX_CASTABLE_DEPTH: usize = 8;

/// キャスト種別
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastKind {
    /// boolean / bool
    Boolean,
    /// integer / int / timestamp
    Integer,
    /// real / double / float
    Float,
    /// string / decimal / hashed
    String,
    /// array / json
    Array,
    /// object
    Object,
    /// date / datetime / custom_datetime
    Date,
    /// immutable_date / immutable_datetime / immutable_custom_datetime
    ImmutableDate,
    /// collection
    Collection,
    /// 組み込みでない種別（クラス名として扱う）
    Class(String),
}

impl CastKind {
    /// キャスト指定を解析
    ///
    /// コロン以降のパラメータは除去します。
    /// `encrypted:<X>` は X として、パラメータの無い `encrypted` は文字列として扱います。
    pub fn parse(cast: &str) -> Self {
        let cast = cast.trim();
        let (name, parameter) = match cast.split_once(':') {
            Some((name, parameter)) => (name.trim(), Some(parameter.trim())),
            None => (cast, None),
        };

        match name.to_ascii_lowercase().as_str() {
            "encrypted" => match parameter {
                Some(inner) if !inner.is_empty() => Self::parse(inner),
                _ => CastKind::String,
            },
            "boolean" | "bool" => CastKind::Boolean,
            "integer" | "int" | "timestamp" => CastKind::Integer,
            "real" | "double" | "float" => CastKind::Float,
            "string" | "decimal" | "hashed" => CastKind::String,
            "array" | "json" => CastKind::Array,
            "object" => CastKind::Object,
            "date" | "datetime" | "custom_datetime" => CastKind::Date,
            "immutable_date" | "immutable_datetime" | "immutable_custom_datetime" => {
                CastKind::ImmutableDate
            }
            "collection" => CastKind::Collection,
            _ => CastKind::Class(name.trim_start_matches('\\').to_string()),
        }
    }
}

/// キャスト解決
pub struct CastResolver<'a> {
    dialect: Dialect,
    date_class: &'a str,
    classes: &'a dyn ModelReflector,
}

impl<'a> CastResolver<'a> {
    /// 新しいCastResolverを作成
    ///
    /// # Arguments
    ///
    /// * `dialect` - 使用中のデータベース方言（真偽値キャストの書き込み型を選択）
    /// * `date_class` - 日付キャストで使用するクラス
    /// * `classes` - キャストクラスの参照先
    pub fn new(dialect: Dialect, date_class: &'a str, classes: &'a dyn ModelReflector) -> Self {
        Self {
            dialect,
            date_class,
            classes,
        }
    }

    /// 読み取り時の型
    pub fn get_readable_type(&self, cast: &str, original: &PropertyType) -> PropertyType {
        match CastKind::parse(cast) {
            CastKind::Boolean => PropertyType::Bool,
            CastKind::Integer => PropertyType::Int,
            CastKind::Float => PropertyType::Float,
            CastKind::String => PropertyType::String,
            CastKind::Array => PropertyType::mixed_array(),
            CastKind::Object => PropertyType::AnyObject,
            CastKind::Date => self.get_date_type(),
            CastKind::ImmutableDate => PropertyType::object(IMMUTABLE_DATE_CLASS),
            CastKind::Collection => mixed_collection(),
            CastKind::Class(class) => self.class_readable_type(&class, original, 0),
        }
    }

    /// 書き込み時の型
    pub fn get_writeable_type(&self, cast: &str, original: &PropertyType) -> PropertyType {
        match CastKind::parse(cast) {
            CastKind::Boolean if self.dialect.has_native_boolean() => PropertyType::Bool,
            CastKind::Boolean => PropertyType::union([
                PropertyType::IntLiteral(0),
                PropertyType::IntLiteral(1),
                PropertyType::Bool,
            ]),
            CastKind::Integer => PropertyType::Int,
            CastKind::Float => PropertyType::Float,
            CastKind::String => PropertyType::String,
            // JSONとして保存できるスカラーも受け付ける
            CastKind::Array => PropertyType::union([
                PropertyType::mixed_array(),
                PropertyType::Int,
                PropertyType::Float,
                PropertyType::String,
                PropertyType::Bool,
            ]),
            CastKind::Object => PropertyType::AnyObject,
            CastKind::Date => PropertyType::union([self.get_date_type(), PropertyType::String]),
            CastKind::ImmutableDate => PropertyType::union([
                PropertyType::object(IMMUTABLE_DATE_CLASS),
                PropertyType::String,
            ]),
            CastKind::Collection => {
                PropertyType::union([mixed_collection(), PropertyType::mixed_array()])
            }
            CastKind::Class(class) => self.class_writeable_type(&class, original, 0),
        }
    }

    /// 日付型
    ///
    /// 既定以外の日付クラスが設定されている場合は既定クラスとの和になります。
    pub fn get_date_type(&self) -> PropertyType {
        let configured = PropertyType::object(self.date_class);
        if configured.is_object_of(DEFAULT_DATE_CLASS) {
            return configured;
        }
        PropertyType::union([configured, PropertyType::object(DEFAULT_DATE_CLASS)])
    }

    fn class_readable_type(&self, class: &str, original: &PropertyType, depth: usize) -> PropertyType {
        match self.lookup_cast_class(class, depth) {
            Some(CastClass::ValueObject { get, .. }) => get,
            Some(CastClass::Inbound { .. }) => original.clone(),
            Some(CastClass::Castable { caster }) => {
                self.class_readable_type(&caster, original, depth + 1)
            }
            Some(CastClass::Plain) => PropertyType::object(class),
            None => PropertyType::Mixed,
        }
    }

    fn class_writeable_type(
        &self,
        class: &str,
        original: &PropertyType,
        depth: usize,
    ) -> PropertyType {
        match self.lookup_cast_class(class, depth) {
            Some(CastClass::ValueObject { get, set: Some(set) }) => PropertyType::union([get, set]),
            Some(CastClass::ValueObject { get, set: None }) => get,
            Some(CastClass::Inbound { set }) => set.unwrap_or_else(|| original.clone()),
            Some(CastClass::Castable { caster }) => {
                self.class_writeable_type(&caster, original, depth + 1)
            }
            Some(CastClass::Plain) => PropertyType::object(class),
            None => PropertyType::Mixed,
        }
    }

    fn lookup_cast_class(&self, class: &str, depth: usize) -> Option<CastClass> {
        if depth > MAX_CASTABLE_DEPTH {
            debug!(class, "Castable delegation is too deep, treating as mixed");
            return None;
        }
        // キャスト定義の無いモデルクラスもクラスとして存在する
        self.classes.cast_class(class).or_else(|| {
            self.classes
                .is_subclass_of_model(class)
                .then_some(CastClass::Plain)
        })
    }
}

/// `Illuminate\Support\Collection<array-key, mixed>`
fn mixed_collection() -> PropertyType {
    PropertyType::generic(
        COLLECTION_CLASS,
        vec![PropertyType::ArrayKey, PropertyType::Mixed],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ReflectionError;
    use crate::core::model::ModelInstance;
    use crate::core::reflection::MethodInfo;
    use std::collections::HashMap;

    #[derive(Default)]
    struct CastClasses {
        classes: HashMap<String, CastClass>,
        models: Vec<String>,
    }

    impl CastClasses {
        fn with(mut self, class: &str, cast: CastClass) -> Self {
            self.classes.insert(class.to_string(), cast);
            self
        }

        fn with_model(mut self, class: &str) -> Self {
            self.models.push(class.to_string());
            self
        }
    }

    impl ModelReflector for CastClasses {
        fn is_subclass_of_model(&self, class: &str) -> bool {
            self.models.iter().any(|model| model == class)
        }

        fn is_abstract(&self, _class: &str) -> bool {
            false
        }

        fn native_method(&self, _class: &str, _method: &str) -> Option<MethodInfo> {
            None
        }

        fn instantiate_bare(&self, class: &str) -> Result<ModelInstance, ReflectionError> {
            Err(ReflectionError::ClassNotFound {
                class: class.to_string(),
            })
        }

        fn cast_class(&self, class: &str) -> Option<CastClass> {
            self.classes.get(class).cloned()
        }
    }

    fn render(ty: PropertyType) -> String {
        ty.to_string()
    }

    #[test]
    fn test_parse_cast_kind() {
        assert_eq!(CastKind::parse("bool"), CastKind::Boolean);
        assert_eq!(CastKind::parse("decimal:2"), CastKind::String);
        assert_eq!(CastKind::parse("datetime:Y-m-d"), CastKind::Date);
        assert_eq!(CastKind::parse("encrypted:array"), CastKind::Array);
        assert_eq!(CastKind::parse("encrypted"), CastKind::String);
        assert_eq!(
            CastKind::parse("\\App\\Casts\\Money:EUR"),
            CastKind::Class("App\\Casts\\Money".to_string())
        );
    }

    #[test]
    fn test_primitive_casts() {
        let classes = CastClasses::default();
        let resolver = CastResolver::new(Dialect::PostgreSQL, DEFAULT_DATE_CLASS, &classes);
        let original = PropertyType::String;

        assert_eq!(render(resolver.get_readable_type("int", &original)), "int");
        assert_eq!(render(resolver.get_readable_type("double", &original)), "float");
        assert_eq!(render(resolver.get_writeable_type("decimal:2", &original)), "string");
        assert_eq!(render(resolver.get_readable_type("object", &original)), "object");
        assert_eq!(
            render(resolver.get_writeable_type("array", &original)),
            "array<array-key, mixed>|int|float|string|bool"
        );
    }

    #[test]
    fn test_boolean_cast_depends_on_dialect() {
        let classes = CastClasses::default();
        let original = PropertyType::Int;

        let postgres = CastResolver::new(Dialect::PostgreSQL, DEFAULT_DATE_CLASS, &classes);
        assert_eq!(postgres.get_writeable_type("boolean", &original), PropertyType::Bool);

        for dialect in [Dialect::MySQL, Dialect::SQLite, Dialect::SqlServer] {
            let resolver = CastResolver::new(dialect, DEFAULT_DATE_CLASS, &classes);
            assert_eq!(resolver.get_readable_type("boolean", &original), PropertyType::Bool);
            assert_eq!(render(resolver.get_writeable_type("boolean", &original)), "0|1|bool");
        }
    }

    #[test]
    fn test_encrypted_array_matches_array() {
        let classes = CastClasses::default();
        let resolver = CastResolver::new(Dialect::MySQL, DEFAULT_DATE_CLASS, &classes);
        let original = PropertyType::String;

        assert_eq!(
            resolver.get_readable_type("encrypted:array", &original),
            resolver.get_readable_type("array", &original)
        );
        assert_eq!(
            resolver.get_writeable_type("encrypted:array", &original),
            resolver.get_writeable_type("array", &original)
        );
    }

    #[test]
    fn test_date_casts() {
        let classes = CastClasses::default();
        let resolver = CastResolver::new(Dialect::MySQL, DEFAULT_DATE_CLASS, &classes);
        let original = PropertyType::String;

        assert_eq!(
            render(resolver.get_readable_type("datetime", &original)),
            "Illuminate\\Support\\Carbon"
        );
        assert_eq!(
            render(resolver.get_writeable_type("date", &original)),
            "Illuminate\\Support\\Carbon|string"
        );
        assert_eq!(
            render(resolver.get_readable_type("immutable_datetime", &original)),
            "Carbon\\CarbonImmutable"
        );
    }

    #[test]
    fn test_custom_date_class() {
        let classes = CastClasses::default();
        let resolver = CastResolver::new(Dialect::MySQL, "Carbon\\CarbonImmutable", &classes);

        assert_eq!(
            render(resolver.get_date_type()),
            "Carbon\\CarbonImmutable|Illuminate\\Support\\Carbon"
        );
    }

    #[test]
    fn test_collection_cast() {
        let classes = CastClasses::default();
        let resolver = CastResolver::new(Dialect::MySQL, DEFAULT_DATE_CLASS, &classes);
        let original = PropertyType::String;

        assert_eq!(
            render(resolver.get_readable_type("collection", &original)),
            "Illuminate\\Support\\Collection<array-key, mixed>"
        );
        assert_eq!(
            render(resolver.get_writeable_type("collection", &original)),
            "Illuminate\\Support\\Collection<array-key, mixed>|array<array-key, mixed>"
        );
    }

    #[test]
    fn test_value_object_cast() {
        let classes = CastClasses::default().with(
            "App\\Casts\\AsMoney",
            CastClass::ValueObject {
                get: PropertyType::object("App\\Money"),
                set: Some(PropertyType::union([PropertyType::object("App\\Money"), PropertyType::Int])),
            },
        );
        let resolver = CastResolver::new(Dialect::MySQL, DEFAULT_DATE_CLASS, &classes);
        let original = PropertyType::Int;

        assert_eq!(
            render(resolver.get_readable_type("App\\Casts\\AsMoney", &original)),
            "App\\Money"
        );
        assert_eq!(
            render(resolver.get_writeable_type("App\\Casts\\AsMoney:EUR", &original)),
            "App\\Money|int"
        );
    }

    #[test]
    fn test_inbound_and_castable_casts() {
        let classes = CastClasses::default()
            .with(
                "App\\Casts\\Hash",
                CastClass::Inbound {
                    set: Some(PropertyType::String),
                },
            )
            .with(
                "App\\Address",
                CastClass::Castable {
                    caster: "App\\Casts\\AddressCast".to_string(),
                },
            )
            .with(
                "App\\Casts\\AddressCast",
                CastClass::ValueObject {
                    get: PropertyType::object("App\\Address"),
                    set: None,
                },
            );
        let resolver = CastResolver::new(Dialect::MySQL, DEFAULT_DATE_CLASS, &classes);
        let original = PropertyType::Int;

        assert_eq!(resolver.get_readable_type("App\\Casts\\Hash", &original), PropertyType::Int);
        assert_eq!(
            resolver.get_writeable_type("App\\Casts\\Hash", &original),
            PropertyType::String
        );
        assert_eq!(
            render(resolver.get_writeable_type("App\\Address", &original)),
            "App\\Address"
        );
    }

    #[test]
    fn test_castable_cycle_is_bounded() {
        let classes = CastClasses::default().with(
            "App\\Loop",
            CastClass::Castable {
                caster: "App\\Loop".to_string(),
            },
        );
        let resolver = CastResolver::new(Dialect::MySQL, DEFAULT_DATE_CLASS, &classes);

        assert_eq!(
            resolver.get_readable_type("App\\Loop", &PropertyType::Int),
            PropertyType::Mixed
        );
    }

    #[test]
    fn test_plain_and_unknown_classes() {
        let classes = CastClasses::default().with("App\\Enums\\Status", CastClass::Plain);
        let resolver = CastResolver::new(Dialect::MySQL, DEFAULT_DATE_CLASS, &classes);
        let original = PropertyType::String;

        assert_eq!(
            resolver.get_readable_type("App\\Enums\\Status", &original),
            PropertyType::object("App\\Enums\\Status")
        );
        assert_eq!(
            resolver.get_writeable_type("App\\Missing", &original),
            PropertyType::Mixed
        );
    }

    /// キャスト定義の無いモデルクラスはそのクラスの参照になる
    #[test]
    fn test_model_class_cast_without_definition() {
        let classes = CastClasses::default().with_model("App\\Models\\Address");
        let resolver = CastResolver::new(Dialect::MySQL, DEFAULT_DATE_CLASS, &classes);
        let original = PropertyType::String;

        assert_eq!(
            resolver.get_readable_type("\\App\\Models\\Address", &original),
            PropertyType::object("App\\Models\\Address")
        );
        assert_eq!(
            resolver.get_writeable_type("App\\Models\\Address", &original),
            PropertyType::object("App\\Models\\Address")
        );
    }
}
