/// モデルプロパティ型推論の統合テスト
///
/// モデル定義レジストリ、マイグレーション再生、キャスト解決を組み合わせて
/// has_property / get_property の公開契約を確認します。
mod common;

#[cfg(test)]
mod property_inference_tests {
    use crate::common::{engine_with, engine_with_snapshot, users_operations};
    use schemacast::core::config::Dialect;
    use schemacast::core::migration::Operation;
    use schemacast::core::schema::{ColumnKind, ColumnSpec};
    use schemacast::core::types::PropertyType;

    const USER: &str = "App\\Models\\User";

    fn render(ty: &PropertyType) -> String {
        ty.to_string()
    }

    /// NULL許可カラムはどのキャスト経路でもnullを含む
    #[test]
    fn test_nullable_columns_include_null_on_every_path() {
        let engine = engine_with(Dialect::MySQL, users_operations());

        // ネイティブ型、キャスト、日付、encrypted キャストの各経路
        for property in ["nickname", "settings", "plain_settings", "deleted_at", "created_at"] {
            assert!(engine.has_property(USER, property), "{}", property);
            let resolved = engine.get_property(USER, property).unwrap();
            assert!(resolved.readable_type.accepts_null(), "{} readable", property);
            assert!(resolved.writable_type.accepts_null(), "{} writable", property);
        }
    }

    /// 整数カラムに boolean キャスト、ネイティブ真偽値の無いエンジン
    #[test]
    fn test_boolean_cast_without_native_boolean() {
        for dialect in [Dialect::MySQL, Dialect::SQLite, Dialect::SqlServer] {
            let engine = engine_with(dialect, users_operations());
            let property = engine.get_property(USER, "is_admin").unwrap();

            assert_eq!(property.readable_type, PropertyType::Bool);
            assert_eq!(
                property.writable_type,
                PropertyType::union([
                    PropertyType::IntLiteral(0),
                    PropertyType::IntLiteral(1),
                    PropertyType::Bool,
                ])
            );
        }

        let engine = engine_with(Dialect::PostgreSQL, users_operations());
        let property = engine.get_property(USER, "is_admin").unwrap();
        assert_eq!(property.writable_type, PropertyType::Bool);
    }

    /// テーブルが無くても主キーは推論対象
    #[test]
    fn test_primary_key_without_schema() {
        let engine = engine_with(Dialect::MySQL, Vec::new());

        assert!(engine.has_property(USER, "id"));
        let id = engine.get_property(USER, "id").unwrap();
        assert_eq!(id.readable_type, PropertyType::Int);
        assert_eq!(id.writable_type, PropertyType::Int);

        assert!(engine.has_property("App\\Models\\ApiToken", "token"));
        let token = engine.get_property("App\\Models\\ApiToken", "token").unwrap();
        assert_eq!(token.readable_type, PropertyType::String);
        assert_eq!(token.writable_type, PropertyType::String);
        assert_eq!(token.declaring_class, "App\\Models\\ApiToken");

        assert!(!engine.has_property(USER, "email"));
    }

    /// protected な Attribute アクセサは除外、public は除外しない
    #[test]
    fn test_accessor_visibility_convention() {
        let engine = engine_with(Dialect::MySQL, users_operations());

        assert!(!engine.has_property(USER, "full_name"));
        assert!(engine.has_property(USER, "display_name"));
        assert!(!engine.has_property(USER, "avatar"));
    }

    /// encrypted:array は array と同じ型になる
    #[test]
    fn test_encrypted_array_equals_array() {
        let engine = engine_with(Dialect::MySQL, users_operations());

        let encrypted = engine.get_property(USER, "settings").unwrap();
        let plain = engine.get_property(USER, "plain_settings").unwrap();

        assert_eq!(encrypted.readable_type, plain.readable_type);
        assert_eq!(encrypted.writable_type, plain.writable_type);
        assert_eq!(
            render(&encrypted.readable_type),
            "array<array-key, mixed>|null"
        );
    }

    #[test]
    fn test_excluded_classes_and_tags() {
        let engine = engine_with(Dialect::MySQL, users_operations());

        assert!(!engine.has_property("App\\Models\\Model", "id"));
        assert!(!engine.has_property("App\\Models\\Broken", "id"));
        assert!(!engine.has_property("App\\Money", "id"));
        assert!(!engine.has_property(USER, "tagged"));

        let err = engine.get_property("App\\Models\\Broken", "id").unwrap_err();
        assert!(err.is_should_not_happen());
    }

    #[test]
    fn test_native_and_custom_casts() {
        let engine = engine_with(Dialect::MySQL, users_operations());

        let email = engine.get_property(USER, "email").unwrap();
        assert_eq!(email.readable_type, PropertyType::String);

        let balance = engine.get_property(USER, "balance").unwrap();
        assert_eq!(render(&balance.readable_type), "App\\Money");
        assert_eq!(render(&balance.writable_type), "App\\Money|int");

        let status = engine.get_property(USER, "status").unwrap();
        assert_eq!(render(&status.readable_type), "App\\Enums\\Status");

        let id = engine.get_property(USER, "id").unwrap();
        assert_eq!(render(&id.readable_type), "int");
        assert_eq!(render(&id.writable_type), "int|numeric-string");
    }

    #[test]
    fn test_dates_and_soft_deletes() {
        let engine = engine_with(Dialect::MySQL, users_operations());

        let deleted_at = engine.get_property(USER, "deleted_at").unwrap();
        assert_eq!(
            render(&deleted_at.readable_type),
            "Illuminate\\Support\\Carbon|null"
        );
        assert_eq!(
            render(&deleted_at.writable_type),
            "Illuminate\\Support\\Carbon|string|null"
        );
    }

    /// スナップショット → マイグレーションの順で適用される
    #[test]
    fn test_snapshot_then_migrations() {
        let dump = "CREATE TABLE `users` (`id` bigint unsigned NOT NULL, `email` varchar(255) NOT NULL);";
        let operations = vec![Operation::AddColumn {
            table: "users".to_string(),
            column: ColumnSpec::new("nickname", ColumnKind::String { length: None }, true),
        }];
        let engine = engine_with_snapshot(Dialect::MySQL, dump, operations);

        let users = engine.schema().get_table("users").unwrap();
        assert_eq!(users.column_names(), vec!["email", "id", "nickname"]);
        assert!(engine.has_property(USER, "nickname"));
        assert_eq!(
            render(&engine.get_property(USER, "nickname").unwrap().readable_type),
            "string|null"
        );
    }

    #[test]
    fn test_inferable_properties_skip_accessors_and_tags() {
        let engine = engine_with(Dialect::MySQL, users_operations());
        let properties = engine.inferable_properties(USER);

        assert!(properties.contains(&"id".to_string()));
        assert!(properties.contains(&"display_name".to_string()));
        assert!(!properties.contains(&"full_name".to_string()));
        assert!(!properties.contains(&"tagged".to_string()));
        assert!(!properties.contains(&"avatar".to_string()));
    }
}
