/// スキーマ再構築の統合テスト
///
/// スナップショット（スキーマダンプ）とYAMLマイグレーションから
/// スキーママッピングが正しく再構築されることを確認します。
mod common;

#[cfg(test)]
mod migration_replay_tests {
    use crate::common::{setup_test_project, write_migration, write_schema_dump};
    use schemacast::core::config::Dialect;
    use schemacast::core::migration::Operation;
    use schemacast::core::schema::{Column, ColumnKind, ColumnSpec, Schema};
    use schemacast::core::types::PropertyType;
    use schemacast::services::migration_loader::{MigrationSource, YamlMigrationSource};
    use schemacast::services::migration_replayer::{replay, MigrationReplayer};
    use schemacast::services::snapshot_loader::SquashedSchemaLoader;

    fn users_with_id() -> Operation {
        Operation::CreateTable {
            table: "users".to_string(),
            columns: vec![ColumnSpec::new("id", ColumnKind::Integer, false)],
        }
    }

    /// 追加したカラムの名前変更後は旧名が残らない
    #[test]
    fn test_add_then_rename_column() {
        let operations = vec![
            users_with_id(),
            Operation::AddColumn {
                table: "users".to_string(),
                column: ColumnSpec::new("email", ColumnKind::String { length: None }, false),
            },
            Operation::RenameColumn {
                table: "users".to_string(),
                from: "email".to_string(),
                to: "email_address".to_string(),
            },
        ];

        let (schema, stats) = replay(Schema::new(), &operations);
        let users = schema.get_table("users").unwrap();

        assert_eq!(users.column_names(), vec!["email_address", "id"]);
        assert!(!users.has_column("email"));
        assert_eq!(
            users.get_column("email_address").unwrap().name,
            "email_address"
        );
        assert_eq!(stats.applied, 3);
        assert_eq!(stats.skipped, 0);
    }

    /// 存在しないテーブルへの操作は何もしない
    #[test]
    fn test_unknown_table_is_noop() {
        let (before, _) = replay(Schema::new(), &[users_with_id()]);

        let ghost_operations = vec![
            Operation::ModifyColumn {
                table: "ghosts".to_string(),
                column: ColumnSpec::new("name", ColumnKind::Text, true),
            },
            Operation::RenameColumn {
                table: "ghosts".to_string(),
                from: "a".to_string(),
                to: "b".to_string(),
            },
            Operation::DropColumn {
                table: "ghosts".to_string(),
                columns: vec!["name".to_string()],
            },
            Operation::DropTable {
                table: "ghosts".to_string(),
            },
            Operation::RenameTable {
                from: "ghosts".to_string(),
                to: "spirits".to_string(),
            },
        ];

        let (after, stats) = replay(before.clone(), &ghost_operations);

        assert_eq!(after.table_names(), before.table_names());
        assert_eq!(after.get_table("users"), before.get_table("users"));
        assert!(!after.has_table("ghosts"));
        assert!(!after.has_table("spirits"));
        assert_eq!(stats.skipped, ghost_operations.len());
    }

    /// スナップショットの後にマイグレーションが適用される
    #[test]
    fn test_snapshot_then_delta() {
        let snapshot =
            SquashedSchemaLoader::from_dumps(Dialect::SQLite, vec!["CREATE TABLE users (id integer NOT NULL);".to_string()]);
        let replayer = MigrationReplayer::new(vec![Operation::AddColumn {
            table: "users".to_string(),
            column: ColumnSpec::new("name", ColumnKind::String { length: None }, false),
        }]);

        let schema = replayer.initialize_tables(snapshot.initialize_tables());
        let users = schema.get_table("users").unwrap();

        assert_eq!(users.column_names(), vec!["id", "name"]);
        assert_eq!(users.get_column("id").unwrap().readable_type, PropertyType::Int);
        assert_eq!(
            users.get_column("name").unwrap().readable_type,
            PropertyType::String
        );
    }

    #[test]
    fn test_create_table_overwrites_and_add_column_redefines() {
        let operations = vec![
            Operation::CreateTable {
                table: "posts".to_string(),
                columns: vec![
                    ColumnSpec::new("id", ColumnKind::Id, false),
                    ColumnSpec::new("legacy", ColumnKind::Text, true),
                ],
            },
            Operation::CreateTable {
                table: "posts".to_string(),
                columns: vec![ColumnSpec::new("id", ColumnKind::Id, false)],
            },
            Operation::AddColumn {
                table: "posts".to_string(),
                column: ColumnSpec::new("views", ColumnKind::Integer, false),
            },
            Operation::AddColumn {
                table: "posts".to_string(),
                column: ColumnSpec::new("views", ColumnKind::BigInteger, true),
            },
        ];

        let (schema, _) = replay(Schema::new(), &operations);
        let posts = schema.get_table("posts").unwrap();

        assert_eq!(posts.column_names(), vec!["id", "views"]);
        assert!(posts.get_column("views").unwrap().nullable);
    }

    #[test]
    fn test_rename_table_keeps_columns() {
        let operations = vec![
            users_with_id(),
            Operation::RenameTable {
                from: "users".to_string(),
                to: "members".to_string(),
            },
        ];

        let (schema, _) = replay(Schema::new(), &operations);
        assert!(!schema.has_table("users"));

        let members = schema.get_table("members").unwrap();
        assert_eq!(members.name, "members");
        assert_eq!(
            members.get_column("id"),
            Some(&Column::from_spec(&ColumnSpec::new("id", ColumnKind::Integer, false)))
        );
    }

    /// プロジェクトディレクトリのダンプとYAMLマイグレーションを合成
    #[test]
    fn test_project_directories() {
        let (_temp_dir, project_path) = setup_test_project(Dialect::MySQL).unwrap();

        write_schema_dump(
            &project_path,
            "mysql-schema.dump",
            r#"
-- MySQL dump
/*!40101 SET NAMES utf8mb4 */;
CREATE TABLE `users` (
  `id` bigint unsigned NOT NULL AUTO_INCREMENT,
  `email` varchar(255) COLLATE utf8mb4_unicode_ci NOT NULL,
  `is_admin` tinyint(1) NOT NULL DEFAULT '0',
  `role` enum('admin','member') NOT NULL DEFAULT 'member',
  PRIMARY KEY (`id`),
  UNIQUE KEY `users_email_unique` (`email`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;
"#,
        )
        .unwrap();

        write_migration(
            &project_path,
            "2024_02_01_000000_add_profile_to_users.yaml",
            r#"
operations:
  - op: add_column
    table: users
    column:
      name: bio
      kind: text
      nullable: true
  - op: add_timestamps
    table: users
"#,
        )
        .unwrap();
        write_migration(
            &project_path,
            "2024_01_01_000000_create_posts.yml",
            r#"
operations:
  - op: create_table
    table: posts
    columns:
      - name: id
        kind: id
      - name: title
        kind: string
  - op: add_morphs
    table: posts
    name: commentable
"#,
        )
        .unwrap();

        let snapshot = SquashedSchemaLoader::new(
            Dialect::MySQL,
            Some(project_path.join("database/schema")),
        );
        let source = YamlMigrationSource::new(vec![project_path.join("database/migrations")]);
        let operations = source.load_operations();

        // ファイル名順（タイムスタンプ順）に読み込まれる
        assert_eq!(operations[0].table(), "posts");

        let schema = MigrationReplayer::new(source).initialize_tables(snapshot.initialize_tables());

        let users = schema.get_table("users").unwrap();
        assert_eq!(
            users.column_names(),
            vec!["bio", "created_at", "email", "id", "is_admin", "role", "updated_at"]
        );
        assert_eq!(
            users.get_column("is_admin").unwrap().readable_type,
            PropertyType::Bool
        );
        assert_eq!(
            users.get_column("role").unwrap().options,
            vec!["admin".to_string(), "member".to_string()]
        );
        assert!(users.get_column("bio").unwrap().nullable);
        assert!(!users.get_column("email").unwrap().nullable);

        let posts = schema.get_table("posts").unwrap();
        assert_eq!(
            posts.column_names(),
            vec!["commentable_id", "commentable_type", "id", "title"]
        );
    }
}
