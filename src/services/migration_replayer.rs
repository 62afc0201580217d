// マイグレーション再生サービス
//
// スナップショットから得た初期スキーマに対して、マイグレーション操作を
// 時系列順に適用し、最終的なスキーマ状態を再構築します。
// 存在しないテーブル・カラムを参照する操作は何もせずスキップします。

use crate::core::migration::Operation;
use crate::core::schema::{Column, ColumnKind, ColumnSpec, Schema, Table};
use crate::services::migration_loader::MigrationSource;
use tracing::debug;

/// 再生結果の統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// 適用された操作数
    pub applied: usize,
    /// 対象が存在せずスキップされた操作数
    pub skipped: usize,
}

/// マイグレーション再生サービス
///
/// 操作列の取得は MigrationSource に委譲します。
pub struct MigrationReplayer {
    source: Box<dyn MigrationSource>,
}

impl MigrationReplayer {
    /// 新しいMigrationReplayerを作成
    pub fn new(source: impl MigrationSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// 操作を持たないMigrationReplayerを作成
    pub fn empty() -> Self {
        Self::new(Vec::<Operation>::new())
    }

    /// 初期スキーマにマイグレーション操作を適用したスキーマを返す
    ///
    /// # Arguments
    ///
    /// * `initial` - スナップショットから構築したスキーマ（無ければ空）
    pub fn initialize_tables(&self, initial: Schema) -> Schema {
        let operations = self.source.load_operations();
        let (schema, stats) = replay(initial, &operations);

        debug!(
            operations = operations.len(),
            applied = stats.applied,
            skipped = stats.skipped,
            tables = schema.table_count(),
            "Replayed migration operations"
        );

        schema
    }
}

/// 操作列を順番に適用
pub fn replay(mut schema: Schema, operations: &[Operation]) -> (Schema, ReplayStats) {
    let mut stats = ReplayStats::default();

    for operation in operations {
        if apply_operation(&mut schema, operation) {
            stats.applied += 1;
        } else {
            debug!(
                op = operation.kind(),
                table = operation.table(),
                "Skipped operation referencing unknown table or column"
            );
            stats.skipped += 1;
        }
    }

    (schema, stats)
}

/// 単一の操作を適用
///
/// 対象が存在せず何も変更しなかった場合は false を返します。
pub fn apply_operation(schema: &mut Schema, operation: &Operation) -> bool {
    match operation {
        Operation::CreateTable { table, columns } => {
            let mut created = Table::new(table.clone());
            for spec in columns {
                created.set_column(Column::from_spec(spec));
            }
            // 既存テーブルはマージせず上書き
            schema.add_table(created);
            true
        }

        Operation::DropTable { table } => schema.remove_table(table).is_some(),

        Operation::RenameTable { from, to } => schema.rename_table(from, to),

        Operation::AddColumn { table, column } => {
            schema
                .table_or_create(table)
                .set_column(Column::from_spec(column));
            true
        }

        Operation::ModifyColumn { table, column } => match schema.get_table_mut(table) {
            Some(target) if target.has_column(&column.name) => {
                target.set_column(Column::from_spec(column));
                true
            }
            _ => false,
        },

        Operation::RenameColumn { table, from, to } => schema
            .get_table_mut(table)
            .is_some_and(|target| target.rename_column(from, to)),

        Operation::DropColumn { table, columns } => {
            drop_columns(schema, table, columns.iter().map(|c| c.as_str()))
        }

        Operation::AddTimestamps { table, tz } => {
            let kind = timestamp_kind(*tz);
            let target = schema.table_or_create(table);
            for name in ["created_at", "updated_at"] {
                target.set_column(Column::from_spec(&ColumnSpec::new(name, kind.clone(), true)));
            }
            true
        }

        Operation::DropTimestamps { table } => {
            drop_columns(schema, table, ["created_at", "updated_at"].into_iter())
        }

        Operation::AddSoftDeletes { table, column, tz } => {
            schema
                .table_or_create(table)
                .set_column(Column::from_spec(&ColumnSpec::new(
                    column.clone(),
                    timestamp_kind(*tz),
                    true,
                )));
            true
        }

        Operation::DropSoftDeletes { table, column } => {
            drop_columns(schema, table, std::iter::once(column.as_str()))
        }

        Operation::AddMorphs {
            table,
            name,
            key,
            nullable,
        } => {
            let target = schema.table_or_create(table);
            target.set_column(Column::from_spec(&ColumnSpec::new(
                format!("{}_type", name),
                ColumnKind::String { length: None },
                *nullable,
            )));
            target.set_column(Column::from_spec(&ColumnSpec::new(
                format!("{}_id", name),
                key.column_kind(),
                *nullable,
            )));
            true
        }

        Operation::DropMorphs { table, name } => {
            let type_column = format!("{}_type", name);
            let id_column = format!("{}_id", name);
            drop_columns(
                schema,
                table,
                [type_column.as_str(), id_column.as_str()].into_iter(),
            )
        }

        Operation::AddRememberToken { table } => {
            schema
                .table_or_create(table)
                .set_column(Column::from_spec(&ColumnSpec::new(
                    "remember_token",
                    ColumnKind::RememberToken,
                    true,
                )));
            true
        }

        Operation::DropRememberToken { table } => {
            drop_columns(schema, table, std::iter::once("remember_token"))
        }
    }
}

fn timestamp_kind(tz: bool) -> ColumnKind {
    if tz {
        ColumnKind::TimestampTz
    } else {
        ColumnKind::Timestamp
    }
}

/// カラムを削除（1つでも削除できれば true）
fn drop_columns<'a>(
    schema: &mut Schema,
    table: &str,
    columns: impl Iterator<Item = &'a str>,
) -> bool {
    let Some(target) = schema.get_table_mut(table) else {
        return false;
    };

    let mut dropped = false;
    for column in columns {
        dropped |= target.remove_column(column).is_some();
    }
    dropped
}
