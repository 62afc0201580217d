// プロパティ型エンジン
//
// モデルクラスとプロパティ名から、プロパティの存在判定と
// 読み取り/書き込み型の推論を行う公開窓口です。
// スキーマはスナップショット → マイグレーションの順で一度だけ構築し、
// インスタンスの生存期間中はキャッシュします。

use crate::core::config::{Config, Dialect};
use crate::core::error::InferenceError;
use crate::core::model::{ModelInstance, ModelProperty};
use crate::core::naming;
use crate::core::reflection::{ModelReflector, PropertyTagLookup, Visibility};
use crate::core::schema::Schema;
use crate::core::types::{PropertyType, TypeStringResolver};
use crate::services::cast_resolver::CastResolver;
use crate::services::migration_replayer::MigrationReplayer;
use crate::services::snapshot_loader::SquashedSchemaLoader;
use std::cell::OnceCell;
use std::rc::Rc;
use tracing::debug;

/// モデルプロパティの型推論エンジン
pub struct ModelPropertyEngine {
    dialect: Dialect,
    date_class: String,
    reflector: Rc<dyn ModelReflector>,
    tags: Rc<dyn PropertyTagLookup>,
    snapshot: SquashedSchemaLoader,
    replayer: MigrationReplayer,
    schema: OnceCell<Schema>,
}

impl ModelPropertyEngine {
    /// 新しいModelPropertyEngineを作成
    ///
    /// スナップショットとマイグレーションは空の状態で作成されます。
    pub fn new(
        config: &Config,
        reflector: Rc<dyn ModelReflector>,
        tags: Rc<dyn PropertyTagLookup>,
    ) -> Self {
        Self {
            dialect: config.dialect,
            date_class: config.date_class.clone(),
            reflector,
            tags,
            snapshot: SquashedSchemaLoader::disabled(),
            replayer: MigrationReplayer::empty(),
            schema: OnceCell::new(),
        }
    }

    /// スナップショットの読み込み元を設定
    pub fn with_snapshot(mut self, snapshot: SquashedSchemaLoader) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// マイグレーションの再生元を設定
    pub fn with_migrations(mut self, replayer: MigrationReplayer) -> Self {
        self.replayer = replayer;
        self
    }

    /// 再構築済みのスキーマを取得
    ///
    /// 初回呼び出し時にスナップショット → マイグレーションの順で構築します。
    pub fn schema(&self) -> &Schema {
        self.schema.get_or_init(|| {
            let initial = self.snapshot.initialize_tables();
            let schema = self.replayer.initialize_tables(initial);
            debug!(tables = schema.table_count(), "Schema reconstructed");
            schema
        })
    }

    /// プロパティを推論できるかどうか
    ///
    /// アクセサや型タグを持つプロパティ、抽象クラス、
    /// インスタンス化できないクラスは対象外です。
    pub fn has_property(&self, class: &str, property: &str) -> bool {
        if !self.reflector.is_subclass_of_model(class) || self.reflector.is_abstract(class) {
            return false;
        }

        if self.has_accessor(class, property) {
            return false;
        }

        if self.tags.has_property_tag(class, property) {
            return false;
        }

        let instance = match self.reflector.instantiate_bare(class) {
            Ok(instance) => instance,
            Err(e) => {
                debug!(class, "Excluding model that cannot be instantiated: {}", e);
                return false;
            }
        };

        let schema = self.schema();

        if property == instance.get_key_name() {
            return true;
        }

        schema.get_column(&instance.get_table(), property).is_some()
    }

    /// プロパティの型を推論
    ///
    /// # Errors
    ///
    /// - has_property が真を返したクラスのインスタンス化に失敗した場合
    /// - 主キーでもカラムでもないプロパティを問い合わせた場合
    /// - 主キーの宣言型を解釈できない場合
    pub fn get_property(
        &self,
        class: &str,
        property: &str,
    ) -> Result<ModelProperty, InferenceError> {
        let instance = self
            .reflector
            .instantiate_bare(class)
            .map_err(|e| InferenceError::should_not_happen(class, property, e.to_string()))?;

        let table = instance.get_table();
        let Some(column) = self.schema().get_column(&table, property) else {
            if property == instance.get_key_name() {
                let key_type = TypeStringResolver::new().resolve(instance.get_key_type())?;
                return Ok(ModelProperty::new(class, key_type.clone(), key_type));
            }
            return Err(InferenceError::should_not_happen(
                class,
                property,
                format!("column not found in table '{}'", table),
            ));
        };

        let resolver = CastResolver::new(self.dialect, &self.date_class, self.reflector.as_ref());

        let (readable, writable) = if instance.is_date_attribute(property) {
            let date_type = resolver.get_date_type();
            (
                date_type.clone(),
                PropertyType::union([date_type, PropertyType::String]),
            )
        } else if let Some(cast) = instance.get_cast(property) {
            (
                resolver.get_readable_type(cast, &column.readable_type),
                resolver.get_writeable_type(cast, &column.writeable_type),
            )
        } else {
            (column.readable_type.clone(), column.writeable_type.clone())
        };

        let (readable, writable) = if column.nullable {
            (readable.nullable(), writable.nullable())
        } else {
            (readable, writable)
        };

        Ok(ModelProperty::new(class, readable, writable))
    }

    /// 推論対象となるプロパティ名の一覧（名前順）
    ///
    /// 主キーとテーブルの各カラムのうち、has_property が真となるものを返します。
    pub fn inferable_properties(&self, class: &str) -> Vec<String> {
        let Ok(instance) = self.reflector.instantiate_bare(class) else {
            return Vec::new();
        };

        let mut candidates = vec![instance.get_key_name().to_string()];
        if let Some(table) = self.schema().get_table(&instance.get_table()) {
            candidates.extend(table.column_names().into_iter().map(String::from));
        }
        candidates.sort();
        candidates.dedup();

        candidates
            .into_iter()
            .filter(|property| self.has_property(class, property))
            .collect()
    }

    /// モデルのバインド先テーブル名
    pub fn table_for(&self, class: &str) -> Option<String> {
        self.reflector
            .instantiate_bare(class)
            .ok()
            .map(|instance: ModelInstance| instance.get_table())
    }

    /// アクセサメソッドがプロパティを提供しているかどうか
    ///
    /// `get{Studly}Attribute` メソッド、または Attribute を返す
    /// protected な camelCase メソッドが対象です。
    fn has_accessor(&self, class: &str, property: &str) -> bool {
        if self
            .reflector
            .has_native_method(class, &naming::legacy_accessor_name(property))
        {
            return true;
        }

        self.reflector
            .native_method(class, &naming::camel(property))
            .is_some_and(|method| {
                method.visibility == Visibility::Protected && method.returns_attribute()
            })
    }
}
