// モデル定義レジストリ
//
// YAMLで記述したモデル定義・キャストクラス定義を読み込み、
// リフレクション契約（ModelReflector / PropertyTagLookup）を実装します。
// クラス名とメソッド名の照合は大文字小文字を区別しません。

use crate::core::error::{IoError, ReflectionError};
use crate::core::model::ModelInstance;
use crate::core::naming;
use crate::core::reflection::{CastClass, MethodInfo, ModelReflector, PropertyTagLookup, Visibility};
use crate::core::types::{PropertyType, TypeStringResolver};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// モデル定義ファイルのルート
#[derive(Debug, Clone, Default, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    models: Vec<ModelDefinition>,
    #[serde(default)]
    cast_classes: Vec<CastClassDefinition>,
}

/// モデル定義
#[derive(Debug, Clone, Deserialize)]
struct ModelDefinition {
    class: String,
    #[serde(default, rename = "abstract")]
    is_abstract: bool,
    #[serde(default = "default_true")]
    instantiable: bool,
    #[serde(default)]
    table: Option<String>,
    #[serde(default)]
    primary_key: Option<String>,
    #[serde(default)]
    key_type: Option<String>,
    #[serde(default)]
    casts: HashMap<String, String>,
    #[serde(default)]
    dates: Vec<String>,
    #[serde(default = "default_true")]
    timestamps: bool,
    #[serde(default)]
    soft_deletes: bool,
    #[serde(default)]
    deleted_at_column: Option<String>,
    #[serde(default)]
    property_tags: Vec<String>,
    #[serde(default)]
    methods: Vec<MethodDefinition>,
}

/// メソッド定義
#[derive(Debug, Clone, Deserialize)]
struct MethodDefinition {
    name: String,
    #[serde(default = "default_visibility")]
    visibility: Visibility,
    #[serde(default)]
    return_type: Option<String>,
}

/// キャストクラス定義
#[derive(Debug, Clone, Deserialize)]
struct CastClassDefinition {
    class: String,
    #[serde(flatten)]
    kind: CastClassKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum CastClassKind {
    ValueObject {
        get: String,
        #[serde(default)]
        set: Option<String>,
    },
    Inbound {
        #[serde(default)]
        set: Option<String>,
    },
    Castable {
        caster: String,
    },
    Plain,
}

fn default_true() -> bool {
    true
}

fn default_visibility() -> Visibility {
    Visibility::Public
}

/// 登録済みモデル
#[derive(Debug, Clone)]
struct ModelEntry {
    instance: ModelInstance,
    is_abstract: bool,
    instantiable: bool,
    methods: HashMap<String, MethodInfo>,
    property_tags: HashSet<String>,
}

/// モデル定義レジストリ
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelEntry>,
    cast_classes: HashMap<String, CastClass>,
}

impl ModelRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// モデル定義ファイルを読み込む
    ///
    /// # Errors
    ///
    /// - ファイルが存在しない、または読み込めない場合
    /// - YAMLの解析や型文字列の解釈に失敗した場合
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path).map_err(|e| IoError::FileRead {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        content
            .parse()
            .with_context(|| format!("Invalid models file: {}", path.display()))
    }

    /// キャストクラスを登録
    pub fn register_cast_class(&mut self, class: &str, cast: CastClass) {
        self.cast_classes.insert(class_key(class), cast);
    }

    /// 登録済みモデルのクラス名一覧（名前順）
    pub fn model_classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self
            .models
            .values()
            .map(|entry| entry.instance.class.as_str())
            .collect();
        classes.sort();
        classes
    }

    /// 完全修飾名またはクラス名の末尾でモデルを検索
    ///
    /// 末尾一致が複数ある場合はNoneを返します。
    pub fn find_model_class(&self, name: &str) -> Option<&str> {
        if let Some(entry) = self.models.get(&class_key(name)) {
            return Some(&entry.instance.class);
        }

        let mut matches = self
            .models
            .values()
            .filter(|entry| naming::class_basename(&entry.instance.class).eq_ignore_ascii_case(name));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(&first.instance.class)
    }

    fn entry(&self, class: &str) -> Option<&ModelEntry> {
        self.models.get(&class_key(class))
    }
}

impl FromStr for ModelRegistry {
    type Err = anyhow::Error;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        let document: RegistryDocument = if yaml.trim().is_empty() {
            RegistryDocument::default()
        } else {
            serde_saphyr::from_str(yaml).context("Failed to parse models YAML")?
        };

        let resolver = TypeStringResolver::new();
        let mut registry = ModelRegistry::new();

        for definition in document.models {
            let entry = build_model_entry(definition, &resolver)?;
            registry
                .models
                .insert(class_key(&entry.instance.class), entry);
        }

        for definition in document.cast_classes {
            let cast = build_cast_class(&definition, &resolver)
                .with_context(|| format!("Invalid cast class: {}", definition.class))?;
            registry.register_cast_class(&definition.class, cast);
        }

        Ok(registry)
    }
}

fn build_model_entry(definition: ModelDefinition, resolver: &TypeStringResolver) -> Result<ModelEntry> {
    let class = definition.class.trim_start_matches('\\').to_string();

    let mut instance = ModelInstance::new(class.clone());
    instance.table = definition.table;
    if let Some(primary_key) = definition.primary_key {
        instance.key_name = primary_key;
    }
    if let Some(key_type) = definition.key_type {
        instance.key_type = key_type;
    }
    instance.casts = definition.casts;
    instance.dates = definition.dates;
    instance.timestamps = definition.timestamps;
    instance.deleted_at_column = match definition.deleted_at_column {
        Some(column) => Some(column),
        None if definition.soft_deletes => Some("deleted_at".to_string()),
        None => None,
    };

    let mut methods = HashMap::new();
    for method in definition.methods {
        let return_type = method
            .return_type
            .as_deref()
            .map(|ty| resolver.resolve(ty))
            .transpose()
            .with_context(|| format!("Invalid return type for {}::{}", class, method.name))?;
        methods.insert(
            method.name.to_ascii_lowercase(),
            MethodInfo {
                name: method.name,
                visibility: method.visibility,
                return_type,
            },
        );
    }

    Ok(ModelEntry {
        instance,
        is_abstract: definition.is_abstract,
        instantiable: definition.instantiable,
        methods,
        property_tags: definition.property_tags.into_iter().collect(),
    })
}

fn build_cast_class(definition: &CastClassDefinition, resolver: &TypeStringResolver) -> Result<CastClass> {
    let resolve_optional = |ty: &Option<String>| -> Result<Option<PropertyType>> {
        Ok(ty.as_deref().map(|t| resolver.resolve(t)).transpose()?)
    };

    let cast = match &definition.kind {
        CastClassKind::ValueObject { get, set } => CastClass::ValueObject {
            get: resolver.resolve(get)?,
            set: resolve_optional(set)?,
        },
        CastClassKind::Inbound { set } => CastClass::Inbound {
            set: resolve_optional(set)?,
        },
        CastClassKind::Castable { caster } => CastClass::Castable {
            caster: caster.trim_start_matches('\\').to_string(),
        },
        CastClassKind::Plain => CastClass::Plain,
    };

    Ok(cast)
}

/// クラス名の照合キー
fn class_key(class: &str) -> String {
    class.trim().trim_start_matches('\\').to_ascii_lowercase()
}

impl ModelReflector for ModelRegistry {
    fn is_subclass_of_model(&self, class: &str) -> bool {
        self.entry(class).is_some()
    }

    fn is_abstract(&self, class: &str) -> bool {
        self.entry(class).is_some_and(|entry| entry.is_abstract)
    }

    fn native_method(&self, class: &str, method: &str) -> Option<MethodInfo> {
        self.entry(class)?
            .methods
            .get(&method.to_ascii_lowercase())
            .cloned()
    }

    fn instantiate_bare(&self, class: &str) -> Result<ModelInstance, ReflectionError> {
        let entry = self.entry(class).ok_or_else(|| ReflectionError::ClassNotFound {
            class: class.to_string(),
        })?;

        if entry.is_abstract || !entry.instantiable {
            return Err(ReflectionError::NotInstantiable {
                class: entry.instance.class.clone(),
                reason: "declared as not instantiable".to_string(),
            });
        }

        Ok(entry.instance.clone())
    }

    fn cast_class(&self, class: &str) -> Option<CastClass> {
        self.cast_classes.get(&class_key(class)).cloned()
    }
}

impl PropertyTagLookup for ModelRegistry {
    fn has_property_tag(&self, class: &str, property: &str) -> bool {
        self.entry(class)
            .is_some_and(|entry| entry.property_tags.contains(property))
    }
}
