// マイグレーション読み込みサービス
//
// マイグレーションディレクトリ内のYAMLファイルを読み込み、
// 時系列順（ファイル順・ファイル内の記載順）の操作列を生成します。

use crate::core::error::IoError;
use crate::core::migration::{MigrationDocument, MigrationFile, Operation};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// マイグレーション操作の供給元
pub trait MigrationSource {
    /// 時系列順の操作列を取得
    fn load_operations(&self) -> Vec<Operation>;
}

/// メモリ上の操作列
impl MigrationSource for Vec<Operation> {
    fn load_operations(&self) -> Vec<Operation> {
        self.clone()
    }
}

/// YAMLマイグレーションの供給元
///
/// 指定されたすべてのディレクトリのファイルをまとめて、ファイル名順に並べます。
#[derive(Debug, Clone, Default)]
pub struct YamlMigrationSource {
    directories: Vec<PathBuf>,
}

impl YamlMigrationSource {
    /// 新しいYamlMigrationSourceを作成
    pub fn new(directories: Vec<PathBuf>) -> Self {
        Self { directories }
    }

    /// 走査を行わないYamlMigrationSourceを作成
    pub fn disabled() -> Self {
        Self::default()
    }

    /// すべてのマイグレーションファイルを読み込む
    ///
    /// 読み込めないファイルは警告を出力してスキップします。
    pub fn load_migrations(&self) -> Vec<MigrationFile> {
        let mut migrations = Vec::new();

        for file_path in self.migration_files() {
            match parse_migration_file(&file_path) {
                Ok(migration) => {
                    debug!(
                        version = %migration.version,
                        created_at = ?migration.created_at,
                        operations = migration.operations.len(),
                        "Loaded migration"
                    );
                    migrations.push(migration);
                }
                Err(e) => {
                    warn!(file = %file_path.display(), "Skipping unreadable migration: {:#}", e);
                }
            }
        }

        migrations
    }

    /// 全ディレクトリのマイグレーションファイルを時系列順で取得
    ///
    /// ファイル名で並べ、同名のファイルはパスで順序を決めます。
    fn migration_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for dir in &self.directories {
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "Migration directory not found, skipping");
                continue;
            }

            match scan_migration_files(dir) {
                Ok(found) => files.extend(found),
                Err(e) => {
                    warn!(dir = %dir.display(), "Failed to scan migration directory: {:#}", e);
                }
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
        files
    }
}

impl MigrationSource for YamlMigrationSource {
    fn load_operations(&self) -> Vec<Operation> {
        self.load_migrations()
            .into_iter()
            .flat_map(|migration| migration.operations)
            .collect()
    }
}

/// 単一のマイグレーションファイルを解析
pub fn parse_migration_file(file_path: &Path) -> Result<MigrationFile> {
    let content = fs::read_to_string(file_path).map_err(|e| IoError::FileRead {
        path: file_path.display().to_string(),
        cause: e.to_string(),
    })?;

    let document: MigrationDocument = if content.trim().is_empty() {
        MigrationDocument::default()
    } else {
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse migration YAML: {:?}", file_path))?
    };

    Ok(MigrationFile::new(file_path, document))
}

/// ディレクトリ内のYAMLファイルをスキャン
///
/// .yaml と .yml 拡張子を持つファイルのみをファイル名順で返します。
fn scan_migration_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries = fs::read_dir(dir).map_err(|e| IoError::FileRead {
        path: dir.display().to_string(),
        cause: e.to_string(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| IoError::FileRead {
            path: dir.display().to_string(),
            cause: e.to_string(),
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        if let Some(extension) = path.extension() {
            if extension == "yaml" || extension == "yml" {
                files.push(path);
            }
        }
    }

    // タイムスタンプ付きのファイル名は辞書順で時系列順になる
    files.sort();

    Ok(files)
}
