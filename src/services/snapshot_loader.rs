// スナップショット読み込みサービス
//
// スカッシュ済みスキーマダンプ（*.dump / *.sql）から初期スキーマを構築します。
// ダンプが存在しない場合は空のスキーマを返します。

use crate::core::config::Dialect;
use crate::core::error::IoError;
use crate::core::migration::Operation;
use crate::core::schema::Schema;
use crate::services::migration_replayer::replay;
use crate::services::schema_dump_parser::SchemaDumpParser;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// スカッシュ済みスキーマの読み込み
pub struct SquashedSchemaLoader {
    parser: SchemaDumpParser,
    directory: Option<PathBuf>,
    dumps: Vec<String>,
}

impl SquashedSchemaLoader {
    /// 新しいSquashedSchemaLoaderを作成
    ///
    /// # Arguments
    ///
    /// * `dialect` - ダンプのSQL方言
    /// * `directory` - ダンプディレクトリ（Noneの場合は走査しない）
    pub fn new(dialect: Dialect, directory: Option<PathBuf>) -> Self {
        Self {
            parser: SchemaDumpParser::new(dialect),
            directory,
            dumps: Vec::new(),
        }
    }

    /// 走査を行わないSquashedSchemaLoaderを作成
    pub fn disabled() -> Self {
        Self::new(Dialect::MySQL, None)
    }

    /// メモリ上のダンプ文字列から作成
    pub fn from_dumps(dialect: Dialect, dumps: Vec<String>) -> Self {
        Self {
            parser: SchemaDumpParser::new(dialect),
            directory: None,
            dumps,
        }
    }

    /// スナップショットに含まれる操作を記載順で取得
    ///
    /// 読み込めないダンプファイルは警告を出力してスキップします。
    pub fn operations(&self) -> Vec<Operation> {
        let mut operations = Vec::new();

        for sql in &self.dumps {
            operations.extend(self.parser.parse(sql));
        }

        let Some(dir) = &self.directory else {
            return operations;
        };

        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Schema dump directory not found, skipping");
            return operations;
        }

        let files = match scan_dump_files(dir) {
            Ok(files) => files,
            Err(e) => {
                warn!(dir = %dir.display(), "Failed to scan schema dump directory: {:#}", e);
                return operations;
            }
        };

        for file_path in files {
            match fs::read_to_string(&file_path) {
                Ok(sql) => {
                    let parsed = self.parser.parse(&sql);
                    debug!(
                        file = %file_path.display(),
                        tables = parsed.len(),
                        "Parsed schema dump"
                    );
                    operations.extend(parsed);
                }
                Err(e) => {
                    warn!(file = %file_path.display(), "Skipping unreadable schema dump: {}", e);
                }
            }
        }

        operations
    }

    /// スナップショット時点のスキーマを構築
    ///
    /// ダンプが無い場合は空のスキーマを返します。
    pub fn initialize_tables(&self) -> Schema {
        let operations = self.operations();
        let (schema, stats) = replay(Schema::new(), &operations);

        debug!(
            statements = operations.len(),
            applied = stats.applied,
            tables = schema.table_count(),
            "Loaded squashed schema"
        );

        schema
    }
}

/// ディレクトリ内のダンプファイルをファイル名順でスキャン
fn scan_dump_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| IoError::FileRead {
        path: dir.display().to_string(),
        cause: e.to_string(),
    })?;

    let mut files = Vec::new();
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
            if extension == "dump" || extension == "sql" {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
