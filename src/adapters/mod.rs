// Adapters
// スキーマダンプの型解釈とモデル定義ファイルへのアクセスを抽象化

pub mod model_registry;
pub mod type_mapping;
