// schemacastライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメイン（型式、スキーマ、マイグレーション操作、モデル、リフレクション契約）
// - services: スナップショット読み込み、マイグレーション再生、キャスト解決、プロパティ型推論
// - adapters: スキーマダンプの型マッピングとモデル定義ファイルへのアクセス

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
