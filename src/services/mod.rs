// Services Layer
// スキーマ再構築と型推論を実行するサービス層

pub mod cast_resolver;
pub mod migration_loader;
pub mod migration_replayer;
pub mod property_type_engine;
pub mod schema_dump_parser;
pub mod snapshot_loader;
