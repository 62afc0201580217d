// Core Domain
// スキーマ再構築、キャスト解決、型推論の純粋なドメインモデル

pub mod config;
pub mod error;
pub mod migration;
pub mod model;
pub mod naming;
pub mod reflection;
pub mod schema;
pub mod types;
