// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// schemacast - Model property type inference from migrations
///
/// Reconstructs the database schema from squashed schema dumps and
/// migration logs, then infers readable and writable property types
/// for ORM model classes.
#[derive(Parser, Debug)]
#[command(name = "schemacast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Infer model property types from schema dumps and migrations")]
#[command(long_about = "schemacast - Model property type inference

Reconstructs the database schema from a squashed schema dump and the
migration log recorded after it, overlays each model's casts, and reports
the type observed when reading a property and the type accepted when
writing it.

Supported databases: PostgreSQL, MySQL, SQLite, SQL Server")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Create .schemacast.yaml with `version` and `dialect`
  2. Describe your models in models.yaml
  3. Inspect a property:          schemacast property User email
  4. List a model's properties:   schemacast model User
  5. Show the rebuilt schema:     schemacast tables

For detailed help on each command, use: schemacast <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the inferred types of a single model property
    ///
    /// EXAMPLES:
    ///   # Fully qualified class name
    ///   schemacast property 'App\Models\User' email
    ///
    ///   # Class basename, JSON output
    ///   schemacast property User created_at --format json
    Property {
        /// Model class (fully qualified or basename)
        #[arg(value_name = "MODEL")]
        model: String,

        /// Property name
        #[arg(value_name = "PROPERTY")]
        property: String,
    },

    /// List every inferable property of a model
    ///
    /// EXAMPLES:
    ///   schemacast model User
    Model {
        /// Model class (fully qualified or basename)
        #[arg(value_name = "MODEL")]
        model: String,
    },

    /// Show the reconstructed schema
    ///
    /// EXAMPLES:
    ///   # All tables
    ///   schemacast tables
    ///
    ///   # A single table
    ///   schemacast tables users
    Tables {
        /// Table name (all tables when omitted)
        #[arg(value_name = "TABLE")]
        table: Option<String>,
    },
}
