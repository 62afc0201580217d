// スキーマダンプパーサー
//
// スカッシュ済みスキーマダンプ（SQL）を文に分割し、
// CREATE TABLE 文をテーブル作成操作へ変換します。
// 文字列リテラル、引用識別子、ドル引用符、コメント内の区切り文字は無視します。

use crate::adapters::type_mapping::{SqlType, TypeMappingService};
use crate::core::config::Dialect;
use crate::core::migration::Operation;
use crate::core::schema::{ColumnKind, ColumnSpec};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// CREATE TABLE 文のヘッダー
fn create_table_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)^CREATE\s+(?:(?:GLOBAL|LOCAL)\s+)?(?:TEMP(?:ORARY)?\s+|UNLOGGED\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?((?:[`"\[]?[\w$]+[`"\]]?\.)*[`"\[]?[\w$]+[`"\]]?)\s*\("#,
        )
        .ok()
    })
    .as_ref()
}

/// CREATE TYPE ... AS ENUM 文
fn create_enum_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)^CREATE\s+TYPE\s+((?:[`"]?[\w$]+[`"]?\.)*[`"]?[\w$]+[`"]?)\s+AS\s+ENUM\s*\((.*)\)\s*$"#,
        )
        .ok()
    })
    .as_ref()
}

/// NOT NULL 制約
fn not_null_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bNOT\s+NULL\b").ok())
        .as_ref()
}

/// インライン主キー制約
fn primary_key_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").ok())
        .as_ref()
}

/// 正規表現にマッチするかどうか
fn regex_matches(regex: Option<&Regex>, text: &str) -> bool {
    regex.is_some_and(|re| re.is_match(text))
}

/// 型名の後に続く制約キーワード
const CONSTRAINT_KEYWORDS: &[&str] = &[
    "not",
    "null",
    "default",
    "primary",
    "unique",
    "references",
    "check",
    "collate",
    "auto_increment",
    "autoincrement",
    "generated",
    "comment",
    "constraint",
    "on",
    "identity",
    "as",
    "invisible",
    "visible",
];

/// テーブルレベルの制約行の先頭キーワード
const CONSTRAINT_LINE_KEYWORDS: &[&str] = &[
    "primary",
    "unique",
    "constraint",
    "foreign",
    "check",
    "exclude",
];

/// インデックス定義行の先頭キーワード
///
/// PostgreSQL と SQLite ではカラム名として引用符なしで現れることがあります。
const INDEX_LINE_KEYWORDS: &[&str] = &["key", "index", "fulltext", "spatial"];

/// スキーマダンプパーサー
pub struct SchemaDumpParser {
    type_mapping: TypeMappingService,
}

impl SchemaDumpParser {
    /// 新しいSchemaDumpParserを作成
    pub fn new(dialect: Dialect) -> Self {
        Self {
            type_mapping: TypeMappingService::new(dialect),
        }
    }

    /// ダンプ全体を解析し、テーブル作成操作を記載順で返す
    pub fn parse(&self, sql: &str) -> Vec<Operation> {
        let mut enum_types: HashMap<String, Vec<String>> = HashMap::new();
        let mut operations = Vec::new();

        for statement in split_sql_statements(sql) {
            if let Some(caps) = create_enum_regex().and_then(|re| re.captures(&statement)) {
                let name = unqualified_name(&caps[1]).to_ascii_lowercase();
                enum_types.insert(name, split_arguments(&caps[2]));
                continue;
            }

            if let Some(operation) = self.parse_create_table(&statement, &enum_types) {
                operations.push(operation);
            }
        }

        operations
    }

    /// CREATE TABLE 文をテーブル作成操作へ変換
    fn parse_create_table(
        &self,
        statement: &str,
        enum_types: &HashMap<String, Vec<String>>,
    ) -> Option<Operation> {
        let caps = create_table_regex()?.captures(statement)?;
        let table = unqualified_name(&caps[1]).to_string();

        let open = caps.get(0)?.end() - 1;
        let body = balanced_group(&statement[open..])?;

        let columns = split_top_level(body, ',')
            .into_iter()
            .filter_map(|definition| self.parse_column_definition(definition, enum_types))
            .collect();

        Some(Operation::CreateTable { table, columns })
    }

    /// カラム定義行を解析
    ///
    /// テーブルレベルの制約行はNoneを返します。
    fn parse_column_definition(
        &self,
        definition: &str,
        enum_types: &HashMap<String, Vec<String>>,
    ) -> Option<ColumnSpec> {
        let definition = definition.trim();
        if definition.is_empty() {
            return None;
        }

        let (name, rest) = read_identifier(definition)?;
        if !is_quote(definition.chars().next()?) && self.is_table_level_line(&name, rest) {
            return None;
        }

        let (sql_type, constraints) = read_sql_type(rest);
        let kind = match enum_types.get(unqualified_name(&sql_type.name)) {
            Some(values) if !sql_type.array => ColumnKind::Enum {
                values: values.clone(),
            },
            _ => self.type_mapping.to_column_kind(&sql_type),
        };

        let nullable = !regex_matches(not_null_regex(), constraints)
            && !regex_matches(primary_key_regex(), constraints);

        Some(ColumnSpec::new(name, kind, nullable))
    }

    /// 引用符なしの先頭語がテーブルレベルの定義行を示すかどうか
    ///
    /// MySQL と SQL Server では `KEY`/`INDEX` は予約語のため、カラム名は必ず引用されます。
    /// それ以外の方言では直後に `(` が続く場合のみインデックス定義とみなします。
    fn is_table_level_line(&self, word: &str, rest: &str) -> bool {
        let word = word.to_ascii_lowercase();
        if CONSTRAINT_LINE_KEYWORDS.contains(&word.as_str()) {
            return true;
        }
        if !INDEX_LINE_KEYWORDS.contains(&word.as_str()) {
            return false;
        }

        match self.type_mapping.dialect() {
            Dialect::MySQL | Dialect::SqlServer => true,
            Dialect::PostgreSQL | Dialect::SQLite => rest.trim_start().starts_with('('),
        }
    }
}

fn is_quote(c: char) -> bool {
    matches!(c, '`' | '"' | '[')
}

/// スキーマ修飾と引用符を除いた識別子
fn unqualified_name(qualified: &str) -> &str {
    let last = qualified.rsplit('.').next().unwrap_or(qualified);
    last.trim_matches(|c| matches!(c, '`' | '"' | '[' | ']'))
}

/// 先頭の識別子を読み取り、(識別子, 残り) を返す
fn read_identifier(input: &str) -> Option<(String, &str)> {
    let first = input.chars().next()?;
    if is_quote(first) {
        let close = if first == '[' { ']' } else { first };
        let end = input[1..].find(close)? + 1;
        return Some((input[1..end].to_string(), &input[end + 1..]));
    }

    let end = input
        .find(|c: char| c.is_whitespace())
        .unwrap_or(input.len());
    Some((input[..end].to_string(), &input[end..]))
}

/// 型名部分を読み取り、(SqlType, 残りの制約部分) を返す
fn read_sql_type(input: &str) -> (SqlType, &str) {
    let mut sql_type = SqlType::default();
    let mut words: Vec<String> = Vec::new();
    let mut rest = input.trim_start();

    loop {
        let word_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(rest.len());
        if word_len == 0 {
            break;
        }

        let word = rest[..word_len].to_ascii_lowercase();
        let after = rest[word_len..].trim_start();

        if CONSTRAINT_KEYWORDS.contains(&word.as_str())
            || (word == "character" && after.to_ascii_lowercase().starts_with("set"))
            || (word == "charset")
        {
            break;
        }

        match word.as_str() {
            "unsigned" => sql_type.unsigned = true,
            "signed" | "zerofill" => {}
            _ => words.push(word),
        }
        rest = after;

        if rest.starts_with('(') {
            if let Some(group) = balanced_group(rest) {
                if sql_type.args.is_empty() {
                    sql_type.args = split_arguments(group);
                }
                rest = rest[group.len() + 2..].trim_start();
            }
        }

        if rest.starts_with("[]") {
            sql_type.array = true;
            rest = rest[2..].trim_start();
        }
    }

    sql_type.name = words.join(" ");
    (sql_type, rest)
}

/// 引数リストを分割し、クォートを除去
fn split_arguments(group: &str) -> Vec<String> {
    split_top_level(group, ',')
        .into_iter()
        .map(|arg| unquote(arg.trim()))
        .filter(|arg| !arg.is_empty())
        .collect()
}

fn unquote(value: &str) -> String {
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            let doubled = format!("{}{}", quote, quote);
            return value[1..value.len() - 1].replace(&doubled, &quote.to_string());
        }
    }
    value.to_string()
}

/// `(` で始まる入力から対応する `)` までの内側を返す
fn balanced_group(input: &str) -> Option<&str> {
    if !input.starts_with('(') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (pos, c) in input.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&input[1..pos]);
                    }
                }
                _ => {}
            },
        }
    }

    None
}

/// 括弧とクォートの外側にある区切り文字で分割
fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (pos, c) in input.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                c if c == separator && depth == 0 => {
                    parts.push(&input[start..pos]);
                    start = pos + c.len_utf8();
                }
                _ => {}
            },
        }
    }

    parts.push(&input[start..]);
    parts
}

/// 分割時の状態
#[derive(Debug, Clone, PartialEq)]
enum SplitState {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backtick,
    DollarQuoted(String),
    LineComment,
    BlockComment(u32),
}

/// SQL文字列を個別のステートメントに分割
///
/// コメントは出力から除去します。前後の空白はトリム済みです。
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = SplitState::Normal;
    let chars: Vec<char> = sql.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match &state {
            SplitState::SingleQuoted | SplitState::DoubleQuoted | SplitState::Backtick => {
                let closing = match state {
                    SplitState::SingleQuoted => '\'',
                    SplitState::DoubleQuoted => '"',
                    _ => '`',
                };
                current.push(c);
                if c == '\\' && closing == '\'' {
                    // MySQLのバックスラッシュエスケープ
                    if let Some(n) = next {
                        current.push(n);
                        i += 1;
                    }
                } else if c == closing {
                    if next == Some(closing) {
                        current.push(closing);
                        i += 1;
                    } else {
                        state = SplitState::Normal;
                    }
                }
                i += 1;
            }
            SplitState::DollarQuoted(tag) => {
                let tag_chars: Vec<char> = tag.chars().collect();
                if chars[i..].starts_with(&tag_chars) {
                    current.push_str(tag);
                    i += tag_chars.len();
                    state = SplitState::Normal;
                } else {
                    current.push(c);
                    i += 1;
                }
            }
            SplitState::LineComment => {
                if c == '\n' {
                    current.push('\n');
                    state = SplitState::Normal;
                }
                i += 1;
            }
            SplitState::BlockComment(depth) => {
                let depth = *depth;
                if c == '/' && next == Some('*') {
                    state = SplitState::BlockComment(depth + 1);
                    i += 2;
                } else if c == '*' && next == Some('/') {
                    state = if depth == 1 {
                        current.push(' ');
                        SplitState::Normal
                    } else {
                        SplitState::BlockComment(depth - 1)
                    };
                    i += 2;
                } else {
                    i += 1;
                }
            }
            SplitState::Normal => match c {
                '\'' => {
                    state = SplitState::SingleQuoted;
                    current.push(c);
                    i += 1;
                }
                '"' => {
                    state = SplitState::DoubleQuoted;
                    current.push(c);
                    i += 1;
                }
                '`' => {
                    state = SplitState::Backtick;
                    current.push(c);
                    i += 1;
                }
                '-' if next == Some('-') => {
                    state = SplitState::LineComment;
                    i += 2;
                }
                '#' => {
                    state = SplitState::LineComment;
                    i += 1;
                }
                '/' if next == Some('*') => {
                    state = SplitState::BlockComment(1);
                    i += 2;
                }
                '$' => match dollar_tag(&chars[i..]) {
                    Some(tag) => {
                        current.push_str(&tag);
                        i += tag.chars().count();
                        state = SplitState::DollarQuoted(tag);
                    }
                    None => {
                        current.push(c);
                        i += 1;
                    }
                },
                ';' => {
                    push_statement(&mut statements, &current);
                    current.clear();
                    i += 1;
                }
                _ => {
                    current.push(c);
                    i += 1;
                }
            },
        }
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, current: &str) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

/// `$tag$` 形式のドル引用符タグを読み取る
fn dollar_tag(chars: &[char]) -> Option<String> {
    let end = chars
        .iter()
        .skip(1)
        .position(|c| !(c.is_ascii_alphanumeric() || *c == '_'))?
        + 1;
    if chars.get(end) != Some(&'$') {
        return None;
    }
    if chars.get(1).is_some_and(|c| c.is_ascii_digit()) {
        // $1 などのプレースホルダー
        return None;
    }
    Some(chars[..=end].iter().collect())
}
