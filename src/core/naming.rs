// 命名ポリシー
//
// 設定ファイル名の単一ソース、
// およびモデルの命名規約（アクセサ名・テーブル名）を提供します。

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".schemacast.yaml";

/// 単語境界で分割
///
/// `_`、`-`、空白、および小文字から大文字への切り替わりを境界とします。
fn split_words(value: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in value.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// StudlyCase に変換（`first_name` → `FirstName`）
pub fn studly(value: &str) -> String {
    split_words(value).iter().map(|w| capitalize(w)).collect()
}

/// camelCase に変換（`first_name` → `firstName`）
pub fn camel(value: &str) -> String {
    let studly = studly(value);
    let mut chars = studly.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// snake_case に変換（`BlogPost` → `blog_post`）
pub fn snake(value: &str) -> String {
    split_words(value)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// 英単語の複数形（単純な規則のみ）
pub fn plural(word: &str) -> String {
    let lower = word.to_lowercase();

    if lower.ends_with('y') {
        let before = lower.chars().rev().nth(1);
        if before.is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{}es", word);
    }

    format!("{}s", word)
}

/// 名前空間付きクラス名から末尾のクラス名を取得
pub fn class_basename(class: &str) -> &str {
    class.rsplit('\\').next().unwrap_or(class)
}

/// モデルクラスの既定テーブル名（`App\Models\BlogPost` → `blog_posts`）
pub fn table_name_for(class: &str) -> String {
    let snake = snake(class_basename(class));
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, plural(last)),
        None => plural(&snake),
    }
}

/// 旧来のアクセサメソッド名（`first_name` → `getFirstNameAttribute`）
pub fn legacy_accessor_name(property: &str) -> String {
    format!("get{}Attribute", studly(property))
}
