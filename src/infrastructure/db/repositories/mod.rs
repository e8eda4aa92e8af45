pub mod follows_repository_sqlx;
pub mod like_repository_sqlx;
pub mod message_repository_sqlx;
pub mod store_sqlx;
pub mod user_repository_sqlx;

/// `ILIKE` pattern matching `needle` anywhere, with wildcards in `needle` escaped.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(contains_pattern("bob"), "%bob%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
