use std::sync::OnceLock;

use regex::Regex;

/// Structured view of a PostgreSQL constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Table the violating row belongs to
    pub entity: String,
    /// Column (or comma separated columns) named by the constraint
    pub field: String,
    /// Offending value when the server reported one
    pub value: Option<String>,
}

/// Utility for parsing PostgreSQL constraint violation messages.
///
/// PostgreSQL splits the report between the primary message
/// (`duplicate key value violates unique constraint "products_pkey"`) and the
/// detail line (`Key (id)=(5) already exists.`); callers pass both joined.
pub struct ConstraintParser;

struct RegexPatterns {
    key_value: Regex,
    column_name: Regex,
    table_name: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("valid key/value pattern"),
            column_name: Regex::new(r#"column "([^"]+)""#).expect("valid column pattern"),
            table_name: Regex::new(r#"(?:table|relation) "([^"]+)""#).expect("valid table pattern"),
        }
    }
}

static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Parses a violation report into entity, field and value.
    ///
    /// `table` and `constraint` are the structured fields PostgreSQL attaches
    /// to the error; either may be missing, in which case the text is used.
    pub fn parse(
        text: &str,
        table: Option<&str>,
        constraint: Option<&str>,
    ) -> Option<ConstraintViolation> {
        let key_value = Self::extract_key_value(text);

        let entity = table
            .map(str::to_string)
            .or_else(|| Self::extract_table(text))?;

        let field = key_value
            .as_ref()
            .map(|(field, _)| field.clone())
            .or_else(|| Self::extract_column(text))
            .or_else(|| constraint.and_then(|c| Self::field_from_constraint(c, &entity)))?;

        Some(ConstraintViolation {
            entity,
            field,
            value: key_value.map(|(_, value)| value),
        })
    }

    /// Extracts `(field, value)` from a `Key (field)=(value)` detail line.
    pub fn extract_key_value(text: &str) -> Option<(String, String)> {
        Self::patterns()
            .key_value
            .captures(text)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
    }

    /// Extracts the quoted column name from a not-null report.
    pub fn extract_column(text: &str) -> Option<String> {
        Self::patterns()
            .column_name
            .captures(text)
            .map(|caps| caps[1].to_string())
    }

    /// Extracts the first quoted table or relation name.
    pub fn extract_table(text: &str) -> Option<String> {
        Self::patterns()
            .table_name
            .captures(text)
            .map(|caps| caps[1].to_string())
    }

    /// Derives the column from PostgreSQL's default constraint names:
    /// `{table}_pkey`, `{table}_{column}_key`, `{table}_{column}_fkey`.
    pub fn field_from_constraint(constraint: &str, table: &str) -> Option<String> {
        if constraint == format!("{table}_pkey") {
            return Some("id".to_string());
        }
        let rest = constraint.strip_prefix(table)?.strip_prefix('_')?;
        rest.strip_suffix("_fkey")
            .or_else(|| rest.strip_suffix("_key"))
            .filter(|field| !field.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primary_key_duplicate() {
        let text = "duplicate key value violates unique constraint \"products_pkey\"\nKey (id)=(5) already exists.";
        let parsed = ConstraintParser::parse(text, Some("products"), Some("products_pkey")).unwrap();
        assert_eq!(parsed.entity, "products");
        assert_eq!(parsed.field, "id");
        assert_eq!(parsed.value.as_deref(), Some("5"));
    }

    #[test]
    fn test_parse_foreign_key_without_table_field() {
        let text = "insert or update on table \"product_categories\" violates foreign key constraint \"product_categories_category_id_fkey\"\nKey (category_id)=(77) is not present in table \"categories\".";
        let parsed = ConstraintParser::parse(text, None, None).unwrap();
        assert_eq!(parsed.entity, "product_categories");
        assert_eq!(parsed.field, "category_id");
        assert_eq!(parsed.value.as_deref(), Some("77"));
    }

    #[test]
    fn test_parse_not_null() {
        let text = "null value in column \"title\" of relation \"products\" violates not-null constraint";
        let parsed = ConstraintParser::parse(text, None, None).unwrap();
        assert_eq!(parsed.entity, "products");
        assert_eq!(parsed.field, "title");
        assert_eq!(parsed.value, None);
    }

    #[test]
    fn test_parse_falls_back_to_constraint_name() {
        let parsed = ConstraintParser::parse(
            "violates unique constraint",
            Some("categories"),
            Some("categories_name_key"),
        )
        .unwrap();
        assert_eq!(parsed.field, "name");
    }

    #[test]
    fn test_parse_unrelated_message() {
        assert_eq!(ConstraintParser::parse("connection reset by peer", None, None), None);
    }

    #[test]
    fn test_field_from_constraint() {
        assert_eq!(
            ConstraintParser::field_from_constraint("products_pkey", "products"),
            Some("id".to_string())
        );
        assert_eq!(
            ConstraintParser::field_from_constraint(
                "product_categories_product_id_fkey",
                "product_categories"
            ),
            Some("product_id".to_string())
        );
        assert_eq!(
            ConstraintParser::field_from_constraint("other_name_key", "products"),
            None
        );
    }

    #[test]
    fn test_regex_patterns_caching() {
        let patterns1 = ConstraintParser::patterns();
        let patterns2 = ConstraintParser::patterns();
        assert!(std::ptr::eq(patterns1, patterns2));
    }
}
