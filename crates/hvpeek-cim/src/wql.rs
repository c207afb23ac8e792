//! WQL query construction helpers.
//!
//! Escaping of string literals is opt-in: `where_eq` escapes, and
//! `where_eq_raw` substitutes the value verbatim for callers operating in
//! a trusted environment where byte-faithful query text matters.

/// Builder for WQL SELECT statements.
#[derive(Debug, Clone)]
pub struct WqlBuilder {
    select_fields: Vec<String>,
    class: String,
    conditions: Vec<String>,
}

impl WqlBuilder {
    /// Start building a query against a class.
    pub fn select(class: &str) -> Self {
        Self {
            select_fields: Vec::new(),
            class: class.to_string(),
            conditions: Vec::new(),
        }
    }

    /// Specify which fields to return (`*` if none specified).
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.select_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Add an equality condition with the value escaped: `Property = 'value'`.
    pub fn where_eq(mut self, property: &str, value: &str) -> Self {
        self.conditions
            .push(format!("{} = '{}'", property, wql_escape(value)));
        self
    }

    /// Add an equality condition with the value substituted verbatim.
    pub fn where_eq_raw(mut self, property: &str, value: &str) -> Self {
        self.conditions.push(format!("{property} = '{value}'"));
        self
    }

    /// Add a raw WQL condition expression.
    pub fn where_raw(mut self, condition: &str) -> Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// Render the query text.
    pub fn build(&self) -> String {
        let fields = if self.select_fields.is_empty() {
            "*".to_string()
        } else {
            self.select_fields.join(", ")
        };

        let mut query = format!("select {} from {}", fields, self.class);
        if !self.conditions.is_empty() {
            query.push_str(" where ");
            query.push_str(&self.conditions.join(" and "));
        }
        query
    }
}

/// Escape a WQL string literal. Backslashes are doubled before quotes are
/// escaped so the two rewrites cannot interfere.
pub fn wql_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
