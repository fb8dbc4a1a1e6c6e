/// Completes table names from the catalog snapshot the console holds.
#[derive(Debug, Default, Clone)]
pub struct TableCompleter {
    tables: Vec<String>,
}

impl TableCompleter {
    pub fn new(tables: Vec<String>) -> Self {
        Self { tables }
    }

    pub fn set_tables(&mut self, tables: Vec<String>) {
        self.tables = tables;
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Case-insensitive prefix matches, sorted. Empty input suggests every table.
    pub fn suggestions(&self, input: &str) -> Vec<String> {
        let prefix = input.trim().to_lowercase();
        let mut suggestions: Vec<String> = self
            .tables
            .iter()
            .filter(|table| table.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        suggestions.sort();
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::TableCompleter;

    fn completer() -> TableCompleter {
        TableCompleter::new(vec![
            "sqlite_sequence".to_string(),
            "coins".to_string(),
            "Collectors".to_string(),
        ])
    }

    #[test]
    fn matches_prefix_ignoring_case() {
        assert_eq!(completer().suggestions("co"), vec!["Collectors", "coins"]);
        assert_eq!(completer().suggestions("SQL"), vec!["sqlite_sequence"]);
    }

    #[test]
    fn empty_input_lists_everything() {
        assert_eq!(completer().suggestions("  ").len(), 3);
    }

    #[test]
    fn unknown_prefix_has_no_suggestions() {
        assert!(completer().suggestions("zzz").is_empty());
    }
}
