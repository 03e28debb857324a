//! Locale tables and message lookup.
//!
//! Messages are looked up in the requested locale, then the fallback
//! locale. Templates substitute each `%s` with the next argument.

use std::collections::HashMap;

use serde::Deserialize;
use shellui_types::error::{Result, ShellError};

const BUILTIN_TABLES: &[(&str, &str)] = &[
    ("en.toml", include_str!("../locales/en.toml")),
    ("fr.toml", include_str!("../locales/fr.toml")),
];

/// Anything that can resolve message keys.
pub trait MessageSource {
    /// Look up `key` and substitute `args`. `None` if no table defines it.
    fn get_message(&self, key: &str, args: &[&str]) -> Option<String>;

    /// Resolve text that is either a message key or literal text.
    fn resolve(&self, key_or_text: &str) -> String {
        self.get_message(key_or_text, &[])
            .unwrap_or_else(|| key_or_text.to_string())
    }
}

/// One locale's messages (`<code>.toml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LocaleTable {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

impl LocaleTable {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let table: Self =
            toml::from_str(text).map_err(|e| ShellError::Locale(format!("locale table: {e}")))?;
        if table.code.is_empty() {
            return Err(ShellError::Locale("locale table has an empty code".to_string()));
        }
        Ok(table)
    }

    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }
}

/// Registered locale tables plus the active and fallback locale.
#[derive(Debug, Clone)]
pub struct LocaleCatalog {
    tables: HashMap<String, LocaleTable>,
    locale: String,
    fallback: String,
}

impl LocaleCatalog {
    /// An empty catalog. The codes need not be registered yet.
    pub fn new(locale: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            tables: HashMap::new(),
            locale: locale.into(),
            fallback: fallback.into(),
        }
    }

    /// A catalog holding the embedded tables.
    ///
    /// If `locale` has no table the fallback becomes the active locale.
    pub fn with_builtin(locale: &str, fallback: &str) -> Self {
        let mut catalog = Self::new(fallback, fallback);
        for (file, text) in BUILTIN_TABLES {
            match LocaleTable::from_toml(text) {
                Ok(table) => catalog.add_table(table),
                Err(e) => log::warn!("Skipping built-in locale {file}: {e}"),
            }
        }
        if let Err(e) = catalog.set_locale(locale) {
            log::warn!("{e} -- using '{fallback}'");
        }
        catalog
    }

    /// Register a table. Messages merge into an existing table of the same
    /// code, the new templates replacing old ones.
    pub fn add_table(&mut self, table: LocaleTable) {
        match self.tables.get_mut(&table.code) {
            Some(existing) => {
                existing.messages.extend(table.messages);
                if !table.name.is_empty() {
                    existing.name = table.name;
                }
            },
            None => {
                log::debug!("Registered locale '{}'", table.code);
                self.tables.insert(table.code.clone(), table);
            },
        }
    }

    /// Switch the active locale.
    ///
    /// `fr-CH` falls back to `fr` when only the primary language is
    /// registered. Unknown codes leave the active locale unchanged.
    pub fn set_locale(&mut self, code: &str) -> Result<()> {
        let resolved = self
            .resolve_code(code)
            .ok_or_else(|| ShellError::Locale(format!("unknown locale: {code}")))?;
        log::info!("Locale set to '{resolved}'");
        self.locale = resolved;
        Ok(())
    }

    pub fn supports(&self, code: &str) -> bool {
        self.resolve_code(code).is_some()
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Registered locale codes, sorted.
    pub fn available(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    fn resolve_code(&self, code: &str) -> Option<String> {
        if self.tables.contains_key(code) {
            return Some(code.to_string());
        }
        let primary = code.split(['-', '_']).next()?;
        self.tables
            .contains_key(primary)
            .then(|| primary.to_string())
    }
}

impl MessageSource for LocaleCatalog {
    fn get_message(&self, key: &str, args: &[&str]) -> Option<String> {
        [&self.locale, &self.fallback]
            .into_iter()
            .filter_map(|code| self.tables.get(code.as_str()))
            .find_map(|table| table.get(key))
            .map(|template| format_message(template, args))
    }
}

/// Replace each `%s` in `template` with the next argument. Missing
/// arguments become empty text.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut pieces = template.split("%s");
    if let Some(first) = pieces.next() {
        out.push_str(first);
    }
    for piece in pieces {
        out.push_str(args.next().copied().unwrap_or_default());
        out.push_str(piece);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> LocaleCatalog {
        let mut c = LocaleCatalog::new("fr", "en");
        c.add_table(
            LocaleTable::new("en")
                .with_message("greet", "hello %s")
                .with_message("bye", "goodbye"),
        );
        c.add_table(LocaleTable::new("fr").with_message("greet", "bonjour %s"));
        c
    }

    #[test]
    fn format_substitutes_in_order() {
        assert_eq!(format_message("%s + %s = %s", &["1", "2", "3"]), "1 + 2 = 3");
    }

    #[test]
    fn format_missing_args_are_empty() {
        assert_eq!(format_message("a%sb%sc", &["X"]), "aXbc");
    }

    #[test]
    fn format_without_placeholders() {
        assert_eq!(format_message("plain", &["unused"]), "plain");
    }

    #[test]
    fn requested_locale_first() {
        assert_eq!(catalog().get_message("greet", &["Alice"]).unwrap(), "bonjour Alice");
    }

    #[test]
    fn falls_back_then_absent() {
        let c = catalog();
        assert_eq!(c.get_message("bye", &[]).unwrap(), "goodbye");
        assert!(c.get_message("missing", &[]).is_none());
    }

    #[test]
    fn resolve_uses_literal_when_no_key() {
        let c = catalog();
        assert_eq!(c.resolve("bye"), "goodbye");
        assert_eq!(c.resolve("Some literal text"), "Some literal text");
    }

    #[test]
    fn set_locale_known_and_unknown() {
        let mut c = catalog();
        c.set_locale("en").unwrap();
        assert_eq!(c.locale(), "en");
        let err = c.set_locale("xx").unwrap_err();
        assert!(format!("{err}").contains("unknown locale: xx"));
        assert_eq!(c.locale(), "en");
    }

    #[test]
    fn regional_code_uses_primary_language() {
        let mut c = catalog();
        c.set_locale("fr-CH").unwrap();
        assert_eq!(c.locale(), "fr");
        assert!(c.supports("en_US"));
    }

    #[test]
    fn add_table_merges() {
        let mut c = catalog();
        c.add_table(LocaleTable::new("fr").with_message("bye", "au revoir"));
        assert_eq!(c.get_message("bye", &[]).unwrap(), "au revoir");
        assert_eq!(c.get_message("greet", &["Bob"]).unwrap(), "bonjour Bob");
        assert_eq!(c.available(), vec!["en", "fr"]);
    }

    #[test]
    fn table_from_toml() {
        let t = LocaleTable::from_toml(
            r#"
            code = "de"
            name = "Deutsch"
            [messages]
            commandNotFound = "Befehl nicht gefunden: %s"
            "#,
        )
        .unwrap();
        assert_eq!(t.code, "de");
        assert_eq!(t.get("commandNotFound"), Some("Befehl nicht gefunden: %s"));
    }

    #[test]
    fn table_without_code_is_rejected() {
        assert!(LocaleTable::from_toml("code = \"\"").is_err());
        assert!(LocaleTable::from_toml("name = \"x\"").is_err());
    }

    #[test]
    fn builtin_tables_share_keys() {
        let c = LocaleCatalog::with_builtin("en", "en");
        assert_eq!(c.available(), vec!["en", "fr"]);
        let en = &c.tables["en"];
        let fr = &c.tables["fr"];
        for key in fr.messages.keys() {
            assert!(en.messages.contains_key(key), "fr key {key} missing in en");
        }
    }

    #[test]
    fn builtin_unknown_locale_uses_fallback() {
        let c = LocaleCatalog::with_builtin("xx", "en");
        assert_eq!(c.locale(), "en");
        assert_eq!(c.get_message("commandNotFound", &["foo"]).unwrap(), "command not found: foo");
    }

    #[test]
    fn builtin_french_falls_back_for_missing_keys() {
        let c = LocaleCatalog::with_builtin("fr", "en");
        assert_eq!(c.get_message("commandCancelled", &[]).unwrap(), "^C");
        assert_eq!(
            c.get_message("commandNotFound", &["foo"]).unwrap(),
            "commande introuvable : foo"
        );
    }
}
