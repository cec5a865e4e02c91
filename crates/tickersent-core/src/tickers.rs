use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One tracked ticker from `config/tickers.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerConfig {
    pub symbol: String,
    /// Display name. When absent the name reported by the market-data
    /// provider is used.
    #[serde(default)]
    pub company_name: Option<String>,
    /// Terms an article paragraph must contain to be kept. Defaults to the
    /// symbol itself.
    #[serde(default)]
    pub query_terms: Vec<String>,
}

impl TickerConfig {
    /// Uppercased, trimmed symbol used for lookups and output file names.
    #[must_use]
    pub fn normalized_symbol(&self) -> String {
        self.symbol.trim().to_uppercase()
    }

    /// Terms used to filter article paragraphs; falls back to the symbol.
    #[must_use]
    pub fn effective_query_terms(&self) -> Vec<String> {
        let terms: Vec<String> = self
            .query_terms
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            vec![self.normalized_symbol()]
        } else {
            terms
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TickersFile {
    pub tickers: Vec<TickerConfig>,
}

impl TickersFile {
    /// Find a ticker by symbol, case-insensitively.
    #[must_use]
    pub fn find(&self, symbol: &str) -> Option<&TickerConfig> {
        let wanted = symbol.trim().to_uppercase();
        self.tickers
            .iter()
            .find(|t| t.normalized_symbol() == wanted)
    }
}

/// Load and validate the ticker list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_tickers(path: &Path) -> Result<TickersFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TickersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let tickers_file: TickersFile =
        serde_yaml::from_str(&content).map_err(ConfigError::TickersFileParse)?;

    validate_tickers(&tickers_file)?;

    Ok(tickers_file)
}

/// Check a single ticker symbol and return its normalized form.
///
/// Symbols must be non-empty after trimming and use only ASCII letters,
/// digits, `.`, `-`, `^` and `=`. The same rule guards symbols typed on the
/// command line, since they become output file names.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] if the symbol is blank or contains any
/// other character.
pub fn validate_symbol(symbol: &str) -> Result<String, ConfigError> {
    let normalized = symbol.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(ConfigError::Validation(
            "ticker symbol must be non-empty".to_string(),
        ));
    }

    if !normalized
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(ConfigError::Validation(format!(
            "ticker '{symbol}' contains invalid characters"
        )));
    }

    if normalized.chars().all(|c| c == '.') {
        return Err(ConfigError::Validation(format!(
            "ticker '{symbol}' is not a valid symbol"
        )));
    }

    Ok(normalized)
}

fn validate_tickers(tickers_file: &TickersFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for ticker in &tickers_file.tickers {
        let symbol = validate_symbol(&ticker.symbol)?;
        if !seen.insert(symbol.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate ticker symbol: '{symbol}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn ticker(symbol: &str) -> TickerConfig {
        TickerConfig {
            symbol: symbol.to_string(),
            company_name: None,
            query_terms: vec![],
        }
    }

    #[test]
    fn query_terms_default_to_symbol() {
        assert_eq!(ticker(" goog ").effective_query_terms(), vec!["GOOG"]);
    }

    #[test]
    fn explicit_query_terms_are_trimmed() {
        let t = TickerConfig {
            query_terms: vec![" Alphabet ".to_string(), String::new()],
            ..ticker("GOOG")
        };
        assert_eq!(t.effective_query_terms(), vec!["Alphabet"]);
    }

    #[test]
    fn validate_rejects_empty_symbol() {
        let file = TickersFile {
            tickers: vec![ticker("  ")],
        };
        let err = validate_tickers(&file).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_invalid_characters() {
        let file = TickersFile {
            tickers: vec![ticker("GO OG")],
        };
        let err = validate_tickers(&file).unwrap_err();
        assert!(err.to_string().contains("invalid characters"));
    }

    #[test]
    fn validate_rejects_case_insensitive_duplicates() {
        let file = TickersFile {
            tickers: vec![ticker("msft"), ticker("MSFT")],
        };
        let err = validate_tickers(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate ticker symbol"));
    }

    #[test]
    fn validate_accepts_class_and_index_symbols() {
        let file = TickersFile {
            tickers: vec![ticker("BRK-B"), ticker("^GSPC"), ticker("RDS.A")],
        };
        assert!(validate_tickers(&file).is_ok());
    }

    #[test]
    fn validate_symbol_normalizes() {
        assert_eq!(validate_symbol(" brk-b ").unwrap(), "BRK-B");
    }

    #[test]
    fn validate_symbol_rejects_path_like_input() {
        for bad in ["../x", "a/b", "..", "  ", "MS FT"] {
            assert!(
                matches!(validate_symbol(bad), Err(ConfigError::Validation(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn find_is_case_insensitive() {
        let file = TickersFile {
            tickers: vec![ticker("GOOG"), ticker("MSFT")],
        };
        assert_eq!(file.find("msft").map(|t| t.symbol.as_str()), Some("MSFT"));
        assert!(file.find("AAPL").is_none());
    }

    #[test]
    fn load_tickers_reads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "tickers:\n  - symbol: GOOG\n    company_name: Alphabet Inc.\n    query_terms: [GOOG, Alphabet]\n  - symbol: msft"
        )
        .unwrap();

        let loaded = load_tickers(file.path()).unwrap();
        assert_eq!(loaded.tickers.len(), 2);
        assert_eq!(
            loaded.tickers[0].company_name.as_deref(),
            Some("Alphabet Inc.")
        );
        assert_eq!(loaded.tickers[1].normalized_symbol(), "MSFT");
    }

    #[test]
    fn load_tickers_missing_file_is_io_error() {
        let err = load_tickers(Path::new("/nonexistent/tickers.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::TickersFileIo { .. }));
    }
}
