//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive; `configparser` hands them
//! back lower-cased.

use crate::domain::error::AavcError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AavcError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| AavcError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn sections(&self) -> Vec<String> {
        self.config.sections()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const JOB_CONFIG: &str = r#"
[defaults]
base_amount = 10000
asymmetric_coefficient = 2.0
strategy = aavc_static
lookback_days = 365

[data]
price_dir = prices

[stock.AAPL]
reference_price = 150.0

[stock.7203.T]
base_amount = 5000
"#;

    #[test]
    fn from_string_parses_job_config() {
        let adapter = FileConfigAdapter::from_string(JOB_CONFIG).unwrap();
        assert_eq!(
            adapter.get_string("defaults", "strategy"),
            Some("aavc_static".to_string())
        );
        assert_eq!(
            adapter.get_string("data", "price_dir"),
            Some("prices".to_string())
        );
    }

    #[test]
    fn section_names_are_lowercased() {
        let adapter = FileConfigAdapter::from_string(JOB_CONFIG).unwrap();
        let mut sections = adapter.sections();
        sections.retain(|s| s != "default");
        sections.sort();
        assert_eq!(
            sections,
            vec!["data", "defaults", "stock.7203.t", "stock.aapl"]
        );
        assert_eq!(
            adapter.get_string("stock.AAPL", "reference_price"),
            Some("150.0".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[defaults]\nbase_amount = 100\n").unwrap();
        assert_eq!(adapter.get_string("defaults", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string(JOB_CONFIG).unwrap();
        assert_eq!(adapter.get_int("defaults", "lookback_days", 0), 365);
        assert_eq!(adapter.get_int("defaults", "missing", 42), 42);
        assert_eq!(adapter.get_int("defaults", "strategy", 42), 42);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(JOB_CONFIG);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_int("stock.7203.T", "base_amount", 0), 5000);
    }

    #[test]
    fn from_file_missing_is_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, AavcError::ConfigParse { .. }));
        assert_eq!(err.exit_status(), 2);
    }
}
