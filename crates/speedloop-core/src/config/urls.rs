use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default URL list location, relative to the working directory.
pub const DEFAULT_URLS_PATH: &str = "urls.yaml";

/// Ordered list of URLs to measure, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UrlList {
    #[serde(default)]
    pub urls: Vec<String>,
}

impl UrlList {
    pub fn from_yaml(path: &Path, data: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Entries that are not absolute http/https URLs. They are still measured
    /// (and will report a setup or connection error), this is only for warnings.
    pub fn suspicious(&self) -> Vec<&str> {
        self.urls
            .iter()
            .filter(|u| {
                !matches!(
                    url::Url::parse(u).map(|p| p.scheme().to_string()).as_deref(),
                    Ok("http") | Ok("https")
                )
            })
            .map(String::as_str)
            .collect()
    }
}

/// Read and parse the URL list. Missing file or malformed YAML is an error.
pub fn load_urls(path: &Path) -> Result<UrlList, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let list = UrlList::from_yaml(path, &data)?;
    tracing::debug!(path = %path.display(), count = list.urls.len(), "loaded URL list");
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_url_list_in_order() {
        let yaml = r#"
urls:
  - https://example.test/1mb
  - http://example.test/10mb
"#;
        let list = UrlList::from_yaml(Path::new("urls.yaml"), yaml).unwrap();
        assert_eq!(
            list.urls,
            vec!["https://example.test/1mb", "http://example.test/10mb"]
        );
    }

    #[test]
    fn empty_list_is_valid() {
        let list = UrlList::from_yaml(Path::new("urls.yaml"), "urls: []\n").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let err = UrlList::from_yaml(Path::new("urls.yaml"), "urls: [unclosed\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let err = UrlList::from_yaml(Path::new("urls.yaml"), "urls: 42\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = load_urls(&dir.path().join("urls.yaml")).unwrap_err();
        match err {
            ConfigError::Read { path, .. } => assert!(path.ends_with("urls.yaml")),
            other => panic!("expected Read, got {:?}", other),
        }
    }

    #[test]
    fn load_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("urls.yaml");
        fs::write(&path, "urls:\n  - https://example.test/a\n").unwrap();
        let list = load_urls(&path).unwrap();
        assert_eq!(list.urls, vec!["https://example.test/a"]);
    }

    #[test]
    fn suspicious_flags_non_http_entries() {
        let list = UrlList {
            urls: vec![
                "https://ok.test/".into(),
                "ftp://nope.test/".into(),
                "not a url".into(),
                "http://ok.test/x".into(),
            ],
        };
        assert_eq!(list.suspicious(), vec!["ftp://nope.test/", "not a url"]);
    }
}
