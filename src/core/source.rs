use anyhow::Context;
use std::path::{Path, PathBuf};

/// Where the batch of URLs comes from: a single CLI argument or the first
/// column of each row of a CSV file.
#[derive(Debug, Clone)]
pub enum UrlSource {
    Single(String),
    Csv(PathBuf),
}

impl UrlSource {
    /// Produces the ordered URL sequence. Fails before any download starts
    /// when the CSV path cannot be opened; no URL validation happens here
    /// (the engine decides what it can extract).
    pub fn urls(&self) -> anyhow::Result<Vec<String>> {
        match self {
            UrlSource::Single(url) => Ok(vec![url.clone()]),
            UrlSource::Csv(path) => read_urls_from_csv(path),
        }
    }
}

fn read_urls_from_csv(path: &Path) -> anyhow::Result<Vec<String>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open URL list {}", path.display()))?;

    let mut urls = Vec::new();
    for record in reader.into_records() {
        let record = record.with_context(|| format!("read URL list {}", path.display()))?;
        // First column only; extra columns in a row are ignored.
        if let Some(first) = record.get(0) {
            let first = first.trim();
            if !first.is_empty() {
                urls.push(first.to_string());
            }
        }
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn single_yields_exactly_that_url() {
        let urls = UrlSource::Single("https://example.com/v".to_string())
            .urls()
            .unwrap();
        assert_eq!(urls, vec!["https://example.com/v"]);
    }

    #[test]
    fn csv_takes_first_column_and_skips_empty_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a.url,").unwrap();
        writeln!(file, ",").unwrap();
        writeln!(file, "b.url,extra").unwrap();
        file.flush().unwrap();

        let urls = UrlSource::Csv(file.path().to_path_buf()).urls().unwrap();
        assert_eq!(urls, vec!["a.url", "b.url"]);
    }

    #[test]
    fn csv_blank_lines_are_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a.url").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "b.url").unwrap();
        file.flush().unwrap();

        let urls = UrlSource::Csv(file.path().to_path_buf()).urls().unwrap();
        assert_eq!(urls, vec!["a.url", "b.url"]);
    }

    #[test]
    fn missing_csv_file_is_an_error() {
        let err = UrlSource::Csv(PathBuf::from("/nonexistent/urls.csv"))
            .urls()
            .unwrap_err();
        assert!(err.to_string().contains("urls.csv"));
    }
}
