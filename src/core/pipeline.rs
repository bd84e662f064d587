use crate::domain::model::{AccountKey, Dataset, ExportArtifact, ResolutionResult, ResolveSummary};
use crate::domain::ports::{ConfigProvider, Pipeline, Resolver, Storage};
use crate::excel;
use crate::utils::error::{ResolverError, Result};
use std::path::Path;
use tokio::sync::Mutex;

/// File name offered for download, matching what users of the original tool
/// expect to receive.
pub const EXPORT_FILE_NAME: &str = "updated_data.xlsx";

/// Extract → resolve → load over one uploaded workbook. Rows are processed
/// strictly sequentially in sheet order; per-row lookup failures become
/// sentinel cells and never stop the batch.
pub struct ResolvePipeline<S: Storage, C: ConfigProvider, R: Resolver> {
    storage: S,
    config: C,
    resolver: Mutex<R>,
}

impl<S: Storage, C: ConfigProvider, R: Resolver> ResolvePipeline<S, C, R> {
    pub fn new(storage: S, config: C, resolver: R) -> Self {
        Self {
            storage,
            config,
            resolver: Mutex::new(resolver),
        }
    }

    async fn resolve_rows(
        resolver: &mut R,
        mut dataset: Dataset,
        account_column: &str,
        target_column: &str,
    ) -> ResolveSummary {
        let total = dataset.rows.len();
        let mut resolved = 0;
        let mut empty = 0;
        let mut errors = 0;
        let mut invalid = 0;

        for (i, record) in dataset.rows.iter_mut().enumerate() {
            let raw = record.get(account_column).to_string();
            let key = match AccountKey::normalize(&raw) {
                Some(key) => key,
                None => {
                    // Invalid keys never reach the wire.
                    record.set(target_column, "");
                    invalid += 1;
                    continue;
                }
            };

            tracing::info!("🔁 [{}/{}] Resolving account {}", i + 1, total, key);
            let result = resolver.resolve(&key).await;
            match &result {
                ResolutionResult::CustomerId(_) => resolved += 1,
                ResolutionResult::Empty => empty += 1,
                ResolutionResult::Error => errors += 1,
            }
            record.set(target_column, result.as_cell());
        }

        ResolveSummary {
            dataset,
            resolved,
            empty,
            errors,
            invalid,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, R: Resolver> Pipeline for ResolvePipeline<S, C, R> {
    async fn extract(&self) -> Result<Dataset> {
        let path = self.config.input_path();
        tracing::debug!("Reading workbook from {}", path);
        let bytes = self.storage.read_file(path).await?;

        let mut dataset = excel::read_workbook(&bytes)?;

        let account_column = self.config.account_column();
        if !dataset.has_column(account_column) {
            return Err(ResolverError::processing(format!(
                "column '{}' not found in the uploaded sheet",
                account_column
            )));
        }
        dataset.ensure_column(self.config.target_column());

        Ok(dataset)
    }

    async fn resolve(&self, dataset: Dataset) -> Result<ResolveSummary> {
        let mut resolver = self.resolver.lock().await;

        if let Err(e) = resolver.open().await {
            // A half-opened session still has to be released.
            let _ = resolver.close().await;
            return Err(e);
        }

        // The row loop swallows its own failures, so nothing can skip this
        // close between open and here.
        let summary = Self::resolve_rows(
            &mut *resolver,
            dataset,
            self.config.account_column(),
            self.config.target_column(),
        )
        .await;

        resolver.close().await?;
        Ok(summary)
    }

    async fn load(&self, summary: ResolveSummary) -> Result<ExportArtifact> {
        let bytes = excel::write_workbook(&summary.dataset, self.config.account_column())?;
        let artifact = ExportArtifact::xlsx(EXPORT_FILE_NAME, bytes);

        let output_path = Path::new(self.config.output_path()).join(&artifact.file_name);
        let output_path = output_path.to_string_lossy();
        self.storage.write_file(&output_path, &artifact.bytes).await?;

        tracing::debug!(
            "Export written to {} ({} bytes)",
            output_path,
            artifact.bytes.len()
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Record;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex as StdMutex};

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<tokio::sync::Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: Vec<u8>) {
            self.files.lock().await.insert(path.to_string(), data);
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files.lock().await.get(path).cloned().ok_or_else(|| {
                ResolverError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig;

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            "input.xlsx"
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn account_column(&self) -> &str {
            "Account Number"
        }

        fn target_column(&self) -> &str {
            "Customer ID"
        }
    }

    #[derive(Default)]
    struct ResolverLog {
        opened: usize,
        closed: usize,
        keys: Vec<String>,
    }

    /// Returns scripted results in order; records every key it is asked for.
    struct ScriptedResolver {
        log: Arc<StdMutex<ResolverLog>>,
        script: Vec<ResolutionResult>,
        fail_open: bool,
    }

    impl ScriptedResolver {
        fn new(script: Vec<ResolutionResult>) -> (Self, Arc<StdMutex<ResolverLog>>) {
            let log = Arc::new(StdMutex::new(ResolverLog::default()));
            (
                Self {
                    log: log.clone(),
                    script,
                    fail_open: false,
                },
                log,
            )
        }
    }

    #[async_trait::async_trait]
    impl Resolver for ScriptedResolver {
        async fn open(&mut self) -> Result<()> {
            self.log.lock().unwrap().opened += 1;
            if self.fail_open {
                return Err(ResolverError::webdriver("no browser available"));
            }
            Ok(())
        }

        async fn resolve(&mut self, key: &AccountKey) -> ResolutionResult {
            let mut log = self.log.lock().unwrap();
            log.keys.push(key.as_str().to_string());
            let index = log.keys.len() - 1;
            self.script
                .get(index)
                .cloned()
                .unwrap_or(ResolutionResult::Empty)
        }

        async fn close(&mut self) -> Result<()> {
            self.log.lock().unwrap().closed += 1;
            Ok(())
        }
    }

    fn input_dataset(raw_accounts: &[&str]) -> Dataset {
        let mut dataset = Dataset::new(vec!["Account Number".into(), "Name".into()]);
        for (i, raw) in raw_accounts.iter().enumerate() {
            let mut record = Record::default();
            record.set("Account Number", *raw);
            record.set("Name", format!("Row {}", i + 1));
            dataset.rows.push(record);
        }
        dataset
    }

    async fn pipeline_with_input(
        raw_accounts: &[&str],
        script: Vec<ResolutionResult>,
    ) -> (
        ResolvePipeline<MockStorage, MockConfig, ScriptedResolver>,
        MockStorage,
        Arc<StdMutex<ResolverLog>>,
    ) {
        let storage = MockStorage::new();
        let bytes = excel::write_workbook(&input_dataset(raw_accounts), "Account Number").unwrap();
        storage.put_file("input.xlsx", bytes).await;

        let (resolver, log) = ScriptedResolver::new(script);
        let pipeline = ResolvePipeline::new(storage.clone(), MockConfig, resolver);
        (pipeline, storage, log)
    }

    #[tokio::test]
    async fn test_extract_appends_target_column() {
        let (pipeline, _storage, _log) = pipeline_with_input(&["123"], vec![]).await;

        let dataset = pipeline.extract().await.unwrap();

        assert_eq!(
            dataset.columns,
            vec!["Account Number", "Name", "Customer ID"]
        );
        assert_eq!(dataset.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_extract_missing_account_column_fails() {
        let storage = MockStorage::new();
        let mut dataset = Dataset::new(vec!["Something Else".into()]);
        let mut record = Record::default();
        record.set("Something Else", "42");
        dataset.rows.push(record);
        let bytes = excel::write_workbook(&dataset, "Something Else").unwrap();
        storage.put_file("input.xlsx", bytes).await;

        let (resolver, _log) = ScriptedResolver::new(vec![]);
        let pipeline = ResolvePipeline::new(storage, MockConfig, resolver);

        assert!(pipeline.extract().await.is_err());
    }

    #[tokio::test]
    async fn test_extract_unreadable_file_fails() {
        let storage = MockStorage::new();
        storage.put_file("input.xlsx", b"not a workbook".to_vec()).await;

        let (resolver, _log) = ScriptedResolver::new(vec![]);
        let pipeline = ResolvePipeline::new(storage, MockConfig, resolver);

        assert!(pipeline.extract().await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_processes_every_row_in_order() {
        let (pipeline, _storage, log) = pipeline_with_input(
            &["123", "abc", "456.0", "123456789012345"],
            vec![
                ResolutionResult::CustomerId("CUST-1".into()),
                ResolutionResult::Error,
            ],
        )
        .await;

        let dataset = pipeline.extract().await.unwrap();
        let summary = pipeline.resolve(dataset).await.unwrap();

        // N rows in, N output cells, in input order.
        assert_eq!(summary.dataset.rows.len(), 4);
        assert_eq!(summary.dataset.rows[0].get("Customer ID"), "CUST-1");
        assert_eq!(summary.dataset.rows[1].get("Customer ID"), "");
        assert_eq!(summary.dataset.rows[2].get("Customer ID"), "ERROR");
        assert_eq!(summary.dataset.rows[3].get("Customer ID"), "");

        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.invalid, 2);

        // Invalid keys never triggered a lookup.
        let log = log.lock().unwrap();
        assert_eq!(log.keys, vec!["00000000000123", "00000000000456"]);
        assert_eq!(log.opened, 1);
        assert_eq!(log.closed, 1);
    }

    #[tokio::test]
    async fn test_resolve_failure_at_one_row_never_stops_the_batch() {
        let (pipeline, _storage, log) = pipeline_with_input(
            &["1", "2", "3"],
            vec![
                ResolutionResult::Error,
                ResolutionResult::Empty,
                ResolutionResult::CustomerId("CUST-3".into()),
            ],
        )
        .await;

        let dataset = pipeline.extract().await.unwrap();
        let summary = pipeline.resolve(dataset).await.unwrap();

        assert_eq!(summary.dataset.rows[0].get("Customer ID"), "ERROR");
        assert_eq!(summary.dataset.rows[1].get("Customer ID"), "");
        assert_eq!(summary.dataset.rows[2].get("Customer ID"), "CUST-3");
        assert_eq!(log.lock().unwrap().keys.len(), 3);
    }

    #[tokio::test]
    async fn test_resolve_open_failure_still_closes_session() {
        let storage = MockStorage::new();
        let bytes = excel::write_workbook(&input_dataset(&["123"]), "Account Number").unwrap();
        storage.put_file("input.xlsx", bytes).await;

        let (mut resolver, log) = ScriptedResolver::new(vec![]);
        resolver.fail_open = true;
        let pipeline = ResolvePipeline::new(storage, MockConfig, resolver);

        let dataset = pipeline.extract().await.unwrap();
        assert!(pipeline.resolve(dataset).await.is_err());

        let log = log.lock().unwrap();
        assert_eq!(log.opened, 1);
        assert_eq!(log.closed, 1);
        assert!(log.keys.is_empty());
    }

    #[tokio::test]
    async fn test_load_writes_export_with_text_formatted_accounts() {
        let (pipeline, storage, _log) = pipeline_with_input(
            &["00000000000123"],
            vec![ResolutionResult::CustomerId("CUST-1".into())],
        )
        .await;

        let dataset = pipeline.extract().await.unwrap();
        let summary = pipeline.resolve(dataset).await.unwrap();
        let artifact = pipeline.load(summary).await.unwrap();

        assert_eq!(artifact.file_name, EXPORT_FILE_NAME);
        assert_eq!(artifact.content_type, ExportArtifact::XLSX_CONTENT_TYPE);

        let written = storage.get_file("out/updated_data.xlsx").await.unwrap();
        assert_eq!(written, artifact.bytes);

        let reread = excel::read_workbook(&written).unwrap();
        assert_eq!(reread.rows[0].get("Account Number"), "00000000000123");
        assert_eq!(reread.rows[0].get("Customer ID"), "CUST-1");
    }
}
