use std::sync::Arc;

use hop_runtime::OtpReader;
use hop_store::{resolve, OtpStore, Resolution, StoreError};
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum OtpError {
    #[error("no OTP entries configured; add one with `hop otp add`")]
    NoRecords,
    #[error("no OTP entry named {0:?}")]
    NotFound(String),
    #[error("{tool} not found or not available: {detail}")]
    ToolUnavailable { tool: String, detail: String },
    #[error("failed to read code for {alias:?}: {detail}")]
    Read { alias: String, detail: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpCode {
    pub alias: String,
    pub code: String,
}

/// Resolves an alias in the OTP catalog and reads its current code.
#[derive(Clone)]
pub struct OtpService {
    store: OtpStore,
    reader: Arc<dyn OtpReader>,
}

impl OtpService {
    pub fn new(store: OtpStore, reader: Arc<dyn OtpReader>) -> Self {
        Self { store, reader }
    }

    pub fn store(&self) -> &OtpStore {
        &self.store
    }

    /// Probes the reader's backing tool; returns its version.
    pub async fn check_tool(&self) -> Result<String, OtpError> {
        self.reader
            .version()
            .await
            .map_err(|err| OtpError::ToolUnavailable {
                tool: self.reader.id().to_string(),
                detail: err.to_string(),
            })
    }

    pub async fn fetch(&self, alias: &str) -> Result<OtpCode, OtpError> {
        let records = self.store.load().await?;
        let record = match resolve(&records, alias) {
            Resolution::Found(record) => record,
            Resolution::NotFound => return Err(OtpError::NotFound(alias.trim().to_string())),
            Resolution::Empty => return Err(OtpError::NoRecords),
        };
        self.check_tool().await?;

        let code = self
            .reader
            .read(&record.target.reference)
            .await
            .map_err(|err| OtpError::Read {
                alias: record.alias.clone(),
                detail: err.to_string(),
            })?;
        tracing::info!(target: "hop.audit", alias = %record.alias, "otp code read");
        Ok(OtpCode {
            alias: record.alias.clone(),
            code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hop_runtime::CapabilityError;
    use hop_store::{MemoryKv, ReferenceTarget};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeReader {
        missing: bool,
        fail_read: bool,
        reads: AtomicUsize,
        last: Mutex<Option<String>>,
    }

    #[async_trait::async_trait]
    impl OtpReader for FakeReader {
        fn id(&self) -> &'static str {
            "op"
        }

        async fn version(&self) -> Result<String, CapabilityError> {
            if self.missing {
                Err(CapabilityError::Unavailable("No such file or directory".into()))
            } else {
                Ok("2.30.0".into())
            }
        }

        async fn read(&self, reference: &str) -> Result<String, CapabilityError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().expect("lock") = Some(reference.to_string());
            if self.fail_read {
                Err(CapabilityError::Failed("[ERROR] item not found".into()))
            } else {
                Ok("123456".into())
            }
        }
    }

    async fn service_with(reader: Arc<FakeReader>, aliases: &[(&str, &str)]) -> OtpService {
        let store = OtpStore::new(Arc::new(MemoryKv::new()));
        for (alias, reference) in aliases {
            store
                .add(alias, ReferenceTarget::new(*reference))
                .await
                .expect("add");
        }
        OtpService::new(store, reader)
    }

    #[tokio::test]
    async fn fetch_reads_code_for_case_insensitive_alias() {
        let reader = Arc::new(FakeReader::default());
        let service = service_with(reader.clone(), &[("GitHub", "op://V/GitHub/otp")]).await;

        let code = service.fetch("github").await.expect("code");
        assert_eq!(
            code,
            OtpCode {
                alias: "GitHub".into(),
                code: "123456".into()
            }
        );
        assert_eq!(
            reader.last.lock().expect("lock").as_deref(),
            Some("op://V/GitHub/otp")
        );
    }

    #[tokio::test]
    async fn empty_catalog_and_unknown_alias_are_distinct() {
        let reader = Arc::new(FakeReader::default());
        let empty = service_with(reader.clone(), &[]).await;
        assert!(matches!(empty.fetch("x").await, Err(OtpError::NoRecords)));

        let service = service_with(reader.clone(), &[("Mail", "op://V/I/F")]).await;
        match service.fetch(" Bank ").await {
            Err(OtpError::NotFound(alias)) => assert_eq!(alias, "Bank"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(reader.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unavailable_tool_stops_before_reading() {
        let reader = Arc::new(FakeReader {
            missing: true,
            ..FakeReader::default()
        });
        let service = service_with(reader.clone(), &[("Mail", "op://V/I/F")]).await;
        let err = service.fetch("mail").await.expect_err("tool missing");
        assert!(err.to_string().contains("not found or not available"));
        assert_eq!(reader.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn read_failure_carries_tool_diagnostic() {
        let reader = Arc::new(FakeReader {
            fail_read: true,
            ..FakeReader::default()
        });
        let service = service_with(reader, &[("Mail", "op://V/I/F")]).await;
        let err = service.fetch("Mail").await.expect_err("read fails");
        assert!(err.to_string().contains("item not found"), "{err}");
    }
}
