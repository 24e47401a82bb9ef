use crate::entry::EntryRecord;
use crate::error::{HttpApiFsError, Result};
use crate::transport::{ApiRequest, HttpTransport};
use serde::Deserialize;
use tracing::{debug, warn};

pub const FILE_NAME_HEADER: &str = "X_FILE_NAME";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SuccessFlag {
    Bool(bool),
    Text(String),
}

impl SuccessFlag {
    fn is_true(&self) -> bool {
        match self {
            SuccessFlag::Bool(b) => *b,
            SuccessFlag::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommandStatus {
    #[serde(default)]
    success: Option<SuccessFlag>,
}

/// One method per API command. Nothing here touches the listing cache.
pub struct RemoteApi<T> {
    transport: T,
}

impl<T: HttpTransport> RemoteApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `get`: the children of `dir`. A `null` body is an empty listing.
    pub fn list(&self, dir: &str) -> Result<Vec<EntryRecord>> {
        debug!("remote list {}", dir);
        let body = self
            .transport
            .execute(&ApiRequest::form("get", &[("path", dir)]))?;
        let records: Option<Vec<EntryRecord>> =
            serde_json::from_slice(&body).map_err(|source| HttpApiFsError::Decode {
                cmd: "get".to_string(),
                source,
            })?;
        Ok(records.unwrap_or_default())
    }

    /// `view`: the whole file.
    pub fn view(&self, file: &str) -> Result<Vec<u8>> {
        debug!("remote view {}", file);
        self.transport
            .execute(&ApiRequest::query("view", &[("file", file)]))
    }

    /// `upload`: replaces the whole file. The acknowledgement body is ignored.
    pub fn upload(&self, file: &str, data: &[u8]) -> Result<()> {
        debug!("remote upload {} ({} bytes)", file, data.len());
        let request = ApiRequest::query("upload", &[])
            .with_body(data.to_vec())
            .with_header(FILE_NAME_HEADER, file);
        self.transport.execute(&request)?;
        Ok(())
    }

    pub fn newdir(&self, dir: &str) -> Result<()> {
        self.command_status(ApiRequest::form("newdir", &[("dir", dir)]), dir)
    }

    pub fn delete(&self, file: &str) -> Result<()> {
        self.command_status(ApiRequest::form("delete", &[("file", file)]), file)
    }

    pub fn rename(&self, src: &str, dst: &str) -> Result<()> {
        self.command_status(
            ApiRequest::form("rename", &[("oldname", src), ("newname", dst)]),
            src,
        )
    }

    fn command_status(&self, request: ApiRequest, target: &str) -> Result<()> {
        let cmd = request.command().to_string();
        debug!("remote {} {}", cmd, target);
        let body = self.transport.execute(&request)?;
        let status: CommandStatus =
            serde_json::from_slice(&body).map_err(|source| HttpApiFsError::Decode {
                cmd: cmd.clone(),
                source,
            })?;
        if status.success.as_ref().is_some_and(SuccessFlag::is_true) {
            Ok(())
        } else {
            warn!("remote {} reported failure for {}", cmd, target);
            Err(HttpApiFsError::remote(
                cmd,
                format!("server reported failure for {}", target),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Answers every request with a fixed body.
    struct CannedTransport {
        body: Vec<u8>,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl CannedTransport {
        fn new(body: &str) -> Self {
            Self {
                body: body.as_bytes().to_vec(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpTransport for CannedTransport {
        fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>> {
            self.seen.lock().push(request.clone());
            Ok(self.body.clone())
        }
    }

    #[test]
    fn test_list_decodes_records() {
        let api = RemoteApi::new(CannedTransport::new(
            r#"[{"text":"readme.txt","leaf":true,"size":120,"modified_time":1000},{"text":"img","leaf":false}]"#,
        ));
        let records = api.list("/docs").unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_leaf());
        assert!(records[1].is_dir());

        let seen = api.transport().seen.lock();
        assert_eq!(seen[0].command(), "get");
        assert_eq!(seen[0].param("path"), Some("/docs"));
    }

    #[test]
    fn test_list_null_is_empty() {
        let api = RemoteApi::new(CannedTransport::new("null"));
        assert!(api.list("/docs").unwrap().is_empty());
    }

    #[test]
    fn test_list_garbage_is_decode_error() {
        let api = RemoteApi::new(CannedTransport::new("<html>oops</html>"));
        let err = api.list("/docs").unwrap_err();
        assert!(matches!(err, HttpApiFsError::Decode { .. }));
        assert!(err.is_remote());
    }

    #[test]
    fn test_status_string_true() {
        let api = RemoteApi::new(CannedTransport::new(r#"{"success":"true"}"#));
        assert!(api.newdir("/a").is_ok());
    }

    #[test]
    fn test_status_bool_true() {
        let api = RemoteApi::new(CannedTransport::new(r#"{"success":true}"#));
        assert!(api.delete("/a").is_ok());
    }

    #[test]
    fn test_status_false_is_remote_error() {
        let api = RemoteApi::new(CannedTransport::new(r#"{"success":"false"}"#));
        let err = api.rename("/a", "/b").unwrap_err();
        assert!(matches!(err, HttpApiFsError::Remote { .. }));
    }

    #[test]
    fn test_status_missing_flag_is_failure() {
        let api = RemoteApi::new(CannedTransport::new(r#"{}"#));
        assert!(api.newdir("/a").is_err());
    }

    #[test]
    fn test_upload_sends_header_and_body() {
        let api = RemoteApi::new(CannedTransport::new("ok"));
        api.upload("/docs/a.txt", b"payload").unwrap();

        let seen = api.transport().seen.lock();
        assert_eq!(seen[0].command(), "upload");
        assert_eq!(seen[0].header(FILE_NAME_HEADER), Some("/docs/a.txt"));
        assert_eq!(seen[0].raw_body(), b"payload");
    }

    #[test]
    fn test_view_returns_raw_bytes() {
        let api = RemoteApi::new(CannedTransport::new("file body"));
        assert_eq!(api.view("/docs/a.txt").unwrap(), b"file body");
        let seen = api.transport().seen.lock();
        assert_eq!(seen[0].param("file"), Some("/docs/a.txt"));
    }
}
