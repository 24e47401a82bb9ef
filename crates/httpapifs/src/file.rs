use crate::adapter::HttpApiFs;
use crate::error::{HttpApiFsError, Result};
use crate::filesystem::{FileHandle, OpenMode};
use crate::transport::HttpTransport;

/// Whole-file handle over [`HttpApiFs::read`] and [`HttpApiFs::write`].
pub struct RemoteFile<'fs, T> {
    fs: &'fs HttpApiFs<T>,
    path: String,
    mode: OpenMode,
    size: Option<u64>,
    closed: bool,
}

impl<'fs, T: HttpTransport> RemoteFile<'fs, T> {
    pub(crate) fn new(fs: &'fs HttpApiFs<T>, path: String, mode: OpenMode, size: Option<u64>) -> Self {
        Self {
            fs,
            path,
            mode,
            size,
            closed: false,
        }
    }

    fn check(&self, op: &str, allowed: bool) -> Result<()> {
        if self.closed {
            return Err(HttpApiFsError::Unsupported {
                op: format!("{} on closed file {}", op, self.path),
            });
        }
        if !allowed {
            return Err(HttpApiFsError::Unsupported {
                op: format!("{} on file {} opened {:?}", op, self.path, self.mode),
            });
        }
        Ok(())
    }
}

impl<T: HttpTransport> FileHandle for RemoteFile<'_, T> {
    fn path(&self) -> &str {
        &self.path
    }

    fn mode(&self) -> OpenMode {
        self.mode
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn read(&mut self) -> Result<Vec<u8>> {
        self.check("read", self.mode.is_readable())?;
        self.fs.read(&self.path)
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.check("write", self.mode.is_writable())?;
        self.fs.write(&self.path, data)
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
