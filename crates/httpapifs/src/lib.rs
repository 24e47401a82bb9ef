//! HttpApiFS: a remote HTTP file-browser API exposed as a filesystem.
//!
//! The remote side can only list directories, so metadata lookups go through
//! a per-directory listing cache that mutations invalidate explicitly.

pub mod adapter;
pub mod cli;
pub mod config;
pub mod dir_cache;
pub mod entry;
pub mod error;
pub mod file;
pub mod filesystem;
pub mod memory;
pub mod path;
pub mod remote;
pub mod resolver;
pub mod transport;

pub use adapter::HttpApiFs;
pub use config::HttpApiFsConfig;
pub use dir_cache::{DirCache, DirCacheStats};
pub use entry::{EntryRecord, NodeInfo, NodeKind};
pub use error::{HttpApiFsError, Result};
pub use filesystem::{FileHandle, FileSystem, ListFilter, ListOptions, OpenMode};
pub use memory::MemoryTransport;
pub use transport::{ApiRequest, HttpTransport, ReqwestTransport, TransportConfig};
