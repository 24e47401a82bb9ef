//! [`FileSystem`] backed by the remote HTTP API.
//!
//! Lookups go through the [`NodeResolver`]; mutations validate locally,
//! issue their command, and on success invalidate every listing that can
//! no longer be trusted.

use crate::config::HttpApiFsConfig;
use crate::dir_cache::DirCacheStats;
use crate::entry::{EntryRecord, NodeInfo};
use crate::error::{HttpApiFsError, Result};
use crate::file::RemoteFile;
use crate::filesystem::{FileHandle, FileSystem, FsMeta, ListFilter, ListOptions, OpenMode};
use crate::path;
use crate::remote::RemoteApi;
use crate::resolver::NodeResolver;
use crate::transport::{HttpTransport, ReqwestTransport};
use tracing::info;

pub struct HttpApiFs<T = ReqwestTransport> {
    resolver: NodeResolver<T>,
    invalidate_after_create: bool,
}

impl HttpApiFs<ReqwestTransport> {
    pub fn connect(config: &HttpApiFsConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.transport())?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: HttpTransport> HttpApiFs<T> {
    pub fn with_transport(transport: T, config: &HttpApiFsConfig) -> Self {
        Self {
            resolver: NodeResolver::new(RemoteApi::new(transport), config.root.clone()),
            invalidate_after_create: config.invalidate_after_create,
        }
    }

    pub fn transport(&self) -> &T {
        self.resolver.remote().transport()
    }

    pub fn resolver(&self) -> &NodeResolver<T> {
        &self.resolver
    }

    pub fn cache_stats(&self) -> DirCacheStats {
        self.resolver.stats()
    }

    pub fn meta(&self) -> FsMeta {
        FsMeta {
            network: true,
            virtual_fs: false,
            read_only: false,
            unicode_paths: true,
            case_insensitive_paths: false,
            atomic_rename: true,
            atomic_makedir: true,
            atomic_setcontents: true,
            read_and_write: false,
        }
    }

    /// Like `getinfo`, but re-fetches the parent listing first.
    pub fn getinfo_fresh(&self, path: &str) -> Result<NodeInfo> {
        let record = self
            .resolver
            .resolve(path, true)?
            .ok_or_else(|| HttpApiFsError::not_found(path::normalize(path)))?;
        Ok(NodeInfo::from(&record))
    }

    /// Re-fetches the listing that contains `path`.
    pub fn refresh_dir(&self, path: &str) -> Result<()> {
        let parent = path::parent(path).unwrap_or_else(|| path::ROOT.to_string());
        self.resolver.fetch(&parent)?;
        Ok(())
    }

    /// Reads the whole file. Never cached.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.resolver.remote().view(&path::normalize(path))
    }

    /// Replaces the whole file with `data`.
    pub fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let path = path::normalize(path);
        self.resolver.remote().upload(&path, data)?;
        info!("wrote {} bytes to {}", data.len(), path);
        if self.invalidate_after_create {
            self.resolver.invalidate_parent(&path);
        }
        Ok(())
    }

    fn create_dir(&self, path: &str) -> Result<()> {
        self.resolver.remote().newdir(path)?;
        info!("created directory {}", path);
        if self.invalidate_after_create {
            self.resolver.invalidate_parent(path);
        }
        Ok(())
    }

    /// Creates the missing ancestors of `path` top-down, so only listings of
    /// directories that exist are ever fetched. Returns whether any was created.
    fn create_ancestors(&self, path: &str) -> Result<bool> {
        let mut ancestors = Vec::new();
        let mut current = path::parent(path);
        while let Some(dir) = current {
            if path::is_root(&dir) {
                break;
            }
            current = path::parent(&dir);
            ancestors.push(dir);
        }

        let mut created = false;
        for dir in ancestors.into_iter().rev() {
            if !created {
                match self.resolver.resolve(&dir, false)? {
                    Some(r) if r.is_leaf() => {
                        return Err(HttpApiFsError::invalid_target(dir, "a file exists at this path"))
                    }
                    Some(_) => continue,
                    None => {}
                }
            }
            self.create_dir(&dir)?;
            created = true;
        }
        Ok(created)
    }

    fn node(&self, path: &str) -> Result<EntryRecord> {
        self.resolver
            .resolve(path, false)?
            .ok_or_else(|| HttpApiFsError::not_found(path::normalize(path)))
    }
}

impl<T: HttpTransport> FileSystem for HttpApiFs<T> {
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolver.resolve(path, false)?.is_some())
    }

    fn isdir(&self, path: &str) -> Result<bool> {
        Ok(self
            .resolver
            .resolve(path, false)?
            .is_some_and(|r| r.is_dir()))
    }

    fn isfile(&self, path: &str) -> Result<bool> {
        Ok(self
            .resolver
            .resolve(path, false)?
            .is_some_and(|r| r.is_leaf()))
    }

    fn getsize(&self, path: &str) -> Result<u64> {
        Ok(self.node(path)?.size())
    }

    fn getinfo(&self, path: &str) -> Result<NodeInfo> {
        Ok(NodeInfo::from(&self.node(path)?))
    }

    fn listdir(&self, path: &str, options: &ListOptions) -> Result<Vec<String>> {
        let dir = path::normalize(path);
        let pattern = options.pattern()?;
        // A cached listing under `dir` only means it was looked up as a parent.
        if !path::is_root(&dir) && self.node(&dir)?.is_leaf() {
            return Err(HttpApiFsError::invalid_target(dir, "not a directory"));
        }

        let entries = self.resolver.listing(&dir, options.refresh)?;
        Ok(entries
            .iter()
            .filter(|e| match options.filter {
                ListFilter::All => true,
                ListFilter::DirsOnly => e.is_dir(),
                ListFilter::FilesOnly => e.is_leaf(),
            })
            .filter(|e| pattern.as_ref().map_or(true, |p| p.matches(&e.name)))
            .map(|e| {
                if options.full {
                    path::join(&dir, &e.name)
                } else {
                    e.name.clone()
                }
            })
            .collect())
    }

    fn open(&self, path: &str, mode: &str) -> Result<Box<dyn FileHandle + '_>> {
        let mode = OpenMode::parse(mode)?;
        let path = path::normalize(path);
        let record = self.resolver.resolve(&path, false)?;
        if record.as_ref().is_some_and(|r| r.is_dir()) {
            return Err(HttpApiFsError::invalid_target(path, "is a directory"));
        }
        let size = match (mode, record) {
            (OpenMode::Read, Some(r)) => Some(r.size()),
            (OpenMode::Read, None) => return Err(HttpApiFsError::not_found(path)),
            (OpenMode::Write, _) => None,
        };
        Ok(Box::new(RemoteFile::new(self, path, mode, size)))
    }

    fn makedir(&self, path: &str, recursive: bool, allow_recreate: bool) -> Result<()> {
        let path = path::normalize(path);
        if path::is_root(&path) {
            return Ok(());
        }
        if recursive && self.create_ancestors(&path)? {
            // A freshly created parent has no children yet.
            return self.create_dir(&path);
        }
        match self.resolver.resolve(&path, false)? {
            Some(r) if r.is_leaf() => {
                return Err(HttpApiFsError::invalid_target(path, "a file exists at this path"))
            }
            Some(_) if allow_recreate => return Ok(()),
            Some(_) => return Err(HttpApiFsError::DestinationExists { path }),
            None => {}
        }
        self.create_dir(&path)
    }

    fn remove(&self, path: &str) -> Result<()> {
        let path = path::normalize(path);
        if self.node(&path)?.is_dir() {
            return Err(HttpApiFsError::invalid_target(path, "is a directory"));
        }
        self.resolver.remote().delete(&path)?;
        info!("removed file {}", path);
        self.resolver.invalidate_parent(&path);
        Ok(())
    }

    fn removedir(&self, path: &str) -> Result<()> {
        let path = path::normalize(path);
        if path::is_root(&path) {
            return Err(HttpApiFsError::invalid_target(path, "cannot remove the root"));
        }
        if self.node(&path)?.is_leaf() {
            return Err(HttpApiFsError::invalid_target(path, "not a directory"));
        }
        self.resolver.remote().delete(&path)?;
        info!("removed directory {}", path);
        self.resolver.invalidate_parent(&path);
        self.resolver.invalidate_tree(&path);
        Ok(())
    }

    fn rename(&self, src: &str, dst: &str, overwrite: bool) -> Result<()> {
        let src = path::normalize(src);
        let dst = path::normalize(dst);
        if path::is_root(&src) {
            return Err(HttpApiFsError::invalid_target(src, "cannot rename the root"));
        }
        let source = self.node(&src)?;
        if !overwrite && self.exists(&dst)? {
            return Err(HttpApiFsError::DestinationExists { path: dst });
        }

        self.resolver.remote().rename(&src, &dst)?;
        info!("renamed {} to {}", src, dst);
        self.resolver.invalidate_parent(&src);
        self.resolver.invalidate_parent(&dst);
        if source.is_dir() {
            self.resolver.invalidate_tree(&src);
        }
        self.resolver.invalidate_tree(&dst);
        Ok(())
    }

    fn reset_cache(&self) {
        self.resolver.clear();
    }
}
