//! In-process implementation of the file-browser wire protocol.
//!
//! `MemoryTransport` answers the same commands as a real endpoint from an
//! in-memory tree, and records every request it receives so callers can
//! count remote round trips. Used for tests and for trying the adapter
//! without a server.

use crate::entry::EntryRecord;
use crate::error::{HttpApiFsError, Result};
use crate::path;
use crate::transport::{ApiRequest, HttpTransport};
use parking_lot::Mutex;
use std::collections::BTreeMap;

const START_CLOCK: i64 = 1_600_000_000;

#[derive(Debug, Clone)]
enum MemoryNode {
    Dir { modified: i64 },
    File { data: Vec<u8>, modified: i64 },
}

#[derive(Debug)]
struct MemoryState {
    nodes: BTreeMap<String, MemoryNode>,
    requests: Vec<ApiRequest>,
    offline: bool,
    clock: i64,
}

impl MemoryState {
    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn is_dir(&self, path: &str) -> bool {
        matches!(self.nodes.get(path), Some(MemoryNode::Dir { .. }))
    }

    fn ensure_dirs(&mut self, dir: &str, modified: i64) {
        let mut current = path::normalize(dir);
        let mut missing = Vec::new();
        while !self.nodes.contains_key(&current) {
            missing.push(current.clone());
            match path::parent(&current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        for dir in missing {
            self.nodes.insert(dir, MemoryNode::Dir { modified });
        }
    }

    fn listing(&self, dir: &str) -> Vec<EntryRecord> {
        self.nodes
            .iter()
            .filter_map(|(key, node)| {
                let (parent, name) = path::split(key)?;
                if parent != dir {
                    return None;
                }
                Some(match node {
                    MemoryNode::Dir { modified } => EntryRecord::dir(name, Some(*modified)),
                    MemoryNode::File { data, modified } => {
                        EntryRecord::file(name, data.len() as u64, *modified)
                    }
                })
            })
            .collect()
    }

    fn subtree(&self, root: &str) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|key| path::is_within(root, key))
            .cloned()
            .collect()
    }

    fn handle(&mut self, request: &ApiRequest) -> Result<Vec<u8>> {
        let cmd = request.command();
        let param = |key: &str| path::normalize(request.param(key).unwrap_or(""));
        match cmd {
            "get" => {
                let dir = param("path");
                serde_json::to_vec(&self.listing(&dir)).map_err(|source| HttpApiFsError::Decode {
                    cmd: cmd.to_string(),
                    source,
                })
            }
            "view" => match self.nodes.get(&param("file")) {
                Some(MemoryNode::File { data, .. }) => Ok(data.clone()),
                _ => Err(HttpApiFsError::remote(cmd, "HTTP status 404 Not Found")),
            },
            "upload" => {
                let target = path::normalize(request.header("X_FILE_NAME").unwrap_or(""));
                let ok = match path::parent(&target) {
                    Some(parent) if self.is_dir(&parent) && !self.is_dir(&target) => {
                        let modified = self.tick();
                        let data = request.raw_body().to_vec();
                        self.nodes
                            .insert(target, MemoryNode::File { data, modified });
                        true
                    }
                    _ => false,
                };
                Ok(status(ok))
            }
            "newdir" => {
                let dir = param("dir");
                let ok = match path::parent(&dir) {
                    Some(parent) if self.is_dir(&parent) && !self.nodes.contains_key(&dir) => {
                        let modified = self.tick();
                        self.nodes.insert(dir, MemoryNode::Dir { modified });
                        true
                    }
                    _ => false,
                };
                Ok(status(ok))
            }
            "delete" => {
                let target = param("file");
                let ok = !path::is_root(&target) && self.nodes.contains_key(&target);
                if ok {
                    for key in self.subtree(&target) {
                        self.nodes.remove(&key);
                    }
                }
                Ok(status(ok))
            }
            "rename" => {
                let src = param("oldname");
                let dst = param("newname");
                let ok = self.nodes.contains_key(&src)
                    && !path::is_root(&src)
                    && !path::is_within(&src, &dst)
                    && !path::is_within(&dst, &src)
                    && path::parent(&dst).is_some_and(|p| self.is_dir(&p));
                if ok {
                    for key in self.subtree(&dst) {
                        self.nodes.remove(&key);
                    }
                    for key in self.subtree(&src) {
                        if let Some(node) = self.nodes.remove(&key) {
                            let moved = format!("{}{}", dst, &key[src.len()..]);
                            self.nodes.insert(moved, node);
                        }
                    }
                }
                Ok(status(ok))
            }
            other => Err(HttpApiFsError::remote(other, "unknown command")),
        }
    }
}

fn status(ok: bool) -> Vec<u8> {
    let body = if ok {
        r#"{"success":"true"}"#
    } else {
        r#"{"success":"false"}"#
    };
    body.as_bytes().to_vec()
}

pub struct MemoryTransport {
    state: Mutex<MemoryState>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            path::ROOT.to_string(),
            MemoryNode::Dir {
                modified: START_CLOCK,
            },
        );
        Self {
            state: Mutex::new(MemoryState {
                nodes,
                requests: Vec::new(),
                offline: false,
                clock: START_CLOCK,
            }),
        }
    }

    /// Seeds a directory (and any missing ancestors) without recording a request.
    pub fn add_dir(&self, dir: &str, modified: i64) {
        self.state.lock().ensure_dirs(dir, modified);
    }

    /// Seeds a file (and any missing ancestor directories) without recording a request.
    pub fn add_file(&self, file: &str, data: &[u8], modified: i64) {
        let file = path::normalize(file);
        let mut state = self.state.lock();
        if let Some(parent) = path::parent(&file) {
            state.ensure_dirs(&parent, modified);
        }
        state.nodes.insert(
            file,
            MemoryNode::File {
                data: data.to_vec(),
                modified,
            },
        );
    }

    /// While offline every request fails as a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.lock().nodes.contains_key(&path::normalize(path))
    }

    pub fn contents(&self, file: &str) -> Option<Vec<u8>> {
        match self.state.lock().nodes.get(&path::normalize(file)) {
            Some(MemoryNode::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().requests.clone()
    }

    /// Number of recorded requests for `cmd`.
    pub fn count(&self, cmd: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.command() == cmd)
            .count()
    }

    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for MemoryTransport {
    fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());
        if state.offline {
            return Err(HttpApiFsError::remote(
                request.command(),
                "connection refused",
            ));
        }
        state.handle(request)
    }
}
