//! Common fixtures for integration tests.

#![allow(dead_code)]

use httpapifs::{HttpApiFs, HttpApiFsConfig, MemoryTransport};

/// `/docs/readme.txt` (120 bytes, mtime 1000) and the directory `/docs/img`.
pub fn docs_fs() -> HttpApiFs<MemoryTransport> {
    docs_fs_with(HttpApiFsConfig::default())
}

pub fn docs_fs_with(config: HttpApiFsConfig) -> HttpApiFs<MemoryTransport> {
    let transport = MemoryTransport::new();
    transport.add_file("/docs/readme.txt", &[b'r'; 120], 1000);
    transport.add_dir("/docs/img", 1000);
    transport.add_file("/a/x.txt", b"x", 1000);
    transport.add_dir("/b", 1000);
    HttpApiFs::with_transport(transport, &config)
}

/// Configuration that keeps `makedir` and uploads from touching the cache.
pub fn gap_preserving_config() -> HttpApiFsConfig {
    HttpApiFsConfig {
        invalidate_after_create: false,
        ..HttpApiFsConfig::default()
    }
}

pub fn gets(fs: &HttpApiFs<MemoryTransport>) -> usize {
    fs.transport().count("get")
}
