//! Datastore file I/O: strict `[ds] path` parsing
//! plus upload/download against the vCenter HTTP file-transfer endpoint.

use std::io::Read;

use crate::resilience::{Error, Result};

/// Parses a datastore path of the form `[datastoreName] path/to/file`.
/// Strict: must begin with `[`, contain a closing `]`; the remainder
/// (trimmed) is the in-datastore path with any leading `/` stripped.
pub fn parse_datastore_path(input: &str) -> Result<(String, String)> {
    let rest = input
        .strip_prefix('[')
        .ok_or_else(|| Error::invalid_spec(format!("datastore path must start with '[': {input:?}")))?;
    let close = rest
        .find(']')
        .ok_or_else(|| Error::invalid_spec(format!("datastore path missing closing ']': {input:?}")))?;
    let datastore = rest[..close].to_string();
    let path = rest[close + 1..].trim().trim_start_matches('/').to_string();
    Ok((datastore, path))
}

/// A reader wrapper that invokes `callback` with the number of bytes read
/// after each read, for upload/download progress reporting.
/// Callers must not block the callback.
pub struct ProgressReader<R, F> {
    inner: R,
    callback: F,
}

impl<R: Read, F: FnMut(usize)> ProgressReader<R, F> {
    pub fn new(inner: R, callback: F) -> Self {
        ProgressReader { inner, callback }
    }
}

impl<R: Read, F: FnMut(usize)> Read for ProgressReader<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        (self.callback)(n);
        Ok(n)
    }
}

/// Builds the vCenter HTTP file-transfer URL for a datastore file, as used
/// by upload/download (`GET`/`PUT` against `/folder/<path>?dcPath=...&dsName=...`).
pub fn file_transfer_url(base: &url::Url, datacenter: &str, datastore: &str, path: &str) -> Result<url::Url> {
    let mut url = base
        .join(&format!("/folder/{path}"))
        .map_err(|e| Error::invalid_spec(format!("invalid datastore path for URL: {e}")))?;
    url.query_pairs_mut()
        .append_pair("dcPath", datacenter)
        .append_pair("dsName", datastore);
    Ok(url)
}
