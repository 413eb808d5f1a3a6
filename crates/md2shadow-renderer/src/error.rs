// error.rs — model load failures

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Md2Error {
    #[error("can't open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't allocate memory for {what}")]
    Resource {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("{name} is not an md2 model (ident {found:#010x})")]
    BadIdent { name: String, found: i32 },

    #[error("{name} has wrong version number ({found} should be {expected})")]
    BadVersion { name: String, found: i32, expected: i32 },

    #[error("{name} has no {what}")]
    EmptyModel { name: String, what: &'static str },

    #[error("{name}: {what} at offset {offset} (+{len} bytes) runs past end of file ({file_len} bytes)")]
    Truncated {
        name: String,
        what: &'static str,
        offset: i64,
        len: usize,
        file_len: usize,
    },

    #[error("{name}: {what} index {index} out of range (limit {limit})")]
    BadIndex {
        name: String,
        what: &'static str,
        index: i64,
        limit: usize,
    },

    /// More distinct edges than `3 * num_triangles`. Can only happen if the
    /// graph builder itself is broken.
    #[error("no room for edge ({capacity} slots)")]
    EdgeOverflow { capacity: usize },
}

impl Md2Error {
    pub(crate) fn resource(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| Md2Error::Resource { what, source }
    }
}
