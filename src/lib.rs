//! Core dump generation for a trapped or paused WebAssembly execution.
//!
//! A core dump is an ordinary wasm module whose sections carry the guest's
//! state at the moment it stopped: the vendor custom sections `core` and
//! `corestack` describe the process and its call stack, and plain memory
//! and global sections describe the instance's types. An external
//! post-mortem debugger loads the file and reconstructs a symbolic
//! backtrace with the locals of every frame.
//!
//! The encoder works exclusively on borrowed [`StackSnapshot`] and
//! [`StoreSnapshot`] views; the interpreter must be halted while a dump is
//! taken. There is no recoverable-error path: a dump is a last-resort
//! diagnostic produced on the way down, so inconsistent input state aborts
//! instead of producing a file that misrepresents it, and I/O errors are
//! logged and reported without retry.
//!
//! ```
//! use wasm_coredump::{
//!     encode_coredump, FrameFunction, StackFrame, StackSnapshot, StackValue, StoreSnapshot,
//! };
//! use wasm_encoder::MemoryType;
//!
//! let frames = [
//!     StackFrame { function: None, value_pos: 0, local_count: 0 },
//!     StackFrame {
//!         function: Some(FrameFunction { index: 2, code_offset: 41 }),
//!         value_pos: 1,
//!         local_count: 1,
//!     },
//! ];
//! let values = [StackValue::I32(7)];
//! let memories = [MemoryType {
//!     minimum: 1,
//!     maximum: None,
//!     memory64: false,
//!     shared: false,
//!     page_size_log2: None,
//! }];
//! let dump = encode_coredump(
//!     &StackSnapshot { frames: &frames, values: &values },
//!     &StoreSnapshot { memories: &memories, globals: &[] },
//! );
//! assert!(dump.starts_with(b"\0asm"));
//! ```

#![deny(missing_docs)]

mod leb128;
pub mod sections;
mod snapshot;

pub use crate::snapshot::{
    FrameFunction, FrameRanges, StackFrame, StackSnapshot, StackValue, StoreSnapshot,
};
pub use wasm_encoder;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix of generated dump file names; the suffix is the Unix timestamp at
/// generation time.
const COREDUMP_PREFIX: &str = "coredump";

/// Encodes a core dump module from the given execution state.
///
/// The module carries, in order: the `core` and `corestack` custom
/// sections, a memory section with the first memory's type, and a global
/// section with every global's type. `wasm-encoder` contributes the magic
/// and version headers and all section framing.
///
/// Panics on inconsistent input state, per the crate-level contract.
pub fn encode_coredump(stack: &StackSnapshot<'_>, store: &StoreSnapshot<'_>) -> Vec<u8> {
    let mut module = wasm_encoder::Module::new();
    module.section(&sections::core_section());
    module.section(&sections::corestack_section(stack));
    module.section(&sections::memory_section(store.memories));
    module.section(&sections::global_section(store.globals));
    module.finish()
}

/// Generates a core dump and writes it to `coredump.<timestamp>` in the
/// current directory, returning the path of the written file.
///
/// A file of the same name is silently overwritten. Callers invoke this
/// while already handling a fault, so a failure to write is logged and
/// returned as-is; there is nothing to recover.
pub fn write_coredump(stack: &StackSnapshot<'_>, store: &StoreSnapshot<'_>) -> Result<PathBuf> {
    write_coredump_to(Path::new("."), stack, store)
}

/// Like [`write_coredump`], but places the dump in `dir` instead of the
/// current directory.
pub fn write_coredump_to(
    dir: &Path,
    stack: &StackSnapshot<'_>,
    store: &StoreSnapshot<'_>,
) -> Result<PathBuf> {
    log::info!("generating core dump");
    let bytes = encode_coredump(stack, store);
    let path = dir.join(format!("{COREDUMP_PREFIX}.{}", unix_timestamp()));
    if let Err(err) = fs::write(&path, &bytes) {
        log::error!("failed to write core dump to `{}`: {err}", path.display());
        return Err(err).with_context(|| format!("failed to write core dump to `{}`", path.display()));
    }
    log::info!("core dump written to `{}`", path.display());
    Ok(path)
}

fn unix_timestamp() -> u64 {
    // A clock before the epoch degrades to `coredump.0`.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
