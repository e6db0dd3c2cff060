//! Builders for the individual sections of a core dump module.
//!
//! Each builder returns one self-contained `wasm-encoder` section; the
//! orchestrator in the crate root decides which of them end up in the
//! emitted module and in what order.

use crate::leb128;
use crate::snapshot::StackSnapshot;
use std::borrow::Cow;
use wasm_encoder::{
    ConstExpr, CustomSection, DataSection, GlobalSection, GlobalType, MemorySection, MemoryType,
};

/// Record tag for native thread descriptors in the `corestack` section.
const THREAD_INFO_TAG: u8 = 0x00;

/// Record tag for stack frames in the `corestack` section.
const FRAME_TAG: u8 = 0x00;

/// Value-type tag written before every persisted slot. The consuming
/// debugger only understands `i32` records, so every value is tagged `0x7F`
/// no matter its native type.
const I32_TYPE_TAG: u8 = 0x7f;

/// Name of the sole thread recorded in a dump. Multi-threaded capture is
/// not supported.
const THREAD_NAME: &str = "main";

/// Builds the `core` custom section: a two-byte process-info stub reserved
/// for format versioning.
pub fn core_section() -> CustomSection<'static> {
    CustomSection {
        name: "core".into(),
        data: Cow::Borrowed(&[0x00, 0x00]),
    }
}

/// Builds the `corestack` custom section holding the captured call stack.
///
/// The payload records one thread descriptor for `"main"`, the number of
/// guest frames, and then each frame from innermost to outermost: a frame
/// tag, the function index, the code offset, the local and operand slot
/// counts, and finally one tagged record per local value. Operand values
/// are counted but never written; the debugger cannot consume them.
///
/// The entry frame (index 0) represents the host context and is excluded
/// from the frame count. Frames executing no wasm function emit nothing,
/// yet still count toward the total and toward their neighbors' stack
/// partitions.
///
/// Panics if the snapshot has no entry frame or if any frame's recorded
/// partition falls outside the value stack.
pub fn corestack_section(stack: &StackSnapshot<'_>) -> CustomSection<'static> {
    assert!(
        !stack.frames.is_empty(),
        "a stack snapshot always contains the entry frame"
    );

    let mut content = Vec::new();
    content.push(THREAD_INFO_TAG);
    content.push(THREAD_NAME.len() as u8);
    content.extend_from_slice(THREAD_NAME.as_bytes());

    let frame_count = stack.frames.len() - 1;
    leb128::write_unsigned(&mut content, frame_count as u64);

    for index in (1..stack.frames.len()).rev() {
        let frame = &stack.frames[index];
        let Some(function) = frame.function else {
            continue;
        };
        let ranges = stack.frame_ranges(index);

        content.push(FRAME_TAG);
        leb128::write_unsigned(&mut content, u64::from(function.index));
        leb128::write_unsigned(&mut content, u64::from(function.code_offset));
        leb128::write_unsigned(&mut content, frame.local_count as u64);
        leb128::write_unsigned(&mut content, ranges.operands.len() as u64);

        for value in &stack.values[ranges.locals] {
            content.push(I32_TYPE_TAG);
            content.extend_from_slice(&value.persisted_bits().to_le_bytes());
        }
    }

    CustomSection {
        name: "corestack".into(),
        data: Cow::Owned(content),
    }
}

/// Builds the memory section, capturing the type of the instance's first
/// memory.
///
/// Multi-memory capture is not supported: additional memories are ignored.
/// Panics if the instance has no memory at all; callers must not ask for a
/// dump of a memory-less instance.
pub fn memory_section(memories: &[MemoryType]) -> MemorySection {
    assert!(
        !memories.is_empty(),
        "cannot capture the memory of an instance with no memory"
    );
    let mut section = MemorySection::new();
    section.memory(memories[0]);
    section
}

/// Builds the global section: every global's declared type paired with an
/// initializer that is just the `end` marker.
///
/// Runtime values of globals are not captured. The empty initializer keeps
/// the section grammatically well formed for the debugger, which only reads
/// the types.
pub fn global_section(globals: &[GlobalType]) -> GlobalSection {
    let mut section = GlobalSection::new();
    for ty in globals {
        section.global(*ty, &ConstExpr::empty());
    }
    section
}

/// Builds the `coremodules` custom section stub.
///
/// Module descriptors are not captured yet; the single zero byte is an
/// empty module list. The stub is not part of emitted dumps.
pub fn coremodules_section() -> CustomSection<'static> {
    CustomSection {
        name: "coremodules".into(),
        data: Cow::Borrowed(&[0x00]),
    }
}

/// Builds the `coreinstances` custom section stub, an empty instance list.
/// Like [`coremodules_section`], it is not part of emitted dumps.
pub fn coreinstances_section() -> CustomSection<'static> {
    CustomSection {
        name: "coreinstances".into(),
        data: Cow::Borrowed(&[0x00]),
    }
}

/// Builds an empty data section. Linear-memory contents are not captured
/// yet, so emitted dumps carry no data section at all; the stub only pins
/// down the shape a future capture would take.
pub fn data_section() -> DataSection {
    DataSection::new()
}
