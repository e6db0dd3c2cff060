//! Read-only views over the interpreter state captured in a core dump.
//!
//! Nothing here owns runtime state. A dump borrows the live frame list,
//! value stack, and instance metadata for the duration of a single encode
//! call, and the owning execution must stay halted while the views are
//! alive.

use core::ops::Range;
use wasm_encoder::{GlobalType, MemoryType};

/// One activation record on the call stack.
///
/// Frames are ordered outermost first: index 0 is the synthetic entry frame
/// representing the host context, and the last index is the frame that was
/// executing when the dump was taken.
#[derive(Clone, Copy, Debug)]
pub struct StackFrame {
    /// The wasm function this frame is executing, or `None` for host and
    /// other synthetic frames. Frames without a function are omitted from
    /// the encoded dump.
    pub function: Option<FrameFunction>,
    /// Index into the value stack one past this frame's local slots.
    pub value_pos: usize,
    /// Number of value-stack slots holding this frame's locals.
    pub local_count: usize,
}

/// Identifies the instruction a frame was executing.
#[derive(Clone, Copy, Debug)]
pub struct FrameFunction {
    /// Index of the function in its module's function index space.
    pub index: u32,
    /// Byte offset of the current instruction within the function's code.
    pub code_offset: u32,
}

/// A single slot on the flat value stack.
///
/// Slots keep their full native width here. The dump format only persists
/// 32-bit payloads; [`StackValue::persisted_bits`] is the one place that
/// truncation happens, so a future format revision with wider records only
/// has to touch that method.
#[derive(Clone, Copy, Debug)]
pub enum StackValue {
    /// A 32-bit integer.
    I32(i32),
    /// A 64-bit integer.
    I64(i64),
    /// A 32-bit float.
    F32(f32),
    /// A 64-bit float.
    F64(f64),
    /// A 128-bit vector.
    V128(u128),
}

impl StackValue {
    /// Returns the slot's raw 64-bit representation. Vectors keep their low
    /// 64 bits; narrower values are zero-extended.
    pub fn raw_bits(&self) -> u64 {
        match *self {
            StackValue::I32(v) => u64::from(v as u32),
            StackValue::I64(v) => v as u64,
            StackValue::F32(v) => u64::from(v.to_bits()),
            StackValue::F64(v) => v.to_bits(),
            StackValue::V128(v) => v as u64,
        }
    }

    /// Returns the bits actually written to the dump: the low 32 bits of
    /// [`StackValue::raw_bits`]. The consuming debugger has no record type
    /// wider than `i32`.
    pub fn persisted_bits(&self) -> u32 {
        self.raw_bits() as u32
    }
}

/// The local and operand partitions of one frame within the value stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRanges {
    /// Slots holding the frame's locals.
    pub locals: Range<usize>,
    /// Slots holding the frame's operand stack.
    pub operands: Range<usize>,
}

/// Borrowed view of the call stack and value stack at the moment of a dump.
#[derive(Clone, Copy, Debug)]
pub struct StackSnapshot<'a> {
    /// All activation records, outermost first. Never empty: the entry
    /// frame is always present, even before any guest code runs.
    pub frames: &'a [StackFrame],
    /// The flat value stack shared by all frames. Each frame's locals and
    /// operands occupy a contiguous sub-range.
    pub values: &'a [StackValue],
}

impl StackSnapshot<'_> {
    /// Computes where frame `index`'s locals and operands live on the value
    /// stack.
    ///
    /// A frame's locals end at its `value_pos`, and its operands run from
    /// there to the start of the next frame's locals, or to the end of the
    /// stack for the innermost frame. The next frame's recorded boundary is
    /// used even when that frame is itself a skipped host frame.
    ///
    /// Panics if either range falls outside the value stack. By the time
    /// that happens the interpreter's own bookkeeping is already corrupt,
    /// and no dump is produced from it.
    pub fn frame_ranges(&self, index: usize) -> FrameRanges {
        let frame = &self.frames[index];
        let start = locals_start(frame, index);
        let operands_end = match self.frames.get(index + 1) {
            Some(next) => locals_start(next, index + 1),
            None => self.values.len(),
        };
        assert!(
            frame.value_pos <= self.values.len(),
            "frame {index}: locals end at slot {} but the value stack has {} slots",
            frame.value_pos,
            self.values.len(),
        );
        assert!(
            frame.value_pos <= operands_end && operands_end <= self.values.len(),
            "frame {index}: operand range [{}, {operands_end}) is outside the value stack of {} slots",
            frame.value_pos,
            self.values.len(),
        );
        FrameRanges {
            locals: start..frame.value_pos,
            operands: frame.value_pos..operands_end,
        }
    }
}

fn locals_start(frame: &StackFrame, index: usize) -> usize {
    assert!(
        frame.local_count <= frame.value_pos,
        "frame {index}: {} locals cannot end at value stack slot {}",
        frame.local_count,
        frame.value_pos,
    );
    frame.value_pos - frame.local_count
}

/// Borrowed view of the instance storage that accompanies the stack.
#[derive(Clone, Copy, Debug)]
pub struct StoreSnapshot<'a> {
    /// Types of the instance's linear memories. At least one must be
    /// present; only the first is captured.
    pub memories: &'a [MemoryType],
    /// Types of the instance's globals, in index order.
    pub globals: &'a [GlobalType],
}
