// Patch stream encoding.
//
// - `format`: record framing, byte order, record reader
// - `sink`: output sink trait and adapters
// - `encoder`: the delta encoder

pub mod encoder;
pub mod format;
pub mod sink;

pub use encoder::{EncodeError, EncodeOptions, EncodeStats, encode, encode_with_options, try_encode};
pub use format::{ByteOrder, FormatError, PatchRecords, Record};
pub use sink::{PatchSink, WriteSink};
