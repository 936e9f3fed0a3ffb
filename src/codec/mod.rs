//! Serialization codecs (spec §4.5/§6): binary WKB/HexWKB and the MF-JSON
//! text writer. Both are pure, reentrant functions over the data model — no
//! state is kept between calls (spec §5 "Reentrancy").

pub mod mfjson;
pub mod wkb;

pub use wkb::{ByteOrder, WkbEnvelope};
