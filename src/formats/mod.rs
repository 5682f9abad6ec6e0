//! Binary codecs for HDR ingestion
//!
//! The Radiance RGBE decoder and the binary16 texel codec.

pub mod half;
pub mod hdr;

pub use half::{from_half, from_half_bulk, to_half, to_half_bulk};
pub use hdr::{parse_hdr, ParsedHdr};
