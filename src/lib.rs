//! # PCAP writer
//!
//! This crate writes files in the legacy PCAP format (not PCAP-NG), and reads them back.
//!
//! A file is a global header, written once, followed by one record per frame. Frames
//! are opaque byte buffers: the writer never looks at their content, and accepts any
//! link-layer type code. The byte order and timestamp resolution (microseconds or
//! nanoseconds) are chosen once, in the header, and hold for the whole file.
//!
//! # Example: writing a file
//!
//! ```rust
//! use pcap_writer::*;
//!
//! # let dir = tempfile::tempdir().unwrap();
//! # let path = dir.path().join("example.pcap");
//! let mut writer = PcapWriter::open(&path, Linktype::ETHERNET, 65535).expect("open");
//! // a bare Ethernet header
//! let frame = [0xffu8; 14];
//! writer.write_frame(&frame, Timestamp::new(1_600_000_000, 0)).expect("write_frame");
//! writer.close().expect("close");
//!
//! assert_eq!(std::fs::metadata(&path).unwrap().len(), 24 + 16 + 14);
//! ```
//!
//! Frames larger than the snapshot length are rejected with
//! [`WriteError::InvalidArgument`] before anything is written.
//!
//! # Example: reading a file back
//!
//! ```rust
//! use pcap_writer::*;
//!
//! let mut buffer = Vec::new();
//! let mut writer = PcapWriter::new(&mut buffer, PcapHeader::default()).unwrap();
//! writer.write_frame(b"frame", Timestamp::default()).unwrap();
//! writer.close().unwrap();
//!
//! let capture = PcapCapture::from_file(&buffer).expect("valid pcap");
//! assert_eq!(capture.blocks.len(), 1);
//! assert_eq!(capture.blocks[0].data, b"frame");
//! ```
//!
//! See [`LegacyPcapReader`] for a streaming reader.
//!
//! # Fixtures
//!
//! The [`fixtures`] module generates the capture files used as test inputs by
//! packet readers; the `pcap-fixtures` binary is its command-line front end.

mod blocks;
mod error;
mod linktype;
pub use blocks::*;
pub use error::*;
pub use linktype::*;

pub mod pcap;
pub use pcap::*;

pub mod serialize;

pub mod fixtures;
