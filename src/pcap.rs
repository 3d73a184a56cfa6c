//! PCAP file format
//!
//! See <https://wiki.wireshark.org/Development/LibpcapFileFormat> for details.
//!
//! A file is a 24-byte global header ([`PcapHeader`]) followed by records
//! ([`LegacyPcapBlock`]), each made of a 16-byte header and the frame bytes.
//!
//! Files are produced with [`PcapWriter`], or in one call with [`write_pcap`].
//!
//! There are 2 main ways of reading a PCAP file back. The first method is to use
//! [`parse_pcap`] or [`LegacyPcapSlice`], which require the entire file to be
//! loaded in memory. The second method is the streaming [`LegacyPcapReader`],
//! which works over any `Read` implementation with a fixed-size buffer.

pub(crate) mod capture;
pub(crate) mod frame;
pub(crate) mod header;
pub(crate) mod reader;
pub(crate) mod time;
pub(crate) mod writer;

pub use capture::*;
pub use frame::*;
pub use header::*;
pub use reader::*;
pub use time::*;
pub use writer::*;
