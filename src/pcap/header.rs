use nom::number::streaming::{be_i32, be_u16, be_u32, le_i32, le_u16, le_u32};
use nom::IResult;

use crate::linktype::Linktype;
use crate::PcapError;

/// Magic number of microsecond-resolution files, in file byte order
pub const PCAP_MAGIC_USEC: u32 = 0xa1b2_c3d4;
/// Magic number of nanosecond-resolution files, in file byte order
pub const PCAP_MAGIC_NSEC: u32 = 0xa1b2_3c4d;

/// Size of the global header, in bytes
pub const PCAP_HEADER_LEN: usize = 24;

/// Snapshot length of a default header, large enough for any Ethernet frame
pub const DEFAULT_SNAPLEN: u32 = 65535;

/// Resolution of the fractional part of record timestamps
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TsResolution {
    Microsecond,
    Nanosecond,
}

impl TsResolution {
    /// Number of fractional units per second
    pub const fn units_per_sec(self) -> u32 {
        match self {
            TsResolution::Microsecond => 1_000_000,
            TsResolution::Nanosecond => 1_000_000_000,
        }
    }

    pub const fn magic(self) -> u32 {
        match self {
            TsResolution::Microsecond => PCAP_MAGIC_USEC,
            TsResolution::Nanosecond => PCAP_MAGIC_NSEC,
        }
    }
}

impl Default for TsResolution {
    fn default() -> Self {
        TsResolution::Microsecond
    }
}

/// Byte order of all multi-byte fields of a file
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endianness {
    Little,
    Big,
}

impl Default for Endianness {
    fn default() -> Self {
        Endianness::Little
    }
}

/// PCAP global header
#[derive(Clone, Debug, PartialEq)]
pub struct PcapHeader {
    /// File format and byte ordering. If equal to `0xa1b2c3d4` or `0xa1b23c4d` then the rest of
    /// the file uses native byte ordering. If `0xd4c3b2a1` or `0x4d3cb2a1` (swapped), then all
    /// following fields will have to be swapped too.
    pub magic_number: u32,
    /// Version major number (currently 2)
    pub version_major: u16,
    /// Version minor number (currently 4)
    pub version_minor: u16,
    /// The correction time in seconds between GMT (UTC) and the local timezone of the following packet header timestamps
    pub thiszone: i32,
    /// In theory, the accuracy of time stamps in the capture; in practice, all tools set it to 0
    pub sigfigs: u32,
    /// max len of captured packets, in octets
    pub snaplen: u32,
    /// Data link type
    pub network: Linktype,
}

impl PcapHeader {
    pub fn new() -> PcapHeader {
        PcapHeader {
            magic_number: PCAP_MAGIC_USEC, // native order
            version_major: 2,
            version_minor: 4,
            thiszone: 0,
            sigfigs: 0,
            snaplen: DEFAULT_SNAPLEN,
            network: Linktype::ETHERNET,
        }
    }

    /// Build a version 2.4 header for the given link type and snapshot length
    ///
    /// The magic number is always stored in native form; the byte order is chosen
    /// separately with [`PcapHeader::with_endianness`].
    pub fn with_linktype(network: Linktype, snaplen: u32, resolution: TsResolution) -> PcapHeader {
        PcapHeader {
            magic_number: resolution.magic(),
            snaplen,
            network,
            ..PcapHeader::new()
        }
    }

    /// Return a copy of this header, serialized in the given byte order
    pub fn with_endianness(mut self, endianness: Endianness) -> PcapHeader {
        if self.is_bigendian() != (endianness == Endianness::Big) {
            self.magic_number = self.magic_number.swap_bytes();
        }
        self
    }

    pub const fn size(&self) -> usize {
        PCAP_HEADER_LEN
    }

    pub fn is_bigendian(&self) -> bool {
        (self.magic_number & 0xFFFF) == 0xb2a1 // works for both nanosecond and microsecond resolution timestamps
    }

    pub fn endianness(&self) -> Endianness {
        if self.is_bigendian() {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    pub fn is_nanosecond_precision(&self) -> bool {
        self.magic_number == 0xa1b2_3c4d || self.magic_number == 0x4d3c_b2a1
    }

    pub fn resolution(&self) -> TsResolution {
        if self.is_nanosecond_precision() {
            TsResolution::Nanosecond
        } else {
            TsResolution::Microsecond
        }
    }

    /// True if the magic number is one of the four pcap values (µs or ns, either byte order)
    pub fn has_known_magic(&self) -> bool {
        matches!(
            self.magic_number,
            PCAP_MAGIC_USEC | PCAP_MAGIC_NSEC | 0xd4c3_b2a1 | 0x4d3c_b2a1
        )
    }

    /// Magic number as it must be written, in the file byte order
    pub fn native_magic(&self) -> u32 {
        self.resolution().magic()
    }
}

impl Default for PcapHeader {
    fn default() -> Self {
        PcapHeader::new()
    }
}

/// Read the PCAP global header
///
/// The global header contains the PCAP description and options
pub fn parse_pcap_header(i: &[u8]) -> IResult<&[u8], PcapHeader, PcapError<&[u8]>> {
    let (i, magic_number) = le_u32(i)?;
    match magic_number {
        0xa1b2_c3d4 | 0xa1b2_3c4d => {
            let (i, version_major) = le_u16(i)?;
            let (i, version_minor) = le_u16(i)?;
            let (i, thiszone) = le_i32(i)?;
            let (i, sigfigs) = le_u32(i)?;
            let (i, snaplen) = le_u32(i)?;
            let (i, network) = le_i32(i)?;
            let header = PcapHeader {
                magic_number,
                version_major,
                version_minor,
                thiszone,
                sigfigs,
                snaplen,
                network: Linktype(network),
            };
            Ok((i, header))
        }
        0xd4c3_b2a1 | 0x4d3c_b2a1 => {
            let (i, version_major) = be_u16(i)?;
            let (i, version_minor) = be_u16(i)?;
            let (i, thiszone) = be_i32(i)?;
            let (i, sigfigs) = be_u32(i)?;
            let (i, snaplen) = be_u32(i)?;
            let (i, network) = be_i32(i)?;
            let header = PcapHeader {
                magic_number,
                version_major,
                version_minor,
                thiszone,
                sigfigs,
                snaplen,
                network: Linktype(network),
            };
            Ok((i, header))
        }
        _ => Err(nom::Err::Error(PcapError::HeaderNotRecognized)),
    }
}
