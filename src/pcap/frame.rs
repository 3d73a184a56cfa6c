use nom::bytes::streaming::take;
use nom::IResult;
use std::convert::TryFrom;

use crate::error::ArgumentError;
use crate::pcap::{Timestamp, TsResolution};
use crate::PcapError;

/// Size of a record header, in bytes
pub const PCAP_RECORD_HEADER_LEN: usize = 16;

/// Container for network data in legacy Pcap files
#[derive(Clone, Debug, PartialEq)]
pub struct LegacyPcapBlock<'a> {
    pub ts_sec: u32,
    /// Fractional part of the timestamp (microseconds, or nanoseconds if the file
    /// header says so)
    pub ts_usec: u32,
    pub caplen: u32,
    pub origlen: u32,
    pub data: &'a [u8],
}

impl<'a> LegacyPcapBlock<'a> {
    /// Build a record holding the whole frame (`caplen == origlen == data.len()`)
    pub fn new(data: &'a [u8], ts: Timestamp) -> Result<LegacyPcapBlock<'a>, ArgumentError> {
        let caplen = u32::try_from(data.len())
            .map_err(|_| ArgumentError::LengthOverflow(data.len() as u64))?;
        Ok(LegacyPcapBlock {
            ts_sec: ts.secs,
            ts_usec: ts.frac,
            caplen,
            origlen: caplen,
            data,
        })
    }

    pub fn ts(&self) -> Timestamp {
        Timestamp::new(self.ts_sec, self.ts_usec)
    }

    /// Total size of the record in a file (header and data)
    pub fn size(&self) -> usize {
        PCAP_RECORD_HEADER_LEN + self.data.len()
    }

    /// Check the record against the snapshot length and timestamp resolution of a file
    pub fn check(&self, snaplen: u32, resolution: TsResolution) -> Result<(), ArgumentError> {
        if self.data.len() as u64 != u64::from(self.caplen) {
            return Err(ArgumentError::CaplenMismatch {
                caplen: self.caplen,
                data_len: self.data.len(),
            });
        }
        if self.caplen > snaplen {
            return Err(ArgumentError::CaplenExceedsSnaplen {
                caplen: self.data.len(),
                snaplen,
            });
        }
        if self.caplen > self.origlen {
            return Err(ArgumentError::CaplenExceedsOriglen {
                caplen: self.caplen,
                origlen: self.origlen,
            });
        }
        if self.origlen > snaplen {
            return Err(ArgumentError::OriglenExceedsSnaplen {
                origlen: self.origlen,
                snaplen,
            });
        }
        self.ts().check(resolution)
    }
}

/// Read a PCAP record header and data
///
/// Each PCAP record starts with a small header, and is followed by packet data.
/// The packet data format depends on the LinkType.
pub fn parse_pcap_frame(i: &[u8]) -> IResult<&[u8], LegacyPcapBlock, PcapError<&[u8]>> {
    parse_frame_with(i, u32::from_le_bytes)
}

/// Read a PCAP record header and data (big-endian)
///
/// Each PCAP record starts with a small header, and is followed by packet data.
/// The packet data format depends on the LinkType.
pub fn parse_pcap_frame_be(i: &[u8]) -> IResult<&[u8], LegacyPcapBlock, PcapError<&[u8]>> {
    parse_frame_with(i, u32::from_be_bytes)
}

#[inline]
fn parse_frame_with(
    i: &[u8],
    read_u32: fn([u8; 4]) -> u32,
) -> IResult<&[u8], LegacyPcapBlock, PcapError<&[u8]>> {
    if i.len() < PCAP_RECORD_HEADER_LEN {
        return Err(nom::Err::Incomplete(nom::Needed::new(
            PCAP_RECORD_HEADER_LEN - i.len(),
        )));
    }
    let field = |offset: usize| {
        read_u32([i[offset], i[offset + 1], i[offset + 2], i[offset + 3]])
    };
    let ts_sec = field(0);
    let ts_usec = field(4);
    let caplen = field(8);
    let origlen = field(12);
    let (i, data) = take(caplen as usize)(&i[PCAP_RECORD_HEADER_LEN..])?;
    let block = LegacyPcapBlock {
        ts_sec,
        ts_usec,
        caplen,
        origlen,
        data,
    };
    Ok((i, block))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use hex_literal::hex;

    // tls12-23.pcap frame 0
    pub(crate) const FRAME_PCAP: &[u8] = &hex!(
        "
34 4E 5B 5A E1 96 08 00 4A 00 00 00 4A 00 00 00
72 4D 4A D1 13 0D 4E 9C AE DE CB 73 08 00 45 00
00 3C DF 08 40 00 40 06 47 9F 0A 09 00 01 0A 09
00 02 D1 F4 11 51 34 1B 5B 17 00 00 00 00 A0 02
72 10 14 43 00 00 02 04 05 B4 04 02 08 0A E4 DB
6B 7B 00 00 00 00 01 03 03 07"
    );

    #[test]
    fn test_parse_pcap_frame() {
        let (rem, pkt) = parse_pcap_frame(FRAME_PCAP).expect("packet parsing failed");
        assert!(rem.is_empty());
        assert_eq!(pkt.origlen, 74);
        assert_eq!(pkt.caplen, 74);
        assert_eq!(pkt.ts_usec, 562_913);
        assert_eq!(pkt.ts_sec, 1_515_933_236);
        assert_eq!(pkt.data.len(), 74);
        assert_eq!(pkt.size(), FRAME_PCAP.len());
    }

    #[test]
    fn test_parse_pcap_frame_incomplete() {
        let res = parse_pcap_frame(&FRAME_PCAP[..10]);
        assert!(matches!(res, Err(nom::Err::Incomplete(_))));
        // header present, data truncated
        let res = parse_pcap_frame(&FRAME_PCAP[..40]);
        assert!(matches!(res, Err(nom::Err::Incomplete(_))));
    }

    #[test]
    fn test_parse_pcap_frame_be() {
        let data = hex!("00 00 00 01 00 00 00 02 00 00 00 03 00 00 00 04 AA BB CC");
        let (rem, pkt) = parse_pcap_frame_be(&data).expect("packet parsing failed");
        assert!(rem.is_empty());
        assert_eq!(pkt.ts(), Timestamp::new(1, 2));
        assert_eq!(pkt.caplen, 3);
        assert_eq!(pkt.origlen, 4);
        assert_eq!(pkt.data, &[0xaau8, 0xbb, 0xcc]);
    }

    #[test]
    fn test_block_check() {
        let data = [0u8; 14];
        let mut block = LegacyPcapBlock::new(&data, Timestamp::default()).unwrap();
        assert!(block.check(65535, TsResolution::Microsecond).is_ok());
        assert_eq!(
            block.check(10, TsResolution::Microsecond),
            Err(ArgumentError::CaplenExceedsSnaplen {
                caplen: 14,
                snaplen: 10
            })
        );
        block.origlen = 13;
        assert_eq!(
            block.check(65535, TsResolution::Microsecond),
            Err(ArgumentError::CaplenExceedsOriglen {
                caplen: 14,
                origlen: 13
            })
        );
        block.origlen = 14;
        block.caplen = 15;
        assert!(matches!(
            block.check(65535, TsResolution::Microsecond),
            Err(ArgumentError::CaplenMismatch { .. })
        ));
    }
}
