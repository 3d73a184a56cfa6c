use crate::blocks::PcapBlockOwned;
use crate::error::PcapError;
use crate::linktype::Linktype;
use crate::pcap::{parse_pcap_frame, parse_pcap_frame_be, parse_pcap_header};
use crate::pcap::{LegacyPcapBlock, PcapHeader};
use nom::combinator::complete;
use nom::multi::many0;
use nom::{IResult, Needed};
use std::fmt;

type LegacyParseFn = fn(&[u8]) -> IResult<&[u8], LegacyPcapBlock, PcapError<&[u8]>>;

fn frame_parser(header: &PcapHeader) -> LegacyParseFn {
    if header.is_bigendian() {
        parse_pcap_frame_be
    } else {
        parse_pcap_frame
    }
}

/// Parsing iterator over legacy pcap data (requires data to be loaded into memory)
///
/// ```rust
/// use pcap_writer::*;
///
/// let mut buffer = Vec::new();
/// let mut writer = PcapWriter::new(&mut buffer, PcapHeader::default()).unwrap();
/// writer.write_frame(&[0u8; 0], Timestamp::default()).unwrap();
/// writer.close().unwrap();
///
/// let mut num_blocks = 0;
/// let slice = LegacyPcapSlice::from_slice(&buffer).expect("LegacyPcapSlice");
/// for block in slice {
///     block.expect("valid record");
///     num_blocks += 1;
/// }
/// assert_eq!(num_blocks, 1);
/// ```
pub struct LegacyPcapSlice<'a> {
    pub header: PcapHeader,
    // remaining (unparsed) data
    rem: &'a [u8],
    parse: LegacyParseFn,
}

impl<'a> LegacyPcapSlice<'a> {
    pub fn from_slice(i: &[u8]) -> Result<LegacyPcapSlice, nom::Err<PcapError<&[u8]>>> {
        let (rem, header) = parse_pcap_header(i)?;
        let parse = frame_parser(&header);
        Ok(LegacyPcapSlice { header, rem, parse })
    }
}

/// Iterator for LegacyPcapSlice. Returns a result so parsing errors are not
/// silently ignored
impl<'a> Iterator for LegacyPcapSlice<'a> {
    type Item = Result<PcapBlockOwned<'a>, nom::Err<PcapError<&'a [u8]>>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rem.is_empty() {
            return None;
        }
        let r = (self.parse)(self.rem).map(|(rem, b)| {
            self.rem = rem;
            PcapBlockOwned::from(b)
        });
        if r.is_err() {
            // stop after the first error
            self.rem = &[];
        }
        Some(r)
    }
}

/// A complete pcap file, loaded into memory
pub struct PcapCapture<'a> {
    pub header: PcapHeader,

    pub blocks: Vec<LegacyPcapBlock<'a>>,
}

impl<'a> PcapCapture<'a> {
    pub fn from_file(i: &[u8]) -> Result<PcapCapture, PcapError<&[u8]>> {
        match parse_pcap(i) {
            Ok((_, pcap)) => Ok(pcap),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
            Err(nom::Err::Incomplete(Needed::Size(n))) => Err(PcapError::Incomplete(n.into())),
            Err(nom::Err::Incomplete(Needed::Unknown)) => Err(PcapError::Incomplete(0)),
        }
    }

    pub fn datalink(&self) -> Linktype {
        self.header.network
    }

    pub fn snaplen(&self) -> u32 {
        self.header.snaplen
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LegacyPcapBlock<'a>> {
        self.blocks.iter()
    }
}

impl<'a> fmt::Debug for PcapCapture<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(
            f,
            "PcapCapture: {} ({} records)",
            self.header.network,
            self.blocks.len()
        )
    }
}

/// Parse the entire file
///
/// Note: this requires the file to be fully loaded to memory. Trailing bytes that
/// do not form a complete record are left in the remaining input.
pub fn parse_pcap(i: &[u8]) -> IResult<&[u8], PcapCapture, PcapError<&[u8]>> {
    let (i, header) = parse_pcap_header(i)?;
    let (i, blocks) = many0(complete(frame_parser(&header)))(i)?;
    Ok((i, PcapCapture { header, blocks }))
}
