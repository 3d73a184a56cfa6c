use cookie_factory::gen;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, trace};

use crate::error::{ArgumentError, WriteError};
use crate::linktype::Linktype;
use crate::pcap::{Endianness, LegacyPcapBlock, PcapHeader, Timestamp, TsResolution};
use crate::serialize::{pcap_header, pcap_record};

/// Sequential writer of legacy pcap files
///
/// The global header is written when the writer is created. Each call to
/// [`write_frame`](PcapWriter::write_frame) then appends one record: a 16-byte
/// header followed by the frame bytes, without padding. The byte order and the
/// timestamp resolution are taken from the header and never change for the
/// lifetime of the writer.
///
/// Records are validated before any of their bytes reach the underlying writer,
/// so a rejected frame never appears in the output. The writer owns its output;
/// dropping it (including on an error path) releases the file. Use
/// [`close`](PcapWriter::close) to observe flush errors.
///
/// ```rust
/// use pcap_writer::*;
///
/// let mut out = Vec::new();
/// let header = PcapHeader::with_linktype(Linktype::ETHERNET, 65535, TsResolution::Microsecond);
/// let mut writer = PcapWriter::new(&mut out, header).unwrap();
/// writer.write_frame(&[0xff; 14], Timestamp::new(1, 0)).unwrap();
/// writer.close().unwrap();
/// assert_eq!(out.len(), 24 + 16 + 14);
/// ```
pub struct PcapWriter<W>
where
    W: Write,
{
    writer: W,
    header: PcapHeader,
    endianness: Endianness,
    resolution: TsResolution,
    frames_written: u64,
    bytes_written: u64,
}

impl PcapWriter<BufWriter<File>> {
    /// Create the file at `path` and write a little-endian, microsecond-resolution header
    pub fn open<P: AsRef<Path>>(
        path: P,
        linktype: Linktype,
        snaplen: u32,
    ) -> Result<Self, WriteError> {
        let header = PcapHeader::with_linktype(linktype, snaplen, TsResolution::Microsecond);
        Self::open_with_header(path, header)
    }

    /// Create the file at `path` and write the given header
    pub fn open_with_header<P: AsRef<Path>>(
        path: P,
        header: PcapHeader,
    ) -> Result<Self, WriteError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!(
            path = %path.display(),
            linktype = %header.network,
            snaplen = header.snaplen,
            "creating pcap file"
        );
        PcapWriter::new(BufWriter::new(file), header)
    }
}

impl<W> PcapWriter<W>
where
    W: Write,
{
    /// Wrap `writer` and write the global header to it
    ///
    /// Fails with `InvalidArgument`, writing nothing, if the header magic number is
    /// not a pcap magic.
    pub fn new(mut writer: W, header: PcapHeader) -> Result<Self, WriteError> {
        if !header.has_known_magic() {
            return Err(ArgumentError::UnknownMagic(header.magic_number).into());
        }
        let (_, len) = gen(pcap_header(&header), &mut writer)?;
        let endianness = header.endianness();
        let resolution = header.resolution();
        Ok(PcapWriter {
            writer,
            header,
            endianness,
            resolution,
            frames_written: 0,
            bytes_written: len,
        })
    }

    /// Append one frame, saved entirely (`caplen == origlen == data.len()`)
    ///
    /// Fails with `InvalidArgument` if the frame is larger than the snapshot length,
    /// or if the fractional part of `ts` is not below one second.
    pub fn write_frame(&mut self, data: &[u8], ts: Timestamp) -> Result<(), WriteError> {
        let snaplen = self.header.snaplen;
        if data.len() as u64 > u64::from(snaplen) {
            return Err(ArgumentError::CaplenExceedsSnaplen {
                caplen: data.len(),
                snaplen,
            }
            .into());
        }
        let block = LegacyPcapBlock::new(data, ts)?;
        self.write_block(&block)
    }

    /// Append a caller-built record
    ///
    /// The record must satisfy `caplen == data.len()` and `caplen <= origlen <= snaplen`.
    pub fn write_block(&mut self, block: &LegacyPcapBlock) -> Result<(), WriteError> {
        block.check(self.header.snaplen, self.resolution)?;
        let (_, len) = gen(pcap_record(block, self.endianness), &mut self.writer)?;
        self.frames_written += 1;
        self.bytes_written += len;
        trace!(
            frame = self.frames_written,
            caplen = block.caplen,
            origlen = block.origlen,
            "wrote pcap record"
        );
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), WriteError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush pending data and return the underlying writer
    pub fn close(mut self) -> Result<W, WriteError> {
        self.flush()?;
        debug!(
            frames = self.frames_written,
            bytes = self.bytes_written,
            "closed pcap writer"
        );
        Ok(self.writer)
    }

    pub fn header(&self) -> &PcapHeader {
        &self.header
    }

    /// Number of records written so far
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Number of bytes written so far, global header included
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// Write a complete pcap file at `path`, one record per frame
///
/// Returns the number of records written. The file is closed on every path; if a
/// frame is rejected, the records before it are left in the file.
pub fn write_pcap<P, I, D>(path: P, header: PcapHeader, frames: I) -> Result<u64, WriteError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = (D, Timestamp)>,
    D: AsRef<[u8]>,
{
    let mut writer = PcapWriter::open_with_header(path, header)?;
    for (data, ts) in frames {
        writer.write_frame(data.as_ref(), ts)?;
    }
    let count = writer.frames_written();
    writer.close()?;
    Ok(count)
}
