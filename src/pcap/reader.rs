use crate::blocks::PcapBlockOwned;
use crate::error::PcapError;
use crate::pcap::{parse_pcap_frame, parse_pcap_frame_be, parse_pcap_header};
use crate::pcap::{LegacyPcapBlock, PcapHeader};
use circular::Buffer;
use nom::{IResult, Needed, Offset};
use std::io::Read;

/// Parsing iterator over legacy pcap data (streaming version)
///
/// This reader is a streaming parser based on a circular buffer, which means memory
/// usage is constant, and that it can be used to check files of any size.
/// It creates an abstraction over any input providing the `Read` trait, and takes care
/// of managing the circular buffer to provide an iterator-like interface.
///
/// The first call to `next` will return the file header. Following calls to `next` will
/// always return records.
///
/// The size of the circular buffer has to be big enough for at least one complete record.
/// Blocks returned by `next` borrow the buffer, and must be dropped before calling
/// `consume` or `refill`.
///
/// ## Example
///
/// ```rust
/// use pcap_writer::*;
///
/// let mut file = Vec::new();
/// let mut writer = PcapWriter::new(&mut file, PcapHeader::default()).unwrap();
/// writer.write_frame(b"frame", Timestamp::default()).unwrap();
/// writer.close().unwrap();
///
/// let mut num_blocks = 0;
/// let mut reader = LegacyPcapReader::new(65536, &file[..]).expect("LegacyPcapReader");
/// loop {
///     match reader.next() {
///         Ok((offset, block)) => {
///             num_blocks += 1;
///             match block {
///                 PcapBlockOwned::LegacyHeader(_hdr) => (),
///                 PcapBlockOwned::Legacy(b) => assert_eq!(b.data, b"frame"),
///             }
///             reader.consume(offset);
///         }
///         Err(PcapError::Eof) => break,
///         Err(PcapError::Incomplete(_)) => {
///             reader.refill().unwrap();
///         }
///         Err(e) => panic!("error while reading: {:?}", e),
///     }
/// }
/// assert_eq!(num_blocks, 2);
/// ```
pub struct LegacyPcapReader<R>
where
    R: Read,
{
    header: PcapHeader,
    reader: R,
    buffer: Buffer,
    consumed: usize,
    header_sent: bool,
    reader_exhausted: bool,
    parse: LegacyParseFn,
}

type LegacyParseFn = fn(&[u8]) -> IResult<&[u8], LegacyPcapBlock, PcapError<&[u8]>>;

impl<R> LegacyPcapReader<R>
where
    R: Read,
{
    /// Creates a new `LegacyPcapReader<R>` with the provided buffer capacity.
    pub fn new(
        capacity: usize,
        reader: R,
    ) -> Result<LegacyPcapReader<R>, PcapError<&'static [u8]>> {
        let buffer = Buffer::with_capacity(capacity);
        Self::from_buffer(buffer, reader)
    }

    /// Creates a new `LegacyPcapReader<R>` using the provided `Buffer`.
    pub fn from_buffer(
        mut buffer: Buffer,
        mut reader: R,
    ) -> Result<LegacyPcapReader<R>, PcapError<&'static [u8]>> {
        let sz = reader.read(buffer.space()).or(Err(PcapError::ReadError))?;
        buffer.fill(sz);
        if sz == 0 {
            return Err(PcapError::Eof);
        }
        let (_rem, header) = match parse_pcap_header(buffer.data()) {
            Ok((r, h)) => Ok((r, h)),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e.to_owned_vec()),
            Err(nom::Err::Incomplete(Needed::Size(n))) => Err(PcapError::Incomplete(n.into())),
            Err(nom::Err::Incomplete(Needed::Unknown)) => Err(PcapError::Incomplete(0)),
        }?;
        let parse = if header.is_bigendian() {
            parse_pcap_frame_be
        } else {
            parse_pcap_frame
        };
        // do not consume
        Ok(LegacyPcapReader {
            header,
            reader,
            buffer,
            consumed: 0,
            header_sent: false,
            reader_exhausted: false,
            parse,
        })
    }

    pub fn header(&self) -> &PcapHeader {
        &self.header
    }

    /// Get the next block, if possible. Returns the number of bytes read and the block.
    pub fn next(&mut self) -> Result<(usize, PcapBlockOwned), PcapError<&'_ [u8]>> {
        if !self.header_sent {
            self.header_sent = true;
            return Ok((
                self.header.size(),
                PcapBlockOwned::from(self.header.clone()),
            ));
        }
        // Return EOF if
        // 1) all bytes have been read
        // 2) no more data is available
        if self.buffer.available_data() == 0
            && (self.buffer.position() == 0 && self.reader_exhausted)
        {
            return Err(PcapError::Eof);
        }
        let data = self.buffer.data();
        match (self.parse)(data) {
            Ok((rem, b)) => {
                let offset = data.offset(rem);
                Ok((offset, PcapBlockOwned::from(b)))
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
            Err(nom::Err::Incomplete(n)) => {
                if self.reader_exhausted {
                    // expected more bytes but reader is EOF, truncated pcap?
                    Err(PcapError::UnexpectedEof)
                } else {
                    match n {
                        Needed::Size(n) => {
                            if self.buffer.available_data() + usize::from(n)
                                >= self.buffer.capacity()
                            {
                                Err(PcapError::BufferTooSmall)
                            } else {
                                Err(PcapError::Incomplete(n.into()))
                            }
                        }
                        Needed::Unknown => Err(PcapError::Incomplete(0)),
                    }
                }
            }
        }
    }

    /// Consume data, and shift buffer if needed.
    pub fn consume(&mut self, offset: usize) {
        self.consumed += offset;
        self.buffer.consume(offset);
    }

    /// Total number of bytes consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Refill the internal buffer, shifting it if necessary.
    pub fn refill(&mut self) -> Result<(), PcapError<&[u8]>> {
        self.buffer.shift();
        let space = self.buffer.space();
        // check if available space is empty, so we can distinguish
        // a read() returning 0 because of EOF or because we requested 0
        if space.is_empty() {
            return Ok(());
        }
        let sz = self.reader.read(space).or(Err(PcapError::ReadError))?;
        self.reader_exhausted = sz == 0;
        self.buffer.fill(sz);
        Ok(())
    }

    pub fn reader_exhausted(&self) -> bool {
        self.reader_exhausted
    }
}
