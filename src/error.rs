use nom::error::{ErrorKind, ParseError};
use std::fmt;
use std::io;

/// The error type which is returned when reading a pcap file
#[derive(Debug, PartialEq)]
pub enum PcapError<I: Sized> {
    /// No more data available
    Eof,
    /// Buffer capacity is too small, and some full frame cannot be stored
    BufferTooSmall,
    /// Expected more data but got EOF
    UnexpectedEof,
    /// An error happened during a `read()` operation
    ReadError,
    /// Last block is incomplete, and no more data available
    Incomplete(usize),

    /// File could not be recognized as Pcap
    HeaderNotRecognized,

    /// An error encountered during parsing
    NomError(I, ErrorKind),
    /// An error encountered during parsing (owned version)
    OwnedNomError(Vec<u8>, ErrorKind),
}

impl<I> PcapError<I> {
    /// Creates a `PcapError` from input and error kind.
    pub fn from_data(input: I, errorkind: ErrorKind) -> Self {
        Self::NomError(input, errorkind)
    }
}

impl<I> PcapError<I>
where
    I: AsRef<[u8]> + Sized,
{
    /// Creates an owned `PcapError` object from borrowed data, cloning object.
    /// Owned object has `'static` lifetime.
    pub fn to_owned_vec(&self) -> PcapError<&'static [u8]> {
        match self {
            PcapError::Eof => PcapError::Eof,
            PcapError::BufferTooSmall => PcapError::BufferTooSmall,
            PcapError::UnexpectedEof => PcapError::UnexpectedEof,
            PcapError::ReadError => PcapError::ReadError,
            PcapError::Incomplete(n) => PcapError::Incomplete(*n),
            PcapError::HeaderNotRecognized => PcapError::HeaderNotRecognized,
            PcapError::NomError(i, e) => PcapError::OwnedNomError(i.as_ref().to_vec(), *e),
            PcapError::OwnedNomError(v, e) => PcapError::OwnedNomError(v.clone(), *e),
        }
    }
}

impl<I> ParseError<I> for PcapError<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        PcapError::NomError(input, kind)
    }
    fn append(input: I, kind: ErrorKind, _other: Self) -> Self {
        PcapError::NomError(input, kind)
    }
}

impl<I> fmt::Display for PcapError<I>
where
    I: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcapError::Eof => write!(f, "End of file"),
            PcapError::BufferTooSmall => write!(f, "Buffer is too small"),
            PcapError::UnexpectedEof => write!(f, "Unexpected end of file"),
            PcapError::ReadError => write!(f, "Read error"),
            PcapError::Incomplete(n) => write!(f, "Incomplete read: {}", n),
            PcapError::HeaderNotRecognized => write!(f, "Header not recognized as PCAP"),
            PcapError::NomError(i, e) => write!(f, "Internal parser error {:?}, input {:?}", e, i),
            PcapError::OwnedNomError(i, e) => {
                write!(f, "Internal parser error {:?}, input {:?}", e, &i)
            }
        }
    }
}

impl<I> std::error::Error for PcapError<I> where I: fmt::Debug {}

/// A constraint violated by a record handed to the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentError {
    /// The frame is larger than the snapshot length of the file
    CaplenExceedsSnaplen { caplen: usize, snaplen: u32 },
    /// The original length is larger than the snapshot length of the file
    OriglenExceedsSnaplen { origlen: u32, snaplen: u32 },
    /// More bytes were saved than the frame had on the wire
    CaplenExceedsOriglen { caplen: u32, origlen: u32 },
    /// The declared `caplen` does not match the number of data bytes
    CaplenMismatch { caplen: u32, data_len: usize },
    /// A length or timestamp does not fit in 32 bits
    LengthOverflow(u64),
    /// The fractional part of a timestamp is not below one second
    TimestampOutOfRange { frac: u32, units_per_sec: u32 },
    /// The header magic number is not a pcap magic, in either byte order
    UnknownMagic(u32),
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::CaplenExceedsSnaplen { caplen, snaplen } => {
                write!(f, "frame length {} exceeds snaplen {}", caplen, snaplen)
            }
            ArgumentError::OriglenExceedsSnaplen { origlen, snaplen } => {
                write!(f, "original length {} exceeds snaplen {}", origlen, snaplen)
            }
            ArgumentError::CaplenExceedsOriglen { caplen, origlen } => write!(
                f,
                "captured length {} exceeds original length {}",
                caplen, origlen
            ),
            ArgumentError::CaplenMismatch { caplen, data_len } => write!(
                f,
                "captured length {} does not match data length {}",
                caplen, data_len
            ),
            ArgumentError::LengthOverflow(v) => write!(f, "value {} > {}", v, u32::MAX),
            ArgumentError::TimestampOutOfRange {
                frac,
                units_per_sec,
            } => write!(
                f,
                "timestamp fraction {} out of range (< {})",
                frac, units_per_sec
            ),
            ArgumentError::UnknownMagic(m) => write!(f, "unknown pcap magic number {:#010x}", m),
        }
    }
}

/// The error type which is returned when writing a pcap file
#[derive(Debug)]
pub enum WriteError {
    /// The underlying writer failed (path not creatable, disk full, ...)
    Io(io::Error),
    /// A record was rejected before any of its bytes were written
    InvalidArgument(ArgumentError),
}

impl WriteError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, WriteError::InvalidArgument(_))
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Io(e) => write!(f, "I/O error: {}", e),
            WriteError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriteError::Io(e) => Some(e),
            WriteError::InvalidArgument(_) => None,
        }
    }
}

impl From<io::Error> for WriteError {
    fn from(e: io::Error) -> Self {
        WriteError::Io(e)
    }
}

impl From<ArgumentError> for WriteError {
    fn from(e: ArgumentError) -> Self {
        WriteError::InvalidArgument(e)
    }
}

impl From<cookie_factory::GenError> for WriteError {
    fn from(e: cookie_factory::GenError) -> Self {
        match e {
            cookie_factory::GenError::IoError(e) => WriteError::Io(e),
            e => WriteError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("serialization failed: {:?}", e),
            )),
        }
    }
}
