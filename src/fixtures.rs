//! Capture fixtures
//!
//! Two pcap files used as test inputs by packet readers:
//!
//! - [`READ_WRITE_FIXTURE`]: Ethernet frames covering every combination of
//!   IPv4/IPv6, UDP/TCP, with and without payload
//! - [`UNHANDLED_FIXTURE`]: a single USBPcap record, to exercise a link type
//!   that readers do not interpret
//!
//! Output is deterministic: frame contents have fixed field values, and frame
//! `i` of a file is timestamped `base + i` fractional units.

pub mod frames;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::WriteError;
use crate::linktype::Linktype;
use crate::pcap::{Endianness, PcapHeader, PcapWriter, Timestamp, TsResolution};
use cookie_factory::GenError;
use frames::{FrameSpec, NetworkLayer, TransportLayer, UsbPcapHeader};

pub const READ_WRITE_FIXTURE: &str = "test_pcap_read_write.pcap";
pub const UNHANDLED_FIXTURE: &str = "test_pcap_unhandled_read_write.pcap";

const DATA: &[u8] = b"data";

/// Frames of [`READ_WRITE_FIXTURE`], in file order
pub const READ_WRITE_FRAMES: [FrameSpec<'static>; 14] = [
    FrameSpec::new(NetworkLayer::None, b""),
    FrameSpec::new(NetworkLayer::None, DATA),
    FrameSpec::new(NetworkLayer::Ipv4(TransportLayer::None), b""),
    FrameSpec::new(NetworkLayer::Ipv4(TransportLayer::None), DATA),
    FrameSpec::new(NetworkLayer::Ipv6(TransportLayer::None), b""),
    FrameSpec::new(NetworkLayer::Ipv6(TransportLayer::None), DATA),
    FrameSpec::new(NetworkLayer::Ipv4(TransportLayer::Udp), b""),
    FrameSpec::new(NetworkLayer::Ipv4(TransportLayer::Udp), DATA),
    FrameSpec::new(NetworkLayer::Ipv4(TransportLayer::Tcp), b""),
    FrameSpec::new(NetworkLayer::Ipv4(TransportLayer::Tcp), DATA),
    FrameSpec::new(NetworkLayer::Ipv6(TransportLayer::Udp), b""),
    FrameSpec::new(NetworkLayer::Ipv6(TransportLayer::Udp), DATA),
    FrameSpec::new(NetworkLayer::Ipv6(TransportLayer::Tcp), b""),
    FrameSpec::new(NetworkLayer::Ipv6(TransportLayer::Tcp), DATA),
];

/// Settings shared by all generated files
#[derive(Clone, Debug, PartialEq)]
pub struct FixtureConfig {
    pub snaplen: u32,
    pub resolution: TsResolution,
    pub endianness: Endianness,
    /// Timestamp of the first frame of each file
    pub base_timestamp: Timestamp,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        FixtureConfig {
            snaplen: 65535,
            resolution: TsResolution::Microsecond,
            endianness: Endianness::Little,
            base_timestamp: Timestamp::default(),
        }
    }
}

impl FixtureConfig {
    pub fn header(&self, linktype: Linktype) -> PcapHeader {
        PcapHeader::with_linktype(linktype, self.snaplen, self.resolution)
            .with_endianness(self.endianness)
    }
}

/// One output file: its name, link type and encoded frames
#[derive(Clone, Debug)]
pub struct Fixture {
    pub name: &'static str,
    pub linktype: Linktype,
    pub frames: Vec<Vec<u8>>,
}

impl Fixture {
    /// Write the fixture to `dir`, returning the path of the new file
    pub fn write_to(&self, dir: &Path, config: &FixtureConfig) -> Result<PathBuf, WriteError> {
        let path = dir.join(self.name);
        let mut writer = PcapWriter::open_with_header(&path, config.header(self.linktype))?;
        for (i, frame) in self.frames.iter().enumerate() {
            let ts = config
                .base_timestamp
                .add_units(i as u64, config.resolution)?;
            writer.write_frame(frame, ts)?;
        }
        let frames = writer.frames_written();
        let bytes = writer.bytes_written();
        writer.close()?;
        info!(
            path = %path.display(),
            linktype = %self.linktype,
            frames,
            bytes,
            "wrote fixture"
        );
        Ok(path)
    }
}

/// Ethernet frames of [`READ_WRITE_FIXTURE`]
pub fn read_write_fixture() -> Result<Fixture, GenError> {
    let frames = READ_WRITE_FRAMES
        .iter()
        .map(FrameSpec::build)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Fixture {
        name: READ_WRITE_FIXTURE,
        linktype: Linktype::ETHERNET,
        frames,
    })
}

/// USBPcap record of [`UNHANDLED_FIXTURE`]
pub fn unhandled_fixture() -> Result<Fixture, GenError> {
    let record = UsbPcapHeader::default().build(&[])?;
    Ok(Fixture {
        name: UNHANDLED_FIXTURE,
        linktype: Linktype::USBPCAP,
        frames: vec![record],
    })
}

pub fn fixtures() -> Result<Vec<Fixture>, GenError> {
    Ok(vec![read_write_fixture()?, unhandled_fixture()?])
}

/// Write all fixture files into `dir`, creating it if needed
///
/// Returns the paths of the generated files, in a fixed order.
pub fn generate(dir: &Path, config: &FixtureConfig) -> Result<Vec<PathBuf>, WriteError> {
    config.base_timestamp.check(config.resolution)?;
    fs::create_dir_all(dir)?;
    fixtures()?
        .iter()
        .map(|fixture| fixture.write_to(dir, config))
        .collect()
}
