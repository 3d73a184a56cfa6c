//! Minimal frame encoders
//!
//! These produce exactly the header layouts used by the fixture files: an
//! Ethernet header, optionally followed by an IPv4 or IPv6 header, optionally
//! followed by a UDP or TCP header, then a payload. Every field has a fixed
//! default value; lengths and checksums are computed.

use cookie_factory::bytes::{be_u16, be_u32, be_u8, le_u16, le_u32, le_u64};
use cookie_factory::combinator::slice;
use cookie_factory::sequence::tuple;
use cookie_factory::{gen_simple, GenError};
use pnet_packet::ipv4::{self, Ipv4Packet};
use pnet_packet::tcp::{self, TcpPacket};
use pnet_packet::udp::{self, UdpPacket};
use std::convert::TryFrom;
use std::net::{Ipv4Addr, Ipv6Addr};

pub const ETHER_HEADER_LEN: usize = 14;
pub const IPV4_HEADER_LEN: usize = 20;
pub const IPV6_HEADER_LEN: usize = 40;
pub const UDP_HEADER_LEN: usize = 8;
pub const TCP_HEADER_LEN: usize = 20;
pub const USBPCAP_HEADER_LEN: usize = 27;

pub const ETHER_BROADCAST: [u8; 6] = [0xff; 6];
pub const ETHER_ZERO: [u8; 6] = [0; 6];

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_IPV6: u16 = 0x86dd;
/// Ethernet loopback, used when the frame carries no network layer
pub const ETHERTYPE_LOOPBACK: u16 = 0x9000;

pub const IPPROTO_HOPOPT: u8 = 0;
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;
pub const IPPROTO_NONXT: u8 = 59;

const IPV4_LOOPBACK: Ipv4Addr = Ipv4Addr::LOCALHOST;
const IPV6_LOOPBACK: Ipv6Addr = Ipv6Addr::LOCALHOST;
const DEFAULT_HOP_LIMIT: u8 = 64;

const UDP_PORT: u16 = 53;
const TCP_SRC_PORT: u16 = 20;
const TCP_DST_PORT: u16 = 80;
const TCP_FLAG_SYN: u8 = 0x02;
const TCP_WINDOW: u16 = 8192;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportLayer {
    None,
    Udp,
    Tcp,
}

impl TransportLayer {
    fn header_len(self) -> usize {
        match self {
            TransportLayer::None => 0,
            TransportLayer::Udp => UDP_HEADER_LEN,
            TransportLayer::Tcp => TCP_HEADER_LEN,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NetworkLayer {
    None,
    Ipv4(TransportLayer),
    Ipv6(TransportLayer),
}

impl NetworkLayer {
    fn ethertype(self) -> u16 {
        match self {
            NetworkLayer::None => ETHERTYPE_LOOPBACK,
            NetworkLayer::Ipv4(_) => ETHERTYPE_IPV4,
            NetworkLayer::Ipv6(_) => ETHERTYPE_IPV6,
        }
    }

    fn header_len(self) -> usize {
        match self {
            NetworkLayer::None => 0,
            NetworkLayer::Ipv4(t) => IPV4_HEADER_LEN + t.header_len(),
            NetworkLayer::Ipv6(t) => IPV6_HEADER_LEN + t.header_len(),
        }
    }
}

/// Description of one Ethernet frame
#[derive(Clone, Copy, Debug)]
pub struct FrameSpec<'a> {
    pub network: NetworkLayer,
    pub payload: &'a [u8],
}

impl<'a> FrameSpec<'a> {
    pub const fn new(network: NetworkLayer, payload: &'a [u8]) -> FrameSpec<'a> {
        FrameSpec { network, payload }
    }

    /// Length of the encoded frame, in bytes
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        ETHER_HEADER_LEN + self.network.header_len() + self.payload.len()
    }

    pub fn build(&self) -> Result<Vec<u8>, GenError> {
        let l3 = match self.network {
            NetworkLayer::None => self.payload.to_vec(),
            NetworkLayer::Ipv4(t) => {
                let (proto, segment) = transport_segment(t, self.payload, IpVersion::V4)?;
                ipv4_packet(proto.unwrap_or(IPPROTO_HOPOPT), &segment)?
            }
            NetworkLayer::Ipv6(t) => {
                let (proto, segment) = transport_segment(t, self.payload, IpVersion::V6)?;
                ipv6_packet(proto.unwrap_or(IPPROTO_NONXT), &segment)?
            }
        };
        ether_frame(self.network.ethertype(), &l3)
    }
}

#[derive(Clone, Copy)]
enum IpVersion {
    V4,
    V6,
}

fn u16_len(len: usize) -> Result<u16, GenError> {
    u16::try_from(len).map_err(|_| GenError::BufferTooBig(len))
}

fn too_short(len: usize) -> GenError {
    GenError::BufferTooSmall(len)
}

/// Transport checksum over the IPv4 or IPv6 pseudo-header of the loopback addresses
fn transport_checksum(
    transport: TransportLayer,
    segment: &[u8],
    version: IpVersion,
) -> Result<u16, GenError> {
    let csum = match transport {
        TransportLayer::None => 0,
        TransportLayer::Udp => {
            let packet = UdpPacket::new(segment).ok_or_else(|| too_short(segment.len()))?;
            let csum = match version {
                IpVersion::V4 => udp::ipv4_checksum(&packet, &IPV4_LOOPBACK, &IPV4_LOOPBACK),
                IpVersion::V6 => udp::ipv6_checksum(&packet, &IPV6_LOOPBACK, &IPV6_LOOPBACK),
            };
            // zero means "no checksum" for UDP
            if csum == 0 {
                0xffff
            } else {
                csum
            }
        }
        TransportLayer::Tcp => {
            let packet = TcpPacket::new(segment).ok_or_else(|| too_short(segment.len()))?;
            match version {
                IpVersion::V4 => tcp::ipv4_checksum(&packet, &IPV4_LOOPBACK, &IPV4_LOOPBACK),
                IpVersion::V6 => tcp::ipv6_checksum(&packet, &IPV6_LOOPBACK, &IPV6_LOOPBACK),
            }
        }
    };
    Ok(csum)
}

/// Encode the transport header and payload; returns the IP protocol number, if any
fn transport_segment(
    transport: TransportLayer,
    payload: &[u8],
    version: IpVersion,
) -> Result<(Option<u8>, Vec<u8>), GenError> {
    let len = transport.header_len() + payload.len();
    let (proto, mut segment, csum_offset) = match transport {
        TransportLayer::None => return Ok((None, payload.to_vec())),
        TransportLayer::Udp => {
            let segment = gen_simple(
                tuple((
                    be_u16(UDP_PORT),
                    be_u16(UDP_PORT),
                    be_u16(u16_len(len)?),
                    be_u16(0),
                    slice(payload),
                )),
                Vec::with_capacity(len),
            )?;
            (IPPROTO_UDP, segment, 6)
        }
        TransportLayer::Tcp => {
            let segment = gen_simple(
                tuple((
                    be_u16(TCP_SRC_PORT),
                    be_u16(TCP_DST_PORT),
                    be_u32(0), // seq
                    be_u32(0), // ack
                    be_u8(((TCP_HEADER_LEN / 4) as u8) << 4),
                    be_u8(TCP_FLAG_SYN),
                    be_u16(TCP_WINDOW),
                    be_u16(0),
                    be_u16(0), // urgent pointer
                    slice(payload),
                )),
                Vec::with_capacity(len),
            )?;
            (IPPROTO_TCP, segment, 16)
        }
    };
    let csum = transport_checksum(transport, &segment, version)?;
    segment[csum_offset..csum_offset + 2].copy_from_slice(&csum.to_be_bytes());
    Ok((Some(proto), segment))
}

fn ipv4_packet(proto: u8, segment: &[u8]) -> Result<Vec<u8>, GenError> {
    let total_len = IPV4_HEADER_LEN + segment.len();
    let mut packet = gen_simple(
        tuple((
            be_u8(0x45), // version 4, IHL 5
            be_u8(0),    // TOS
            be_u16(u16_len(total_len)?),
            be_u16(1), // id
            be_u16(0), // flags, fragment offset
            be_u8(DEFAULT_HOP_LIMIT),
            be_u8(proto),
            be_u16(0),
            slice(IPV4_LOOPBACK.octets()),
            slice(IPV4_LOOPBACK.octets()),
            slice(segment),
        )),
        Vec::with_capacity(total_len),
    )?;
    let header = Ipv4Packet::new(&packet).ok_or_else(|| too_short(packet.len()))?;
    let csum = ipv4::checksum(&header);
    packet[10..12].copy_from_slice(&csum.to_be_bytes());
    Ok(packet)
}

fn ipv6_packet(next_header: u8, segment: &[u8]) -> Result<Vec<u8>, GenError> {
    gen_simple(
        tuple((
            be_u32(6 << 28), // version 6, traffic class and flow label 0
            be_u16(u16_len(segment.len())?),
            be_u8(next_header),
            be_u8(DEFAULT_HOP_LIMIT),
            slice(IPV6_LOOPBACK.octets()),
            slice(IPV6_LOOPBACK.octets()),
            slice(segment),
        )),
        Vec::with_capacity(IPV6_HEADER_LEN + segment.len()),
    )
}

fn ether_frame(ethertype: u16, payload: &[u8]) -> Result<Vec<u8>, GenError> {
    gen_simple(
        tuple((
            slice(ETHER_BROADCAST),
            slice(ETHER_ZERO),
            be_u16(ethertype),
            slice(payload),
        )),
        Vec::with_capacity(ETHER_HEADER_LEN + payload.len()),
    )
}

/// USBPcap pseudo-header, as written by the Windows USBPcap driver
///
/// All multi-byte fields are little-endian.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UsbPcapHeader {
    pub irp_id: u64,
    pub usbd_status: u32,
    pub function: u16,
    pub info: u8,
    pub bus: u16,
    pub device: u16,
    pub endpoint: u8,
    pub transfer: u8,
}

impl UsbPcapHeader {
    /// Encode the header followed by `data`
    pub fn build(&self, data: &[u8]) -> Result<Vec<u8>, GenError> {
        let data_len =
            u32::try_from(data.len()).map_err(|_| GenError::BufferTooBig(data.len()))?;
        gen_simple(
            tuple((
                le_u16(USBPCAP_HEADER_LEN as u16),
                le_u64(self.irp_id),
                le_u32(self.usbd_status),
                le_u16(self.function),
                be_u8(self.info),
                le_u16(self.bus),
                le_u16(self.device),
                be_u8(self.endpoint),
                be_u8(self.transfer),
                le_u32(data_len),
                slice(data),
            )),
            Vec::with_capacity(USBPCAP_HEADER_LEN + data.len()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_bare_ether() {
        let frame = FrameSpec::new(NetworkLayer::None, b"").build().unwrap();
        assert_eq!(frame, hex!("FF FF FF FF FF FF 00 00 00 00 00 00 90 00"));
    }

    #[test]
    fn test_ipv4_header() {
        let spec = FrameSpec::new(NetworkLayer::Ipv4(TransportLayer::None), b"");
        let frame = spec.build().unwrap();
        assert_eq!(frame.len(), spec.len());
        assert_eq!(
            &frame[ETHER_HEADER_LEN..],
            &hex!("45 00 00 14 00 01 00 00 40 00 7C E7 7F 00 00 01 7F 00 00 01")[..]
        );
        let header = Ipv4Packet::new(&frame[ETHER_HEADER_LEN..]).unwrap();
        assert_eq!(header.get_checksum(), 0x7ce7);
        assert_eq!(ipv4::checksum(&header), header.get_checksum());
    }

    #[test]
    fn test_ipv4_udp() {
        let spec = FrameSpec::new(NetworkLayer::Ipv4(TransportLayer::Udp), b"");
        let frame = spec.build().unwrap();
        assert_eq!(frame.len(), 42);
        assert_eq!(&frame[12..14], &[0x08, 0x00]);
        assert_eq!(frame[23], IPPROTO_UDP);
        assert_eq!(
            &frame[ETHER_HEADER_LEN + IPV4_HEADER_LEN..],
            &hex!("00 35 00 35 00 08 01 72")[..]
        );
    }

    #[test]
    fn test_ipv6_tcp_checksum() {
        let spec = FrameSpec::new(NetworkLayer::Ipv6(TransportLayer::Tcp), b"data");
        let frame = spec.build().unwrap();
        assert_eq!(frame.len(), 78);
        assert_eq!(&frame[12..14], &[0x86, 0xdd]);
        // payload length and next header
        assert_eq!(&frame[18..21], &[0x00, 24, IPPROTO_TCP]);
        let segment = &frame[ETHER_HEADER_LEN + IPV6_HEADER_LEN..];
        assert_eq!(segment.len(), 24);
        let packet = TcpPacket::new(segment).unwrap();
        assert_eq!(packet.get_source(), TCP_SRC_PORT);
        assert_eq!(packet.get_destination(), TCP_DST_PORT);
        assert_eq!(
            packet.get_checksum(),
            tcp::ipv6_checksum(&packet, &IPV6_LOOPBACK, &IPV6_LOOPBACK)
        );
    }

    #[test]
    fn test_ipv6_no_next_header() {
        let frame = FrameSpec::new(NetworkLayer::Ipv6(TransportLayer::None), b"data")
            .build()
            .unwrap();
        assert_eq!(frame.len(), 58);
        assert_eq!(frame[20], IPPROTO_NONXT);
        assert_eq!(&frame[54..], b"data");
    }

    #[test]
    fn test_usbpcap_header() {
        let record = UsbPcapHeader::default().build(&[]).unwrap();
        assert_eq!(record.len(), USBPCAP_HEADER_LEN);
        assert_eq!(&record[..2], &[27, 0]);
        assert!(record[2..].iter().all(|&b| b == 0));
    }
}
