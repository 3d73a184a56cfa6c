use crate::pcap::*;
use cookie_factory::bytes::{be_i32, be_u16, be_u32, le_i32, le_u16, le_u32};
use cookie_factory::combinator::slice;
use cookie_factory::sequence::tuple;
use cookie_factory::{SerializeFn, WriteContext};
use std::io::Write;

/// Serialize a global header, in the byte order given by its magic number
///
/// The magic number is always written in native form, so that readers detect
/// the byte order from its first bytes.
pub fn pcap_header<'a, W: Write + 'a>(h: &'a PcapHeader) -> impl SerializeFn<W> + 'a {
    let endianness = h.endianness();
    move |out: WriteContext<W>| match endianness {
        Endianness::Little => tuple((
            le_u32(h.native_magic()),
            le_u16(h.version_major),
            le_u16(h.version_minor),
            le_i32(h.thiszone),
            le_u32(h.sigfigs),
            le_u32(h.snaplen),
            le_i32(h.network.0),
        ))(out),
        Endianness::Big => tuple((
            be_u32(h.native_magic()),
            be_u16(h.version_major),
            be_u16(h.version_minor),
            be_i32(h.thiszone),
            be_u32(h.sigfigs),
            be_u32(h.snaplen),
            be_i32(h.network.0),
        ))(out),
    }
}

/// Serialize a record header followed by its data
pub fn pcap_record<'a, 'b: 'a, W: Write + 'a>(
    b: &'a LegacyPcapBlock<'b>,
    endianness: Endianness,
) -> impl SerializeFn<W> + 'a {
    move |out: WriteContext<W>| match endianness {
        Endianness::Little => tuple((
            le_u32(b.ts_sec),
            le_u32(b.ts_usec),
            le_u32(b.caplen),
            le_u32(b.origlen),
            slice(b.data),
        ))(out),
        Endianness::Big => tuple((
            be_u32(b.ts_sec),
            be_u32(b.ts_usec),
            be_u32(b.caplen),
            be_u32(b.origlen),
            slice(b.data),
        ))(out),
    }
}
