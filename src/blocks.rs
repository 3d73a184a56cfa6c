use crate::pcap::{LegacyPcapBlock, PcapHeader};

/// A block from a Pcap file: the global header, or one record
#[derive(Debug, PartialEq)]
pub enum PcapBlockOwned<'a> {
    Legacy(LegacyPcapBlock<'a>),
    LegacyHeader(PcapHeader),
}

impl<'a> From<LegacyPcapBlock<'a>> for PcapBlockOwned<'a> {
    fn from(b: LegacyPcapBlock<'a>) -> PcapBlockOwned<'a> {
        PcapBlockOwned::Legacy(b)
    }
}

impl<'a> From<PcapHeader> for PcapBlockOwned<'a> {
    fn from(b: PcapHeader) -> PcapBlockOwned<'a> {
        PcapBlockOwned::LegacyHeader(b)
    }
}
