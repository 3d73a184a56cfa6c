use rusticata_macros::newtype_enum;

/// Data link type
///
/// The link-layer header type specifies the type of headers at the beginning
/// of the packet. The writer stores the code verbatim and never checks that
/// frame contents match it, so any value (named below or not) is accepted.
///
/// See <http://www.tcpdump.org/linktypes.html>
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Linktype(pub i32);

newtype_enum! {
impl display Linktype {
    NULL = 0,
    ETHERNET = 1,

    RAW = 101,

    LOOP = 108,
    LINUX_SLL = 113,

    USB_LINUX = 189,
    USB_LINUX_MMAPPED = 220,

    // Raw IPv4; the packet begins with an IPv4 header.
    IPV4 = 228,
    // Raw IPv6; the packet begins with an IPv6 header.
    IPV6 = 229,

    // USB packets, beginning with a USBPcap header.
    USBPCAP = 249,
}
}
