use pcap_writer::*;
use std::fs;
use std::io::BufReader;

const ETHER_BARE: [u8; 14] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x90, 0x00,
];

fn ether_ipv4_udp() -> Vec<u8> {
    let mut frame = ETHER_BARE.to_vec();
    frame[12..14].copy_from_slice(&[0x08, 0x00]);
    // IPv4, 20 + 8 + 4 bytes, UDP, checksum not computed
    frame.extend_from_slice(&[
        0x45, 0x00, 0x00, 0x20, 0x00, 0x01, 0x00, 0x00, 0x40, 0x11, 0x00, 0x00, 0x7f, 0x00, 0x00,
        0x01, 0x7f, 0x00, 0x00, 0x01,
    ]);
    frame.extend_from_slice(&[0x00, 0x35, 0x00, 0x35, 0x00, 0x0c, 0x00, 0x00]);
    frame.extend_from_slice(b"data");
    frame
}

#[test]
fn test_zero_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pcap");
    let writer = PcapWriter::open(&path, Linktype::ETHERNET, 65535).expect("open");
    writer.close().expect("close");
    let data = fs::read(&path).unwrap();
    assert_eq!(data.len(), 24);
    let cap = PcapCapture::from_file(&data).expect("parse");
    assert!(cap.blocks.is_empty());
}

#[test]
fn test_single_ethernet_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("single.pcap");
    let mut writer = PcapWriter::open(&path, Linktype::ETHERNET, 65535).expect("open");
    writer
        .write_frame(&ETHER_BARE, Timestamp::new(1_600_000_000, 42))
        .expect("write_frame");
    writer.close().expect("close");

    let data = fs::read(&path).unwrap();
    assert_eq!(data.len(), 54);
    let cap = PcapCapture::from_file(&data).expect("parse");
    assert_eq!(cap.header.network, Linktype::ETHERNET);
    assert_eq!(cap.header.snaplen, 65535);
    assert_eq!(cap.blocks.len(), 1);
    let block = &cap.blocks[0];
    assert_eq!(block.caplen, 14);
    assert_eq!(block.origlen, 14);
    assert_eq!(block.ts(), Timestamp::new(1_600_000_000, 42));
    assert_eq!(block.data, &ETHER_BARE[..]);
}

#[test]
fn test_two_frames_file_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two.pcap");
    let udp = ether_ipv4_udp();
    assert_eq!(udp.len(), 46);
    let frames = vec![
        (ETHER_BARE.to_vec(), Timestamp::new(1, 0)),
        (udp.clone(), Timestamp::new(1, 1)),
    ];
    let header = PcapHeader::with_linktype(Linktype::ETHERNET, 65535, TsResolution::Microsecond);
    let count = write_pcap(&path, header, frames).expect("write_pcap");
    assert_eq!(count, 2);

    let data = fs::read(&path).unwrap();
    assert_eq!(data.len(), 24 + (16 + 14) + (16 + 46));
    assert_eq!(data.len(), 116);
    let cap = PcapCapture::from_file(&data).expect("parse");
    assert_eq!(cap.blocks.len(), 2);
    assert_eq!(cap.blocks[1].data, udp.as_slice());
}

#[test]
fn test_oversized_frame_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("oversized.pcap");
    let mut writer = PcapWriter::open(&path, Linktype::ETHERNET, 32).expect("open");
    writer
        .write_frame(&ETHER_BARE, Timestamp::default())
        .expect("small frame");
    let err = writer
        .write_frame(&ether_ipv4_udp(), Timestamp::default())
        .expect_err("frame larger than snaplen");
    assert!(err.is_invalid_argument());
    // the writer is still usable after a rejected frame
    writer
        .write_frame(&ETHER_BARE, Timestamp::default())
        .expect("small frame");
    writer.close().expect("close");

    let data = fs::read(&path).unwrap();
    assert_eq!(data.len(), 24 + 2 * (16 + 14));
    let cap = PcapCapture::from_file(&data).expect("parse");
    assert!(cap.blocks.iter().all(|b| b.caplen == 14));
}

#[test]
fn test_unknown_linktype_written_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usb.pcap");
    let mut writer = PcapWriter::open(&path, Linktype(249), 65535).expect("open");
    writer
        .write_frame(&[27, 0, 1, 2, 3], Timestamp::default())
        .expect("write_frame");
    writer.close().expect("close");

    let data = fs::read(&path).unwrap();
    assert_eq!(&data[20..24], &[249, 0, 0, 0]);
    let cap = PcapCapture::from_file(&data).expect("parse");
    assert_eq!(cap.header.network, Linktype::USBPCAP);

    // codes with no name at all are accepted too
    let mut out = Vec::new();
    let header = PcapHeader::with_linktype(Linktype(0x7fff_0001), 65535, TsResolution::Microsecond);
    PcapWriter::new(&mut out, header).expect("writer");
    assert_eq!(&out[20..24], &[0x01, 0x00, 0xff, 0x7f]);
}

#[test]
fn test_open_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("file.pcap");
    let res = PcapWriter::open(&path, Linktype::ETHERNET, 65535);
    assert!(matches!(res, Err(WriteError::Io(_))));
}

#[test]
fn test_round_trip_all_formats() {
    let frames: Vec<Vec<u8>> = (0..20u8).map(|n| vec![n; n as usize * 7]).collect();
    for &endianness in &[Endianness::Little, Endianness::Big] {
        for &resolution in &[TsResolution::Microsecond, TsResolution::Nanosecond] {
            let header = PcapHeader::with_linktype(Linktype::RAW, 1024, resolution)
                .with_endianness(endianness);
            let mut writer = PcapWriter::new(Vec::new(), header.clone()).expect("writer");
            let base = Timestamp::new(1_000, resolution.units_per_sec() - 5);
            for (i, frame) in frames.iter().enumerate() {
                let ts = base.add_units(i as u64, resolution).unwrap();
                writer.write_frame(frame, ts).expect("write_frame");
            }
            let expected_len = 24 + frames.iter().map(|f| 16 + f.len()).sum::<usize>();
            assert_eq!(writer.bytes_written(), expected_len as u64);
            let out = writer.close().expect("close");
            assert_eq!(out.len(), expected_len);

            let cap = PcapCapture::from_file(&out).expect("parse");
            assert_eq!(cap.header, header);
            assert_eq!(cap.header.resolution(), resolution);
            assert_eq!(cap.blocks.len(), frames.len());
            for (i, (block, frame)) in cap.blocks.iter().zip(&frames).enumerate() {
                assert_eq!(block.data, frame.as_slice());
                assert_eq!(block.caplen as usize, frame.len());
                assert_eq!(block.origlen, block.caplen);
                assert_eq!(block.ts(), base.add_units(i as u64, resolution).unwrap());
            }
        }
    }
}

#[test]
fn test_streaming_reader() {
    let mut out = Vec::new();
    let mut writer = PcapWriter::new(&mut out, PcapHeader::default()).expect("writer");
    for n in 0..100u32 {
        writer
            .write_frame(&n.to_be_bytes(), Timestamp::new(n, 0))
            .expect("write_frame");
    }
    writer.close().expect("close");

    // small buffer, to force refills
    let mut reader = LegacyPcapReader::new(64, BufReader::new(&out[..])).expect("reader");
    let mut num_blocks = 0;
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                match block {
                    PcapBlockOwned::LegacyHeader(_) => assert_eq!(num_blocks, 0),
                    PcapBlockOwned::Legacy(b) => {
                        assert_eq!(b.ts_sec, num_blocks - 1);
                        assert_eq!(b.data, &(num_blocks - 1).to_be_bytes()[..]);
                    }
                }
                num_blocks += 1;
                reader.consume(offset);
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::Incomplete(_)) => {
                reader.refill().unwrap();
            }
            Err(e) => panic!("error while reading: {:?}", e),
        }
    }
    assert_eq!(num_blocks, 101); /* 1 (header) + 100 (records) */
    assert_eq!(reader.consumed(), out.len());
}

#[test]
fn test_truncated_file() {
    let mut out = Vec::new();
    let mut writer = PcapWriter::new(&mut out, PcapHeader::default()).expect("writer");
    writer
        .write_frame(&ETHER_BARE, Timestamp::default())
        .expect("write_frame");
    writer.close().expect("close");
    out.truncate(out.len() - 3);

    let mut reader = LegacyPcapReader::new(65536, &out[..]).expect("reader");
    let mut incomplete_count: u32 = 0;
    loop {
        match reader.next() {
            Ok((offset, _block)) => {
                reader.consume(offset);
            }
            Err(PcapError::Eof) => unreachable!("should not parse without error"),
            Err(PcapError::Incomplete(_)) => {
                reader.refill().unwrap();
                incomplete_count += 1;
                if incomplete_count > 1 << 20 {
                    panic!("reader stuck in infinite loop");
                }
            }
            Err(PcapError::UnexpectedEof) => return,
            Err(e) => panic!("error while reading: {:?}", e),
        }
    }
}
