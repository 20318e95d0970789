//! Cursor-based I/O: seek, tell, read, write and their single-byte forms.

use mmap_region::{ErrorKind, MapOptions, RegionError};
use std::io::{SeekFrom, Write};
use tempfile::NamedTempFile;

const DATA: &[u8] = b"0123456789";

fn mapped_placeholder() -> (NamedTempFile, mmap_region::MappedRegion) {
    let mut tmp = NamedTempFile::new().expect("tempfile");
    tmp.write_all(&[b'x'; 10]).expect("write");
    tmp.flush().expect("flush");
    let m = MapOptions::new().len(DATA.len() as u64).map(tmp.as_file()).expect("map");
    (tmp, m)
}

#[test]
fn write_byte_then_read_byte() {
    let (_tmp, m) = mapped_placeholder();

    for (i, &b) in DATA.iter().enumerate() {
        assert_eq!(m.tell().expect("tell"), i as u64);
        m.write_byte(b).expect("write_byte");
        assert_eq!(m.tell().expect("tell"), i as u64 + 1);
    }
    let err = m.write_byte(b'x').expect_err("past end");
    assert_eq!(err.kind(), ErrorKind::Value);
    assert_eq!(m.get_range(..).expect("read"), DATA);

    m.seek(SeekFrom::Start(0)).expect("seek");
    for (i, &b) in DATA.iter().enumerate() {
        assert_eq!(m.tell().expect("tell"), i as u64);
        assert_eq!(m.read_byte().expect("read_byte"), b);
        assert_eq!(m.tell().expect("tell"), i as u64 + 1);
    }
    let err = m.read_byte().expect_err("at end");
    assert!(matches!(err, RegionError::OutOfBounds { offset: 10, len: 1, total: 10 }));
}

#[test]
fn read_and_write_advance_the_cursor() {
    let (_tmp, m) = mapped_placeholder();
    m.set_range(.., DATA).expect("fill");

    m.seek(SeekFrom::Start(3)).expect("seek");
    assert_eq!(m.read(3).expect("read"), b"345");
    assert_eq!(m.tell().expect("tell"), 6);

    m.seek(SeekFrom::Start(3)).expect("seek");
    m.write(b"bar").expect("write");
    assert_eq!(m.tell().expect("tell"), 6);
    assert_eq!(m.get_range(..).expect("read"), b"012bar6789");

    // No partial writes and no growth
    m.seek(SeekFrom::Start(8)).expect("seek");
    assert_eq!(m.write(b"bar").expect_err("too long").kind(), ErrorKind::Value);
    assert_eq!(m.tell().expect("tell"), 8);
    assert_eq!(m.get_range(..).expect("read"), b"012bar6789");
}

#[test]
fn short_reads_near_the_end() {
    let (_tmp, m) = mapped_placeholder();
    m.set_range(.., DATA).expect("fill");

    m.seek(SeekFrom::End(-2)).expect("seek");
    assert_eq!(m.read(100).expect("short read"), b"89");
    assert_eq!(m.tell().expect("tell"), 10);
    assert_eq!(m.read(5).expect("empty read"), b"");
    assert_eq!(m.tell().expect("tell"), 10);
}

#[test]
fn seek_whence_variants() {
    let (_tmp, m) = mapped_placeholder();
    assert_eq!(m.seek(SeekFrom::End(0)).expect("end"), 10);
    assert_eq!(m.seek(SeekFrom::Current(-4)).expect("back"), 6);
    assert_eq!(m.seek(SeekFrom::Current(4)).expect("forward to end"), 10);

    let err = m.seek(SeekFrom::Start(11)).expect_err("past end");
    assert!(matches!(err, RegionError::InvalidSeek { position: 11, len: 10 }));
    assert_eq!(m.seek(SeekFrom::Current(1)).expect_err("past end").kind(), ErrorKind::Value);
    assert_eq!(m.seek(SeekFrom::End(-11)).expect_err("negative").kind(), ErrorKind::Value);
    assert_eq!(m.tell().expect("tell"), 10);
}

#[test]
fn clones_share_the_cursor() {
    let (_tmp, m) = mapped_placeholder();
    let other = m.clone();
    m.seek(SeekFrom::Start(7)).expect("seek");
    assert_eq!(other.tell().expect("tell"), 7);
}
