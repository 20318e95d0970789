//! Basic integration tests for mmap-region.

use mmap_region::{capabilities, ErrorKind, MapOptions};
use std::fs;
use std::io::{SeekFrom, Write};
use tempfile::NamedTempFile;

/// Two blocks: the first all zeros, the second starting with `foo` and zero-padded.
fn two_block_file(block: usize) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("tempfile");
    tmp.write_all(&vec![0u8; block]).expect("block 1");
    tmp.write_all(b"foo").expect("foo");
    tmp.write_all(&vec![0u8; block - 3]).expect("block 2");
    tmp.flush().expect("flush");
    tmp
}

#[test]
fn two_page_file_roundtrip() {
    let page = capabilities().page_size;
    let tmp = two_block_file(page);

    let m = MapOptions::new()
        .len(2 * page as u64)
        .map(tmp.as_file())
        .expect("map");

    assert_eq!(m.find(b"foo", None, None).expect("find"), Some(page));
    assert_eq!(m.len().expect("len"), 2 * page);
    assert_eq!(m.get(0).expect("get"), 0);
    assert_eq!(m.get_range(0..3).expect("range"), b"\0\0\0");

    // One past the end is an index error, not a clamp
    let len = m.len().expect("len") as isize;
    assert_eq!(m.get(len).expect_err("get past end").kind(), ErrorKind::Index);
    assert_eq!(m.set(len, 0).expect_err("set past end").kind(), ErrorKind::Index);

    // Modify the content
    let p = page as isize;
    m.set(0, b'3').expect("set");
    m.set_range(p + 3..p + 6, b"bar").expect("set range");

    assert_eq!(m.get(0).expect("get"), b'3');
    assert_eq!(m.get_range(0..3).expect("range"), b"3\0\0");
    assert_eq!(m.get_range(p - 1..p + 7).expect("range"), b"\0foobar\0");

    m.flush().expect("flush");

    // A regex engine can run over the live mapping
    {
        let bytes = m.bytes().expect("bytes");
        let re = regex::bytes::Regex::new("[A-Za-z]+").expect("regex");
        let hit = re.find(&bytes).expect("regex match on mapping");
        assert_eq!((hit.start(), hit.end()), (page, page + 6));
    }

    // Seeking around
    assert_eq!(m.seek(SeekFrom::Start(0)).expect("seek"), 0);
    assert_eq!(m.tell().expect("tell"), 0);
    assert_eq!(m.seek(SeekFrom::Current(42)).expect("seek"), 42);
    assert_eq!(m.tell().expect("tell"), 42);
    m.seek(SeekFrom::End(0)).expect("seek");
    assert_eq!(m.tell().expect("tell"), len as u64);

    // Out-of-range seeks fail and leave the cursor alone
    let before = m.tell().expect("tell");
    assert_eq!(
        m.seek(SeekFrom::Current(-(len as i64) - 1)).expect_err("negative").kind(),
        ErrorKind::Value
    );
    assert!(m.seek(SeekFrom::End(1)).is_err());
    assert!(m.seek(SeekFrom::End(-(len as i64) - 1)).is_err());
    assert_eq!(m.tell().expect("tell"), before);

    // Resize down truncates the file too
    m.resize(512).expect("resize");
    assert_eq!(m.len().expect("len"), 512);
    assert_eq!(m.tell().expect("tell"), 512);
    assert!(m.seek(SeekFrom::Start(513)).is_err());
    assert_eq!(m.get(0).expect("preserved"), b'3');
    assert_eq!(fs::metadata(tmp.path()).expect("metadata").len(), 512);
    assert_eq!(m.size().expect("size"), 512);

    m.close();
}

#[test]
fn write_through_is_visible_to_independent_reader() {
    let tmp = two_block_file(capabilities().page_size);
    let m = MapOptions::new().map(tmp.as_file()).expect("map");

    m.set_range(0..5, b"HELLO").expect("write");
    m.flush_range(0, 5).expect("flush range");

    let on_disk = fs::read(tmp.path()).expect("read back");
    assert_eq!(&on_disk[..5], b"HELLO");
}

#[test]
fn overlapping_regions_share_pages() {
    let tmp = two_block_file(capabilities().page_size);
    let a = MapOptions::new().map(tmp.as_file()).expect("map a");
    let b = MapOptions::new().map(tmp.as_file()).expect("map b");

    a.set_range(10..14, b"PING").expect("write a");
    assert_eq!(b.get_range(10..14).expect("read b"), b"PING");
}

#[test]
fn flush_range_is_bounds_checked() {
    let region = mmap_region::MappedRegion::anonymous(64).expect("anon");
    region.flush_range(0, 64).expect("whole");
    region.flush_range(64, 0).expect("empty at end");
    assert_eq!(
        region.flush_range(60, 5).expect_err("past end").kind(),
        ErrorKind::Value
    );
}

#[test]
fn whole_flush_races_with_resize_on_a_clone() {
    let region = mmap_region::MappedRegion::anonymous(8192).expect("anon");
    let resizer = region.clone();
    let handle = std::thread::spawn(move || {
        for i in 0..500 {
            resizer.resize(if i % 2 == 0 { 4096 } else { 8192 }).expect("resize");
        }
    });
    for _ in 0..500 {
        region.flush().expect("flush sees one consistent length");
    }
    handle.join().expect("join");
}
