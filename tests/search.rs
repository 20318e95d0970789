//! Byte-string search over mapped files, including embedded zero bytes.

use mmap_region::MapOptions;
use std::io::Write;
use tempfile::NamedTempFile;

fn mapped(contents: &[u8]) -> (NamedTempFile, mmap_region::MappedRegion) {
    let mut tmp = NamedTempFile::new().expect("tempfile");
    tmp.write_all(contents).expect("write");
    tmp.flush().expect("flush");
    let m = MapOptions::new().map(tmp.as_file()).expect("map");
    (tmp, m)
}

fn naive_find(hay: &[u8], needle: &[u8]) -> Option<usize> {
    (0..=hay.len().checked_sub(needle.len())?).find(|&i| &hay[i..i + needle.len()] == needle)
}

#[test]
fn tougher_find() {
    // Zero bytes in the data are ordinary bytes, not terminators.
    let data = b"aabaac\x00deef\x00\x00aa\x00";
    let (_tmp, m) = mapped(data);

    for start in 0..data.len() {
        for finish in start..=data.len() {
            let needle = &data[start..finish];
            assert_eq!(m.find(needle, None, None).expect("find"), naive_find(data, needle));
            assert_eq!(m.find(b"x", None, None).expect("find"), None);
        }
    }
}

#[test]
fn find_end() {
    let (_tmp, m) = mapped(b"one two ones");
    assert_eq!(m.find(b"one", None, None).expect("find"), Some(0));
    assert_eq!(m.find(b"ones", None, None).expect("find"), Some(8));
    assert_eq!(m.find(b"one", Some(0), Some(-1)).expect("find"), Some(0));
    assert_eq!(m.find(b"one", Some(1), None).expect("find"), Some(8));
    assert_eq!(m.find(b"one", Some(1), Some(-1)).expect("find"), Some(8));
    assert_eq!(m.find(b"one", Some(1), Some(-2)).expect("find"), None);
}

#[test]
fn rfind() {
    let (_tmp, m) = mapped(b"one two ones");
    assert_eq!(m.rfind(b"one", None, None).expect("rfind"), Some(8));
    assert_eq!(m.rfind(b"one ", None, None).expect("rfind"), Some(0));
    assert_eq!(m.rfind(b"one", Some(0), Some(-1)).expect("rfind"), Some(8));
    assert_eq!(m.rfind(b"one", Some(0), Some(-2)).expect("rfind"), Some(0));
    assert_eq!(m.rfind(b"one", Some(1), Some(-1)).expect("rfind"), Some(8));
    assert_eq!(m.rfind(b"one", Some(1), Some(-2)).expect("rfind"), None);
}

#[test]
fn degenerate_windows() {
    let (_tmp, m) = mapped(b"abcabc");
    // Needle longer than the window
    assert_eq!(m.find(b"abcabcabc", None, None).expect("find"), None);
    assert_eq!(m.find(b"bca", Some(2), Some(4)).expect("find"), None);
    // Start past end
    assert_eq!(m.find(b"a", Some(5), Some(2)).expect("find"), None);
    assert_eq!(m.rfind(b"a", Some(5), Some(2)).expect("rfind"), None);
    // Empty needle
    assert_eq!(m.find(b"", Some(2), None).expect("find"), Some(2));
    assert_eq!(m.rfind(b"", None, Some(4)).expect("rfind"), Some(4));
    // Bounds are clamped
    assert_eq!(m.find(b"c", Some(-100), Some(100)).expect("find"), Some(2));
    assert_eq!(m.rfind(b"c", Some(-100), Some(100)).expect("rfind"), Some(5));
}
