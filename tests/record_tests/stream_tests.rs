//! Tests for the record stream
//!
//! These tests verify:
//! - Length-prefixed framing of arbitrary bytes
//! - Key-value packing and unpacking
//! - Clean end of stream vs. truncation
//! - Metadata record handling
//! - File readers and writers with and without envelopes

use std::io::Cursor;

use compressed_dictionary::compression::Compression;
use compressed_dictionary::record::{
    FileRecordReader, FileRecordWriter, Metadata, RecordReader, RecordWriter, KEY_WIDTH,
    LENGTH_WIDTH,
};
use compressed_dictionary::DictError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_records(payloads: &[&[u8]]) -> Vec<u8> {
    let mut writer = RecordWriter::new(Vec::new());
    for payload in payloads {
        writer.write_record(payload).unwrap();
    }
    writer.finish().unwrap()
}

fn reader(bytes: Vec<u8>) -> RecordReader<Cursor<Vec<u8>>> {
    RecordReader::new(Cursor::new(bytes))
}

// =============================================================================
// Framing Tests
// =============================================================================

#[test]
fn test_record_layout_is_length_then_payload() {
    let bytes = write_records(&[b"abc"]);

    assert_eq!(bytes.len(), LENGTH_WIDTH + 3);
    assert_eq!(&bytes[..LENGTH_WIDTH], &3u32.to_le_bytes());
    assert_eq!(&bytes[LENGTH_WIDTH..], b"abc");
}

#[test]
fn test_records_read_back_in_order() {
    let bytes = write_records(&[b"first", b"", b"third"]);
    let mut reader = reader(bytes);

    assert_eq!(reader.read_record().unwrap(), Some(b"first".to_vec()));
    assert_eq!(reader.read_record().unwrap(), Some(Vec::new()));
    assert_eq!(reader.read_record().unwrap(), Some(b"third".to_vec()));
    assert_eq!(reader.read_record().unwrap(), None);
    assert_eq!(reader.records_read(), 3);
}

#[test]
fn test_payload_with_every_byte_value() {
    let payload: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
    let bytes = write_records(&[&payload]);

    let mut reader = reader(bytes);
    assert_eq!(reader.read_record().unwrap(), Some(payload));
}

#[test]
fn test_empty_stream_is_end_of_stream() {
    let mut reader = reader(Vec::new());
    assert_eq!(reader.read_record().unwrap(), None);
}

#[test]
fn test_end_of_stream_is_sticky() {
    let mut reader = reader(write_records(&[b"x"]));
    reader.read_record().unwrap();

    assert_eq!(reader.read_record().unwrap(), None);
    assert_eq!(reader.read_record().unwrap(), None);
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_truncated_length_prefix() {
    let mut bytes = write_records(&[b"whole"]);
    bytes.extend_from_slice(&[7, 0]);

    let mut reader = reader(bytes);
    reader.read_record().unwrap();

    let err = reader.read_record().unwrap_err();
    assert!(matches!(err, DictError::Format { .. }));
}

#[test]
fn test_truncated_payload() {
    let mut bytes = write_records(&[b"0123456789"]);
    bytes.truncate(bytes.len() - 4);

    let err = reader(bytes).read_record().unwrap_err();
    match err {
        DictError::Format { message, .. } => assert!(message.contains("expected 10 bytes, got 6")),
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn test_huge_declared_length_does_not_allocate_up_front() {
    let mut bytes = u32::MAX.to_le_bytes().to_vec();
    bytes.extend_from_slice(b"tiny");

    let err = reader(bytes).read_record().unwrap_err();
    assert!(matches!(err, DictError::Format { .. }));
}

// =============================================================================
// Key-Value Tests
// =============================================================================

#[test]
fn test_key_value_round_trip() {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_key_value(0, b"zero").unwrap();
    writer.write_key_value(-17, b"").unwrap();
    writer.write_key_value(i64::MAX, b"max").unwrap();
    let bytes = writer.finish().unwrap();

    let mut reader = reader(bytes);
    let (k, v) = reader.read_key_value().unwrap().unwrap();
    assert_eq!((k, &v[..]), (0, &b"zero"[..]));
    let (k, v) = reader.read_key_value().unwrap().unwrap();
    assert_eq!((k, v.len()), (-17, 0));
    let (k, v) = reader.read_key_value().unwrap().unwrap();
    assert_eq!((k, &v[..]), (i64::MAX, &b"max"[..]));
    assert!(reader.read_key_value().unwrap().is_none());
}

#[test]
fn test_key_value_record_declares_key_plus_value() {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_key_value(1, b"abcd").unwrap();
    let bytes = writer.finish().unwrap();

    let declared = u32::from_le_bytes(bytes[..LENGTH_WIDTH].try_into().unwrap()) as usize;
    assert_eq!(declared, KEY_WIDTH + 4);
}

#[test]
fn test_record_shorter_than_key_is_rejected() {
    let bytes = write_records(&[b"abc"]);
    let err = reader(bytes).read_key_value().unwrap_err();
    assert!(matches!(err, DictError::Format { .. }));
}

#[test]
fn test_key_values_iterator_stops_after_error() {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_key_value(1, b"a").unwrap();
    writer.write_record(b"bad").unwrap();
    writer.write_key_value(2, b"b").unwrap();
    let bytes = writer.finish().unwrap();

    let results: Vec<_> = reader(bytes).key_values().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

// =============================================================================
// Metadata Tests
// =============================================================================

#[test]
fn test_metadata_record_is_json() {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_metadata(&Metadata::new(Compression::Xz)).unwrap();
    let bytes = writer.finish().unwrap();

    let json: serde_json::Value = serde_json::from_slice(&bytes[LENGTH_WIDTH..]).unwrap();
    assert_eq!(json["compression"], "xz");
}

#[test]
fn test_missing_metadata_record() {
    let err = reader(Vec::new()).read_metadata().unwrap_err();
    assert!(matches!(err, DictError::Format { .. }));
}

#[test]
fn test_metadata_not_utf8() {
    let bytes = write_records(&[&[0xff, 0xfe]]);
    let err = reader(bytes).read_metadata().unwrap_err();
    assert!(matches!(err, DictError::Format { .. }));
}

#[test]
fn test_metadata_not_json() {
    let bytes = write_records(&[b"compression=bz2"]);
    let err = reader(bytes).read_metadata().unwrap_err();
    assert!(matches!(err, DictError::Serialization(_)));
}

// =============================================================================
// File Tests
// =============================================================================

#[test]
fn test_file_writer_and_reader() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("records.bin");

    let mut writer = FileRecordWriter::create(&path, None).unwrap();
    writer.write_metadata(&Metadata::new(Compression::Gzip)).unwrap();
    writer.write_key_value(3, b"three").unwrap();
    writer.close().unwrap();

    let mut reader = FileRecordReader::open(&path).unwrap();
    assert_eq!(reader.read_metadata().unwrap().compression, Compression::Gzip);
    let (key, value) = reader.read_key_value().unwrap().unwrap();
    assert_eq!((key, &value[..]), (3, &b"three"[..]));
    assert!(reader.read_key_value().unwrap().is_none());
}

#[test]
fn test_enveloped_file_is_detected() {
    let temp = TempDir::new().unwrap();

    for compression in Compression::ALL {
        let path = temp.path().join(format!("records.{}", compression));

        let mut writer = FileRecordWriter::create(&path, Some(compression)).unwrap();
        writer.write_metadata(&Metadata::new(compression)).unwrap();
        writer.write_key_value(1, b"one").unwrap();
        writer.close().unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert!(raw.starts_with(compression.magic()));

        let mut reader = FileRecordReader::open(&path).unwrap();
        assert_eq!(reader.read_metadata().unwrap().compression, compression);
        let (key, value) = reader.read_key_value().unwrap().unwrap();
        assert_eq!((key, &value[..]), (1, &b"one"[..]));
    }
}

#[test]
fn test_open_missing_file_names_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope.bin");

    let err = FileRecordReader::open(&path).err().unwrap();
    match err {
        DictError::Open { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected open error, got {other:?}"),
    }
}

#[test]
fn test_metadata_length_never_reads_as_envelope() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("padded.bin");

    // Size the metadata so its length prefix starts with the gzip magic 1f 8b
    let mut metadata = Metadata::new(Compression::Gzip);
    metadata.extra.insert("pad".to_string(), serde_json::json!(""));
    let base = metadata.to_bytes().unwrap().len();
    let pad = "x".repeat(0x8b1f - base);
    metadata.extra.insert("pad".to_string(), serde_json::json!(pad));
    assert_eq!(metadata.to_bytes().unwrap().len(), 0x8b1f);

    let mut writer = FileRecordWriter::create(&path, None).unwrap();
    writer.write_metadata(&metadata).unwrap();
    writer.write_key_value(4, b"four").unwrap();
    writer.close().unwrap();

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(Compression::detect(&raw), None);

    let mut reader = FileRecordReader::open(&path).unwrap();
    assert_eq!(reader.read_metadata().unwrap(), metadata);
    let (key, value) = reader.read_key_value().unwrap().unwrap();
    assert_eq!((key, &value[..]), (4, &b"four"[..]));
}
