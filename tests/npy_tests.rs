//! Tests for save/load
//!
//! These tests verify:
//! - Round trips for every dtype and a range of shapes
//! - Column-major arrays reload with their logical shape and layout
//! - Payloads written in the opposite byte order are swapped on load
//! - Empty arrays, unopened streams and non-CPU devices are rejected
//! - Headers whose shape overflows the address space are rejected
//! - File helpers and chunked payload reads

use std::sync::Arc;

use npyio::format::{encode_preamble, Header};
use npyio::io::{FileWriter, MemoryReader, ParallelFileReader, Writer};
use npyio::{
    load, load_file, load_file_with_config, save, save_file, ArrayValue, ByteOrder, Device, Dtype,
    HostArray, Layout, NpyError, ReaderConfig,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn save_to_vec(array: &HostArray) -> Vec<u8> {
    let mut out = Vec::new();
    save(&mut out, array).unwrap();
    out
}

fn load_from_vec(bytes: Vec<u8>) -> npyio::Result<npyio::PendingArray> {
    load(Arc::new(MemoryReader::new(bytes)), Device::Cpu)
}

fn patterned(dtype: Dtype, shape: Vec<usize>) -> HostArray {
    let len = shape.iter().product::<usize>() * dtype.size();
    let data: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
    HostArray::from_bytes(dtype, shape, Layout::RowMajor, data).unwrap()
}

fn opposite_order() -> ByteOrder {
    match ByteOrder::native() {
        ByteOrder::Little => ByteOrder::Big,
        ByteOrder::Big => ByteOrder::Little,
    }
}

/// File bytes whose header declares the non-host byte order
fn foreign_file(dtype: Dtype, shape: Vec<usize>, payload: &[u8]) -> Vec<u8> {
    let header = Header {
        dtype,
        byte_order: opposite_order(),
        layout: Layout::RowMajor,
        shape,
    };
    let (_, mut bytes) = encode_preamble(&header).unwrap();
    bytes.extend_from_slice(payload);
    bytes
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_every_dtype_and_shape() {
    let shapes: Vec<Vec<usize>> = vec![
        vec![],
        vec![1],
        vec![17],
        vec![3, 4],
        vec![2, 3, 4, 5],
        vec![1, 1, 1, 1, 1, 1, 2],
    ];

    for dtype in Dtype::ALL {
        for shape in &shapes {
            let array = patterned(dtype, shape.clone());
            let pending = load_from_vec(save_to_vec(&array)).unwrap();

            assert_eq!(pending.dtype(), dtype);
            assert_eq!(pending.shape(), *shape);
            assert_eq!(pending.layout(), Layout::RowMajor);
            assert!(!pending.node().swap_endianness);
            assert_eq!(pending.resolve().unwrap(), array);
        }
    }
}

#[test]
fn test_typed_round_trip() {
    let values: Vec<f32> = (0..12).map(|i| i as f32 * 0.5 - 2.0).collect();
    let array = HostArray::from_slice(&values, vec![3, 4]).unwrap();

    let loaded = load_from_vec(save_to_vec(&array)).unwrap().resolve().unwrap();
    assert_eq!(loaded.to_vec::<f32>().unwrap(), values);
}

#[test]
fn test_payload_offset_is_aligned() {
    let array = patterned(Dtype::Int16, vec![5, 5]);
    let bytes = save_to_vec(&array);
    let pending = load_from_vec(bytes.clone()).unwrap();

    let offset = pending.node().offset as usize;
    assert_eq!(offset % 16, 0);
    assert_eq!(bytes.len() - offset, array.nbytes());
    assert_eq!(&bytes[offset..], array.data());
}

#[test]
fn test_round_trip_across_version_switch() {
    // Enough dimensions to push the header past the 16-bit length field
    let mut shape = vec![1usize; 22_000];
    shape[0] = 2;
    let array = patterned(Dtype::Float32, shape.clone());

    let bytes = save_to_vec(&array);
    assert_eq!(bytes[6], 2);

    let pending = load_from_vec(bytes).unwrap();
    assert_eq!(pending.shape(), shape);
    assert_eq!(pending.resolve().unwrap(), array);
}

// =============================================================================
// Column-Major Tests
// =============================================================================

#[test]
fn test_column_major_round_trip() {
    let values: Vec<i32> = (0..24).collect();
    let row_major = HostArray::from_slice(&values, vec![2, 3, 4]).unwrap();
    let col_major = row_major.to_column_major();

    let bytes = save_to_vec(&col_major);
    let text = String::from_utf8_lossy(&bytes[10..]);
    assert!(text.contains("'fortran_order': True"));
    assert!(text.contains("'shape': (2, 3, 4, )"));

    let pending = load_from_vec(bytes).unwrap();
    assert_eq!(pending.shape(), vec![2, 3, 4]);
    assert_eq!(pending.storage_shape(), &[4, 3, 2]);
    assert_eq!(pending.layout(), Layout::ColumnMajor);

    let loaded = pending.resolve().unwrap();
    assert_eq!(loaded, col_major);
    assert_eq!(loaded.to_row_major(), row_major);
}

#[test]
fn test_column_major_storage_order() {
    let row_major = HostArray::from_slice(&[1i32, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
    let col_major = row_major.to_column_major();

    assert_eq!(col_major.to_vec::<i32>().unwrap(), vec![1, 4, 2, 5, 3, 6]);
    assert_eq!(col_major.contiguous(false).unwrap(), row_major);
    assert_eq!(col_major.contiguous(true).unwrap(), col_major);
}

// =============================================================================
// Byte Order Tests
// =============================================================================

#[test]
fn test_foreign_byte_order_is_swapped() {
    let values: Vec<i32> = vec![1, -2, 300_000, i32::MIN, i32::MAX];
    let payload: Vec<u8> = values
        .iter()
        .flat_map(|v| match opposite_order() {
            ByteOrder::Big => v.to_be_bytes(),
            ByteOrder::Little => v.to_le_bytes(),
        })
        .collect();

    let pending = load_from_vec(foreign_file(Dtype::Int32, vec![5], &payload)).unwrap();
    assert!(pending.node().swap_endianness);
    assert_eq!(pending.resolve().unwrap().to_vec::<i32>().unwrap(), values);
}

#[test]
fn test_foreign_complex_swaps_each_component() {
    let parts: Vec<f32> = vec![1.5, -2.25, 3.0, 4.75];
    let payload: Vec<u8> = parts
        .iter()
        .flat_map(|v| match opposite_order() {
            ByteOrder::Big => v.to_be_bytes(),
            ByteOrder::Little => v.to_le_bytes(),
        })
        .collect();
    let expected: Vec<u8> = parts.iter().flat_map(|v| v.to_ne_bytes()).collect();

    let pending = load_from_vec(foreign_file(Dtype::Complex64, vec![2], &payload)).unwrap();
    assert_eq!(&pending.resolve().unwrap().bytes()[..], &expected[..]);
}

#[test]
fn test_single_byte_types_never_swap() {
    let payload = vec![1u8, 2, 3, 4];
    let pending = load_from_vec(foreign_file(Dtype::UInt8, vec![4], &payload)).unwrap();

    assert!(!pending.node().swap_endianness);
    assert_eq!(&pending.resolve().unwrap().bytes()[..], &payload[..]);
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_empty_array_rejected_before_writing() {
    let array =
        HostArray::from_bytes(Dtype::Float32, vec![3, 0], Layout::RowMajor, Vec::new()).unwrap();
    let mut out = Vec::new();

    assert!(matches!(save(&mut out, &array), Err(NpyError::EmptyArray)));
    assert!(out.is_empty());
}

#[test]
fn test_load_rejects_non_cpu_device() {
    let bytes = save_to_vec(&patterned(Dtype::Int8, vec![4]));
    let result = load(Arc::new(MemoryReader::new(bytes)), Device::Gpu);

    assert!(matches!(result, Err(NpyError::DeviceUnsupported(Device::Gpu))));
}

#[test]
fn test_load_rejects_corrupted_files() {
    let bytes = save_to_vec(&patterned(Dtype::Float32, vec![2, 2]));

    let mut bad_magic = bytes.clone();
    bad_magic[3] = b'X';
    assert!(matches!(load_from_vec(bad_magic), Err(NpyError::BadMagic { .. })));

    let mut bad_version = bytes.clone();
    bad_version[6] = 3;
    assert!(matches!(
        load_from_vec(bad_version),
        Err(NpyError::UnsupportedVersion { version: 3, .. })
    ));
}

#[test]
fn test_load_rejects_overflowing_shapes() {
    let huge = usize::MAX / 2;
    let cases = [
        // Element count overflows
        (Dtype::UInt8, vec![huge, 4]),
        // Element count fits, byte size does not
        (Dtype::Float32, vec![huge]),
    ];

    for (dtype, shape) in cases {
        let header = Header::new(dtype, Layout::RowMajor, shape.clone());
        let (_, mut bytes) = encode_preamble(&header).unwrap();
        bytes.extend_from_slice(&[0u8; 16]);

        match load_from_vec(bytes) {
            Err(NpyError::HeaderParse { .. }) => {}
            other => panic!("Expected HeaderParse for {:?}, got {:?}", shape, other),
        }
    }
}

#[test]
fn test_host_array_rejects_overflowing_shape() {
    let shape = vec![usize::MAX, 2];
    let result = HostArray::from_bytes(Dtype::Int16, shape, Layout::RowMajor, Vec::<u8>::new());
    assert!(matches!(result, Err(NpyError::InvalidArray(_))));
}

#[test]
fn test_truncated_payload_fails_on_resolve() {
    let mut bytes = save_to_vec(&patterned(Dtype::Int64, vec![8]));
    bytes.truncate(bytes.len() - 3);

    let pending = load_from_vec(bytes).unwrap();
    assert!(matches!(pending.resolve(), Err(NpyError::Read(_))));
}

#[test]
fn test_unopened_streams_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let array = patterned(Dtype::Int8, vec![4]);

    let mut writer = FileWriter::open(temp_dir.path().join("no_such_dir").join("a.npy"));
    assert!(!writer.is_open());
    assert!(matches!(save(&mut writer, &array), Err(NpyError::StreamOpen { .. })));

    let reader = ParallelFileReader::open(temp_dir.path().join("missing.npy"));
    assert!(matches!(
        load(Arc::new(reader), Device::Cpu),
        Err(NpyError::StreamOpen { .. })
    ));
}

// =============================================================================
// File Tests
// =============================================================================

#[test]
fn test_save_file_appends_extension() {
    let temp_dir = TempDir::new().unwrap();
    let array = patterned(Dtype::UInt16, vec![4, 4]);

    let written = save_file(temp_dir.path().join("weights"), &array).unwrap();
    assert_eq!(written, temp_dir.path().join("weights.npy"));
    assert!(written.exists());

    let kept = save_file(temp_dir.path().join("bias.npy"), &array).unwrap();
    assert_eq!(kept, temp_dir.path().join("bias.npy"));

    let loaded = load_file(&written, Device::Cpu).unwrap().resolve().unwrap();
    assert_eq!(loaded, array);
}

#[test]
fn test_file_payload_read_in_chunks() {
    let temp_dir = TempDir::new().unwrap();
    let array = patterned(Dtype::Float32, vec![257, 129]);
    let path = save_file(temp_dir.path().join("big.npy"), &array).unwrap();

    let config = ReaderConfig::builder().batch_size(1000).build();
    let pending = load_file_with_config(&path, config, Device::Cpu).unwrap();

    assert_eq!(pending.nbytes(), 257 * 129 * 4);
    assert_eq!(pending.resolve().unwrap(), array);
}

#[test]
fn test_file_column_major_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let values: Vec<u32> = (0..60).collect();
    let array = HostArray::from_slice(&values, vec![3, 4, 5]).unwrap().to_column_major();
    let path = save_file(temp_dir.path().join("fortran"), &array).unwrap();

    let config = ReaderConfig::builder().batch_size(16).build();
    let pending = load_file_with_config(&path, config, Device::Cpu).unwrap();
    assert_eq!(pending.layout(), Layout::ColumnMajor);
    assert_eq!(pending.resolve().unwrap(), array);
}
