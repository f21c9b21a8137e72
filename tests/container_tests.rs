//! Container integration tests: write/read round trips, write-once
//! conflicts, multi-object containers, and format normalization.

use tempfile::TempDir;

use sscdf::{
    Array, Compression, DType, Matrix, NativeFormat, Reader, Scalar, ScalarValue, SscdfError,
    StorageFormat, Tensor, Vector, WriteOptions, Writer,
};

fn sample_matrix() -> Tensor {
    Tensor::Matrix(
        Matrix::from_entries(
            6,
            6,
            vec![0, 3, 4, 4],
            vec![1, 4, 2, 3],
            Array::Float64(vec![1.0, 2.0, -3.0, 4.0]),
        )
        .unwrap(),
    )
}

fn sample_vector() -> Tensor {
    Tensor::Vector(
        Vector::from_entries(6, vec![0, 2, 4], Array::Int16(vec![1, 2, -3])).unwrap(),
    )
}

#[test]
fn test_write_read() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test1.sscdf");
    let m = sample_matrix();

    sscdf::write(&path, &m, Some("created from test_write_read")).unwrap();
    let back = sscdf::read(&path).unwrap();
    assert_eq!(back, m);

    let meta = sscdf::info(&path, None).unwrap();
    assert_eq!(meta.comment.as_deref(), Some("created from test_write_read"));
}

#[test]
fn test_write_read_no_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test2");
    let with_ext = temp.path().join("test2.sscdf");
    let m = sample_matrix();

    sscdf::write(&path, &m, None).unwrap();
    assert!(with_ext.exists());
    assert!(!path.exists());

    // Reading through the extension-less path resolves to the suffixed file
    let back = sscdf::read(&path).unwrap();
    assert_eq!(back, m);
}

#[test]
fn test_multiwrite_multiread() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test3.sscdf");
    let m = sample_matrix();
    let v = sample_vector();

    let mut writer = Writer::create(&path).unwrap();
    writer
        .write_with(&m, &WriteOptions::default().comment("primary object"))
        .unwrap();
    writer
        .write_named_with(
            &v,
            "row_degree",
            &WriteOptions::default().comment("simply the row degrees"),
        )
        .unwrap();
    writer.close().unwrap();

    let reader = Reader::open(&path).unwrap();
    assert_eq!(reader.read(None).unwrap(), m);
    let named = reader.read(Some("row_degree")).unwrap();
    assert_eq!(named, v);
    assert_eq!(named.name(), Some("row_degree"));
}

#[test]
fn test_iso_via_memory_buffer() {
    let m = Tensor::Matrix(
        Matrix::from_entries(
            6,
            6,
            vec![0, 3, 4, 4],
            vec![1, 4, 2, 3],
            Array::Float64(vec![1.0, 1.0, 1.0, 1.0]),
        )
        .unwrap(),
    );

    let mut writer = Writer::in_memory();
    writer
        .write_with(&m, &WriteOptions::default().comment("should be iso-valued"))
        .unwrap();
    let bytes = writer.finish().unwrap();

    let reader = Reader::from_bytes(&bytes).unwrap();
    let meta = reader.info(None).unwrap();
    assert_eq!(meta.iso_value, Some(ScalarValue::Float(1.0)));
    assert_eq!(reader.read(None).unwrap(), m);
}

#[test]
fn test_bool_dtype() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test5.sscdf");
    let m = Tensor::Matrix(
        Matrix::from_entries(4, 3, vec![0, 3], vec![1, 2], Array::Bool(vec![true, false]))
            .unwrap(),
    );

    sscdf::write(&path, &m, None).unwrap();
    let meta = sscdf::info(&path, None).unwrap();
    assert_eq!(meta.data_types["values"], DType::Bool);
    assert_eq!(sscdf::read(&path).unwrap(), m);
}

#[test]
fn test_empty_matrix_roundtrip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("empty.sscdf");
    let m = Tensor::Matrix(Matrix::new(5, 7, DType::Float32));

    sscdf::write(&path, &m, None).unwrap();
    let back = sscdf::read(&path).unwrap();
    assert_eq!(back, m);
    match back {
        Tensor::Matrix(m) => {
            assert_eq!(m.nvals(), 0);
            assert_eq!((m.nrows(), m.ncols()), (5, 7));
            assert_eq!(m.dtype(), DType::Float32);
        }
        other => panic!("expected a matrix, got {other:?}"),
    }
}

#[test]
fn test_scalar_roundtrips() {
    let temp = TempDir::new().unwrap();

    let path = temp.path().join("scalar.sscdf");
    let s = Tensor::Scalar(Scalar::new(DType::Float64, ScalarValue::Float(5.0)));
    sscdf::write(&path, &s, None).unwrap();
    let meta = sscdf::info(&path, None).unwrap();
    assert_eq!(meta.format, StorageFormat::Scalar);
    assert_eq!(sscdf::read(&path).unwrap(), s);

    let path = temp.path().join("scalar_empty.sscdf");
    let s = Tensor::Scalar(Scalar::new_empty(DType::Int32));
    sscdf::write(&path, &s, None).unwrap();
    let meta = sscdf::info(&path, None).unwrap();
    assert_eq!(meta.format, StorageFormat::ScalarEmpty);
    assert_eq!(meta.data_types["values"], DType::Int32);
    assert_eq!(sscdf::read(&path).unwrap(), s);
}

#[test]
fn test_primary_is_write_once() {
    let mut writer = Writer::in_memory();
    writer.write(&sample_matrix()).unwrap();
    let err = writer.write(&sample_vector()).unwrap_err();
    assert!(matches!(err, SscdfError::PrimaryAlreadyWritten));

    // The conflict leaves the container in its prior valid state
    let bytes = writer.finish().unwrap();
    let reader = Reader::from_bytes(&bytes).unwrap();
    assert_eq!(reader.read(None).unwrap(), sample_matrix());
}

#[test]
fn test_secondary_names_are_unique() {
    let mut writer = Writer::in_memory();
    writer.write_named(&sample_matrix(), "x").unwrap();
    let err = writer.write_named(&sample_vector(), "x").unwrap_err();
    assert!(matches!(err, SscdfError::DuplicateName(name) if name == "x"));

    let bytes = writer.finish().unwrap();
    let reader = Reader::from_bytes(&bytes).unwrap();
    assert_eq!(reader.read(Some("x")).unwrap(), sample_matrix());
}

#[test]
fn test_multi_object_container() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("multi.sscdf");

    let mut writer = Writer::create(&path).unwrap();
    writer
        .write_with(&sample_matrix(), &WriteOptions::default().comment("the graph"))
        .unwrap();
    writer
        .write_named_with(&sample_vector(), "b", &WriteOptions::default().comment("b notes"))
        .unwrap();
    writer.write_named(&sample_vector(), "a").unwrap();
    writer
        .write_named(
            &Tensor::Scalar(Scalar::new(DType::Int64, ScalarValue::Int(3))),
            "c",
        )
        .unwrap();
    writer.close().unwrap();

    let names = sscdf::list_secondary(&path).unwrap();
    assert_eq!(names, vec!["a", "b", "c"]);

    // Each object's metadata is its own
    let primary = sscdf::info(&path, None).unwrap();
    assert_eq!(primary.comment.as_deref(), Some("the graph"));
    let b = sscdf::info(&path, Some("b")).unwrap();
    assert_eq!(b.comment.as_deref(), Some("b notes"));
    let a = sscdf::info(&path, Some("a")).unwrap();
    assert_eq!(a.comment, None);
    let c = sscdf::info(&path, Some("c")).unwrap();
    assert_eq!(c.format, StorageFormat::Scalar);
}

#[test]
fn test_bitmap_variant_normalizes_to_csr() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bitmap.sscdf");
    let m = Matrix::from_entries(
        4,
        4,
        vec![0, 1, 3],
        vec![2, 0, 3],
        Array::Float32(vec![0.5, 1.5, 2.5]),
    )
    .unwrap()
    .with_format(NativeFormat::BitmapR)
    .unwrap();
    let m = Tensor::Matrix(m);

    sscdf::write(&path, &m, None).unwrap();
    let meta = sscdf::info(&path, None).unwrap();
    assert_eq!(meta.format, StorageFormat::Csr);
    // Logical content survives even though the native variant does not
    assert_eq!(sscdf::read(&path).unwrap(), m);
}

#[test]
fn test_named_write_with_format_hint() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("hyper.sscdf");
    let m = sample_matrix();

    sscdf::write_named(&path, &m, "h", None, Some(NativeFormat::HyperCsr)).unwrap();
    let meta = sscdf::info(&path, Some("h")).unwrap();
    assert_eq!(meta.format, StorageFormat::Dcsr);
    assert_eq!(sscdf::read_named(&path, "h").unwrap(), m);
}

#[test]
fn test_compressed_variables_roundtrip() {
    let m = Tensor::Matrix(
        Matrix::from_entries(
            100,
            100,
            (0..100).collect(),
            (0..100).rev().collect(),
            Array::Int64((0..100).collect()),
        )
        .unwrap(),
    );

    let mut writer = Writer::in_memory();
    writer
        .write_with(&m, &WriteOptions::default().compression(Compression::Zstd))
        .unwrap();
    let bytes = writer.finish().unwrap();
    assert_eq!(Reader::from_bytes(&bytes).unwrap().read(None).unwrap(), m);
}

#[test]
fn test_missing_name_reported() {
    let mut writer = Writer::in_memory();
    writer.write(&sample_matrix()).unwrap();
    let bytes = writer.finish().unwrap();
    let reader = Reader::from_bytes(&bytes).unwrap();
    let err = reader.read(Some("absent")).unwrap_err();
    assert!(matches!(err, SscdfError::NameNotFound(name) if name == "absent"));
}

#[test]
fn test_truncated_file_rejected() {
    let mut writer = Writer::in_memory();
    writer.write(&sample_matrix()).unwrap();
    let mut bytes = writer.finish().unwrap();
    bytes.truncate(bytes.len() - 2);
    assert!(matches!(
        Reader::from_bytes(&bytes),
        Err(SscdfError::ChecksumMismatch)
    ));
}

#[test]
fn test_matrix_roundtrip_per_format_and_dtype() {
    for format in [
        NativeFormat::Csr,
        NativeFormat::Csc,
        NativeFormat::HyperCsr,
        NativeFormat::HyperCsc,
        NativeFormat::CooR,
        NativeFormat::CooC,
    ] {
        for values in [
            Array::UInt8(vec![1, 2, 3]),
            Array::Int64(vec![-1, 2, -3]),
            Array::Float32(vec![0.5, -0.5, 2.0]),
        ] {
            let m = Tensor::Matrix(
                Matrix::from_entries(8, 5, vec![0, 2, 7], vec![4, 0, 1], values).unwrap(),
            );
            let mut writer = Writer::in_memory();
            writer
                .write_with(&m, &WriteOptions::default().format(format))
                .unwrap();
            let bytes = writer.finish().unwrap();
            let back = Reader::from_bytes(&bytes).unwrap().read(None).unwrap();
            assert_eq!(back, m, "round trip via {}", format.name());
        }
    }
}
