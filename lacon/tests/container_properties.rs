use lacon::{
    Container, CscMatrix, CsrMatrix, DenseMatrix, DenseVector, LaError, Matrix,
    SparseMatrixOptions, SparseVector, SparsityPattern, Vector,
};

fn laplacian(size: usize) -> CsrMatrix<f64> {
    let mut pattern = SparsityPattern::new(size);
    for row in 0..size {
        pattern.insert(row, row).unwrap();
        if row > 0 {
            pattern.insert(row, row - 1).unwrap();
        }
        if row + 1 < size {
            pattern.insert(row, row + 1).unwrap();
        }
    }
    pattern.sort();

    let mut matrix = CsrMatrix::from_pattern(size, size, &pattern, &SparseMatrixOptions::default())
        .unwrap();
    for row in 0..size {
        matrix.set_entry(row, row, 2.0).unwrap();
        if row > 0 {
            matrix.set_entry(row, row - 1, -1.0).unwrap();
        }
        if row + 1 < size {
            matrix.set_entry(row, row + 1, -1.0).unwrap();
        }
    }
    matrix
}

#[test]
fn test_copy_is_independent() {
    let original = laplacian(5);
    let mut copy = original.copy();
    copy.set_entry(2, 2, 10.0).unwrap();
    copy.scal(3.0);
    assert_eq!(original.get_entry(2, 2).unwrap(), 2.0);
    assert_eq!(copy.get_entry(2, 2).unwrap(), 30.0);

    let mut original = original;
    original.add_to_entry(0, 0, 1.0).unwrap();
    assert_eq!(copy.get_entry(0, 0).unwrap(), 6.0);

    let dense = DenseVector::from_vec(vec![1.0, 2.0]).unwrap();
    let mut dense_copy = dense.copy();
    dense_copy.set_entry(0, 5.0).unwrap();
    assert_eq!(dense.get_entry(0).unwrap(), 1.0);
}

#[test]
fn test_clone_behaves_like_deep_copy() {
    let mut a = laplacian(4);
    let b = a.clone();
    let c = b.clone();
    a.scal(2.0);
    assert_eq!(b.to_dense(), laplacian(4).to_dense());
    assert_eq!(a.get_entry(1, 0).unwrap(), -2.0);

    let mut d = c.clone();
    d.clear_row(1).unwrap();
    assert_eq!(c.get_entry(1, 1).unwrap(), 2.0);
    assert_eq!(b, c);

    let mut v = SparseVector::from_entries(3, [(0, 1.0)]).unwrap();
    let w = v.clone();
    v.scal(4.0);
    assert_eq!(w.get_entry(0).unwrap(), 1.0);
}

#[test]
fn test_compressed_shape_invariant() {
    let m = laplacian(6);
    let pointers = m.row_pointers();
    assert_eq!(pointers[0], 0);
    assert_eq!(pointers[m.rows()], m.entries().len());
    assert_eq!(m.entries().len(), m.column_indices().len());
    for row in 0..m.rows() {
        let slice = &m.column_indices()[pointers[row]..pointers[row + 1]];
        assert!(slice.windows(2).all(|pair| pair[0] < pair[1]));
    }

    let csc = m.convert::<lacon::Csc>();
    let pointers = csc.column_pointers();
    assert_eq!(pointers[csc.cols()], csc.row_indices().len());
}

#[test]
fn test_pattern_closure() {
    let pattern = SparsityPattern::from_rows(vec![vec![0, 2], vec![1], vec![]]);
    let mut csr = CsrMatrix::from_pattern(3, 3, &pattern, &Default::default()).unwrap();
    let mut csc = CscMatrix::from_pattern(3, 3, &pattern, &Default::default()).unwrap();
    for row in 0..3 {
        for col in 0..3 {
            let in_pattern = pattern.contains(row, col);
            assert_eq!(csr.set_entry(row, col, 1.0).is_ok(), in_pattern);
            let result = csc.set_entry(row, col, 1.0);
            if in_pattern {
                assert!(result.is_ok());
            } else {
                assert!(matches!(result, Err(LaError::IndexOutOfRange(_))));
            }
        }
    }
    assert_eq!(csr.non_zeros(), 3);
    assert_eq!(csr.to_dense(), csc.to_dense());
}

#[test]
fn test_mv_mtv_diagonal_and_asymmetric() {
    let diagonal = CsrMatrix::<f64>::from_matrix(
        &[[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 4.0]],
        &SparseMatrixOptions::default().with_pruning(true),
    )
    .unwrap();
    assert_eq!(diagonal.mv(&[1.0, 1.0, 1.0]).unwrap(), vec![2.0, 3.0, 4.0]);
    assert_eq!(diagonal.mtv(&[1.0, 1.0, 1.0]).unwrap(), vec![2.0, 3.0, 4.0]);

    let source = [[1.0, 5.0, 0.0], [0.0, 2.0, 0.0], [7.0, 0.0, 3.0]];
    let options = SparseMatrixOptions::default().with_pruning(true);
    let csr = CsrMatrix::<f64>::from_matrix(&source, &options).unwrap();
    let csc = CscMatrix::<f64>::from_matrix(&source, &options).unwrap();
    let dense = DenseMatrix::<f64>::from_matrix(&source).unwrap();
    let x = DenseVector::from_vec(vec![1.0, -1.0, 2.0]).unwrap();

    let expected_mv = vec![-4.0, -2.0, 13.0];
    let expected_mtv = vec![15.0, 3.0, 6.0];
    assert_eq!(csr.mv(&x).unwrap(), expected_mv);
    assert_eq!(csc.mv(&x).unwrap(), expected_mv);
    assert_eq!(dense.mv(&x).unwrap(), expected_mv);
    assert_eq!(csr.mtv(&x).unwrap(), expected_mtv);
    assert_eq!(csc.mtv(&x).unwrap(), expected_mtv);
    assert_eq!(dense.mtv(&x).unwrap(), expected_mtv);
}

#[test]
fn test_unit_row_idempotent() {
    let mut once = laplacian(5);
    once.unit_row(2).unwrap();
    let mut twice = once.copy();
    twice.unit_row(2).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.get_entry(2, 1).unwrap(), 0.0);
    assert_eq!(once.get_entry(2, 2).unwrap(), 1.0);

    let mut column = laplacian(5).convert::<lacon::Csc>();
    column.unit_col(0).unwrap();
    column.unit_col(0).unwrap();
    assert_eq!(column.get_entry(1, 0).unwrap(), 0.0);
    assert_eq!(column.get_entry(0, 0).unwrap(), 1.0);
}

#[test]
fn test_pruning_round_trip() {
    let source = DenseMatrix::from_rows(&[
        vec![1.5, 0.0, -2.0],
        vec![0.0, 0.0, 4.0],
        vec![1e-18, 3.0, 0.0],
    ])
    .unwrap();
    let options = SparseMatrixOptions::default().with_pruning(true);
    let sparse = CsrMatrix::<f64>::from_matrix(&source, &options).unwrap();
    assert!(sparse.non_zeros() < source.rows() * source.cols());
    assert_eq!(sparse.non_zeros(), 4);

    let exported = sparse.to_dense();
    for (row, col, value) in sparse.stored_entries() {
        assert_eq!(value, source.get_entry(row, col).unwrap());
    }
    for row in 0..3 {
        for col in 0..3 {
            if sparse.find_entry_index(row, col).is_none() {
                assert_eq!(exported.get_entry(row, col).unwrap(), 0.0);
            }
        }
    }

    let unpruned = CsrMatrix::<f64>::from_matrix(&source, &SparseMatrixOptions::default()).unwrap();
    assert_eq!(unpruned.non_zeros(), 9);
    let strict = SparseMatrixOptions::default().with_pruning(true).with_epsilon(1e-20);
    assert_eq!(CscMatrix::<f64>::from_matrix(&source, &strict).unwrap().non_zeros(), 5);
}

#[test]
fn test_shape_errors() {
    let mut a = laplacian(3);
    let b = laplacian(4);
    assert!(!a.has_equal_shape(&b));
    assert!(matches!(a.axpy(1.0, &b), Err(LaError::ShapeMismatch(_))));
    assert!(matches!(a.add(&b), Err(LaError::ShapeMismatch(_))));

    let mut v = DenseVector::<f64>::zeros(3).unwrap();
    let w = DenseVector::<f64>::zeros(2).unwrap();
    assert!(matches!(v.iadd(&w), Err(LaError::ShapeMismatch(_))));
    assert!(v.dot(&w).is_err());
}
