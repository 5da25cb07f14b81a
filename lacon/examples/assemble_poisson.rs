use std::time::Instant;

use lacon::{
    Container, CsrMatrix, EigenSolver, EigenSolverOptions, EigenSolverType, Matrix,
    SparseMatrixOptions, SparsityPattern,
};

const CELLS: usize = 12;
const THREADS: usize = 4;

/// Assemble a 1D Poisson stiffness matrix from per-cell contributions,
/// split across threads, then inspect its spectrum.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let nodes = CELLS + 1;
    let mut pattern = SparsityPattern::new(nodes);
    for cell in 0..CELLS {
        for a in cell..=cell + 1 {
            for b in cell..=cell + 1 {
                pattern.insert(a, b)?;
            }
        }
    }
    pattern.sort();

    let options = SparseMatrixOptions::default().with_num_mutexes(THREADS);
    let mut stiffness = CsrMatrix::<f64>::from_pattern(nodes, nodes, &pattern, &options)?;
    println!(
        "Pattern: {} nodes, {} stored entries, {} mutexes",
        nodes,
        stiffness.non_zeros(),
        stiffness.num_mutexes()
    );

    let start_time = Instant::now();
    {
        let writer = stiffness.concurrent_writer();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|thread| {
                    let writer = &writer;
                    scope.spawn(move || -> lacon::Result<()> {
                        // neighbouring cells share a node, so rows overlap between threads
                        for cell in (thread..CELLS).step_by(THREADS) {
                            let local = [[1.0, -1.0], [-1.0, 1.0]];
                            for (i, row) in local.iter().enumerate() {
                                for (j, &value) in row.iter().enumerate() {
                                    writer.add_to_entry(cell + i, cell + j, value)?;
                                }
                            }
                        }
                        Ok(())
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().map_err(|_| "assembly thread panicked"))
                .try_for_each(|outcome| -> Result<(), Box<dyn std::error::Error>> {
                    outcome?.map_err(Into::into)
                })
        })?;
    }
    println!("Assembled in {:?}", start_time.elapsed());

    // Dirichlet conditions on both ends
    let mut constrained = stiffness.clone();
    constrained.unit_row(0)?;
    constrained.unit_row(nodes - 1)?;
    constrained.unit_col(0)?;
    constrained.unit_col(nodes - 1)?;
    println!(
        "Unconstrained copy untouched: K[0][0] = {}, constrained: {}",
        stiffness.get_entry(0, 0)?,
        constrained.get_entry(0, 0)?
    );

    let ones = vec![1.0; nodes];
    let residual = stiffness.mv(&ones)?;
    println!("K * 1 has sup norm {:.3e}", residual.iter().fold(0.0f64, |m, v| m.max(v.abs())));

    let solver = EigenSolver::new(
        &constrained.to_dense(),
        EigenSolverOptions::default().with_solver_type(EigenSolverType::Symmetric),
    )?;
    let mut spectrum = solver.real_eigenvalues(1e-12)?;
    spectrum.sort_by(f64::total_cmp);
    println!("Smallest eigenvalues: {:?}", &spectrum[..3]);
    println!("Largest eigenvalue: {:.6}", spectrum[spectrum.len() - 1]);

    let mut doubled = constrained.copy();
    doubled.scal(2.0);
    println!("|2K|_sup = {}", doubled.sup_norm());

    Ok(())
}
