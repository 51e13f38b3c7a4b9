use nalgebra::DMatrix;
use smallvec::SmallVec;

/// A linear map on length-T sequences of the form `sum_k c_k * S_k`, where
/// `(S_k x)_t = x_{t+k}`.
///
/// Indices that fall outside `[0, T)` contribute nothing: before period 0 and
/// after period T-1 every variable sits at its steady state, which is a zero
/// deviation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftOperator {
    terms: SmallVec<[(i32, f64); 4]>,
}

impl ShiftOperator {
    pub fn new() -> Self { Self::default() }

    /// Adds `coef * S_offset`, merging with an existing term at the same offset.
    pub fn add_term(&mut self, offset: i32, coef: f64) {
        match self.terms.iter_mut().find(|(k, _)| *k == offset) {
            Some((_, c)) => *c += coef,
            None => self.terms.push((offset, coef)),
        }
    }

    pub fn terms(&self) -> &[(i32, f64)] { &self.terms }

    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        let n = x.len() as i64;
        let mut out = vec![0.0; x.len()];
        for &(k, c) in &self.terms {
            for (t, o) in out.iter_mut().enumerate() {
                let s = t as i64 + k as i64;
                if (0..n).contains(&s) {
                    *o += c * x[s as usize];
                }
            }
        }
        out
    }

    /// `dest += self * src`, row-wise on a T×m sensitivity matrix.
    pub fn accumulate(&self, src: &DMatrix<f64>, dest: &mut DMatrix<f64>) {
        for &(k, c) in &self.terms {
            if c != 0.0 {
                shift_accumulate(dest, src, k, c);
            }
        }
    }

    pub fn to_dense(&self, horizon: usize) -> DMatrix<f64> {
        let mut m = DMatrix::zeros(horizon, horizon);
        let n = horizon as i64;
        for &(k, c) in &self.terms {
            for t in 0..n {
                let s = t + k as i64;
                if (0..n).contains(&s) {
                    m[(t as usize, s as usize)] += c;
                }
            }
        }
        m
    }
}

/// `dest[t, :] += coef * src[t + offset, :]` for every row where `t + offset` is in range.
#[inline]
pub fn shift_accumulate(dest: &mut DMatrix<f64>, src: &DMatrix<f64>, offset: i32, coef: f64) {
    let rows = src.nrows() as i64;
    let lo = (-(offset as i64)).max(0);
    let hi = (rows - offset as i64).min(rows);
    if lo >= hi {
        return;
    }
    // Column-major storage: walk each column's contiguous slice.
    for j in 0..src.ncols() {
        let s_col = src.column(j);
        let mut d_col = dest.column_mut(j);
        for t in lo..hi {
            let t = t as usize;
            let s = (t as i64 + offset as i64) as usize;
            d_col[t] += coef * s_col[s];
        }
    }
}
