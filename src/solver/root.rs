//! Bracketed scalar root finding for implicit blocks.

const MAX_ITER: usize = 200;
const SCAN_INTERVALS: usize = 64;

/// Brent's method on `[lo, hi]`. Requires `f(lo)` and `f(hi)` of opposite
/// sign (or one of them zero); returns `None` otherwise.
pub fn brent<F: FnMut(f64) -> f64>(mut f: F, lo: f64, hi: f64, tol: f64) -> Option<f64> {
    let (mut a, mut b) = (lo, hi);
    let (mut fa, mut fb) = (f(a), f(b));
    if !fa.is_finite() || !fb.is_finite() {
        return None;
    }
    if fa == 0.0 {
        return Some(a);
    }
    if fb == 0.0 {
        return Some(b);
    }
    if fa.signum() == fb.signum() {
        return None;
    }

    let (mut c, mut fc) = (b, fb);
    let (mut d, mut e) = (b - a, b - a);
    for _ in 0..MAX_ITER {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Some(b);
        }
        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // Inverse quadratic interpolation, or secant when only two points differ.
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let qa = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0)),
                    (qa - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
        fb = f(b);
        if !fb.is_finite() {
            return None;
        }
    }
    None
}

/// A sub-interval of `[lo, hi]` on which `f` changes sign.
///
/// The endpoints are tried first. If they fail (same sign or non-finite, as
/// with a log of a negative trial), the interval is split and the finite
/// sign change nearest `guess` wins.
pub fn find_bracket<F: FnMut(f64) -> f64>(mut f: F, lo: f64, hi: f64, guess: f64) -> Option<(f64, f64)> {
    let (flo, fhi) = (f(lo), f(hi));
    if flo.is_finite() && fhi.is_finite() && flo.signum() != fhi.signum() {
        return Some((lo, hi));
    }

    let width = (hi - lo) / SCAN_INTERVALS as f64;
    let mut best: Option<(f64, f64)> = None;
    let mut prev = (lo, flo);
    for k in 1..=SCAN_INTERVALS {
        let x = if k == SCAN_INTERVALS { hi } else { lo + width * k as f64 };
        let fx = f(x);
        let (px, pf) = prev;
        if pf.is_finite() && fx.is_finite() && (pf == 0.0 || pf.signum() != fx.signum()) {
            let mid = 0.5 * (px + x);
            let closer = best.map_or(true, |(a, b)| (mid - guess).abs() < (0.5 * (a + b) - guess).abs());
            if closer {
                best = Some((px, x));
            }
        }
        prev = (x, fx);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 2.0, 2f64.sqrt())]
    #[case(-3.0, 0.0, -(2f64.sqrt()))]
    fn test_brent_finds_square_root(#[case] lo: f64, #[case] hi: f64, #[case] expected: f64) {
        let root = brent(|x| x * x - 2.0, lo, hi, 1e-14).unwrap();
        assert_relative_eq!(root, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_brent_rejects_unbracketed() {
        assert!(brent(|x| x * x + 1.0, -1.0, 1.0, 1e-12).is_none());
    }

    #[test]
    fn test_scan_skips_non_finite_endpoints() {
        // ln is NaN below zero, so the left endpoint is unusable.
        let f = |x: f64| x.ln();
        let (a, b) = find_bracket(f, -10.0, 10.0, 1.0).unwrap();
        assert!(a <= 1.0 && 1.0 <= b);
        let root = brent(f, a, b, 1e-14).unwrap();
        assert_relative_eq!(root, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scan_prefers_root_nearest_guess() {
        // Roots at -2 and 2; same sign at both ends.
        let f = |x: f64| x * x - 4.0;
        let (a, b) = find_bracket(f, -5.0, 5.0, 1.5).unwrap();
        assert!(a <= 2.0 && 2.0 <= b);
        let (a, b) = find_bracket(f, -5.0, 5.0, -1.5).unwrap();
        assert!(a <= -2.0 && -2.0 <= b);
    }
}
