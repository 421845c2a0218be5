// Copyright 2026 Nomad Contributors
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Quadratic-model search: fits a full multivariate quadratic
//! `m(d) = f0 + g.d + 0.5 d^T H d` to the cached neighbors of the frame
//! center by least squares, then proposes the model's own minimizer as a
//! trial point — a lightweight stand-in for NOMAD's Sgtelib-backed
//! surrogate (out of scope, see the crate's design ledger).

use crate::eval::EvalPoint;
use crate::math::Point;
use crate::step::ModelStopType;

/// Proposes a trial point by fitting a quadratic surrogate of `f` around
/// `center` to `neighbors` and stepping to the surrogate's stationary
/// point, or `None` (with the reason) if too few neighbors are cached or
/// the fit is singular or non-convex.
pub fn generate(center: &EvalPoint, neighbors: &[EvalPoint]) -> (Option<Point>, ModelStopType) {
    if !center.is_eval_ok() {
        return (None, ModelStopType::NotEnoughPoints);
    }
    let n = center.point.size();
    let f0 = center.f().value_or(0.0);
    let n_quad = n * (n + 1) / 2;
    let p = n + n_quad;

    let samples: Vec<(Vec<f64>, f64)> = neighbors
        .iter()
        .filter(|ep| ep.is_eval_ok())
        .filter_map(|ep| {
            let d: Vec<f64> = (0..n).map(|i| ep.point[i].value_or(0.0) - center.point[i].value_or(0.0)).collect();
            if d.iter().all(|&di| di.abs() < 1e-12) {
                return None;
            }
            Some((d, ep.f().value_or(f64::INFINITY) - f0))
        })
        .collect();

    if samples.len() < p {
        return (None, ModelStopType::NotEnoughPoints);
    }

    let rows: Vec<Vec<f64>> = samples.iter().map(|(d, _)| basis(d, n)).collect();
    let targets: Vec<f64> = samples.iter().map(|(_, y)| *y).collect();

    let Some(coeffs) = least_squares(&rows, &targets, p) else {
        return (None, ModelStopType::RankDeficient);
    };

    let gradient = &coeffs[..n];
    let hessian = hessian_from(&coeffs[n..], n);

    let neg_gradient: Vec<f64> = gradient.iter().map(|&g| -g).collect();
    let Some(step) = solve(hessian.clone(), neg_gradient) else {
        return (None, ModelStopType::RankDeficient);
    };

    let predicted = model_value(gradient, &hessian, &step);
    if predicted >= 0.0 {
        return (None, ModelStopType::RankDeficient);
    }

    let coords: Vec<f64> = (0..n).map(|i| center.point[i].value_or(0.0) + step[i]).collect();
    (Some(Point::from_f64(&coords)), ModelStopType::Fitted)
}

/// `[d_1, .., d_n, d_1^2, d_1*d_2, .., d_1*d_n, d_2^2, .., d_n^2]`: linear
/// terms followed by the upper triangle (diagonal included) of the
/// quadratic terms, row-major over `i <= j`.
fn basis(d: &[f64], n: usize) -> Vec<f64> {
    let mut row = Vec::with_capacity(n + n * (n + 1) / 2);
    row.extend_from_slice(d);
    for i in 0..n {
        for j in i..n {
            row.push(d[i] * d[j]);
        }
    }
    row
}

/// Expands the fitted upper-triangle quadratic coefficients into the full
/// symmetric Hessian (`H_ii = 2 c_ii`, `H_ij = c_ij` off-diagonal).
fn hessian_from(quad_coeffs: &[f64], n: usize) -> Vec<Vec<f64>> {
    let mut h = vec![vec![0.0; n]; n];
    let mut idx = 0;
    for i in 0..n {
        for j in i..n {
            let c = quad_coeffs[idx];
            if i == j {
                h[i][j] = 2.0 * c;
            } else {
                h[i][j] = c;
                h[j][i] = c;
            }
            idx += 1;
        }
    }
    h
}

fn model_value(gradient: &[f64], hessian: &[Vec<f64>], d: &[f64]) -> f64 {
    let linear: f64 = gradient.iter().zip(d.iter()).map(|(g, di)| g * di).sum();
    let mut quadratic = 0.0;
    for (i, row) in hessian.iter().enumerate() {
        for (j, &h_ij) in row.iter().enumerate() {
            quadratic += 0.5 * h_ij * d[i] * d[j];
        }
    }
    linear + quadratic
}

/// Solves the `p`-parameter least-squares fit `rows * coeffs ~= targets`
/// via the normal equations `(rows^T rows) coeffs = rows^T targets`.
fn least_squares(rows: &[Vec<f64>], targets: &[f64], p: usize) -> Option<Vec<f64>> {
    let mut ata = vec![vec![0.0; p]; p];
    let mut atb = vec![0.0; p];
    for (row, &y) in rows.iter().zip(targets.iter()) {
        for i in 0..p {
            atb[i] += row[i] * y;
            for j in 0..p {
                ata[i][j] += row[i] * row[j];
            }
        }
    }
    solve(ata, atb)
}

/// Solves the square linear system `a x = b` by Gaussian elimination with
/// partial pivoting. Returns `None` if `a` is singular (or too
/// ill-conditioned) to solve.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let p = b.len();
    for col in 0..p {
        let pivot_row = (col..p).max_by(|&r1, &r2| a[r1][col].abs().partial_cmp(&a[r2][col].abs()).unwrap())?;
        if a[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..p {
            let factor = a[row][col] / a[col][col];
            for k in col..p {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; p];
    for row in (0..p).rev() {
        let sum: f64 = (row + 1..p).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - sum) / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{Eval, EvalType};

    fn point_with_f(coords: &[f64], f: f64) -> EvalPoint {
        let mut ep = EvalPoint::new(Point::from_f64(coords));
        ep.set_eval(Eval::ok(EvalType::BbEval, f, vec![]));
        ep
    }

    #[test]
    fn recovers_the_minimizer_of_an_exact_bowl() {
        // f(x, y) = (x - 2)^2 + (y + 1)^2, center at the origin.
        let center = point_with_f(&[0.0, 0.0], 5.0);
        let neighbors = vec![
            point_with_f(&[1.0, 0.0], 2.0),
            point_with_f(&[-1.0, 0.0], 10.0),
            point_with_f(&[0.0, 1.0], 8.0),
            point_with_f(&[0.0, -1.0], 4.0),
            point_with_f(&[1.0, 1.0], 5.0),
            point_with_f(&[-1.0, -1.0], 9.0),
        ];
        let (proposal, _) = generate(&center, &neighbors);
        let proposal = proposal.unwrap();
        assert!((proposal[0].value_or(0.0) - 2.0).abs() < 1e-6);
        assert!((proposal[1].value_or(0.0) - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn a_center_without_an_evaluation_yields_no_proposal() {
        let center = EvalPoint::new(Point::from_f64(&[0.0]));
        let (proposal, stop) = generate(&center, &[]);
        assert!(proposal.is_none());
        assert_eq!(stop, ModelStopType::NotEnoughPoints);
    }

    #[test]
    fn too_few_neighbors_leaves_the_model_unfit() {
        let center = point_with_f(&[0.0, 0.0], 1.0);
        let neighbors = vec![point_with_f(&[1.0, 0.0], 5.0)];
        let (proposal, stop) = generate(&center, &neighbors);
        assert!(proposal.is_none());
        assert_eq!(stop, ModelStopType::NotEnoughPoints);
    }
}
