//! # Copula model selection
//!
//! $$
//! L(z)=\frac{P(U\le z,V\le z)}{z^{2}},\qquad
//! R(z)=\frac{P(U\ge z,V\ge z)}{(1-z)^{2}}
//! $$
//!
//! Every non-degenerate family is fitted to the observations; the winner is
//! the candidate whose theoretical tail-concentration curves are closest to
//! the empirical ones, scored by rank over the left, right and combined
//! squared-error costs.
use std::cmp::Ordering;

use ndarray::stack;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use rayon::prelude::*;

use super::check_observations;
use super::new_bivariate;
use super::Bivariate;
use super::CopulaType;
use crate::error::CopulaError;
use crate::error::Result;
use crate::ext::ArrayExt;

const TAIL_GRID_SIZE: usize = 50;
const TAIL_EPS: f64 = 1e-4;

/// Fit every non-degenerate family to `X` and return the best one together
/// with its type.
///
/// Candidates whose parameter estimation fails (tau outside the family's
/// representable range) are dropped with a warning; the first fit error is
/// surfaced only when no candidate survives. Ties in the rank totals go to
/// the earliest-registered family.
pub fn select_copula(X: &Array2<f64>) -> Result<(CopulaType, Box<dyn Bivariate>)> {
  check_observations(X)?;

  let outcomes: Vec<(CopulaType, Result<Box<dyn Bivariate>>)> = CopulaType::NON_DEGENERATE
    .par_iter()
    .map(|&copula_type| {
      let mut copula = new_bivariate(copula_type);
      let outcome = copula.fit(X).map(|_| copula);
      (copula_type, outcome)
    })
    .collect();

  let mut candidates = Vec::new();
  let mut first_error = None;
  for (copula_type, outcome) in outcomes {
    match outcome {
      Ok(copula) => candidates.push((copula_type, copula)),
      Err(e) => {
        tracing::warn!(copula = %copula_type, error = %e, "dropping copula candidate");
        first_error.get_or_insert(e);
      }
    }
  }

  if candidates.is_empty() {
    return Err(first_error.unwrap_or_else(|| {
      CopulaError::InvalidState("no copula candidate could be fitted".into())
    }));
  }

  let pseudo = rank_transform(X);
  let (z_left, l_emp, z_right, r_emp) = empirical_tails(&pseudo);
  let z_left = Array1::from(z_left);
  let z_right = Array1::from(z_right);

  let mut cost_left = Vec::with_capacity(candidates.len());
  let mut cost_right = Vec::with_capacity(candidates.len());
  for (_, copula) in &candidates {
    let l_model = candidate_left_tail(copula.as_ref(), &z_left)?;
    let r_model = candidate_right_tail(copula.as_ref(), &z_right)?;
    cost_left.push(sse(&l_emp, &l_model));
    cost_right.push(sse(&r_emp, &r_model));
  }
  let cost_both: Vec<f64> = cost_left
    .iter()
    .zip(&cost_right)
    .map(|(l, r)| l + r)
    .collect();

  let score_left = rank_scores(&cost_left);
  let score_right = rank_scores(&cost_right);
  let score_both = rank_scores(&cost_both);

  let mut best = 0;
  let mut best_total = 0;
  for i in 0..candidates.len() {
    let total = score_left[i] + score_right[i] + score_both[i];
    if total > best_total {
      best_total = total;
      best = i;
    }
  }

  let (copula_type, copula) = candidates.swap_remove(best);
  tracing::debug!(copula = %copula_type, "selected copula family");
  Ok((copula_type, copula))
}

/// Map each column to its normalized ranks `(1/n, ..., 1)`, the empirical
/// copula pseudo-observations.
fn rank_transform(X: &Array2<f64>) -> Array2<f64> {
  let n = X.nrows();
  let mut pseudo = Array2::zeros((n, X.ncols()));

  for col in 0..X.ncols() {
    let column = X.column(col);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| column[a].partial_cmp(&column[b]).unwrap_or(Ordering::Equal));

    for (rank, &idx) in order.iter().enumerate() {
      pseudo[[idx, col]] = (rank + 1) as f64 / n as f64;
    }
  }

  pseudo
}

/// Empirical tail-concentration curves over a grid on `(0, 1)`. Grid points
/// where a tail holds no observations are skipped, as the normalized
/// concentration is undefined there.
fn empirical_tails(pseudo: &Array2<f64>) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
  let U = pseudo.column(0);
  let V = pseudo.column(1);
  let n = pseudo.nrows() as f64;

  let mut z_left = Vec::new();
  let mut left = Vec::new();
  let mut z_right = Vec::new();
  let mut right = Vec::new();

  for &z in Array1::linspace(TAIL_EPS, 1.0 - TAIL_EPS, TAIL_GRID_SIZE).iter() {
    let lower = U
      .iter()
      .zip(V.iter())
      .filter(|&(&u, &v)| u <= z && v <= z)
      .count() as f64
      / n;
    let upper = U
      .iter()
      .zip(V.iter())
      .filter(|&(&u, &v)| u >= z && v >= z)
      .count() as f64
      / n;

    if lower > 0.0 {
      z_left.push(z);
      left.push(lower / (z * z));
    }
    if upper > 0.0 {
      z_right.push(z);
      right.push(upper / ((1.0 - z) * (1.0 - z)));
    }
  }

  (z_left, left, z_right, right)
}

/// `C(z, z) / z^2` along the diagonal grid.
fn candidate_left_tail(copula: &dyn Bivariate, z: &Array1<f64>) -> Result<Array1<f64>> {
  let grid = stack![Axis(1), z.view(), z.view()];
  let cdf = copula.cumulative_distribution(&grid)?;
  Ok(cdf / z.pow2())
}

/// `(1 - 2z + C(z, z)) / (1 - z)^2` along the diagonal grid, the survival
/// mass of the upper-right corner.
fn candidate_right_tail(copula: &dyn Bivariate, z: &Array1<f64>) -> Result<Array1<f64>> {
  let grid = stack![Axis(1), z.view(), z.view()];
  let cdf = copula.cumulative_distribution(&grid)?;
  let num = cdf - z.mapv(|zi| 2.0 * zi - 1.0);
  let den = z.mapv(|zi| (1.0 - zi) * (1.0 - zi));
  Ok(num / den)
}

fn sse(observed: &[f64], modeled: &Array1<f64>) -> f64 {
  observed
    .iter()
    .zip(modeled.iter())
    .map(|(o, m)| (o - m) * (o - m))
    .sum()
}

/// Rank each cost from worst to best: the highest cost scores 1 and the
/// lowest scores `costs.len()`. Equal costs keep their input order.
fn rank_scores(costs: &[f64]) -> Vec<usize> {
  let mut order: Vec<usize> = (0..costs.len()).collect();
  order.sort_by(|&a, &b| costs[b].partial_cmp(&costs[a]).unwrap_or(Ordering::Equal));

  let mut scores = vec![0; costs.len()];
  for (pos, &idx) in order.iter().enumerate() {
    scores[idx] = pos + 1;
  }
  scores
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::arr2;
  use ndarray::Array2;
  use tracing_test::traced_test;

  use super::rank_scores;
  use super::rank_transform;
  use super::select_copula;
  use crate::bivariate::CopulaType;
  use crate::error::CopulaError;

  fn monotone_noisy(n: usize) -> Array2<f64> {
    // mostly concordant with a deterministic perturbation
    let rows: Vec<[f64; 2]> = (0..n)
      .map(|i| {
        let x = i as f64;
        let wiggle = if i % 3 == 0 { 1.7 } else { -0.9 };
        [x, 2.0 * x + wiggle]
      })
      .collect();
    Array2::from(rows)
  }

  #[test]
  fn rank_scores_order_worst_to_best() {
    assert_eq!(rank_scores(&[0.5, 0.1, 0.9]), vec![2, 3, 1]);
  }

  #[test]
  fn rank_transform_yields_normalized_ranks() {
    let pseudo = rank_transform(&arr2(&[[3.0, 10.0], [1.0, 30.0], [2.0, 20.0]]));

    assert_abs_diff_eq!(pseudo[[0, 0]], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pseudo[[1, 0]], 1.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pseudo[[2, 0]], 2.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pseudo[[1, 1]], 1.0, epsilon = 1e-12);
  }

  #[test]
  fn selects_a_fitted_model_for_positive_dependence() {
    let (copula_type, model) = select_copula(&monotone_noisy(30)).unwrap();

    assert_eq!(model.copula_type(), copula_type);
    model.check_fit().unwrap();
    assert!(model.tau().unwrap() > 0.0);
  }

  #[test]
  #[traced_test]
  fn gumbel_is_dropped_for_negative_dependence() {
    // near-discordant pairs, tau is well below zero
    let rows: Vec<[f64; 2]> = (0..20)
      .map(|i| {
        let x = i as f64;
        let wiggle = if i % 4 == 0 { 1.3 } else { -0.6 };
        [x, -3.0 * x + wiggle]
      })
      .collect();

    let (copula_type, model) = select_copula(&Array2::from(rows)).unwrap();

    assert_ne!(copula_type, CopulaType::Gumbel);
    assert!(model.tau().unwrap() < 0.0);
    assert!(logs_contain("dropping copula candidate"));
  }

  #[test]
  fn zero_tau_leaves_only_the_gumbel_candidate() {
    // three concordant and three discordant pairs, tau = 0
    let X = arr2(&[[1.0, 3.0], [2.0, 1.0], [3.0, 4.0], [4.0, 2.0]]);

    let (copula_type, model) = select_copula(&X).unwrap();

    assert_eq!(copula_type, CopulaType::Gumbel);
    assert_abs_diff_eq!(model.theta().unwrap(), 1.0, epsilon = 1e-12);
  }

  #[test]
  fn malformed_observations_are_rejected() {
    let err = select_copula(&Array2::<f64>::zeros((4, 3))).unwrap_err();
    assert!(matches!(err, CopulaError::InvalidInput(_)));
  }
}
