//! # Independence copula
//!
//! $$
//! C(u,v)=uv
//! $$
//!
//! Degenerate product kernel: theta and tau are pinned to 0 and sampling
//! draws independent uniforms.
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;

use super::check_observations;
use super::Bivariate;
use super::CopulaType;
use crate::error::Result;
use crate::ext::ArrayExt;

const THETA_INTERVAL: (f64, f64) = (0.0, 0.0);
const INVALID_THETAS: &[f64] = &[];

#[derive(Debug, Clone, Default)]
pub struct Independence {
  theta: Option<f64>,
  tau: Option<f64>,
}

impl Independence {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Bivariate for Independence {
  fn copula_type(&self) -> CopulaType {
    CopulaType::Independence
  }

  fn tau(&self) -> Option<f64> {
    self.tau
  }

  fn set_tau(&mut self, tau: f64) {
    self.tau = Some(tau);
  }

  fn theta(&self) -> Option<f64> {
    self.theta
  }

  fn set_theta(&mut self, theta: f64) {
    self.theta = Some(theta);
  }

  fn theta_interval(&self) -> (f64, f64) {
    THETA_INTERVAL
  }

  fn invalid_thetas(&self) -> &'static [f64] {
    INVALID_THETAS
  }

  fn compute_theta(&self, _tau: f64) -> Result<f64> {
    Ok(0.0)
  }

  /// Independence ignores the observed dependence: any input maps to
  /// theta = tau = 0.
  fn fit(&mut self, X: &Array2<f64>) -> Result<()> {
    check_observations(X)?;

    self.set_tau(0.0);
    self.set_theta(0.0);

    Ok(())
  }

  fn generator(&self, t: &Array1<f64>) -> Result<Array1<f64>> {
    self.check_fit()?;
    Ok(-t.ln())
  }

  fn probability_density(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    self.check_fit()?;

    let in_range = X.map_axis(Axis(1), |row| {
      row.iter().all(|&val| (0.0..=1.0).contains(&val))
    });
    Ok(in_range.mapv(|ok| if ok { 1.0 } else { 0.0 }))
  }

  fn cumulative_distribution(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    self.check_fit()?;

    let U = X.column(0);
    let V = X.column(1);
    Ok(&U * &V)
  }

  fn partial_derivative(&self, X: &Array2<f64>, y: f64) -> Result<Array1<f64>> {
    self.check_fit()?;
    Ok(X.column(0).to_owned() - y)
  }

  fn percent_point(&self, y: &Array1<f64>, _V: &Array1<f64>) -> Result<Array1<f64>> {
    self.check_fit()?;
    Ok(y.to_owned())
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::arr2;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::Independence;
  use crate::bivariate::test_utils::copula_single_arg_not_one;
  use crate::bivariate::test_utils::copula_zero_if_arg_zero;
  use crate::bivariate::Bivariate;

  #[test]
  fn fit_pins_theta_and_tau_to_zero() {
    // strongly dependent data is still mapped to independence
    let X = arr2(&[[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]]);

    let mut copula = Independence::new();
    copula.fit(&X).unwrap();

    assert_eq!(copula.theta(), Some(0.0));
    assert_eq!(copula.tau(), Some(0.0));
    copula.check_fit().unwrap();
  }

  #[test]
  fn cdf_is_the_product_of_the_marginals() {
    let mut copula = Independence::new();
    copula.fit(&arr2(&[[0.1, 0.9]])).unwrap();

    let cdf = copula
      .cumulative_distribution(&arr2(&[[0.25, 0.4], [0.9, 0.1]]))
      .unwrap();
    assert_abs_diff_eq!(cdf[0], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(cdf[1], 0.09, epsilon = 1e-12);

    copula_zero_if_arg_zero(&copula);
    copula_single_arg_not_one(&copula);
  }

  #[test]
  fn pdf_is_the_unit_square_indicator() {
    let mut copula = Independence::new();
    copula.fit(&arr2(&[[0.5, 0.5]])).unwrap();

    let pdf = copula
      .probability_density(&arr2(&[[0.2, 0.7], [1.3, 0.5]]))
      .unwrap();
    assert_abs_diff_eq!(pdf[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pdf[1], 0.0, epsilon = 1e-12);
  }

  #[test]
  fn percent_point_is_the_identity_in_y() {
    let mut copula = Independence::new();
    copula.fit(&arr2(&[[0.5, 0.5]])).unwrap();

    let y = ndarray::Array1::from(vec![0.1, 0.6, 0.99]);
    let v = ndarray::Array1::from(vec![0.7, 0.2, 0.4]);
    assert_eq!(copula.percent_point(&y, &v).unwrap(), y);
  }

  #[test]
  fn sample_draws_independent_uniform_pairs() {
    let mut copula = Independence::new();
    copula.fit(&arr2(&[[0.5, 0.5]])).unwrap();

    let mut rng = StdRng::seed_from_u64(1);
    let samples = copula.sample(30, &mut rng).unwrap();

    assert_eq!(samples.shape(), &[30, 2]);
    assert!(samples.iter().all(|&x| (0.0..=1.0).contains(&x)));
  }
}
