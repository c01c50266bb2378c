//! # Clayton copula
//!
//! $$
//! C(u,v;\theta)=\max\left(u^{-\theta}+v^{-\theta}-1,\,0\right)^{-1/\theta}
//! $$
//!
//! Lower-tail dependent family with `theta` in `[-1, inf)` excluding 0 and
//! the closed-form relation `theta = 2*tau / (1 - tau)`.
use core::f64;

use ndarray::Array1;
use ndarray::Array2;

use super::Bivariate;
use super::CopulaType;
use crate::error::Result;
use crate::ext::ArrayExt;

const THETA_INTERVAL: (f64, f64) = (-1.0, f64::INFINITY);
const INVALID_THETAS: &[f64] = &[0.0];

#[derive(Debug, Clone, Default)]
pub struct Clayton {
  theta: Option<f64>,
  tau: Option<f64>,
}

impl Clayton {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Bivariate for Clayton {
  fn copula_type(&self) -> CopulaType {
    CopulaType::Clayton
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

  fn compute_theta(&self, tau: f64) -> Result<f64> {
    if tau == 1.0 {
      return Ok(f64::INFINITY);
    }

    Ok(2.0 * tau / (1.0 - tau))
  }

  fn generator(&self, t: &Array1<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;
    Ok((1.0 / theta) * (t.powf(-theta) - 1.0))
  }

  fn probability_density(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let U = X.column(0);
    let V = X.column(1);

    let a = (theta + 1.0) * (&U * &V).powf(-theta - 1.0);
    let b = U.powf(-theta) + V.powf(-theta) - 1.0;
    let c = -(2.0 * theta + 1.0) / theta;
    Ok(a * b.powf(c))
  }

  fn cumulative_distribution(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let U = X.column(0);
    let V = X.column(1);

    let mut cdfs = Array1::<f64>::zeros(U.len());
    for i in 0..U.len() {
      let u = U[i];
      let v = V[i];

      if u > 0.0 && v > 0.0 {
        // the clamp keeps the base non-negative for theta < 0
        let base = (u.powf(-theta) + v.powf(-theta) - 1.0).max(0.0);
        cdfs[i] = base.powf(-1.0 / theta);
      }
    }

    Ok(cdfs)
  }

  fn partial_derivative(&self, X: &Array2<f64>, y: f64) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let U = X.column(0);
    let V = X.column(1);

    let A = V.powf(-theta - 1.0);
    // UFCS: ndarray's inherent `is_all_infinite` shadows the trait method
    if ArrayExt::is_all_infinite(&A) {
      return Ok(Array1::zeros(V.len()) - y);
    }

    let B = V.powf(-theta) + U.powf(-theta) - 1.0;
    let h = B.powf((-1.0 - theta) / theta);
    Ok(A * h - y)
  }

  /// Closed-form inverse of the conditional distribution:
  /// `u = ((y^(theta / (-1 - theta)) + v^theta - 1) / v^theta)^(-1 / theta)`.
  fn percent_point(&self, y: &Array1<f64>, V: &Array1<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let a = y.powf(theta / (-1.0 - theta));
    let b = V.powf(theta);

    if b.iter().all(|&val| val == 0.0) {
      return Ok(Array1::ones(V.len()));
    }

    Ok(((a + &b - 1.0) / b).powf(-1.0 / theta))
  }
}
