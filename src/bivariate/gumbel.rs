//! # Gumbel copula
//!
//! $$
//! C(u,v;\theta)=\exp\left(-\left[(-\ln u)^{\theta}+(-\ln v)^{\theta}\right]^{1/\theta}\right)
//! $$
//!
//! Upper-tail dependent family with `theta` in `[1, inf)` and the closed-form
//! relation `theta = 1 / (1 - tau)`. Negative tau is not representable and
//! fails parameter validation. `theta = 1` degenerates to independence.
use core::f64;

use ndarray::Array1;
use ndarray::Array2;

use super::percent_point_bracketed;
use super::Bivariate;
use super::CopulaType;
use crate::error::Result;
use crate::ext::ArrayExt;

const THETA_INTERVAL: (f64, f64) = (1.0, f64::INFINITY);
const INVALID_THETAS: &[f64] = &[];

#[derive(Debug, Clone, Default)]
pub struct Gumbel {
  theta: Option<f64>,
  tau: Option<f64>,
}

impl Gumbel {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Bivariate for Gumbel {
  fn copula_type(&self) -> CopulaType {
    CopulaType::Gumbel
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

    Ok(1.0 / (1.0 - tau))
  }

  fn generator(&self, t: &Array1<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;
    Ok((-t.ln()).powf(theta))
  }

  fn probability_density(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let U = X.column(0);
    let V = X.column(1);

    if theta == 1.0 {
      return Ok(Array1::ones(U.len()));
    }

    let a = (&U * &V).powf(-1.0);
    let tmp = (-U.ln()).powf(theta) + (-V.ln()).powf(theta);
    let b = tmp.powf(-2.0 + 2.0 / theta);
    let c = (U.ln() * V.ln()).powf(theta - 1.0);
    let d = 1.0 + (theta - 1.0) * tmp.powf(-1.0 / theta);
    Ok(self.cumulative_distribution(X)? * a * b * c * d)
  }

  fn cumulative_distribution(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let U = X.column(0);
    let V = X.column(1);

    if theta == 1.0 {
      return Ok(&U * &V);
    }

    let h = (-U.ln()).powf(theta) + (-V.ln()).powf(theta);
    let h = -h.powf(1.0 / theta);
    Ok(h.exp())
  }

  fn partial_derivative(&self, X: &Array2<f64>, y: f64) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let U = X.column(0);
    let V = X.column(1);

    if theta == 1.0 {
      return Ok(U.to_owned() - y);
    }

    let t1 = (-U.ln()).powf(theta);
    let t2 = (-V.ln()).powf(theta);
    let p1 = self.cumulative_distribution(X)?;
    let p2 = (t1 + t2).powf(-1.0 + 1.0 / theta);
    let p3 = (-V.ln()).powf(theta - 1.0);
    Ok(p1 * p2 * p3 / &V - y)
  }

  fn percent_point(&self, y: &Array1<f64>, V: &Array1<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    if theta == 1.0 {
      return Ok(y.to_owned());
    }

    percent_point_bracketed(self, y, V)
  }
}
