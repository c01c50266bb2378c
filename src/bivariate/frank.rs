//! # Frank copula
//!
//! $$
//! C(u,v;\theta)=-\frac{1}{\theta}
//! \ln\left(1+\frac{(e^{-\theta u}-1)(e^{-\theta v}-1)}{e^{-\theta}-1}\right)
//! $$
//!
//! Radially symmetric family with `theta` in `(-inf, inf)` excluding 0.
//! Kendall's tau relates to theta through the first Debye function,
//! `tau = 1 + 4 (D_1(theta) - 1) / theta`, which has no closed-form inverse
//! and is solved with a bracketed root-find.
use core::f64;
use std::f64::consts::PI;

use gauss_quad::GaussLegendre;
use ndarray::Array1;
use ndarray::Array2;
use roots::find_root_brent;
use roots::SimpleConvergency;

use super::Bivariate;
use super::CopulaType;
use crate::error::CopulaError;
use crate::error::Result;
use crate::ext::ArrayExt;

const THETA_INTERVAL: (f64, f64) = (f64::NEG_INFINITY, f64::INFINITY);
const INVALID_THETAS: &[f64] = &[0.0];

/// Upper bracket for the tau -> theta solve; e^-theta underflows past ~745.
const MAX_THETA: f64 = 700.0;
const DEBYE_QUAD_DEGREE: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct Frank {
  theta: Option<f64>,
  tau: Option<f64>,
}

impl Frank {
  pub fn new() -> Self {
    Self::default()
  }

  /// `g(z) = e^(-theta * z) - 1`
  fn g(theta: f64, z: &Array1<f64>) -> Array1<f64> {
    (-theta * z).exp() - 1.0
  }
}

/// First Debye function `D_1(x) = (1/x) * int_0^x t / (e^t - 1) dt`, using
/// `D_1(-x) = D_1(x) + x/2` for negative arguments.
fn debye1(x: f64) -> Result<f64> {
  let t = x.abs();

  // the integrand decays like t * e^-t; past ~30 the integral is pi^2 / 6 to
  // double precision
  let integral = if t > 30.0 {
    PI * PI / 6.0
  } else {
    let quad = GaussLegendre::new(DEBYE_QUAD_DEGREE)
      .map_err(|e| CopulaError::InvalidInput(e.to_string()))?;
    quad.integrate(f64::EPSILON, t, |u| u / u.exp_m1())
  };

  let d1 = integral / t;
  Ok(if x < 0.0 { d1 + t / 2.0 } else { d1 })
}

/// Kendall's tau implied by a Frank parameter.
pub(crate) fn tau_from_theta(theta: f64) -> Result<f64> {
  Ok(1.0 + 4.0 * (debye1(theta)? - 1.0) / theta)
}

impl Bivariate for Frank {
  fn copula_type(&self) -> CopulaType {
    CopulaType::Frank
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

  /// Solve `tau(theta) = tau` by Brent iteration over the positive branch;
  /// `tau(-theta) = -tau(theta)` maps the result back for negative tau.
  fn compute_theta(&self, tau: f64) -> Result<f64> {
    if tau == 0.0 {
      // excluded by check_theta; tau = 0 has no Frank representation
      return Ok(0.0);
    }

    let target = tau.abs();
    let f = |theta: f64| match tau_from_theta(theta) {
      Ok(implied) => implied - target,
      Err(_) => f64::NAN,
    };

    let mut convergency = SimpleConvergency {
      eps: 1e-9,
      max_iter: 200,
    };
    let root = find_root_brent(f64::EPSILON, MAX_THETA, f, &mut convergency).map_err(|_| {
      CopulaError::InvalidInput(format!("tau {tau} is not representable by the frank copula"))
    })?;

    Ok(root.copysign(tau))
  }

  fn generator(&self, t: &Array1<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let num = ((-theta) * t).exp() - 1.0;
    let den = (-theta).exp_m1();
    Ok(-((num / den).ln()))
  }

  fn probability_density(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let U = X.column(0).to_owned();
    let V = X.column(1).to_owned();
    let ones = Array1::ones(U.len());

    let g1 = Self::g(theta, &ones);
    let num = ((-theta) * &g1) * (1.0 + Self::g(theta, &(&U + &V)));
    let aux = Self::g(theta, &U) * Self::g(theta, &V) + g1;
    let den = aux.pow2();
    Ok(num / den)
  }

  fn cumulative_distribution(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let U = X.column(0);
    let V = X.column(1);

    let num = ((-theta * &U).exp() - 1.0) * ((-theta * &V).exp() - 1.0);
    let den = (-theta).exp_m1();
    Ok((-1.0 / theta) * (1.0 + num / den).ln())
  }

  fn partial_derivative(&self, X: &Array2<f64>, y: f64) -> Result<Array1<f64>> {
    let theta = self.fitted_theta()?;

    let U = X.column(0).to_owned();
    let V = X.column(1).to_owned();
    let ones = Array1::ones(U.len());

    let g_uv = Self::g(theta, &U) * Self::g(theta, &V);
    let num = &g_uv + &Self::g(theta, &U);
    let den = g_uv + Self::g(theta, &ones);
    Ok(num / den - y)
  }
}
