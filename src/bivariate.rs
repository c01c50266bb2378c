//! # Bivariate copulas
//!
//! $$
//! C(u,v;\theta)=\psi^{-1}\left(\psi(u;\theta)+\psi(v;\theta);\theta\right)
//! $$
//!
//! The [`Bivariate`] trait is the analytic kernel contract shared by all
//! families: generator, distribution, density, conditional distribution and
//! its inverse, plus fitting, sampling and the persistence record.
use core::f64;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use ndarray::stack;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_rand::RandomExt;
use rand::RngCore;
use rand_distr::Uniform;
use roots::find_root_brent;
use roots::SimpleConvergency;
use serde::Deserialize;
use serde::Serialize;

use crate::error::CopulaError;
use crate::error::Result;

pub mod clayton;
pub mod frank;
pub mod gumbel;
pub mod independence;
pub mod selection;

pub use clayton::Clayton;
pub use frank::Frank;
pub use gumbel::Gumbel;
pub use independence::Independence;

/// Available copula families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopulaType {
  Clayton,
  Frank,
  Gumbel,
  Independence,
}

impl CopulaType {
  /// Registration order of the families. Ties in model selection are broken
  /// by position in this list.
  pub const ALL: [CopulaType; 4] = [
    CopulaType::Clayton,
    CopulaType::Frank,
    CopulaType::Gumbel,
    CopulaType::Independence,
  ];

  /// Families with a free dependence parameter.
  pub const NON_DEGENERATE: [CopulaType; 3] =
    [CopulaType::Clayton, CopulaType::Frank, CopulaType::Gumbel];

  pub fn name(&self) -> &'static str {
    match self {
      CopulaType::Clayton => "clayton",
      CopulaType::Frank => "frank",
      CopulaType::Gumbel => "gumbel",
      CopulaType::Independence => "independence",
    }
  }
}

impl fmt::Display for CopulaType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for CopulaType {
  type Err = CopulaError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "clayton" => Ok(CopulaType::Clayton),
      "frank" => Ok(CopulaType::Frank),
      "gumbel" => Ok(CopulaType::Gumbel),
      "independence" => Ok(CopulaType::Independence),
      _ => Err(CopulaError::InvalidFamily(s.to_string())),
    }
  }
}

/// Build an unfitted copula of the given family.
///
/// The family-to-kernel mapping is static; there is no runtime discovery.
pub fn new_bivariate(copula_type: CopulaType) -> Box<dyn Bivariate> {
  match copula_type {
    CopulaType::Clayton => Box::new(Clayton::new()),
    CopulaType::Frank => Box::new(Frank::new()),
    CopulaType::Gumbel => Box::new(Gumbel::new()),
    CopulaType::Independence => Box::new(Independence::new()),
  }
}

/// Flat persisted representation of a fitted copula. The only externally
/// stable serialization contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopulaRecord {
  pub copula_type: String,
  pub theta: f64,
  pub tau: f64,
}

impl CopulaRecord {
  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  pub fn from_json(raw: &str) -> Result<Self> {
    Ok(serde_json::from_str(raw)?)
  }
}

/// Restore a copula from a persisted record without refitting.
///
/// The family name is resolved case-insensitively and theta is revalidated
/// against the family's interval before being accepted.
pub fn from_record(record: &CopulaRecord) -> Result<Box<dyn Bivariate>> {
  let copula_type = record.copula_type.parse::<CopulaType>()?;
  let mut copula = new_bivariate(copula_type);
  copula.check_theta(record.theta)?;
  copula.set_theta(record.theta);
  copula.set_tau(record.tau);
  Ok(copula)
}

pub(crate) fn check_observations(X: &Array2<f64>) -> Result<()> {
  if X.ncols() != 2 || X.nrows() == 0 {
    return Err(CopulaError::InvalidInput(format!(
      "expected an (n, 2) observation matrix with n >= 1, got ({}, {})",
      X.nrows(),
      X.ncols()
    )));
  }

  if X.iter().any(|x| !x.is_finite()) {
    return Err(CopulaError::InvalidInput(
      "observations must not contain NaN or infinite values".into(),
    ));
  }

  Ok(())
}

/// Invert the conditional distribution with a bracketed Brent search over
/// [eps, 1]. The objective is only guaranteed monotonic, not smooth, near the
/// unit-square edges, so a bracketing method is used instead of a
/// derivative-based one.
pub(crate) fn percent_point_bracketed<C>(
  copula: &C,
  y: &Array1<f64>,
  V: &Array1<f64>,
) -> Result<Array1<f64>>
where
  C: Bivariate + ?Sized,
{
  let n = y.len();
  let mut results = Array1::zeros(n);

  for i in 0..n {
    let y_i = y[i];
    let v_i = V[i];

    let f = |u: f64| match copula.partial_derivative_scalar(u, v_i, y_i) {
      Ok(val) => val,
      Err(_) => f64::NAN,
    };
    let mut convergency = SimpleConvergency {
      eps: 1e-10,
      max_iter: 100,
    };
    let root = find_root_brent(f64::EPSILON, 1.0, f, &mut convergency);
    results[i] = root.unwrap_or(f64::EPSILON);
  }

  Ok(results)
}

pub trait Bivariate: std::fmt::Debug + Send + Sync {
  fn copula_type(&self) -> CopulaType;

  fn tau(&self) -> Option<f64>;

  fn set_tau(&mut self, tau: f64);

  fn theta(&self) -> Option<f64>;

  fn set_theta(&mut self, theta: f64);

  /// Closed interval of valid theta values for the family.
  fn theta_interval(&self) -> (f64, f64);

  /// Values that belong to [`Bivariate::theta_interval`] but are nevertheless
  /// excluded.
  fn invalid_thetas(&self) -> &'static [f64];

  /// Map Kendall's tau to the family's dependence parameter.
  fn compute_theta(&self, tau: f64) -> Result<f64>;

  fn check_theta(&self, theta: f64) -> Result<()> {
    let (lower, upper) = self.theta_interval();

    if !(lower <= theta && theta <= upper) || self.invalid_thetas().contains(&theta) {
      return Err(CopulaError::InvalidParameter {
        family: self.copula_type(),
        theta,
      });
    }

    Ok(())
  }

  /// Assert that the model is fit and the stored theta is valid.
  ///
  /// Fit state is carried by the `Option`, so a genuinely fitted theta of 0
  /// (Independence) is distinct from "not fitted".
  fn check_fit(&self) -> Result<()> {
    match self.theta() {
      None => Err(CopulaError::NotFitted),
      Some(theta) => self.check_theta(theta),
    }
  }

  /// `check_fit`, returning the validated theta.
  fn fitted_theta(&self) -> Result<f64> {
    self.check_fit()?;
    self.theta().ok_or(CopulaError::NotFitted)
  }

  /// Estimate theta and tau from an (n, 2) observation matrix in the
  /// variables' native scale.
  ///
  /// Kendall's tau-b (with the conventional tie correction) is mapped to the
  /// family parameter and validated. The model is left untouched when any
  /// step fails.
  fn fit(&mut self, X: &Array2<f64>) -> Result<()> {
    check_observations(X)?;

    let U = X.column(0);
    let V = X.column(1);

    let (tau, ..) = kendalls::tau_b_with_comparator(&U.to_vec(), &V.to_vec(), |a, b| {
      a.partial_cmp(b).unwrap_or(Ordering::Greater)
    })
    .map_err(|e| CopulaError::InvalidInput(e.to_string()))?;

    let theta = self.compute_theta(tau)?;
    self.check_theta(theta)?;

    tracing::debug!(copula = %self.copula_type(), tau, theta, "fitted bivariate copula");

    self.set_tau(tau);
    self.set_theta(theta);

    Ok(())
  }

  /// Generator function `psi(t; theta)` of the Archimedean representation.
  fn generator(&self, t: &Array1<f64>) -> Result<Array1<f64>>;

  /// Probability density `c(u, v) = d2C(u,v) / du dv`.
  fn probability_density(&self, X: &Array2<f64>) -> Result<Array1<f64>>;

  fn pdf(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    self.probability_density(X)
  }

  fn log_probability_density(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    let pdf = self.probability_density(X)?;
    Ok(pdf.mapv(|val| (val + 1e-32).ln()))
  }

  /// Cumulative distribution `C(u, v)`. The boundary laws `C(u, 0) = 0`,
  /// `C(0, v) = 0`, `C(u, 1) = u` and `C(1, v) = v` fall out of the
  /// closed-form formulas rather than being special-cased.
  fn cumulative_distribution(&self, X: &Array2<f64>) -> Result<Array1<f64>>;

  fn cdf(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
    self.cumulative_distribution(X)
  }

  /// Conditional distribution `C(u|v) = dC(u,v)/dv`, offset by `y` so the
  /// percent-point root-find can evaluate `C(u|v) - y` directly.
  fn partial_derivative(&self, X: &Array2<f64>, y: f64) -> Result<Array1<f64>>;

  fn partial_derivative_scalar(&self, U: f64, V: f64, y: f64) -> Result<f64> {
    self.check_fit()?;

    let X = stack![Axis(1), Array1::from(vec![U]), Array1::from(vec![V])];
    Ok(self.partial_derivative(&X, y)?[0])
  }

  /// Inverse conditional distribution `C(u|v)^{-1}` at level `y`. Families
  /// without a closed-form inverse fall back to the bracketed root-find.
  fn percent_point(&self, y: &Array1<f64>, V: &Array1<f64>) -> Result<Array1<f64>> {
    self.check_fit()?;
    percent_point_bracketed(self, y, V)
  }

  fn ppf(&self, y: &Array1<f64>, V: &Array1<f64>) -> Result<Array1<f64>> {
    self.percent_point(y, V)
  }

  /// Generate `n_samples` pairs with the inverse-transform method:
  /// `v, c ~ U(0, 1)` and `u = C(u|v)^{-1}(c)`.
  ///
  /// Randomness comes from the supplied generator, so a fixed seed reproduces
  /// the exact sample sequence.
  fn sample(&self, n_samples: usize, rng: &mut dyn RngCore) -> Result<Array2<f64>> {
    self.check_fit()?;

    let tau = self.tau().ok_or(CopulaError::NotFitted)?;
    if !(-1.0..=1.0).contains(&tau) {
      return Err(CopulaError::InvalidState(format!(
        "the range for the correlation measure is [-1, 1], got {tau}"
      )));
    }

    let v = Array1::<f64>::random_using(n_samples, Uniform::new(0.0, 1.0), rng);
    let c = Array1::<f64>::random_using(n_samples, Uniform::new(0.0, 1.0), rng);
    let u = self.percent_point(&c, &v)?;

    Ok(stack![Axis(1), u, v])
  }

  /// Flat `{family, theta, tau}` record replicating this model.
  fn to_record(&self) -> Result<CopulaRecord> {
    self.check_fit()?;

    Ok(CopulaRecord {
      copula_type: self.copula_type().name().to_string(),
      theta: self.theta().ok_or(CopulaError::NotFitted)?,
      tau: self.tau().ok_or(CopulaError::NotFitted)?,
    })
  }
}

#[cfg(test)]
pub(crate) mod test_utils {
  use approx::assert_abs_diff_eq;
  use ndarray::arr2;
  use ndarray::Array1;

  use super::Bivariate;

  /// `C(0, v) = 0` and `C(u, 0) = 0` over a grid of marginal values.
  pub fn copula_zero_if_arg_zero(copula: &dyn Bivariate) {
    for &w in Array1::linspace(0.0, 1.0, 11).iter() {
      let cdf = copula
        .cumulative_distribution(&arr2(&[[0.0, w], [w, 0.0]]))
        .unwrap();
      assert_abs_diff_eq!(cdf[0], 0.0, epsilon = 1e-5);
      assert_abs_diff_eq!(cdf[1], 0.0, epsilon = 1e-5);
    }
  }

  /// `C(1, v) = v` and `C(u, 1) = u` over a grid of marginal values.
  pub fn copula_single_arg_not_one(copula: &dyn Bivariate) {
    for &w in Array1::linspace(0.0, 1.0, 11).iter() {
      let cdf = copula
        .cumulative_distribution(&arr2(&[[1.0, w], [w, 1.0]]))
        .unwrap();
      assert_abs_diff_eq!(cdf[0], w, epsilon = 1e-5);
      assert_abs_diff_eq!(cdf[1], w, epsilon = 1e-5);
    }
  }
}
