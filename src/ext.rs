//! Elementwise float helpers over `ndarray` columns used by the copula
//! kernels.

use ndarray::Array1;
use ndarray::ArrayView1;

pub trait ArrayExt {
  fn powf(&self, exp: f64) -> Array1<f64>;

  fn pow2(&self) -> Array1<f64>;

  fn ln(&self) -> Array1<f64>;

  fn exp(&self) -> Array1<f64>;

  fn is_all_infinite(&self) -> bool;
}

impl ArrayExt for Array1<f64> {
  fn powf(&self, exp: f64) -> Array1<f64> {
    self.mapv(|x| x.powf(exp))
  }

  fn pow2(&self) -> Array1<f64> {
    self.mapv(|x| x * x)
  }

  fn ln(&self) -> Array1<f64> {
    self.mapv(f64::ln)
  }

  fn exp(&self) -> Array1<f64> {
    self.mapv(f64::exp)
  }

  fn is_all_infinite(&self) -> bool {
    self.iter().all(|x| x.is_infinite())
  }
}

impl ArrayExt for ArrayView1<'_, f64> {
  fn powf(&self, exp: f64) -> Array1<f64> {
    self.mapv(|x| x.powf(exp))
  }

  fn pow2(&self) -> Array1<f64> {
    self.mapv(|x| x * x)
  }

  fn ln(&self) -> Array1<f64> {
    self.mapv(f64::ln)
  }

  fn exp(&self) -> Array1<f64> {
    self.mapv(f64::exp)
  }

  fn is_all_infinite(&self) -> bool {
    self.iter().all(|x| x.is_infinite())
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::ArrayExt;

  #[test]
  fn elementwise_powf_and_ln() {
    let x = array![1.0, 4.0, 9.0];
    let roots = x.powf(0.5);
    assert_abs_diff_eq!(roots[1], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(roots[2], 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(x.ln()[0], 0.0, epsilon = 1e-12);
  }

  #[test]
  fn all_infinite_detection() {
    let x = array![f64::INFINITY, f64::NEG_INFINITY];
    // UFCS: ndarray's inherent `is_all_infinite` shadows the trait method
    assert!(ArrayExt::is_all_infinite(&x));
    let y = array![f64::INFINITY, 1.0];
    assert!(!ArrayExt::is_all_infinite(&y));
  }
}
