//! # copulas-rs
//!
//! Parametric bivariate copulas for modelling the dependence structure of two
//! continuous random variables: Clayton, Frank, Gumbel and Independence.
//!
//! $$
//! C(u,v;\theta)=\psi^{-1}\left(\psi(u;\theta)+\psi(v;\theta);\theta\right)
//! $$
//!
//! The crate fits the dependence parameter from paired observations via
//! Kendall's rank correlation, evaluates the closed-form distribution and
//! density kernels of each family, generates correlated samples with the
//! inverse-transform method and selects the best-fitting family by comparing
//! empirical and theoretical tail concentration.
#![allow(non_snake_case)]

pub mod bivariate;
pub mod error;
pub mod ext;

pub use bivariate::from_record;
pub use bivariate::new_bivariate;
pub use bivariate::selection::select_copula;
pub use bivariate::Bivariate;
pub use bivariate::CopulaRecord;
pub use bivariate::CopulaType;
pub use error::CopulaError;
pub use error::Result;
