//! Exact rational coefficient series for Adams and Stormer-Cowell methods
//!
//! The backward-difference coefficients of the Adams and Stormer-Cowell
//! correctors are defined by a recurrence whose terms alternate in sign and
//! shrink slowly. Evaluated in `f64` that recurrence sheds significant digits
//! once the order passes about a dozen, so every series in this module is
//! carried as exact `BigRational` values and only converted to floating point
//! in [`RationalCoefficients::convert_to_ordinate_form`].
//!
//! The series produced here are, in backward-difference form:
//!
//! - Adams corrector (γ*): 1, -1/2, -1/12, -1/24, -19/720, ...
//! - Stormer-Cowell corrector: the Cauchy square of the Adams corrector
//! - Predictors: the running sums of the respective correctors

use std::ops::Index;

use num::{BigInt, BigRational};
use num_traits::{One, ToPrimitive, Zero};

use crate::integration::errors::{CoefficientError, Result};

/// An ordered series of exact rational coefficients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalCoefficients {
    coeffs: Vec<BigRational>,
}

impl RationalCoefficients {
    /// Build the first `size` backward-difference coefficients of the Adams corrector
    ///
    /// Uses the recurrence c₀ = 1, cₙ = -Σ_{i<n} cᵢ / (n + 1 - i).
    ///
    /// # Errors
    ///
    /// Returns [`CoefficientError::InvalidSize`] when `size` is zero.
    pub fn configure_adams_corrector(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(CoefficientError::InvalidSize { size });
        }

        let mut coeffs: Vec<BigRational> = Vec::with_capacity(size);
        coeffs.push(BigRational::one());

        for n in 1..size {
            let mut sum = BigRational::zero();
            for (i, c) in coeffs.iter().enumerate() {
                let divisor = BigInt::from(n + 1 - i);
                sum += c / BigRational::from_integer(divisor);
            }
            coeffs.push(-sum);
        }

        Ok(Self { coeffs })
    }

    /// Wrap an existing series of rationals
    pub fn from_rationals(coeffs: Vec<BigRational>) -> Self {
        Self { coeffs }
    }

    /// Derive the Stormer-Cowell corrector by self-convolution
    ///
    /// result[i] = Σ_{k=0}^{i} c[k]·c[i-k]
    pub fn construct_stormer_cowell_corrector(&self) -> Self {
        let n = self.coeffs.len();
        let mut coeffs = Vec::with_capacity(n);

        for i in 0..n {
            let mut sum = BigRational::zero();
            for k in 0..=i {
                sum += &self.coeffs[k] * &self.coeffs[i - k];
            }
            coeffs.push(sum);
        }

        Self { coeffs }
    }

    /// Derive a predictor as the running sum of a corrector series
    pub fn construct_predictor(&self) -> Self {
        let mut running = BigRational::zero();
        let coeffs = self
            .coeffs
            .iter()
            .map(|c| {
                running += c;
                running.clone()
            })
            .collect();

        Self { coeffs }
    }

    /// Drop padding terms from the front and back of the series
    ///
    /// Adams-type series shed one leading and one trailing term, Stormer-Cowell
    /// series shed their two leading terms. Exactly two terms are always removed.
    ///
    /// # Panics
    ///
    /// Panics if `nfront + nback != 2` or the series is too short.
    pub fn discard_extra_terms(&self, nfront: usize, nback: usize) -> Self {
        assert_eq!(
            nfront + nback,
            2,
            "exactly two padding terms must be discarded (got {} front, {} back)",
            nfront,
            nback
        );
        assert!(
            self.coeffs.len() > 2,
            "series of length {} is too short to discard padding",
            self.coeffs.len()
        );

        let end = self.coeffs.len() - nback;
        Self {
            coeffs: self.coeffs[nfront..end].to_vec(),
        }
    }

    /// Apply the displacement operator (1 - ∇) to the series
    ///
    /// new[0] = old[0], new[i] = old[i] - old[i-1]. Applied to a corrector this
    /// moves the evaluation point one step back into the history window.
    pub fn displace_back(&self) -> Self {
        let mut coeffs = Vec::with_capacity(self.coeffs.len());
        for (i, c) in self.coeffs.iter().enumerate() {
            if i == 0 {
                coeffs.push(c.clone());
            } else {
                coeffs.push(c - &self.coeffs[i - 1]);
            }
        }

        Self { coeffs }
    }

    /// Convert from backward-difference form to ordinate form
    ///
    /// For each m the weight of the sample m steps back is
    /// (-1)^m Σ_{i=m}^{n-1} C(i, m)·cᵢ. Results are stored in reverse order:
    /// `result[0]` multiplies the oldest sample and `result[n-1]` the newest.
    ///
    /// # Panics
    ///
    /// Panics if `result.len()` differs from the series length.
    pub fn convert_to_ordinate_form(&self, result: &mut [f64]) {
        let n = self.coeffs.len();
        assert_eq!(
            result.len(),
            n,
            "ordinate buffer holds {} values but the series has {}",
            result.len(),
            n
        );

        for m in 0..n {
            let mut sum = BigRational::zero();
            // C(i, m) for i = m, m+1, ...
            let mut binomial = BigInt::one();
            for i in m..n {
                if i > m {
                    binomial = binomial * BigInt::from(i) / BigInt::from(i - m);
                }
                sum += &self.coeffs[i] * &binomial;
            }
            if m % 2 == 1 {
                sum = -sum;
            }
            result[n - 1 - m] = rational_to_f64(&sum);
        }
    }

    /// Convert into a freshly allocated ordinate-form vector
    pub fn to_ordinate_form(&self) -> Vec<f64> {
        let mut result = vec![0.0; self.coeffs.len()];
        self.convert_to_ordinate_form(&mut result);
        result
    }

    /// Number of terms in the series
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Whether the series has no terms
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Borrow the exact coefficients
    pub fn as_slice(&self) -> &[BigRational] {
        &self.coeffs
    }

    /// Backward-difference coefficients rounded to `f64`
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.coeffs.iter().map(rational_to_f64).collect()
    }
}

impl Index<usize> for RationalCoefficients {
    type Output = BigRational;

    fn index(&self, index: usize) -> &Self::Output {
        &self.coeffs[index]
    }
}

/// Round an exact rational to the nearest `f64`
fn rational_to_f64(value: &BigRational) -> f64 {
    value.to_f64().unwrap_or_else(|| {
        let numer = value.numer().to_f64().unwrap_or(f64::NAN);
        let denom = value.denom().to_f64().unwrap_or(f64::NAN);
        numer / denom
    })
}
