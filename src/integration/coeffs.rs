//! Gauss-Jackson / summed-Adams coefficient tables
//!
//! A [`CoefficientTable`] holds one predictor [`CoefficientPair`] and a ladder
//! of corrector pairs, one per position in the history window. The corrector
//! evaluated at the newest sample lives at `corrector(order)`; each rung below
//! it is the same corrector displaced one step further back.
//!
//! Tables are built from the exact series in [`crate::integration::rational`]
//! and converted to ordinate form, so applying a pair is a plain weighted sum
//! over the derivative history.

use log::{debug, warn};
use serde::Serialize;

use crate::integration::errors::{CoefficientError, Result};
use crate::integration::rational::RationalCoefficients;

/// Summed-Adams and Gauss-Jackson ordinate coefficients of one formula
///
/// Both arrays always have the same length. Index 0 weights the oldest
/// sample in the history window, the last index weights the newest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoefficientPair {
    summed_adams: Vec<f64>,
    gauss_jackson: Vec<f64>,
}

impl CoefficientPair {
    /// Create an empty pair that can grow to `capacity` terms without reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            summed_adams: Vec::with_capacity(capacity),
            gauss_jackson: Vec::with_capacity(capacity),
        }
    }

    /// Create a pair from explicit coefficient arrays
    ///
    /// # Panics
    ///
    /// Panics if the arrays differ in length.
    pub fn from_parts(summed_adams: Vec<f64>, gauss_jackson: Vec<f64>) -> Self {
        assert_eq!(
            summed_adams.len(),
            gauss_jackson.len(),
            "summed-Adams and Gauss-Jackson arrays must have the same length"
        );
        Self {
            summed_adams,
            gauss_jackson,
        }
    }

    /// Number of coefficients in each array
    pub fn len(&self) -> usize {
        self.summed_adams.len()
    }

    /// Whether the pair holds no coefficients
    pub fn is_empty(&self) -> bool {
        self.summed_adams.is_empty()
    }

    /// Summed-Adams (velocity-like) coefficients
    pub fn summed_adams(&self) -> &[f64] {
        &self.summed_adams
    }

    /// Gauss-Jackson (position-like) coefficients
    pub fn gauss_jackson(&self) -> &[f64] {
        &self.gauss_jackson
    }

    /// Fill both arrays from exact series already stripped of padding
    fn fill(&mut self, adams: &RationalCoefficients, stormer_cowell: &RationalCoefficients) {
        debug_assert_eq!(adams.len(), stormer_cowell.len());
        let n = adams.len();
        self.summed_adams.resize(n, 0.0);
        self.gauss_jackson.resize(n, 0.0);
        adams.convert_to_ordinate_form(&mut self.summed_adams);
        stormer_cowell.convert_to_ordinate_form(&mut self.gauss_jackson);
    }

    fn clear(&mut self) {
        self.summed_adams.clear();
        self.gauss_jackson.clear();
    }

    /// Apply the pair to a derivative history for a second-order system
    ///
    /// `acc_hist` holds one sample per coefficient, oldest first, each with
    /// `vel_sum.len()` elements. On return
    ///
    /// - `vel_sum[j] = Σᵢ acc_hist[i][j]·summed_adams[i]`
    /// - `pos_sum[j] = Σᵢ acc_hist[i][j]·gauss_jackson[i]`
    pub fn apply_two_state<S: AsRef<[f64]>>(
        &self,
        acc_hist: &[S],
        vel_sum: &mut [f64],
        pos_sum: &mut [f64],
    ) {
        debug_assert_eq!(acc_hist.len(), self.len());
        debug_assert_eq!(vel_sum.len(), pos_sum.len());

        vel_sum.fill(0.0);
        pos_sum.fill(0.0);

        // Outer loop over coefficients keeps each scalar in a register across the sample
        for ((sample, &sa), &gj) in acc_hist
            .iter()
            .zip(&self.summed_adams)
            .zip(&self.gauss_jackson)
        {
            let sample = sample.as_ref();
            debug_assert_eq!(sample.len(), vel_sum.len());
            for ((vel, pos), &acc) in vel_sum.iter_mut().zip(pos_sum.iter_mut()).zip(sample) {
                *vel += acc * sa;
                *pos += acc * gj;
            }
        }
    }

    /// Apply the summed-Adams coefficients to a first-order derivative history
    pub fn apply_one_state<S: AsRef<[f64]>>(&self, acc_hist: &[S], vel_sum: &mut [f64]) {
        debug_assert_eq!(acc_hist.len(), self.len());

        vel_sum.fill(0.0);

        for (sample, &sa) in acc_hist.iter().zip(&self.summed_adams) {
            let sample = sample.as_ref();
            debug_assert_eq!(sample.len(), vel_sum.len());
            for (vel, &acc) in vel_sum.iter_mut().zip(sample) {
                *vel += acc * sa;
            }
        }
    }
}

/// Predictor plus corrector ladder for a variable-order Gauss-Jackson integrator
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoefficientTable {
    order: usize,
    predictor: CoefficientPair,
    corrector: Vec<CoefficientPair>,
}

impl CoefficientTable {
    /// Create a table with storage for orders up to `max_order`
    pub fn with_max_order(max_order: usize) -> Self {
        let mut table = Self::default();
        table.configure(max_order);
        table
    }

    /// Allocate storage for orders up to `max_order`
    ///
    /// Any previously computed coefficients are discarded.
    pub fn configure(&mut self, max_order: usize) {
        let capacity = max_order + 1;
        self.order = 0;
        self.predictor = CoefficientPair::with_capacity(capacity);
        self.corrector = (0..capacity)
            .map(|_| CoefficientPair::with_capacity(capacity))
            .collect();
    }

    /// Largest order the table can hold, or `None` before [`configure`](Self::configure)
    pub fn max_order(&self) -> Option<usize> {
        self.corrector.len().checked_sub(1)
    }

    /// Order of the most recent [`compute_coeffs`](Self::compute_coeffs) call
    pub fn order(&self) -> usize {
        self.order
    }

    /// Predictor coefficients for the current order
    pub fn predictor(&self) -> &CoefficientPair {
        &self.predictor
    }

    /// Corrector coefficients for history position `index` (`0..=order`)
    pub fn corrector(&self, index: usize) -> Option<&CoefficientPair> {
        if index > self.order {
            return None;
        }
        self.corrector.get(index)
    }

    /// The populated corrector ladder, `0..=order`
    pub fn correctors(&self) -> &[CoefficientPair] {
        let end = (self.order + 1).min(self.corrector.len());
        &self.corrector[..end]
    }

    /// Populate the predictor and the corrector ladder for `order`
    ///
    /// May be called repeatedly as the integrator changes order; storage is
    /// reused as long as `order` stays within the configured maximum.
    ///
    /// # Errors
    ///
    /// - [`CoefficientError::NotConfigured`] if the table was never configured
    /// - [`CoefficientError::OrderExceedsCapacity`] if `order` is above `max_order`
    pub fn compute_coeffs(&mut self, order: usize) -> Result<()> {
        let max_order = self.max_order().ok_or(CoefficientError::NotConfigured)?;
        if order > max_order {
            warn!(
                "Rejecting Gauss-Jackson order {} (table capacity {})",
                order, max_order
            );
            return Err(CoefficientError::OrderExceedsCapacity { order, max_order });
        }

        debug!(
            "Computing Gauss-Jackson coefficients for order {} (capacity {})",
            order, max_order
        );

        // Two extra terms for the Stormer-Cowell leading discard, one more
        // for the Adams leading/trailing discard.
        let mut adams = RationalCoefficients::configure_adams_corrector(order + 3)?;
        let mut stormer_cowell = adams.construct_stormer_cowell_corrector();

        let adams_predictor = adams.construct_predictor();
        let stormer_cowell_predictor = stormer_cowell.construct_predictor();

        self.predictor.fill(
            &adams_predictor.discard_extra_terms(1, 1),
            &stormer_cowell_predictor.discard_extra_terms(2, 0),
        );
        self.corrector[order].fill(
            &adams.discard_extra_terms(1, 1),
            &stormer_cowell.discard_extra_terms(2, 0),
        );

        // Walk the ladder down by displacing the undiscarded series
        for index in (0..order).rev() {
            adams = adams.displace_back();
            stormer_cowell = stormer_cowell.displace_back();
            self.corrector[index].fill(
                &adams.discard_extra_terms(1, 1),
                &stormer_cowell.discard_extra_terms(2, 0),
            );
        }

        for stale in self.corrector.iter_mut().skip(order + 1) {
            stale.clear();
        }

        self.order = order;
        Ok(())
    }
}
