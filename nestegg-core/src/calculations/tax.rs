//! Multi-authority marginal tax estimation.
//!
//! One [`TaxCalculator`] call produces a [`TaxResult`] covering every
//! configured authority. The shared figures are computed once:
//!
//! - AGI = wages + short-term gains + business profit − retirement
//!   contribution.
//! - Deductions = the larger of the standard deduction and the itemized sum
//!   (mortgage interest + property tax). Wages-basis authorities reuse this
//!   same figure; they do not compute their own.
//!
//! Each authority then taxes its basis marginally: income inside a tier is
//! taxed at that tier's rate, and the walk stops at the first tier the
//! income does not reach.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use nestegg_core::calculations::TaxCalculator;
//! use nestegg_core::{
//!     AuthoritySpec, BracketTable, BracketTier, IncomeInputs, TaxableIncomeBasis,
//! };
//!
//! let brackets = BracketTable::new(vec![
//!     BracketTier::new(dec!(0), Some(dec!(23200)), dec!(0.10)),
//!     BracketTier::new(dec!(23200), None, dec!(0.12)),
//! ])
//! .unwrap();
//!
//! let authorities = vec![AuthoritySpec {
//!     name: "federal".to_string(),
//!     basis: TaxableIncomeBasis::AdjustedGross,
//!     brackets,
//!     credit: None,
//! }];
//!
//! let input = IncomeInputs {
//!     wages: dec!(52400),
//!     ..IncomeInputs::default()
//! };
//!
//! let calculator = TaxCalculator::new(&authorities, dec!(29200));
//! let result = calculator.calculate(&input);
//!
//! // 52400 - 29200 = 23200, all inside the 10% tier.
//! assert_eq!(result.taxable_income, dec!(23200));
//! assert_eq!(result.liability_for("federal"), Some(dec!(2320.00)));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{max, round_half_up};
use crate::models::{
    AuthorityOutcome, AuthoritySpec, BracketTable, IncomeInputs, TaxResult, TaxableIncomeBasis,
};

/// Calculator for one tax year's configuration: an ordered set of
/// authorities and the shared standard deduction.
///
/// Bracket tables are validated at construction ([`BracketTable::new`]), so
/// the calculation itself is total: every input produces a result, including
/// negative and zero edge cases. Range checking belongs to the caller.
#[derive(Debug, Clone)]
pub struct TaxCalculator<'a> {
    authorities: &'a [AuthoritySpec],
    standard_deduction: Decimal,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(
        authorities: &'a [AuthoritySpec],
        standard_deduction: Decimal,
    ) -> Self {
        Self {
            authorities,
            standard_deduction,
        }
    }

    /// Runs the estimate for every configured authority, in order.
    pub fn calculate(
        &self,
        input: &IncomeInputs,
    ) -> TaxResult {
        let agi = self.adjusted_gross_income(input);
        let deductions = self.deductions(input);

        let mut taxable_income = Decimal::ZERO;
        let mut seen_agi_basis = false;
        let mut outcomes = Vec::with_capacity(self.authorities.len());

        for authority in self.authorities {
            let base = self.taxable_income_for(authority.basis, agi, deductions, input);
            if !seen_agi_basis && authority.basis == TaxableIncomeBasis::AdjustedGross {
                taxable_income = base;
                seen_agi_basis = true;
            }

            let mut liability = self.bracket_tax(&authority.brackets, base);
            if let Some(credit) = &authority.credit {
                // The credit is subtracted as-is; a credit larger than the
                // accrued tax drives the liability negative rather than
                // flooring at zero.
                liability -=
                    input.credit_eligible_expenses.min(credit.expense_cap) * credit.rate;
            }
            let liability = round_half_up(liability);
            let refund_or_owed =
                round_half_up(input.withholding_for(&authority.name) - liability);

            outcomes.push(AuthorityOutcome {
                authority: authority.name.clone(),
                taxable_income: base,
                liability,
                refund_or_owed,
            });
        }

        TaxResult {
            agi,
            deductions,
            taxable_income,
            outcomes,
        }
    }

    fn adjusted_gross_income(
        &self,
        input: &IncomeInputs,
    ) -> Decimal {
        input.wages + input.short_term_gains + input.business_profit
            - input.retirement_contribution
    }

    /// The larger of the standard deduction and the itemized sum. Computed
    /// once and shared by every authority.
    fn deductions(
        &self,
        input: &IncomeInputs,
    ) -> Decimal {
        let itemized = input.mortgage_interest + input.property_tax;
        max(self.standard_deduction, itemized)
    }

    fn taxable_income_for(
        &self,
        basis: TaxableIncomeBasis,
        agi: Decimal,
        deductions: Decimal,
        input: &IncomeInputs,
    ) -> Decimal {
        match basis {
            TaxableIncomeBasis::AdjustedGross => max(agi - deductions, Decimal::ZERO),
            TaxableIncomeBasis::WagesOnly => max(
                input.wages - deductions - input.retirement_contribution,
                Decimal::ZERO,
            ),
        }
    }

    /// Marginal bracket walk: each tier taxes only the income inside it, and
    /// the walk stops at the first tier the income does not reach.
    fn bracket_tax(
        &self,
        brackets: &BracketTable,
        taxable_income: Decimal,
    ) -> Decimal {
        let mut tax = Decimal::ZERO;
        for tier in brackets.tiers() {
            if taxable_income <= tier.lower_bound {
                break;
            }
            let covered = match tier.upper_bound {
                Some(upper) => taxable_income.min(upper),
                None => taxable_income,
            };
            tax += (covered - tier.lower_bound) * tier.rate;
        }
        tax
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::models::{BracketTier, CreditRule};

    use super::*;

    const STANDARD_DEDUCTION: Decimal = dec!(29200);

    fn federal_brackets() -> BracketTable {
        BracketTable::new(vec![
            BracketTier::new(dec!(0), Some(dec!(23200)), dec!(0.10)),
            BracketTier::new(dec!(23200), Some(dec!(94300)), dec!(0.12)),
            BracketTier::new(dec!(94300), Some(dec!(201050)), dec!(0.22)),
            BracketTier::new(dec!(201050), Some(dec!(383900)), dec!(0.24)),
            BracketTier::new(dec!(383900), Some(dec!(487450)), dec!(0.32)),
            BracketTier::new(dec!(487450), Some(dec!(731200)), dec!(0.35)),
            BracketTier::new(dec!(731200), None, dec!(0.37)),
        ])
        .unwrap()
    }

    fn state_brackets() -> BracketTable {
        BracketTable::new(vec![
            BracketTier::new(dec!(0), Some(dec!(17150)), dec!(0.04)),
            BracketTier::new(dec!(17150), Some(dec!(23600)), dec!(0.045)),
            BracketTier::new(dec!(23600), Some(dec!(27900)), dec!(0.0525)),
            BracketTier::new(dec!(27900), Some(dec!(43000)), dec!(0.059)),
            BracketTier::new(dec!(43000), Some(dec!(161550)), dec!(0.0597)),
            BracketTier::new(dec!(161550), Some(dec!(323200)), dec!(0.0633)),
            BracketTier::new(dec!(323200), Some(dec!(2155350)), dec!(0.0685)),
            BracketTier::new(dec!(2155350), None, dec!(0.10)),
        ])
        .unwrap()
    }

    fn authorities() -> Vec<AuthoritySpec> {
        vec![
            AuthoritySpec {
                name: "federal".to_string(),
                basis: TaxableIncomeBasis::AdjustedGross,
                brackets: federal_brackets(),
                credit: Some(CreditRule {
                    expense_cap: dec!(6000),
                    rate: dec!(0.20),
                }),
            },
            AuthoritySpec {
                name: "state".to_string(),
                basis: TaxableIncomeBasis::WagesOnly,
                brackets: state_brackets(),
                credit: None,
            },
        ]
    }

    fn withholding(
        federal: Decimal,
        state: Decimal,
    ) -> BTreeMap<String, Decimal> {
        BTreeMap::from([
            ("federal".to_string(), federal),
            ("state".to_string(), state),
        ])
    }

    #[test]
    fn income_at_first_bracket_edge_is_taxed_at_the_bottom_rate_only() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        // 52400 - 29200 = 23200, exactly the first tier's upper bound.
        let result = calculator.calculate(&IncomeInputs {
            wages: dec!(52400),
            ..IncomeInputs::default()
        });

        assert_eq!(result.taxable_income, dec!(23200));
        assert_eq!(result.liability_for("federal"), Some(dec!(2320.00)));
    }

    #[test]
    fn liability_grows_marginally_across_a_bracket_boundary() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        let at_edge = calculator.calculate(&IncomeInputs {
            wages: dec!(52400),
            ..IncomeInputs::default()
        });
        let over_edge = calculator.calculate(&IncomeInputs {
            wages: dec!(52410),
            ..IncomeInputs::default()
        });

        // The 10 dollars past the boundary are taxed at 12%, not the whole
        // income at 12%.
        let delta = over_edge.liability_for("federal").unwrap()
            - at_edge.liability_for("federal").unwrap();
        assert_eq!(delta, dec!(1.20));
    }

    #[test]
    fn agi_subtracts_retirement_contribution() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        let result = calculator.calculate(&IncomeInputs {
            wages: dec!(100000),
            short_term_gains: dec!(5000),
            business_profit: dec!(20000),
            retirement_contribution: dec!(23000),
            ..IncomeInputs::default()
        });

        assert_eq!(result.agi, dec!(102000));
    }

    #[test]
    fn itemized_deductions_win_when_larger_than_standard() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        let result = calculator.calculate(&IncomeInputs {
            wages: dec!(200000),
            mortgage_interest: dec!(20000),
            property_tax: dec!(15000),
            ..IncomeInputs::default()
        });

        assert_eq!(result.deductions, dec!(35000));
        assert_eq!(result.taxable_income, dec!(165000));
    }

    #[test]
    fn all_zero_inputs_refund_the_withholding() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        let result = calculator.calculate(&IncomeInputs {
            withholding: withholding(dec!(3000), dec!(800)),
            ..IncomeInputs::default()
        });

        assert_eq!(result.agi, dec!(0));
        assert_eq!(result.deductions, STANDARD_DEDUCTION);
        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.liability_for("federal"), Some(dec!(0.00)));
        assert_eq!(result.refund_or_owed_for("federal"), Some(dec!(3000.00)));
        assert_eq!(result.refund_or_owed_for("state"), Some(dec!(800.00)));
    }

    #[test]
    fn credit_is_capped_at_the_eligible_expense_ceiling() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        let capped = calculator.calculate(&IncomeInputs {
            wages: dec!(152400),
            credit_eligible_expenses: dec!(10000),
            ..IncomeInputs::default()
        });
        let at_cap = calculator.calculate(&IncomeInputs {
            wages: dec!(152400),
            credit_eligible_expenses: dec!(6000),
            ..IncomeInputs::default()
        });

        // min(10000, 6000) * 0.20 = 1200 either way.
        assert_eq!(
            capped.liability_for("federal"),
            at_cap.liability_for("federal")
        );

        let no_credit = calculator.calculate(&IncomeInputs {
            wages: dec!(152400),
            ..IncomeInputs::default()
        });
        let delta = no_credit.liability_for("federal").unwrap()
            - capped.liability_for("federal").unwrap();
        assert_eq!(delta, dec!(1200.00));
    }

    #[test]
    fn oversized_credit_drives_liability_negative() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        // 34200 - 29200 = 5000 taxable; tax 500, credit 1200.
        let result = calculator.calculate(&IncomeInputs {
            wages: dec!(34200),
            credit_eligible_expenses: dec!(6000),
            ..IncomeInputs::default()
        });

        assert_eq!(result.liability_for("federal"), Some(dec!(-700.00)));
        assert_eq!(result.refund_or_owed_for("federal"), Some(dec!(700.00)));
    }

    #[test]
    fn state_basis_ignores_non_wage_income() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        let wages_only = calculator.calculate(&IncomeInputs {
            wages: dec!(100000),
            ..IncomeInputs::default()
        });
        let with_gains = calculator.calculate(&IncomeInputs {
            wages: dec!(100000),
            short_term_gains: dec!(50000),
            ..IncomeInputs::default()
        });

        // Gains move the federal figure but never the state one.
        assert_eq!(
            wages_only.outcome_for("state").unwrap().taxable_income,
            dec!(70800)
        );
        assert_eq!(
            with_gains.outcome_for("state").unwrap().taxable_income,
            dec!(70800)
        );
        assert!(
            with_gains.outcome_for("federal").unwrap().taxable_income
                > wages_only.outcome_for("federal").unwrap().taxable_income
        );
    }

    #[test]
    fn state_basis_reuses_the_shared_deductions_figure() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        // Itemizing raises the shared deductions, which lowers the state
        // taxable income too.
        let result = calculator.calculate(&IncomeInputs {
            wages: dec!(100000),
            mortgage_interest: dec!(30000),
            property_tax: dec!(10000),
            ..IncomeInputs::default()
        });

        assert_eq!(
            result.outcome_for("state").unwrap().taxable_income,
            dec!(60000)
        );
    }

    #[test]
    fn state_liability_walks_the_state_schedule() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        // State taxable: 100000 - 29200 = 70800.
        // 17150*0.04 + 6450*0.045 + 4300*0.0525 + 15100*0.059 + 27800*0.0597
        //   = 686 + 290.25 + 225.75 + 890.90 + 1659.66 = 3752.56
        let result = calculator.calculate(&IncomeInputs {
            wages: dec!(100000),
            ..IncomeInputs::default()
        });

        assert_eq!(result.liability_for("state"), Some(dec!(3752.56)));
    }

    #[test]
    fn refund_is_withholding_minus_liability() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        let result = calculator.calculate(&IncomeInputs {
            wages: dec!(100000),
            withholding: withholding(dec!(10000), dec!(3000)),
            ..IncomeInputs::default()
        });

        let federal = result.outcome_for("federal").unwrap();
        assert_eq!(federal.refund_or_owed, dec!(10000) - federal.liability);

        let state = result.outcome_for("state").unwrap();
        assert_eq!(state.refund_or_owed, dec!(3000) - state.liability);
    }

    #[test]
    fn outcomes_preserve_authority_order() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        let result = calculator.calculate(&IncomeInputs::default());

        let names: Vec<_> = result.outcomes.iter().map(|o| o.authority.as_str()).collect();
        assert_eq!(names, vec!["federal", "state"]);
    }

    #[test]
    fn negative_agi_taxes_to_zero() {
        let authorities = authorities();
        let calculator = TaxCalculator::new(&authorities, STANDARD_DEDUCTION);

        let result = calculator.calculate(&IncomeInputs {
            wages: dec!(10000),
            retirement_contribution: dec!(15000),
            ..IncomeInputs::default()
        });

        assert_eq!(result.agi, dec!(-5000));
        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.liability_for("federal"), Some(dec!(0.00)));
    }
}
