//! Reconciles final per-token contributions into sale token allocations and
//! refundable excess. Pure and deterministic so every chain can reproduce it.

use cosmwasm_std::{Uint128, Uint256, Uint512};

use crate::{
    common::{uint256_to_uint128, CONVERSION_RATE_PRECISION, SCALE_PRECISION},
    error::CommonError,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TokenContribution {
    pub contributions: Uint128,
    pub conversion_rate: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// Sum of denominated contributions before any oversubscription cut.
    pub total_raised: Uint256,
    pub accepted: Vec<Uint128>,
    pub allocations: Vec<Uint128>,
    pub excess_contributions: Vec<Uint128>,
}

/// Converts a token amount into the sale's denomination (floor).
pub fn denominate(amount: Uint128, conversion_rate: u64) -> Result<Uint256, CommonError> {
    Uint256::from(amount)
        .checked_mul(Uint256::from(conversion_rate))
        .map_err(|_| CommonError::AmountTooLarge)?
        .checked_div(Uint256::from(CONVERSION_RATE_PRECISION))
        .map_err(|_| CommonError::AmountTooLarge)
}

fn checked_sum(values: &[Uint256]) -> Result<Uint256, CommonError> {
    values.iter().try_fold(Uint256::zero(), |acc, value| {
        acc.checked_add(*value)
            .map_err(|_| CommonError::AmountTooLarge)
    })
}

/// `amount * numerator / denominator`, floored. The product is taken in 512
/// bits so only a quotient wider than 256 bits can fail.
fn mul_div(
    amount: Uint256,
    numerator: Uint256,
    denominator: Uint256,
) -> Result<Uint256, CommonError> {
    let quotient = Uint512::from(amount)
        .checked_mul(Uint512::from(numerator))
        .map_err(|_| CommonError::AmountTooLarge)?
        .checked_div(Uint512::from(denominator))
        .map_err(|_| CommonError::AmountTooLarge)?;
    Uint256::try_from(quotient).map_err(|_| CommonError::AmountTooLarge)
}

fn narrow(value: Uint256) -> Result<Uint128, CommonError> {
    uint256_to_uint128(value).ok_or(CommonError::AmountTooLarge)
}

/// Floor of `amount * part / whole`. A buyer's `part` can never exceed the
/// aggregate `whole` it was counted into.
pub fn pro_rata_share(
    amount: Uint128,
    part: Uint128,
    whole: Uint128,
) -> Result<Uint128, CommonError> {
    if part > whole {
        return Err(CommonError::AccountingInconsistency(format!(
            "share {} exceeds total {}",
            part, whole
        )));
    }
    if whole.is_zero() {
        return Ok(Uint128::zero());
    }
    narrow(mul_div(
        Uint256::from(amount),
        Uint256::from(part),
        Uint256::from(whole),
    )?)
}

/// Splits `sale_token_amount` across tokens in proportion to their accepted
/// denominated contributions. When the raise exceeds `max_raise`, every token's
/// contributions are scaled down by the same factor and the remainder becomes
/// refundable excess. Rounding dust stays unallocated.
pub fn compute_allocations(
    totals: &[TokenContribution],
    sale_token_amount: Uint128,
    min_raise: Uint256,
    max_raise: Uint256,
) -> Result<AllocationOutcome, CommonError> {
    let denominated = totals
        .iter()
        .map(|t| denominate(t.contributions, t.conversion_rate))
        .collect::<Result<Vec<_>, _>>()?;
    let total_raised = checked_sum(&denominated)?;

    if total_raised < min_raise {
        return Err(CommonError::RaiseBelowMinimum);
    }

    let mut accepted = Vec::with_capacity(totals.len());
    let mut excess_contributions = Vec::with_capacity(totals.len());
    if total_raised > max_raise {
        let precision = Uint256::from(SCALE_PRECISION);
        let scale = mul_div(max_raise, precision, total_raised)?;
        for total in totals {
            let cut = narrow(mul_div(Uint256::from(total.contributions), scale, precision)?)?;
            let excess = total.contributions.checked_sub(cut).map_err(|_| {
                CommonError::AccountingInconsistency(
                    "scaled contribution exceeds total".to_string(),
                )
            })?;
            accepted.push(cut);
            excess_contributions.push(excess);
        }
    } else {
        for total in totals {
            accepted.push(total.contributions);
            excess_contributions.push(Uint128::zero());
        }
    }

    let accepted_denominated = accepted
        .iter()
        .zip(totals.iter())
        .map(|(amount, t)| denominate(*amount, t.conversion_rate))
        .collect::<Result<Vec<_>, _>>()?;
    let total_accepted = checked_sum(&accepted_denominated)?;

    let allocations = match total_accepted.is_zero() {
        true => vec![Uint128::zero(); totals.len()],
        false => accepted_denominated
            .iter()
            .map(|value| {
                narrow(mul_div(
                    Uint256::from(sale_token_amount),
                    *value,
                    total_accepted,
                )?)
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(AllocationOutcome {
        total_raised,
        accepted,
        allocations,
        excess_contributions,
    })
}
