use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use icco::{
    allocation::pro_rata_share,
    common::{AssetTotal, ClaimStatus, SaleId, SaleStatus, SaleTimes},
    error::CommonError,
    messages::{ContributionsAttested, SaleInit, SaleSealed},
    replay::ReplayGuard,
};

use crate::error::ContributorError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Config {
    pub wormhole: Addr,
    pub chain_id: u16,
    pub conductor_chain: u16,
    pub conductor_address: [u8; 32],
    pub owner: Addr,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Sale {
    pub id: SaleId,
    pub token_address: [u8; 32],
    pub token_chain: u16,
    pub token_decimals: u8,
    pub native_token_decimals: u8,
    pub times: SaleTimes,
    pub recipient: [u8; 32],
    pub refund_recipient: [u8; 32],
    pub kyc_authority: [u8; 32],
    pub status: SaleStatus,

    // only tokens custodied on this chain, in conductor order
    pub totals: Vec<AssetTotal>,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct BuyerContribution {
    pub amount: Uint128,
    pub allocation: Uint128,
    pub excess: Uint128,
    pub status: ClaimStatus,
    pub excess_claimed: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Buyer {
    pub contributions: Vec<BuyerContribution>,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const SALES: Map<&[u8], Sale> = Map::new("sales");
pub const BUYERS: Map<(&[u8], &Addr), Buyer> = Map::new("buyers");
pub const CONSUMED_MESSAGES: ReplayGuard = ReplayGuard::new("consumed_messages");

impl Sale {
    pub fn from_sale_init(
        sale_init: &SaleInit,
        native_token_decimals: u8,
    ) -> Result<Self, ContributorError> {
        if native_token_decimals > sale_init.token_decimals {
            return Err(ContributorError::InvalidTokenDecimals);
        }

        Ok(Sale {
            id: sale_init.sale_id,
            token_address: sale_init.token_address,
            token_chain: sale_init.token_chain,
            token_decimals: sale_init.token_decimals,
            native_token_decimals,
            times: sale_init.times,
            recipient: sale_init.recipient,
            refund_recipient: sale_init.refund_recipient,
            kyc_authority: sale_init.kyc_authority,
            status: SaleStatus::Active,
            totals: sale_init
                .accepted_tokens
                .iter()
                .map(|token| AssetTotal::new(token.token_index, token.address))
                .collect(),
        })
    }

    pub fn requires_kyc(&self) -> bool {
        self.kyc_authority != [0u8; 32]
    }

    pub fn get_index(&self, token_index: u8) -> Result<usize, ContributorError> {
        self.totals
            .iter()
            .position(|total| total.token_index == token_index)
            .ok_or(ContributorError::UnknownToken)
    }

    pub fn update_total_contributions(
        &mut self,
        block_time: u64,
        token_index: u8,
        contributed: Uint128,
    ) -> Result<usize, ContributorError> {
        if self.status != SaleStatus::Active {
            return Err(ContributorError::SaleNotActive);
        }
        if !self.times.is_open(block_time) {
            return Err(ContributorError::ContributionWindowClosed);
        }

        let idx = self.get_index(token_index)?;
        let total = &mut self.totals[idx];
        total.contributions = total
            .contributions
            .checked_add(contributed)
            .map_err(|_| CommonError::AmountTooLarge)?;
        Ok(idx)
    }

    pub fn serialize_contributions(
        &self,
        block_time: u64,
        chain_id: u16,
    ) -> Result<Vec<u8>, ContributorError> {
        if self.status != SaleStatus::Active {
            return Err(ContributorError::SaleNotActive);
        }
        if !self.times.has_ended(block_time) {
            return Err(ContributorError::SaleNotAttestable);
        }

        let mut attested = ContributionsAttested::new(&self.id, chain_id, self.totals.len());
        for total in &self.totals {
            attested.add_contribution(total.token_index, total.contributions)?;
        }
        Ok(attested.serialize())
    }

    /// Stores the conductor's numbers for the tokens held on this chain. The
    /// sale token may carry fewer decimals here than on its origin chain, so
    /// allocations are scaled down accordingly.
    pub fn parse_sale_sealed(&mut self, sale_sealed: &SaleSealed) -> Result<(), ContributorError> {
        if self.status != SaleStatus::Active {
            return Err(ContributorError::SaleNotActive);
        }

        let decimal_difference =
            self.token_decimals.saturating_sub(self.native_token_decimals) as u32;

        let mut updated = self.totals.clone();
        for total in updated.iter_mut() {
            let allocation = sale_sealed
                .get_allocation(total.token_index)
                .ok_or_else(|| {
                    CommonError::AccountingInconsistency(format!(
                        "no allocation for token index {}",
                        total.token_index
                    ))
                })?;
            if allocation.excess_contributed > total.contributions {
                return Err(CommonError::AccountingInconsistency(format!(
                    "excess {} exceeds contributions {} for token index {}",
                    allocation.excess_contributed, total.contributions, total.token_index
                ))
                .into());
            }

            total.allocations = adjust_decimals(allocation.allocated, decimal_difference);
            total.excess_contributions = allocation.excess_contributed;
        }

        self.totals = updated;
        self.status = SaleStatus::Sealed;
        Ok(())
    }

    pub fn parse_sale_aborted(&mut self) -> Result<(), ContributorError> {
        if self.status != SaleStatus::Active {
            return Err(ContributorError::SaleNotActive);
        }
        self.status = SaleStatus::Aborted;
        Ok(())
    }

    pub fn update_kyc_authority(&mut self, new_authority: [u8; 32]) -> Result<(), ContributorError> {
        if self.status != SaleStatus::Active {
            return Err(ContributorError::SaleNotActive);
        }
        self.kyc_authority = new_authority;
        Ok(())
    }
}

// 10^39 exceeds u128::MAX, so anything scaled by that much is zero
fn adjust_decimals(amount: Uint128, decimal_difference: u32) -> Uint128 {
    match 10u128.checked_pow(decimal_difference) {
        Some(divisor) => Uint128::new(amount.u128() / divisor),
        None => Uint128::zero(),
    }
}

impl Buyer {
    pub fn new(num_totals: usize) -> Self {
        Buyer {
            contributions: vec![BuyerContribution::default(); num_totals],
        }
    }

    pub fn contribute(&mut self, idx: usize, amount: Uint128) -> Result<Uint128, ContributorError> {
        let contribution = self.get_mut(idx)?;
        match contribution.status {
            ClaimStatus::Inactive | ClaimStatus::Active => (),
            _ => return Err(ContributorError::AlreadyClaimed),
        }

        contribution.amount = contribution
            .amount
            .checked_add(amount)
            .map_err(|_| CommonError::AmountTooLarge)?;
        contribution.status = ClaimStatus::Active;
        Ok(contribution.amount)
    }

    pub fn claim_allocation(
        &mut self,
        idx: usize,
        total: &AssetTotal,
    ) -> Result<Uint128, ContributorError> {
        let contribution = self.get_claimable(idx)?;
        let allocation = pro_rata_share(
            total.allocations,
            contribution.amount,
            total.contributions,
        )?;

        let contribution = self.get_mut(idx)?;
        contribution.allocation = allocation;
        contribution.status = ClaimStatus::AllocationClaimed;
        Ok(allocation)
    }

    pub fn claim_excess(
        &mut self,
        idx: usize,
        total: &AssetTotal,
    ) -> Result<Uint128, ContributorError> {
        let contribution = self.get(idx)?;
        if contribution.excess_claimed {
            return Err(ContributorError::AlreadyClaimed);
        }
        if contribution.amount.is_zero() {
            return Err(ContributorError::NothingToClaim);
        }
        let excess = pro_rata_share(
            total.excess_contributions,
            contribution.amount,
            total.contributions,
        )?;

        let contribution = self.get_mut(idx)?;
        contribution.excess = excess;
        contribution.excess_claimed = true;
        Ok(excess)
    }

    pub fn claim_refund(&mut self, idx: usize) -> Result<Uint128, ContributorError> {
        self.get_claimable(idx)?;

        let contribution = self.get_mut(idx)?;
        contribution.excess = contribution.amount;
        contribution.status = ClaimStatus::RefundClaimed;
        Ok(contribution.amount)
    }

    pub fn get(&self, idx: usize) -> Result<&BuyerContribution, ContributorError> {
        self.contributions
            .get(idx)
            .ok_or(ContributorError::UnknownToken)
    }

    fn get_mut(&mut self, idx: usize) -> Result<&mut BuyerContribution, ContributorError> {
        self.contributions
            .get_mut(idx)
            .ok_or(ContributorError::UnknownToken)
    }

    fn get_claimable(&self, idx: usize) -> Result<BuyerContribution, ContributorError> {
        let contribution = *self.get(idx)?;
        match contribution.status {
            ClaimStatus::AllocationClaimed | ClaimStatus::RefundClaimed => {
                Err(ContributorError::AlreadyClaimed)
            }
            _ if contribution.amount.is_zero() => Err(ContributorError::NothingToClaim),
            _ => Ok(contribution),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use icco::messages::{Allocation, InitToken};

    fn sale_init() -> SaleInit {
        SaleInit {
            sale_id: [0u8; 32],
            token_address: [1u8; 32],
            token_chain: 2,
            token_decimals: 18,
            times: SaleTimes {
                start: 100,
                end: 200,
            },
            accepted_tokens: vec![
                InitToken {
                    token_index: 0,
                    address: [2u8; 32],
                },
                InitToken {
                    token_index: 2,
                    address: [3u8; 32],
                },
            ],
            recipient: [4u8; 32],
            refund_recipient: [5u8; 32],
            kyc_authority: [0u8; 32],
            contributor_chain: 3,
        }
    }

    fn allocation(token_index: u8, allocated: u128, excess: u128) -> Allocation {
        Allocation {
            token_index,
            allocated: Uint128::new(allocated),
            excess_contributed: Uint128::new(excess),
        }
    }

    #[test]
    fn native_decimals_cannot_exceed_sale_token() {
        assert!(matches!(
            Sale::from_sale_init(&sale_init(), 19),
            Err(ContributorError::InvalidTokenDecimals)
        ));
        let sale = Sale::from_sale_init(&sale_init(), 6).unwrap();
        assert_eq!(sale.native_token_decimals, 6);
        assert!(!sale.requires_kyc());
    }

    #[test]
    fn contribution_window() {
        let mut sale = Sale::from_sale_init(&sale_init(), 18).unwrap();
        let amount = Uint128::new(5);

        assert!(matches!(
            sale.update_total_contributions(99, 0, amount),
            Err(ContributorError::ContributionWindowClosed)
        ));
        assert_eq!(sale.update_total_contributions(100, 0, amount).unwrap(), 0);
        assert_eq!(sale.update_total_contributions(199, 2, amount).unwrap(), 1);
        assert!(matches!(
            sale.update_total_contributions(200, 0, amount),
            Err(ContributorError::ContributionWindowClosed)
        ));
        assert!(matches!(
            sale.update_total_contributions(150, 1, amount),
            Err(ContributorError::UnknownToken)
        ));
        assert_eq!(sale.totals[0].contributions, amount);
        assert_eq!(sale.totals[1].contributions, amount);
    }

    #[test]
    fn attest_only_after_end() {
        let mut sale = Sale::from_sale_init(&sale_init(), 18).unwrap();
        sale.update_total_contributions(150, 2, Uint128::new(7))
            .unwrap();

        assert!(matches!(
            sale.serialize_contributions(199, 3),
            Err(ContributorError::SaleNotAttestable)
        ));

        let attested = sale.serialize_contributions(200, 3).unwrap();
        let attested = ContributionsAttested::deserialize(&attested).unwrap();
        assert_eq!(attested.chain_id, 3);
        assert_eq!(attested.contributions.len(), 2);
        assert_eq!(attested.contributions[1].token_index, 2);
        assert_eq!(attested.contributions[1].amount, Uint128::new(7));
    }

    #[test]
    fn sealed_allocations_are_scaled_to_native_decimals() {
        let mut sale = Sale::from_sale_init(&sale_init(), 6).unwrap();
        sale.update_total_contributions(150, 0, Uint128::new(10))
            .unwrap();

        let sealed = SaleSealed {
            sale_id: [0u8; 32],
            allocations: vec![
                allocation(0, 3_000_000_000_000_000_000, 4),
                allocation(1, 1_000_000_000_000_000_000, 0),
                allocation(2, 0, 0),
            ],
        };
        sale.parse_sale_sealed(&sealed).unwrap();

        assert_eq!(sale.status, SaleStatus::Sealed);
        assert_eq!(sale.totals[0].allocations, Uint128::new(3_000_000));
        assert_eq!(sale.totals[0].excess_contributions, Uint128::new(4));
        assert_eq!(sale.totals[1].allocations, Uint128::zero());

        assert!(matches!(
            sale.parse_sale_sealed(&sealed),
            Err(ContributorError::SaleNotActive)
        ));
        assert!(matches!(
            sale.parse_sale_aborted(),
            Err(ContributorError::SaleNotActive)
        ));
    }

    #[test]
    fn sealed_message_must_cover_local_tokens() {
        let mut sale = Sale::from_sale_init(&sale_init(), 18).unwrap();
        let sealed = SaleSealed {
            sale_id: [0u8; 32],
            allocations: vec![allocation(0, 1, 0)],
        };

        let err = sale.parse_sale_sealed(&sealed).unwrap_err();
        assert!(matches!(
            err,
            ContributorError::Common(CommonError::AccountingInconsistency(_))
        ));
        assert_eq!(sale.status, SaleStatus::Active);
        assert_eq!(sale.totals[0].allocations, Uint128::zero());
    }

    #[test]
    fn excess_cannot_exceed_contributions() {
        let mut sale = Sale::from_sale_init(&sale_init(), 18).unwrap();
        let sealed = SaleSealed {
            sale_id: [0u8; 32],
            allocations: vec![allocation(0, 1, 1), allocation(2, 1, 0)],
        };

        assert!(matches!(
            sale.parse_sale_sealed(&sealed),
            Err(ContributorError::Common(
                CommonError::AccountingInconsistency(_)
            ))
        ));
    }

    #[test]
    fn decimal_adjustment() {
        assert_eq!(adjust_decimals(Uint128::new(1234), 0), Uint128::new(1234));
        assert_eq!(adjust_decimals(Uint128::new(1234), 2), Uint128::new(12));
        assert_eq!(adjust_decimals(Uint128::new(u128::MAX), 39), Uint128::zero());
    }

    #[test]
    fn buyer_claims() {
        let total = AssetTotal {
            token_index: 0,
            address: [2u8; 32],
            contributions: Uint128::new(10),
            allocations: Uint128::new(1000),
            excess_contributions: Uint128::new(4),
        };

        let mut buyer = Buyer::new(2);
        assert_eq!(buyer.contribute(0, Uint128::new(5)).unwrap(), Uint128::new(5));

        assert_eq!(buyer.claim_allocation(0, &total).unwrap(), Uint128::new(500));
        assert!(matches!(
            buyer.claim_allocation(0, &total),
            Err(ContributorError::AlreadyClaimed)
        ));

        // excess is tracked separately from the allocation
        assert_eq!(buyer.claim_excess(0, &total).unwrap(), Uint128::new(2));
        assert!(matches!(
            buyer.claim_excess(0, &total),
            Err(ContributorError::AlreadyClaimed)
        ));

        assert!(matches!(
            buyer.claim_allocation(1, &total),
            Err(ContributorError::NothingToClaim)
        ));
        assert!(matches!(
            buyer.claim_refund(2),
            Err(ContributorError::UnknownToken)
        ));
    }

    #[test]
    fn buyer_refund() {
        let mut buyer = Buyer::new(1);
        buyer.contribute(0, Uint128::new(3)).unwrap();
        buyer.contribute(0, Uint128::new(2)).unwrap();

        assert_eq!(buyer.claim_refund(0).unwrap(), Uint128::new(5));
        assert_eq!(buyer.contributions[0].status, ClaimStatus::RefundClaimed);
        assert!(matches!(
            buyer.claim_refund(0),
            Err(ContributorError::AlreadyClaimed)
        ));
        assert!(matches!(
            buyer.contribute(0, Uint128::new(1)),
            Err(ContributorError::AlreadyClaimed)
        ));
    }
}
