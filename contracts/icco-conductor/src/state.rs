use cosmwasm_std::{Addr, Binary, Uint128, Uint256};
use cw_storage_plus::{Item, Map};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use icco::{
    allocation::{compute_allocations, TokenContribution},
    common::{AcceptedToken, AssetTotal, SaleId, SaleStatus, SaleTimes, ACCEPTED_TOKENS_MAX},
    messages::{
        Allocation, AuthorityUpdated, ContributionsAttested, InitToken, SaleAborted, SaleInit,
        SaleSealed,
    },
    replay::ReplayGuard,
};

use crate::{error::ConductorError, msg::SaleConfig};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Config {
    pub wormhole: Addr,
    pub chain_id: u16,
    pub owner: Addr,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Sale {
    pub id: SaleId,
    pub token_address: [u8; 32],
    pub token_chain: u16,
    pub token_decimals: u8,
    pub token_amount: Uint128,
    pub min_raise: Uint256,
    pub max_raise: Uint256,
    pub times: SaleTimes,
    pub recipient: [u8; 32],
    pub refund_recipient: [u8; 32],
    pub kyc_authority: [u8; 32],
    pub initiator: Addr,
    pub status: SaleStatus,

    // indexed by token index
    pub accepted_tokens: Vec<AcceptedToken>,
    pub totals: Vec<AssetTotal>,
    pub collected: Vec<bool>,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const CONTRIBUTORS: Map<u16, [u8; 32]> = Map::new("contributors");
pub const NEXT_SALE_ID: Item<u64> = Item::new("next_sale_id");
pub const SALES: Map<&[u8], Sale> = Map::new("sales");
pub const CONSUMED_MESSAGES: ReplayGuard = ReplayGuard::new("consumed_messages");

pub fn to_bytes32(data: &Binary) -> Result<[u8; 32], ConductorError> {
    data.as_slice()
        .try_into()
        .map_err(|_| ConductorError::InvalidAddress)
}

impl Sale {
    pub fn from_config(
        id: SaleId,
        config: &SaleConfig,
        initiator: Addr,
        block_time: u64,
    ) -> Result<Self, ConductorError> {
        let times = SaleTimes {
            start: config.sale_start,
            end: config.sale_end,
        };
        if times.start < block_time || times.start >= times.end {
            return Err(ConductorError::InvalidSaleTimes);
        }
        if config.token_amount.is_zero() {
            return Err(ConductorError::ZeroAmount);
        }
        if config.max_raise.is_zero() || config.min_raise > config.max_raise {
            return Err(ConductorError::InvalidRaise);
        }

        let num_accepted = config.accepted_tokens.len();
        if num_accepted == 0 || num_accepted > ACCEPTED_TOKENS_MAX {
            return Err(ConductorError::InvalidAcceptedTokens);
        }

        let mut accepted_tokens = Vec::with_capacity(num_accepted);
        for (i, token) in config.accepted_tokens.iter().enumerate() {
            if token.conversion_rate == 0 {
                return Err(ConductorError::InvalidAcceptedTokens);
            }
            accepted_tokens.push(AcceptedToken {
                token_index: i as u8,
                chain: token.chain,
                address: to_bytes32(&token.address)?,
                conversion_rate: token.conversion_rate,
            });
        }

        let kyc_authority = match &config.kyc_authority {
            Some(authority) => to_bytes32(authority)?,
            None => [0u8; 32],
        };

        Ok(Sale {
            id,
            token_address: to_bytes32(&config.token_address)?,
            token_chain: config.token_chain,
            token_decimals: config.token_decimals,
            token_amount: config.token_amount,
            min_raise: config.min_raise,
            max_raise: config.max_raise,
            times,
            recipient: to_bytes32(&config.recipient)?,
            refund_recipient: to_bytes32(&config.refund_recipient)?,
            kyc_authority,
            initiator,
            status: SaleStatus::Active,
            totals: accepted_tokens
                .iter()
                .map(|token| AssetTotal::new(token.token_index, token.address))
                .collect(),
            collected: vec![false; num_accepted],
            accepted_tokens,
        })
    }

    /// Chains hosting at least one accepted token, in order of first appearance.
    pub fn contributor_chains(&self) -> Vec<u16> {
        let mut chains: Vec<u16> = Vec::new();
        for token in &self.accepted_tokens {
            if !chains.contains(&token.chain) {
                chains.push(token.chain);
            }
        }
        chains
    }

    /// One SaleInit per contributor chain, each listing only the tokens that
    /// chain custodies.
    pub fn sale_inits(&self) -> Vec<SaleInit> {
        self.contributor_chains()
            .into_iter()
            .map(|chain| SaleInit {
                sale_id: self.id,
                token_address: self.token_address,
                token_chain: self.token_chain,
                token_decimals: self.token_decimals,
                times: self.times,
                accepted_tokens: self
                    .accepted_tokens
                    .iter()
                    .filter(|token| token.chain == chain)
                    .map(|token| InitToken {
                        token_index: token.token_index,
                        address: token.address,
                    })
                    .collect(),
                recipient: self.recipient,
                refund_recipient: self.refund_recipient,
                kyc_authority: self.kyc_authority,
                contributor_chain: chain,
            })
            .collect()
    }

    pub fn is_fully_collected(&self) -> bool {
        self.collected.iter().all(|collected| *collected)
    }

    pub fn num_collected(&self) -> u8 {
        self.collected.iter().filter(|collected| **collected).count() as u8
    }

    /// Records a contributor chain's final totals. The attestation must cover
    /// every token custodied on `emitter_chain` and nothing else.
    pub fn collect_contributions(
        &mut self,
        block_time: u64,
        emitter_chain: u16,
        attested: &ContributionsAttested,
    ) -> Result<(), ConductorError> {
        if self.status != SaleStatus::Active {
            return Err(ConductorError::SaleNotActive);
        }
        if !self.times.has_ended(block_time) {
            return Err(ConductorError::SaleNotEnded);
        }
        if attested.chain_id != emitter_chain {
            return Err(ConductorError::WrongChain);
        }

        let mut indices = Vec::with_capacity(attested.contributions.len());
        for contribution in &attested.contributions {
            let idx = contribution.token_index as usize;
            match self.accepted_tokens.get(idx) {
                Some(token) if token.chain == emitter_chain => (),
                _ => return Err(ConductorError::UnknownToken),
            }
            if self.collected[idx] {
                return Err(ConductorError::ContributionAlreadyCollected);
            }
            indices.push((idx, contribution.amount));
        }

        let expected = self
            .accepted_tokens
            .iter()
            .filter(|token| token.chain == emitter_chain)
            .count();
        if indices.len() != expected {
            return Err(ConductorError::IncompleteAttestation);
        }

        for (idx, amount) in indices {
            self.totals[idx].contributions = amount;
            self.collected[idx] = true;
        }
        Ok(())
    }

    /// Runs the allocation over every collected total. Nothing is modified
    /// when the raise falls short; the caller decides to abort.
    pub fn seal(&mut self) -> Result<SaleSealed, ConductorError> {
        if self.status != SaleStatus::Active {
            return Err(ConductorError::SaleNotActive);
        }
        if !self.is_fully_collected() {
            return Err(ConductorError::ContributionsNotCollected);
        }

        let inputs: Vec<TokenContribution> = self
            .totals
            .iter()
            .zip(self.accepted_tokens.iter())
            .map(|(total, token)| TokenContribution {
                contributions: total.contributions,
                conversion_rate: token.conversion_rate,
            })
            .collect();
        let outcome =
            compute_allocations(&inputs, self.token_amount, self.min_raise, self.max_raise)?;

        let mut allocations = Vec::with_capacity(self.totals.len());
        for (i, total) in self.totals.iter_mut().enumerate() {
            total.allocations = outcome.allocations[i];
            total.excess_contributions = outcome.excess_contributions[i];
            allocations.push(Allocation {
                token_index: total.token_index,
                allocated: total.allocations,
                excess_contributed: total.excess_contributions,
            });
        }
        self.status = SaleStatus::Sealed;

        Ok(SaleSealed {
            sale_id: self.id,
            allocations,
        })
    }

    pub fn abort(&mut self) -> Result<SaleAborted, ConductorError> {
        if self.status != SaleStatus::Active {
            return Err(ConductorError::SaleNotActive);
        }
        self.status = SaleStatus::Aborted;
        Ok(SaleAborted { sale_id: self.id })
    }

    pub fn update_kyc_authority(
        &mut self,
        new_authority: [u8; 32],
    ) -> Result<AuthorityUpdated, ConductorError> {
        if self.status != SaleStatus::Active {
            return Err(ConductorError::SaleNotActive);
        }
        self.kyc_authority = new_authority;
        Ok(AuthorityUpdated {
            sale_id: self.id,
            new_authority,
        })
    }
}
