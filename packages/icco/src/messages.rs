//! Binary payloads carried inside VAAs.
//!
//! Offsets are relative to the start of the verified payload, tag included.
//! Every chain participating in a sale must agree on these layouts bit for bit.

use std::collections::BTreeSet;

use cosmwasm_std::Uint128;

use crate::{
    byte_utils::{extend_u256_from_u128, extend_u256_from_u64, ByteUtils},
    common::{
        SaleId, SaleTimes, ACCEPTED_TOKENS_MAX, PAYLOAD_AUTHORITY_UPDATED,
        PAYLOAD_CONTRIBUTIONS_ATTESTED, PAYLOAD_SALE_ABORTED, PAYLOAD_SALE_INIT,
        PAYLOAD_SALE_SEALED,
    },
    error::CommonError,
};

// universal
pub const PAYLOAD_HEADER_LEN: usize = 33; // payload id + sale id
pub const INDEX_SALE_ID: usize = 1;

// for sale init
pub const INIT_INDEX_TOKEN_ADDRESS: usize = 33;
pub const INIT_INDEX_TOKEN_CHAIN: usize = 65;
pub const INIT_INDEX_TOKEN_DECIMALS: usize = 67;
pub const INIT_INDEX_SALE_START: usize = 68;
pub const INIT_INDEX_SALE_END: usize = 100;
pub const INIT_INDEX_ACCEPTED_TOKENS_START: usize = 132;
pub const ACCEPTED_TOKEN_NUM_BYTES: usize = 33; // token index + address
pub const INIT_TRAILER_LEN: usize = 98; // recipient + refund recipient + kyc authority + chain

// for attest contributions
pub const ATTEST_INDEX_CHAIN: usize = 33;
pub const ATTEST_INDEX_CONTRIBUTIONS_START: usize = 35;
pub const CONTRIBUTION_NUM_BYTES: usize = 33; // token index + amount

// for sale sealed
pub const SEALED_INDEX_ALLOCATIONS_START: usize = 33;
pub const ALLOCATION_NUM_BYTES: usize = 65; // token index + allocation + excess

// for authority updated
pub const AUTHORITY_UPDATED_LEN: usize = 65;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaleMessage {
    SaleInit(SaleInit),
    ContributionsAttested(ContributionsAttested),
    SaleSealed(SaleSealed),
    SaleAborted(SaleAborted),
    AuthorityUpdated(AuthorityUpdated),
}

impl SaleMessage {
    pub fn deserialize(data: &[u8]) -> Result<Self, CommonError> {
        let payload_id = match data.first() {
            Some(id) => *id,
            None => return Err(CommonError::malformed("empty payload")),
        };

        match payload_id {
            PAYLOAD_SALE_INIT => Ok(SaleMessage::SaleInit(SaleInit::deserialize(data)?)),
            PAYLOAD_CONTRIBUTIONS_ATTESTED => Ok(SaleMessage::ContributionsAttested(
                ContributionsAttested::deserialize(data)?,
            )),
            PAYLOAD_SALE_SEALED => Ok(SaleMessage::SaleSealed(SaleSealed::deserialize(data)?)),
            PAYLOAD_SALE_ABORTED => Ok(SaleMessage::SaleAborted(SaleAborted::deserialize(data)?)),
            PAYLOAD_AUTHORITY_UPDATED => Ok(SaleMessage::AuthorityUpdated(
                AuthorityUpdated::deserialize(data)?,
            )),
            other => Err(CommonError::malformed(format!(
                "unknown payload id {}",
                other
            ))),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            SaleMessage::SaleInit(m) => m.serialize(),
            SaleMessage::ContributionsAttested(m) => m.serialize(),
            SaleMessage::SaleSealed(m) => m.serialize(),
            SaleMessage::SaleAborted(m) => m.serialize(),
            SaleMessage::AuthorityUpdated(m) => m.serialize(),
        }
    }

    pub fn payload_id(&self) -> u8 {
        match self {
            SaleMessage::SaleInit(_) => PAYLOAD_SALE_INIT,
            SaleMessage::ContributionsAttested(_) => PAYLOAD_CONTRIBUTIONS_ATTESTED,
            SaleMessage::SaleSealed(_) => PAYLOAD_SALE_SEALED,
            SaleMessage::SaleAborted(_) => PAYLOAD_SALE_ABORTED,
            SaleMessage::AuthorityUpdated(_) => PAYLOAD_AUTHORITY_UPDATED,
        }
    }

    pub fn sale_id(&self) -> &SaleId {
        match self {
            SaleMessage::SaleInit(m) => &m.sale_id,
            SaleMessage::ContributionsAttested(m) => &m.sale_id,
            SaleMessage::SaleSealed(m) => &m.sale_id,
            SaleMessage::SaleAborted(m) => &m.sale_id,
            SaleMessage::AuthorityUpdated(m) => &m.sale_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitToken {
    pub token_index: u8,
    pub address: [u8; 32],
}

/// Announces a sale to one contributor chain. Only the tokens custodied on
/// `contributor_chain` are listed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleInit {
    pub sale_id: SaleId,
    pub token_address: [u8; 32],
    pub token_chain: u16,
    pub token_decimals: u8,
    pub times: SaleTimes,
    pub accepted_tokens: Vec<InitToken>,
    pub recipient: [u8; 32],
    pub refund_recipient: [u8; 32],
    pub kyc_authority: [u8; 32],
    pub contributor_chain: u16,
}

impl SaleInit {
    pub const PAYLOAD_ID: u8 = PAYLOAD_SALE_INIT;

    pub fn deserialize(data: &[u8]) -> Result<Self, CommonError> {
        check_payload_id(data, Self::PAYLOAD_ID)?;
        check_min_len(data, INIT_INDEX_ACCEPTED_TOKENS_START + 1)?;

        let num_accepted = check_count(data.get_u8(INIT_INDEX_ACCEPTED_TOKENS_START))?;
        let trailer = INIT_INDEX_ACCEPTED_TOKENS_START + 1 + ACCEPTED_TOKEN_NUM_BYTES * num_accepted;
        check_exact_len(data, trailer + INIT_TRAILER_LEN)?;

        let start = data
            .get_u256_as_u64(INIT_INDEX_SALE_START)
            .ok_or_else(|| CommonError::malformed("sale start exceeds u64"))?;
        let end = data
            .get_u256_as_u64(INIT_INDEX_SALE_END)
            .ok_or_else(|| CommonError::malformed("sale end exceeds u64"))?;

        let mut accepted_tokens = Vec::with_capacity(num_accepted);
        for i in 0..num_accepted {
            let offset = INIT_INDEX_ACCEPTED_TOKENS_START + 1 + ACCEPTED_TOKEN_NUM_BYTES * i;
            accepted_tokens.push(InitToken {
                token_index: data.get_u8(offset),
                address: data.get_bytes32(offset + 1),
            });
        }
        check_unique(accepted_tokens.iter().map(|t| t.token_index))?;

        Ok(SaleInit {
            sale_id: data.get_bytes32(INDEX_SALE_ID),
            token_address: data.get_bytes32(INIT_INDEX_TOKEN_ADDRESS),
            token_chain: data.get_u16(INIT_INDEX_TOKEN_CHAIN),
            token_decimals: data.get_u8(INIT_INDEX_TOKEN_DECIMALS),
            times: SaleTimes { start, end },
            accepted_tokens,
            recipient: data.get_bytes32(trailer),
            refund_recipient: data.get_bytes32(trailer + 32),
            kyc_authority: data.get_bytes32(trailer + 64),
            contributor_chain: data.get_u16(trailer + 96),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let tokens = &self.accepted_tokens;
        let mut serialized = Vec::with_capacity(
            INIT_INDEX_ACCEPTED_TOKENS_START
                + 1
                + ACCEPTED_TOKEN_NUM_BYTES * tokens.len()
                + INIT_TRAILER_LEN,
        );
        serialized.push(Self::PAYLOAD_ID);
        serialized.extend(self.sale_id);
        serialized.extend(self.token_address);
        serialized.extend(self.token_chain.to_be_bytes());
        serialized.push(self.token_decimals);
        extend_u256_from_u64(&mut serialized, self.times.start);
        extend_u256_from_u64(&mut serialized, self.times.end);

        serialized.push(tokens.len() as u8);
        for token in tokens {
            serialized.push(token.token_index);
            serialized.extend(token.address);
        }

        serialized.extend(self.recipient);
        serialized.extend(self.refund_recipient);
        serialized.extend(self.kyc_authority);
        serialized.extend(self.contributor_chain.to_be_bytes());
        serialized
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contribution {
    pub token_index: u8,
    pub amount: Uint128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContributionsAttested {
    pub sale_id: SaleId,
    pub chain_id: u16,
    pub contributions: Vec<Contribution>,
}

impl ContributionsAttested {
    pub const PAYLOAD_ID: u8 = PAYLOAD_CONTRIBUTIONS_ATTESTED;

    pub fn new(sale_id: &SaleId, chain_id: u16, capacity: usize) -> Self {
        ContributionsAttested {
            sale_id: *sale_id,
            chain_id,
            contributions: Vec::with_capacity(capacity),
        }
    }

    pub fn add_contribution(&mut self, token_index: u8, amount: Uint128) -> Result<(), CommonError> {
        if self.contributions.len() >= ACCEPTED_TOKENS_MAX {
            return Err(CommonError::malformed("too many contributions"));
        }
        if self.contributions.iter().any(|c| c.token_index == token_index) {
            return Err(CommonError::malformed(format!(
                "token index {} already attested",
                token_index
            )));
        }
        self.contributions.push(Contribution {
            token_index,
            amount,
        });
        Ok(())
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, CommonError> {
        check_payload_id(data, Self::PAYLOAD_ID)?;
        check_min_len(data, ATTEST_INDEX_CONTRIBUTIONS_START + 1)?;

        let num_contributions = check_count(data.get_u8(ATTEST_INDEX_CONTRIBUTIONS_START))?;
        check_exact_len(
            data,
            ATTEST_INDEX_CONTRIBUTIONS_START + 1 + CONTRIBUTION_NUM_BYTES * num_contributions,
        )?;

        let mut contributions = Vec::with_capacity(num_contributions);
        for i in 0..num_contributions {
            let offset = ATTEST_INDEX_CONTRIBUTIONS_START + 1 + CONTRIBUTION_NUM_BYTES * i;
            let amount = data
                .get_u256_as_u128(offset + 1)
                .ok_or_else(|| CommonError::malformed("contribution exceeds u128"))?;
            contributions.push(Contribution {
                token_index: data.get_u8(offset),
                amount: Uint128::new(amount),
            });
        }
        check_unique(contributions.iter().map(|c| c.token_index))?;

        Ok(ContributionsAttested {
            sale_id: data.get_bytes32(INDEX_SALE_ID),
            chain_id: data.get_u16(ATTEST_INDEX_CHAIN),
            contributions,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let contributions = &self.contributions;
        let mut serialized = Vec::with_capacity(
            ATTEST_INDEX_CONTRIBUTIONS_START + 1 + CONTRIBUTION_NUM_BYTES * contributions.len(),
        );
        serialized.push(Self::PAYLOAD_ID);
        serialized.extend(self.sale_id);
        serialized.extend(self.chain_id.to_be_bytes());
        serialized.push(contributions.len() as u8);
        for contribution in contributions {
            serialized.push(contribution.token_index);
            extend_u256_from_u128(&mut serialized, contribution.amount.u128());
        }
        serialized
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub token_index: u8,
    pub allocated: Uint128,
    pub excess_contributed: Uint128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleSealed {
    pub sale_id: SaleId,
    pub allocations: Vec<Allocation>,
}

impl SaleSealed {
    pub const PAYLOAD_ID: u8 = PAYLOAD_SALE_SEALED;

    pub fn get_allocation(&self, token_index: u8) -> Option<&Allocation> {
        self.allocations
            .iter()
            .find(|allocation| allocation.token_index == token_index)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, CommonError> {
        check_payload_id(data, Self::PAYLOAD_ID)?;
        check_min_len(data, SEALED_INDEX_ALLOCATIONS_START + 1)?;

        let num_allocations = check_count(data.get_u8(SEALED_INDEX_ALLOCATIONS_START))?;
        check_exact_len(
            data,
            SEALED_INDEX_ALLOCATIONS_START + 1 + ALLOCATION_NUM_BYTES * num_allocations,
        )?;

        let mut allocations = Vec::with_capacity(num_allocations);
        for i in 0..num_allocations {
            let offset = SEALED_INDEX_ALLOCATIONS_START + 1 + ALLOCATION_NUM_BYTES * i;
            let allocated = data
                .get_u256_as_u128(offset + 1)
                .ok_or_else(|| CommonError::malformed("allocation exceeds u128"))?;
            let excess_contributed = data
                .get_u256_as_u128(offset + 33)
                .ok_or_else(|| CommonError::malformed("excess contribution exceeds u128"))?;
            allocations.push(Allocation {
                token_index: data.get_u8(offset),
                allocated: Uint128::new(allocated),
                excess_contributed: Uint128::new(excess_contributed),
            });
        }
        check_unique(allocations.iter().map(|a| a.token_index))?;

        Ok(SaleSealed {
            sale_id: data.get_bytes32(INDEX_SALE_ID),
            allocations,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let allocations = &self.allocations;
        let mut serialized = Vec::with_capacity(
            SEALED_INDEX_ALLOCATIONS_START + 1 + ALLOCATION_NUM_BYTES * allocations.len(),
        );
        serialized.push(Self::PAYLOAD_ID);
        serialized.extend(self.sale_id);
        serialized.push(allocations.len() as u8);
        for allocation in allocations {
            serialized.push(allocation.token_index);
            extend_u256_from_u128(&mut serialized, allocation.allocated.u128());
            extend_u256_from_u128(&mut serialized, allocation.excess_contributed.u128());
        }
        serialized
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleAborted {
    pub sale_id: SaleId,
}

impl SaleAborted {
    pub const PAYLOAD_ID: u8 = PAYLOAD_SALE_ABORTED;

    pub fn deserialize(data: &[u8]) -> Result<Self, CommonError> {
        check_payload_id(data, Self::PAYLOAD_ID)?;
        check_exact_len(data, PAYLOAD_HEADER_LEN)?;
        Ok(SaleAborted {
            sale_id: data.get_bytes32(INDEX_SALE_ID),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut serialized = Vec::with_capacity(PAYLOAD_HEADER_LEN);
        serialized.push(Self::PAYLOAD_ID);
        serialized.extend(self.sale_id);
        serialized
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorityUpdated {
    pub sale_id: SaleId,
    pub new_authority: [u8; 32],
}

impl AuthorityUpdated {
    pub const PAYLOAD_ID: u8 = PAYLOAD_AUTHORITY_UPDATED;

    pub fn deserialize(data: &[u8]) -> Result<Self, CommonError> {
        check_payload_id(data, Self::PAYLOAD_ID)?;
        check_exact_len(data, AUTHORITY_UPDATED_LEN)?;
        Ok(AuthorityUpdated {
            sale_id: data.get_bytes32(INDEX_SALE_ID),
            new_authority: data.get_bytes32(PAYLOAD_HEADER_LEN),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut serialized = Vec::with_capacity(AUTHORITY_UPDATED_LEN);
        serialized.push(Self::PAYLOAD_ID);
        serialized.extend(self.sale_id);
        serialized.extend(self.new_authority);
        serialized
    }
}

fn check_payload_id(data: &[u8], payload_id: u8) -> Result<(), CommonError> {
    match data.first() {
        Some(id) if *id == payload_id => Ok(()),
        Some(_) => Err(CommonError::InvalidVaaAction),
        None => Err(CommonError::malformed("empty payload")),
    }
}

fn check_min_len(data: &[u8], min_len: usize) -> Result<(), CommonError> {
    if data.len() < min_len {
        return Err(CommonError::malformed(format!(
            "payload too short: expected at least {} bytes, got {}",
            min_len,
            data.len()
        )));
    }
    Ok(())
}

fn check_exact_len(data: &[u8], len: usize) -> Result<(), CommonError> {
    if data.len() != len {
        return Err(CommonError::malformed(format!(
            "payload length mismatch: expected {} bytes, got {}",
            len,
            data.len()
        )));
    }
    Ok(())
}

fn check_count(count: u8) -> Result<usize, CommonError> {
    let count = count as usize;
    if count > ACCEPTED_TOKENS_MAX {
        return Err(CommonError::malformed(format!(
            "too many accepted tokens: {} exceeds maximum {}",
            count, ACCEPTED_TOKENS_MAX
        )));
    }
    Ok(count)
}

fn check_unique<I: Iterator<Item = u8>>(indices: I) -> Result<(), CommonError> {
    let mut seen = BTreeSet::new();
    for token_index in indices {
        if !seen.insert(token_index) {
            return Err(CommonError::malformed(format!(
                "duplicate token index {}",
                token_index
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn arb_bytes32() -> impl Strategy<Value = [u8; 32]> {
        prop::array::uniform32(any::<u8>())
    }

    fn arb_token_indices() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::btree_set(any::<u8>(), 0..=ACCEPTED_TOKENS_MAX)
            .prop_map(|set| set.into_iter().collect())
    }

    fn arb_sale_init() -> impl Strategy<Value = SaleInit> {
        let tokens = arb_token_indices().prop_flat_map(|indices| {
            let n = indices.len();
            (Just(indices), prop::collection::vec(arb_bytes32(), n)).prop_map(
                |(indices, addresses)| {
                    indices
                        .into_iter()
                        .zip(addresses)
                        .map(|(token_index, address)| InitToken {
                            token_index,
                            address,
                        })
                        .collect::<Vec<_>>()
                },
            )
        });
        (
            (arb_bytes32(), arb_bytes32(), any::<u16>(), any::<u8>()),
            (any::<u64>(), any::<u64>()),
            tokens,
            (arb_bytes32(), arb_bytes32(), arb_bytes32(), any::<u16>()),
        )
            .prop_map(
                |(
                    (sale_id, token_address, token_chain, token_decimals),
                    (start, end),
                    accepted_tokens,
                    (recipient, refund_recipient, kyc_authority, contributor_chain),
                )| SaleInit {
                    sale_id,
                    token_address,
                    token_chain,
                    token_decimals,
                    times: SaleTimes { start, end },
                    accepted_tokens,
                    recipient,
                    refund_recipient,
                    kyc_authority,
                    contributor_chain,
                },
            )
    }

    fn arb_attested() -> impl Strategy<Value = ContributionsAttested> {
        let contributions = arb_token_indices().prop_flat_map(|indices| {
            let n = indices.len();
            (Just(indices), prop::collection::vec(any::<u128>(), n)).prop_map(
                |(indices, amounts)| {
                    indices
                        .into_iter()
                        .zip(amounts)
                        .map(|(token_index, amount)| Contribution {
                            token_index,
                            amount: Uint128::new(amount),
                        })
                        .collect::<Vec<_>>()
                },
            )
        });
        (arb_bytes32(), any::<u16>(), contributions).prop_map(
            |(sale_id, chain_id, contributions)| ContributionsAttested {
                sale_id,
                chain_id,
                contributions,
            },
        )
    }

    fn arb_sealed() -> impl Strategy<Value = SaleSealed> {
        let allocations = arb_token_indices().prop_flat_map(|indices| {
            let n = indices.len();
            (
                Just(indices),
                prop::collection::vec((any::<u128>(), any::<u128>()), n),
            )
                .prop_map(|(indices, amounts)| {
                    indices
                        .into_iter()
                        .zip(amounts)
                        .map(|(token_index, (allocated, excess))| Allocation {
                            token_index,
                            allocated: Uint128::new(allocated),
                            excess_contributed: Uint128::new(excess),
                        })
                        .collect::<Vec<_>>()
                })
        });
        (arb_bytes32(), allocations)
            .prop_map(|(sale_id, allocations)| SaleSealed {
                sale_id,
                allocations,
            })
    }

    fn arb_message() -> impl Strategy<Value = SaleMessage> {
        prop_oneof![
            arb_sale_init().prop_map(SaleMessage::SaleInit),
            arb_attested().prop_map(SaleMessage::ContributionsAttested),
            arb_sealed().prop_map(SaleMessage::SaleSealed),
            arb_bytes32().prop_map(|sale_id| SaleMessage::SaleAborted(SaleAborted { sale_id })),
            (arb_bytes32(), arb_bytes32()).prop_map(|(sale_id, new_authority)| {
                SaleMessage::AuthorityUpdated(AuthorityUpdated {
                    sale_id,
                    new_authority,
                })
            }),
        ]
    }

    proptest! {
        #[test]
        fn round_trip(message in arb_message()) {
            let encoded = message.serialize();
            prop_assert_eq!(encoded[0], message.payload_id());
            let decoded = SaleMessage::deserialize(&encoded).unwrap();
            prop_assert_eq!(&decoded, &message);
            prop_assert_eq!(decoded.serialize(), encoded);
        }

        #[test]
        fn truncation_is_malformed(message in arb_message(), cut in 1usize..64) {
            let encoded = message.serialize();
            let cut = cut.min(encoded.len());
            let truncated = &encoded[..encoded.len() - cut];
            let result = SaleMessage::deserialize(truncated);
            prop_assert!(result.is_err());
            prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::MalformedMessage);
        }
    }

    fn sample_sale_init(num_accepted: u8) -> SaleInit {
        SaleInit {
            sale_id: [0u8; 32],
            token_address: [1u8; 32],
            token_chain: 2,
            token_decimals: 18,
            times: SaleTimes {
                start: 908,
                end: 968,
            },
            accepted_tokens: (0..num_accepted)
                .map(|token_index| InitToken {
                    token_index,
                    address: [token_index + 16; 32],
                })
                .collect(),
            recipient: [2u8; 32],
            refund_recipient: [3u8; 32],
            kyc_authority: [4u8; 32],
            contributor_chain: 3,
        }
    }

    #[test]
    fn sale_init_offsets() {
        let encoded = sample_sale_init(2).serialize();
        assert_eq!(encoded.len(), 133 + 33 * 2 + INIT_TRAILER_LEN);
        assert_eq!(encoded[0], PAYLOAD_SALE_INIT);
        assert_eq!(&encoded[1..33], &[0u8; 32]);
        assert_eq!(&encoded[33..65], &[1u8; 32]);
        assert_eq!(&encoded[65..67], &[0u8, 2u8]);
        assert_eq!(encoded[67], 18);
        assert_eq!(&encoded[92..100], &908u64.to_be_bytes());
        assert_eq!(&encoded[124..132], &968u64.to_be_bytes());
        assert_eq!(encoded[132], 2);
        assert_eq!(encoded[133], 0);
        assert_eq!(&encoded[134..166], &[16u8; 32]);
        assert_eq!(encoded[166], 1);
        assert_eq!(&encoded[167..199], &[17u8; 32]);
        assert_eq!(&encoded[199..231], &[2u8; 32]);
        assert_eq!(&encoded[295..297], &[0u8, 3u8]);
    }

    #[test]
    fn sale_init_too_many_tokens() {
        let mut encoded = sample_sale_init(ACCEPTED_TOKENS_MAX as u8).serialize();
        encoded[INIT_INDEX_ACCEPTED_TOKENS_START] = (ACCEPTED_TOKENS_MAX + 1) as u8;

        let err = SaleInit::deserialize(&encoded).unwrap_err();
        assert!(
            matches!(err, CommonError::MalformedMessage(ref msg) if msg.contains("too many")),
            "unexpected error {:?}",
            err
        );
    }

    #[test]
    fn sale_init_duplicate_index() {
        let mut message = sample_sale_init(2);
        message.accepted_tokens[1].token_index = 0;

        let err = SaleInit::deserialize(&message.serialize()).unwrap_err();
        assert_eq!(err, CommonError::malformed("duplicate token index 0"));
    }

    #[test]
    fn sale_init_time_overflow() {
        let mut encoded = sample_sale_init(1).serialize();
        encoded[INIT_INDEX_SALE_END] = 1;

        let err = SaleInit::deserialize(&encoded).unwrap_err();
        assert_eq!(err, CommonError::malformed("sale end exceeds u64"));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut encoded = sample_sale_init(1).serialize();
        encoded.push(0);
        assert_eq!(
            SaleInit::deserialize(&encoded).unwrap_err().kind(),
            ErrorKind::MalformedMessage
        );
    }

    #[test]
    fn unknown_and_empty_payloads() {
        assert_eq!(
            SaleMessage::deserialize(&[]).unwrap_err(),
            CommonError::malformed("empty payload")
        );
        assert_eq!(
            SaleMessage::deserialize(&[9u8; 33]).unwrap_err(),
            CommonError::malformed("unknown payload id 9")
        );
    }

    #[test]
    fn unexpected_payload_id() {
        let encoded = SaleAborted { sale_id: [7u8; 32] }.serialize();
        assert_eq!(
            SaleSealed::deserialize(&encoded).unwrap_err(),
            CommonError::InvalidVaaAction
        );
    }

    #[test]
    fn test_sale_sealed() {
        let payload = "\
            03\
            0000000000000000000000000000000000000000000000000000000000000000\
            02\
            00\
            000000000000000000000000000000000000000000000000047a09633e414a52\
            0000000000000000000000000000000000000000000000000000000000000000\
            01\
            00000000000000000000000000000000000000000000000002fc06415c698000\
            0000000000000000000000000000000000000000000000000000000000000014";
        let payload = hex::decode(payload).unwrap();

        let sealed = SaleSealed::deserialize(&payload).unwrap();
        assert_eq!(sealed.sale_id, [0u8; 32]);
        assert_eq!(sealed.allocations.len(), 2);
        assert_eq!(
            sealed.get_allocation(0).unwrap().allocated,
            Uint128::new(322580645161290322)
        );
        assert_eq!(
            sealed.get_allocation(1).unwrap().allocated,
            Uint128::new(215053760000000000)
        );
        assert_eq!(
            sealed.get_allocation(1).unwrap().excess_contributed,
            Uint128::new(20)
        );
        assert!(sealed.get_allocation(2).is_none());
    }

    #[test]
    fn test_sale_sealed_amount_overflow() {
        let mut encoded = SaleSealed {
            sale_id: [0u8; 32],
            allocations: vec![Allocation {
                token_index: 0,
                allocated: Uint128::new(1),
                excess_contributed: Uint128::zero(),
            }],
        }
        .serialize();
        encoded[SEALED_INDEX_ALLOCATIONS_START + 2] = 1;

        assert_eq!(
            SaleSealed::deserialize(&encoded).unwrap_err(),
            CommonError::malformed("allocation exceeds u128")
        );
    }

    #[test]
    fn test_sale_aborted() {
        let payload = "\
            04\
            0000000000000000000000000000000000000000000000000000000000000001";
        let payload = hex::decode(payload).unwrap();

        let message = SaleMessage::deserialize(&payload).unwrap();
        assert_eq!(message.payload_id(), PAYLOAD_SALE_ABORTED);

        let mut expected_sale_id = [0u8; 32];
        expected_sale_id[31] = 1;
        assert_eq!(message.sale_id(), &expected_sale_id);

        let mut too_long = payload.clone();
        too_long.push(0);
        assert_eq!(
            SaleAborted::deserialize(&too_long).unwrap_err().kind(),
            ErrorKind::MalformedMessage
        );
    }

    #[test]
    fn attested_rejects_duplicates_when_building() {
        let mut attested = ContributionsAttested::new(&[0u8; 32], 3, 2);
        attested.add_contribution(0, Uint128::new(5)).unwrap();
        assert!(attested.add_contribution(0, Uint128::new(6)).is_err());
        attested.add_contribution(1, Uint128::new(6)).unwrap();

        let encoded = attested.serialize();
        assert_eq!(encoded.len(), 36 + 33 * 2);
        assert_eq!(&encoded[33..35], &[0u8, 3u8]);
        assert_eq!(encoded[35], 2);
    }
}
