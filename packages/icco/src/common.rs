use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cosmwasm_std::{Uint128, Uint256};

// vaa payload types
pub const PAYLOAD_SALE_INIT: u8 = 1;
pub const PAYLOAD_CONTRIBUTIONS_ATTESTED: u8 = 2;
pub const PAYLOAD_SALE_SEALED: u8 = 3;
pub const PAYLOAD_SALE_ABORTED: u8 = 4;
pub const PAYLOAD_AUTHORITY_UPDATED: u8 = 5;

// upper bound on accepted tokens per sale, enforced at decode time
pub const ACCEPTED_TOKENS_MAX: usize = 10;

// conversion rates are fixed point with 9 decimals
pub const CONVERSION_RATE_PRECISION: u64 = 1_000_000_000;

// oversubscription scale factor is fixed point with 18 decimals
pub const SCALE_PRECISION: u128 = 1_000_000_000_000_000_000;

pub type SaleId = [u8; 32];

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct SaleTimes {
    pub start: u64,
    pub end: u64,
}

impl SaleTimes {
    /// Contributions are accepted for `start <= now < end`.
    pub fn is_open(&self, now: u64) -> bool {
        self.start <= now && now < self.end
    }

    pub fn has_ended(&self, now: u64) -> bool {
        now >= self.end
    }
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Active,
    Sealed,
    Aborted,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct AcceptedToken {
    pub token_index: u8,
    pub chain: u16,
    pub address: [u8; 32],
    pub conversion_rate: u64,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct AssetTotal {
    pub token_index: u8,
    pub address: [u8; 32],
    pub contributions: Uint128,
    pub allocations: Uint128,
    pub excess_contributions: Uint128,
}

impl AssetTotal {
    pub fn new(token_index: u8, address: [u8; 32]) -> Self {
        AssetTotal {
            token_index,
            address,
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Inactive,
    Active,
    AllocationClaimed,
    RefundClaimed,
}

impl Default for ClaimStatus {
    fn default() -> Self {
        ClaimStatus::Inactive
    }
}

/// Encodes a sequential sale number the way the conductor publishes it: a
/// big-endian u256.
pub fn sale_id_from_u64(value: u64) -> SaleId {
    let mut id = [0u8; 32];
    id[24..].copy_from_slice(&value.to_be_bytes());
    id
}

pub fn uint256_to_uint128(value: Uint256) -> Option<Uint128> {
    let bytes = value.to_be_bytes();
    if bytes[..16].iter().any(|&b| b != 0) {
        return None;
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&bytes[16..]);
    Some(Uint128::new(u128::from_be_bytes(low)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn window_is_half_open() {
        let times = SaleTimes {
            start: 100,
            end: 200,
        };
        assert!(!times.is_open(99));
        assert!(times.is_open(100));
        assert!(times.is_open(199));
        assert!(!times.is_open(200));
        assert!(!times.has_ended(199));
        assert!(times.has_ended(200));
    }

    #[test]
    fn narrowing_u256() {
        let fits = Uint256::from(u128::MAX);
        assert_eq!(uint256_to_uint128(fits), Some(Uint128::new(u128::MAX)));

        let too_large = fits.checked_add(Uint256::from(1u128)).unwrap();
        assert_eq!(uint256_to_uint128(too_large), None);
    }

    #[test]
    fn sequential_sale_ids() {
        let id = sale_id_from_u64(258);
        assert_eq!(&id[..30], &[0u8; 30]);
        assert_eq!(&id[30..], &[1u8, 2u8]);
    }
}
