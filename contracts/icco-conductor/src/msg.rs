use cosmwasm_std::{Binary, Uint128, Uint256};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use icco::common::SaleStatus;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct InstantiateMsg {
    pub wormhole: String,
    pub chain_id: u16,
}

/// One accepted token as requested by the sale initiator. Token indices are
/// assigned in list order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct TokenConfig {
    pub chain: u16,
    pub address: Binary,
    pub conversion_rate: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct SaleConfig {
    pub token_address: Binary,
    pub token_chain: u16,
    pub token_decimals: u8,
    pub token_amount: Uint128,
    pub min_raise: Uint256,
    pub max_raise: Uint256,
    pub sale_start: u64,
    pub sale_end: u64,
    pub accepted_tokens: Vec<TokenConfig>,
    pub recipient: Binary,
    pub refund_recipient: Binary,
    pub kyc_authority: Option<Binary>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    RegisterContributor {
        chain_id: u16,
        emitter_address: Binary,
    },

    CreateSale {
        sale: SaleConfig,
    },

    CollectContribution {
        signed_vaa: Binary,
    },

    SealSale {
        sale_id: Binary,
    },

    AbortSale {
        sale_id: Binary,
    },

    UpdateKycAuthority {
        sale_id: Binary,
        new_authority: Binary,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct MigrateMsg {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    Config {},

    Contributor { chain_id: u16 },

    Sale { sale_id: Binary },

    SaleStatus { sale_id: Binary },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ConfigResponse {
    pub wormhole: String,
    pub chain_id: u16,
    pub owner: String,
    pub next_sale_id: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ContributorResponse {
    pub chain_id: u16,
    pub emitter_address: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SaleStatusResponse {
    pub id: Vec<u8>,
    pub status: SaleStatus,
    pub num_collected: u8,
}
