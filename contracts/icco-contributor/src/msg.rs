use cosmwasm_std::{Binary, Uint128};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use icco::common::{SaleStatus, SaleTimes};

use crate::state::BuyerContribution;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct InstantiateMsg {
    pub wormhole: String,
    pub chain_id: u16,

    pub conductor_chain: u16,
    pub conductor_address: Binary,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    InitSale {
        signed_vaa: Binary,
        native_token_decimals: u8,
    },

    Contribute {
        sale_id: Binary,
        token_index: u8,
        amount: Uint128,
        kyc_signature: Option<Binary>,
    },

    AttestContributions {
        sale_id: Binary,
    },

    SaleSealed {
        signed_vaa: Binary,
    },

    SaleAborted {
        signed_vaa: Binary,
    },

    UpdateKycAuthority {
        signed_vaa: Binary,
    },

    ClaimAllocation {
        sale_id: Binary,
        token_index: u8,
    },

    ClaimExcess {
        sale_id: Binary,
        token_index: u8,
    },

    ClaimRefund {
        sale_id: Binary,
        token_index: u8,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct MigrateMsg {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    Config {},

    Sale {
        sale_id: Binary,
    },

    SaleStatus {
        sale_id: Binary,
    },

    SaleTimes {
        sale_id: Binary,
    },

    TotalContribution {
        sale_id: Binary,
        token_index: u8,
    },

    TotalAllocation {
        sale_id: Binary,
        token_index: u8,
    },

    Buyer {
        sale_id: Binary,
        token_index: u8,
        buyer: String,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ConfigResponse {
    pub wormhole: String,
    pub chain_id: u16,
    pub conductor_chain: u16,
    pub conductor_address: Vec<u8>,
    pub owner: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SaleStatusResponse {
    pub id: Vec<u8>,
    pub status: SaleStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SaleTimesResponse {
    pub id: Vec<u8>,
    pub times: SaleTimes,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct TotalContributionResponse {
    pub id: Vec<u8>,
    pub token_index: u8,
    pub amount: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct TotalAllocationResponse {
    pub id: Vec<u8>,
    pub token_index: u8,
    pub allocations: Uint128,
    pub excess_contributions: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct BuyerResponse {
    pub id: Vec<u8>,
    pub token_index: u8,
    pub buyer: String,
    pub contribution: BuyerContribution,
}
