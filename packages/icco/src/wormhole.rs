//! Interface to the core bridge contract, which verifies VAAs on our behalf and
//! publishes outbound messages.

use cosmwasm_std::{
    to_binary, Binary, CosmosMsg, Deps, QueryRequest, StdResult, WasmMsg, WasmQuery,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// nonce is not used for ordering by any consumer
pub const WORMHOLE_NONCE: u32 = 0;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WormholeQueryMsg {
    VerifyVAA { vaa: Binary, block_time: u64 },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WormholeExecuteMsg {
    PostMessage { message: Binary, nonce: u32 },
}

/// Verified VAA body as returned by the core bridge. Guardian signatures have
/// already been checked when this is returned.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ParsedVAA {
    pub emitter_chain: u16,
    pub emitter_address: Vec<u8>,
    pub sequence: u64,
    pub payload: Vec<u8>,
    pub hash: Vec<u8>,
}

pub fn parse_vaa(
    deps: Deps,
    wormhole: &str,
    block_time: u64,
    data: &Binary,
) -> StdResult<ParsedVAA> {
    let vaa: ParsedVAA = deps.querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
        contract_addr: wormhole.to_string(),
        msg: to_binary(&WormholeQueryMsg::VerifyVAA {
            vaa: data.clone(),
            block_time,
        })?,
    }))?;
    Ok(vaa)
}

pub fn post_message(wormhole: &str, payload: Vec<u8>) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: wormhole.to_string(),
        funds: vec![],
        msg: to_binary(&WormholeExecuteMsg::PostMessage {
            message: Binary::from(payload),
            nonce: WORMHOLE_NONCE,
        })?,
    }))
}
