//! Stand-in for the core bridge in unit and integration tests. Test VAAs are
//! unsigned: emitter chain (u16) + emitter address (32 bytes) + sequence (u64)
//! + payload, hashed as a whole the way the bridge hashes a signed body.

use cosmwasm_std::testing::{MockApi, MockQuerier, MockStorage};
use cosmwasm_std::{
    from_binary, to_binary, Binary, ContractResult, OwnedDeps, QuerierResult, StdError, StdResult,
    SystemError, SystemResult, WasmQuery,
};

use crate::{
    byte_utils::ByteUtils,
    cryptography::keccak256,
    wormhole::{ParsedVAA, WormholeQueryMsg},
};

pub const WORMHOLE_ADDRESS: &str = "wormhole";

const VAA_HEADER_LEN: usize = 42;

pub fn mock_dependencies() -> OwnedDeps<MockStorage, MockApi, MockQuerier> {
    let mut deps = cosmwasm_std::testing::mock_dependencies();
    deps.querier.update_wasm(mock_wormhole);
    deps
}

pub fn signed_vaa(
    emitter_chain: u16,
    emitter_address: &[u8; 32],
    sequence: u64,
    payload: &[u8],
) -> Binary {
    let mut vaa = Vec::with_capacity(VAA_HEADER_LEN + payload.len());
    vaa.extend(emitter_chain.to_be_bytes());
    vaa.extend(emitter_address);
    vaa.extend(sequence.to_be_bytes());
    vaa.extend(payload);
    Binary::from(vaa)
}

fn verify_vaa(data: &[u8]) -> StdResult<ParsedVAA> {
    if data.len() < VAA_HEADER_LEN {
        return Err(StdError::generic_err("invalid vaa"));
    }
    Ok(ParsedVAA {
        emitter_chain: data.get_u16(0),
        emitter_address: data[2..34].to_vec(),
        sequence: data.get_u64(34),
        payload: data[VAA_HEADER_LEN..].to_vec(),
        hash: keccak256(data).to_vec(),
    })
}

fn mock_wormhole(query: &WasmQuery) -> QuerierResult {
    match query {
        WasmQuery::Smart { contract_addr, msg } if contract_addr == WORMHOLE_ADDRESS => {
            let result = from_binary::<WormholeQueryMsg>(msg).and_then(|msg| match msg {
                WormholeQueryMsg::VerifyVAA { vaa, .. } => {
                    to_binary(&verify_vaa(vaa.as_slice())?)
                }
            });
            match result {
                Ok(binary) => SystemResult::Ok(ContractResult::Ok(binary)),
                Err(err) => SystemResult::Ok(ContractResult::Err(err.to_string())),
            }
        }
        WasmQuery::Smart { contract_addr, .. } => SystemResult::Err(SystemError::NoSuchContract {
            addr: contract_addr.clone(),
        }),
        _ => SystemResult::Err(SystemError::UnsupportedRequest {
            kind: "wasm".to_string(),
        }),
    }
}
