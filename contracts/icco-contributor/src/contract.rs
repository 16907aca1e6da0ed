use cosmwasm_std::{
    entry_point, to_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
};

use crate::{
    error::ContributorError,
    execute::{
        attest_contributions, claim_allocation, claim_excess, claim_refund, contribute, init_sale,
        sale_aborted, sale_sealed, update_kyc_authority,
    },
    msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg},
    query::{
        query_buyer, query_config, query_sale, query_sale_status, query_sale_times,
        query_total_allocation, query_total_contribution,
    },
    state::{Config, CONFIG},
};

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(_deps: DepsMut, _env: Env, _msg: MigrateMsg) -> StdResult<Response> {
    Ok(Response::new())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContributorError> {
    let conductor_address: [u8; 32] = msg
        .conductor_address
        .as_slice()
        .try_into()
        .map_err(|_| ContributorError::InvalidConductor)?;

    let cfg = Config {
        wormhole: deps.api.addr_validate(&msg.wormhole)?,
        chain_id: msg.chain_id,
        conductor_chain: msg.conductor_chain,
        conductor_address,
        owner: info.sender,
    };
    CONFIG.save(deps.storage, &cfg)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("chain_id", cfg.chain_id.to_string())
        .add_attribute("conductor_chain", cfg.conductor_chain.to_string())
        .add_attribute("conductor_address", hex::encode(&cfg.conductor_address)))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContributorError> {
    match msg {
        ExecuteMsg::InitSale {
            signed_vaa,
            native_token_decimals,
        } => init_sale(deps, env, info, &signed_vaa, native_token_decimals),
        ExecuteMsg::Contribute {
            sale_id,
            token_index,
            amount,
            kyc_signature,
        } => contribute(
            deps,
            env,
            info,
            sale_id.as_slice(),
            token_index,
            amount,
            kyc_signature,
        ),
        ExecuteMsg::AttestContributions { sale_id } => {
            attest_contributions(deps, env, info, sale_id.as_slice())
        }
        ExecuteMsg::SaleSealed { signed_vaa } => sale_sealed(deps, env, info, &signed_vaa),
        ExecuteMsg::SaleAborted { signed_vaa } => sale_aborted(deps, env, info, &signed_vaa),
        ExecuteMsg::UpdateKycAuthority { signed_vaa } => {
            update_kyc_authority(deps, env, info, &signed_vaa)
        }
        ExecuteMsg::ClaimAllocation {
            sale_id,
            token_index,
        } => claim_allocation(deps, env, info, sale_id.as_slice(), token_index),
        ExecuteMsg::ClaimExcess {
            sale_id,
            token_index,
        } => claim_excess(deps, env, info, sale_id.as_slice(), token_index),
        ExecuteMsg::ClaimRefund {
            sale_id,
            token_index,
        } => claim_refund(deps, env, info, sale_id.as_slice(), token_index),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::Sale { sale_id } => to_binary(&query_sale(deps, &sale_id)?),
        QueryMsg::SaleStatus { sale_id } => to_binary(&query_sale_status(deps, &sale_id)?),
        QueryMsg::SaleTimes { sale_id } => to_binary(&query_sale_times(deps, &sale_id)?),
        QueryMsg::TotalContribution {
            sale_id,
            token_index,
        } => to_binary(&query_total_contribution(deps, &sale_id, token_index)?),
        QueryMsg::TotalAllocation {
            sale_id,
            token_index,
        } => to_binary(&query_total_allocation(deps, &sale_id, token_index)?),
        QueryMsg::Buyer {
            sale_id,
            token_index,
            buyer,
        } => to_binary(&query_buyer(deps, &sale_id, token_index, buyer)?),
    }
}
