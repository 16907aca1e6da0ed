use cosmwasm_std::{
    entry_point, to_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
};

use crate::{
    error::ConductorError,
    execute::{
        abort_sale, collect_contribution, create_sale, register_contributor, seal_sale,
        update_kyc_authority,
    },
    msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg},
    query::{query_config, query_contributor, query_sale, query_sale_status},
    state::{Config, CONFIG, NEXT_SALE_ID},
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
) -> Result<Response, ConductorError> {
    let cfg = Config {
        wormhole: deps.api.addr_validate(&msg.wormhole)?,
        chain_id: msg.chain_id,
        owner: info.sender,
    };
    CONFIG.save(deps.storage, &cfg)?;
    NEXT_SALE_ID.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("chain_id", cfg.chain_id.to_string())
        .add_attribute("owner", cfg.owner.as_str()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ConductorError> {
    match msg {
        ExecuteMsg::RegisterContributor {
            chain_id,
            emitter_address,
        } => register_contributor(deps, env, info, chain_id, &emitter_address),
        ExecuteMsg::CreateSale { sale } => create_sale(deps, env, info, &sale),
        ExecuteMsg::CollectContribution { signed_vaa } => {
            collect_contribution(deps, env, info, &signed_vaa)
        }
        ExecuteMsg::SealSale { sale_id } => seal_sale(deps, env, info, sale_id.as_slice()),
        ExecuteMsg::AbortSale { sale_id } => abort_sale(deps, env, info, sale_id.as_slice()),
        ExecuteMsg::UpdateKycAuthority {
            sale_id,
            new_authority,
        } => update_kyc_authority(deps, env, info, sale_id.as_slice(), &new_authority),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::Contributor { chain_id } => to_binary(&query_contributor(deps, chain_id)?),
        QueryMsg::Sale { sale_id } => to_binary(&query_sale(deps, &sale_id)?),
        QueryMsg::SaleStatus { sale_id } => to_binary(&query_sale_status(deps, &sale_id)?),
    }
}
