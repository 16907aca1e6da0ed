use cosmwasm_std::{Binary, Deps, StdResult};

use crate::{
    error::ConductorError,
    msg::{ConfigResponse, ContributorResponse, SaleStatusResponse},
    state::{Sale, CONFIG, CONTRIBUTORS, NEXT_SALE_ID, SALES},
};

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    match CONFIG.load(deps.storage) {
        Ok(cfg) => Ok(ConfigResponse {
            wormhole: cfg.wormhole.to_string(),
            chain_id: cfg.chain_id,
            owner: cfg.owner.to_string(),
            next_sale_id: NEXT_SALE_ID.may_load(deps.storage)?.unwrap_or_default(),
        }),
        Err(_) => ConductorError::NotInitialized.std_err(),
    }
}

pub fn query_contributor(deps: Deps, chain_id: u16) -> StdResult<ContributorResponse> {
    match CONTRIBUTORS.may_load(deps.storage, chain_id)? {
        Some(emitter_address) => Ok(ContributorResponse {
            chain_id,
            emitter_address: emitter_address.to_vec(),
        }),
        None => ConductorError::UnregisteredContributor.std_err(),
    }
}

pub fn query_sale(deps: Deps, sale_id: &Binary) -> StdResult<Sale> {
    match SALES.load(deps.storage, sale_id.as_slice()) {
        Ok(sale) => Ok(sale),
        Err(_) => ConductorError::SaleNotFound.std_err(),
    }
}

pub fn query_sale_status(deps: Deps, sale_id: &Binary) -> StdResult<SaleStatusResponse> {
    let sale = query_sale(deps, sale_id)?;
    Ok(SaleStatusResponse {
        id: sale.id.to_vec(),
        status: sale.status,
        num_collected: sale.num_collected(),
    })
}
