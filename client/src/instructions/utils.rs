use anchor_lang::AccountDeserialize;
use anyhow::Result;
use solana_sdk::{account::Account, pubkey::Pubkey};
use token_farm::states::{POOL_SEED, STAKER_ACCOUNT_SEED};

pub fn deserialize_anchor_account<T: AccountDeserialize>(account: &Account) -> Result<T> {
    let mut data: &[u8] = &account.data;
    T::try_deserialize(&mut data).map_err(Into::into)
}

pub fn get_pool_address(program_id: &Pubkey, stake_mint: &Pubkey) -> Pubkey {
    let (pool, _bump) = Pubkey::find_program_address(
        &[POOL_SEED.as_bytes(), stake_mint.as_ref()],
        program_id,
    );
    pool
}

pub fn get_authority_address(program_id: &Pubkey, pool: &Pubkey) -> Pubkey {
    let (authority, _bump) = Pubkey::find_program_address(
        &[token_farm::AUTH_SEED.as_bytes(), pool.as_ref()],
        program_id,
    );
    authority
}

pub fn get_stake_vault_address(program_id: &Pubkey, pool: &Pubkey) -> Pubkey {
    let (stake_vault, _bump) = Pubkey::find_program_address(
        &[token_farm::STAKE_VAULT_SEED.as_bytes(), pool.as_ref()],
        program_id,
    );
    stake_vault
}

pub fn get_reward_vault_address(program_id: &Pubkey, pool: &Pubkey) -> Pubkey {
    let (reward_vault, _bump) = Pubkey::find_program_address(
        &[token_farm::REWARD_VAULT_SEED.as_bytes(), pool.as_ref()],
        program_id,
    );
    reward_vault
}

pub fn get_staker_account_address(program_id: &Pubkey, pool: &Pubkey, owner: &Pubkey) -> Pubkey {
    let (staker_account, _bump) = Pubkey::find_program_address(
        &[
            STAKER_ACCOUNT_SEED.as_bytes(),
            pool.as_ref(),
            owner.as_ref(),
        ],
        program_id,
    );
    staker_account
}

/// Associated token account of `owner` for `mint` under `token_program`.
pub fn get_user_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address_with_program_id(
        owner,
        mint,
        token_program,
    )
}
