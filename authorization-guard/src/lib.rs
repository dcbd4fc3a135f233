//! Authorization Guard Contract for AeroSurety
//!
//! Single source of truth for whether the consortium is accepting mutating
//! operations, and for which contract addresses may invoke privileged
//! cross-contract operations (flight status commits, payout crediting).
//! Every other AeroSurety contract is wired to this one at initialization
//! and consults it before touching state.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, symbol_short, Address, Env, Vec};

/// Failure codes raised by this contract.
///
/// All AeroSurety contracts draw their error discriminants from one shared
/// numbering, so a client can resolve `Error(Contract, #n)` to a stable
/// label no matter which contract rejected the call. Each crate declares
/// only the codes it raises.
#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotOperational = 1,
    Unauthorized = 2,
    AlreadyInitialized = 3,
}

#[contract]
pub struct AuthorizationGuard;

#[contractimpl]
impl AuthorizationGuard {
    /// Initialize with the owner identity fixed for the contract's
    /// lifetime. Operations are accepted from the start; the
    /// privileged-caller set begins empty.
    pub fn initialize(env: Env, owner: Address) -> Result<(), ContractError> {
        if env.storage().instance().has(&symbol_short!("owner")) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&symbol_short!("owner"), &owner);
        env.storage().instance().set(&symbol_short!("ops"), &true);
        env.storage()
            .instance()
            .set(&symbol_short!("callers"), &Vec::<Address>::new(&env));

        env.events().publish((symbol_short!("init"),), (owner,));

        Ok(())
    }

    /// Accept or refuse mutating operations across the whole consortium
    /// (owner only). Setting the current value again succeeds, and the
    /// operational flag itself is deliberately not checked here — otherwise
    /// a halted system could never be re-enabled.
    pub fn set_operational(env: Env, enabled: bool) -> Result<(), ContractError> {
        Self::require_owner(&env)?;

        env.storage().instance().set(&symbol_short!("ops"), &enabled);

        env.events().publish((symbol_short!("ops_set"),), (enabled,));

        Ok(())
    }

    /// Admit a contract address to the privileged-caller set (owner only).
    /// Admitting an address twice keeps a single entry.
    pub fn authorize_caller(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_operational(&env)?;
        Self::require_owner(&env)?;

        let mut callers = Self::callers(&env);
        if !callers.contains(&caller) {
            callers.push_back(caller.clone());
            env.storage()
                .instance()
                .set(&symbol_short!("callers"), &callers);
        }

        env.events().publish((symbol_short!("auth_add"),), (caller,));

        Ok(())
    }

    /// Remove a contract address from the privileged-caller set (owner
    /// only). Removing an address that was never admitted is a no-op.
    pub fn revoke_caller(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_operational(&env)?;
        Self::require_owner(&env)?;

        let callers = Self::callers(&env);
        let mut kept = Vec::new(&env);
        for existing in callers.iter() {
            if existing != caller {
                kept.push_back(existing);
            }
        }
        env.storage().instance().set(&symbol_short!("callers"), &kept);

        env.events().publish((symbol_short!("auth_rem"),), (caller,));

        Ok(())
    }

    /// Whether mutating operations are currently accepted. Read queries
    /// across the consortium stay available regardless of this flag.
    pub fn is_operational(env: Env) -> bool {
        Self::operational(&env)
    }

    /// Whether `caller` may invoke privileged cross-contract operations.
    pub fn is_authorized(env: Env, caller: Address) -> bool {
        Self::callers(&env).contains(&caller)
    }

    /// Get the owner identity, if initialized.
    pub fn get_owner(env: Env) -> Option<Address> {
        env.storage().instance().get(&symbol_short!("owner"))
    }

    // Helper functions

    fn require_owner(env: &Env) -> Result<(), ContractError> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("owner"))
            .ok_or(ContractError::Unauthorized)?;

        owner.require_auth();

        Ok(())
    }

    fn require_operational(env: &Env) -> Result<(), ContractError> {
        if !Self::operational(env) {
            return Err(ContractError::NotOperational);
        }
        Ok(())
    }

    fn operational(env: &Env) -> bool {
        env.storage()
            .instance()
            .get(&symbol_short!("ops"))
            .unwrap_or(false)
    }

    fn callers(env: &Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&symbol_short!("callers"))
            .unwrap_or_else(|| Vec::new(env))
    }
}
