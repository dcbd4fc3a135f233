//! Flight Registry Contract for AeroSurety
//!
//! Catalog of insurable flights published by funded consortium airlines. A
//! flight is identified by operating airline, designator, and scheduled
//! departure time. Its status starts unknown and is committed exactly once
//! by an authorized resolver (the oracle consensus engine); commits after
//! the first are ignored so a settled flight can never change outcome.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, IntoVal, String, Symbol,
    Val, Vec,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Flight status codes as reported by oracles. Only `STATUS_LATE_AIRLINE`
/// entitles policy holders to a payout.
pub const STATUS_UNKNOWN: u32 = 0;
pub const STATUS_ON_TIME: u32 = 10;
pub const STATUS_LATE_AIRLINE: u32 = 20;
pub const STATUS_LATE_WEATHER: u32 = 30;
pub const STATUS_LATE_TECHNICAL: u32 = 40;
pub const STATUS_LATE_OTHER: u32 = 50;

#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotOperational = 1,
    Unauthorized = 2,
    AlreadyInitialized = 3,
    NotFunded = 4,
    UnknownFlight = 9,
    DuplicateFlight = 10,
}

/// Flight record. `resolved` latches on the first status commit.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Flight {
    pub airline: Address,
    pub designator: String,
    pub scheduled_at: u64,
    pub status: u32,
    pub resolved: bool,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct FlightRegistry;

#[contractimpl]
impl FlightRegistry {
    /// Initialize the registry.
    ///
    /// # Arguments
    /// * `guard` - authorization-guard contract consulted before mutations
    /// * `airline_registry` - contract answering airline funding queries
    pub fn initialize(
        env: Env,
        guard: Address,
        airline_registry: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&symbol_short!("guard")) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&symbol_short!("guard"), &guard);
        env.storage()
            .instance()
            .set(&symbol_short!("airlines"), &airline_registry);

        Ok(())
    }

    /// Publish a flight for insurance. Only funded airlines may publish,
    /// and each (airline, designator, departure) triple exists once.
    pub fn register_flight(
        env: Env,
        airline: Address,
        designator: String,
        scheduled_at: u64,
    ) -> Result<(), ContractError> {
        airline.require_auth();
        Self::require_operational(&env)?;
        Self::require_funded_airline(&env, &airline)?;

        let key = (airline.clone(), designator.clone(), scheduled_at);
        if env.storage().persistent().has(&key) {
            return Err(ContractError::DuplicateFlight);
        }

        let flight = Flight {
            airline: airline.clone(),
            designator: designator.clone(),
            scheduled_at,
            status: STATUS_UNKNOWN,
            resolved: false,
        };
        env.storage().persistent().set(&key, &flight);

        env.events().publish(
            (symbol_short!("flt_reg"),),
            (airline, designator, scheduled_at),
        );

        Ok(())
    }

    /// Commit the status of a flight. Restricted to callers authorized in
    /// the guard. The first commit wins: a flight that is already resolved
    /// is left untouched, as is a key no flight was published under, so
    /// replayed or late consensus rounds cannot rewrite an outcome.
    pub fn resolve_flight(
        env: Env,
        caller: Address,
        airline: Address,
        designator: String,
        scheduled_at: u64,
        status: u32,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_operational(&env)?;
        Self::require_authorized_caller(&env, &caller)?;

        let key = (airline.clone(), designator.clone(), scheduled_at);
        let mut flight: Flight = match env.storage().persistent().get(&key) {
            Some(f) => f,
            None => return Ok(()),
        };
        if flight.resolved {
            return Ok(());
        }

        flight.status = status;
        flight.resolved = true;
        env.storage().persistent().set(&key, &flight);

        env.events().publish(
            (symbol_short!("flt_res"),),
            (airline, designator, scheduled_at, status),
        );

        Ok(())
    }

    /// Get the committed status of a flight.
    pub fn get_flight_status(
        env: Env,
        airline: Address,
        designator: String,
        scheduled_at: u64,
    ) -> Result<u32, ContractError> {
        let key = (airline, designator, scheduled_at);
        let flight: Flight = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(ContractError::UnknownFlight)?;
        Ok(flight.status)
    }

    /// Get the full flight record.
    pub fn get_flight(
        env: Env,
        airline: Address,
        designator: String,
        scheduled_at: u64,
    ) -> Option<Flight> {
        env.storage()
            .persistent()
            .get(&(airline, designator, scheduled_at))
    }

    /// Whether a flight has been published under this key.
    pub fn is_flight_registered(
        env: Env,
        airline: Address,
        designator: String,
        scheduled_at: u64,
    ) -> bool {
        env.storage()
            .persistent()
            .has(&(airline, designator, scheduled_at))
    }

    // Helper functions

    fn require_operational(env: &Env) -> Result<(), ContractError> {
        let guard: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("guard"))
            .ok_or(ContractError::Unauthorized)?;

        let operational: bool = env.invoke_contract(
            &guard,
            &Symbol::new(env, "is_operational"),
            Vec::<Val>::new(env),
        );

        if !operational {
            return Err(ContractError::NotOperational);
        }
        Ok(())
    }

    fn require_authorized_caller(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let guard: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("guard"))
            .ok_or(ContractError::Unauthorized)?;

        let args: Vec<Val> = Vec::from_array(env, [caller.into_val(env)]);
        let authorized: bool =
            env.invoke_contract(&guard, &Symbol::new(env, "is_authorized"), args);

        if !authorized {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn require_funded_airline(env: &Env, airline: &Address) -> Result<(), ContractError> {
        let registry: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("airlines"))
            .ok_or(ContractError::Unauthorized)?;

        let args: Vec<Val> = Vec::from_array(env, [airline.into_val(env)]);
        let funded: bool =
            env.invoke_contract(&registry, &Symbol::new(env, "is_funded_airline"), args);

        if !funded {
            return Err(ContractError::NotFunded);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
