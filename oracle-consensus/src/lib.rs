//! Oracle Consensus Engine Contract for AeroSurety
//!
//! Collects flight status reports from registered oracle nodes and settles
//! a flight once enough independent reports agree. Each oracle is dealt
//! three distinct index numbers at registration; a status request is tagged
//! with one randomly drawn index, and only oracles holding that index may
//! answer it. The first status to gather three matching reports wins the
//! round: the request closes, the flight registry commits the status, and
//! the insurance ledger is told to credit payouts when the airline is at
//! fault.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env, IntoVal, Map,
    String, Symbol, Val, Vec,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Fee an oracle node pays to register (1 token at 7 decimals). Paid into
/// the consortium pool and kept whatever the node later does.
pub const REGISTRATION_FEE: i128 = 10_000_000;

/// Matching reports required to settle a request.
pub const CONSENSUS_RESPONSES: u32 = 3;

/// Indexes dealt to each oracle at registration.
pub const ORACLE_INDEXES: u32 = 3;

/// Index numbers are drawn from 0 through MAX_INDEX inclusive.
pub const MAX_INDEX: u32 = 9;

/// Status code that triggers payout crediting. Mirrors the flight-registry
/// constant.
pub const STATUS_LATE_AIRLINE: u32 = 20;

#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotOperational = 1,
    Unauthorized = 2,
    AlreadyInitialized = 3,
    AlreadyRegistered = 5,
    IndexNotAssigned = 15,
    RequestNotOpen = 16,
    DuplicateResponse = 17,
    InsufficientFee = 19,
}

/// One status request round, keyed by (index, airline, designator,
/// departure). `responses` groups reporting oracles by the status they
/// reported; `is_open` drops once any status reaches consensus and the
/// round can never reopen.
#[contracttype]
#[derive(Clone, Debug)]
pub struct OracleRequest {
    pub requester: Address,
    pub is_open: bool,
    pub responses: Map<u32, Vec<Address>>,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct OracleConsensus;

#[contractimpl]
impl OracleConsensus {
    /// Initialize the engine.
    ///
    /// # Arguments
    /// * `guard` - authorization-guard contract consulted before mutations
    /// * `token` - asset registration fees are paid in
    /// * `flight_registry` - contract that commits settled statuses
    /// * `insurance_ledger` - pool custodian; receives fees and credits
    ///   payouts. This engine must be authorized in the guard for its
    ///   settlement calls to be accepted.
    pub fn initialize(
        env: Env,
        guard: Address,
        token: Address,
        flight_registry: Address,
        insurance_ledger: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&symbol_short!("guard")) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&symbol_short!("guard"), &guard);
        env.storage().instance().set(&symbol_short!("token"), &token);
        env.storage()
            .instance()
            .set(&symbol_short!("flights"), &flight_registry);
        env.storage()
            .instance()
            .set(&symbol_short!("ledger"), &insurance_ledger);

        Ok(())
    }

    /// Register an oracle node. The fee moves into the pool and the node
    /// is dealt three distinct indexes it keeps for life.
    pub fn register_oracle(env: Env, node: Address, fee: i128) -> Result<(), ContractError> {
        node.require_auth();
        Self::require_operational(&env)?;

        if env.storage().persistent().has(&node) {
            return Err(ContractError::AlreadyRegistered);
        }
        if fee < REGISTRATION_FEE {
            return Err(ContractError::InsufficientFee);
        }

        let token_addr: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("token"))
            .ok_or(ContractError::Unauthorized)?;
        let pool: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("ledger"))
            .ok_or(ContractError::Unauthorized)?;
        let token_client = token::Client::new(&env, &token_addr);
        token_client.transfer(&node, &pool, &fee);

        let indexes = Self::deal_indexes(&env);
        env.storage().persistent().set(&node, &indexes);

        env.events()
            .publish((symbol_short!("orc_new"),), (node, indexes));

        Ok(())
    }

    /// The indexes dealt to a node, if it is registered.
    pub fn get_oracle_indexes(env: Env, node: Address) -> Option<Vec<u32>> {
        env.storage().persistent().get(&node)
    }

    pub fn is_oracle_registered(env: Env, node: Address) -> bool {
        env.storage().persistent().has(&node)
    }

    /// Open a status request for a flight and return the drawn index.
    /// Oracles watch for the request event and answer if they hold the
    /// index.
    ///
    /// Drawing an index already open for this flight re-announces that
    /// round instead of starting a new one. Drawing an index whose round
    /// already settled is rejected, so a settled round stays settled.
    pub fn request_status(
        env: Env,
        requester: Address,
        airline: Address,
        designator: String,
        scheduled_at: u64,
    ) -> Result<u32, ContractError> {
        requester.require_auth();
        Self::require_operational(&env)?;

        let index: u32 = env.prng().gen_range::<u64>(0..=MAX_INDEX as u64) as u32;

        let key = (index, airline.clone(), designator.clone(), scheduled_at);
        match env.storage().persistent().get::<_, OracleRequest>(&key) {
            Some(existing) => {
                if !existing.is_open {
                    return Err(ContractError::RequestNotOpen);
                }
            }
            None => {
                let request = OracleRequest {
                    requester,
                    is_open: true,
                    responses: Map::new(&env),
                };
                env.storage().persistent().set(&key, &request);
            }
        }

        env.events().publish(
            (symbol_short!("orc_req"),),
            (index, airline, designator, scheduled_at),
        );

        Ok(index)
    }

    /// Report a flight status for an open request. The node must hold the
    /// request's index and may answer each round once. The third matching
    /// report settles the round.
    pub fn submit_response(
        env: Env,
        node: Address,
        index: u32,
        airline: Address,
        designator: String,
        scheduled_at: u64,
        status: u32,
    ) -> Result<(), ContractError> {
        node.require_auth();
        Self::require_operational(&env)?;

        let indexes: Vec<u32> = env
            .storage()
            .persistent()
            .get(&node)
            .ok_or(ContractError::IndexNotAssigned)?;
        if !indexes.contains(&index) {
            return Err(ContractError::IndexNotAssigned);
        }

        let key = (index, airline.clone(), designator.clone(), scheduled_at);
        let mut request: OracleRequest = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(ContractError::RequestNotOpen)?;
        if !request.is_open {
            return Err(ContractError::RequestNotOpen);
        }

        if Self::has_responded(&request, &node) {
            return Err(ContractError::DuplicateResponse);
        }

        let mut reporters: Vec<Address> = request
            .responses
            .get(status)
            .unwrap_or(Vec::new(&env));
        reporters.push_back(node.clone());
        let count = reporters.len();
        request.responses.set(status, reporters);

        env.events().publish(
            (symbol_short!("orc_rep"),),
            (airline.clone(), designator.clone(), scheduled_at, status),
        );

        if count >= CONSENSUS_RESPONSES {
            request.is_open = false;
            env.storage().persistent().set(&key, &request);

            env.events().publish(
                (symbol_short!("orc_fin"),),
                (airline.clone(), designator.clone(), scheduled_at, status),
            );

            Self::settle(&env, &airline, &designator, scheduled_at, status)?;
        } else {
            env.storage().persistent().set(&key, &request);
        }

        Ok(())
    }

    /// Whether a request round is open for answers.
    pub fn is_request_open(
        env: Env,
        index: u32,
        airline: Address,
        designator: String,
        scheduled_at: u64,
    ) -> bool {
        let key = (index, airline, designator, scheduled_at);
        match env.storage().persistent().get::<_, OracleRequest>(&key) {
            Some(request) => request.is_open,
            None => false,
        }
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

    /// Deal three distinct indexes from 0 through MAX_INDEX.
    fn deal_indexes(env: &Env) -> Vec<u32> {
        let mut indexes: Vec<u32> = Vec::new(env);
        while indexes.len() < ORACLE_INDEXES {
            let index: u32 = env.prng().gen_range::<u64>(0..=MAX_INDEX as u64) as u32;
            if !indexes.contains(&index) {
                indexes.push_back(index);
            }
        }
        indexes
    }

    fn has_responded(request: &OracleRequest, node: &Address) -> bool {
        for (_, reporters) in request.responses.iter() {
            if reporters.contains(node) {
                return true;
            }
        }
        false
    }

    /// Commit the consensus status to the flight registry and, when the
    /// airline is at fault, have the ledger credit the policy holders. The
    /// registry ignores commits for flights that already settled, so a
    /// second round on the same flight cannot rewrite the outcome.
    fn settle(
        env: &Env,
        airline: &Address,
        designator: &String,
        scheduled_at: u64,
        status: u32,
    ) -> Result<(), ContractError> {
        let flights: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("flights"))
            .ok_or(ContractError::Unauthorized)?;

        let resolve_args: Vec<Val> = Vec::from_array(
            env,
            [
                env.current_contract_address().into_val(env),
                airline.into_val(env),
                designator.into_val(env),
                scheduled_at.into_val(env),
                status.into_val(env),
            ],
        );
        env.invoke_contract::<Val>(&flights, &Symbol::new(env, "resolve_flight"), resolve_args);

        if status == STATUS_LATE_AIRLINE {
            let ledger: Address = env
                .storage()
                .instance()
                .get(&symbol_short!("ledger"))
                .ok_or(ContractError::Unauthorized)?;

            let credit_args: Vec<Val> = Vec::from_array(
                env,
                [
                    env.current_contract_address().into_val(env),
                    airline.into_val(env),
                    designator.into_val(env),
                    scheduled_at.into_val(env),
                ],
            );
            env.invoke_contract::<Val>(
                &ledger,
                &Symbol::new(env, "credit_payouts"),
                credit_args,
            );
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
