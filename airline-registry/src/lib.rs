//! Airline Registry Contract for AeroSurety
//!
//! Entity store and admission state machine for consortium airlines. While
//! fewer than four airlines belong to the consortium, any funded member can
//! admit a candidate directly; afterwards a candidate stays pending until
//! half of the membership snapshot taken at request time has voted for it.
//! A registered airline participates (votes, sponsors candidates, publishes
//! flights) only after banking the funding bond, which is escrowed in the
//! consortium pool held by the insurance ledger.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env, String, Symbol, Val,
    Vec,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Bond an airline must bank before it can participate (10 tokens at
/// 7 decimals). Deposits accumulate; the bond may be paid in instalments.
pub const FUNDING_BOND: i128 = 100_000_000;

/// Membership size below which candidates are admitted without a vote.
pub const BOOTSTRAP_AIRLINES: u32 = 4;

/// Admission lifecycle. Transitions only move forward:
/// Pending -> Registered -> Funded.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AirlineStatus {
    Pending = 0,
    Registered = 1,
    Funded = 2,
}

/// Failure codes. Discriminants come from a numbering shared by all
/// AeroSurety contracts; this crate declares only the codes it raises.
#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotOperational = 1,
    Unauthorized = 2,
    AlreadyInitialized = 3,
    NotFunded = 4,
    AlreadyRegistered = 5,
    UnknownAirline = 6,
    UnknownCandidate = 7,
    DuplicateVote = 8,
    InvalidAmount = 18,
}

/// Airline record, kept forever once created.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Airline {
    pub account: Address,
    pub name: String,
    pub status: AirlineStatus,
    /// Cumulative bond deposits.
    pub funded_amount: i128,
    /// Funded members that voted for this candidate. Never contains the
    /// candidate itself: a pending candidate cannot be funded, and only
    /// funded members may vote.
    pub votes: Vec<Address>,
    /// Registered-or-funded membership size when the admission request was
    /// opened. Later admissions do not move the bar for an in-flight vote.
    pub consensus_size: u32,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct AirlineRegistry;

#[contractimpl]
impl AirlineRegistry {
    /// Initialize the registry and genesis-register the first airline.
    ///
    /// # Arguments
    /// * `guard` - authorization-guard contract consulted before mutations
    /// * `token` - asset in which bonds are paid
    /// * `escrow_pool` - address holding consortium funds (insurance ledger)
    /// * `first_airline` - founding member, registered without a vote
    /// * `first_airline_name` - display name of the founding member
    pub fn initialize(
        env: Env,
        guard: Address,
        token: Address,
        escrow_pool: Address,
        first_airline: Address,
        first_airline_name: String,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&symbol_short!("guard")) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&symbol_short!("guard"), &guard);
        env.storage().instance().set(&symbol_short!("token"), &token);
        env.storage()
            .instance()
            .set(&symbol_short!("pool"), &escrow_pool);

        let founder = Airline {
            account: first_airline.clone(),
            name: first_airline_name,
            status: AirlineStatus::Registered,
            funded_amount: 0,
            votes: Vec::new(&env),
            consensus_size: 0,
        };
        env.storage().persistent().set(&first_airline, &founder);
        env.storage().instance().set(&symbol_short!("count"), &1u32);

        env.events()
            .publish((symbol_short!("init"),), (first_airline,));

        Ok(())
    }

    /// Open an admission request for `candidate`, sponsored by a funded
    /// member.
    ///
    /// Below the bootstrap size the candidate is admitted immediately;
    /// otherwise it is created pending with the current membership count
    /// frozen as its consensus snapshot. Re-sponsoring a pending candidate
    /// changes nothing and returns its current status.
    pub fn register_airline(
        env: Env,
        name: String,
        candidate: Address,
        requested_by: Address,
    ) -> Result<AirlineStatus, ContractError> {
        requested_by.require_auth();
        Self::require_operational(&env)?;
        Self::require_funded(&env, &requested_by)?;

        if let Some(existing) = Self::load_airline(&env, &candidate) {
            return match existing.status {
                AirlineStatus::Pending => Ok(AirlineStatus::Pending),
                _ => Err(ContractError::AlreadyRegistered),
            };
        }

        let count: u32 = Self::member_count(&env);

        let status = if count < BOOTSTRAP_AIRLINES {
            AirlineStatus::Registered
        } else {
            AirlineStatus::Pending
        };

        let airline = Airline {
            account: candidate.clone(),
            name,
            status,
            funded_amount: 0,
            votes: Vec::new(&env),
            consensus_size: count,
        };
        env.storage().persistent().set(&candidate, &airline);

        match status {
            AirlineStatus::Registered => {
                env.storage()
                    .instance()
                    .set(&symbol_short!("count"), &(count + 1));
                env.events()
                    .publish((symbol_short!("air_reg"),), (candidate,));
            }
            _ => {
                env.events()
                    .publish((symbol_short!("air_pend"),), (candidate, count));
            }
        }

        Ok(status)
    }

    /// Cast a vote for a pending candidate. One vote per member per
    /// candidate; the same member may back any number of distinct
    /// candidates. When votes reach half of the candidate's consensus
    /// snapshot the candidate is registered, and promoted straight to
    /// Funded if its bond is already banked.
    pub fn vote_airline(
        env: Env,
        candidate: Address,
        voter: Address,
    ) -> Result<AirlineStatus, ContractError> {
        voter.require_auth();
        Self::require_operational(&env)?;
        Self::require_funded(&env, &voter)?;

        let mut airline = Self::load_airline(&env, &candidate)
            .filter(|a| a.status == AirlineStatus::Pending)
            .ok_or(ContractError::UnknownCandidate)?;

        if airline.votes.contains(&voter) {
            return Err(ContractError::DuplicateVote);
        }
        airline.votes.push_back(voter.clone());

        env.events().publish(
            (symbol_short!("air_vote"),),
            (candidate.clone(), voter, airline.votes.len()),
        );

        if Self::meets_consensus(airline.votes.len(), airline.consensus_size) {
            airline.status = AirlineStatus::Registered;
            if airline.funded_amount >= FUNDING_BOND {
                airline.status = AirlineStatus::Funded;
            }

            let count: u32 = Self::member_count(&env);
            env.storage()
                .instance()
                .set(&symbol_short!("count"), &(count + 1));

            env.events()
                .publish((symbol_short!("air_reg"),), (candidate.clone(),));
            if airline.status == AirlineStatus::Funded {
                env.events()
                    .publish((symbol_short!("air_fund"),), (candidate.clone(),));
            }
        }

        let status = airline.status;
        env.storage().persistent().set(&candidate, &airline);

        Ok(status)
    }

    /// Deposit bond funds for an airline. The deposit moves into the
    /// consortium pool; once the cumulative total of a registered airline
    /// reaches the bond, the airline becomes Funded exactly once. Further
    /// deposits accumulate without a status change.
    pub fn add_fund(env: Env, airline: Address, amount: i128) -> Result<(), ContractError> {
        airline.require_auth();
        Self::require_operational(&env)?;

        let mut record =
            Self::load_airline(&env, &airline).ok_or(ContractError::UnknownAirline)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let token_addr: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("token"))
            .ok_or(ContractError::Unauthorized)?;
        let pool: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("pool"))
            .ok_or(ContractError::Unauthorized)?;

        let token_client = token::Client::new(&env, &token_addr);
        token_client.transfer(&airline, &pool, &amount);

        record.funded_amount += amount;

        env.events().publish(
            (symbol_short!("air_dep"),),
            (airline.clone(), amount, record.funded_amount),
        );

        if record.status == AirlineStatus::Registered && record.funded_amount >= FUNDING_BOND {
            record.status = AirlineStatus::Funded;
            env.events()
                .publish((symbol_short!("air_fund"),), (airline.clone(),));
        }

        env.storage().persistent().set(&airline, &record);

        Ok(())
    }

    /// Whether `airline` has been admitted (Registered or Funded).
    pub fn is_registered_airline(env: Env, airline: Address) -> bool {
        match Self::load_airline(&env, &airline) {
            Some(a) => a.status != AirlineStatus::Pending,
            None => false,
        }
    }

    /// Whether `airline` has banked its bond and may participate.
    pub fn is_funded_airline(env: Env, airline: Address) -> bool {
        match Self::load_airline(&env, &airline) {
            Some(a) => a.status == AirlineStatus::Funded,
            None => false,
        }
    }

    /// Whether `airline` has an admission vote in flight.
    pub fn is_pending_airline(env: Env, airline: Address) -> bool {
        match Self::load_airline(&env, &airline) {
            Some(a) => a.status == AirlineStatus::Pending,
            None => false,
        }
    }

    /// Get the full airline record.
    pub fn get_airline(env: Env, airline: Address) -> Option<Airline> {
        Self::load_airline(&env, &airline)
    }

    /// Current registered-or-funded membership size.
    pub fn airline_count(env: Env) -> u32 {
        Self::member_count(&env)
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

    fn require_funded(env: &Env, member: &Address) -> Result<(), ContractError> {
        match Self::load_airline(env, member) {
            Some(a) if a.status == AirlineStatus::Funded => Ok(()),
            _ => Err(ContractError::NotFunded),
        }
    }

    fn load_airline(env: &Env, airline: &Address) -> Option<Airline> {
        env.storage().persistent().get(airline)
    }

    fn member_count(env: &Env) -> u32 {
        env.storage()
            .instance()
            .get(&symbol_short!("count"))
            .unwrap_or(0)
    }

    /// Half-of-snapshot admission rule. Pending candidates always carry a
    /// snapshot of at least the bootstrap size.
    fn meets_consensus(votes: u32, snapshot: u32) -> bool {
        votes * 2 >= snapshot
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
