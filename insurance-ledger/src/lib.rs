//! Insurance Ledger Contract for AeroSurety
//!
//! Custodian of the consortium escrow pool and the passenger policy book.
//! Airline bonds, oracle fees, and passenger premiums all land in this
//! contract's token balance. When a flight settles as late due to the
//! airline, every open policy on it is credited one and a half times its
//! premium; passengers then withdraw their credit on demand. Crediting and
//! withdrawal are separate steps so settlement never depends on a
//! passenger-controlled transfer succeeding.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env, IntoVal, String,
    Symbol, Val, Vec,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Highest premium a passenger may pay for one policy (1 token at
/// 7 decimals).
pub const MAX_PREMIUM: i128 = 10_000_000;

/// Status code entitling policy holders to a payout. Mirrors the
/// flight-registry constant.
pub const STATUS_LATE_AIRLINE: u32 = 20;

#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotOperational = 1,
    Unauthorized = 2,
    AlreadyInitialized = 3,
    UnknownFlight = 9,
    FlightDeparted = 11,
    PremiumTooHigh = 12,
    DuplicatePolicy = 13,
    NoBalance = 14,
    InvalidAmount = 18,
}

/// Local mirror of FlightRegistry's Flight for cross-contract
/// deserialization. Field names and types must match the flight-registry
/// definition exactly.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Flight {
    pub airline: Address,
    pub designator: String,
    pub scheduled_at: u64,
    pub status: u32,
    pub resolved: bool,
}

/// One passenger's cover on one flight. `credited` latches once the
/// payout has been credited so repeated settlement runs cannot pay twice.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Policy {
    pub passenger: Address,
    pub premium: i128,
    pub purchased_at: u64,
    pub credited: bool,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct InsuranceLedger;

#[contractimpl]
impl InsuranceLedger {
    /// Initialize the ledger.
    ///
    /// # Arguments
    /// * `guard` - authorization-guard contract consulted before mutations
    /// * `token` - asset the pool is denominated in
    /// * `flight_registry` - contract answering flight queries
    pub fn initialize(
        env: Env,
        guard: Address,
        token: Address,
        flight_registry: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&symbol_short!("guard")) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&symbol_short!("guard"), &guard);
        env.storage().instance().set(&symbol_short!("token"), &token);
        env.storage()
            .instance()
            .set(&symbol_short!("flights"), &flight_registry);

        Ok(())
    }

    /// Buy cover on a flight. The premium moves into the pool immediately;
    /// one policy per passenger per flight, bought strictly before the
    /// scheduled departure.
    pub fn buy_insurance(
        env: Env,
        passenger: Address,
        airline: Address,
        designator: String,
        scheduled_at: u64,
        premium: i128,
    ) -> Result<(), ContractError> {
        passenger.require_auth();
        Self::require_operational(&env)?;

        let flight = Self::fetch_flight(&env, &airline, &designator, scheduled_at)?
            .ok_or(ContractError::UnknownFlight)?;
        if env.ledger().timestamp() >= flight.scheduled_at {
            return Err(ContractError::FlightDeparted);
        }

        if premium <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if premium > MAX_PREMIUM {
            return Err(ContractError::PremiumTooHigh);
        }

        let policy_key = (
            symbol_short!("policy"),
            passenger.clone(),
            airline.clone(),
            designator.clone(),
            scheduled_at,
        );
        if env.storage().persistent().has(&policy_key) {
            return Err(ContractError::DuplicatePolicy);
        }

        // Premium lands in the pool held by this contract.
        let token_addr: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("token"))
            .ok_or(ContractError::Unauthorized)?;
        let token_client = token::Client::new(&env, &token_addr);
        token_client.transfer(&passenger, &env.current_contract_address(), &premium);

        let policy = Policy {
            passenger: passenger.clone(),
            premium,
            purchased_at: env.ledger().timestamp(),
            credited: false,
        };
        env.storage().persistent().set(&policy_key, &policy);

        let roster_key = (
            symbol_short!("insured"),
            airline.clone(),
            designator.clone(),
            scheduled_at,
        );
        let mut roster: Vec<Address> = env
            .storage()
            .persistent()
            .get(&roster_key)
            .unwrap_or(Vec::new(&env));
        roster.push_back(passenger.clone());
        env.storage().persistent().set(&roster_key, &roster);

        env.events().publish(
            (symbol_short!("ins_buy"),),
            (passenger, airline, designator, scheduled_at, premium),
        );

        Ok(())
    }

    /// Credit payouts for a settled flight. Restricted to callers
    /// authorized in the guard.
    ///
    /// The committed status is read back from the flight registry rather
    /// than trusted from the caller. Anything other than a flight resolved
    /// late due to the airline leaves the book untouched, and policies
    /// already credited are skipped, so the operation can be replayed
    /// safely.
    pub fn credit_payouts(
        env: Env,
        caller: Address,
        airline: Address,
        designator: String,
        scheduled_at: u64,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_operational(&env)?;
        Self::require_authorized_caller(&env, &caller)?;

        let flight = match Self::fetch_flight(&env, &airline, &designator, scheduled_at)? {
            Some(f) => f,
            None => return Ok(()),
        };
        if !flight.resolved || flight.status != STATUS_LATE_AIRLINE {
            return Ok(());
        }

        let roster_key = (
            symbol_short!("insured"),
            airline.clone(),
            designator.clone(),
            scheduled_at,
        );
        let roster: Vec<Address> = env
            .storage()
            .persistent()
            .get(&roster_key)
            .unwrap_or(Vec::new(&env));

        for passenger in roster.iter() {
            let policy_key = (
                symbol_short!("policy"),
                passenger.clone(),
                airline.clone(),
                designator.clone(),
                scheduled_at,
            );
            let mut policy: Policy = match env.storage().persistent().get(&policy_key) {
                Some(p) => p,
                None => continue,
            };
            if policy.credited {
                continue;
            }

            let payout = Self::payout_amount(policy.premium);
            policy.credited = true;
            env.storage().persistent().set(&policy_key, &policy);

            let credit_key = (symbol_short!("credit"), passenger.clone());
            let balance: i128 = env.storage().persistent().get(&credit_key).unwrap_or(0);
            env.storage()
                .persistent()
                .set(&credit_key, &(balance + payout));

            env.events()
                .publish((symbol_short!("ins_cred"),), (passenger, payout));
        }

        Ok(())
    }

    /// Withdraw the caller's accumulated credit to their account,
    /// returning the amount paid out.
    pub fn withdraw(env: Env, passenger: Address) -> Result<i128, ContractError> {
        passenger.require_auth();
        Self::require_operational(&env)?;

        let credit_key = (symbol_short!("credit"), passenger.clone());
        let amount: i128 = env.storage().persistent().get(&credit_key).unwrap_or(0);
        if amount <= 0 {
            return Err(ContractError::NoBalance);
        }

        // Credit is zeroed before funds move.
        env.storage().persistent().set(&credit_key, &0i128);

        let token_addr: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("token"))
            .ok_or(ContractError::Unauthorized)?;
        let token_client = token::Client::new(&env, &token_addr);
        token_client.transfer(&env.current_contract_address(), &passenger, &amount);

        env.events()
            .publish((symbol_short!("ins_pay"),), (passenger, amount));

        Ok(amount)
    }

    /// Credit available for withdrawal.
    pub fn get_credit_balance(env: Env, passenger: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&(symbol_short!("credit"), passenger))
            .unwrap_or(0)
    }

    /// Get a passenger's policy on a flight.
    pub fn get_policy(
        env: Env,
        passenger: Address,
        airline: Address,
        designator: String,
        scheduled_at: u64,
    ) -> Option<Policy> {
        env.storage().persistent().get(&(
            symbol_short!("policy"),
            passenger,
            airline,
            designator,
            scheduled_at,
        ))
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

    fn fetch_flight(
        env: &Env,
        airline: &Address,
        designator: &String,
        scheduled_at: u64,
    ) -> Result<Option<Flight>, ContractError> {
        let registry: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("flights"))
            .ok_or(ContractError::Unauthorized)?;

        let args: Vec<Val> = Vec::from_array(
            env,
            [
                airline.into_val(env),
                designator.into_val(env),
                scheduled_at.into_val(env),
            ],
        );
        Ok(env.invoke_contract(&registry, &Symbol::new(env, "get_flight"), args))
    }

    /// One and a half times the premium, truncated.
    fn payout_amount(premium: i128) -> i128 {
        premium * 3 / 2
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{
        testutils::Address as _, testutils::Ledger as _, token, Address, Env, String,
    };

    // -- Mock collaborators ---------------------------------------------------

    #[contract]
    pub struct MockGuard;

    #[contractimpl]
    impl MockGuard {
        pub fn set_operational(env: Env, enabled: bool) {
            env.storage().instance().set(&symbol_short!("ops"), &enabled);
        }

        pub fn authorize(env: Env, caller: Address) {
            env.storage().persistent().set(&caller, &true);
        }

        pub fn is_operational(env: Env) -> bool {
            env.storage()
                .instance()
                .get(&symbol_short!("ops"))
                .unwrap_or(true)
        }

        pub fn is_authorized(env: Env, caller: Address) -> bool {
            env.storage().persistent().get(&caller).unwrap_or(false)
        }
    }

    #[contract]
    pub struct MockFlights;

    #[contractimpl]
    impl MockFlights {
        /// Test helper: publish a flight record under its key.
        pub fn set_flight(env: Env, flight: Flight) {
            let key = (
                flight.airline.clone(),
                flight.designator.clone(),
                flight.scheduled_at,
            );
            env.storage().persistent().set(&key, &flight);
        }

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
    }

    // -- Helpers -------------------------------------------------------------

    const DEPARTURE: u64 = 1_700_000_000;
    const STATUS_ON_TIME: u32 = 10;

    struct TestEnv<'a> {
        env: Env,
        ledger: InsuranceLedgerClient<'a>,
        ledger_addr: Address,
        guard: MockGuardClient<'a>,
        flights: MockFlightsClient<'a>,
        token_admin: token::StellarAssetClient<'a>,
        token: token::Client<'a>,
        airline: Address,
        passenger: Address,
        resolver: Address,
    }

    fn setup() -> TestEnv<'static> {
        let env = Env::default();
        env.mock_all_auths();

        let ledger_addr = env.register(InsuranceLedger, ());
        let ledger = InsuranceLedgerClient::new(&env, &ledger_addr);

        let guard_addr = env.register(MockGuard, ());
        let guard = MockGuardClient::new(&env, &guard_addr);

        let flights_addr = env.register(MockFlights, ());
        let flights = MockFlightsClient::new(&env, &flights_addr);

        let token_issuer = Address::generate(&env);
        let token_contract = env.register_stellar_asset_contract_v2(token_issuer);
        let token_addr = token_contract.address();
        let token = token::Client::new(&env, &token_addr);
        let token_admin = token::StellarAssetClient::new(&env, &token_addr);

        ledger.initialize(&guard_addr, &token_addr, &flights_addr);

        let airline = Address::generate(&env);
        let passenger = Address::generate(&env);
        token_admin.mint(&passenger, &(MAX_PREMIUM * 10));

        let resolver = Address::generate(&env);
        guard.authorize(&resolver);

        let ledger = unsafe {
            core::mem::transmute::<InsuranceLedgerClient<'_>, InsuranceLedgerClient<'static>>(
                ledger,
            )
        };
        let guard = unsafe {
            core::mem::transmute::<MockGuardClient<'_>, MockGuardClient<'static>>(guard)
        };
        let flights = unsafe {
            core::mem::transmute::<MockFlightsClient<'_>, MockFlightsClient<'static>>(flights)
        };
        let token = unsafe {
            core::mem::transmute::<token::Client<'_>, token::Client<'static>>(token)
        };
        let token_admin = unsafe {
            core::mem::transmute::<token::StellarAssetClient<'_>, token::StellarAssetClient<'static>>(
                token_admin,
            )
        };

        TestEnv {
            env,
            ledger,
            ledger_addr,
            guard,
            flights,
            token_admin,
            token,
            airline,
            passenger,
            resolver,
        }
    }

    fn designator(t: &TestEnv, code: &str) -> String {
        String::from_str(&t.env, code)
    }

    /// Publish an unresolved flight departing at DEPARTURE.
    fn open_flight(t: &TestEnv, code: &str) -> String {
        let d = designator(t, code);
        t.flights.set_flight(&Flight {
            airline: t.airline.clone(),
            designator: d.clone(),
            scheduled_at: DEPARTURE,
            status: 0,
            resolved: false,
        });
        d
    }

    /// Commit a status on a previously published flight.
    fn settle_flight(t: &TestEnv, d: &String, status: u32) {
        t.flights.set_flight(&Flight {
            airline: t.airline.clone(),
            designator: d.clone(),
            scheduled_at: DEPARTURE,
            status,
            resolved: true,
        });
    }

    // -- Tests ----------------------------------------------------------------

    #[test]
    fn test_buy_insurance() {
        let t = setup();
        let d = open_flight(&t, "ND109");

        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &MAX_PREMIUM);

        let policy = t
            .ledger
            .get_policy(&t.passenger, &t.airline, &d, &DEPARTURE)
            .unwrap();
        assert_eq!(policy.passenger, t.passenger);
        assert_eq!(policy.premium, MAX_PREMIUM);
        assert!(!policy.credited);

        // Verify the passenger landed on the flight's insured roster
        t.env.as_contract(&t.ledger_addr, || {
            let roster: Vec<Address> = t
                .env
                .storage()
                .persistent()
                .get(&(
                    symbol_short!("insured"),
                    t.airline.clone(),
                    d.clone(),
                    DEPARTURE,
                ))
                .unwrap();
            assert_eq!(roster.len(), 1);
            assert!(roster.contains(&t.passenger));
        });

        // The premium sits in the pool.
        assert_eq!(t.token.balance(&t.ledger_addr), MAX_PREMIUM);
        assert_eq!(t.token.balance(&t.passenger), MAX_PREMIUM * 9);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #3)")]
    fn test_initialize_already_initialized() {
        let t = setup();
        t.ledger.initialize(
            &Address::generate(&t.env),
            &Address::generate(&t.env),
            &Address::generate(&t.env),
        );
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #9)")]
    fn test_buy_insurance_unknown_flight() {
        let t = setup();
        t.ledger.buy_insurance(
            &t.passenger,
            &t.airline,
            &designator(&t, "ND999"),
            &DEPARTURE,
            &MAX_PREMIUM,
        );
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #11)")]
    fn test_buy_insurance_after_departure() {
        let t = setup();
        let d = open_flight(&t, "ND109");

        // Departure time itself is already too late.
        t.env.ledger().with_mut(|li| {
            li.timestamp = DEPARTURE;
        });
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &MAX_PREMIUM);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #18)")]
    fn test_buy_insurance_rejects_non_positive_premium() {
        let t = setup();
        let d = open_flight(&t, "ND109");
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &0);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #12)")]
    fn test_buy_insurance_rejects_premium_over_cap() {
        let t = setup();
        let d = open_flight(&t, "ND109");
        t.ledger.buy_insurance(
            &t.passenger,
            &t.airline,
            &d,
            &DEPARTURE,
            &(MAX_PREMIUM + 1),
        );
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #13)")]
    fn test_buy_insurance_duplicate_policy() {
        let t = setup();
        let d = open_flight(&t, "ND109");
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &1_000_000);
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &2_000_000);
    }

    #[test]
    fn test_same_passenger_covers_multiple_flights() {
        let t = setup();
        let d1 = open_flight(&t, "ND109");
        let d2 = open_flight(&t, "ND110");

        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d1, &DEPARTURE, &1_000_000);
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d2, &DEPARTURE, &2_000_000);

        assert_eq!(t.token.balance(&t.ledger_addr), 3_000_000);
    }

    #[test]
    fn test_credit_payouts_pays_one_and_a_half() {
        let t = setup();
        let d = open_flight(&t, "ND109");

        let other = Address::generate(&t.env);
        t.token_admin.mint(&other, &MAX_PREMIUM);

        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &MAX_PREMIUM);
        t.ledger
            .buy_insurance(&other, &t.airline, &d, &DEPARTURE, &1_000_001);

        settle_flight(&t, &d, STATUS_LATE_AIRLINE);
        t.ledger
            .credit_payouts(&t.resolver, &t.airline, &d, &DEPARTURE);

        assert_eq!(t.ledger.get_credit_balance(&t.passenger), 15_000_000);
        // Odd premiums truncate: 1_000_001 * 3 / 2.
        assert_eq!(t.ledger.get_credit_balance(&other), 1_500_001);

        let policy = t
            .ledger
            .get_policy(&t.passenger, &t.airline, &d, &DEPARTURE)
            .unwrap();
        assert!(policy.credited);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #2)")]
    fn test_credit_payouts_requires_authorized_caller() {
        let t = setup();
        let d = open_flight(&t, "ND109");
        settle_flight(&t, &d, STATUS_LATE_AIRLINE);

        let stranger = Address::generate(&t.env);
        t.ledger.credit_payouts(&stranger, &t.airline, &d, &DEPARTURE);
    }

    #[test]
    fn test_credit_payouts_ignores_other_statuses() {
        let t = setup();
        let d = open_flight(&t, "ND109");
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &MAX_PREMIUM);

        settle_flight(&t, &d, STATUS_ON_TIME);
        t.ledger
            .credit_payouts(&t.resolver, &t.airline, &d, &DEPARTURE);

        assert_eq!(t.ledger.get_credit_balance(&t.passenger), 0);
    }

    #[test]
    fn test_credit_payouts_ignores_unresolved_flight() {
        let t = setup();
        let d = open_flight(&t, "ND109");
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &MAX_PREMIUM);

        // Still open; nothing to credit yet.
        t.ledger
            .credit_payouts(&t.resolver, &t.airline, &d, &DEPARTURE);

        assert_eq!(t.ledger.get_credit_balance(&t.passenger), 0);
    }

    #[test]
    fn test_credit_payouts_replay_credits_once() {
        let t = setup();
        let d = open_flight(&t, "ND109");
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &MAX_PREMIUM);

        settle_flight(&t, &d, STATUS_LATE_AIRLINE);
        t.ledger
            .credit_payouts(&t.resolver, &t.airline, &d, &DEPARTURE);
        t.ledger
            .credit_payouts(&t.resolver, &t.airline, &d, &DEPARTURE);

        assert_eq!(t.ledger.get_credit_balance(&t.passenger), 15_000_000);
    }

    #[test]
    fn test_withdraw_pays_and_clears_credit() {
        let t = setup();
        let d = open_flight(&t, "ND109");
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &MAX_PREMIUM);

        // Bond deposits from airlines share the pool; they back the payout
        // beyond the collected premium.
        t.token_admin.mint(&t.ledger_addr, &(MAX_PREMIUM * 10));

        settle_flight(&t, &d, STATUS_LATE_AIRLINE);
        t.ledger
            .credit_payouts(&t.resolver, &t.airline, &d, &DEPARTURE);

        let before = t.token.balance(&t.passenger);
        let paid = t.ledger.withdraw(&t.passenger);

        assert_eq!(paid, 15_000_000);
        assert_eq!(t.token.balance(&t.passenger), before + 15_000_000);
        assert_eq!(t.ledger.get_credit_balance(&t.passenger), 0);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #14)")]
    fn test_withdraw_twice_fails() {
        let t = setup();
        let d = open_flight(&t, "ND109");
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &1_000_000);
        t.token_admin.mint(&t.ledger_addr, &MAX_PREMIUM);

        settle_flight(&t, &d, STATUS_LATE_AIRLINE);
        t.ledger
            .credit_payouts(&t.resolver, &t.airline, &d, &DEPARTURE);

        t.ledger.withdraw(&t.passenger);
        t.ledger.withdraw(&t.passenger);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #14)")]
    fn test_withdraw_without_credit() {
        let t = setup();
        t.ledger.withdraw(&t.passenger);
    }

    #[test]
    fn test_mutations_blocked_when_not_operational() {
        let t = setup();
        let d = open_flight(&t, "ND109");

        t.guard.set_operational(&false);

        assert_eq!(
            t.ledger
                .try_buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &1_000_000),
            Err(Ok(ContractError::NotOperational))
        );
        assert_eq!(
            t.ledger.try_withdraw(&t.passenger),
            Err(Ok(ContractError::NotOperational))
        );
    }

    #[test]
    #[should_panic(expected = "Error(Auth, InvalidAction)")]
    fn test_buy_insurance_requires_passenger_auth() {
        let t = setup();
        let d = open_flight(&t, "ND109");

        t.env.set_auths(&[]);
        t.ledger
            .buy_insurance(&t.passenger, &t.airline, &d, &DEPARTURE, &1_000_000);
    }

    // -- Property tests -------------------------------------------------------

    mod proptests {
        use super::super::{InsuranceLedger, MAX_PREMIUM};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn payout_is_premium_plus_half(premium in 1i128..=MAX_PREMIUM) {
                let payout = InsuranceLedger::payout_amount(premium);
                prop_assert_eq!(payout, premium + premium / 2);
            }

            #[test]
            fn payout_stays_within_bounds(premium in 1i128..=MAX_PREMIUM) {
                let payout = InsuranceLedger::payout_amount(premium);
                prop_assert!(payout >= premium);
                prop_assert!(payout <= 2 * premium);
                prop_assert!(payout <= MAX_PREMIUM + MAX_PREMIUM / 2);
            }
        }
    }
}
