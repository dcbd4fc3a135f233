//! Fuzz target for end-to-end flight settlement.
//!
//! Wires up the real guard, flight registry, insurance ledger, and oracle
//! consensus engine the way a deployment does, insures one flight for two
//! passengers, then feeds the oracle layer arbitrary register/request/
//! report/withdraw interleavings. After every step it checks that:
//! - a committed flight status never changes afterwards
//! - a settled request round never reopens
//! - passenger credit is exactly zero or one-and-a-half premiums, credited
//!   at most once, and withdrawable exactly once
//! - the pool always covers all outstanding credit
//! - the oracle layer only ever rejects with its declared failure codes

#![no_main]

use std::collections::HashSet;

use airline_registry::{AirlineRegistry, AirlineRegistryClient, FUNDING_BOND};
use arbitrary::Arbitrary;
use authorization_guard::{AuthorizationGuard, AuthorizationGuardClient};
use flight_registry::{Flight, FlightRegistry, FlightRegistryClient, STATUS_LATE_AIRLINE};
use insurance_ledger::{
    ContractError as LedgerError, InsuranceLedger, InsuranceLedgerClient, MAX_PREMIUM,
};
use libfuzzer_sys::fuzz_target;
use oracle_consensus::{
    ContractError as OracleError, OracleConsensus, OracleConsensusClient, REGISTRATION_FEE,
};
use soroban_sdk::{testutils::Address as _, token, Address, Env, String};

const NODES: usize = 12;
const PASSENGERS: usize = 2;
const DEPARTURE: u64 = 1_700_000_000;
const STATUSES: [u32; 6] = [0, 10, 20, 30, 40, 50];

#[derive(Debug, Arbitrary)]
enum Action {
    Register { node: u8 },
    Request,
    Report { node: u8, index: u8, status: u8 },
    Withdraw { passenger: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    premiums: [u32; PASSENGERS],
    actions: Vec<Action>,
}

fuzz_target!(|input: Input| {
    let env = Env::default();
    env.mock_all_auths();

    // Deployment wiring: guard, token, airline with a funded bond, one
    // published flight, the engine authorized to settle.
    let guard_addr = env.register(AuthorizationGuard, ());
    let guard = AuthorizationGuardClient::new(&env, &guard_addr);
    guard.initialize(&Address::generate(&env));

    let token_issuer = Address::generate(&env);
    let token_contract = env.register_stellar_asset_contract_v2(token_issuer);
    let token_addr = token_contract.address();
    let token = token::Client::new(&env, &token_addr);
    let token_admin = token::StellarAssetClient::new(&env, &token_addr);

    let registry_addr = env.register(AirlineRegistry, ());
    let registry = AirlineRegistryClient::new(&env, &registry_addr);
    let flights_addr = env.register(FlightRegistry, ());
    let flights = FlightRegistryClient::new(&env, &flights_addr);
    let ledger_addr = env.register(InsuranceLedger, ());
    let ledger = InsuranceLedgerClient::new(&env, &ledger_addr);
    let engine_addr = env.register(OracleConsensus, ());
    let engine = OracleConsensusClient::new(&env, &engine_addr);

    let airline = Address::generate(&env);
    registry.initialize(
        &guard_addr,
        &token_addr,
        &ledger_addr,
        &airline,
        &String::from_str(&env, "Fuzz Air"),
    );
    flights.initialize(&guard_addr, &registry_addr);
    ledger.initialize(&guard_addr, &token_addr, &flights_addr);
    engine.initialize(&guard_addr, &token_addr, &flights_addr, &ledger_addr);
    guard.authorize_caller(&engine_addr);

    token_admin.mint(&airline, &FUNDING_BOND);
    registry.add_fund(&airline, &FUNDING_BOND);

    let designator = String::from_str(&env, "ND109");
    flights.register_flight(&airline, &designator, &DEPARTURE);

    let requester = Address::generate(&env);

    // Two insured passengers with fuzzed premiums.
    let passengers: Vec<Address> = (0..PASSENGERS).map(|_| Address::generate(&env)).collect();
    let mut entitled = [0i128; PASSENGERS];
    let mut premium = [0i128; PASSENGERS];
    for (i, p) in passengers.iter().enumerate() {
        premium[i] = 1 + input.premiums[i] as i128 % MAX_PREMIUM;
        token_admin.mint(p, &premium[i]);
        ledger.buy_insurance(p, &airline, &designator, &DEPARTURE, &premium[i]);
    }

    let mut nodes: [Option<Address>; NODES] = Default::default();
    let mut opened: HashSet<u32> = HashSet::new();
    let mut closed: HashSet<u32> = HashSet::new();
    let mut committed: Option<u32> = None;

    for action in &input.actions {
        match action {
            Action::Register { node } => {
                let slot = *node as usize % NODES;
                if nodes[slot].is_none() {
                    let addr = Address::generate(&env);
                    token_admin.mint(&addr, &REGISTRATION_FEE);
                    engine.register_oracle(&addr, &REGISTRATION_FEE);
                    nodes[slot] = Some(addr);
                }
            }
            Action::Request => {
                match engine.try_request_status(&requester, &airline, &designator, &DEPARTURE) {
                    Ok(Ok(index)) => {
                        opened.insert(index);
                    }
                    Ok(Err(e)) => panic!("bad index value: {e:?}"),
                    Err(Ok(e)) => {
                        assert_eq!(e, OracleError::RequestNotOpen);
                    }
                    Err(Err(e)) => panic!("unexpected invoke failure: {e:?}"),
                }
            }
            Action::Report { node, index, status } => {
                let slot = *node as usize % NODES;
                let Some(ref addr) = nodes[slot] else {
                    continue;
                };
                let index = *index as u32 % 10;
                let status = STATUSES[*status as usize % STATUSES.len()];
                match engine.try_submit_response(
                    addr,
                    &index,
                    &airline,
                    &designator,
                    &DEPARTURE,
                    &status,
                ) {
                    Ok(_) => {}
                    Err(Ok(e)) => {
                        // Any other code here means a settlement call blew
                        // up inside the engine.
                        assert!(
                            matches!(
                                e,
                                OracleError::IndexNotAssigned
                                    | OracleError::RequestNotOpen
                                    | OracleError::DuplicateResponse
                            ),
                            "unexpected report rejection: {e:?}"
                        );
                    }
                    Err(Err(e)) => panic!("unexpected invoke failure: {e:?}"),
                }
            }
            Action::Withdraw { passenger } => {
                let i = *passenger as usize % PASSENGERS;
                match ledger.try_withdraw(&passengers[i]) {
                    Ok(Ok(paid)) => {
                        assert_eq!(paid, entitled[i], "withdrew other than the entitlement");
                        entitled[i] = 0;
                    }
                    Ok(Err(e)) => panic!("bad withdraw value: {e:?}"),
                    Err(Ok(e)) => {
                        assert_eq!(e, LedgerError::NoBalance);
                        assert_eq!(entitled[i], 0, "entitled passenger refused");
                    }
                    Err(Err(e)) => panic!("unexpected invoke failure: {e:?}"),
                }
            }
        }

        // A committed status is forever.
        let flight: Flight = flights.get_flight(&airline, &designator, &DEPARTURE).unwrap();
        match committed {
            None => {
                if flight.resolved {
                    committed = Some(flight.status);
                    if flight.status == STATUS_LATE_AIRLINE {
                        for i in 0..PASSENGERS {
                            entitled[i] = premium[i] * 3 / 2;
                        }
                    }
                }
            }
            Some(status) => {
                assert!(flight.resolved, "flight unresolved itself");
                assert_eq!(flight.status, status, "committed status changed");
            }
        }

        // A settled round never reopens.
        for index in &opened {
            let open = engine.is_request_open(index, &airline, &designator, &DEPARTURE);
            if closed.contains(index) {
                assert!(!open, "settled round reopened");
            } else if !open {
                closed.insert(*index);
            }
        }

        // Credit is exactly the entitlement and the pool covers all of it.
        let mut outstanding = 0i128;
        for (i, p) in passengers.iter().enumerate() {
            let credit = ledger.get_credit_balance(p);
            assert_eq!(credit, entitled[i], "credit drifted from entitlement");
            outstanding += credit;
        }
        assert!(
            token.balance(&ledger_addr) >= outstanding,
            "pool cannot cover outstanding credit"
        );
    }
});
