//! Fuzz target for consortium admission voting.
//!
//! Drives the airline registry through arbitrary interleavings of
//! sponsorship, voting, bond deposits, and operational toggles, checking
//! after every step that:
//! - the registry's own queries stay mutually consistent
//! - a pending candidate is always strictly below its vote threshold
//! - a registered airline never sits on a full bond without promotion
//! - escrowed bond money matches what the pool address actually holds
//! - nothing is admitted while the consortium is halted

#![no_main]

use airline_registry::{
    AirlineRegistry, AirlineRegistryClient, AirlineStatus, ContractError, FUNDING_BOND,
};
use arbitrary::Arbitrary;
use authorization_guard::{AuthorizationGuard, AuthorizationGuardClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{testutils::Address as _, token, Address, Env, String};

const ACCOUNTS: usize = 8;

#[derive(Debug, Arbitrary)]
enum Action {
    Sponsor { sponsor: u8, candidate: u8 },
    Vote { voter: u8, candidate: u8 },
    Fund { airline: u8, split: u8 },
    SetOperational { enabled: bool },
}

#[derive(Debug, Arbitrary)]
struct Input {
    actions: Vec<Action>,
}

fuzz_target!(|input: Input| {
    let env = Env::default();
    env.mock_all_auths();

    let guard_addr = env.register(AuthorizationGuard, ());
    let guard = AuthorizationGuardClient::new(&env, &guard_addr);
    let owner = Address::generate(&env);
    guard.initialize(&owner);

    let token_issuer = Address::generate(&env);
    let token_contract = env.register_stellar_asset_contract_v2(token_issuer);
    let token_addr = token_contract.address();
    let token = token::Client::new(&env, &token_addr);
    let token_admin = token::StellarAssetClient::new(&env, &token_addr);

    let registry_addr = env.register(AirlineRegistry, ());
    let registry = AirlineRegistryClient::new(&env, &registry_addr);

    let pool = Address::generate(&env);
    let accounts: Vec<Address> = (0..ACCOUNTS).map(|_| Address::generate(&env)).collect();

    registry.initialize(
        &guard_addr,
        &token_addr,
        &pool,
        &accounts[0],
        &String::from_str(&env, "Fuzz Air"),
    );

    let mut operational = true;
    let mut escrowed: i128 = 0;

    for action in &input.actions {
        match action {
            Action::Sponsor { sponsor, candidate } => {
                let sponsor = &accounts[*sponsor as usize % ACCOUNTS];
                let candidate = &accounts[*candidate as usize % ACCOUNTS];
                let r = registry.try_register_airline(
                    &String::from_str(&env, "Fuzz Air"),
                    candidate,
                    sponsor,
                );
                if !operational {
                    assert_eq!(r, Err(Ok(ContractError::NotOperational)));
                }
            }
            Action::Vote { voter, candidate } => {
                let voter = &accounts[*voter as usize % ACCOUNTS];
                let candidate = &accounts[*candidate as usize % ACCOUNTS];
                let r = registry.try_vote_airline(candidate, voter);
                if !operational {
                    assert_eq!(r, Err(Ok(ContractError::NotOperational)));
                }
            }
            Action::Fund { airline, split } => {
                let airline = &accounts[*airline as usize % ACCOUNTS];
                let amount = FUNDING_BOND / (1 + *split as i128 % 4);
                token_admin.mint(airline, &amount);
                match registry.try_add_fund(airline, &amount) {
                    Ok(_) => {
                        assert!(operational, "deposit accepted while halted");
                        escrowed += amount;
                    }
                    Err(Ok(e)) => {
                        if !operational {
                            assert_eq!(e, ContractError::NotOperational);
                        } else {
                            assert_eq!(e, ContractError::UnknownAirline);
                        }
                    }
                    Err(Err(e)) => panic!("unexpected invoke failure: {e:?}"),
                }
            }
            Action::SetOperational { enabled } => {
                guard.set_operational(enabled);
                operational = *enabled;
            }
        }

        // Every account's view of the registry must stay coherent.
        let mut admitted = 0u32;
        for account in &accounts {
            let funded = registry.is_funded_airline(account);
            let registered = registry.is_registered_airline(account);
            let pending = registry.is_pending_airline(account);

            if funded {
                assert!(registered, "funded implies admitted");
            }
            assert!(!(registered && pending), "admitted and pending at once");
            if registered {
                admitted += 1;
            }

            match registry.get_airline(account) {
                Some(a) => {
                    if a.status == AirlineStatus::Pending {
                        assert!(
                            a.votes.len() * 2 < a.consensus_size,
                            "pending candidate at or past its threshold"
                        );
                    }
                    if a.status == AirlineStatus::Registered {
                        assert!(
                            a.funded_amount < FUNDING_BOND,
                            "full bond banked without promotion"
                        );
                    }
                }
                None => {
                    assert!(!registered && !pending && !funded);
                }
            }
        }

        assert_eq!(registry.airline_count(), admitted);
        assert_eq!(token.balance(&pool), escrowed, "pool drifted from deposits");
    }
});
