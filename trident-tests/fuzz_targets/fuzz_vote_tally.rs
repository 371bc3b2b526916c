//! Fuzz test for the funding request vote state machine
//!
//! Replays random interleavings of joins and ballots (from members,
//! outsiders and repeat voters) against a circle and one request, and checks
//! every step against a plain reference tally.

use std::collections::HashSet;

use anchor_lang::prelude::Pubkey;
use rand::{rngs::StdRng, Rng, SeedableRng};
use savings_circle::guard;
use savings_circle::state::{
    majority_threshold, Circle, CirclePolicy, ContributionPolicy, FundingRequest, RequestStatus,
    ThresholdBasis, MAX_ROSTER_CAPACITY,
};

/// One step of a fuzzed session
#[derive(Debug, Clone, Copy)]
enum Action {
    /// A fresh identity asks to join
    Join,
    /// A roster member votes (index wraps around the roster)
    MemberVote { slot: usize, in_favor: bool },
    /// An identity that never joined votes
    OutsiderVote { in_favor: bool },
}

/// Reference model: what the tally should look like after each step.
#[derive(Debug, Default)]
struct Oracle {
    voters: HashSet<Pubkey>,
    votes_for: u32,
    votes_against: u32,
    status: Option<RequestStatus>,
}

impl Oracle {
    fn expected_after_vote(
        &self,
        voter: &Pubkey,
        in_favor: bool,
        population: u32,
    ) -> Option<(u32, u32, RequestStatus)> {
        if self.status != Some(RequestStatus::Active) || self.voters.contains(voter) {
            return None;
        }
        let (votes_for, votes_against) = if in_favor {
            (self.votes_for + 1, self.votes_against)
        } else {
            (self.votes_for, self.votes_against + 1)
        };
        let threshold = majority_threshold(population);
        let status = if votes_for >= threshold {
            RequestStatus::Approved
        } else if votes_against >= threshold {
            RequestStatus::Rejected
        } else {
            RequestStatus::Active
        };
        Some((votes_for, votes_against, status))
    }
}

fn random_policy(rng: &mut StdRng) -> CirclePolicy {
    CirclePolicy {
        capacity: rng.gen_range(1..=MAX_ROSTER_CAPACITY),
        contribution: ContributionPolicy::Flexible,
        threshold: if rng.gen_bool(0.5) {
            ThresholdBasis::CurrentRoster
        } else {
            ThresholdBasis::SnapshotAtRequest
        },
    }
}

fn random_action(rng: &mut StdRng) -> Action {
    match rng.gen_range(0..10) {
        0..=1 => Action::Join,
        2 => Action::OutsiderVote {
            in_favor: rng.gen_bool(0.5),
        },
        _ => Action::MemberVote {
            slot: rng.gen_range(0..MAX_ROSTER_CAPACITY as usize),
            in_favor: rng.gen_bool(0.5),
        },
    }
}

/// Runs one fuzzed session and panics on the first invariant violation.
fn run_session(seed: u64, steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let founder = Pubkey::new_unique();
    let mut circle = Circle::new(
        founder,
        "fuzz".to_string(),
        100,
        "FUZZ".to_string(),
        random_policy(&mut rng),
    )
    .expect("valid circle");

    // Members that join before the request is filed.
    for _ in 0..rng.gen_range(0..circle.capacity) {
        let _ = circle.admit(Pubkey::new_unique());
    }

    let mut request = FundingRequest::open(
        Pubkey::new_unique(),
        founder,
        0,
        50,
        String::new(),
        0,
        circle.members.len() as u8,
    )
    .expect("valid request");
    let mut oracle = Oracle {
        status: Some(RequestStatus::Active),
        ..Oracle::default()
    };

    for step in 0..steps {
        let action = random_action(&mut rng);
        let previous_status = request.status;

        match action {
            Action::Join => {
                let before = circle.members.len();
                let joined = circle.admit(Pubkey::new_unique()).is_ok();
                assert_eq!(joined, before < circle.capacity as usize, "seed {seed} step {step}");
            }
            Action::MemberVote { slot, in_favor } => {
                let voter = circle.members[slot % circle.members.len()];
                let population = circle.voting_population(request.eligible_members);
                let expected = oracle.expected_after_vote(&voter, in_favor, population);
                let result = request.record_vote(voter, in_favor, population, circle.capacity as usize);

                match (expected, result) {
                    (Some((votes_for, votes_against, status)), Ok(actual)) => {
                        assert_eq!(actual, status, "seed {seed} step {step}");
                        assert_eq!(request.votes_for, votes_for);
                        assert_eq!(request.votes_against, votes_against);
                        oracle.voters.insert(voter);
                        oracle.votes_for = votes_for;
                        oracle.votes_against = votes_against;
                        oracle.status = Some(status);
                    }
                    (None, Err(_)) => {}
                    (expected, result) => panic!(
                        "seed {seed} step {step}: expected {:?}, program returned ok={}",
                        expected,
                        result.is_ok()
                    ),
                }
            }
            Action::OutsiderVote { .. } => {
                let outsider = Pubkey::new_unique();
                assert!(guard::require_member(&circle, &outsider).is_err());
            }
        }

        // Invariants that must hold after every step.
        assert_eq!(
            (request.votes_for + request.votes_against) as usize,
            request.voters.len(),
            "seed {seed} step {step}: tally out of sync"
        );
        let distinct: HashSet<_> = request.voters.iter().collect();
        assert_eq!(distinct.len(), request.voters.len(), "seed {seed}: duplicate voter");
        assert!(
            previous_status == request.status || previous_status.can_transition_to(request.status),
            "seed {seed} step {step}: {:?} -> {:?}",
            previous_status,
            request.status
        );
        assert!(circle.members.len() <= circle.capacity as usize);
    }
}


// Entry point for trident fuzzer (when using full trident)
fn main() {
    let sessions: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10_000);

    let mut rng = StdRng::from_entropy();
    for _ in 0..sessions {
        run_session(rng.gen(), 128);
    }
    println!("Vote tally fuzz: {} sessions passed", sessions);
}
