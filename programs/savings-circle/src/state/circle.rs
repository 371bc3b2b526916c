use anchor_lang::prelude::*;

use crate::error::CircleError;
use crate::guard;

/// Hard upper bound on roster size. Account space is reserved for this many
/// members regardless of the capacity a circle picks.
pub const MAX_ROSTER_CAPACITY: u8 = 8;
/// Roster capacity used when a founder does not ask for another one.
pub const DEFAULT_ROSTER_CAPACITY: u8 = 3;
pub const MAX_NAME_LEN: usize = 32;
/// Invite codes are PDA seeds, so they share the runtime's 32-byte seed limit.
pub const MAX_INVITE_CODE_LEN: usize = 32;

/// How `contribute` treats the circle's contribution amount.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub enum ContributionPolicy {
    /// Any positive amount is accepted.
    #[default]
    Flexible,
    /// Every contribution must equal `contribution_amount` exactly.
    Fixed,
}

/// Which member count a request's majority threshold is computed against.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub enum ThresholdBasis {
    /// Roster size at the moment each vote lands.
    #[default]
    CurrentRoster,
    /// Roster size recorded when the request was filed.
    SnapshotAtRequest,
}

/// Founder-chosen parameters, fixed for the life of the circle.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CirclePolicy {
    pub capacity: u8,
    pub contribution: ContributionPolicy,
    pub threshold: ThresholdBasis,
}

impl Default for CirclePolicy {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_ROSTER_CAPACITY,
            contribution: ContributionPolicy::default(),
            threshold: ThresholdBasis::default(),
        }
    }
}

/// A savings circle: roster, contribution terms and treasury binding.
#[account]
#[derive(InitSpace, Default)]
pub struct Circle {
    /// Founder; the only identity allowed to trigger disbursements
    pub creator: Pubkey,
    /// Mint held by the treasury token account
    pub mint: Pubkey,
    /// Per-member contribution unit
    pub contribution_amount: u64,
    /// Number of requests filed so far, also the next request's index
    pub request_count: u64,
    pub capacity: u8,
    pub contribution_policy: ContributionPolicy,
    pub threshold_basis: ThresholdBasis,
    /// Bump seed for the circle PDA
    pub bump: u8,
    /// Bump seed for the treasury authority PDA
    pub treasury_authority_bump: u8,
    #[max_len(32)]
    pub name: String,
    #[max_len(32)]
    pub invite_code: String,
    /// Ordered roster, founder first
    #[max_len(8)]
    pub members: Vec<Pubkey>,
}

impl Circle {
    /// Builds a circle whose only member is its founder.
    pub fn new(
        creator: Pubkey,
        name: String,
        contribution_amount: u64,
        invite_code: String,
        policy: CirclePolicy,
    ) -> Result<Self> {
        require!(name.len() <= MAX_NAME_LEN, CircleError::NameTooLong);
        require!(
            !invite_code.is_empty() && invite_code.len() <= MAX_INVITE_CODE_LEN,
            CircleError::InvalidInviteCode
        );
        require!(
            (1..=MAX_ROSTER_CAPACITY).contains(&policy.capacity),
            CircleError::InvalidCapacity
        );
        require!(contribution_amount > 0, CircleError::InvalidAmount);

        Ok(Self {
            creator,
            contribution_amount,
            capacity: policy.capacity,
            contribution_policy: policy.contribution,
            threshold_basis: policy.threshold,
            name,
            invite_code,
            members: vec![creator],
            ..Self::default()
        })
    }

    pub fn member_count(&self) -> u32 {
        self.members.len() as u32
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity as usize
    }

    /// Appends `joiner` to the roster.
    pub fn admit(&mut self, joiner: Pubkey) -> Result<()> {
        require!(!guard::is_member(self, &joiner), CircleError::AlreadyMember);
        require!(!self.is_full(), CircleError::RosterFull);
        self.members.push(joiner);
        Ok(())
    }

    /// Checks an incoming contribution against the circle's policy.
    pub fn check_contribution(&self, amount: u64) -> Result<()> {
        require!(amount > 0, CircleError::InvalidAmount);
        if self.contribution_policy == ContributionPolicy::Fixed {
            require!(
                amount == self.contribution_amount,
                CircleError::ContributionMismatch
            );
        }
        Ok(())
    }

    /// Reserves the next request index.
    pub fn next_request_index(&mut self) -> Result<u64> {
        let index = self.request_count;
        self.request_count = index.checked_add(1).ok_or(CircleError::MathOverflow)?;
        Ok(index)
    }

    /// Member count a vote is tallied against, per the circle's threshold basis.
    pub fn voting_population(&self, eligible_at_request: u8) -> u32 {
        match self.threshold_basis {
            ThresholdBasis::CurrentRoster => self.member_count(),
            ThresholdBasis::SnapshotAtRequest => eligible_at_request as u32,
        }
    }
}

/// Strict majority of `member_count`.
pub fn majority_threshold(member_count: u32) -> u32 {
    member_count / 2 + 1
}
