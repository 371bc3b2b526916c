use anchor_lang::prelude::*;

use crate::error::CircleError;
use crate::guard;
use crate::state::circle::majority_threshold;

pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Request lifecycle. `Rejected` and `Disbursed` are terminal.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub enum RequestStatus {
    #[default]
    Active,
    Approved,
    Rejected,
    Disbursed,
}

impl RequestStatus {
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Active, RequestStatus::Approved)
                | (RequestStatus::Active, RequestStatus::Rejected)
                | (RequestStatus::Approved, RequestStatus::Disbursed)
        )
    }
}

/// A member's proposal to pay `amount` out of the circle treasury to themselves.
#[account]
#[derive(InitSpace, Default)]
pub struct FundingRequest {
    /// Circle this request draws on
    pub circle: Pubkey,
    /// Member who filed the request and receives the funds
    pub requester: Pubkey,
    /// Position of this request within its circle
    pub index: u64,
    pub amount: u64,
    /// Unix timestamp from the cluster clock
    pub created_at: i64,
    pub status: RequestStatus,
    pub votes_for: u32,
    pub votes_against: u32,
    /// Roster size when the request was filed
    pub eligible_members: u8,
    pub bump: u8,
    #[max_len(100)]
    pub description: String,
    /// Members who have voted, in ballot order
    #[max_len(8)]
    pub voters: Vec<Pubkey>,
}

impl FundingRequest {
    pub fn open(
        circle: Pubkey,
        requester: Pubkey,
        index: u64,
        amount: u64,
        description: String,
        created_at: i64,
        eligible_members: u8,
    ) -> Result<Self> {
        require!(amount > 0, CircleError::InvalidAmount);
        require!(
            description.len() <= MAX_DESCRIPTION_LEN,
            CircleError::DescriptionTooLong
        );

        Ok(Self {
            circle,
            requester,
            index,
            amount,
            created_at,
            eligible_members,
            description,
            ..Self::default()
        })
    }

    pub fn has_voted(&self, voter: &Pubkey) -> bool {
        self.voters.contains(voter)
    }

    /// Records one ballot and applies any majority decision.
    ///
    /// The caller has already established that `voter` is a member. The
    /// duplicate check and the append happen here together so a ballot can
    /// never be counted twice.
    pub fn record_vote(
        &mut self,
        voter: Pubkey,
        in_favor: bool,
        voting_population: u32,
        ballot_capacity: usize,
    ) -> Result<RequestStatus> {
        require!(
            self.status == RequestStatus::Active,
            CircleError::RequestNotActive
        );
        guard::require_not_voted(self, &voter)?;
        require!(
            self.voters.len() < ballot_capacity,
            CircleError::VoterListFull
        );

        let (votes_for, votes_against) = if in_favor {
            (
                self.votes_for.checked_add(1).ok_or(CircleError::MathOverflow)?,
                self.votes_against,
            )
        } else {
            (
                self.votes_for,
                self.votes_against.checked_add(1).ok_or(CircleError::MathOverflow)?,
            )
        };

        self.voters.push(voter);
        self.votes_for = votes_for;
        self.votes_against = votes_against;

        let threshold = majority_threshold(voting_population);
        if self.votes_for >= threshold {
            self.transition(RequestStatus::Approved)?;
        } else if self.votes_against >= threshold {
            self.transition(RequestStatus::Rejected)?;
        }

        Ok(self.status)
    }

    /// Fails unless the request is approved and not yet paid out.
    pub fn ensure_disbursable(&self) -> Result<()> {
        require!(
            self.status == RequestStatus::Approved,
            CircleError::RequestNotApproved
        );
        Ok(())
    }

    pub fn mark_disbursed(&mut self) -> Result<()> {
        self.ensure_disbursable()?;
        self.transition(RequestStatus::Disbursed)
    }

    fn transition(&mut self, next: RequestStatus) -> Result<()> {
        require!(
            self.status.can_transition_to(next),
            CircleError::InvalidStatusTransition
        );
        self.status = next;
        Ok(())
    }
}
