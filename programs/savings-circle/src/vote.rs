use anchor_lang::prelude::*;

use crate::guard;
use crate::seeds::CIRCLE_SEED;
use crate::state::{Circle, FundingRequest, RequestStatus};

#[derive(Accounts)]
#[instruction(invite_code: String)]
pub struct VoteOnRequest<'info> {
    pub voter: Signer<'info>,

    #[account(
        seeds = [CIRCLE_SEED, invite_code.as_bytes()],
        bump = circle.bump
    )]
    pub circle: Account<'info, Circle>,

    #[account(mut)]
    pub funding_request: Account<'info, FundingRequest>,
}

impl<'info> VoteOnRequest<'info> {
    pub fn vote(&mut self, in_favor: bool) -> Result<()> {
        let voter = self.voter.key();
        guard::require_request_of(&self.circle.key(), &self.funding_request)?;
        // Membership is read from the live roster on every ballot.
        guard::require_member(&self.circle, &voter)?;

        let population = self
            .circle
            .voting_population(self.funding_request.eligible_members);
        let status = self.funding_request.record_vote(
            voter,
            in_favor,
            population,
            self.circle.capacity as usize,
        )?;

        msg!(
            "Vote recorded: {} voted {} on request #{} ({} for / {} against of {})",
            voter,
            if in_favor { "YES" } else { "NO" },
            self.funding_request.index,
            self.funding_request.votes_for,
            self.funding_request.votes_against,
            population
        );
        match status {
            RequestStatus::Approved => msg!("Request #{} approved", self.funding_request.index),
            RequestStatus::Rejected => msg!("Request #{} rejected", self.funding_request.index),
            _ => {}
        }
        Ok(())
    }
}
