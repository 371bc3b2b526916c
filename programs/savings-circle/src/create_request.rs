use anchor_lang::prelude::*;

use crate::guard;
use crate::seeds::{CIRCLE_SEED, REQUEST_SEED};
use crate::state::{Circle, FundingRequest};

#[derive(Accounts)]
#[instruction(invite_code: String)]
pub struct CreateRequest<'info> {
    #[account(mut)]
    pub requester: Signer<'info>,

    #[account(
        mut,
        seeds = [CIRCLE_SEED, invite_code.as_bytes()],
        bump = circle.bump
    )]
    pub circle: Account<'info, Circle>,

    #[account(
        init,
        payer = requester,
        space = 8 + FundingRequest::INIT_SPACE,
        seeds = [REQUEST_SEED, circle.key().as_ref(), &circle.request_count.to_le_bytes()],
        bump
    )]
    pub funding_request: Account<'info, FundingRequest>,

    pub system_program: Program<'info, System>,
}

impl<'info> CreateRequest<'info> {
    pub fn create_request(
        &mut self,
        bumps: &CreateRequestBumps,
        amount: u64,
        description: String,
    ) -> Result<()> {
        guard::require_member(&self.circle, &self.requester.key())?;

        let created_at = Clock::get()?.unix_timestamp;
        let index = self.circle.next_request_index()?;
        let request = FundingRequest::open(
            self.circle.key(),
            self.requester.key(),
            index,
            amount,
            description,
            created_at,
            self.circle.members.len() as u8,
        )?;

        self.funding_request.set_inner(FundingRequest {
            bump: bumps.funding_request,
            ..request
        });

        msg!(
            "Funding request #{} created by {} for {}",
            index,
            self.requester.key(),
            amount
        );
        Ok(())
    }
}
