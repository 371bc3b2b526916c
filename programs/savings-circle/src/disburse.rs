use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::custody::{Custody, TreasuryAuthority};
use crate::error::CircleError;
use crate::guard;
use crate::seeds::{CIRCLE_SEED, TREASURY_AUTH_SEED};
use crate::state::{Circle, FundingRequest};

// ---------------------------------------------------------------------------
// Disburse Funds
// ---------------------------------------------------------------------------
// The only path that signs for the treasury. Status is checked first, so a
// replay of a paid request fails with RequestNotApproved before the
// authority check or any token movement.
// ---------------------------------------------------------------------------

#[derive(Accounts)]
#[instruction(invite_code: String)]
pub struct DisburseFunds<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [CIRCLE_SEED, invite_code.as_bytes()],
        bump = circle.bump
    )]
    pub circle: Account<'info, Circle>,

    #[account(mut)]
    pub funding_request: Account<'info, FundingRequest>,

    #[account(
        mut,
        constraint = requester_token_account.owner == funding_request.requester @ CircleError::WrongTokenOwner,
        constraint = requester_token_account.mint == circle.mint @ CircleError::WrongMint
    )]
    pub requester_token_account: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: Treasury authority PDA, validated by seeds
    #[account(
        seeds = [TREASURY_AUTH_SEED, invite_code.as_bytes()],
        bump = circle.treasury_authority_bump
    )]
    pub treasury_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        associated_token::mint = mint,
        associated_token::authority = treasury_authority,
        associated_token::token_program = token_program,
    )]
    pub treasury_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(address = circle.mint @ CircleError::WrongMint)]
    pub mint: InterfaceAccount<'info, Mint>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> DisburseFunds<'info> {
    pub fn disburse(&mut self) -> Result<()> {
        guard::require_request_of(&self.circle.key(), &self.funding_request)?;
        self.funding_request.ensure_disbursable()?;
        guard::require_creator(&self.circle, &self.authority.key())?;

        let amount = self.funding_request.amount;
        let treasury_authority =
            TreasuryAuthority::for_circle(&self.circle, self.treasury_authority.to_account_info());
        let custody = Custody {
            token_program: &self.token_program,
            mint: &self.mint,
            treasury: &self.treasury_token_account,
        };
        custody.debit(&treasury_authority, &self.requester_token_account, amount)?;

        self.funding_request.mark_disbursed()?;
        self.treasury_token_account.reload()?;

        msg!(
            "Disbursed {} to {} for request #{}, treasury balance {}",
            amount,
            self.funding_request.requester,
            self.funding_request.index,
            self.treasury_token_account.amount
        );
        Ok(())
    }
}
