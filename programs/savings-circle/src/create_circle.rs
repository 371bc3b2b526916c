use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::custody;
use crate::seeds::{CIRCLE_SEED, TREASURY_AUTH_SEED};
use crate::state::{Circle, CirclePolicy};

// ---------------------------------------------------------------------------
// Create Circle
// ---------------------------------------------------------------------------
// The circle PDA is derived from the invite code, so a second circle with
// the same code fails at `init` because the address is already in use.
// The treasury token account is owned by a key-less PDA. Its address is
// computable from the invite code, so anyone can create it first; an
// existing account is accepted as long as mint and authority match.
// Mints with extensions that move or skim tokens without the program are
// refused.
// ---------------------------------------------------------------------------

#[derive(Accounts)]
#[instruction(name: String, contribution_amount: u64, invite_code: String)]
pub struct CreateCircle<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        init,
        payer = creator,
        space = 8 + Circle::INIT_SPACE,
        seeds = [CIRCLE_SEED, invite_code.as_bytes()],
        bump
    )]
    pub circle: Account<'info, Circle>,

    /// CHECK: Key-less treasury authority, only ever used as a PDA signer
    #[account(
        seeds = [TREASURY_AUTH_SEED, invite_code.as_bytes()],
        bump
    )]
    pub treasury_authority: UncheckedAccount<'info>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        init_if_needed,
        payer = creator,
        associated_token::mint = mint,
        associated_token::authority = treasury_authority,
        associated_token::token_program = token_program,
    )]
    pub treasury_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

impl<'info> CreateCircle<'info> {
    pub fn create_circle(
        &mut self,
        bumps: &CreateCircleBumps,
        name: String,
        contribution_amount: u64,
        invite_code: String,
        policy: CirclePolicy,
    ) -> Result<()> {
        custody::ensure_supported_mint(&self.mint.to_account_info())?;

        let circle = Circle::new(
            self.creator.key(),
            name,
            contribution_amount,
            invite_code,
            policy,
        )?;

        self.circle.set_inner(Circle {
            mint: self.mint.key(),
            bump: bumps.circle,
            treasury_authority_bump: bumps.treasury_authority,
            ..circle
        });

        msg!(
            "Circle '{}' created by {} (capacity {}, contribution {})",
            self.circle.name,
            self.creator.key(),
            self.circle.capacity,
            self.circle.contribution_amount
        );
        msg!("Treasury: {}", self.treasury_token_account.key());
        Ok(())
    }
}
