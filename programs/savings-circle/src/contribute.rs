use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::custody::Custody;
use crate::error::CircleError;
use crate::guard;
use crate::seeds::{CIRCLE_SEED, TREASURY_AUTH_SEED};
use crate::state::Circle;

#[derive(Accounts)]
#[instruction(invite_code: String)]
pub struct Contribute<'info> {
    pub member: Signer<'info>,

    #[account(
        seeds = [CIRCLE_SEED, invite_code.as_bytes()],
        bump = circle.bump
    )]
    pub circle: Account<'info, Circle>,

    #[account(
        mut,
        constraint = member_token_account.owner == member.key() @ CircleError::WrongTokenOwner,
        constraint = member_token_account.mint == circle.mint @ CircleError::WrongMint
    )]
    pub member_token_account: InterfaceAccount<'info, TokenAccount>,

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

impl<'info> Contribute<'info> {
    pub fn contribute(&mut self, amount: u64) -> Result<()> {
        guard::require_member(&self.circle, &self.member.key())?;
        self.circle.check_contribution(amount)?;

        let custody = Custody {
            token_program: &self.token_program,
            mint: &self.mint,
            treasury: &self.treasury_token_account,
        };
        custody.credit(
            &self.member_token_account,
            self.member.to_account_info(),
            amount,
        )?;

        self.treasury_token_account.reload()?;
        msg!(
            "Member {} contributed {} to circle '{}', treasury balance {}",
            self.member.key(),
            amount,
            self.circle.name,
            self.treasury_token_account.amount
        );
        Ok(())
    }
}
