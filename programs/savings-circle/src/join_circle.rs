use anchor_lang::prelude::*;

use crate::seeds::CIRCLE_SEED;
use crate::state::Circle;

/// An unknown invite code derives an address with no circle behind it, and
/// account loading fails before the handler runs.
#[derive(Accounts)]
#[instruction(invite_code: String)]
pub struct JoinCircle<'info> {
    pub joiner: Signer<'info>,

    #[account(
        mut,
        seeds = [CIRCLE_SEED, invite_code.as_bytes()],
        bump = circle.bump
    )]
    pub circle: Account<'info, Circle>,
}

impl<'info> JoinCircle<'info> {
    pub fn join_circle(&mut self) -> Result<()> {
        self.circle.admit(self.joiner.key())?;

        msg!(
            "User {} joined circle ({}/{})",
            self.joiner.key(),
            self.circle.member_count(),
            self.circle.capacity
        );
        Ok(())
    }
}
