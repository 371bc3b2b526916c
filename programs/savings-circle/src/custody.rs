//! Treasury custody over the external token ledger.
//!
//! The treasury is an associated token account whose authority is a PDA
//! derived from the circle's invite code. No key holder can move funds out
//! of it; only the program can, by signing with the PDA seeds, and the seeds
//! are only ever assembled through a [`TreasuryAuthority`].
//!
//! Token-2022 mints are accepted only without extensions that let a third
//! party move treasury tokens or skim transfers.

use anchor_lang::prelude::*;
use anchor_spl::token_2022::spl_token_2022::{
    self,
    extension::{BaseStateWithExtensions, ExtensionType, StateWithExtensions},
    state::Mint as MintState,
};
use anchor_spl::token_interface::{
    self, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::error::CircleError;
use crate::seeds::TREASURY_AUTH_SEED;
use crate::state::Circle;

/// Extensions that let funds leave or shrink outside `Custody::debit`.
pub const UNSUPPORTED_MINT_EXTENSIONS: [ExtensionType; 3] = [
    ExtensionType::PermanentDelegate,
    ExtensionType::TransferFeeConfig,
    ExtensionType::TransferHook,
];

/// Refuses a treasury mint carrying any of [`UNSUPPORTED_MINT_EXTENSIONS`].
/// Classic SPL Token mints have no extensions and always pass.
pub fn ensure_supported_mint(mint: &AccountInfo) -> Result<()> {
    if *mint.owner != spl_token_2022::ID {
        return Ok(());
    }
    let data = mint.try_borrow_data()?;
    check_mint_extensions(&data)
}

pub fn check_mint_extensions(mint_data: &[u8]) -> Result<()> {
    let mint = StateWithExtensions::<MintState>::unpack(mint_data)?;
    let extensions = mint.get_extension_types()?;
    require!(
        !extensions
            .iter()
            .any(|extension| UNSUPPORTED_MINT_EXTENSIONS.contains(extension)),
        CircleError::UnsupportedMint
    );
    Ok(())
}

/// Signing capability for a circle's treasury.
///
/// Built from seeds the circle recorded at creation. The constructor is
/// crate-private and the disbursement instruction is its only caller.
pub struct TreasuryAuthority<'a, 'info> {
    account: AccountInfo<'info>,
    invite_code: &'a [u8],
    bump: u8,
}

impl<'a, 'info> TreasuryAuthority<'a, 'info> {
    pub(crate) fn for_circle(circle: &'a Circle, account: AccountInfo<'info>) -> Self {
        Self {
            account,
            invite_code: circle.invite_code.as_bytes(),
            bump: circle.treasury_authority_bump,
        }
    }
}

/// A circle's treasury token account and the program and mint that govern it.
pub struct Custody<'a, 'info> {
    pub token_program: &'a Interface<'info, TokenInterface>,
    pub mint: &'a InterfaceAccount<'info, Mint>,
    pub treasury: &'a InterfaceAccount<'info, TokenAccount>,
}

impl<'a, 'info> Custody<'a, 'info> {
    pub fn balance(&self) -> u64 {
        self.treasury.amount
    }

    /// Moves `amount` from a member's token account into the treasury. The
    /// member signs the transfer.
    pub fn credit(
        &self,
        from: &InterfaceAccount<'info, TokenAccount>,
        owner: AccountInfo<'info>,
        amount: u64,
    ) -> Result<()> {
        let cpi_context = CpiContext::new(
            self.token_program.to_account_info(),
            TransferChecked {
                from: from.to_account_info(),
                mint: self.mint.to_account_info(),
                to: self.treasury.to_account_info(),
                authority: owner,
            },
        );
        token_interface::transfer_checked(cpi_context, amount, self.mint.decimals)
    }

    /// Moves `amount` out of the treasury, signed by the treasury PDA.
    pub fn debit(
        &self,
        authority: &TreasuryAuthority<'_, 'info>,
        to: &InterfaceAccount<'info, TokenAccount>,
        amount: u64,
    ) -> Result<()> {
        require!(self.balance() >= amount, CircleError::InsufficientFunds);

        let bump = [authority.bump];
        let seeds: &[&[u8]] = &[TREASURY_AUTH_SEED, authority.invite_code, &bump];
        let signer_seeds = &[seeds];

        let cpi_context = CpiContext::new_with_signer(
            self.token_program.to_account_info(),
            TransferChecked {
                from: self.treasury.to_account_info(),
                mint: self.mint.to_account_info(),
                to: to.to_account_info(),
                authority: authority.account.clone(),
            },
            signer_seeds,
        );
        token_interface::transfer_checked(cpi_context, amount, self.mint.decimals)
    }
}
