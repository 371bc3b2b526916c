//! PDA seed tags and deterministic address derivation.
//!
//! Every account the program owns is found, never stored: a circle lives at
//! `["circle", invite_code]`, its treasury authority at
//! `["treasury_auth", invite_code]`, and its requests at
//! `["request", circle, index]`. An unknown invite code therefore resolves
//! to an empty address, and a reused one collides with the existing circle.
//!
//! A PDA seed is at most 32 bytes. The helpers below return
//! `InvalidInviteCode` for longer codes instead of panicking; on chain the
//! `seeds` constraint of `create_circle` aborts the transaction before the
//! handler can report the typed error.

use anchor_lang::prelude::*;

use crate::error::CircleError;
use crate::state::MAX_INVITE_CODE_LEN;

pub const CIRCLE_SEED: &[u8] = b"circle";
pub const TREASURY_AUTH_SEED: &[u8] = b"treasury_auth";
pub const REQUEST_SEED: &[u8] = b"request";

/// Derives a program address from a seed tag and an invite code.
pub fn derive_address(seed_tag: &[u8], invite_code: &[u8]) -> Result<(Pubkey, u8)> {
    require!(
        !invite_code.is_empty() && invite_code.len() <= MAX_INVITE_CODE_LEN,
        CircleError::InvalidInviteCode
    );
    Pubkey::try_find_program_address(&[seed_tag, invite_code], &crate::ID)
        .ok_or_else(|| error!(CircleError::InvalidInviteCode))
}

pub fn circle_address(invite_code: &str) -> Result<(Pubkey, u8)> {
    derive_address(CIRCLE_SEED, invite_code.as_bytes())
}

pub fn treasury_authority_address(invite_code: &str) -> Result<(Pubkey, u8)> {
    derive_address(TREASURY_AUTH_SEED, invite_code.as_bytes())
}

pub fn request_address(circle: &Pubkey, index: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[REQUEST_SEED, circle.as_ref(), &index.to_le_bytes()],
        &crate::ID,
    )
}
