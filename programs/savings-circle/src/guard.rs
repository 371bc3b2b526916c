//! Authorization predicates shared by every instruction.
//!
//! Each check comes in two forms: a bare predicate, and a `require_*` form
//! that fails with the specific error for that check so a caller can tell a
//! membership failure from a double vote from a bad authority.

use anchor_lang::prelude::*;

use crate::error::CircleError;
use crate::state::{Circle, FundingRequest};

pub fn is_member(circle: &Circle, identity: &Pubkey) -> bool {
    circle.members.contains(identity)
}

pub fn has_voted(request: &FundingRequest, identity: &Pubkey) -> bool {
    request.has_voted(identity)
}

pub fn is_creator(circle: &Circle, identity: &Pubkey) -> bool {
    circle.creator == *identity
}

pub fn require_member(circle: &Circle, identity: &Pubkey) -> Result<()> {
    require!(is_member(circle, identity), CircleError::NotAMember);
    Ok(())
}

pub fn require_not_voted(request: &FundingRequest, identity: &Pubkey) -> Result<()> {
    require!(!has_voted(request, identity), CircleError::AlreadyVoted);
    Ok(())
}

pub fn require_creator(circle: &Circle, identity: &Pubkey) -> Result<()> {
    require!(is_creator(circle, identity), CircleError::Unauthorized);
    Ok(())
}

/// A request only resolves against the circle it was filed in.
pub fn require_request_of(circle: &Pubkey, request: &FundingRequest) -> Result<()> {
    require_keys_eq!(request.circle, *circle, CircleError::NotFound);
    Ok(())
}
