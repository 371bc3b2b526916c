//! Error definitions

use anchor_lang::prelude::*;

#[error_code]
pub enum CircleError {
    #[msg("Circle or funding request not found")]
    NotFound,
    #[msg("You are not a member of this circle")]
    NotAMember,
    #[msg("You are already a member of this circle")]
    AlreadyMember,
    #[msg("Circle roster is full")]
    RosterFull,
    #[msg("Request is not active")]
    RequestNotActive,
    #[msg("You have already voted on this request")]
    AlreadyVoted,
    #[msg("Request voter list is full")]
    VoterListFull,
    #[msg("Request not approved - only approved requests can be disbursed")]
    RequestNotApproved,
    #[msg("Unauthorized - only the circle creator can disburse funds")]
    Unauthorized,
    #[msg("Insufficient funds in treasury")]
    InsufficientFunds,
    #[msg("Invite code must be between 1 and 32 bytes")]
    InvalidInviteCode,
    #[msg("Circle name too long")]
    NameTooLong,
    #[msg("Request description too long")]
    DescriptionTooLong,
    #[msg("Roster capacity out of range")]
    InvalidCapacity,
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    #[msg("Contribution must equal the circle's fixed contribution amount")]
    ContributionMismatch,
    #[msg("Token account does not belong to the expected owner")]
    WrongTokenOwner,
    #[msg("Token account holds a different mint than the circle treasury")]
    WrongMint,
    #[msg("Illegal request status transition")]
    InvalidStatusTransition,
    #[msg("Arithmetic overflow")]
    MathOverflow,
    #[msg("Mint carries an extension that can move or skim treasury tokens")]
    UnsupportedMint,
}
