//! Savings Circle - Anchor Program
//!
//! A member-governed pooled treasury. Members of a circle contribute tokens
//! into a shared account that no key holder controls; any member may request
//! a payout, which is released only after a strict majority of the roster
//! votes for it.
//!
//! Lifecycle of a request: Active -> Approved -> Disbursed, or
//! Active -> Rejected.

#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

pub mod contribute;
pub mod create_circle;
pub mod create_request;
pub mod custody;
pub mod disburse;
pub mod error;
pub mod guard;
pub mod join_circle;
pub mod seeds;
pub mod state;
pub mod vote;

use contribute::*;
use create_circle::*;
use create_request::*;
use disburse::*;
use join_circle::*;
pub use state::CirclePolicy;
use vote::*;

declare_id!("2bZEVzP4PGeq4adUnGKTSPwxakes1RL53xA6Zj5EbPgf");

#[program]
pub mod savings_circle {
    use super::*;

    /// Create a circle with the caller as founding member and an empty treasury.
    pub fn create_circle(
        ctx: Context<CreateCircle>,
        name: String,
        contribution_amount: u64,
        invite_code: String,
        policy: CirclePolicy,
    ) -> Result<()> {
        ctx.accounts
            .create_circle(&ctx.bumps, name, contribution_amount, invite_code, policy)
    }

    /// Join the circle the invite code resolves to.
    pub fn join_circle(ctx: Context<JoinCircle>, _invite_code: String) -> Result<()> {
        ctx.accounts.join_circle()
    }

    /// Move tokens from a member into the circle treasury.
    pub fn contribute(ctx: Context<Contribute>, _invite_code: String, amount: u64) -> Result<()> {
        ctx.accounts.contribute(amount)
    }

    /// File a funding request for the caller.
    pub fn create_request(
        ctx: Context<CreateRequest>,
        _invite_code: String,
        amount: u64,
        description: String,
    ) -> Result<()> {
        ctx.accounts.create_request(&ctx.bumps, amount, description)
    }

    /// Cast a single ballot on an active request.
    pub fn vote_on_request(
        ctx: Context<VoteOnRequest>,
        _invite_code: String,
        in_favor: bool,
    ) -> Result<()> {
        ctx.accounts.vote(in_favor)
    }

    /// Pay out an approved request. Creator only.
    pub fn disburse_funds(ctx: Context<DisburseFunds>, _invite_code: String) -> Result<()> {
        ctx.accounts.disburse()
    }
}
