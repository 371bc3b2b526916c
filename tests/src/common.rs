//! LiteSVM harness for the savings circle program.
//!
//! Stands up a Token-2022 mint, funds members with tokens, and wraps each
//! program instruction in a helper that signs and sends one transaction.

use std::path::PathBuf;

use anchor_lang::{AccountDeserialize, InstructionData, ToAccountMetas};
use anchor_spl::associated_token::{
    self, get_associated_token_address_with_program_id, spl_associated_token_account,
};
use litesvm::{types::TransactionResult, LiteSVM};
use savings_circle::seeds::{circle_address, request_address, treasury_authority_address};
use savings_circle::state::{Circle, CirclePolicy, FundingRequest};
use solana_instruction::{error::InstructionError, Instruction};
use solana_keypair::Keypair;
use solana_native_token::LAMPORTS_PER_SOL;
use solana_pubkey::Pubkey;
use solana_signer::Signer;
use solana_transaction::Transaction;
use solana_transaction_error::TransactionError;
use spl_token_2022::extension::ExtensionType;

pub const PROGRAM_ID: Pubkey = savings_circle::ID;
pub const TOKEN_PROGRAM_ID: Pubkey = spl_token_2022::ID;

const MINT_DECIMALS: u8 = 6;
/// Byte offset of `amount` in an SPL token account.
const TOKEN_AMOUNT_OFFSET: usize = 64;

pub fn read_program() -> Vec<u8> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../target/deploy/savings_circle.so");
    std::fs::read(&path).unwrap_or_else(|_| panic!("Failed to read program from {:?}", path))
}

/// A wallet plus its token account for the test mint.
pub struct Member {
    pub keypair: Keypair,
    pub token_account: Pubkey,
}

impl Member {
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

/// Addresses a circle resolves to from its invite code.
pub struct CircleAddresses {
    pub invite_code: String,
    pub circle: Pubkey,
    pub treasury_authority: Pubkey,
    pub treasury: Pubkey,
}

pub struct TestEnv {
    pub svm: LiteSVM,
    pub mint: Pubkey,
    mint_authority: Keypair,
}

impl TestEnv {
    pub fn new() -> Self {
        let mut svm = LiteSVM::new();
        svm.add_program(PROGRAM_ID, &read_program());

        let mint_authority = Keypair::new();
        svm.airdrop(&mint_authority.pubkey(), 10 * LAMPORTS_PER_SOL)
            .expect("Airdrop failed");

        let mut env = Self {
            svm,
            mint: Pubkey::default(),
            mint_authority,
        };
        env.mint = env.create_mint(None);
        env
    }

    /// Creates a Token-2022 mint, optionally with a permanent delegate.
    pub fn create_mint(&mut self, permanent_delegate: Option<&Pubkey>) -> Pubkey {
        let mint = Keypair::new();
        let extensions: &[ExtensionType] = match permanent_delegate {
            Some(_) => &[ExtensionType::PermanentDelegate],
            None => &[],
        };
        let space = ExtensionType::try_calculate_account_len::<spl_token_2022::state::Mint>(
            extensions,
        )
        .expect("mint length");
        let rent = self.svm.minimum_balance_for_rent_exemption(space);

        let mut instructions = vec![solana_system_interface::instruction::create_account(
            &self.mint_authority.pubkey(),
            &mint.pubkey(),
            rent,
            space as u64,
            &TOKEN_PROGRAM_ID,
        )];
        if let Some(delegate) = permanent_delegate {
            instructions.push(
                spl_token_2022::instruction::initialize_permanent_delegate(
                    &TOKEN_PROGRAM_ID,
                    &mint.pubkey(),
                    delegate,
                )
                .expect("initialize_permanent_delegate"),
            );
        }
        instructions.push(
            spl_token_2022::instruction::initialize_mint2(
                &TOKEN_PROGRAM_ID,
                &mint.pubkey(),
                &self.mint_authority.pubkey(),
                None,
                MINT_DECIMALS,
            )
            .expect("initialize_mint2"),
        );

        let tx = Transaction::new_signed_with_payer(
            &instructions,
            Some(&self.mint_authority.pubkey()),
            &[&self.mint_authority, &mint],
            self.svm.latest_blockhash(),
        );
        self.svm.send_transaction(tx).expect("Mint creation failed");
        mint.pubkey()
    }

    /// Creates a wallet with SOL for fees and `tokens` of the test mint.
    pub fn member(&mut self, tokens: u64) -> Member {
        let keypair = Keypair::new();
        self.svm
            .airdrop(&keypair.pubkey(), LAMPORTS_PER_SOL)
            .expect("Airdrop failed");

        let token_account = get_associated_token_address_with_program_id(
            &keypair.pubkey(),
            &self.mint,
            &TOKEN_PROGRAM_ID,
        );
        let create_ata =
            spl_associated_token_account::instruction::create_associated_token_account(
                &self.mint_authority.pubkey(),
                &keypair.pubkey(),
                &self.mint,
                &TOKEN_PROGRAM_ID,
            );
        let mint_to = spl_token_2022::instruction::mint_to(
            &TOKEN_PROGRAM_ID,
            &self.mint,
            &token_account,
            &self.mint_authority.pubkey(),
            &[],
            tokens,
        )
        .expect("mint_to");

        let tx = Transaction::new_signed_with_payer(
            &[create_ata, mint_to],
            Some(&self.mint_authority.pubkey()),
            &[&self.mint_authority],
            self.svm.latest_blockhash(),
        );
        self.svm.send_transaction(tx).expect("Member funding failed");

        Member {
            keypair,
            token_account,
        }
    }

    /// Creates the treasury token account of `invite_code` ahead of the
    /// circle, the way anyone watching for the invite code could.
    pub fn create_treasury_account(&mut self, payer: &Member, invite_code: &str) -> Pubkey {
        let (treasury_authority, _) =
            treasury_authority_address(invite_code).expect("valid invite code");
        let create_ata =
            spl_associated_token_account::instruction::create_associated_token_account(
                &payer.pubkey(),
                &treasury_authority,
                &self.mint,
                &TOKEN_PROGRAM_ID,
            );
        self.send(create_ata, &payer.keypair)
            .expect("treasury account creation failed");
        self.addresses(invite_code).treasury
    }

    /// Signs and sends one program instruction with `signer` as fee payer.
    pub fn send(&mut self, ix: Instruction, signer: &Keypair) -> TransactionResult {
        // Identical retries (a replayed disbursement) must not be deduplicated.
        self.svm.expire_blockhash();
        let tx = Transaction::new_signed_with_payer(
            &[ix],
            Some(&signer.pubkey()),
            &[signer],
            self.svm.latest_blockhash(),
        );
        let result = self.svm.send_transaction(tx);
        println!("{:?}", result.as_ref().map(|meta| &meta.logs));
        result
    }

    pub fn addresses(&self, invite_code: &str) -> CircleAddresses {
        self.addresses_for_mint(invite_code, &self.mint)
    }

    pub fn addresses_for_mint(&self, invite_code: &str, mint: &Pubkey) -> CircleAddresses {
        let (circle, _) = circle_address(invite_code).expect("valid invite code");
        let (treasury_authority, _) =
            treasury_authority_address(invite_code).expect("valid invite code");
        let treasury =
            get_associated_token_address_with_program_id(&treasury_authority, mint, &TOKEN_PROGRAM_ID);
        CircleAddresses {
            invite_code: invite_code.to_string(),
            circle,
            treasury_authority,
            treasury,
        }
    }

    pub fn token_balance(&self, token_account: &Pubkey) -> u64 {
        let account = self
            .svm
            .get_account(token_account)
            .expect("token account missing");
        let mut amount = [0u8; 8];
        amount.copy_from_slice(&account.data[TOKEN_AMOUNT_OFFSET..TOKEN_AMOUNT_OFFSET + 8]);
        u64::from_le_bytes(amount)
    }

    pub fn circle(&self, addresses: &CircleAddresses) -> Circle {
        let account = self.svm.get_account(&addresses.circle).expect("circle missing");
        Circle::try_deserialize(&mut account.data.as_slice()).expect("circle layout")
    }

    pub fn request(&self, request: &Pubkey) -> FundingRequest {
        let account = self.svm.get_account(request).expect("request missing");
        FundingRequest::try_deserialize(&mut account.data.as_slice()).expect("request layout")
    }

    // -----------------------------------------------------------------------
    // Instructions
    // -----------------------------------------------------------------------

    pub fn create_circle(
        &mut self,
        creator: &Member,
        invite_code: &str,
        contribution_amount: u64,
        policy: CirclePolicy,
    ) -> TransactionResult {
        let mint = self.mint;
        self.create_circle_with_mint(creator, invite_code, contribution_amount, policy, mint)
    }

    pub fn create_circle_with_mint(
        &mut self,
        creator: &Member,
        invite_code: &str,
        contribution_amount: u64,
        policy: CirclePolicy,
        mint: Pubkey,
    ) -> TransactionResult {
        let addresses = self.addresses_for_mint(invite_code, &mint);
        let accounts = savings_circle::accounts::CreateCircle {
            creator: creator.pubkey(),
            circle: addresses.circle,
            treasury_authority: addresses.treasury_authority,
            treasury_token_account: addresses.treasury,
            mint,
            token_program: TOKEN_PROGRAM_ID,
            associated_token_program: associated_token::ID,
            system_program: anchor_lang::system_program::ID,
        };
        let data = savings_circle::instruction::CreateCircle {
            name: "Lagos Circle".to_string(),
            contribution_amount,
            invite_code: invite_code.to_string(),
            policy,
        };
        self.send(program_ix(accounts.to_account_metas(None), data.data()), &creator.keypair)
    }

    pub fn join(&mut self, joiner: &Member, invite_code: &str) -> TransactionResult {
        let (circle, _) = circle_address(invite_code).expect("valid invite code");
        let accounts = savings_circle::accounts::JoinCircle {
            joiner: joiner.pubkey(),
            circle,
        };
        let data = savings_circle::instruction::JoinCircle {
            _invite_code: invite_code.to_string(),
        };
        self.send(program_ix(accounts.to_account_metas(None), data.data()), &joiner.keypair)
    }

    pub fn contribute(
        &mut self,
        member: &Member,
        addresses: &CircleAddresses,
        amount: u64,
    ) -> TransactionResult {
        let accounts = savings_circle::accounts::Contribute {
            member: member.pubkey(),
            circle: addresses.circle,
            member_token_account: member.token_account,
            treasury_authority: addresses.treasury_authority,
            treasury_token_account: addresses.treasury,
            mint: self.mint,
            token_program: TOKEN_PROGRAM_ID,
        };
        let data = savings_circle::instruction::Contribute {
            _invite_code: addresses.invite_code.clone(),
            amount,
        };
        self.send(program_ix(accounts.to_account_metas(None), data.data()), &member.keypair)
    }

    /// Files a request as request number `index` of the circle.
    pub fn create_request(
        &mut self,
        requester: &Member,
        addresses: &CircleAddresses,
        index: u64,
        amount: u64,
    ) -> (Pubkey, TransactionResult) {
        let (funding_request, _) = request_address(&addresses.circle, index);
        let accounts = savings_circle::accounts::CreateRequest {
            requester: requester.pubkey(),
            circle: addresses.circle,
            funding_request,
            system_program: anchor_lang::system_program::ID,
        };
        let data = savings_circle::instruction::CreateRequest {
            _invite_code: addresses.invite_code.clone(),
            amount,
            description: "Medical bills".to_string(),
        };
        let result = self.send(
            program_ix(accounts.to_account_metas(None), data.data()),
            &requester.keypair,
        );
        (funding_request, result)
    }

    pub fn vote(
        &mut self,
        voter: &Member,
        addresses: &CircleAddresses,
        funding_request: Pubkey,
        in_favor: bool,
    ) -> TransactionResult {
        let accounts = savings_circle::accounts::VoteOnRequest {
            voter: voter.pubkey(),
            circle: addresses.circle,
            funding_request,
        };
        let data = savings_circle::instruction::VoteOnRequest {
            _invite_code: addresses.invite_code.clone(),
            in_favor,
        };
        self.send(program_ix(accounts.to_account_metas(None), data.data()), &voter.keypair)
    }

    pub fn disburse(
        &mut self,
        authority: &Member,
        addresses: &CircleAddresses,
        funding_request: Pubkey,
        requester_token_account: Pubkey,
    ) -> TransactionResult {
        let accounts = savings_circle::accounts::DisburseFunds {
            authority: authority.pubkey(),
            circle: addresses.circle,
            funding_request,
            requester_token_account,
            treasury_authority: addresses.treasury_authority,
            treasury_token_account: addresses.treasury,
            mint: self.mint,
            token_program: TOKEN_PROGRAM_ID,
        };
        let data = savings_circle::instruction::DisburseFunds {
            _invite_code: addresses.invite_code.clone(),
        };
        self.send(program_ix(accounts.to_account_metas(None), data.data()), &authority.keypair)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn program_ix(accounts: Vec<solana_instruction::AccountMeta>, data: Vec<u8>) -> Instruction {
    Instruction {
        program_id: PROGRAM_ID,
        accounts,
        data,
    }
}

/// Custom program error code carried by a failed transaction, if any.
pub fn custom_error(result: &TransactionResult) -> Option<u32> {
    match result {
        Err(failed) => match &failed.err {
            TransactionError::InstructionError(_, InstructionError::Custom(code)) => Some(*code),
            _ => None,
        },
        Ok(_) => None,
    }
}

/// Asserts that `result` failed with the given program error.
pub fn assert_program_error(result: &TransactionResult, expected: savings_circle::error::CircleError) {
    assert_eq!(
        custom_error(result),
        Some(u32::from(expected)),
        "expected {:?}",
        expected
    );
}
