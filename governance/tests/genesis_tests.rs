//! Genesis export/import of governance state.

use simplegov_governance::{
    export_genesis, init_genesis, GenesisProposal, GenesisState, GovParams, GovernanceError,
    Keeper, Proposal, ProposalState, Tally, TallyOutcome, Vote, VoteOption,
};
use simplegov_nullables::{NullBank, NullKvStore, NullStake};
use simplegov_types::{Address, BlockHeight, Coins, ProposalId};

fn open_proposal(id: u64, submit_block: u64, window: u64) -> Proposal {
    Proposal::new(
        ProposalId::new(id),
        format!("proposal {id}"),
        "text",
        Address::new("alice"),
        BlockHeight::new(submit_block),
        window,
        Coins::single("coin", 10),
    )
}

fn vote(id: u64, voter: &str, option: VoteOption, weight: u64) -> Vote {
    Vote {
        proposal_id: ProposalId::new(id),
        voter: Address::new(voter),
        option,
        weight,
        cast_at: BlockHeight::new(1),
    }
}

#[test]
fn export_then_import_resumes_identically() {
    let bank = NullBank::new().with_balance("alice", Coins::single("coin", 100));
    let stake = NullStake::new().with_power("bob", 5).with_power("carol", 3);
    let source = NullKvStore::new();
    init_genesis(&source, &GenesisState::default()).unwrap();

    {
        let keeper = Keeper::load(&source, &bank, &stake).unwrap();
        let alice = Address::new("alice");
        let first = keeper
            .submit_proposal("a", "b", &alice, BlockHeight::new(1), Some(2), Coins::single("coin", 10))
            .unwrap();
        let second = keeper
            .submit_proposal("c", "d", &alice, BlockHeight::new(2), Some(10), Coins::single("coin", 10))
            .unwrap();
        keeper
            .cast_vote(first, VoteOption::Yes, &Address::new("bob"), 5, BlockHeight::new(2))
            .unwrap();
        keeper
            .cast_vote(second, VoteOption::No, &Address::new("carol"), 3, BlockHeight::new(2))
            .unwrap();
        keeper.end_block(BlockHeight::new(3)).unwrap();
    }

    let exported = export_genesis(&source).unwrap();
    assert_eq!(exported.next_proposal_id, ProposalId::new(3));
    assert_eq!(exported.proposals.len(), 2);
    assert_eq!(exported.proposals[0].proposal.state, ProposalState::Passed);
    assert_eq!(exported.proposals[0].votes.len(), 1);
    assert_eq!(exported.proposals[1].proposal.state, ProposalState::Open);

    let json = serde_json::to_string_pretty(&exported).unwrap();
    let decoded: GenesisState = serde_json::from_str(&json).unwrap();

    let target = NullKvStore::new();
    init_genesis(&target, &decoded).unwrap();
    assert_eq!(export_genesis(&target).unwrap(), exported);
    assert_eq!(target.snapshot(), source.snapshot());

    let keeper = Keeper::load(&target, &bank, &stake).unwrap();
    assert_eq!(keeper.open_proposals().unwrap(), vec![ProposalId::new(2)]);
    let resolutions = keeper.end_block(BlockHeight::new(12)).unwrap();
    assert_eq!(resolutions[0].outcome, TallyOutcome::Rejected);
}

#[test]
fn queue_is_rebuilt_from_open_proposals_in_id_order() {
    let mut genesis = GenesisState {
        next_proposal_id: ProposalId::new(4),
        ..GenesisState::default()
    };
    let mut resolved = open_proposal(2, 1, 1);
    resolved.state = ProposalState::Rejected;
    resolved.resolved_at = Some(BlockHeight::new(2));
    resolved.deposit = Coins::empty();
    for proposal in [open_proposal(3, 5, 5), resolved, open_proposal(1, 5, 50)] {
        genesis.proposals.push(GenesisProposal {
            proposal,
            votes: Vec::new(),
        });
    }

    let store = NullKvStore::new();
    init_genesis(&store, &genesis).unwrap();
    let keeper = Keeper::load(&store, NullBank::new(), NullStake::new()).unwrap();
    assert_eq!(
        keeper.open_proposals().unwrap(),
        vec![ProposalId::new(1), ProposalId::new(3)]
    );
}

#[test]
fn params_survive_the_roundtrip() {
    let params = GovParams {
        default_voting_window: 42,
        quorum: 7,
        threshold_bps: 6_000,
        ..GovParams::default()
    };
    let store = NullKvStore::new();
    init_genesis(&store, &GenesisState::with_params(params.clone())).unwrap();
    assert_eq!(export_genesis(&store).unwrap().params, params);

    let keeper = Keeper::load(&store, NullBank::new(), NullStake::new()).unwrap();
    assert_eq!(keeper.params(), &params);
}

#[test]
fn inconsistent_genesis_is_rejected() {
    let mut mismatched = open_proposal(1, 1, 10);
    mismatched.tally = Tally::new(10, 0, 0);
    let cases = vec![
        // Tally disagrees with the votes.
        GenesisState {
            next_proposal_id: ProposalId::new(2),
            proposals: vec![GenesisProposal {
                proposal: mismatched,
                votes: vec![vote(1, "bob", VoteOption::Yes, 9)],
            }],
            ..GenesisState::default()
        },
        // Id at or beyond the counter.
        GenesisState {
            next_proposal_id: ProposalId::new(1),
            proposals: vec![GenesisProposal {
                proposal: open_proposal(1, 1, 10),
                votes: Vec::new(),
            }],
            ..GenesisState::default()
        },
        // Duplicate id.
        GenesisState {
            next_proposal_id: ProposalId::new(5),
            proposals: vec![
                GenesisProposal {
                    proposal: open_proposal(1, 1, 10),
                    votes: Vec::new(),
                },
                GenesisProposal {
                    proposal: open_proposal(1, 2, 10),
                    votes: Vec::new(),
                },
            ],
            ..GenesisState::default()
        },
        // Vote filed under the wrong proposal.
        GenesisState {
            next_proposal_id: ProposalId::new(5),
            proposals: vec![GenesisProposal {
                proposal: open_proposal(1, 1, 10),
                votes: vec![vote(2, "bob", VoteOption::Yes, 0)],
            }],
            ..GenesisState::default()
        },
    ];

    for genesis in cases {
        let store = NullKvStore::new();
        let err = init_genesis(&store, &genesis).unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidGenesis(_)), "{err}");
        assert!(store.is_empty());
    }
}

#[test]
fn empty_json_uses_defaults() {
    let genesis: GenesisState = serde_json::from_str("{}").unwrap();
    assert_eq!(genesis, GenesisState::default());
    assert_eq!(genesis.next_proposal_id, ProposalId::FIRST);
}

#[test]
fn open_deposits_sum_only_open_proposals() {
    let mut resolved = open_proposal(1, 1, 2);
    resolved.state = ProposalState::Rejected;
    resolved.resolved_at = Some(BlockHeight::new(3));
    let mut larger = open_proposal(3, 2, 5);
    larger.deposit = Coins::single("coin", 25);

    let genesis = GenesisState {
        next_proposal_id: ProposalId::new(4),
        proposals: [resolved, open_proposal(2, 2, 5), larger]
            .into_iter()
            .map(|proposal| GenesisProposal {
                proposal,
                votes: Vec::new(),
            })
            .collect(),
        ..GenesisState::default()
    };
    assert_eq!(genesis.open_deposits(), Some(Coins::single("coin", 35)));
    assert_eq!(GenesisState::default().open_deposits(), Some(Coins::empty()));
}
