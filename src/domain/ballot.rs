use crate::domain::event::{BallotEvent, EventLog, EventRecord};
use crate::domain::identity::Identity;
use crate::error::{AssetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MAX_OPTIONS: usize = 5;
/// Longest option label, in bytes.
pub const MAX_LABEL_LEN: usize = 31;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub weight: u64,
    pub voted: bool,
    /// Final target of this voter's delegation, if it delegated.
    pub delegate: Option<Identity>,
    /// Option chosen by a direct vote.
    pub vote: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotOption {
    pub label: String,
    pub vote_count: u64,
}

/// Weighted ballot with transitive delegation.
///
/// The chairperson registers voters. A voter either votes directly or hands
/// its weight to another voter; delegated weight is counted immediately when
/// the final delegate has already voted and is otherwise added to the
/// delegate's own weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    chairperson: Identity,
    options: Vec<BallotOption>,
    voters: HashMap<Identity, Voter>,
    registered: Vec<Identity>,
    total_votes_cast: u64,
    #[serde(default)]
    events: EventLog,
}

impl Ballot {
    pub fn construct<S: AsRef<str>>(labels: &[S], creator: Identity) -> Result<Self> {
        if labels.len() > MAX_OPTIONS {
            return Err(AssetError::TooManyOptions {
                count: labels.len(),
                max: MAX_OPTIONS,
            });
        }
        let mut options = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            if label.len() > MAX_LABEL_LEN {
                return Err(AssetError::NameTooLong {
                    label: label.to_string(),
                    len: label.len(),
                    max: MAX_LABEL_LEN,
                });
            }
            options.push(BallotOption {
                label: label.to_string(),
                vote_count: 0,
            });
        }

        let mut voters = HashMap::new();
        voters.insert(
            creator,
            Voter {
                weight: 1,
                ..Voter::default()
            },
        );
        Ok(Self {
            chairperson: creator,
            options,
            voters,
            registered: vec![creator],
            total_votes_cast: 0,
            events: EventLog::new(),
        })
    }

    pub fn give_right_to_vote(&mut self, caller: Identity, target: Identity) -> Result<()> {
        if caller != self.chairperson {
            return Err(AssetError::NotChairperson { caller });
        }
        if self.voter_details(target).weight != 0 {
            return Err(AssetError::AlreadyVoter { voter: target });
        }

        self.voters.entry(target).or_default().weight = 1;
        self.registered.push(target);
        tracing::debug!(voter = %target, "voting right granted");
        Ok(())
    }

    /// Casts the caller's full weight for `option_index`.
    pub fn vote(&mut self, caller: Identity, option_index: usize) -> Result<()> {
        let voter = self.eligible(caller)?;
        let count = self.options.len();
        let option = self
            .options
            .get_mut(option_index)
            .ok_or(AssetError::InvalidOption {
                index: option_index,
                count,
            })?;

        option.vote_count += voter.weight;
        let label = option.label.clone();
        self.total_votes_cast += voter.weight;
        let record = self.voters.entry(caller).or_default();
        record.voted = true;
        record.vote = Some(option_index);

        self.events.record(BallotEvent::VoteCast {
            voter: caller,
            option: label,
        });
        tracing::debug!(voter = %caller, option_index, weight = voter.weight, "vote cast");
        Ok(())
    }

    /// Hands the caller's weight to `target`, following `target`'s own delegation chain.
    pub fn delegate(&mut self, caller: Identity, target: Identity) -> Result<()> {
        let sender = self.eligible(caller)?;
        if target == caller {
            return Err(AssetError::SelfDelegation { voter: caller });
        }

        let mut to = target;
        let mut hops = 0;
        while let Some(next) = self.voter_details(to).delegate {
            to = next;
            hops += 1;
            if to == caller || hops > self.registered.len() {
                return Err(AssetError::DelegationLoop {
                    voter: caller,
                    target,
                });
            }
        }

        let delegate = self.voter_details(to);
        if delegate.weight == 0 {
            return Err(AssetError::DelegateCannotVote { delegate: to });
        }

        match delegate.vote {
            Some(option_index) => {
                self.options[option_index].vote_count += sender.weight;
                self.total_votes_cast += sender.weight;
            }
            None => {
                self.voters.entry(to).or_default().weight += sender.weight;
            }
        }
        let record = self.voters.entry(caller).or_default();
        record.voted = true;
        record.delegate = Some(to);

        tracing::debug!(voter = %caller, delegate = %to, weight = sender.weight, "vote delegated");
        Ok(())
    }

    /// Index of the option with the most votes; the earliest wins ties.
    fn leading_option(&self) -> Option<usize> {
        let mut leader: Option<(usize, u64)> = None;
        for (index, option) in self.options.iter().enumerate() {
            match leader {
                Some((_, votes)) if option.vote_count <= votes => {}
                _ => leader = Some((index, option.vote_count)),
            }
        }
        leader.map(|(index, _)| index)
    }

    pub fn current_leader_name(&self) -> Result<&str> {
        if self.total_votes_cast == 0 {
            return Err(AssetError::NoVotesYet);
        }
        let index = self.leading_option().ok_or(AssetError::NoVotesYet)?;
        Ok(&self.options[index].label)
    }

    /// Label of the leading option, provided it holds a strict majority of registered voters.
    pub fn confirmed_winner_name(&self) -> Result<&str> {
        if self.total_votes_cast == 0 {
            return Err(AssetError::NoVotesYet);
        }
        let index = self.leading_option().ok_or(AssetError::NoVotesYet)?;
        let option = &self.options[index];
        let registered = self.registered.len();
        if option.vote_count <= (registered / 2) as u64 {
            return Err(AssetError::InsufficientMajority {
                votes: option.vote_count,
                registered,
            });
        }
        Ok(&option.label)
    }

    pub fn voter_details(&self, identity: Identity) -> Voter {
        self.voters.get(&identity).copied().unwrap_or_default()
    }

    /// Registered voters in registration order, chairperson first.
    pub fn all_voter_identities(&self) -> &[Identity] {
        &self.registered
    }

    pub fn all_options(&self) -> &[BallotOption] {
        &self.options
    }

    pub fn chairperson(&self) -> Identity {
        self.chairperson
    }

    pub fn registered_voter_count(&self) -> usize {
        self.registered.len()
    }

    pub fn total_votes_cast(&self) -> u64 {
        self.total_votes_cast
    }

    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    fn eligible(&self, caller: Identity) -> Result<Voter> {
        let voter = self.voter_details(caller);
        if voter.weight == 0 {
            return Err(AssetError::NoRightToVote { voter: caller });
        }
        if voter.voted {
            return Err(AssetError::AlreadyVoted { voter: caller });
        }
        Ok(voter)
    }
}
