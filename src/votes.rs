use log::*;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::command::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteResult {
    pub command: Command,
    pub votes: usize,
    pub users: Vec<String>,
}

/// The latest command of every user who voted since the last round.
///
/// One lock guards every access, so a submission racing a drain ends up
/// entirely in one round or entirely in the next.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Mutex<HashMap<String, Command>>,
}

impl CommandQueue {
    pub fn new() -> CommandQueue {
        CommandQueue::default()
    }

    /// Records `command` as the vote of `user`, returning the vote it replaced.
    pub fn submit(&self, user: &str, command: Command) -> Option<Command> {
        self.lock().insert(user.to_string(), command)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Takes every pending vote, leaving the queue empty.
    pub fn drain(&self) -> Vec<(String, Command)> {
        self.lock().drain().collect()
    }

    pub fn tally(&self) -> Vec<VoteResult> {
        tally(self.drain())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Command>> {
        // a panicking holder cannot leave the map half-updated
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Groups votes by command description.
///
/// Results come back with the most votes first, equal counts ordered by
/// description, and voters of each bucket sorted by name.
pub fn tally<I>(votes: I) -> Vec<VoteResult>
where
    I: IntoIterator<Item = (String, Command)>,
{
    let mut buckets: BTreeMap<String, VoteResult> = BTreeMap::new();
    let mut count = 0;

    for (user, command) in votes {
        count += 1;
        match buckets.entry(command.vote_key().to_string()) {
            Entry::Occupied(mut bucket) => {
                let result = bucket.get_mut();
                result.votes += 1;
                result.users.push(user);
            }
            Entry::Vacant(bucket) => {
                bucket.insert(VoteResult {
                    command,
                    votes: 1,
                    users: vec![user],
                });
            }
        }
    }

    debug!("Tallied {} votes into {} buckets", count, buckets.len());

    let mut results: Vec<VoteResult> = buckets.into_values().collect();
    for result in results.iter_mut() {
        result.users.sort();
    }
    results.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then_with(|| a.command.description.cmp(&b.command.description))
    });
    results
}

/// The bucket with the most votes. Ties go to the lexicographically
/// smallest description, regardless of the order of `results`.
pub fn select_winner(results: &[VoteResult]) -> Option<&VoteResult> {
    results.iter().max_by(|a, b| {
        a.votes
            .cmp(&b.votes)
            .then_with(|| b.command.description.cmp(&a.command.description))
    })
}
