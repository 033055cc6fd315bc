//! Entities: users, channels, and the in-process registry owning both.
//!
//! [`Registry`] holds the only mutable shared state of the relay: the table
//! of connected users and the table of channels. Channel member lists refer
//! to users by id, never by ownership; the two tables cross-reference each
//! other, so they are held and mutated together.

use std::collections::HashMap;

use super::error::RegistryError;
use super::value_object::{ChannelName, Timestamp, UserId};

/// A connected user. Owned by the registry for its connected lifetime; the
/// outbound send handle lives in the message pusher, keyed by the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    /// Remote network address in `ip|port` form.
    pub addr: String,
    pub connected_at: Timestamp,
}

impl User {
    pub fn new(id: UserId, addr: String, connected_at: Timestamp) -> Self {
        Self {
            id,
            addr,
            connected_at,
        }
    }
}

/// A named channel. Member order is insertion order: it is the broadcast
/// delivery order and the order new joiners receive the existing-member
/// roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: ChannelName,
    pub members: Vec<UserId>,
    pub created_at: Timestamp,
}

impl Channel {
    pub fn new(name: ChannelName, created_at: Timestamp) -> Self {
        Self {
            name,
            members: Vec::new(),
            created_at,
        }
    }

    /// Append a member. A user appears at most once per channel, so a repeat
    /// join leaves the list untouched and returns `false`.
    pub fn add_member(&mut self, user: UserId) -> bool {
        if self.is_member(&user) {
            return false;
        }
        self.members.push(user);
        true
    }

    /// Remove the first occurrence of a member; `false` if absent.
    pub fn remove_member(&mut self, user: &UserId) -> bool {
        match self.members.iter().position(|m| m == user) {
            Some(idx) => {
                self.members.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Result of joining a channel, captured in one registry mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSnapshot {
    /// Members present before the join, excluding the joiner: the roster the
    /// joiner is sent, in membership order.
    pub existing: Vec<UserId>,
    /// Full membership after the join, joiner included.
    pub members: Vec<UserId>,
    /// Whether the channel was created by this join.
    pub created: bool,
}

/// Result of an explicit departure from a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DepartStatus {
    UnknownChannel,
    NotAMember,
    Departed {
        /// Membership at the moment of departure, the leaver included: the
        /// audience of the departure notice.
        recipients: Vec<UserId>,
        /// Whether the channel was deleted because it became empty.
        deleted: bool,
    },
}

/// One channel a purged user was removed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub channel: ChannelName,
    /// Members remaining after the removal; empty means the channel was
    /// deleted.
    pub remaining: Vec<UserId>,
}

/// The process-wide pair of registries: `users: id → User` and
/// `channels: name → Channel`. Created once per server run, rebuilt from
/// zero on restart; a channel is present iff its member list is non-empty.
#[derive(Debug, Default)]
pub struct Registry {
    users: HashMap<UserId, User>,
    channels: HashMap<ChannelName, Channel>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Connection registry
    // ------------------------------------------------------------------

    /// Insert a user; the identifier must not already be present.
    pub fn register_user(&mut self, user: User) -> Result<(), RegistryError> {
        if self.users.contains_key(&user.id) {
            return Err(RegistryError::DuplicateUserId(user.id.to_string()));
        }
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn lookup_user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// Delete a user entry. Removing an absent id is a no-op.
    pub fn remove_user(&mut self, id: &UserId) -> Option<User> {
        self.users.remove(id)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    // ------------------------------------------------------------------
    // Channel registry
    // ------------------------------------------------------------------

    pub fn resolve_channel(&self, name: &ChannelName) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub fn get_or_create_channel(
        &mut self,
        name: &ChannelName,
        created_at: Timestamp,
    ) -> &mut Channel {
        self.channels
            .entry(name.clone())
            .or_insert_with(|| Channel::new(name.clone(), created_at))
    }

    /// Join `user` to the channel, creating it if absent. Returns the
    /// before/after membership captured under the same mutation.
    pub fn join(&mut self, name: &ChannelName, user: &UserId, now: Timestamp) -> JoinSnapshot {
        let created = !self.channels.contains_key(name);
        let channel = self.get_or_create_channel(name, now);
        let existing: Vec<UserId> = channel
            .members
            .iter()
            .filter(|m| *m != user)
            .cloned()
            .collect();
        channel.add_member(user.clone());
        JoinSnapshot {
            existing,
            members: channel.members.clone(),
            created,
        }
    }

    /// Remove `user` from the channel, deleting the channel if it becomes
    /// empty.
    pub fn depart(&mut self, name: &ChannelName, user: &UserId) -> DepartStatus {
        let Some(channel) = self.channels.get_mut(name) else {
            return DepartStatus::UnknownChannel;
        };
        if !channel.is_member(user) {
            return DepartStatus::NotAMember;
        }
        let recipients = channel.members.clone();
        channel.remove_member(user);
        let deleted = channel.is_empty();
        if deleted {
            self.channels.remove(name);
        }
        DepartStatus::Departed {
            recipients,
            deleted,
        }
    }

    /// Remove a user from the user table and from every channel containing
    /// it, deleting channels left empty. Idempotent: purging an unknown user
    /// returns no departures.
    pub fn purge_user(&mut self, id: &UserId) -> Vec<Departure> {
        self.remove_user(id);
        let mut departures = Vec::new();
        for name in self.channels_containing(id) {
            if let Some(channel) = self.channels.get_mut(&name) {
                channel.remove_member(id);
                let remaining = channel.members.clone();
                if remaining.is_empty() {
                    self.channels.remove(&name);
                }
                departures.push(Departure {
                    channel: name,
                    remaining,
                });
            }
        }
        departures
    }

    /// Names of every channel the user belongs to, in sorted order.
    pub fn channels_containing(&self, user: &UserId) -> Vec<ChannelName> {
        let mut names: Vec<ChannelName> = self
            .channels
            .values()
            .filter(|c| c.is_member(user))
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn channel_members(&self, name: &ChannelName) -> Option<&[UserId]> {
        self.channels.get(name).map(|c| c.members.as_slice())
    }

    /// All channels, sorted by name for stable listings.
    pub fn channels(&self) -> Vec<&Channel> {
        let mut channels: Vec<&Channel> = self.channels.values().collect();
        channels.sort_by(|a, b| a.name.cmp(&b.name));
        channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
