//! Activation conflict parsing
//!
//! The API reports a conflicting activation as a 409 whose general message
//! names the membership and the UID in free text. Two phrasings exist.

use crate::error::{BadRequest, Error};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

/// The membership and account involved in a failed activation.
///
/// Read-only once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    membership_id: String,
    uid: String,
    message: String,
}

impl Conflict {
    pub(crate) fn new(
        membership_id: impl Into<String>,
        uid: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            membership_id: membership_id.into(),
            uid: uid.into(),
            message: message.into(),
        }
    }

    /// Membership named by the server
    pub fn membership_id(&self) -> &str {
        &self.membership_id
    }

    /// Account UID named by the server
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Server message the fields were extracted from
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Which side of the membership/account pairing is already taken
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationConflict {
    /// The UID has already activated a different membership
    AnotherMembershipActivated(Conflict),
    /// The membership was already activated by a different UID
    MembershipAlreadyActivated(Conflict),
}

impl ActivationConflict {
    /// Extracted fields
    pub fn conflict(&self) -> &Conflict {
        match self {
            ActivationConflict::AnotherMembershipActivated(c)
            | ActivationConflict::MembershipAlreadyActivated(c) => c,
        }
    }

    /// Typed error keeping `source` as its cause
    pub fn into_error(self, source: BadRequest) -> Error {
        match self {
            ActivationConflict::AnotherMembershipActivated(conflict) => {
                Error::AnotherMembershipActivated { conflict, source }
            }
            ActivationConflict::MembershipAlreadyActivated(conflict) => {
                Error::MembershipAlreadyActivated { conflict, source }
            }
        }
    }
}

type Build = fn(&Captures<'_>, &str) -> ActivationConflict;

/// Tried in order; the first template that matches wins
static TEMPLATES: LazyLock<[(Regex, Build); 2]> = LazyLock::new(|| {
    [
        (
            Regex::new(r"The UID (\S+) has already activated membership (\S+)").unwrap(),
            another_membership as Build,
        ),
        (
            Regex::new(r"The membership (\S+) was already activated with UID (\S+)").unwrap(),
            membership_already as Build,
        ),
    ]
});

fn another_membership(caps: &Captures<'_>, message: &str) -> ActivationConflict {
    ActivationConflict::AnotherMembershipActivated(Conflict::new(&caps[2], &caps[1], message))
}

fn membership_already(caps: &Captures<'_>, message: &str) -> ActivationConflict {
    ActivationConflict::MembershipAlreadyActivated(Conflict::new(&caps[1], &caps[2], message))
}

/// Find the first message matching a known conflict template
pub fn parse_conflict(messages: &[String]) -> Option<ActivationConflict> {
    messages.iter().find_map(|message| {
        TEMPLATES.iter().find_map(|(pattern, build)| {
            pattern.captures(message).map(|caps| build(&caps, message))
        })
    })
}

/// Specialise a failed activation.
///
/// A 409 whose general messages match a conflict template becomes the
/// matching typed error. Everything else is returned unchanged.
pub fn classify_activation_error(err: Error) -> Error {
    let Error::BadRequest(bad) = err else {
        return err;
    };
    if bad.code != 409 {
        return Error::BadRequest(bad);
    }
    match parse_conflict(bad.general_messages()) {
        Some(conflict) => {
            debug!(?conflict, "activation conflict");
            conflict.into_error(bad)
        }
        None => Error::BadRequest(bad),
    }
}
