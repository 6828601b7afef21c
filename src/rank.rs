//! Picks the best node out of one discovery round's gossip.

use std::cmp::Ordering;

use crate::gossip::MemberInfo;

/// Choose the member a client should connect to.
///
/// Dead members are ignored. Among the rest, a declared leader wins; without
/// one, the best remaining role wins (see [`NodeRole`](crate::NodeRole)).
/// Ties go to the most recent member, then to the lowest address, so the
/// result never depends on input order.
pub fn rank(members: &[MemberInfo]) -> Option<&MemberInfo> {
    members
        .iter()
        .filter(|m| m.is_alive)
        .max_by(|a, b| preference(a, b))
}

fn preference(a: &MemberInfo, b: &MemberInfo) -> Ordering {
    a.role
        .priority()
        .cmp(&b.role.priority())
        .then_with(|| a.recency().cmp(&b.recency()))
        // Lower address is preferred, so compare reversed.
        .then_with(|| b.address.cmp(&a.address))
}
