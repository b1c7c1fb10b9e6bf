// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Contact notifications derived from per-body touching sets.
//!
//! Each body remembers which bodies it touched this step and last step. The
//! difference of the two maps yields enter, stay, and exit transitions, which
//! the world returns from `step` instead of invoking callbacks.

use std::collections::BTreeMap;

use crate::body::BodyHandle;

/// Whether a contact involved a trigger.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContactKind {
    /// Solid contact that was resolved by the solver.
    Collision,
    /// At least one body is a trigger; no impulses were applied.
    Trigger,
}

/// Transition of a touching relationship across one step.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContactPhase {
    /// Touching now, not touching last step.
    Enter,
    /// Touching in both steps.
    Stay,
    /// Touched last step, not touching now.
    Exit,
}

/// One notification addressed to `body` about `other`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactEvent {
    /// Receiver.
    pub body: BodyHandle,
    /// The body it touched.
    pub other: BodyHandle,
    /// Collision or trigger.
    pub kind: ContactKind,
    /// Enter, stay, or exit.
    pub phase: ContactPhase,
}

/// Appends the transitions of `body` to `out` in ascending `other` order.
///
/// Exits carry the kind recorded when the contact was last seen, so they
/// still resolve after the other body was removed.
pub(crate) fn diff_touching(
    body: BodyHandle,
    current: &BTreeMap<BodyHandle, ContactKind>,
    previous: &BTreeMap<BodyHandle, ContactKind>,
    out: &mut Vec<ContactEvent>,
) {
    let start = out.len();
    for (&other, &kind) in current {
        let phase = if previous.contains_key(&other) {
            ContactPhase::Stay
        } else {
            ContactPhase::Enter
        };
        out.push(ContactEvent {
            body,
            other,
            kind,
            phase,
        });
    }
    for (&other, &kind) in previous {
        if !current.contains_key(&other) {
            out.push(ContactEvent {
                body,
                other,
                kind,
                phase: ContactPhase::Exit,
            });
        }
    }
    out[start..].sort_by_key(|e| e.other);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(index: u32) -> BodyHandle {
        BodyHandle {
            index,
            generation: 0,
        }
    }

    #[test]
    fn diff_classifies_each_transition() {
        let previous = BTreeMap::from([(h(1), ContactKind::Collision), (h(3), ContactKind::Trigger)]);
        let current = BTreeMap::from([(h(1), ContactKind::Collision), (h(2), ContactKind::Collision)]);
        let mut out = Vec::new();
        diff_touching(h(0), &current, &previous, &mut out);
        let phases: Vec<_> = out.iter().map(|e| (e.other, e.phase, e.kind)).collect();
        assert_eq!(
            phases,
            vec![
                (h(1), ContactPhase::Stay, ContactKind::Collision),
                (h(2), ContactPhase::Enter, ContactKind::Collision),
                (h(3), ContactPhase::Exit, ContactKind::Trigger),
            ]
        );
    }
}
