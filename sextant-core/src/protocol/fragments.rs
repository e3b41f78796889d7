//! Multi-sentence AIS message reassembly
//!
//! Long messages (type 5, 19, 21, binary messages) span several sentences
//! linked by a small sequential message id. Fragments must arrive in order;
//! anything else discards the group.

use std::collections::HashMap;
use std::sync::Mutex;

use super::payload::Payload;
use super::sentence::AisSentence;
use crate::error::Result;

#[derive(Debug)]
struct PartialMessage {
    fragment_count: u8,
    payloads: Vec<String>,
}

/// Collects fragments until a message is complete.
///
/// Shared by every sentence source feeding one pipeline; the internal mutex
/// serializes access. Groups are keyed by sequential id only, so two sources
/// interleaving groups with the same id will disturb each other.
#[derive(Debug, Default)]
pub struct FragmentReassembler {
    // Key None is used for fragments sent without a sequential id
    groups: Mutex<HashMap<Option<u8>, PartialMessage>>,
}

impl FragmentReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one fragment.
    ///
    /// Returns the de-armored payload when the last fragment of a group in
    /// correct order arrives, `Ok(None)` while a group is incomplete or after
    /// a group has been dropped, and an error only if the completed payload
    /// is not valid armor.
    pub fn push(&self, sentence: &AisSentence) -> Result<Option<Payload>> {
        if sentence.is_single_fragment() {
            return Payload::from_armored(&sentence.payload, sentence.fill_bits).map(Some);
        }

        let mut groups = self.groups.lock().unwrap_or_else(|e| e.into_inner());
        let key = sentence.sequence_id;

        if sentence.fragment_number == 1 {
            if groups.contains_key(&key) {
                log::debug!("Sequence {:?}: restarting incomplete group", key);
            }
            groups.insert(
                key,
                PartialMessage {
                    fragment_count: sentence.fragment_count,
                    payloads: vec![sentence.payload.clone()],
                },
            );
            return Ok(None);
        }

        let in_order = groups.get(&key).is_some_and(|group| {
            group.fragment_count == sentence.fragment_count
                && group.payloads.len() + 1 == sentence.fragment_number as usize
        });
        if !in_order {
            if groups.remove(&key).is_some() {
                log::debug!(
                    "Sequence {:?}: fragment {} of {} out of order, group dropped",
                    key,
                    sentence.fragment_number,
                    sentence.fragment_count
                );
            }
            return Ok(None);
        }

        let Some(group) = groups.get_mut(&key) else {
            return Ok(None);
        };
        group.payloads.push(sentence.payload.clone());
        if sentence.fragment_number < sentence.fragment_count {
            return Ok(None);
        }

        let armored: String = groups
            .remove(&key)
            .map(|group| group.payloads.concat())
            .unwrap_or_default();
        drop(groups);

        Payload::from_armored(&armored, sentence.fill_bits).map(Some)
    }

    /// Number of groups waiting for more fragments
    pub fn pending(&self) -> usize {
        self.groups.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Forget all incomplete groups
    pub fn clear(&self) {
        self.groups.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
