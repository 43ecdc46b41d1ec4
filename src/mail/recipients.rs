//! Recipient partitioning for a delimiter-separated address list.

use std::collections::HashSet;

use lettre::message::Mailbox;

use crate::error::ProcedureError;

/// Primary "to" address plus blind-copy recipients from the same list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientSet {
    pub primary: Mailbox,
    pub secondary: Vec<Mailbox>,
}

impl RecipientSet {
    /// Number of distinct envelope recipients.
    pub fn recipient_count(&self) -> usize {
        1 + self.secondary.len()
    }
}

/// Split on `,` and `;`, dropping blank tokens.
pub fn split_tokens(raw: &str) -> Vec<&str> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Build the recipient set for one dispatch.
///
/// The first token becomes the primary recipient. Later tokens become
/// secondary recipients unless the same text was already seen in this call,
/// the primary included.
pub fn partition_recipients(raw: &str) -> Result<RecipientSet, ProcedureError> {
    let tokens = split_tokens(raw);
    let (first, rest) = tokens.split_first().ok_or(ProcedureError::NoRecipients)?;

    let primary = parse_mailbox(first)?;
    let mut seen: HashSet<&str> = HashSet::from([*first]);
    let mut secondary = Vec::new();

    for &token in rest {
        if seen.insert(token) {
            secondary.push(parse_mailbox(token)?);
        }
    }

    Ok(RecipientSet { primary, secondary })
}

pub fn parse_mailbox(address: &str) -> Result<Mailbox, ProcedureError> {
    address
        .parse::<Mailbox>()
        .map_err(|source| ProcedureError::AddressFormat {
            address: address.to_string(),
            source,
        })
}
