//! Domain types.

mod key_entry;
mod recipient;

pub use key_entry::KeyEntry;
pub use recipient::RecipientSet;
