use crate::output::{OutputMode, item_row, render};
use crate::session::{self, Operation, resolve_id};
use anyhow::Result;
use clap::Args;
use sift_core::config::EffectiveConfig;
use sift_core::order::OrderKey;
use sift_core::{Item, Replica, SiftError};

#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Item to check or uncheck (full ID or unique prefix).
    pub id: String,
}

struct Toggle<'a> {
    id: &'a str,
}

impl Operation for Toggle<'_> {
    type Output = Item;
    const WRITES: bool = true;

    fn apply<K: OrderKey>(&self, replica: &mut Replica<K>) -> Result<Item> {
        let id = resolve_id(replica.store(), self.id)?;
        replica.toggle(&id)?;
        let record = replica.store().get(&id).ok_or(SiftError::NotFound(id))?;
        Ok(record.view())
    }
}

/// Execute `sift toggle`.
///
/// # Errors
///
/// Returns an error if the id does not resolve, the item is removed, or the
/// snapshot cannot be locked, read or written.
pub fn run_toggle(args: &ToggleArgs, config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let item = session::execute(config, &Toggle { id: &args.id })?;
    render(output, &item, |item, w| item_row(w, item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::State;
    use sift_core::clock::SystemClock;
    use sift_core::order::AlphaKey;

    #[test]
    fn toggle_flips_and_reports_new_state() {
        let mut replica = Replica::<AlphaKey>::new("r", SystemClock::new());
        let record = replica.new_item("x", None).unwrap();
        let id = record.id.to_string();

        let item = Toggle { id: &id }.apply(&mut replica).unwrap();
        assert_eq!(item.state, State::Checked);
        let item = Toggle { id: &id }.apply(&mut replica).unwrap();
        assert_eq!(item.state, State::Unchecked);
    }

    #[test]
    fn toggle_removed_item_fails() {
        let mut replica = Replica::<AlphaKey>::new("r", SystemClock::new());
        let record = replica.new_item("x", None).unwrap();
        replica.remove(&record.id).unwrap();

        let id = record.id.to_string();
        let err = Toggle { id: &id }.apply(&mut replica).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiftError>(),
            Some(SiftError::ItemRemoved(_))
        ));
    }
}
