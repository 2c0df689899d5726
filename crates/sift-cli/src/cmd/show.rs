use crate::output::{OutputMode, pretty_kv, render};
use crate::session::{self, Operation, resolve_id};
use anyhow::Result;
use chrono::{DateTime, SecondsFormat};
use clap::Args;
use serde::Serialize;
use sift_core::config::EffectiveConfig;
use sift_core::crdt::LwwRegister;
use sift_core::order::OrderKey;
use sift_core::{ItemId, Replica, SiftError, State};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Item to show (full ID or unique prefix). Removed items are shown too.
    pub id: String,
}

/// Who wrote a field last, and when.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct Stamp {
    wall_ts: u64,
    at: Option<String>,
    replica: String,
}

impl<T> From<&LwwRegister<T>> for Stamp {
    fn from(register: &LwwRegister<T>) -> Self {
        Self {
            wall_ts: register.wall_ts,
            at: format_micros(register.wall_ts),
            replica: register.replica.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ItemDetail {
    id: ItemId,
    title: String,
    state: State,
    order: String,
    title_written: Stamp,
    state_written: Stamp,
}

/// RFC 3339 rendering of a microsecond stamp, if it is a representable date.
fn format_micros(wall_ts: u64) -> Option<String> {
    let micros = i64::try_from(wall_ts).ok()?;
    DateTime::from_timestamp_micros(micros).map(|at| at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

struct Show<'a> {
    id: &'a str,
}

impl Operation for Show<'_> {
    type Output = ItemDetail;
    const WRITES: bool = false;

    fn apply<K: OrderKey>(&self, replica: &mut Replica<K>) -> Result<ItemDetail> {
        let id = resolve_id(replica.store(), self.id)?;
        let record = replica.store().get(&id).ok_or(SiftError::NotFound(id))?;
        Ok(ItemDetail {
            id,
            title: record.title.value.clone(),
            state: record.state.value,
            order: record.order.to_string(),
            title_written: Stamp::from(&record.title),
            state_written: Stamp::from(&record.state),
        })
    }
}

fn stamp_line(stamp: &Stamp) -> String {
    let at = stamp
        .at
        .clone()
        .unwrap_or_else(|| stamp.wall_ts.to_string());
    format!("{at} by {}", stamp.replica)
}

/// Execute `sift show`.
///
/// # Errors
///
/// Returns an error if the id does not resolve or the snapshot cannot be
/// locked or read.
pub fn run_show(args: &ShowArgs, config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let detail = session::execute(config, &Show { id: &args.id })?;
    render(output, &detail, |d, w| {
        pretty_kv(w, "id", d.id.to_string())?;
        pretty_kv(w, "title", &d.title)?;
        pretty_kv(w, "state", d.state.as_str())?;
        pretty_kv(w, "order", &d.order)?;
        pretty_kv(w, "titled", stamp_line(&d.title_written))?;
        pretty_kv(w, "state set", stamp_line(&d.state_written))
    })
}
