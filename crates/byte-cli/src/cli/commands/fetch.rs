//! Fetch command handler.

use anyhow::Result;
use byte_core::config::{Config, paths};
use byte_core::item::{BucketKind, Item, ItemDetail};
use byte_core::prefs::{self, FilePreferences, ViewMode};
use byte_core::store::{Bucket, LoadState};

use super::Session;

/// Post descriptions are cut to this many words in listings.
const SUMMARY_WORDS: usize = 30;

pub async fn run(config: &Config, kind: Option<BucketKind>) -> Result<()> {
    let mut store = FilePreferences::open(&paths::preferences_path())?;
    if let Some(kind) = kind {
        prefs::set_last_section(&mut store, kind.into())?;
    }
    let mode = prefs::view_mode(&store);

    let mut session = Session::from_config(config)?;
    session.load().await;

    let kinds: Vec<BucketKind> = match kind {
        Some(kind) => vec![kind],
        None => BucketKind::ALL.to_vec(),
    };
    for kind in kinds {
        print_bucket(kind, session.dashboard.store().bucket(kind), mode);
    }
    Ok(())
}

fn print_bucket(kind: BucketKind, bucket: &Bucket, mode: ViewMode) {
    match bucket.state() {
        LoadState::Loaded => println!("{} ({})", kind.label(), bucket.items().len()),
        LoadState::Failed => println!("{} (failed)", kind.label()),
        LoadState::Pending => println!("{} (not loaded)", kind.label()),
    }
    // `#N` is the position `send` accepts for ids that change per load.
    for (position, item) in bucket.items().iter().enumerate() {
        match mode {
            ViewMode::Overlay => print_line(kind, position, item),
            ViewMode::Structured => print_card(kind, position, item),
        }
    }
}

fn print_line(kind: BucketKind, position: usize, item: &Item) {
    let when = item.timestamp.as_deref().unwrap_or("-");
    println!("  #{position} {kind}:{}  {}  [{when}]", item.id, item.title);
}

fn print_card(kind: BucketKind, position: usize, item: &Item) {
    println!("  #{position} {kind}:{}", item.id);
    println!("    title:   {}", item.title);
    if !item.source.is_empty() {
        println!("    source:  {}", item.source);
    }
    if let Some(when) = &item.timestamp {
        println!("    when:    {when}");
    }
    match &item.detail {
        ItemDetail::Post { link } => {
            if let Some(link) = link {
                println!("    link:    {link}");
            }
        }
        ItemDetail::Event {
            presenter,
            location,
            invite_link,
            ..
        } => {
            if let Some(presenter) = presenter {
                println!("    by:      {presenter}");
            }
            if let Some(location) = location {
                println!("    where:   {location}");
            }
            if let Some(link) = invite_link {
                println!("    invite:  {link}");
            }
        }
        ItemDetail::ExternalEvent { link, location } => {
            if let Some(location) = location {
                println!("    where:   {location}");
            }
            if let Some(link) = link {
                println!("    link:    {link}");
            }
        }
    }
    if let Some(image) = item.image() {
        println!("    image:   {image}");
    }
    let summary = item.summary(SUMMARY_WORDS);
    if !summary.is_empty() {
        println!("    {summary}");
    }
}
