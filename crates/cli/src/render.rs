//! Plain-text tables and notices on stdout; binding progress on stderr.

use doorctl_binding::{BindingSnapshot, BindingState};
use doorctl_console::{Notice, NoticeLevel};
use doorctl_core::batch::BatchOutcome;
use doorctl_core::models::{AccessLog, Admin, Card, CurrentAdmin, DoorStatus, User};
use doorctl_core::types::Timestamp;

fn when(ts: Option<&Timestamp>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

fn opt(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn active(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn users(rows: &[&User]) {
    println!(
        "{:<36}  {:<12}  {:<24}  {:<28}  {:>5}  {:<6}  {}",
        "ID", "STUDENT ID", "NAME", "EMAIL", "CARDS", "ACTIVE", "CREATED"
    );
    for user in rows {
        println!(
            "{:<36}  {:<12}  {:<24}  {:<28}  {:>5}  {:<6}  {}",
            user.id,
            user.student_id,
            user.name,
            opt(user.email.as_deref()),
            user.card_count,
            active(user.is_active),
            when(user.created_at.as_ref()),
        );
    }
    println!("{} user(s)", rows.len());
}

pub fn cards(rows: &[&Card]) {
    println!(
        "{:<36}  {:<16}  {:<20}  {:<36}  {:<6}  {}",
        "ID", "RFID UID", "NICKNAME", "OWNER", "ACTIVE", "CREATED"
    );
    for card in rows {
        println!(
            "{:<36}  {:<16}  {:<20}  {:<36}  {:<6}  {}",
            card.id,
            card.rfid_uid,
            opt(card.nickname.as_deref()),
            opt(card.user_id.as_deref()),
            active(card.is_active),
            when(card.created_at.as_ref()),
        );
    }
    println!("{} card(s)", rows.len());
}

pub fn admins(rows: &[&Admin]) {
    println!("{:<36}  {:<16}  {:<24}  {}", "ID", "USERNAME", "NAME", "CREATED");
    for admin in rows {
        println!(
            "{:<36}  {:<16}  {:<24}  {}",
            admin.id,
            admin.username,
            admin.name,
            when(admin.created_at.as_ref()),
        );
    }
    println!("{} administrator(s)", rows.len());
}

pub fn logs(rows: &[&AccessLog]) {
    println!(
        "{:<16}  {:<9}  {:<24}  {:<12}  {}",
        "TIME", "ACTION", "NAME", "STUDENT ID", "RFID UID"
    );
    for log in rows {
        println!(
            "{:<16}  {:<9}  {:<24}  {:<12}  {}",
            when(log.timestamp.as_ref()),
            log.action.as_str(),
            opt(log.user_name.as_deref()),
            opt(log.student_id.as_deref()),
            opt(log.rfid_uid.as_deref()),
        );
    }
    println!("{} entr(ies)", rows.len());
}

pub fn door(status: &DoorStatus) {
    let locked = match status.locked {
        Some(true) => "locked",
        Some(false) => "open",
        None => "unknown",
    };
    let mode = status
        .lock_mode
        .map(|m| m.to_string())
        .unwrap_or_else(|| "unknown".into());
    println!("Door: {locked} (mode: {mode})");
    if let Some(message) = &status.message {
        println!("{message}");
    }
}

pub fn whoami(admin: Option<&CurrentAdmin>) {
    match admin {
        Some(admin) => println!(
            "Signed in as {} ({})",
            admin.display_name(),
            opt(admin.username.as_deref())
        ),
        None => println!("Not signed in"),
    }
}

pub fn notice(notice: &Notice) {
    let tag = match notice.level {
        NoticeLevel::Success => "OK",
        NoticeLevel::Warning => "WARNING",
        NoticeLevel::Error => "ERROR",
    };
    println!("[{tag}] {notice}");
}

pub fn batch(title: &str, outcome: &BatchOutcome) {
    notice(&Notice::batch(title, outcome));
}

/// Tracks what was last printed so progress is only reported on change.
#[derive(Debug, Default)]
pub struct Progress {
    last: Option<(BindingState, u32, String)>,
    last_remaining: Option<u32>,
}

impl Progress {
    pub fn update(&mut self, snap: &BindingSnapshot) {
        if !snap.state.is_active() {
            return;
        }
        let key = (snap.state, snap.step, snap.message.clone());
        let changed = self.last.as_ref() != Some(&key);
        let milestone = snap.state == BindingState::AwaitingScan
            && self.last_remaining != Some(snap.remaining_seconds)
            && snap.remaining_seconds % 10 == 0;

        if changed || milestone {
            eprintln!(
                "[{:>2}s] {} (scans: {}) {}",
                snap.remaining_seconds,
                snap.state.label(),
                snap.step,
                snap.message
            );
            self.last_remaining = Some(snap.remaining_seconds);
        }
        self.last = Some(key);
    }
}
