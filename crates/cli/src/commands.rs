//! Subcommand handlers. Each builds the view it needs, runs one action,
//! and renders the result.

use doorctl_binding::SessionId;
use doorctl_client::AdminApi;
use doorctl_console::{
    AdminsView, CardsView, DoorView, LogsView, SessionView, UsersView, ViewError,
};
use doorctl_core::models::{NewAdmin, NewCard, NewUser, Registration, UserUpdate};

use crate::args::{AdminsCommand, CardsCommand, Command, DoorCommand, UsersCommand};
use crate::render;

/// Marks an error whose notice has already been printed.
#[derive(Debug)]
pub struct Reported;

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("action failed")
    }
}

/// Print the failure as a blocking notice and tag it [`Reported`].
///
/// An expired session is left to the shell, which prints its own notice.
fn report(title: &'static str) -> impl FnOnce(ViewError) -> anyhow::Error {
    move |err| {
        if err.is_auth_expired() {
            return err.into();
        }
        render::notice(&err.notice(title));
        anyhow::Error::new(err).context(Reported)
    }
}

pub async fn run(api: &AdminApi, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login => {
            let mut view = SessionView::new(api.clone());
            let admin = view.whoami().await.map_err(report("Login"))?;
            render::whoami(admin);
        }
        Command::Logout => {
            let mut view = SessionView::new(api.clone());
            let notice = view.logout().await.map_err(report("Logout"))?;
            render::notice(&notice);
        }
        Command::Whoami => {
            let mut view = SessionView::new(api.clone());
            let admin = view.whoami().await.map_err(report("Who am I"))?;
            render::whoami(admin);
        }
        Command::Users { command } => users(api, command).await?,
        Command::Register {
            student_id,
            name,
            email,
            telegram_id,
            nickname,
        } => {
            let mut view = UsersView::new(api.clone());
            let session = view
                .start_registration(Registration {
                    student_id,
                    name,
                    email,
                    telegram_id,
                    nickname,
                })
                .map_err(report("Register"))?;
            follow_binding(&mut view, session).await?;
        }
        Command::Cards { command } => cards(api, command).await?,
        Command::Admins { command } => admins(api, command).await?,
        Command::Logs { limit, search } => {
            let mut view = LogsView::new(api.clone());
            view.set_limit(limit);
            view.load().await.map_err(report("Access log"))?;
            render::logs(&view.filter(search.as_deref().unwrap_or("")));
        }
        Command::Door { command } => door(api, command).await?,
    }
    Ok(())
}

async fn users(api: &AdminApi, command: UsersCommand) -> anyhow::Result<()> {
    let mut view = UsersView::new(api.clone());
    match command {
        UsersCommand::List { search } => {
            view.load().await.map_err(report("Users"))?;
            render::users(&view.filter(search.as_deref().unwrap_or("")));
        }
        UsersCommand::Add {
            student_id,
            name,
            email,
            telegram_id,
        } => {
            let notice = view
                .create(NewUser {
                    student_id,
                    name,
                    email,
                    telegram_id,
                })
                .await
                .map_err(report("Add user"))?;
            render::notice(&notice);
        }
        UsersCommand::Update {
            id,
            student_id,
            name,
            email,
            telegram_id,
        } => {
            view.load().await.map_err(report("Edit user"))?;
            let user = view.get(&id).map_err(report("Edit user"))?;
            let update = UserUpdate {
                student_id: student_id.unwrap_or_else(|| user.student_id.clone()),
                name: name.unwrap_or_else(|| user.name.clone()),
                email: email.or_else(|| user.email.clone()),
                telegram_id: telegram_id.or_else(|| user.telegram_id.clone()),
                is_active: None,
            };
            let notice = view.update(&id, update).await.map_err(report("Edit user"))?;
            render::notice(&notice);
        }
        UsersCommand::Delete { ids } => {
            let outcome = view.delete_many(&ids).await.map_err(report("Delete users"))?;
            render::batch("Delete users", &outcome);
        }
        UsersCommand::Enable { ids } => {
            view.load().await.map_err(report("Enable users"))?;
            let outcome = view
                .set_active_many(&ids, true)
                .await
                .map_err(report("Enable users"))?;
            render::batch("Enable users", &outcome);
        }
        UsersCommand::Disable { ids } => {
            view.load().await.map_err(report("Disable users"))?;
            let outcome = view
                .set_active_many(&ids, false)
                .await
                .map_err(report("Disable users"))?;
            render::batch("Disable users", &outcome);
        }
        UsersCommand::Cards { id } => {
            let cards = view.cards_of(&id).await.map_err(report("User cards"))?;
            render::cards(&cards.iter().collect::<Vec<_>>());
        }
        UsersCommand::Bind {
            student_id,
            nickname,
        } => {
            // Loaded rows give the binding its starting card count.
            view.load().await.map_err(report("Bind card"))?;
            let session = view
                .start_binding(&student_id, nickname.as_deref())
                .map_err(report("Bind card"))?;
            follow_binding(&mut view, session).await?;
        }
    }
    Ok(())
}

/// Show live progress until the session ends. Ctrl-C cancels it.
async fn follow_binding(view: &mut UsersView, session: SessionId) -> anyhow::Result<()> {
    let binding = view.binding();
    let mut updates = binding.subscribe();
    let mut progress = render::Progress::default();
    progress.update(&binding.snapshot());
    eprintln!("Present the card to the reader twice. Press Ctrl-C to cancel.");

    let finish = view.finish_binding(session);
    tokio::pin!(finish);
    let mut updates_open = true;

    let result = loop {
        tokio::select! {
            result = &mut finish => break result,
            changed = updates.changed(), if updates_open => match changed {
                Ok(()) => progress.update(&updates.borrow_and_update()),
                Err(_) => updates_open = false,
            },
            _ = tokio::signal::ctrl_c() => {
                if binding.cancel() {
                    eprintln!("Cancelling card binding...");
                }
            }
        }
    };

    match result.map_err(report("Bind card"))? {
        Some(notice) => render::notice(&notice),
        None => println!("Card binding cancelled"),
    }
    binding.dismiss();
    Ok(())
}

async fn cards(api: &AdminApi, command: CardsCommand) -> anyhow::Result<()> {
    let mut view = CardsView::new(api.clone());
    match command {
        CardsCommand::List { search } => {
            view.load().await.map_err(report("Cards"))?;
            render::cards(&view.filter(search.as_deref().unwrap_or("")));
        }
        CardsCommand::Add {
            user_id,
            rfid_uid,
            nickname,
        } => {
            let notice = view
                .create(NewCard {
                    user_id,
                    rfid_uid,
                    nickname,
                })
                .await
                .map_err(report("Add card"))?;
            render::notice(&notice);
        }
        CardsCommand::Rename { id, nickname } => {
            let notice = view
                .rename(&id, &nickname)
                .await
                .map_err(report("Rename card"))?;
            render::notice(&notice);
        }
        CardsCommand::Enable { ids } => {
            let outcome = view
                .set_active_many(&ids, true)
                .await
                .map_err(report("Enable cards"))?;
            render::batch("Enable cards", &outcome);
        }
        CardsCommand::Disable { ids } => {
            let outcome = view
                .set_active_many(&ids, false)
                .await
                .map_err(report("Disable cards"))?;
            render::batch("Disable cards", &outcome);
        }
        CardsCommand::Delete { ids } => {
            let outcome = view.delete_many(&ids).await.map_err(report("Delete cards"))?;
            render::batch("Delete cards", &outcome);
        }
    }
    Ok(())
}

async fn admins(api: &AdminApi, command: AdminsCommand) -> anyhow::Result<()> {
    let mut view = AdminsView::new(api.clone());
    match command {
        AdminsCommand::List { search } => {
            view.load().await.map_err(report("Administrators"))?;
            render::admins(&view.filter(search.as_deref().unwrap_or("")));
        }
        AdminsCommand::Add {
            username,
            name,
            password,
        } => {
            let notice = view
                .create(NewAdmin {
                    username,
                    password,
                    name,
                })
                .await
                .map_err(report("Add administrator"))?;
            render::notice(&notice);
        }
        AdminsCommand::Delete { ids } => {
            let outcome = view
                .delete_many(&ids)
                .await
                .map_err(report("Delete administrators"))?;
            render::batch("Delete administrators", &outcome);
        }
    }
    Ok(())
}

async fn door(api: &AdminApi, command: DoorCommand) -> anyhow::Result<()> {
    let mut view = DoorView::new(api.clone());
    match command {
        DoorCommand::Unlock => {
            let notice = view.unlock().await.map_err(report("Unlock door"))?;
            render::notice(&notice);
        }
        DoorCommand::Status => {
            let status = view.refresh().await.map_err(report("Door status"))?;
            render::door(status);
        }
        DoorCommand::Mode { mode } => {
            let notice = view.set_mode(mode).await.map_err(report("Lock mode"))?;
            render::notice(&notice);
        }
    }
    Ok(())
}
