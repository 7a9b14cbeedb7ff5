use super::{shutdown_signal, ApplicationState, Command};
use crate::{
    service::notifications_widget::NotificationsWidget,
    session::{Session, SessionProvider},
    view,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    task::JoinSet,
    time::{interval, MissedTickBehavior},
};

///
/// Hosts the widget in the terminal.
///
/// Network bound work runs in spawned tasks, so the loop keeps
/// handling input while requests are in flight. The view is rendered
/// again after every handled event and every finished task.
///
#[tracing::instrument(name = "Application", skip_all)]
pub async fn run(state: ApplicationState) -> anyhow::Result<()> {
    let ApplicationState {
        session_provider,
        widget,
        refresh_interval,
    } = state;

    let mut tasks = JoinSet::new();
    let mut session_rx = session_provider.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut refresh = interval(refresh_interval);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately and mount already fetches
    refresh.tick().await;

    let session = session_rx.borrow_and_update().clone();
    dispatch_session_change(&widget, session, &mut tasks);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    render(&widget).await?;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,

            changed = session_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let session = session_rx.borrow_and_update().clone();
                dispatch_session_change(&widget, session, &mut tasks);
            }

            Some(result) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(err) = result {
                    tracing::error!(%err, "widget task failed");
                }
            }

            _ = refresh.tick() => {
                refresh_if_authenticated(&session_provider, &widget, &mut tasks);
                continue;
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        handle_command(command, &session_provider, &widget, &mut tasks).await;
                    }
                    Err(err) => tracing::warn!(%err, "invalid command"),
                }
            }
        }

        render(&widget).await?;
    }

    tracing::info!(pending = tasks.len(), "aborting pending tasks");
    tasks.abort_all();
    while tasks.join_next().await.is_some() {}

    Ok(())
}

///
/// Generation is reserved before spawning, so effects of sessions
/// observed earlier lose even when their task runs later.
///
fn dispatch_session_change(
    widget: &NotificationsWidget,
    session: Session,
    tasks: &mut JoinSet<()>,
) {
    let generation = widget.begin_session();
    let widget = widget.clone();
    tasks.spawn(async move { widget.apply_session(session, generation).await });
}

///
/// ### Returns
/// whether the refresh was spawned
///
fn refresh_if_authenticated(
    session_provider: &SessionProvider,
    widget: &NotificationsWidget,
    tasks: &mut JoinSet<()>,
) -> bool {
    if !session_provider.current().is_authenticated() {
        return false;
    }

    tracing::debug!("periodic refresh");
    let widget = widget.clone();
    tasks.spawn(async move {
        let _ = widget.fetch_notifications().await;
    });

    true
}

async fn handle_command(
    command: Command,
    session_provider: &SessionProvider,
    widget: &NotificationsWidget,
    tasks: &mut JoinSet<()>,
) {
    tracing::debug!(?command, "handling command");

    match command {
        Command::Toggle => {
            widget.toggle_panel().await;
        }
        Command::Close => widget.close_panel().await,
        Command::Click(id) => {
            let widget = widget.clone();
            tasks.spawn(async move { widget.on_notification_click(&id).await });
        }
        Command::ReadAll => {
            let widget = widget.clone();
            tasks.spawn(async move {
                let report = widget.mark_all_as_read().await;
                if !report.is_complete() {
                    tracing::warn!(
                        failed = report.failed.len(),
                        "mark all as read finished partially"
                    );
                }
            });
        }
        Command::Refresh => {
            let widget = widget.clone();
            tasks.spawn(async move {
                let _ = widget.fetch_notifications().await;
            });
        }
        Command::Login(token) => {
            if let Err(err) = session_provider.sign_in(token) {
                tracing::warn!(%err, "sign in failed");
            }
        }
        Command::Logout => session_provider.sign_out(),
        // handled by the caller
        Command::Quit => {}
    }
}

async fn render(widget: &NotificationsWidget) -> anyhow::Result<()> {
    let view = view::render(&widget.snapshot().await);

    let mut stdout = tokio::io::stdout();
    stdout.write_all(view.as_bytes()).await?;
    stdout.flush().await?;

    Ok(())
}
