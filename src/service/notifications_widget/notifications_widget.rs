use super::dto::{MarkAllAsReadReport, WidgetSnapshot, WidgetState};
use crate::{error::Error, service::notifications_api::NotificationsApi, session::Session};
use futures::future::join_all;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::Mutex;

///
/// Bell with unread counter and dropdown panel listing notifications
/// of the signed in user.
///
/// Network failures never leave the widget. They are logged
/// and the state simply stays as it was.
///
#[derive(Clone)]
pub struct NotificationsWidget {
    api: Arc<dyn NotificationsApi>,
    state: Arc<Mutex<WidgetState>>,
    latest_generation: Arc<AtomicU64>,
}

impl NotificationsWidget {
    pub fn new(api: Arc<dyn NotificationsApi>) -> Self {
        let state = Arc::new(Mutex::new(WidgetState::new()));
        let latest_generation = Arc::new(AtomicU64::new(0));

        Self {
            api,
            state,
            latest_generation,
        }
    }

    ///
    /// Reserves generation for the next session change.
    ///
    /// Must be called synchronously in the order sessions are observed,
    /// before the effect is spawned, so that effects applied out of order
    /// can be recognized.
    ///
    pub fn begin_session(&self) -> u64 {
        self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    ///
    /// Runs every time the session changes.
    ///
    pub async fn on_session_change(&self, session: Session) {
        let generation = self.begin_session();
        self.apply_session(session, generation).await;
    }

    ///
    /// Session effect for generation reserved with [Self::begin_session].
    /// Fetches notifications when the session has a user,
    /// otherwise resets the widget without touching the network.
    /// Effect is dropped when a newer session was dispatched in the meantime.
    ///
    #[tracing::instrument(
        name = "Session change",
        skip(self, session),
        fields(user_id = ?session.user.as_ref().map(|user| user.id))
    )]
    pub async fn apply_session(&self, session: Session, generation: u64) {
        let authenticated = session.is_authenticated();
        {
            let mut state = self.state.lock().await;

            let latest_generation = self.latest_generation.load(Ordering::SeqCst);
            if generation != latest_generation {
                tracing::debug!(latest_generation, "newer session dispatched, dropping effect");
                return;
            }

            let user_changed = state.session.user.as_ref().map(|user| user.id)
                != session.user.as_ref().map(|user| user.id);
            if user_changed || !authenticated {
                state.reset();
            }

            state.generation = generation;
            state.session = session;
            state.loading = true;
        }

        if !authenticated {
            tracing::debug!("no user in session, skipping fetch");
            return;
        }

        // failure is already logged
        let _ = self.fetch_notifications().await;
    }

    ///
    /// Replace local notifications with the list from the server.
    ///
    /// ### Errors
    /// - [Error::Unauthenticated] when there is no user, nothing is requested
    /// - [Error::StaleResponse] when the session changed while waiting for the response
    /// - errors of [NotificationsApi::fetch_notifications], state stays unchanged
    ///
    #[tracing::instrument(name = "Fetch notifications", skip_all)]
    pub async fn fetch_notifications(&self) -> Result<(), Error> {
        let (generation, access_token) = self.dispatch_context().await?;

        let result = self.api.fetch_notifications(&access_token).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(
                generation,
                current_generation = state.generation,
                "discarding stale notifications"
            );
            return Err(Error::StaleResponse);
        }

        state.loading = false;
        match result {
            Ok(notifications) => {
                state.replace_notifications(notifications);
                tracing::info!(
                    count = state.notifications.len(),
                    unread_count = state.unread_count,
                    "notifications loaded"
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, "failed to fetch notifications");
                Err(err)
            }
        }
    }

    ///
    /// Mark notification as read on the server and then locally.
    ///
    /// ### Errors
    /// - [Error::Unauthenticated] when there is no user
    /// - [Error::StaleResponse] when the session changed while waiting for the response
    /// - errors of [NotificationsApi::mark_as_read], state stays unchanged
    ///
    #[tracing::instrument(name = "Mark as read", skip(self))]
    pub async fn mark_as_read(&self, id: &str) -> Result<(), Error> {
        let (generation, access_token) = self.dispatch_context().await?;

        if let Err(err) = self.api.mark_as_read(&access_token, id).await {
            tracing::error!(%err, "failed to mark notification as read");
            return Err(err);
        }

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!("session changed, ignoring read confirmation");
            return Err(Error::StaleResponse);
        }

        if state.mark_read(id) {
            tracing::info!(unread_count = state.unread_count, "notification read");
        }

        Ok(())
    }

    ///
    /// Sends one request per unread notification without waiting
    /// for previous ones. Each successful response is applied on its own,
    /// so the report tells which notifications stayed unread.
    ///
    #[tracing::instrument(name = "Mark all as read", skip_all)]
    pub async fn mark_all_as_read(&self) -> MarkAllAsReadReport {
        let unread_ids = self.state.lock().await.unread_ids();
        tracing::info!(count = unread_ids.len(), "marking notifications as read");

        let results = join_all(unread_ids.iter().map(|id| self.mark_as_read(id))).await;

        let mut report = MarkAllAsReadReport::default();
        for (id, result) in unread_ids.into_iter().zip(results) {
            match result {
                Ok(()) => report.marked.push(id),
                Err(_) => report.failed.push(id),
            }
        }

        if !report.is_complete() {
            tracing::warn!(
                marked = report.marked.len(),
                failed = ?report.failed,
                "some notifications were not marked as read"
            );
        }

        report
    }

    ///
    /// Click on the bell
    ///
    /// ### Returns
    /// whether the panel is open after the click
    ///
    pub async fn toggle_panel(&self) -> bool {
        let mut state = self.state.lock().await;
        state.show_notifications = !state.show_notifications;

        state.show_notifications
    }

    ///
    /// Click outside of the open panel
    ///
    pub async fn close_panel(&self) {
        self.state.lock().await.show_notifications = false;
    }

    ///
    /// Click on a single notification. Panel stays open.
    ///
    pub async fn on_notification_click(&self, id: &str) {
        // failure is already logged
        let _ = self.mark_as_read(id).await;
    }

    pub async fn snapshot(&self) -> WidgetSnapshot {
        self.state.lock().await.snapshot()
    }

    async fn dispatch_context(&self) -> Result<(u64, String), Error> {
        let state = self.state.lock().await;
        let access_token = state
            .session
            .access_token()
            .ok_or(Error::Unauthenticated)?
            .to_string();

        Ok((state.generation, access_token))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dto::input::{Notification, NotificationType},
        service::notifications_api::MockNotificationsApi,
        session::SessionUser,
    };
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::time::Duration;
    use time::macros::datetime;
    use uuid::Uuid;

    fn notification(id: &str, notification_type: NotificationType, read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            notification_type,
            title: format!("title {id}"),
            message: format!("message {id}"),
            read,
            related_id: None,
            related_type: None,
            created_at: datetime!(2024-05-01 10:15 UTC),
        }
    }

    fn scenario_notifications() -> Vec<Notification> {
        vec![
            notification("1", NotificationType::BountyCreated, false),
            notification("2", NotificationType::PaymentReceived, true),
        ]
    }

    fn session(access_token: &str) -> Session {
        Session::authenticated(SessionUser {
            id: Uuid::new_v4(),
            access_token: access_token.to_string(),
        })
    }

    fn server_error() -> Error {
        Error::ResponseStatus(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[tokio::test]
    async fn anonymous_session_makes_no_request() {
        // mock without expectations panics on any call
        let api = MockNotificationsApi::new();
        let widget = NotificationsWidget::new(Arc::new(api));

        widget.on_session_change(Session::anonymous()).await;

        let snapshot = widget.snapshot().await;
        assert!(snapshot.loading);
        assert!(snapshot.notifications.is_empty());
        assert_eq!(snapshot.unread_count, 0);
    }

    #[tokio::test]
    async fn fetch_without_session_unauthenticated() {
        let api = MockNotificationsApi::new();
        let widget = NotificationsWidget::new(Arc::new(api));

        let result = widget.fetch_notifications().await;

        assert!(matches!(result, Err(Error::Unauthenticated)));
    }

    #[tokio::test]
    async fn session_change_fetches_and_counts_unread() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications()
            .times(1)
            .withf(|access_token| access_token == "token")
            .returning(|_| Ok(scenario_notifications()));
        let widget = NotificationsWidget::new(Arc::new(api));

        widget.on_session_change(session("token")).await;

        let snapshot = widget.snapshot().await;
        assert!(!snapshot.loading);
        assert_eq!(snapshot.notifications, scenario_notifications());
        assert_eq!(snapshot.unread_count, 1);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_state() {
        let mut api = MockNotificationsApi::new();
        let mut calls = 0;
        api.expect_fetch_notifications()
            .times(2)
            .returning(move |_| {
                calls += 1;
                match calls {
                    1 => Ok(scenario_notifications()),
                    _ => Err(server_error()),
                }
            });
        let widget = NotificationsWidget::new(Arc::new(api));
        widget.on_session_change(session("token")).await;

        let result = widget.fetch_notifications().await;

        assert!(matches!(result, Err(Error::ResponseStatus(_))));
        let snapshot = widget.snapshot().await;
        assert!(!snapshot.loading);
        assert_eq!(snapshot.notifications, scenario_notifications());
        assert_eq!(snapshot.unread_count, 1);
    }

    #[tokio::test]
    async fn first_fetch_failure_clears_loading() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications()
            .times(1)
            .returning(|_| Err(server_error()));
        let widget = NotificationsWidget::new(Arc::new(api));

        widget.on_session_change(session("token")).await;

        let snapshot = widget.snapshot().await;
        assert!(!snapshot.loading);
        assert!(snapshot.notifications.is_empty());
    }

    #[tokio::test]
    async fn mark_as_read_success() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications()
            .returning(|_| Ok(scenario_notifications()));
        api.expect_mark_as_read()
            .times(1)
            .withf(|access_token, id| access_token == "token" && id == "1")
            .returning(|_, _| Ok(()));
        let widget = NotificationsWidget::new(Arc::new(api));
        widget.on_session_change(session("token")).await;

        widget.mark_as_read("1").await.unwrap();

        let snapshot = widget.snapshot().await;
        assert!(snapshot.notifications[0].read);
        assert_eq!(snapshot.unread_count, 0);
    }

    #[tokio::test]
    async fn mark_as_read_already_read_keeps_counter() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications()
            .returning(|_| Ok(scenario_notifications()));
        api.expect_mark_as_read().returning(|_, _| Ok(()));
        let widget = NotificationsWidget::new(Arc::new(api));
        widget.on_session_change(session("token")).await;

        widget.mark_as_read("2").await.unwrap();

        assert_eq!(widget.snapshot().await.unread_count, 1);
    }

    #[tokio::test]
    async fn mark_as_read_failure_keeps_state() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications()
            .returning(|_| Ok(scenario_notifications()));
        api.expect_mark_as_read()
            .times(1)
            .returning(|_, _| Err(server_error()));
        let widget = NotificationsWidget::new(Arc::new(api));
        widget.on_session_change(session("token")).await;

        let result = widget.mark_as_read("1").await;

        assert!(result.is_err());
        let snapshot = widget.snapshot().await;
        assert!(!snapshot.notifications[0].read);
        assert_eq!(snapshot.unread_count, 1);
    }

    #[tokio::test]
    async fn mark_all_as_read_one_request_per_unread() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications().returning(|_| {
            Ok(vec![
                notification("1", NotificationType::BountyApproved, false),
                notification("2", NotificationType::PaymentReceived, true),
                notification("3", NotificationType::ApplicationReceived, false),
            ])
        });
        api.expect_mark_as_read()
            .times(1)
            .withf(|_, id| id == "1")
            .returning(|_, _| Ok(()));
        api.expect_mark_as_read()
            .times(1)
            .withf(|_, id| id == "3")
            .returning(|_, _| Ok(()));
        let widget = NotificationsWidget::new(Arc::new(api));
        widget.on_session_change(session("token")).await;

        let report = widget.mark_all_as_read().await;

        assert!(report.is_complete());
        assert_eq!(report.marked, vec!["1", "3"]);
        let snapshot = widget.snapshot().await;
        assert_eq!(snapshot.unread_count, 0);
        assert!(snapshot.notifications.iter().all(|n| n.read));
    }

    #[tokio::test]
    async fn mark_all_as_read_partial_failure_reported() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications().returning(|_| {
            Ok(vec![
                notification("1", NotificationType::BountyApproved, false),
                notification("2", NotificationType::BountyCreated, false),
            ])
        });
        api.expect_mark_as_read()
            .withf(|_, id| id == "1")
            .returning(|_, _| Ok(()));
        api.expect_mark_as_read()
            .withf(|_, id| id == "2")
            .returning(|_, _| Err(server_error()));
        let widget = NotificationsWidget::new(Arc::new(api));
        widget.on_session_change(session("token")).await;

        let report = widget.mark_all_as_read().await;

        assert_eq!(report.marked, vec!["1"]);
        assert_eq!(report.failed, vec!["2"]);
        let snapshot = widget.snapshot().await;
        assert_eq!(snapshot.unread_count, 1);
        assert!(!snapshot.notifications[1].read);
    }

    #[tokio::test]
    async fn scenario_click_marks_read_and_keeps_panel_open() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications()
            .returning(|_| Ok(scenario_notifications()));
        api.expect_mark_as_read().returning(|_, _| Ok(()));
        let widget = NotificationsWidget::new(Arc::new(api));
        widget.on_session_change(session("token")).await;
        assert_eq!(widget.snapshot().await.unread_count, 1);

        assert!(widget.toggle_panel().await);
        widget.on_notification_click("1").await;

        let snapshot = widget.snapshot().await;
        assert!(snapshot.show_notifications);
        assert!(snapshot.notifications[0].read);
        assert_eq!(snapshot.unread_count, 0);
    }

    #[tokio::test]
    async fn panel_toggle_and_close() {
        let widget = NotificationsWidget::new(Arc::new(MockNotificationsApi::new()));

        assert!(widget.toggle_panel().await);
        assert!(!widget.toggle_panel().await);
        widget.toggle_panel().await;
        widget.close_panel().await;

        assert!(!widget.snapshot().await.show_notifications);
    }

    #[tokio::test]
    async fn sign_out_resets_state() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications()
            .times(1)
            .returning(|_| Ok(scenario_notifications()));
        let widget = NotificationsWidget::new(Arc::new(api));
        widget.on_session_change(session("token")).await;
        widget.toggle_panel().await;

        widget.on_session_change(Session::anonymous()).await;

        let snapshot = widget.snapshot().await;
        assert!(snapshot.notifications.is_empty());
        assert!(snapshot.loading);
        assert!(!snapshot.show_notifications);
        assert_eq!(snapshot.unread_count, 0);
    }

    fn session_of(user_id: Uuid, access_token: &str) -> Session {
        Session::authenticated(SessionUser {
            id: user_id,
            access_token: access_token.to_string(),
        })
    }

    #[tokio::test]
    async fn user_switch_with_failed_fetch_hides_previous_user_notifications() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications()
            .withf(|access_token| access_token == "first")
            .returning(|_| Ok(scenario_notifications()));
        api.expect_fetch_notifications()
            .withf(|access_token| access_token == "second")
            .returning(|_| Err(server_error()));
        let widget = NotificationsWidget::new(Arc::new(api));
        widget.on_session_change(session("first")).await;
        widget.toggle_panel().await;

        widget.on_session_change(session("second")).await;

        let snapshot = widget.snapshot().await;
        assert!(!snapshot.loading);
        assert!(snapshot.notifications.is_empty());
        assert_eq!(snapshot.unread_count, 0);
        assert!(!snapshot.show_notifications);
    }

    #[tokio::test]
    async fn same_user_new_token_keeps_notifications_on_failed_fetch() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications()
            .withf(|access_token| access_token == "first")
            .returning(|_| Ok(scenario_notifications()));
        api.expect_fetch_notifications()
            .withf(|access_token| access_token == "refreshed")
            .returning(|_| Err(server_error()));
        let widget = NotificationsWidget::new(Arc::new(api));
        let user_id = Uuid::new_v4();
        widget.on_session_change(session_of(user_id, "first")).await;

        widget
            .on_session_change(session_of(user_id, "refreshed"))
            .await;

        let snapshot = widget.snapshot().await;
        assert_eq!(snapshot.notifications, scenario_notifications());
        assert_eq!(snapshot.unread_count, 1);
    }

    #[tokio::test]
    async fn older_session_effect_applied_last_is_dropped() {
        let mut api = MockNotificationsApi::new();
        // any fetch with other token panics
        api.expect_fetch_notifications()
            .times(1)
            .withf(|access_token| access_token == "second")
            .returning(|_| Ok(scenario_notifications()));
        let widget = NotificationsWidget::new(Arc::new(api));

        let first_generation = widget.begin_session();
        let second_generation = widget.begin_session();
        widget
            .apply_session(session("second"), second_generation)
            .await;
        widget.apply_session(session("first"), first_generation).await;

        let snapshot = widget.snapshot().await;
        assert_eq!(snapshot.notifications, scenario_notifications());
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn older_sign_out_applied_last_does_not_reset() {
        let mut api = MockNotificationsApi::new();
        api.expect_fetch_notifications()
            .times(1)
            .returning(|_| Ok(scenario_notifications()));
        let widget = NotificationsWidget::new(Arc::new(api));

        let sign_out_generation = widget.begin_session();
        let sign_in_generation = widget.begin_session();
        widget
            .apply_session(session("token"), sign_in_generation)
            .await;
        widget
            .apply_session(Session::anonymous(), sign_out_generation)
            .await;

        let snapshot = widget.snapshot().await;
        assert_eq!(snapshot.notifications, scenario_notifications());
        assert_eq!(snapshot.unread_count, 1);
        assert!(!snapshot.loading);
    }

    ///
    /// Answers slower for the first user than for the second one
    ///
    struct SlowFirstUserApi;

    #[async_trait]
    impl NotificationsApi for SlowFirstUserApi {
        async fn fetch_notifications(&self, access_token: &str) -> Result<Vec<Notification>, Error> {
            if access_token == "first" {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(vec![notification("first", NotificationType::BountyCreated, false)])
            } else {
                Ok(vec![notification("second", NotificationType::BountyCreated, true)])
            }
        }

        async fn mark_as_read(&self, _: &str, _: &str) -> Result<(), Error> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn stale_response_of_previous_session_discarded() {
        let widget = NotificationsWidget::new(Arc::new(SlowFirstUserApi));

        let first = {
            let widget = widget.clone();
            tokio::spawn(async move { widget.on_session_change(session("first")).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        widget.on_session_change(session("second")).await;
        first.await.unwrap();

        let snapshot = widget.snapshot().await;
        assert_eq!(snapshot.notifications.len(), 1);
        assert_eq!(snapshot.notifications[0].id, "second");
        assert_eq!(snapshot.unread_count, 0);
        assert!(!snapshot.loading);
    }
}
