//! Simulated login form.
//!
//! Submitting never leaves the page: the button shows a loading label for a
//! fixed delay, then the form reports success through the notification and
//! logs what was entered (the password is never logged).

use serde::Serialize;
use tracing::debug;
use vista_dom::NodeId;

use crate::behavior::{Behavior, PageContext};
use crate::events::{PageEvent, closest_listener, reaches};
use crate::scheduler::TimerId;

pub const LABEL_IDLE: &str = "로그인";
pub const LABEL_BUSY: &str = "로그인 중...";
pub const SUCCESS_MESSAGE: &str = "로그인 성공!";

const EYE_HIDDEN: &str = "👁️";
const EYE_SHOWN: &str = "👁️‍🗨️";

const USER_ID_TOO_SHORT: &str = "아이디는 3자 이상이어야 합니다.";
const PASSWORD_TOO_SHORT: &str = "비밀번호는 6자 이상이어야 합니다.";

/// Check the credentials' shape before submitting.
pub fn validate_login(user_id: &str, password: &str) -> Result<(), Vec<&'static str>> {
    let mut errors = Vec::new();
    if user_id.chars().count() < 3 {
        errors.push(USER_ID_TOO_SHORT);
    }
    if password.chars().count() < 6 {
        errors.push(PASSWORD_TOO_SHORT);
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// What the form captured on submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub user_id: String,
    pub user_type: Option<String>,
    pub remember_me: bool,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    form: Option<NodeId>,
    button: Option<NodeId>,
    label: Option<NodeId>,
    toggle: Option<NodeId>,
    password: Option<NodeId>,
    social: Vec<NodeId>,
    in_flight: Vec<(TimerId, Submission)>,
    redirects: Vec<TimerId>,
    completed: Vec<Submission>,
}

impl LoginForm {
    /// Submissions that reached the success step, oldest first.
    pub fn completed(&self) -> &[Submission] {
        &self.completed
    }

    fn capture(&self, cx: &PageContext<'_>) -> (Submission, String) {
        let value = |id: &str| {
            cx.doc
                .by_id(id)
                .and_then(|node| cx.doc.element(node))
                .map(|el| el.value().to_string())
                .unwrap_or_default()
        };
        let user_type = cx
            .query(r#"input[name="userType"]:checked"#)
            .and_then(|node| cx.doc.element(node))
            .map(|el| el.value().to_string());
        let remember_me = cx
            .doc
            .by_id("rememberMe")
            .and_then(|node| cx.doc.element(node))
            .is_some_and(|el| el.is_checked());
        let submission = Submission {
            user_id: value("userId"),
            user_type,
            remember_me,
        };
        (submission, value("password"))
    }

    fn submit(&mut self, cx: &mut PageContext<'_>) {
        let (submission, password) = self.capture(cx);
        if cx.config.login.validate {
            if let Err(errors) = validate_login(&submission.user_id, &password) {
                debug!(?errors, "login rejected");
                cx.notify(errors[0]);
                return;
            }
        }
        if let Some(label) = self.label {
            cx.doc.set_text(label, LABEL_BUSY);
        }
        if let Some(button) = self.button {
            cx.doc.set_disabled(button, true);
        }
        let timer = cx.set_timeout(cx.config.login.submit_delay_ms);
        debug!(user_id = %submission.user_id, "login submitted");
        self.in_flight.push((timer, submission));
    }

    fn complete(&mut self, cx: &mut PageContext<'_>, submission: Submission) {
        if let Some(label) = self.label {
            cx.doc.set_text(label, LABEL_IDLE);
        }
        if let Some(button) = self.button {
            cx.doc.set_disabled(button, false);
        }
        cx.notify(SUCCESS_MESSAGE);
        match serde_json::to_string(&submission) {
            Ok(record) => cx.log(record),
            Err(err) => debug!(%err, "could not serialize submission"),
        }
        let redirect = cx.set_timeout(cx.config.login.redirect_delay_ms);
        self.redirects.push(redirect);
        self.completed.push(submission);
    }

    fn toggle_password(&self, cx: &mut PageContext<'_>) {
        let Some(password) = self.password else {
            return;
        };
        let next = if cx.doc.attr(password, "type") == Some("password") {
            "text"
        } else {
            "password"
        };
        cx.doc.set_attr(password, "type", next);
        let icon = self
            .toggle
            .and_then(|toggle| cx.query_first_within(toggle, ".eye-icon"));
        if let Some(icon) = icon {
            let glyph = if next == "password" { EYE_HIDDEN } else { EYE_SHOWN };
            cx.doc.set_text(icon, glyph);
        }
    }
}

impl Behavior for LoginForm {
    fn name(&self) -> &'static str {
        "login"
    }

    fn init(&mut self, cx: &mut PageContext<'_>) {
        self.form = cx.doc.by_id("loginForm");
        self.toggle = cx.doc.by_id("togglePassword");
        self.password = cx.doc.by_id("password");
        if let Some(form) = self.form {
            self.button = cx.query_first_within(form, ".btn-login");
            self.label = self
                .button
                .and_then(|button| cx.query_first_within(button, ".btn-text"));
        }
        self.social = cx.query_all(".social-btn");
    }

    fn on_event(&mut self, cx: &mut PageContext<'_>, event: &PageEvent) {
        match event {
            PageEvent::Submit { form } if Some(*form) == self.form => {
                cx.prevent_default();
                self.submit(cx);
            }
            PageEvent::Click { target } => {
                if self
                    .toggle
                    .is_some_and(|toggle| reaches(cx.doc, toggle, *target))
                {
                    self.toggle_password(cx);
                }
                if let Some(button) = closest_listener(cx.doc, &self.social, *target) {
                    let platform = if cx.doc.has_class(button, "google") {
                        "Google"
                    } else {
                        "Naver"
                    };
                    cx.notify(&format!("{platform} 로그인 준비 중..."));
                }
            }
            _ => {}
        }
    }

    fn on_timer(&mut self, cx: &mut PageContext<'_>, timer: TimerId) {
        if let Some(index) = self.in_flight.iter().position(|(id, _)| *id == timer) {
            let (_, submission) = self.in_flight.remove(index);
            self.complete(cx, submission);
        } else if let Some(index) = self.redirects.iter().position(|id| *id == timer) {
            // The redirect is simulated; the page stays put.
            self.redirects.remove(index);
            debug!("login redirect skipped");
        }
    }
}
