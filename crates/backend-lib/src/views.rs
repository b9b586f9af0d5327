// ============================
// gymdesk-backend/src/views.rs
// ============================
//! Server-rendered HTML pages.
use std::fmt::Write as _;

use axum::{http::StatusCode, response::Html};
use gymdesk_common::Flash;

use crate::auth::Session;
use crate::models::{AuditRecord, DashboardStats};

const APP_NAME: &str = "GymDesk";

/// Escape text for use in HTML bodies and attribute values
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn flash_list(flashes: &[Flash]) -> String {
    if flashes.is_empty() {
        return String::new();
    }
    let mut html = String::from("<ul class=\"flashes\">");
    for flash in flashes {
        let _ = write!(
            html,
            "<li class=\"flash {}\">{}</li>",
            flash.level.css_class(),
            escape_html(&flash.message)
        );
    }
    html.push_str("</ul>");
    html
}

fn nav(session: Option<&Session>) -> String {
    match session {
        Some(session) => format!(
            "<nav><a href=\"/dashboard\">Dashboard</a> <a href=\"/miembros\">Members</a> \
             <a href=\"/pagos\">Payments</a> <a href=\"/clases\">Classes</a> \
             <span class=\"user\">{} ({})</span> <a href=\"/logout\">Log out</a></nav>",
            escape_html(&session.display_name),
            session.role.label()
        ),
        None => "<nav><a href=\"/\">Home</a> <a href=\"/login\">Log in</a></nav>".to_string(),
    }
}

/// Wrap `body` in the shared page chrome
pub fn layout(title: &str, session: Option<&Session>, flashes: &[Flash], body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\">\
         <title>{} | {APP_NAME}</title></head>\n<body>\n<header><h1>{APP_NAME}</h1>{}</header>\n\
         {}\n<main>{body}</main>\n</body>\n</html>\n",
        escape_html(title),
        nav(session),
        flash_list(flashes),
    ))
}

pub fn landing(session: Option<&Session>, flashes: &[Flash]) -> Html<String> {
    let call_to_action = if session.is_some() {
        "<a href=\"/dashboard\">Go to the dashboard</a>"
    } else {
        "<a href=\"/login\">Log in</a>"
    };
    layout(
        "Welcome",
        session,
        flashes,
        &format!("<p>Gym management: members, payments, attendance and classes.</p><p>{call_to_action}</p>"),
    )
}

/// Login form; `username` refills the field after a failed attempt
pub fn login_form(flashes: &[Flash], username: Option<&str>) -> Html<String> {
    let body = format!(
        "<form method=\"post\" action=\"/login\">\
         <label>Username <input name=\"username\" value=\"{}\" required autofocus></label>\
         <label>Password <input name=\"password\" type=\"password\" required></label>\
         <button type=\"submit\">Log in</button></form>",
        escape_html(username.unwrap_or_default())
    );
    layout("Log in", None, flashes, &body)
}

pub fn dashboard(
    session: &Session,
    stats: &DashboardStats,
    recent: &[AuditRecord],
    flashes: &[Flash],
) -> Html<String> {
    let mut body = format!(
        "<h2>Welcome, {}</h2><section class=\"stats\">\
         <div><strong>{}</strong> active members</div>\
         <div><strong>{}</strong> payments today</div>\
         <div><strong>{}</strong> check-ins today</div>\
         <div><strong>{}</strong> active classes</div></section>",
        escape_html(&session.display_name),
        stats.active_members,
        stats.payments_today,
        stats.attendance_today,
        stats.active_classes,
    );

    body.push_str("<section class=\"activity\"><h3>Recent activity</h3>");
    if recent.is_empty() {
        body.push_str("<p>No activity recorded yet.</p>");
    } else {
        body.push_str(
            "<table><thead><tr><th>When</th><th>User</th><th>Action</th><th>Table</th>\
             <th>Detail</th></tr></thead><tbody>",
        );
        for record in recent {
            let entry = &record.entry;
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                entry.created_at.format("%Y-%m-%d %H:%M"),
                escape_html(&record.username),
                escape_html(entry.action.as_str()),
                escape_html(&entry.affected_table),
                escape_html(entry.detail.as_deref().unwrap_or_default()),
            );
        }
        body.push_str("</tbody></table>");
    }
    body.push_str("</section>");

    layout("Dashboard", Some(session), flashes, &body)
}

/// Body for [`AppError`](crate::error::AppError) responses
pub fn error_page(status: StatusCode, code: &str, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        title,
        None,
        &[],
        &format!(
            "<h2>{}</h2><p>{}</p><p class=\"code\">{}</p><p><a href=\"/\">Back to start</a></p>",
            status.as_u16(),
            escape_html(message),
            escape_html(code),
        ),
    )
}
