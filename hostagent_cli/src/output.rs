use anyhow::Result;
use hostagent_lib::{
    ApplyReport, Notification, NotificationLevel, Notifier, Outcome, Preferences, Profile,
    ReloadReport, ResponseBody,
};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Tabled, Serialize, Debug, PartialEq)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl FieldRow {
    fn new(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

/// Shows notifications on stderr so stdout stays machine-readable.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", format_notification(&notification));
    }
}

fn format_notification(n: &Notification) -> String {
    let tag = match n.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "error",
    };
    format!(
        "[{}] {} {}",
        tag,
        n.at.with_timezone(&chrono::Local).format("%H:%M:%S"),
        n.message
    )
}

fn render_body(body: &ResponseBody) -> String {
    match body {
        ResponseBody::Text(t) => t.clone(),
        ResponseBody::Json(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
    }
}

/// Renders an outcome. Text mode shows the body or the failure message;
/// JSON mode shows the `{ok, body}` shape.
pub fn render_outcome(outcome: &Outcome, format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(outcome)?,
        OutputFormat::Text => match outcome {
            Outcome::Success(body) => render_body(body),
            Outcome::Failure(err) => err.to_string(),
        },
    })
}

/// Prints an outcome to stdout and turns a failure into an error exit.
pub fn print_outcome(outcome: Outcome, format: &OutputFormat) -> Result<()> {
    let rendered = render_outcome(&outcome, format)?;
    match outcome {
        Outcome::Success(_) => {
            println!("{}", rendered);
            Ok(())
        }
        Outcome::Failure(err) => {
            if let OutputFormat::Json = format {
                println!("{}", rendered);
            }
            Err(hostagent_lib::HostAgentError::from(err).into())
        }
    }
}

fn table(rows: &[FieldRow]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn build_profile_rows(profile: &Profile) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow::new("Username", profile.username.clone()),
        FieldRow::new(
            "Base path",
            profile.config.url_base.clone().unwrap_or_else(|| "-".to_string()),
        ),
    ];
    let mut keys: Vec<&String> = profile.extra.keys().collect();
    keys.sort();
    for key in keys {
        let value = &profile.extra[key];
        let shown = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        rows.push(FieldRow::new(key, shown));
    }
    rows
}

fn build_prefs_rows(prefs: &Preferences) -> Vec<FieldRow> {
    vec![
        FieldRow::new("Base path", prefs.base_path.clone()),
        FieldRow::new("Locale", prefs.locale.clone()),
    ]
}

fn build_reload_rows(report: &ReloadReport) -> Vec<FieldRow> {
    vec![
        FieldRow::new("Probes", report.attempts.to_string()),
        FieldRow::new("Waited", format!("{:.2}s", report.waited.as_secs_f64())),
    ]
}

pub fn print_profile(profile: &Profile, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(profile)?),
        OutputFormat::Text => println!("{}", table(&build_profile_rows(profile))),
    }
    Ok(())
}

pub fn print_prefs(prefs: &Preferences, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(prefs)?),
        OutputFormat::Text => println!("{}", table(&build_prefs_rows(prefs))),
    }
    Ok(())
}

pub fn print_reload(report: &ReloadReport, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", reload_json(report)),
        OutputFormat::Text => println!("{}", table(&build_reload_rows(report))),
    }
    Ok(())
}

fn reload_json(report: &ReloadReport) -> serde_json::Value {
    serde_json::json!({
        "attempts": report.attempts,
        "waited_ms": report.waited.as_millis() as u64,
    })
}

pub fn print_apply(report: &ApplyReport, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "response": report.response,
                "reload": reload_json(&report.reload),
                "profile": report.profile,
                "base_path_changed": report.base_path_changed,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            let mut rows = build_reload_rows(&report.reload);
            rows.push(FieldRow::new(
                "Base path changed",
                if report.base_path_changed { "yes" } else { "no" },
            ));
            rows.push(FieldRow::new("Response", render_body(&report.response)));
            println!("{}", table(&rows));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostagent_lib::RequestError;
    use serde_json::json;
    use std::time::Duration;

    fn sample_profile() -> Profile {
        serde_json::from_value(json!({
            "username": "admin",
            "config": { "urlbase": "/agent/" },
            "version": "0.8.3",
            "uptime": 42
        }))
        .unwrap()
    }

    #[test]
    fn text_outcome_shows_body() {
        let out = Outcome::Success(ResponseBody::Text("pong".to_string()));
        assert_eq!(render_outcome(&out, &OutputFormat::Text).unwrap(), "pong");
    }

    #[test]
    fn text_outcome_pretty_prints_json() {
        let out = Outcome::Success(ResponseBody::Json(json!({ "a": 1 })));
        let text = render_outcome(&out, &OutputFormat::Text).unwrap();
        assert!(text.contains("\"a\": 1"));
    }

    #[test]
    fn json_outcome_has_ok_shape() {
        let out = Outcome::Failure(RequestError::TimedOut);
        let rendered = render_outcome(&out, &OutputFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(v, json!({ "ok": false, "body": "request timed out" }));
    }

    #[test]
    fn failed_outcome_is_an_error_exit() {
        let out = Outcome::Failure(RequestError::LoggedOut);
        let err = print_outcome(out, &OutputFormat::Text).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<hostagent_lib::HostAgentError>(),
            Some(hostagent_lib::HostAgentError::LoggedOut)
        ));
    }

    #[test]
    fn profile_rows_sorted_extras() {
        let rows = build_profile_rows(&sample_profile());
        let fields: Vec<&str> = rows.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(fields, vec!["Username", "Base path", "uptime", "version"]);
        assert_eq!(rows[1].value, "/agent/");
        assert_eq!(rows[3].value, "0.8.3");
    }

    #[test]
    fn prefs_table_has_headers() {
        let rendered = table(&build_prefs_rows(&Preferences::default()));
        assert!(rendered.contains("Field"));
        assert!(rendered.contains("Base path"));
        assert!(rendered.contains("en"));
    }

    #[test]
    fn reload_rows_format_seconds() {
        let rows = build_reload_rows(&ReloadReport {
            attempts: 11,
            waited: Duration::from_millis(4050),
        });
        assert_eq!(rows[0].value, "11");
        assert_eq!(rows[1].value, "4.05s");
    }

    #[test]
    fn notification_line() {
        let line = format_notification(&Notification::error("reload check timed out"));
        assert!(line.starts_with("[error] "));
        assert!(line.ends_with("reload check timed out"));
    }
}
