//! HTML rendering through Tera. The index template is compiled in and
//! registered under an `.html` name, so every interpolated value is
//! autoescaped.

use serde::Serialize;
use serde_json::Value;
use tera::{Context, Tera};

use crate::backend::{Answer, TaskChoice};

const INDEX_TEMPLATE: &str = "index.html";

/// Everything the index page can show.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub backend_health: Option<&'a Value>,
    pub task: TaskChoice,
    pub query: &'a str,
    pub answer: Option<&'a Answer>,
    pub error: Option<&'a str>,
}

#[derive(Serialize)]
struct HealthContext<'a> {
    status: &'a str,
    ok: bool,
    detail: Option<&'a str>,
}

impl<'a> HealthContext<'a> {
    fn from_value(health: &'a Value) -> Self {
        let status = health
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Self {
            status,
            ok: status == "ok",
            detail: health.get("detail").and_then(Value::as_str),
        }
    }
}

#[derive(Serialize)]
struct TaskOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Serialize)]
struct AnswerContext<'a> {
    kind: &'a str,
    latency: String,
    content: &'a str,
    timestamp: &'a str,
}

#[derive(Serialize)]
struct PageContext<'a> {
    health: Option<HealthContext<'a>>,
    options: Vec<TaskOption>,
    query: &'a str,
    error: Option<&'a str>,
    answer: Option<AnswerContext<'a>>,
}

impl<'a> From<&PageView<'a>> for PageContext<'a> {
    fn from(view: &PageView<'a>) -> Self {
        Self {
            health: view.backend_health.map(HealthContext::from_value),
            options: TaskChoice::ALL
                .iter()
                .map(|t| TaskOption {
                    value: t.path(),
                    label: t.label(),
                    selected: *t == view.task,
                })
                .collect(),
            query: view.query,
            error: view.error,
            answer: view.answer.map(|a| AnswerContext {
                kind: &a.kind,
                latency: format!("{:.2}", a.latency_seconds),
                content: &a.content,
                timestamp: &a.timestamp,
            }),
        }
    }
}

/// Compiled page templates.
#[derive(Debug)]
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;
        Ok(Self { tera })
    }

    /// Render the single-page UI.
    pub fn page(&self, view: &PageView<'_>) -> Result<String, tera::Error> {
        let context = Context::from_serialize(PageContext::from(view))?;
        self.tera.render(INDEX_TEMPLATE, &context)
    }
}
