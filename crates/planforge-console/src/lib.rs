//! Colorful console output for simplification runs.
//!
//! Provides a custom `tracing` layer that formats simplifier events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (simplify start/end, layer end, refinement)
//! - **DEBUG**: Per-stage details (variable verdicts, composition targets)
//! - **TRACE**: Individual free transitions and path insertions


use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// `RUST_LOG` overrides the default `planforge_simplifier=info` filter.
pub fn init() {
    INIT.get_or_init(|| {
        EPOCH.get_or_init(Instant::now);
        print_banner();

        let mut builder = EnvFilter::builder();
        if let Ok(directive) = "planforge_simplifier=info".parse::<Directive>() {
            builder = builder.with_default_directive(directive);
        }
        let filter = builder.from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(SimplifierConsoleLayer)
            .try_init();
    });
}

fn elapsed_secs() -> f64 {
    EPOCH
        .get()
        .map_or(0.0, |epoch| epoch.elapsed().as_secs_f64())
}

fn print_banner() {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(
        stdout,
        "{} {}",
        "planforge".bright_cyan().bold(),
        format!("v{VERSION} - safe abstraction and operator composition").bright_white()
    );
    let _ = stdout.flush();
}

/// A tracing layer that formats simplifier events with colors.
pub struct SimplifierConsoleLayer;

impl<S: Subscriber> Layer<S> for SimplifierConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = event.metadata().target();
        if !target.starts_with("planforge_simplifier") && !target.starts_with("planforge::") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    layer: Option<u64>,
    layers: Option<u64>,
    variables: Option<u64>,
    operators: Option<u64>,
    max_layers: Option<u64>,
    safe_variables: Option<u64>,
    abstracted_variables: Option<u64>,
    composites: Option<u64>,
    duration_ms: Option<u64>,
    steps: Option<u64>,
    cost: Option<i64>,
    repairs: Option<u64>,
    decomposed: Option<u64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "event" {
            self.event = Some(format!("{:?}", value).trim_matches('"').to_string());
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "layer" => self.layer = Some(value),
            "layers" => self.layers = Some(value),
            "variables" => self.variables = Some(value),
            "operators" => self.operators = Some(value),
            "max_layers" => self.max_layers = Some(value),
            "safe_variables" => self.safe_variables = Some(value),
            "abstracted_variables" => self.abstracted_variables = Some(value),
            "composites" => self.composites = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "steps" => self.steps = Some(value),
            "cost" => self.cost = Some(value as i64),
            "repairs" => self.repairs = Some(value),
            "decomposed" => self.decomposed = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match field.name() {
            "cost" => self.cost = Some(value),
            _ => self.record_u64(field, value.max(0) as u64),
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "event" {
            self.event = Some(value.to_string());
        }
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "simplify_start" => format_simplify_start(v),
        "layer_end" => format_layer_end(v),
        "simplify_end" => format_simplify_end(v),
        "refine_end" => format_refine_end(v),
        "search_failed" => format_search_failed(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_simplify_start(v: &EventVisitor) -> String {
    format!(
        "{} {} Simplifying │ {} variables │ {} operators │ up to {} layers",
        format_elapsed(),
        "▶".bright_green().bold(),
        count(v.variables).bright_yellow(),
        count(v.operators).bright_yellow(),
        count(v.max_layers).bright_yellow(),
    )
}

fn format_layer_end(v: &EventVisitor) -> String {
    format!(
        "{} {} Layer {} │ {} abstracted │ {} composites │ {} variables │ {} operators left",
        format_elapsed(),
        "◀".bright_blue(),
        count(v.layer).white().bold(),
        count(v.safe_variables).bright_magenta(),
        count(v.composites).bright_magenta(),
        count(v.variables).white(),
        count(v.operators).white(),
    )
}

fn format_simplify_end(v: &EventVisitor) -> String {
    format!(
        concat!(
            "{} {} Simplification complete │ {} │ {} layers │ {} abstracted │ ",
            "{} composites │ {} variables │ {} operators",
        ),
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        count(v.layers).white(),
        count(v.abstracted_variables).bright_magenta().bold(),
        count(v.composites).bright_magenta().bold(),
        count(v.variables).bright_yellow(),
        count(v.operators).bright_yellow(),
    )
}

fn format_refine_end(v: &EventVisitor) -> String {
    format!(
        "{} {} Plan refined │ {} steps │ cost {} │ {} repairs │ {} composites expanded",
        format_elapsed(),
        "✓".bright_green().bold(),
        count(v.steps).white().bold(),
        v.cost.unwrap_or(0).to_formatted_string(&Locale::en).bright_yellow(),
        count(v.repairs).white(),
        count(v.decomposed).white(),
    )
}

fn format_search_failed(v: &EventVisitor) -> String {
    format!(
        "{} {} No plan for the reduced task │ {} variables",
        format_elapsed(),
        "✗".bright_red().bold(),
        count(v.variables).white(),
    )
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}
