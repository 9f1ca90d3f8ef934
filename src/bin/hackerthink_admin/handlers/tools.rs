use hackerthink_admin::application::error::AppError;
use hackerthink_admin::application::tools::cron::{CronExpression, crontab_line};
use hackerthink_admin::application::tools::disk_label::{self, LabelRequest};
use hackerthink_admin::application::tools::retry::{RetryPolicy, render_script};
use hackerthink_admin::application::tools::roadmap::{self, Answers};
use hackerthink_admin::util::timezone::local_offset;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::args::ToolsCmd;
use crate::client::Ctx;
use crate::print::{print_json, print_text};

const MAX_PREVIEW_RUNS: usize = 50;

pub async fn handle(ctx: &Ctx, cmd: ToolsCmd) -> Result<(), AppError> {
    match cmd {
        ToolsCmd::Retry {
            command,
            attempts,
            base_delay,
            factor,
            max_delay,
            jitter,
        } => {
            let policy = RetryPolicy {
                max_attempts: attempts,
                base_delay_secs: base_delay,
                factor,
                max_delay_secs: max_delay,
                jitter,
            };
            print_text(&render_script(&command, &policy)?);
            Ok(())
        }
        ToolsCmd::Cron {
            expression,
            command,
            next,
            after,
        } => cron(ctx, &expression, command.as_deref(), next, after),
        ToolsCmd::DiskLabel {
            device,
            filesystem,
            label,
            mount_point,
        } => {
            let plan = disk_label::plan(&LabelRequest {
                device,
                filesystem,
                label,
                mount_point,
            })?;
            print_json(&plan)
        }
        ToolsCmd::Roadmap {
            level,
            goal,
            weekly_hours,
        } => print_json(&roadmap::build(Answers {
            level,
            goal,
            weekly_hours,
        })?),
    }
}

fn cron(
    ctx: &Ctx,
    expression: &str,
    command: Option<&str>,
    next: usize,
    after: Option<OffsetDateTime>,
) -> Result<(), AppError> {
    if next > MAX_PREVIEW_RUNS {
        return Err(AppError::validation(format!(
            "--next must be at most {MAX_PREVIEW_RUNS}"
        )));
    }
    let parsed = CronExpression::parse(expression)?;
    let line = command
        .map(|command| crontab_line(&parsed, command))
        .transpose()?;

    // previews run in the configured timezone's current offset
    let tz = ctx.settings.listing.timezone;
    let start = after.unwrap_or_else(OffsetDateTime::now_utc);
    let start = start.to_offset(local_offset(start, tz));
    let runs: Vec<String> = parsed
        .next_runs(start, next)
        .into_iter()
        .filter_map(|at| at.format(&Rfc3339).ok())
        .collect();

    print_json(&json!({
        "expression": parsed.as_str(),
        "timezone": tz.name(),
        "crontab_line": line,
        "next_runs": runs,
    }))
}
