//! Command-line surface for `hackerthink-admin`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hackerthink_admin::application::listing::{BulkAction, DatePreset, SortDirection};
use hackerthink_admin::application::tools::disk_label::Filesystem;
use hackerthink_admin::application::tools::roadmap::{Goal, Level};
use hackerthink_admin::config::GlobalArgs;
use hackerthink_admin::domain::content::FieldKey;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

#[derive(Parser, Debug)]
#[command(
    name = "hackerthink-admin",
    version,
    about = "Operator CLI for the HackerThink admin lists",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interview list
    Interviews(ContentArgs),
    /// News list
    News(ContentArgs),
    /// Product list
    Products(ContentArgs),
    /// Tutorial list
    Tutorials(ContentArgs),
    /// Category options used by list filters
    Categories(CategoriesArgs),
    /// Script and schedule generators
    Tools(ToolsArgs),
}

#[derive(Parser, Debug)]
pub struct ContentArgs {
    #[command(subcommand)]
    pub action: ContentCmd,
}

#[derive(Subcommand, Debug)]
pub enum ContentCmd {
    /// Print one page of the filtered, sorted list
    List(ListArgs),
    /// Apply an action to rows on the current page
    Bulk {
        /// publish, unpublish, archive or delete
        action: BulkAction,
        /// Row ids to select; each must be on the requested page
        #[arg(required_unless_present = "all_on_page")]
        ids: Vec<String>,
        /// Select every row on the requested page
        #[arg(long, conflicts_with = "ids")]
        all_on_page: bool,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Flip the published state of one row
    Toggle { id: String },
    /// Delete one row; without --yes the row is only armed
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Print the public URL of a published row
    View { id: String },
    /// Print the admin edit route of a row
    Edit { id: String },
    /// Replace a full record from a JSON file
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
        /// Regenerate the slug from the title, unique within the collection
        #[arg(long)]
        slug_from_title: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Case-insensitive search across the list's text columns
    #[arg(long)]
    pub search: Option<String>,

    /// Exact-match filter, repeatable (e.g. `status=published`)
    #[arg(long = "filter", value_name = "FIELD=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(FieldKey, String)>,

    /// Relative date window on `created_at`
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub date: Option<DatePreset>,

    /// Custom range start (YYYY-MM-DD, inclusive)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<Date>,

    /// Custom range end (YYYY-MM-DD, inclusive)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<Date>,

    /// Sort column
    #[arg(long)]
    pub sort: Option<FieldKey>,

    /// Sort direction (asc|desc)
    #[arg(long = "dir", requires = "sort")]
    pub direction: Option<SortDirection>,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Forward search, status and category to the server (tutorials only)
    #[arg(long)]
    pub server_side: bool,

    /// Include summary statistics over the whole collection
    #[arg(long)]
    pub stats: bool,

    /// Include category options
    #[arg(long)]
    pub with_categories: bool,

    /// Read category options from the taxonomy endpoint
    #[arg(long, requires = "with_categories")]
    pub taxonomy: bool,
}

#[derive(Parser, Debug)]
pub struct CategoriesArgs {
    /// Read from `/taxonomy/categories` instead of `/categories`
    #[arg(long)]
    pub taxonomy: bool,
}

#[derive(Parser, Debug)]
pub struct ToolsArgs {
    #[command(subcommand)]
    pub action: ToolsCmd,
}

#[derive(Subcommand, Debug)]
pub enum ToolsCmd {
    /// Bash wrapper retrying a command with exponential backoff
    Retry {
        /// Command to retry
        #[arg(long)]
        command: String,
        #[arg(long, default_value_t = 5)]
        attempts: u32,
        /// Initial delay in seconds
        #[arg(long, default_value_t = 1)]
        base_delay: u64,
        #[arg(long, default_value_t = 2)]
        factor: u32,
        /// Delay ceiling in seconds
        #[arg(long, default_value_t = 60)]
        max_delay: u64,
        #[arg(long)]
        jitter: bool,
    },
    /// Validate a crontab expression and preview its next runs
    Cron {
        expression: String,
        /// Render a full crontab line for this command
        #[arg(long)]
        command: Option<String>,
        #[arg(long, default_value_t = 5)]
        next: usize,
        /// Start the preview here instead of now (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        after: Option<OffsetDateTime>,
    },
    /// Relabel command and fstab entry for a filesystem
    DiskLabel {
        #[arg(long)]
        device: String,
        #[arg(long = "fs")]
        filesystem: Filesystem,
        #[arg(long)]
        label: String,
        #[arg(long)]
        mount_point: Option<String>,
    },
    /// Build a learning roadmap from quiz answers
    Roadmap {
        #[arg(long)]
        level: Level,
        #[arg(long)]
        goal: Goal,
        #[arg(long, default_value_t = 8)]
        weekly_hours: u32,
    },
}

fn parse_filter(raw: &str) -> Result<(FieldKey, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{raw}`"))?;
    let field = field.parse::<FieldKey>().map_err(|err| err.to_string())?;
    Ok((field, value.trim().to_string()))
}

fn parse_date(raw: &str) -> Result<Date, String> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|err| format!("expected YYYY-MM-DD, got `{raw}`: {err}"))
}

fn parse_instant(raw: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .map_err(|err| format!("expected an RFC 3339 timestamp, got `{raw}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_split_on_the_first_equals() {
        let (field, value) = parse_filter("category=Tools=Misc").expect("filter");
        assert_eq!(field, FieldKey::CategoryName);
        assert_eq!(value, "Tools=Misc");
        assert!(parse_filter("status").is_err());
        assert!(parse_filter("colour=red").is_err());
    }

    #[test]
    fn dates_are_calendar_days() {
        assert_eq!(
            parse_date("2024-06-01").expect("date"),
            time::macros::date!(2024 - 06 - 01)
        );
        assert!(parse_date("06/01/2024").is_err());
    }

    #[test]
    fn bulk_requires_ids_or_all_on_page() {
        assert!(Cli::try_parse_from(["hackerthink-admin", "news", "bulk", "publish"]).is_err());
        let cli = Cli::try_parse_from([
            "hackerthink-admin",
            "news",
            "bulk",
            "publish",
            "--all-on-page",
            "--page",
            "2",
        ])
        .expect("parse");
        match cli.command {
            Commands::News(ContentArgs {
                action:
                    ContentCmd::Bulk {
                        action,
                        all_on_page,
                        list,
                        ..
                    },
            }) => {
                assert_eq!(action, BulkAction::Publish);
                assert!(all_on_page);
                assert_eq!(list.page, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "hackerthink-admin",
            "tutorials",
            "list",
            "--api-url",
            "http://localhost:9999",
            "--page-size",
            "20",
        ])
        .expect("parse");
        assert_eq!(cli.global.api_url.as_deref(), Some("http://localhost:9999"));
        assert_eq!(cli.global.page_size, Some(20));
    }
}
