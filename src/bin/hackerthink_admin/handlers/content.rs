use std::path::Path;

use hackerthink_admin::application::analytics::CollectionStats;
use hackerthink_admin::application::error::{AppError, Banner};
use hackerthink_admin::application::listing::{
    BulkAction, DateRange, DeleteStep, FilterCriteria, ListController, ListError, PageView,
    Refresh, SortDirection, SortSpec,
};
use hackerthink_admin::application::repos::{CategorySource, ServerQuery};
use hackerthink_admin::domain::content::{ContentItem, ContentKind, FieldKey};
use hackerthink_admin::domain::slug::generate_unique_slug;
use hackerthink_api_types::Category;
use serde::Serialize;
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::args::{ContentCmd, ListArgs};
use crate::client::{Ctx, cancel_on_interrupt};
use crate::io::read_json_file;
use crate::print::print_json;

#[derive(Serialize)]
struct ListOutput<'a, T> {
    kind: ContentKind,
    #[serde(flatten)]
    page: PageView<'a, T>,
    sort: SortOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<CollectionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<&'a [Category]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    banner: Option<&'a Banner>,
}

#[derive(Serialize)]
struct SortOutput {
    field: &'static str,
    direction: &'static str,
}

pub async fn handle<T: ContentItem>(ctx: &Ctx, cmd: ContentCmd) -> Result<(), AppError> {
    match cmd {
        ContentCmd::List(args) => list::<T>(ctx, args).await,
        ContentCmd::Bulk {
            action,
            ids,
            all_on_page,
            list,
        } => bulk::<T>(ctx, action, ids, all_on_page, list).await,
        ContentCmd::Toggle { id } => toggle::<T>(ctx, &id).await,
        ContentCmd::Delete { id, yes } => delete::<T>(ctx, &id, yes).await,
        ContentCmd::View { id } => view::<T>(ctx, &id).await,
        ContentCmd::Edit { id } => edit::<T>(ctx, &id).await,
        ContentCmd::Update {
            id,
            file,
            slug_from_title,
        } => update::<T>(ctx, &id, &file, slug_from_title).await,
    }
}

async fn list<T: ContentItem>(ctx: &Ctx, args: ListArgs) -> Result<(), AppError> {
    let controller = load_page::<T>(ctx, &args).await?;
    let view = controller.view();
    let sort = view.sort();
    let output = ListOutput {
        kind: T::KIND,
        page: view.visible()?,
        sort: SortOutput {
            field: sort.field.as_str(),
            direction: sort.direction.as_str(),
        },
        last_updated: view
            .last_updated()
            .and_then(|at| at.format(&Rfc3339).ok()),
        stats: args.stats.then(|| view.stats()),
        categories: args.with_categories.then(|| view.category_options()),
        banner: view.banner(),
    };
    print_json(&output)
}

async fn bulk<T: ContentItem>(
    ctx: &Ctx,
    action: BulkAction,
    ids: Vec<String>,
    all_on_page: bool,
    args: ListArgs,
) -> Result<(), AppError> {
    let mut controller = load_page::<T>(ctx, &args).await?;
    let view = controller.view_mut();
    if all_on_page {
        view.toggle_select_all()?;
    } else {
        for id in &ids {
            if !view.selection().is_selected(id) {
                view.toggle_selected(id)?;
            }
        }
    }

    let report = controller.apply_bulk(action).await?;
    print_json(&json!({
        "kind": T::KIND,
        "action": report.action.as_str(),
        "affected": report.affected,
        "message": report.message(),
    }))
}

async fn toggle<T: ContentItem>(ctx: &Ctx, id: &str) -> Result<(), AppError> {
    let mut controller = load_row::<T>(ctx, id).await?;
    let published = controller.toggle_publish(id).await?;
    print_json(&json!({ "kind": T::KIND, "id": id, "published": published }))
}

async fn delete<T: ContentItem>(ctx: &Ctx, id: &str, confirmed: bool) -> Result<(), AppError> {
    let mut controller = load_row::<T>(ctx, id).await?;
    let mut step = controller.click_delete(id).await?;
    if confirmed {
        step = controller.click_delete(id).await?;
    }
    match step {
        DeleteStep::Armed => print_json(&json!({
            "kind": T::KIND,
            "id": id,
            "deleted": false,
            "message": "Re-run with --yes to delete",
        })),
        DeleteStep::Deleted => {
            info!(collection = T::KIND.collection(), id, "item deleted");
            print_json(&json!({ "kind": T::KIND, "id": id, "deleted": true }))
        }
    }
}

async fn view<T: ContentItem>(ctx: &Ctx, id: &str) -> Result<(), AppError> {
    let controller = load_all::<T>(ctx).await?;
    let url = controller.public_url(ctx.site(), id)?;
    print_json(&json!({ "kind": T::KIND, "id": id, "url": url.as_str() }))
}

async fn edit<T: ContentItem>(ctx: &Ctx, id: &str) -> Result<(), AppError> {
    let controller = load_all::<T>(ctx).await?;
    let route = controller.edit_route(id)?;
    print_json(&json!({ "kind": T::KIND, "id": id, "route": route }))
}

async fn update<T: ContentItem>(
    ctx: &Ctx,
    id: &str,
    file: &Path,
    slug_from_title: bool,
) -> Result<(), AppError> {
    let mut record: T = read_json_file(file)?;
    if record.id() != id {
        return Err(AppError::validation(format!(
            "record id `{}` does not match `{id}`",
            record.id()
        )));
    }

    if slug_from_title {
        let controller = load_all::<T>(ctx).await?;
        let items = controller.view().items();
        let slug = generate_unique_slug(record.title(), |candidate| {
            !items
                .iter()
                .any(|item| item.id() != id && item.slug() == candidate)
        })?;
        record.set_slug(slug);
    }

    let body = serde_json::to_value(&record)
        .map_err(|err| AppError::unexpected(format!("failed to encode record: {err}")))?;
    let response = ctx.api().replace_item(T::KIND, id, body).await?;
    info!(collection = T::KIND.collection(), id, "record replaced");
    print_json(&response)
}

/// Load the collection and apply the list flags.
async fn load_page<T: ContentItem>(
    ctx: &Ctx,
    args: &ListArgs,
) -> Result<ListController<T>, AppError> {
    let mut controller = ctx.controller::<T>();
    if args.server_side {
        controller.set_server_query(server_query(args))?;
    }

    let source = if args.taxonomy {
        CategorySource::Taxonomy
    } else {
        CategorySource::Admin
    };
    let interrupt = cancel_on_interrupt(controller.cancel_handle());
    let refreshed = if args.with_categories {
        controller.refresh_with_categories(source).await
    } else {
        controller.refresh().await
    };
    interrupt.abort();
    ensure_loaded(refreshed?)?;

    let view = controller.view_mut();
    view.set_criteria(criteria(args))?;
    if let Some(field) = args.sort {
        view.set_sort(SortSpec::new(
            field,
            args.direction.unwrap_or(SortDirection::Desc),
        ))?;
    }
    view.set_page(args.page)?;
    Ok(controller)
}

async fn load_all<T: ContentItem>(ctx: &Ctx) -> Result<ListController<T>, AppError> {
    let mut controller = ctx.controller::<T>();
    let interrupt = cancel_on_interrupt(controller.cancel_handle());
    let refreshed = controller.refresh().await;
    interrupt.abort();
    ensure_loaded(refreshed?)?;
    Ok(controller)
}

/// Load the collection and move to the page showing `id`.
async fn load_row<T: ContentItem>(ctx: &Ctx, id: &str) -> Result<ListController<T>, AppError> {
    let mut controller = load_all::<T>(ctx).await?;
    let view = controller.view_mut();
    let position = view
        .filtered()?
        .iter()
        .position(|item| item.id() == id)
        .ok_or_else(|| ListError::UnknownItem { id: id.to_string() })?;
    let page_size = view.page_size().get();
    view.set_page(position / page_size + 1)?;
    Ok(controller)
}

fn ensure_loaded(refresh: Refresh) -> Result<(), AppError> {
    match refresh {
        Refresh::Loaded { .. } => Ok(()),
        Refresh::Cancelled => Err(AppError::unexpected("load cancelled by interrupt")),
    }
}

fn criteria(args: &ListArgs) -> FilterCriteria {
    let mut criteria = FilterCriteria::new();
    if let Some(search) = args.search.as_ref() {
        criteria.set_search(search.clone());
    }
    for (field, value) in &args.filters {
        criteria.set_exact(*field, value.clone());
    }
    if let Some(preset) = args.date {
        criteria.set_date_range(DateRange::Preset(preset));
    } else if args.from.is_some() || args.to.is_some() {
        criteria.set_date_range(DateRange::Custom {
            from: args.from,
            to: args.to,
        });
    }
    criteria
}

/// Search, status and category for endpoints that filter server-side.
fn server_query(args: &ListArgs) -> ServerQuery {
    let exact = |key: FieldKey| {
        args.filters
            .iter()
            .rev()
            .find(|(field, _)| *field == key)
            .map(|(_, value)| value.clone())
    };
    ServerQuery {
        search: args
            .search
            .as_ref()
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty()),
        status: exact(FieldKey::Status),
        category: exact(FieldKey::CategoryName),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn custom_range_uses_both_bounds() {
        let args = ListArgs {
            from: Some(date!(2024 - 06 - 01)),
            to: Some(date!(2024 - 06 - 30)),
            ..ListArgs::default()
        };
        assert_eq!(
            criteria(&args).date_range(),
            DateRange::Custom {
                from: Some(date!(2024 - 06 - 01)),
                to: Some(date!(2024 - 06 - 30)),
            }
        );
    }

    #[test]
    fn server_query_takes_status_and_category_filters() {
        let args = ListArgs {
            search: Some("  rust ".to_string()),
            filters: vec![
                (FieldKey::Status, "draft".to_string()),
                (FieldKey::CategoryName, "Systems".to_string()),
                (FieldKey::Status, "published".to_string()),
            ],
            ..ListArgs::default()
        };
        let query = server_query(&args);
        assert_eq!(query.search.as_deref(), Some("rust"));
        assert_eq!(query.status.as_deref(), Some("published"));
        assert_eq!(query.category.as_deref(), Some("Systems"));
    }
}
