use hackerthink_admin::application::error::AppError;
use hackerthink_admin::application::loader::CollectionLoader;
use hackerthink_admin::application::repos::CategorySource;

use crate::args::CategoriesArgs;
use crate::client::Ctx;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, args: CategoriesArgs) -> Result<(), AppError> {
    let source = if args.taxonomy {
        CategorySource::Taxonomy
    } else {
        CategorySource::Admin
    };
    let categories = CollectionLoader::new(ctx.api())
        .load_categories(source)
        .await?;
    print_json(&categories)
}
